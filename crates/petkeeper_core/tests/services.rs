use petkeeper_core::{AppConfig, NewPet, OwnerData, OwnerService, PetService, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn test_config() -> AppConfig {
    AppConfig {
        search_debounce_ms: 20,
        ..AppConfig::default()
    }
}

async fn start_services() -> (Arc<Store>, Arc<PetService>, Arc<OwnerService>) {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let config = test_config();
    let pets = PetService::start(Arc::clone(&store), &config).await;
    let owners = OwnerService::start(Arc::clone(&store), &config).await;
    (store, pets, owners)
}

#[tokio::test]
async fn add_pet_publishes_notice_and_refreshes_list() {
    let (_store, pets, _owners) = start_services().await;
    let mut notices = pets.notices();

    let notice = pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).await;

    assert!(notice.ok);
    assert_eq!(notice.message, "Pet added successfully");
    assert_eq!(notices.recv().await.unwrap(), "Pet added successfully");
    let list = pets.pets().borrow().clone();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "Rex");
}

#[tokio::test]
async fn search_text_filters_list_after_quiet_period() {
    let (_store, pets, _owners) = start_services().await;
    pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).await;
    pets.add_pet(NewPet::ownerless("Tom", "Cat", 2)).await;
    let mut list = pets.pets();

    pets.set_search_query("t");
    pets.set_search_query("to");
    pets.set_search_query("tom");

    let filtered = timeout(
        Duration::from_secs(2),
        list.wait_for(|pets| pets.len() == 1),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(filtered[0].name, "Tom");
    assert_eq!(pets.search_query(), "tom");

    pets.set_search_query("");
    let all = timeout(Duration::from_secs(2), list.wait_for(|pets| pets.len() == 2))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn deleting_owned_pet_reports_business_rule() {
    let (_store, pets, owners) = start_services().await;
    owners.add_owner(OwnerData::new("Alice", Vec::new())).await;
    pets.add_pet(NewPet::owned_by("Rex", "Dog", 3, "Alice")).await;
    let rex = pets.pets().borrow()[0].clone();

    let notice = pets.delete_pet(rex.id).await;

    assert!(!notice.ok);
    assert_eq!(
        notice.message,
        "Cannot delete this pet because it has an owner. Please remove owner association first."
    );
    assert_eq!(pets.pets().borrow().len(), 1);
}

#[tokio::test]
async fn adoption_messages_follow_outcome() {
    let (_store, pets, owners) = start_services().await;
    owners.add_owner(OwnerData::new("Alice", Vec::new())).await;
    owners.add_owner(OwnerData::new("Bob", Vec::new())).await;
    pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).await;
    let rex = pets.pets().borrow()[0].clone();

    assert_eq!(
        pets.adopt_pet(rex.id, "Nobody").await.message,
        "Owner not found"
    );
    assert_eq!(
        pets.adopt_pet(rex.id, "Alice").await.message,
        "Pet adopted successfully"
    );
    assert_eq!(
        pets.adopt_pet(rex.id, "Alice").await.message,
        "You already adopted this pet"
    );
    assert_eq!(
        pets.adopt_pet(rex.id, "Bob").await.message,
        "Pet already adopted by Alice"
    );
    let adopted = pets.pets().borrow()[0].clone();
    assert_eq!(adopted.owner_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn owner_rename_and_duplicate_messages() {
    let (_store, pets, owners) = start_services().await;
    owners.add_owner(OwnerData::new("Carol", Vec::new())).await;
    owners.add_owner(OwnerData::new("Carolyn", Vec::new())).await;
    pets.add_pet(NewPet::owned_by("Bun", "Rabbit", 1, "Carol")).await;
    let carol = owners
        .owners()
        .borrow()
        .iter()
        .find(|owner| owner.name == "Carol")
        .cloned()
        .unwrap();

    let dup = owners.update_owner(carol.renamed("carolyn")).await;
    assert!(!dup.ok);
    assert_eq!(dup.message, "An owner with this name already exists");

    let ok = owners.update_owner(carol.renamed("Caroline")).await;
    assert_eq!(ok.message, "Owner updated successfully");

    pets.refresh().await;
    let bun = pets.pets().borrow()[0].clone();
    assert_eq!(bun.owner_name.as_deref(), Some("Caroline"));
}

#[tokio::test]
async fn delete_unknown_owner_reports_not_found() {
    let (_store, _pets, owners) = start_services().await;
    let mut notices = owners.notices();

    let notice = owners.delete_owner(uuid::Uuid::new_v4()).await;

    assert!(!notice.ok);
    assert_eq!(notice.message, "Error deleting owner: Owner not found");
    assert_eq!(notices.recv().await.unwrap(), notice.message);
}

#[tokio::test]
async fn closed_store_turns_operations_into_messages() {
    let (store, pets, _owners) = start_services().await;
    assert!(store.close().unwrap());

    let notice = pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).await;

    assert!(!notice.ok);
    assert_eq!(notice.message, "Error adding pet: Database is closed");
}
