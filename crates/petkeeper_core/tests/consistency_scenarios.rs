use petkeeper_core::db::open_db_in_memory;
use petkeeper_core::{
    ownership_violations, NewPet, OwnerData, OwnerRepository, PetData, PetRepository, RepoError,
    SqliteOwnerRepository, SqlitePetRepository,
};

#[test]
fn scenario_adopt_ownerless_pet() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    let alice = owners
        .add_owner(&OwnerData::new("Alice", Vec::new()))
        .unwrap();
    let x = pets.add_pet(NewPet::ownerless("X", "Dog", 1)).unwrap();

    pets.adopt_pet(x.id, "Alice").unwrap();

    let pet = pets.get_pet(x.id).unwrap().unwrap();
    assert!(pet.has_owner);
    assert_eq!(pet.owner_name.as_deref(), Some("Alice"));
    let alice = owners.get_owner(alice.id).unwrap().unwrap();
    assert!(alice.pet_ids().any(|id| id == x.id));

    let before_owner = alice;
    let err = pets.adopt_pet(x.id, "Alice").unwrap_err();
    assert!(matches!(err, RepoError::DuplicateAdoption { .. }));
    assert_eq!(pets.get_pet(x.id).unwrap().unwrap(), pet);
    assert_eq!(owners.get_owner(before_owner.id).unwrap().unwrap(), before_owner);
}

#[test]
fn scenario_rename_owner_keeps_pet_identity() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    let bob = owners.add_owner(&OwnerData::new("Bob", Vec::new())).unwrap();
    let y = pets.add_pet(NewPet::owned_by("Y", "Cat", 4, "Bob")).unwrap();
    assert_eq!(y.owner_name.as_deref(), Some("Bob"));

    owners.update_owner(&bob.renamed("Bobby")).unwrap();

    let after = pets.get_pet(y.id).unwrap().unwrap();
    assert_eq!(after.id, y.id);
    assert_eq!(after.has_owner, y.has_owner);
    assert_eq!(after.owner_name.as_deref(), Some("Bobby"));
}

#[test]
fn scenario_owned_pet_survives_delete_attempt() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    owners
        .add_owner(&OwnerData::new("Alice", Vec::new()))
        .unwrap();
    let pet = pets
        .add_pet(NewPet::owned_by("Rex", "Dog", 3, "Alice"))
        .unwrap();

    assert!(matches!(
        pets.delete_pet(pet.id),
        Err(RepoError::PetHasOwner(_))
    ));
    assert_eq!(pets.get_pet(pet.id).unwrap(), Some(pet));
}

#[test]
fn scenario_delete_owner_with_two_pets() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    let owner = owners.add_owner(&OwnerData::new("Eve", Vec::new())).unwrap();
    let a = pets.add_pet(NewPet::owned_by("A", "Fish", 1, "Eve")).unwrap();
    let b = pets.add_pet(NewPet::owned_by("B", "Fish", 1, "Eve")).unwrap();

    owners.delete_owner(owner.id).unwrap();

    for id in [a.id, b.id] {
        let pet = pets.get_pet(id).unwrap().unwrap();
        assert!(!pet.has_owner);
        assert_eq!(pet.owner_name, None);
    }
    assert_eq!(owners.get_owner(owner.id).unwrap(), None);
}

#[test]
fn rename_onto_other_owner_name_in_other_case_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    owners
        .add_owner(&OwnerData::new("carol", Vec::new()))
        .unwrap();
    let carol = owners
        .add_owner(&OwnerData::new("Carol", Vec::new()))
        .unwrap();
    let pet = pets
        .add_pet(NewPet::owned_by("Bun", "Rabbit", 2, "Carol"))
        .unwrap();
    let before = owners.get_owner(carol.id).unwrap().unwrap();

    let err = owners.update_owner(&carol.renamed("CAROL")).unwrap_err();

    assert!(matches!(err, RepoError::DuplicateOwnerName(_)));
    assert_eq!(owners.get_owner(carol.id).unwrap().unwrap(), before);
    assert_eq!(pets.get_pet(pet.id).unwrap(), Some(pet));
}

#[test]
fn search_round_trip_ignores_case() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).unwrap();
    pets.add_pet(NewPet::ownerless("Tom", "Cat", 2)).unwrap();

    for query in ["rex", "REX", "Rex", "  rEx "] {
        let found = pets.search_pets(query).unwrap();
        assert_eq!(found.len(), 1, "query {query:?}");
        assert_eq!(found[0].name, "Rex");
    }
}

#[test]
fn blank_search_is_the_unfiltered_list() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    owners.add_owner(&OwnerData::new("Zed", Vec::new())).unwrap();
    pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).unwrap();
    pets.add_pet(NewPet::owned_by("Tom", "Cat", 2, "Zed")).unwrap();

    assert_eq!(pets.search_pets("").unwrap(), pets.list_pets().unwrap());
    assert_eq!(pets.search_pets("   ").unwrap(), pets.list_pets().unwrap());
    assert_eq!(owners.search_owners("").unwrap(), owners.list_owners().unwrap());
}

#[test]
fn search_matches_type_and_treats_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    pets.add_pet(NewPet::ownerless("Goldie", "Fish", 1)).unwrap();
    pets.add_pet(NewPet::ownerless("100%", "Other", 1)).unwrap();
    owners
        .add_owner(&OwnerData::new("Anna_Lee", Vec::new()))
        .unwrap();
    owners
        .add_owner(&OwnerData::new("AnnaXLee", Vec::new()))
        .unwrap();

    let by_type = pets.search_pets("fish").unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].name, "Goldie");

    let literal = pets.search_pets("%").unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].name, "100%");

    let owners_found = owners.search_owners("a_l").unwrap();
    assert_eq!(owners_found.len(), 1);
    assert_eq!(owners_found[0].name, "Anna_Lee");
}

#[test]
fn mixed_workload_keeps_ownership_invariant() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();

    let alice = owners
        .add_owner(&OwnerData::new("Alice", Vec::new()))
        .unwrap();
    let bob = owners.add_owner(&OwnerData::new("Bob", Vec::new())).unwrap();
    let rex = pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).unwrap();
    let tom = pets
        .add_pet(NewPet::owned_by("Tom", "Cat", 5, "Bob"))
        .unwrap();
    let pip = pets
        .add_pet(NewPet::owned_by("Pip", "Bird", 1, "Alice"))
        .unwrap();
    assert!(ownership_violations(&conn).unwrap().is_empty());

    pets.adopt_pet(rex.id, "Alice").unwrap();
    assert!(ownership_violations(&conn).unwrap().is_empty());

    let moved = PetData {
        owner_name: Some("Alice".to_string()),
        ..tom.clone()
    };
    pets.update_pet(&moved).unwrap();
    assert!(ownership_violations(&conn).unwrap().is_empty());

    owners.update_owner(&alice.renamed("Alicia")).unwrap();
    assert!(ownership_violations(&conn).unwrap().is_empty());

    let _ = pets.adopt_pet(pip.id, "Bob").unwrap_err();
    let _ = pets.delete_pet(pip.id).unwrap_err();
    assert!(ownership_violations(&conn).unwrap().is_empty());

    owners.delete_owner(alice.id).unwrap();
    assert!(ownership_violations(&conn).unwrap().is_empty());
    assert!(pets.list_pets().unwrap().iter().all(|pet| !pet.has_owner));

    pets.adopt_pet(pip.id, "Bob").unwrap();
    pets.delete_pet(rex.id).unwrap();
    let bob = owners.get_owner(bob.id).unwrap().unwrap();
    assert_eq!(bob.pet_ids().collect::<Vec<_>>(), vec![pip.id]);
    assert!(ownership_violations(&conn).unwrap().is_empty());
}

#[test]
fn search_folds_case_beyond_ascii() {
    let conn = open_db_in_memory().unwrap();
    let pets = SqlitePetRepository::try_new(&conn).unwrap();
    let owners = SqliteOwnerRepository::try_new(&conn).unwrap();
    pets.add_pet(NewPet::ownerless("Élodie", "Cat", 4)).unwrap();
    pets.add_pet(NewPet::ownerless("Rex", "Dog", 3)).unwrap();
    owners
        .add_owner(&OwnerData::new("Émile", Vec::new()))
        .unwrap();

    for query in ["élodie", "ÉLODIE", "lodi"] {
        let found = pets.search_pets(query).unwrap();
        assert_eq!(found.len(), 1, "query {query:?}");
        assert_eq!(found[0].name, "Élodie");
    }

    let found = owners.search_owners("ÉMI").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Émile");
}
