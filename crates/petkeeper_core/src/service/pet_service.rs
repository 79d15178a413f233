//! Pet screen use-cases.
//!
//! # Responsibility
//! - Expose pet add/edit/delete/adopt as async calls returning a [`Notice`].
//! - Keep the pet list (filtered by the debounced search text) and the owner
//!   picker list up to date.

use super::{run_blocking, Notice, Notices, ServiceError};
use crate::config::AppConfig;
use crate::db::Store;
use crate::model::owner::OwnerData;
use crate::model::pet::{NewPet, PetData, PetId};
use crate::model::pet_type::{default_pet_types, PetTypeOption};
use crate::repo::owner_repo::{OwnerRepository, SqliteOwnerRepository};
use crate::repo::pet_repo::{PetRepository, SqlitePetRepository};
use crate::repo::RepoError;
use crate::search::debounce::run_debounced;
use log::{info, warn};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, watch};

const DELETE_OWNED_MESSAGE: &str =
    "Cannot delete this pet because it has an owner. Please remove owner association first.";

/// Pet-facing service. Construct with [`PetService::start`].
pub struct PetService {
    store: Arc<Store>,
    pets: watch::Sender<Vec<PetData>>,
    owners: watch::Sender<Vec<OwnerData>>,
    query: watch::Sender<String>,
    notices: Notices,
}

impl PetService {
    /// Loads the initial lists and starts the debounced search pipeline.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(store: Arc<Store>, config: &AppConfig) -> Arc<Self> {
        let (pets, _) = watch::channel(Vec::new());
        let (owners, _) = watch::channel(Vec::new());
        let (query, query_rx) = watch::channel(String::new());
        let service = Arc::new(Self {
            store,
            pets,
            owners,
            query,
            notices: Notices::new(),
        });

        service.refresh().await;

        let weak: Weak<Self> = Arc::downgrade(&service);
        tokio::spawn(run_debounced(
            query_rx,
            config.search_debounce(),
            move |text| {
                let service = weak.upgrade();
                async move {
                    if let Some(service) = service {
                        service.reload_pets(text).await;
                    }
                }
            },
        ));
        service
    }

    /// Current-value stream of the (filtered) pet list.
    pub fn pets(&self) -> watch::Receiver<Vec<PetData>> {
        self.pets.subscribe()
    }

    /// Current-value stream of all owners, for owner pickers.
    pub fn owners(&self) -> watch::Receiver<Vec<OwnerData>> {
        self.owners.subscribe()
    }

    /// Fire-and-forget status messages.
    pub fn notices(&self) -> broadcast::Receiver<String> {
        self.notices.subscribe()
    }

    pub fn pet_types(&self) -> Vec<PetTypeOption> {
        default_pet_types()
    }

    pub fn search_query(&self) -> String {
        self.query.borrow().clone()
    }

    /// Replaces the search text; the list follows after the quiet period.
    pub fn set_search_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.query.send_if_modified(|current| {
            if *current == text {
                return false;
            }
            *current = text;
            true
        });
    }

    /// Re-reads pets (with the current search text) and owners.
    pub async fn refresh(&self) {
        self.reload_pets(self.search_query()).await;
        self.reload_owners().await;
    }

    pub async fn add_pet(&self, input: NewPet) -> Notice {
        let result = run_blocking(&self.store, move |conn| {
            SqlitePetRepository::try_new(conn)?.add_pet(input)
        })
        .await;
        match result {
            Ok(pet) => {
                info!("event=pet_add module=service status=ok pet_id={}", pet.id);
                self.refresh().await;
                self.notices.publish(Notice::success("Pet added successfully"))
            }
            Err(err) => self.fail("pet_add", format!("Error adding pet: {}", err.cause()), &err),
        }
    }

    pub async fn update_pet(&self, pet: PetData) -> Notice {
        let result = run_blocking(&self.store, move |conn| {
            SqlitePetRepository::try_new(conn)?.update_pet(&pet)
        })
        .await;
        match result {
            Ok(()) => {
                self.refresh().await;
                self.notices.publish(Notice::success("Pet updated successfully"))
            }
            Err(err) => self.fail(
                "pet_update",
                format!("Error updating pet: {}", err.cause()),
                &err,
            ),
        }
    }

    pub async fn delete_pet(&self, id: PetId) -> Notice {
        let result = run_blocking(&self.store, move |conn| {
            SqlitePetRepository::try_new(conn)?.delete_pet(id)
        })
        .await;
        match result {
            Ok(()) => {
                self.refresh().await;
                self.notices.publish(Notice::success("Pet deleted successfully."))
            }
            Err(err) => {
                let message = match err.repo() {
                    Some(RepoError::PetNotFound(_)) => "Pet not found.".to_string(),
                    Some(RepoError::PetHasOwner(_)) => DELETE_OWNED_MESSAGE.to_string(),
                    _ => format!("Error deleting pet: {}", err.cause()),
                };
                self.fail("pet_delete", message, &err)
            }
        }
    }

    pub async fn adopt_pet(&self, id: PetId, owner_name: impl Into<String>) -> Notice {
        let owner_name = owner_name.into();
        let result = run_blocking(&self.store, move |conn| {
            SqlitePetRepository::try_new(conn)?.adopt_pet(id, &owner_name)
        })
        .await;
        match result {
            Ok(()) => {
                self.refresh().await;
                self.notices.publish(Notice::success("Pet adopted successfully"))
            }
            Err(err) => {
                let message = match err.repo() {
                    Some(RepoError::PetAlreadyOwned { owner_name, .. }) => {
                        format!("Pet already adopted by {owner_name}")
                    }
                    Some(RepoError::DuplicateAdoption { .. }) => {
                        "You already adopted this pet".to_string()
                    }
                    Some(RepoError::OwnerNameNotFound(_))
                    | Some(RepoError::PetNotFound(_))
                    | Some(RepoError::OwnerNotFound(_)) => err.cause(),
                    _ => format!("Error during adoption: {}", err.cause()),
                };
                self.fail("pet_adopt", message, &err)
            }
        }
    }

    async fn reload_pets(&self, text: String) {
        let result = run_blocking(&self.store, move |conn| {
            SqlitePetRepository::try_new(conn)?.search_pets(&text)
        })
        .await;
        match result {
            Ok(pets) => {
                self.pets.send_replace(pets);
            }
            Err(err) => warn!(
                "event=pet_load module=service status=error error={}",
                err
            ),
        }
    }

    async fn reload_owners(&self) {
        let result = run_blocking(&self.store, |conn| {
            SqliteOwnerRepository::try_new(conn)?.list_owners()
        })
        .await;
        match result {
            Ok(owners) => {
                self.owners.send_replace(owners);
            }
            Err(err) => warn!(
                "event=owner_load module=service status=error error={}",
                err
            ),
        }
    }

    fn fail(&self, event: &str, message: String, err: &ServiceError) -> Notice {
        warn!("event={event} module=service status=error error={err}");
        self.notices.publish(Notice::failure(message))
    }
}
