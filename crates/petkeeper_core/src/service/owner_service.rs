//! Owner screen use-cases.

use super::{run_blocking, Notice, Notices, ServiceError};
use crate::config::AppConfig;
use crate::db::Store;
use crate::model::owner::{OwnerData, OwnerId};
use crate::repo::owner_repo::{OwnerRepository, SqliteOwnerRepository};
use crate::repo::RepoError;
use crate::search::debounce::run_debounced;
use log::{info, warn};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, watch};

/// Owner-facing service. Construct with [`OwnerService::start`].
pub struct OwnerService {
    store: Arc<Store>,
    owners: watch::Sender<Vec<OwnerData>>,
    query: watch::Sender<String>,
    notices: Notices,
}

impl OwnerService {
    /// Loads the owner list and starts the debounced search pipeline.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(store: Arc<Store>, config: &AppConfig) -> Arc<Self> {
        let (owners, _) = watch::channel(Vec::new());
        let (query, query_rx) = watch::channel(String::new());
        let service = Arc::new(Self {
            store,
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
                        service.reload(text).await;
                    }
                }
            },
        ));
        service
    }

    /// Current-value stream of the (filtered) owner list.
    pub fn owners(&self) -> watch::Receiver<Vec<OwnerData>> {
        self.owners.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<String> {
        self.notices.subscribe()
    }

    pub fn search_query(&self) -> String {
        self.query.borrow().clone()
    }

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

    pub async fn refresh(&self) {
        self.reload(self.search_query()).await;
    }

    /// Creates the owner and hands it every listed pet that still exists.
    pub async fn add_owner(&self, owner: OwnerData) -> Notice {
        let result = run_blocking(&self.store, move |conn| {
            SqliteOwnerRepository::try_new(conn)?.add_owner(&owner)
        })
        .await;
        match result {
            Ok(created) => {
                info!(
                    "event=owner_add module=service status=ok owner_id={} pets={}",
                    created.id,
                    created.pets.len()
                );
                self.refresh().await;
                self.notices.publish(Notice::success("Owner added successfully"))
            }
            Err(err) => self.fail(
                "owner_add",
                format!("Error adding owner: {}", err.cause()),
                &err,
            ),
        }
    }

    /// Renames the owner, cascading the name to its pets.
    pub async fn update_owner(&self, owner: OwnerData) -> Notice {
        let result = run_blocking(&self.store, move |conn| {
            SqliteOwnerRepository::try_new(conn)?.update_owner(&owner)
        })
        .await;
        match result {
            Ok(_) => {
                self.refresh().await;
                self.notices.publish(Notice::success("Owner updated successfully"))
            }
            Err(err) => {
                let message = match err.repo() {
                    Some(RepoError::DuplicateOwnerName(_)) => {
                        "An owner with this name already exists".to_string()
                    }
                    _ => format!("Error updating owner: {}", err.cause()),
                };
                self.fail("owner_update", message, &err)
            }
        }
    }

    /// Deletes the owner; its pets become ownerless.
    pub async fn delete_owner(&self, id: OwnerId) -> Notice {
        let result = run_blocking(&self.store, move |conn| {
            SqliteOwnerRepository::try_new(conn)?.delete_owner(id)
        })
        .await;
        match result {
            Ok(()) => {
                self.refresh().await;
                self.notices.publish(Notice::success("Owner deleted successfully"))
            }
            Err(err) => self.fail(
                "owner_delete",
                format!("Error deleting owner: {}", err.cause()),
                &err,
            ),
        }
    }

    async fn reload(&self, text: String) {
        let result = run_blocking(&self.store, move |conn| {
            SqliteOwnerRepository::try_new(conn)?.search_owners(&text)
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
