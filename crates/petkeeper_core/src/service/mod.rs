//! Async use-case services facing the presentation layer.
//!
//! # Responsibility
//! - Run repository calls on the blocking pool, off the caller's task.
//! - Publish list state on current-value streams and status text on a
//!   fire-and-forget notice stream.
//! - Turn every failure into a one-line message; nothing structured leaves.
//!
//! # Invariants
//! - Only the owning service writes its state streams.
//! - Lists are refreshed with the current search text after each success.

use crate::db::{DbError, Store};
use crate::repo::RepoError;
use log::error;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::broadcast;

pub mod owner_service;
pub mod pet_service;

const NOTICE_CAPACITY: usize = 32;

/// Outcome of one service operation, mirrored on the notice stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub ok: bool,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Failure of a background storage call.
#[derive(Debug)]
pub(crate) enum ServiceError {
    Repo(RepoError),
    /// The blocking task panicked or was cancelled.
    Background(String),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Background(message) => write!(f, "background task failed: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Background(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl ServiceError {
    fn repo(&self) -> Option<&RepoError> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Background(_) => None,
        }
    }

    /// Short cause text for "Error <verb> <entity>: <cause>" messages.
    fn cause(&self) -> String {
        match self.repo() {
            Some(RepoError::PetNotFound(_)) => "Pet not found".to_string(),
            Some(RepoError::OwnerNotFound(_)) | Some(RepoError::OwnerNameNotFound(_)) => {
                "Owner not found".to_string()
            }
            Some(RepoError::Db(DbError::Closed)) => "Database is closed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Runs `op` against the store on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(store: &Arc<Store>, op: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, RepoError> + Send + 'static,
{
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || store.with_connection(op)).await {
        Ok(result) => Ok(result?),
        Err(join_error) => {
            error!(
                "event=background_task module=service status=error error_code=join_failed error={}",
                join_error
            );
            Err(ServiceError::Background(join_error.to_string()))
        }
    }
}

/// Fire-and-forget status message stream.
#[derive(Debug, Clone)]
pub(crate) struct Notices {
    tx: broadcast::Sender<String>,
}

impl Notices {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Publishes the notice text; missing subscribers are not an error.
    pub(crate) fn publish(&self, notice: Notice) -> Notice {
        let _ = self.tx.send(notice.message.clone());
        notice
    }
}
