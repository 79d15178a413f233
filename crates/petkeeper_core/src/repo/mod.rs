//! Repository layer: the pet/owner consistency manager.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for pets and owners.
//! - Keep the owner pet collection and the cached `owner_name` in step.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every mutating operation runs in exactly one `BEGIN IMMEDIATE`
//!   transaction; an error anywhere rolls the whole operation back.
//! - `owner_pets` is the ownership source of truth; a pet has at most one row.
//! - Repository APIs return semantic errors in addition to DB errors.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::owner::OwnerId;
use crate::model::pet::PetId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod audit;
pub mod owner_repo;
pub mod pet_repo;
pub(crate) mod rows;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pet/owner persistence and business rules.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    PetNotFound(PetId),
    OwnerNotFound(OwnerId),
    /// No owner has exactly this name.
    OwnerNameNotFound(String),
    /// Owned pets must be released before deletion.
    PetHasOwner(PetId),
    /// Adoption is not a transfer; the pet already belongs to `owner_name`.
    PetAlreadyOwned {
        pet_id: PetId,
        owner_name: String,
    },
    /// The owner's collection already contains the pet.
    DuplicateAdoption {
        pet_id: PetId,
        owner_name: String,
    },
    /// Another owner already uses this name (case-insensitive).
    DuplicateOwnerName(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::PetNotFound(id) => write!(f, "pet not found: {id}"),
            Self::OwnerNotFound(id) => write!(f, "owner not found: {id}"),
            Self::OwnerNameNotFound(_) => write!(f, "owner not found by name"),
            Self::PetHasOwner(id) => write!(f, "pet {id} has an owner and cannot be deleted"),
            Self::PetAlreadyOwned { pet_id, .. } => {
                write!(f, "pet {pet_id} already has an owner")
            }
            Self::DuplicateAdoption { pet_id, .. } => {
                write!(f, "pet {pet_id} is already in the owner's collection")
            }
            Self::DuplicateOwnerName(_) => write!(f, "an owner with this name already exists"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
