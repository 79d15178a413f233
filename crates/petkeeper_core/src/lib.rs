//! Core domain logic for PetKeeper.
//! This crate is the single source of truth for pet/owner ownership invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::AppConfig;
pub use db::{DbError, DbResult, Store};
pub use logging::{init_logging, logging_status, LogLevel};
pub use model::owner::{Owner, OwnerData, OwnerId};
pub use model::pet::{NewPet, Pet, PetData, PetId};
pub use model::pet_type::{default_pet_types, emoji_for, PetTypeOption};
pub use model::validate::{
    normalize_name, validate_owner_name, validate_pet_input, PetInput, ValidationError,
};
pub use repo::audit::{ownership_violations, OwnershipViolation};
pub use repo::owner_repo::{OwnerRepository, SqliteOwnerRepository};
pub use repo::pet_repo::{PetRepository, SqlitePetRepository};
pub use repo::{RepoError, RepoResult};
pub use search::debounce::{run_debounced, DEFAULT_DEBOUNCE};
pub use search::query::SearchText;
pub use service::owner_service::OwnerService;
pub use service::pet_service::PetService;
pub use service::Notice;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
