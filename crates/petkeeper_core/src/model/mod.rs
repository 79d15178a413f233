//! Entity layer for pets and owners.
//!
//! # Responsibility
//! - Define the stored record shapes (`Pet`, `Owner`).
//! - Define immutable snapshots (`PetData`, `OwnerData`) handed across the
//!   storage/UI boundary.
//! - Hold the default pet-type catalog and input validation helpers.
//!
//! # Invariants
//! - Every record is identified by a stable UUID generated at creation.
//! - `Owner::pets` is the source of truth for ownership; `Pet::owner_name`
//!   is a display cache.

pub mod owner;
pub mod pet;
pub mod pet_type;
pub mod validate;
