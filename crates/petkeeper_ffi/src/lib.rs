//! Flutter-facing bindings for PetKeeper.

pub mod api;
