//! Owner record and snapshot.

use crate::model::pet::{PetData, PetId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable owner identifier.
pub type OwnerId = Uuid;

/// Stored owner record with its ordered pet reference collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    /// Linked pets in collection order.
    pub pets: Vec<PetId>,
}

impl Owner {
    pub fn contains(&self, pet_id: PetId) -> bool {
        self.pets.contains(&pet_id)
    }
}

/// Immutable owner snapshot exchanged with the presentation layer.
///
/// When used as input to `add_owner`, `pets` lists the pets the new owner
/// should take; only their ids are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerData {
    pub id: OwnerId,
    pub name: String,
    #[serde(default)]
    pub pets: Vec<PetData>,
}

impl OwnerData {
    /// New owner snapshot with a generated id.
    pub fn new(name: impl Into<String>, pets: Vec<PetData>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pets,
        }
    }

    /// Same owner under a different name, as sent by an edit dialog.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn pet_ids(&self) -> impl Iterator<Item = PetId> + '_ {
        self.pets.iter().map(|pet| pet.id)
    }
}
