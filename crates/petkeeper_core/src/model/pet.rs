//! Pet record and snapshot.
//!
//! # Invariants
//! - `id` is generated once and never reused.
//! - `owner_name` is `Some` exactly when `has_owner` is true, except for the
//!   tolerated orphan created by `add_pet` with an unknown owner name.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable pet identifier.
pub type PetId = Uuid;

/// Stored pet record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    /// Category label, usually one of [`crate::default_pet_types`].
    pub pet_type: String,
    pub age: u32,
    pub has_owner: bool,
    /// Denormalized copy of the owning owner's name.
    pub owner_name: Option<String>,
}

/// Creation input for [`crate::PetRepository::add_pet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub pet_type: String,
    pub age: u32,
    pub has_owner: bool,
    pub owner_name: Option<String>,
}

impl NewPet {
    /// Ownerless pet input.
    pub fn ownerless(name: impl Into<String>, pet_type: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            pet_type: pet_type.into(),
            age,
            has_owner: false,
            owner_name: None,
        }
    }

    /// Pet input that should be linked to the owner called `owner_name`.
    pub fn owned_by(
        name: impl Into<String>,
        pet_type: impl Into<String>,
        age: u32,
        owner_name: impl Into<String>,
    ) -> Self {
        Self {
            has_owner: true,
            owner_name: Some(owner_name.into()),
            ..Self::ownerless(name, pet_type, age)
        }
    }
}

impl Pet {
    /// Creates a pet record with a freshly generated id.
    pub fn new(input: NewPet) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            pet_type: input.pet_type,
            age: input.age,
            has_owner: input.has_owner,
            owner_name: input.owner_name,
        }
    }

    /// Marks the pet as owned by `owner_name`.
    pub fn assign_owner(&mut self, owner_name: impl Into<String>) {
        self.has_owner = true;
        self.owner_name = Some(owner_name.into());
    }

    /// Clears both ownership fields.
    pub fn clear_owner(&mut self) {
        self.has_owner = false;
        self.owner_name = None;
    }

    /// Copies the mutable fields of `snapshot` onto this record. `id` is kept.
    pub fn apply(&mut self, snapshot: &PetData) {
        self.name = snapshot.name.clone();
        self.pet_type = snapshot.pet_type.clone();
        self.age = snapshot.age;
        self.has_owner = snapshot.has_owner;
        self.owner_name = snapshot.owner_name.clone();
    }

    /// Immutable copy for callers outside the storage boundary.
    pub fn snapshot(&self) -> PetData {
        PetData::from(self.clone())
    }
}

/// Immutable pet snapshot exchanged with the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetData {
    pub id: PetId,
    pub name: String,
    pub pet_type: String,
    pub age: u32,
    pub has_owner: bool,
    pub owner_name: Option<String>,
}

impl PetData {
    /// Owner name with blank values treated as absent.
    pub fn target_owner(&self) -> Option<&str> {
        if !self.has_owner {
            return None;
        }
        self.owner_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

impl From<Pet> for PetData {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            name: pet.name,
            pet_type: pet.pet_type,
            age: pet.age,
            has_owner: pet.has_owner,
            owner_name: pet.owner_name,
        }
    }
}
