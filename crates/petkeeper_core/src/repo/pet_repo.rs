//! Pet repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, edit, delete and adopt pets while keeping the owning owner's
//!   collection in step with the cached `owner_name`.
//!
//! # Invariants
//! - Each operation commits all of its writes or none of them.
//! - Only ownerless pets can be deleted.
//! - Adoption never transfers a pet between owners; edits do.

use super::rows::{
    collect_pets, find_owner_by_name, insert_pet, link_pet, load_pet, save_pet, unlink_pet,
    PET_SELECT_SQL,
};
use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::pet::{NewPet, Pet, PetData, PetId};
use crate::search::query::{search_pets, SearchText};
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Repository interface for pet operations.
pub trait PetRepository {
    /// Creates a pet and links it to the named owner when that owner exists.
    fn add_pet(&self, input: NewPet) -> RepoResult<PetData>;
    /// Overwrites a pet's fields, moving it between owner collections when
    /// the owner name changes.
    fn update_pet(&self, pet: &PetData) -> RepoResult<()>;
    /// Deletes an ownerless pet.
    fn delete_pet(&self, id: PetId) -> RepoResult<()>;
    /// Gives an ownerless pet to the owner called `owner_name`.
    fn adopt_pet(&self, id: PetId, owner_name: &str) -> RepoResult<()>;
    fn get_pet(&self, id: PetId) -> RepoResult<Option<PetData>>;
    fn list_pets(&self) -> RepoResult<Vec<PetData>>;
    /// Case-insensitive substring match on name or type; blank returns all.
    fn search_pets(&self, text: &str) -> RepoResult<Vec<PetData>>;
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePetRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl PetRepository for SqlitePetRepository<'_> {
    fn add_pet(&self, input: NewPet) -> RepoResult<PetData> {
        let pet = Pet::new(input);
        let tx = self.begin()?;
        insert_pet(&tx, &pet)?;

        let mut linked = false;
        if let Some(owner_name) = pet.owner_name.as_deref().filter(|_| pet.has_owner) {
            if let Some(owner) = find_owner_by_name(&tx, owner_name)? {
                link_pet(&tx, owner.id, pet.id)?;
                linked = true;
            }
        }
        tx.commit()?;

        if pet.has_owner && !linked {
            // Tolerated: the pet keeps its owner fields until an edit repairs it.
            warn!(
                "event=pet_add module=repo status=orphan pet_id={} reason=owner_unresolved",
                pet.id
            );
        }
        info!(
            "event=pet_add module=repo status=ok pet_id={} linked={linked}",
            pet.id
        );
        Ok(pet.snapshot())
    }

    fn update_pet(&self, snapshot: &PetData) -> RepoResult<()> {
        let tx = self.begin()?;
        let mut pet = load_pet(&tx, snapshot.id)?.ok_or(RepoError::PetNotFound(snapshot.id))?;

        let old_owner = pet.owner_name.clone().filter(|_| pet.has_owner);
        let new_owner = snapshot.target_owner();
        if old_owner.as_deref() != new_owner {
            if let Some(old_name) = old_owner.as_deref() {
                match find_owner_by_name(&tx, old_name)? {
                    Some(owner) => {
                        unlink_pet(&tx, owner.id, pet.id)?;
                    }
                    None => warn!(
                        "event=pet_update module=repo status=skip pet_id={} side=old_owner",
                        pet.id
                    ),
                }
            }
            if let Some(new_name) = new_owner {
                match find_owner_by_name(&tx, new_name)? {
                    Some(owner) => link_pet(&tx, owner.id, pet.id)?,
                    None => warn!(
                        "event=pet_update module=repo status=skip pet_id={} side=new_owner",
                        pet.id
                    ),
                }
            }
        }

        pet.apply(snapshot);
        if new_owner.is_none() {
            pet.clear_owner();
        }
        save_pet(&tx, &pet)?;
        tx.commit()?;

        info!("event=pet_update module=repo status=ok pet_id={}", pet.id);
        Ok(())
    }

    fn delete_pet(&self, id: PetId) -> RepoResult<()> {
        let tx = self.begin()?;
        let pet = load_pet(&tx, id)?.ok_or(RepoError::PetNotFound(id))?;
        if pet.has_owner {
            return Err(RepoError::PetHasOwner(id));
        }
        tx.execute("DELETE FROM pets WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;

        info!("event=pet_delete module=repo status=ok pet_id={id}");
        Ok(())
    }

    fn adopt_pet(&self, id: PetId, owner_name: &str) -> RepoResult<()> {
        let tx = self.begin()?;
        let owner = find_owner_by_name(&tx, owner_name)?
            .ok_or_else(|| RepoError::OwnerNameNotFound(owner_name.to_string()))?;
        let mut pet = load_pet(&tx, id)?.ok_or(RepoError::PetNotFound(id))?;

        // Checked before `has_owner` so a repeated adoption reports the duplicate.
        if owner.contains(id) {
            return Err(RepoError::DuplicateAdoption {
                pet_id: id,
                owner_name: owner.name,
            });
        }
        if pet.has_owner {
            return Err(RepoError::PetAlreadyOwned {
                pet_id: id,
                owner_name: pet.owner_name.unwrap_or_default(),
            });
        }

        pet.assign_owner(owner.name.as_str());
        save_pet(&tx, &pet)?;
        link_pet(&tx, owner.id, pet.id)?;
        tx.commit()?;

        info!(
            "event=pet_adopt module=repo status=ok pet_id={id} owner_id={}",
            owner.id
        );
        Ok(())
    }

    fn get_pet(&self, id: PetId) -> RepoResult<Option<PetData>> {
        Ok(load_pet(self.conn, id)?.map(PetData::from))
    }

    fn list_pets(&self) -> RepoResult<Vec<PetData>> {
        collect_pets(
            self.conn,
            &format!("{PET_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"),
            (),
        )
    }

    fn search_pets(&self, text: &str) -> RepoResult<Vec<PetData>> {
        match SearchText::parse(text) {
            Some(query) => search_pets(self.conn, &query),
            None => self.list_pets(),
        }
    }
}
