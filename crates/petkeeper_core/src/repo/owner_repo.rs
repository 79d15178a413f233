//! Owner repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, rename and delete owners together with their pet collections.
//! - Cascade renames into the `owner_name` cache on pets.
//!
//! # Invariants
//! - Renames never produce two owners with case-insensitively equal names.
//! - Deleting an owner releases its pets; pets are never deleted with it.

use super::rows::{
    find_other_owner_named, find_owner_by_name, link_pet, load_owner, load_pet, owner_snapshot,
    save_pet,
};
use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::owner::{OwnerData, OwnerId};
use crate::search::query::{search_owners, SearchText};
use log::info;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for owner operations.
pub trait OwnerRepository {
    /// Creates an owner and takes every listed pet that exists.
    fn add_owner(&self, owner: &OwnerData) -> RepoResult<OwnerData>;
    /// Renames an owner and repairs cached owner names on pets.
    fn update_owner(&self, owner: &OwnerData) -> RepoResult<OwnerData>;
    /// Releases the owner's pets and deletes the owner.
    fn delete_owner(&self, id: OwnerId) -> RepoResult<()>;
    fn get_owner(&self, id: OwnerId) -> RepoResult<Option<OwnerData>>;
    /// Exact, case-sensitive name lookup used by pet operations.
    fn find_owner_by_name(&self, name: &str) -> RepoResult<Option<OwnerData>>;
    fn list_owners(&self) -> RepoResult<Vec<OwnerData>>;
    /// Case-insensitive substring match on name; blank returns all.
    fn search_owners(&self, text: &str) -> RepoResult<Vec<OwnerData>>;
}

/// SQLite-backed owner repository.
pub struct SqliteOwnerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOwnerRepository<'conn> {
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

impl OwnerRepository for SqliteOwnerRepository<'_> {
    fn add_owner(&self, owner: &OwnerData) -> RepoResult<OwnerData> {
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO owners (uuid, name) VALUES (?1, ?2);",
            params![owner.id.to_string(), owner.name.as_str()],
        )?;

        let mut taken = 0usize;
        for pet_id in owner.pet_ids() {
            let Some(mut pet) = load_pet(&tx, pet_id)? else {
                continue;
            };
            pet.assign_owner(owner.name.as_str());
            save_pet(&tx, &pet)?;
            link_pet(&tx, owner.id, pet.id)?;
            taken += 1;
        }

        let created = owner_snapshot(&tx, owner.id, owner.name.clone())?;
        tx.commit()?;

        info!(
            "event=owner_add module=repo status=ok owner_id={} pets={taken}",
            owner.id
        );
        Ok(created)
    }

    fn update_owner(&self, owner: &OwnerData) -> RepoResult<OwnerData> {
        if find_other_owner_named(self.conn, &owner.name, owner.id)?.is_some() {
            return Err(RepoError::DuplicateOwnerName(owner.name.clone()));
        }

        let tx = self.begin()?;
        let current = load_owner(&tx, owner.id)?.ok_or(RepoError::OwnerNotFound(owner.id))?;
        let old_name = current.name;

        tx.execute(
            "UPDATE owners
             SET name = ?1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![owner.name.as_str(), owner.id.to_string()],
        )?;

        for pet_id in &current.pets {
            if let Some(mut pet) = load_pet(&tx, *pet_id)? {
                pet.assign_owner(owner.name.as_str());
                save_pet(&tx, &pet)?;
            }
        }

        // Cache repair: lookup-only pets naming the old owner. Pets linked to
        // another owner that shares the old name keep it.
        let repaired = tx.execute(
            "UPDATE pets
             SET owner_name = ?1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE owner_name = ?2
               AND uuid NOT IN (
                   SELECT pet_uuid FROM owner_pets WHERE owner_uuid != ?3
               );",
            params![owner.name.as_str(), old_name.as_str(), owner.id.to_string()],
        )?;

        let updated = owner_snapshot(&tx, owner.id, owner.name.clone())?;
        tx.commit()?;

        info!(
            "event=owner_update module=repo status=ok owner_id={} cascaded={} repaired={repaired}",
            owner.id,
            current.pets.len()
        );
        Ok(updated)
    }

    fn delete_owner(&self, id: OwnerId) -> RepoResult<()> {
        let tx = self.begin()?;
        let owner = load_owner(&tx, id)?.ok_or(RepoError::OwnerNotFound(id))?;

        for pet_id in &owner.pets {
            if let Some(mut pet) = load_pet(&tx, *pet_id)? {
                pet.clear_owner();
                save_pet(&tx, &pet)?;
            }
        }
        tx.execute(
            "DELETE FROM owner_pets WHERE owner_uuid = ?1;",
            [id.to_string()],
        )?;
        tx.execute("DELETE FROM owners WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;

        info!(
            "event=owner_delete module=repo status=ok owner_id={id} released={}",
            owner.pets.len()
        );
        Ok(())
    }

    fn get_owner(&self, id: OwnerId) -> RepoResult<Option<OwnerData>> {
        match load_owner(self.conn, id)? {
            Some(owner) => Ok(Some(owner_snapshot(self.conn, owner.id, owner.name)?)),
            None => Ok(None),
        }
    }

    fn find_owner_by_name(&self, name: &str) -> RepoResult<Option<OwnerData>> {
        match find_owner_by_name(self.conn, name)? {
            Some(owner) => Ok(Some(owner_snapshot(self.conn, owner.id, owner.name)?)),
            None => Ok(None),
        }
    }

    fn list_owners(&self) -> RepoResult<Vec<OwnerData>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name
             FROM owners
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut owners = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let id = parse_uuid(&uuid_text, "owners.uuid")?;
            owners.push(owner_snapshot(self.conn, id, row.get("name")?)?);
        }
        Ok(owners)
    }

    fn search_owners(&self, text: &str) -> RepoResult<Vec<OwnerData>> {
        match SearchText::parse(text) {
            Some(query) => search_owners(self.conn, &query),
            None => self.list_owners(),
        }
    }
}
