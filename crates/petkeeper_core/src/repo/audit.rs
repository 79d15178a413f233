//! Ownership consistency audit.
//!
//! Reports every pet that breaks the pairing between `owner_pets` and the
//! cached `has_owner`/`owner_name` fields. Read-only.

use super::rows::{collect_pets, PET_SELECT_SQL};
use super::{parse_uuid, RepoResult};
use crate::model::owner::OwnerId;
use crate::model::pet::PetId;
use rusqlite::{Connection, OptionalExtension};

/// One broken pet/owner pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipViolation {
    /// `has_owner` and `owner_name` disagree about presence.
    FlagMismatch(PetId),
    /// Pet claims an owner but sits in no collection.
    Unlinked(PetId),
    /// Pet sits in a collection but claims no owner.
    LinkedWithoutOwner { pet_id: PetId, owner_id: OwnerId },
    /// Cached name differs from the linked owner's name.
    StaleOwnerName { pet_id: PetId, owner_id: OwnerId },
}

/// Scans all pets and returns the violations found, in pet name order.
pub fn ownership_violations(conn: &Connection) -> RepoResult<Vec<OwnershipViolation>> {
    let pets = collect_pets(
        conn,
        &format!("{PET_SELECT_SQL} ORDER BY name ASC, uuid ASC;"),
        (),
    )?;

    let mut violations = Vec::new();
    for pet in pets {
        if pet.has_owner != pet.owner_name.is_some() {
            violations.push(OwnershipViolation::FlagMismatch(pet.id));
            continue;
        }

        let link: Option<(String, String)> = conn
            .query_row(
                "SELECT o.uuid, o.name
                 FROM owner_pets op
                 JOIN owners o ON o.uuid = op.owner_uuid
                 WHERE op.pet_uuid = ?1;",
                [pet.id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match (link, pet.owner_name.as_deref()) {
            (None, Some(_)) => violations.push(OwnershipViolation::Unlinked(pet.id)),
            (None, None) => {}
            (Some((owner_text, _)), None) => {
                violations.push(OwnershipViolation::LinkedWithoutOwner {
                    pet_id: pet.id,
                    owner_id: parse_uuid(&owner_text, "owners.uuid")?,
                });
            }
            (Some((owner_text, owner_name)), Some(cached)) => {
                if owner_name != cached {
                    violations.push(OwnershipViolation::StaleOwnerName {
                        pet_id: pet.id,
                        owner_id: parse_uuid(&owner_text, "owners.uuid")?,
                    });
                }
            }
        }
    }
    Ok(violations)
}
