//! Shared row mapping and link-table statements.
//!
//! Every function takes `&Connection` so it can run on a plain connection
//! or inside an open transaction (via deref).

use super::{bool_to_int, parse_uuid, RepoError, RepoResult};
use crate::model::owner::{Owner, OwnerData, OwnerId};
use crate::model::pet::{Pet, PetData, PetId};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

pub(crate) const PET_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    pet_type,
    age,
    has_owner,
    owner_name
FROM pets";

pub(crate) fn parse_pet_row(row: &Row<'_>) -> RepoResult<Pet> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "pets.uuid")?;

    let age_value: i64 = row.get("age")?;
    let age = u32::try_from(age_value)
        .map_err(|_| RepoError::InvalidData(format!("invalid age `{age_value}` in pets.age")))?;

    let has_owner = match row.get::<_, i64>("has_owner")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid has_owner value `{other}` in pets.has_owner"
            )));
        }
    };

    Ok(Pet {
        id,
        name: row.get("name")?,
        pet_type: row.get("pet_type")?,
        age,
        has_owner,
        owner_name: row.get("owner_name")?,
    })
}

pub(crate) fn collect_pets(
    conn: &Connection,
    sql: &str,
    bind: impl Params,
) -> RepoResult<Vec<PetData>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(bind)?;
    let mut pets = Vec::new();
    while let Some(row) = rows.next()? {
        pets.push(PetData::from(parse_pet_row(row)?));
    }
    Ok(pets)
}

pub(crate) fn load_pet(conn: &Connection, id: PetId) -> RepoResult<Option<Pet>> {
    let mut stmt = conn.prepare(&format!("{PET_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_pet_row(row)?));
    }
    Ok(None)
}

pub(crate) fn insert_pet(conn: &Connection, pet: &Pet) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO pets (
            uuid,
            name,
            pet_type,
            age,
            has_owner,
            owner_name
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            pet.id.to_string(),
            pet.name.as_str(),
            pet.pet_type.as_str(),
            i64::from(pet.age),
            bool_to_int(pet.has_owner),
            pet.owner_name.as_deref(),
        ],
    )?;
    Ok(())
}

pub(crate) fn save_pet(conn: &Connection, pet: &Pet) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE pets
         SET
            name = ?1,
            pet_type = ?2,
            age = ?3,
            has_owner = ?4,
            owner_name = ?5,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE uuid = ?6;",
        params![
            pet.name.as_str(),
            pet.pet_type.as_str(),
            i64::from(pet.age),
            bool_to_int(pet.has_owner),
            pet.owner_name.as_deref(),
            pet.id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(RepoError::PetNotFound(pet.id));
    }
    Ok(())
}

/// Finds the first owner whose name matches exactly.
pub(crate) fn find_owner_by_name(conn: &Connection, name: &str) -> RepoResult<Option<Owner>> {
    let uuid_text: Option<String> = conn
        .query_row(
            "SELECT uuid
             FROM owners
             WHERE name = ?1
             ORDER BY created_at ASC, rowid ASC
             LIMIT 1;",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    match uuid_text {
        Some(text) => load_owner(conn, parse_uuid(&text, "owners.uuid")?),
        None => Ok(None),
    }
}

/// Finds an owner other than `exclude` whose name matches case-insensitively.
pub(crate) fn find_other_owner_named(
    conn: &Connection,
    name: &str,
    exclude: OwnerId,
) -> RepoResult<Option<OwnerId>> {
    let uuid_text: Option<String> = conn
        .query_row(
            "SELECT uuid
             FROM owners
             WHERE casefold(name) = casefold(?1)
               AND uuid != ?2
             LIMIT 1;",
            params![name, exclude.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    uuid_text
        .map(|text| parse_uuid(&text, "owners.uuid"))
        .transpose()
}

pub(crate) fn load_owner(conn: &Connection, id: OwnerId) -> RepoResult<Option<Owner>> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM owners WHERE uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    let Some(name) = name else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT pet_uuid
         FROM owner_pets
         WHERE owner_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut pets = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        pets.push(parse_uuid(&text, "owner_pets.pet_uuid")?);
    }

    Ok(Some(Owner { id, name, pets }))
}

/// Builds the owner snapshot with pet snapshots in collection order.
pub(crate) fn owner_snapshot(
    conn: &Connection,
    id: OwnerId,
    name: String,
) -> RepoResult<OwnerData> {
    let owner_text = id.to_string();
    let pets = collect_pets(
        conn,
        "SELECT
            p.uuid AS uuid,
            p.name AS name,
            p.pet_type AS pet_type,
            p.age AS age,
            p.has_owner AS has_owner,
            p.owner_name AS owner_name
         FROM owner_pets op
         JOIN pets p ON p.uuid = op.pet_uuid
         WHERE op.owner_uuid = ?1
         ORDER BY op.position ASC;",
        [owner_text],
    )?;
    Ok(OwnerData { id, name, pets })
}

/// Appends `pet_id` to the owner's collection, moving it out of any other.
pub(crate) fn link_pet(conn: &Connection, owner_id: OwnerId, pet_id: PetId) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM owner_pets WHERE pet_uuid = ?1;",
        [pet_id.to_string()],
    )?;
    conn.execute(
        "INSERT INTO owner_pets (owner_uuid, pet_uuid, position)
         SELECT ?1, ?2, COALESCE(MAX(position) + 1, 0)
         FROM owner_pets
         WHERE owner_uuid = ?1;",
        params![owner_id.to_string(), pet_id.to_string()],
    )?;
    Ok(())
}

/// Removes `pet_id` from the owner's collection. Returns whether a row went.
pub(crate) fn unlink_pet(conn: &Connection, owner_id: OwnerId, pet_id: PetId) -> RepoResult<bool> {
    let removed = conn.execute(
        "DELETE FROM owner_pets WHERE owner_uuid = ?1 AND pet_uuid = ?2;",
        params![owner_id.to_string(), pet_id.to_string()],
    )?;
    Ok(removed > 0)
}
