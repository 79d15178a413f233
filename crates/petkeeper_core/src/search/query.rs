//! Substring queries over pets and owners.
//!
//! Both sides are folded with the connection's `casefold` function, so
//! matching ignores case beyond ASCII.

use crate::model::owner::OwnerData;
use crate::model::pet::PetData;
use crate::repo::rows::{collect_pets, owner_snapshot, PET_SELECT_SQL};
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::Connection;

/// Non-blank, trimmed search text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText(String);

impl SearchText {
    /// Returns `None` for blank input, which callers treat as "no filter".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn like_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.0.to_lowercase()))
    }
}

/// Pets whose name or type contains the text, ordered by name.
pub fn search_pets(conn: &Connection, query: &SearchText) -> RepoResult<Vec<PetData>> {
    collect_pets(
        conn,
        &format!(
            "{PET_SELECT_SQL}
             WHERE casefold(name) LIKE ?1 ESCAPE '\\'
                OR casefold(pet_type) LIKE ?1 ESCAPE '\\'
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ),
        [query.like_pattern()],
    )
}

/// Owners whose name contains the text, ordered by name.
pub fn search_owners(conn: &Connection, query: &SearchText) -> RepoResult<Vec<OwnerData>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, name
         FROM owners
         WHERE casefold(name) LIKE ?1 ESCAPE '\\'
         ORDER BY name COLLATE NOCASE ASC, uuid ASC;",
    )?;
    let mut rows = stmt.query([query.like_pattern()])?;
    let mut owners = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        let id = parse_uuid(&uuid_text, "owners.uuid")?;
        owners.push(owner_snapshot(conn, id, row.get("name")?)?);
    }
    Ok(owners)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_like, SearchText};

    #[test]
    fn blank_text_is_no_filter() {
        assert!(SearchText::parse("").is_none());
        assert!(SearchText::parse(" \t ").is_none());
        assert_eq!(SearchText::parse(" rex ").unwrap().as_str(), "rex");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(SearchText::parse("a%").unwrap().like_pattern(), "%a\\%%");
    }
}
