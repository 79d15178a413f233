//! Default pet-type catalog shown by pickers.

use serde::{Deserialize, Serialize};

/// Category label plus the emoji used to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetTypeOption {
    pub label: String,
    pub emoji: String,
}

const DEFAULT_PET_TYPES: &[(&str, &str)] = &[
    ("Dog", "🐕"),
    ("Cat", "🐈"),
    ("Bird", "🦜"),
    ("Fish", "🐠"),
    ("Hamster", "🐹"),
    ("Rabbit", "🐰"),
    ("Other", "🐾"),
];

/// Returns the built-in categories in display order.
///
/// The list is a suggestion only; stored pets may carry any label.
pub fn default_pet_types() -> Vec<PetTypeOption> {
    DEFAULT_PET_TYPES
        .iter()
        .map(|(label, emoji)| PetTypeOption {
            label: (*label).to_string(),
            emoji: (*emoji).to_string(),
        })
        .collect()
}

/// Emoji for a known label (case-insensitive), falling back to "Other".
pub fn emoji_for(label: &str) -> &'static str {
    DEFAULT_PET_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(label.trim()))
        .or_else(|| DEFAULT_PET_TYPES.last())
        .map_or("🐾", |(_, emoji)| *emoji)
}
