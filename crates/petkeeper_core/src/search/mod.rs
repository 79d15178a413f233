//! Search entry points for pets and owners.
//!
//! # Responsibility
//! - Run case-insensitive substring queries against storage.
//! - Coalesce rapid query text changes before re-querying.
//!
//! # Invariants
//! - Blank query text always means "all records".
//! - User text is matched literally; `%` and `_` carry no wildcard meaning.

pub mod debounce;
pub mod query;
