//! Test helpers for notes stores.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::notes::Note;
use crate::store::NotesDb;

/// Create an in-memory store for testing
pub fn create_test_db() -> NotesDb {
    NotesDb::in_memory()
}

/// Create a file-backed store at `dir/store.json`
pub fn create_test_db_in(dir: &Path) -> NotesDb {
    NotesDb::open(dir.join("store.json"))
}

/// Build a note with fixed timestamps, for ordering-sensitive tests
pub fn note_at(id: &str, user_id: &str, title: &str, updated_at: DateTime<Utc>) -> Note {
    Note {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        content: String::new(),
        tags: Vec::new(),
        created_at: updated_at,
        updated_at,
        pinned: false,
        archived: false,
    }
}
