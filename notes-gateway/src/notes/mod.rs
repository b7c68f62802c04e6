//! Per-user notes: listing with search, filters and pagination, plus
//! ownership-checked create/update/delete.

mod mutation;
mod params;
mod query;

use notes_db::NotesDb;
use serde::Serialize;

pub use mutation::DeletedNote;
pub use params::{
    DEFAULT_PAGE_SIZE, ListParams, MAX_PAGE_SIZE, NoteDraft, normalize_tags, parse_flag,
    parse_flag_str, parse_note_draft, parse_note_patch,
};
pub use query::{NotesPage, filter_notes, paginate};

/// Pagination summary attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Query and mutation operations over one store.
///
/// Every operation takes the authenticated user id; notes owned by anyone
/// else behave as if they did not exist.
#[derive(Debug, Clone)]
pub struct NotesService {
    db: NotesDb,
}

impl NotesService {
    pub fn new(db: NotesDb) -> Self {
        Self { db }
    }
}
