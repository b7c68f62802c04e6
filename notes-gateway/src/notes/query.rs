use notes_db::{Note, NoteRepository};
use tracing::debug;

use super::params::ListParams;
use super::{NotesService, PageMeta};
use crate::error::{ApiError, ApiResult};

/// One page of a user's notes, most recently updated first
#[derive(Debug, Clone)]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub meta: PageMeta,
}

fn matches_text(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
        || note.tags.join(" ").to_lowercase().contains(needle)
}

/// Apply flag, tag and text filters, then sort by `updated_at` descending.
///
/// The sort is stable so equal timestamps keep their input order.
pub fn filter_notes(notes: Vec<Note>, params: &ListParams) -> Vec<Note> {
    let needle = params.q.as_ref().map(|q| q.to_lowercase());

    let mut notes: Vec<Note> = notes
        .into_iter()
        .filter(|n| params.pinned.is_none_or(|pinned| n.pinned == pinned))
        .filter(|n| params.archived.is_none_or(|archived| n.archived == archived))
        .filter(|n| params.tag.as_ref().is_none_or(|tag| n.tags.contains(tag)))
        .filter(|n| needle.as_deref().is_none_or(|q| matches_text(n, q)))
        .collect();

    notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    notes
}

/// Slice out page `page` (1-based) of size `limit`.
pub fn paginate(notes: Vec<Note>, page: usize, limit: usize) -> NotesPage {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = notes.len();
    let total_pages = total.div_ceil(limit).max(1);
    let offset = (page - 1).saturating_mul(limit);

    let notes: Vec<Note> = notes.into_iter().skip(offset).take(limit).collect();

    NotesPage {
        notes,
        meta: PageMeta {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        },
    }
}

impl NotesService {
    pub async fn list_notes(&self, user_id: &str, params: &ListParams) -> ApiResult<NotesPage> {
        let owned = NoteRepository::list_for_user(&self.db, user_id).await?;
        let filtered = filter_notes(owned, params);
        let page = paginate(filtered, params.page, params.limit);
        debug!(
            "Listed page {}/{} ({} total) for user: {}",
            page.meta.page, page.meta.total_pages, page.meta.total, user_id
        );
        Ok(page)
    }

    /// Fetch a note owned by `user_id`.
    pub async fn get_note(&self, user_id: &str, note_id: &str) -> ApiResult<Note> {
        NoteRepository::get_by_id(&self.db, note_id)
            .await?
            .filter(|note| note.is_owned_by(user_id))
            .ok_or_else(|| ApiError::not_found("Note not found"))
    }
}
