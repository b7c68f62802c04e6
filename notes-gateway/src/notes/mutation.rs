use notes_db::{Note, NoteChanges, NoteRepository};
use serde::Serialize;
use tracing::{info, warn};

use super::NotesService;
use super::params::NoteDraft;
use crate::error::{ApiError, ApiResult};

/// Payload returned by a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedNote {
    pub id: String,
}

impl NotesService {
    pub async fn create_note(&self, user_id: &str, draft: NoteDraft) -> ApiResult<Note> {
        let note = NoteRepository::create(&self.db, draft.into_new_note(user_id)).await?;
        Ok(note)
    }

    /// Apply a validated patch to a note owned by `user_id`.
    ///
    /// An empty patch still refreshes `updated_at`.
    pub async fn update_note(
        &self,
        user_id: &str,
        note_id: &str,
        changes: NoteChanges,
    ) -> ApiResult<Note> {
        self.get_note(user_id, note_id).await?;

        NoteRepository::update(&self.db, note_id, changes)
            .await?
            .ok_or_else(|| ApiError::not_found("Note not found"))
    }

    pub async fn delete_note(&self, user_id: &str, note_id: &str) -> ApiResult<DeletedNote> {
        self.get_note(user_id, note_id).await?;

        if !NoteRepository::delete(&self.db, note_id).await? {
            warn!("Note {} vanished between ownership check and delete", note_id);
            return Err(ApiError::Storage("Failed to delete note".to_string()));
        }

        info!("User {} deleted note {}", user_id, note_id);
        Ok(DeletedNote {
            id: note_id.to_string(),
        })
    }
}
