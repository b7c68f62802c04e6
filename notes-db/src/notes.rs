//! Note records and their storage operations.
//!
//! Ownership is not enforced here; callers compare `Note::user_id` with the
//! authenticated identity before mutating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::store::NotesDb;
use crate::timestamp::timestamp_now;

/// Note record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
}

impl Note {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Fields for a note about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub archived: bool,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
    pub archived: Option<bool>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        if let Some(pinned) = self.pinned {
            note.pinned = pinned;
        }
        if let Some(archived) = self.archived {
            note.archived = archived;
        }
    }
}

/// Note repository for store operations
pub struct NoteRepository;

impl NoteRepository {
    /// Create a note with a fresh id; `created_at == updated_at`.
    pub async fn create(db: &NotesDb, new: NewNote) -> DbResult<Note> {
        let now = timestamp_now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            content: new.content,
            tags: new.tags,
            created_at: now,
            updated_at: now,
            pinned: new.pinned,
            archived: new.archived,
        };
        let note = Self::insert(db, note).await?;
        info!("Created note: {} for user: {}", note.id, note.user_id);
        Ok(note)
    }

    /// Append a fully formed note as-is (timestamps included).
    pub async fn insert(db: &NotesDb, note: Note) -> DbResult<Note> {
        let inserted = db
            .mutate(|doc| {
                doc.notes.push(note.clone());
                note
            })
            .await;
        Ok(inserted)
    }

    /// Get note by ID, regardless of owner
    pub async fn get_by_id(db: &NotesDb, id: &str) -> DbResult<Option<Note>> {
        Ok(db
            .read(|doc| doc.notes.iter().find(|n| n.id == id).cloned())
            .await)
    }

    /// All notes of one user, in store insertion order
    pub async fn list_for_user(db: &NotesDb, user_id: &str) -> DbResult<Vec<Note>> {
        let notes: Vec<Note> = db
            .read(|doc| {
                doc.notes
                    .iter()
                    .filter(|n| n.is_owned_by(user_id))
                    .cloned()
                    .collect()
            })
            .await;
        debug!("Loaded {} notes for user: {}", notes.len(), user_id);
        Ok(notes)
    }

    /// Apply `changes` and refresh `updated_at`. Returns `None` if no note
    /// has that id.
    pub async fn update(db: &NotesDb, id: &str, changes: NoteChanges) -> DbResult<Option<Note>> {
        let updated = db
            .try_mutate(|doc| {
                let note = doc.notes.iter_mut().find(|n| n.id == id)?;
                changes.apply(note);
                note.updated_at = timestamp_now();
                Some(note.clone())
            })
            .await;

        if updated.is_some() {
            info!("Updated note: {}", id);
        }
        Ok(updated)
    }

    /// Remove a note. Returns whether a row was removed.
    pub async fn delete(db: &NotesDb, id: &str) -> DbResult<bool> {
        let removed = db
            .try_mutate(|doc| {
                let before = doc.notes.len();
                doc.notes.retain(|n| n.id != id);
                (doc.notes.len() != before).then_some(())
            })
            .await
            .is_some();

        if removed {
            info!("Deleted note: {}", id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_db;

    fn new_note(user_id: &str, title: &str) -> NewNote {
        NewNote {
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: String::new(),
            tags: Vec::new(),
            pinned: false,
            archived: false,
        }
    }

    #[tokio::test]
    async fn test_create_stamps_equal_timestamps() {
        let db = create_test_db();
        let note = NoteRepository::create(&db, new_note("u1", "Hello"))
            .await
            .unwrap();

        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.user_id, "u1");

        let fetched = NoteRepository::get_by_id(&db, &note.id).await.unwrap();
        assert_eq!(fetched, Some(note));
    }

    #[tokio::test]
    async fn test_list_for_user_keeps_insertion_order() {
        let db = create_test_db();
        let a = NoteRepository::create(&db, new_note("u1", "A")).await.unwrap();
        NoteRepository::create(&db, new_note("u2", "other")).await.unwrap();
        let b = NoteRepository::create(&db, new_note("u1", "B")).await.unwrap();

        let notes = NoteRepository::list_for_user(&db, "u1").await.unwrap();
        let ids: Vec<_> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str()]);
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let db = create_test_db();
        let mut draft = new_note("u1", "Title");
        draft.content = "keep me".to_string();
        let note = NoteRepository::create(&db, draft).await.unwrap();

        let changes = NoteChanges {
            pinned: Some(true),
            tags: Some(vec!["x".to_string()]),
            ..Default::default()
        };
        let updated = NoteRepository::update(&db, &note.id, changes)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Title");
        assert_eq!(updated.content, "keep me");
        assert!(updated.pinned);
        assert_eq!(updated.tags, vec!["x".to_string()]);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_note() {
        let db = create_test_db();
        let result = NoteRepository::update(&db, "nope", NoteChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = create_test_db();
        let note = NoteRepository::create(&db, new_note("u1", "Bye")).await.unwrap();

        assert!(NoteRepository::delete(&db, &note.id).await.unwrap());
        assert!(!NoteRepository::delete(&db, &note.id).await.unwrap());
        assert!(NoteRepository::get_by_id(&db, &note.id).await.unwrap().is_none());
    }

    #[test]
    fn test_note_json_layout() {
        let raw = r#"{
            "id": "n1",
            "userId": "u1",
            "title": "T",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z"
        }"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.content, "");
        assert!(note.tags.is_empty());
        assert!(!note.pinned && !note.archived);

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["updatedAt"], "2024-05-01T10:00:00.000Z");
    }

    #[test]
    fn test_empty_changes() {
        assert!(NoteChanges::default().is_empty());
        let changes = NoteChanges {
            archived: Some(false),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
