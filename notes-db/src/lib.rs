//! notes-db: JSON file storage for the notes organizer.
//!
//! This crate provides:
//! - The persisted document (users, notes, layout metadata)
//! - User registration lookups with case-insensitive email uniqueness
//! - Note create/read/update/delete without ownership policy

pub mod error;
pub mod notes;
pub mod store;
pub mod timestamp;
pub mod users;

// Re-export commonly used types
pub use error::{DbError, DbResult};
pub use notes::{NewNote, Note, NoteChanges, NoteRepository};
pub use store::{NotesDb, STORE_VERSION, StoreDocument, StoreMeta};
pub use timestamp::timestamp_now;
pub use users::{User, UserProfile, UserRepository};

// Re-export test helpers when running tests or when test-helpers feature is enabled
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
