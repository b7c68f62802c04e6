//! JSON document store: an in-memory mirror of one file on disk.
//!
//! The whole document is loaded once when the store is opened and rewritten
//! after every mutation. Writes are best-effort: if the file cannot be
//! written the store keeps serving from memory and logs a warning.
//!
//! File IO runs on the blocking pool. The document lock stays held until the
//! write lands so files never go out of order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::notes::Note;
use crate::users::User;

/// Current layout version written to `meta.version`
pub const STORE_VERSION: u32 = 1;

/// Layout metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self {
            version: default_version(),
        }
    }
}

fn default_version() -> u32 {
    STORE_VERSION
}

/// The persisted document: every user and every note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub meta: StoreMeta,
}

/// Handle to the notes store. Cheap to clone; all clones share one document.
#[derive(Debug, Clone)]
pub struct NotesDb {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    document: Mutex<StoreDocument>,
}

impl NotesDb {
    /// Open the store backed by `path`.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file
    /// is logged and also starts an empty store; the next mutation will
    /// overwrite it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Opening notes store at: {}", path.display());

        let document = match read_document(&path) {
            Ok(Some(document)) => {
                info!(
                    "Loaded {} users and {} notes",
                    document.users.len(),
                    document.notes.len()
                );
                document
            }
            Ok(None) => {
                info!("No store file yet, starting empty");
                StoreDocument::default()
            }
            Err(e) => {
                warn!(
                    "Failed to read store file, continuing with in-memory data: {}",
                    e
                );
                StoreDocument::default()
            }
        };

        Self::from_document(Some(path), document)
    }

    /// Create a store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::from_document(None, StoreDocument::default())
    }

    fn from_document(path: Option<PathBuf>, document: StoreDocument) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                document: Mutex::new(document),
            }),
        }
    }

    /// Backing file path, if any
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Clone of the current in-memory document
    pub async fn snapshot(&self) -> StoreDocument {
        self.inner.document.lock().await.clone()
    }

    /// Write the current document to disk, reporting failures.
    pub async fn flush(&self) -> DbResult<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        let document = self.inner.document.lock().await;
        write_document(path.to_path_buf(), &document).await?;
        debug!("Flushed notes store to {}", path.display());
        Ok(())
    }

    /// Run a read-only closure against the document.
    pub(crate) async fn read<R>(&self, f: impl FnOnce(&StoreDocument) -> R) -> R {
        let document = self.inner.document.lock().await;
        f(&document)
    }

    /// Run a mutation and persist the document while still holding the lock.
    pub(crate) async fn mutate<R>(&self, f: impl FnOnce(&mut StoreDocument) -> R) -> R {
        let mut document = self.inner.document.lock().await;
        let result = f(&mut document);
        self.persist(&document).await;
        result
    }

    /// Like [`NotesDb::mutate`], but the closure returns `None` when it
    /// changed nothing, in which case no write happens.
    pub(crate) async fn try_mutate<R>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> Option<R>,
    ) -> Option<R> {
        let mut document = self.inner.document.lock().await;
        let result = f(&mut document)?;
        self.persist(&document).await;
        Some(result)
    }

    async fn persist(&self, document: &StoreDocument) {
        let Some(path) = self.path() else {
            return;
        };
        if let Err(e) = write_document(path.to_path_buf(), document).await {
            warn!(
                "Failed to write store file (running in-memory only): {}",
                e
            );
        }
    }
}

fn read_document(path: &Path) -> DbResult<Option<StoreDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let document: StoreDocument = serde_json::from_str(&raw)?;
    if document.meta.version != STORE_VERSION {
        warn!(
            "Store file has layout version {} (expected {})",
            document.meta.version, STORE_VERSION
        );
    }
    Ok(Some(document))
}

/// Encode under the caller's lock, then hand the file work to the blocking pool.
async fn write_document(path: PathBuf, document: &StoreDocument) -> DbResult<()> {
    let content = serde_json::to_string_pretty(document)?;
    tokio::task::spawn_blocking(move || write_content(&path, &content))
        .await
        .map_err(std::io::Error::other)??;
    Ok(())
}

fn write_content(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{NewNote, NoteRepository};
    use crate::users::UserRepository;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = NotesDb::open(dir.path().join("store.json"));

        let doc = db.snapshot().await;
        assert!(doc.users.is_empty());
        assert!(doc.notes.is_empty());
        assert_eq!(doc.meta.version, STORE_VERSION);
        // Nothing is written until the first mutation
        assert!(!dir.path().join("store.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let db = NotesDb::open(&path);
        assert!(db.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn test_partial_document_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"users": []}"#).unwrap();

        let db = NotesDb::open(&path);
        let doc = db.snapshot().await;
        assert!(doc.notes.is_empty());
        assert_eq!(doc.meta.version, 1);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let db = NotesDb::open(&path);
        let user = UserRepository::create(&db, "a@example.com", "digest", "a")
            .await
            .unwrap();
        let note = NoteRepository::create(
            &db,
            NewNote {
                user_id: user.id.clone(),
                title: "First".to_string(),
                content: "body".to_string(),
                tags: vec!["work".to_string()],
                pinned: true,
                archived: false,
            },
        )
        .await
        .unwrap();

        assert!(path.exists());
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"passwordHash\": \"digest\""));
        assert!(raw.contains("\"userId\""));
        assert!(raw.contains("\"version\": 1"));

        let reopened = NotesDb::open(&path);
        let doc = reopened.snapshot().await;
        assert_eq!(doc.users, vec![user]);
        assert_eq!(doc.notes, vec![note]);
    }

    #[tokio::test]
    async fn test_unwritable_path_keeps_serving_from_memory() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail
        let path = dir.path().join("store.json");
        fs::create_dir_all(&path).unwrap();

        let db = NotesDb::open(&path);
        let user = UserRepository::create(&db, "a@example.com", "digest", "a")
            .await
            .unwrap();

        let found = UserRepository::get_by_id(&db, &user.id).await.unwrap();
        assert_eq!(found, Some(user));
        assert!(db.flush().await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_flush_is_noop() {
        let db = NotesDb::in_memory();
        assert!(db.path().is_none());
        db.flush().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_all_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let db = NotesDb::open(&path);

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    NoteRepository::create(
                        &db,
                        NewNote {
                            user_id: "u1".to_string(),
                            title: format!("note {i}"),
                            content: String::new(),
                            tags: Vec::new(),
                            pinned: false,
                            archived: false,
                        },
                    )
                    .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // The last write on disk carries every note
        let reopened = NotesDb::open(&path);
        assert_eq!(reopened.snapshot().await.notes.len(), 20);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
