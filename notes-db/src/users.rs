//! User records and lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::store::NotesDb;
use crate::timestamp::timestamp_now;

/// User record as stored, including the password digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user; never carries the password digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// User repository for store operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user.
    ///
    /// The email is kept as supplied; uniqueness is checked
    /// case-insensitively under the store lock.
    pub async fn create(
        db: &NotesDb,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            created_at: timestamp_now(),
        };

        let created = db
            .try_mutate(|doc| {
                if doc.users.iter().any(|u| same_email(&u.email, email)) {
                    return None;
                }
                doc.users.push(user.clone());
                Some(user)
            })
            .await
            .ok_or_else(|| DbError::EmailTaken(email.to_string()))?;

        info!("Created new user: {}", created.id);
        Ok(created)
    }

    /// Find a user by email, ignoring case
    pub async fn find_by_email(db: &NotesDb, email: &str) -> DbResult<Option<User>> {
        let user = db
            .read(|doc| doc.users.iter().find(|u| same_email(&u.email, email)).cloned())
            .await;
        debug!("Email lookup matched: {}", user.is_some());
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(db: &NotesDb, id: &str) -> DbResult<Option<User>> {
        Ok(db
            .read(|doc| doc.users.iter().find(|u| u.id == id).cloned())
            .await)
    }
}
