//! Registration, login and token resolution.

use notes_db::{NotesDb, UserProfile, UserRepository};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::password::CredentialHasher;
use super::token::TokenSigner;
use crate::error::{ApiError, ApiResult};

const MIN_PASSWORD_LEN: usize = 6;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Coerced body of `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl RegisterRequest {
    pub fn from_json(body: &Value) -> ApiResult<Self> {
        let email = body
            .get("email")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::validation("Email is required"))?;

        let password = body
            .get("password")
            .and_then(Value::as_str)
            .filter(|p| p.chars().count() >= MIN_PASSWORD_LEN)
            .ok_or_else(|| ApiError::validation("Password must be at least 6 characters"))?;

        let name = body
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
            name,
        })
    }

    /// Display name, defaulting to the part of the email before the first `@`.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.email.split('@').next().unwrap_or_default().to_string(),
        }
    }
}

/// Coerced body of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_json(body: &Value) -> ApiResult<Self> {
        let field = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        match (field("email"), field("password")) {
            (Some(email), Some(password)) => Ok(Self { email, password }),
            _ => Err(ApiError::validation("Email and password are required")),
        }
    }
}

/// Token plus public projection, returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Identity attached to every authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct IdentityService {
    db: NotesDb,
    signer: TokenSigner,
    hasher: CredentialHasher,
}

impl IdentityService {
    pub fn new(db: NotesDb, signer: TokenSigner, hasher: CredentialHasher) -> Self {
        Self { db, signer, hasher }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    fn issue(&self, user_id: &str, email: &str) -> ApiResult<String> {
        self.signer.sign(user_id, email).map_err(ApiError::internal)
    }

    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthSession> {
        // Early conflict check skips hashing; the repository re-checks under the lock
        if UserRepository::find_by_email(&self.db, &request.email)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let name = request.display_name();
        let digest = self.hasher.hash(request.password).await?;
        let user = UserRepository::create(&self.db, &request.email, &digest, &name).await?;

        let token = self.issue(&user.id, &user.email)?;
        info!("Registered user: {}", user.id);
        Ok(AuthSession {
            token,
            user: user.profile(),
        })
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthSession> {
        let Some(user) = UserRepository::find_by_email(&self.db, &request.email).await? else {
            debug!("Login rejected: unknown email");
            return Err(ApiError::auth(INVALID_CREDENTIALS));
        };

        if !self
            .hasher
            .verify(request.password, user.password_hash.clone())
            .await
        {
            debug!("Login rejected: bad password for user {}", user.id);
            return Err(ApiError::auth(INVALID_CREDENTIALS));
        }

        let token = self.issue(&user.id, &user.email)?;
        info!("User logged in: {}", user.id);
        Ok(AuthSession {
            token,
            user: user.profile(),
        })
    }

    /// Resolve a bearer token to the user it was issued for.
    pub async fn verify(&self, token: Option<&str>) -> ApiResult<AuthenticatedUser> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::auth("Missing Authorization token"))?;

        let claims = self.signer.verify(token).map_err(|e| {
            debug!("Token rejected: {}", e);
            ApiError::auth("Invalid or expired token")
        })?;

        let user = UserRepository::get_by_id(&self.db, &claims.sub)
            .await?
            .ok_or_else(|| ApiError::auth("Invalid token user"))?;

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }

    pub async fn profile(&self, user_id: &str) -> ApiResult<UserProfile> {
        UserRepository::get_by_id(&self.db, user_id)
            .await?
            .map(|user| user.profile())
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}
