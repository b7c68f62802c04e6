use notes_core::Config;
use notes_db::NotesDb;

use crate::auth::{CredentialHasher, IdentityService, TokenSigner};
use crate::notes::NotesService;

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    /// Registration, login and token verification
    pub identity: IdentityService,
    /// Note queries and mutations
    pub notes: NotesService,
    /// Deployment label reported by the health endpoint
    pub environment: String,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
    /// Store handle, kept for the shutdown flush
    pub db: NotesDb,
}

impl AppState {
    pub fn new(db: NotesDb, signer: TokenSigner, hasher: CredentialHasher) -> Self {
        Self {
            identity: IdentityService::new(db.clone(), signer, hasher),
            notes: NotesService::new(db.clone()),
            environment: "development".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            db,
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Open the configured store and wire every component to it.
    pub fn from_config(config: &Config) -> Self {
        let db = NotesDb::open(config.data_file());
        let signer = TokenSigner::from_secret(config.jwt_secret());

        Self::new(db, signer, CredentialHasher::default())
            .with_environment(config.settings.gateway.environment.clone())
            .with_cors_origins(config.settings.gateway.cors_origins.clone())
    }
}
