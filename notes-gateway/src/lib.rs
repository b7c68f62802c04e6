//! HTTP gateway for the notes organizer: identity, note queries and
//! mutations, served over axum.

pub mod auth;
pub mod error;
pub mod notes;
pub mod response;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
