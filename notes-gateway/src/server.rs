use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use notes_db::{Note, UserProfile};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::auth::{AuthSession, CurrentUser, LoginRequest, RegisterRequest};
use crate::error::{ApiError, ApiResult};
use crate::notes::{DeletedNote, ListParams, parse_note_draft, parse_note_patch};
use crate::response::Envelope;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub environment: String,
}

/// Run the HTTP server until Ctrl-C, then flush the store.
pub async fn run(state: Arc<AppState>, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, flushing notes store");
    state.db.flush().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/", get(health_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/users/me", get(me_handler))
        .route("/notes", get(list_notes_handler).post(create_note_handler))
        .route(
            "/notes/{id}",
            get(get_note_handler)
                .put(update_note_handler)
                .delete(delete_note_handler),
        )
        .fallback(fallback_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Unwrap a JSON body, reporting any parse failure as a validation error.
/// A request that carries no JSON at all reads as an empty object.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Object(Default::default())),
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection);
            Err(ApiError::validation("Invalid JSON body"))
        }
    }
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        message: "Service is healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: state.environment.clone(),
    })
}

async fn register_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<AuthSession>>)> {
    let request = RegisterRequest::from_json(&json_body(body)?)?;
    let session = state.identity.register(request).await?;
    Ok((StatusCode::CREATED, Json(Envelope::success(session))))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Envelope<AuthSession>>> {
    let request = LoginRequest::from_json(&json_body(body)?)?;
    let session = state.identity.login(request).await?;
    Ok(Json(Envelope::success(session)))
}

async fn me_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<UserProfile>>> {
    let profile = state.identity.profile(&user.id).await?;
    Ok(Json(Envelope::success(profile)))
}

async fn list_notes_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Envelope<Vec<Note>>>> {
    let params = ListParams::from_query(&query);
    let page = state.notes.list_notes(&user.id, &params).await?;
    Ok(Json(Envelope::success(page.notes).with_meta(page.meta)))
}

async fn create_note_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Note>>)> {
    let draft = parse_note_draft(&json_body(body)?)?;
    let note = state.notes.create_note(&user.id, draft).await?;
    Ok((StatusCode::CREATED, Json(Envelope::success(note))))
}

async fn get_note_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Note>>> {
    let note = state.notes.get_note(&user.id, &id).await?;
    Ok(Json(Envelope::success(note)))
}

async fn update_note_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Envelope<Note>>> {
    // Unknown or foreign notes answer 404 before the body is looked at
    state.notes.get_note(&user.id, &id).await?;

    let changes = parse_note_patch(&json_body(body)?)?;
    let note = state.notes.update_note(&user.id, &id, changes).await?;
    Ok(Json(Envelope::success(note)))
}

async fn delete_note_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<DeletedNote>>> {
    let deleted = state.notes.delete_note(&user.id, &id).await?;
    Ok(Json(Envelope::success(deleted)))
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found("Route not found")
}

async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(Envelope::<()>::error("method_not_allowed", "Method not allowed")),
    )
}
