//! Route definitions and request handlers

use crate::config::PublicConfig;
use crate::error::ApiError;
use crate::extract::{DefinitionJson, DefinitionQuery};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use starter_core::{ExtensionEntry, ProjectDefinition, ProjectService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: ProjectService,
    pub public_config: Arc<PublicConfig>,
}

impl AppState {
    pub fn new(service: ProjectService, public_config: PublicConfig) -> Self {
        Self {
            service,
            public_config: Arc::new(public_config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/download", get(download).post(download_json))
        .route("/d", get(download))
        .route("/api/config", get(public_config))
        .route("/api/extensions", get(extensions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/download` and `GET /d`
async fn download(
    State(state): State<AppState>,
    DefinitionQuery(params): DefinitionQuery,
) -> Result<Response, ApiError> {
    let definition = ProjectDefinition::from_params(params)?;
    archive_response(state, definition).await
}

/// `POST /api/download` with a JSON project definition
async fn download_json(
    State(state): State<AppState>,
    DefinitionJson(params): DefinitionJson,
) -> Result<Response, ApiError> {
    let definition = ProjectDefinition::from_params(params)?;
    archive_response(state, definition).await
}

async fn archive_response(
    state: AppState,
    definition: ProjectDefinition,
) -> Result<Response, ApiError> {
    let filename = format!("attachment; filename=\"{}.zip\"", definition.artifact_id);

    // Generation touches the filesystem synchronously
    let service = state.service.clone();
    let bytes = tokio::task::spawn_blocking(move || service.create(&definition)).await??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        bytes,
    )
        .into_response())
}

/// `GET /api/config`
async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.public_config.as_ref().clone())
}

/// `GET /api/extensions`
async fn extensions(State(state): State<AppState>) -> Json<Vec<ExtensionEntry>> {
    Json(state.service.catalog().extensions().to_vec())
}
