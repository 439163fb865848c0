//! HTTP API for downloading generated starter projects
//!
//! Endpoints:
//! - `GET /api/download` (alias `GET /d`), `POST /api/download`: project zip
//! - `GET /api/config`: public configuration
//! - `GET /api/extensions`: the extension catalog

pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod routes;

use anyhow::{Context, Result};
use starter_core::generator::check_compatibility;
use starter_core::{ExtensionCatalog, ProjectService, TemplateBundle, TemplateProjectGenerator};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use config::{CliArgs, LogFormat, PublicConfig, ServerConfig};
pub use error::{ApiError, ErrorResponse};
pub use extract::{DefinitionJson, DefinitionQuery};
pub use logging::init_logging;
pub use routes::{create_router, AppState};

/// Load the catalog and templates, then build the shared application state
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let catalog = ExtensionCatalog::load(&config.catalog)
        .await
        .with_context(|| format!("Failed to load extension catalog from {}", config.catalog))?;
    let bundle = TemplateBundle::load(&config.templates, starter_core::USER_AGENT)
        .await
        .with_context(|| format!("Failed to load templates from {}", config.templates))?;

    if let Some(warning) = check_compatibility(catalog.platform_version(), &bundle.manifest().version)
    {
        tracing::warn!("{}", warning);
    }

    let public_config = config.public_config(&catalog);
    let service = ProjectService::new(
        Arc::new(catalog),
        Arc::new(TemplateProjectGenerator::new(bundle)),
    )
    .with_timestamp(config.archive_timestamp);

    Ok(AppState::new(service, public_config))
}

/// Serve until Ctrl+C or SIGTERM
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let state = build_state(&config).await?;
    let router = create_router(state);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    tracing::info!(
        bind = %config.bind,
        environment = %config.environment,
        catalog = %config.catalog,
        templates = %config.templates,
        "code-starter listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("code-starter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
