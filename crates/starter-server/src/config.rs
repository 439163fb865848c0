//! Server configuration: CLI flags and environment, layered over an optional YAML file

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use starter_core::{ArchiveTimestamp, CatalogSource, ExtensionCatalog, TemplateSource};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_CATALOG: &str = "catalog/extensions.yaml";
const DEFAULT_TEMPLATES: &str = "templates";
const DEFAULT_ENVIRONMENT: &str = "dev";
const DEFAULT_GIT_COMMIT_ID: &str = "unknown";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output (development)
    #[default]
    Pretty,
    /// One JSON object per line (production)
    Json,
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "code-starter")]
#[command(about = "Serves starter project archives generated from the extension catalog")]
#[command(version)]
pub struct CliArgs {
    /// YAML configuration file; flags and environment variables take precedence
    #[arg(long, env = "CODE_STARTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "CODE_STARTER_BIND")]
    pub bind: Option<SocketAddr>,

    /// Extension catalog: local YAML path or http(s) URL
    #[arg(long, env = "CODE_STARTER_CATALOG")]
    pub catalog: Option<String>,

    /// Codestart templates: local directory or http(s) base URL serving bundle.zip
    #[arg(long, env = "CODE_STARTER_TEMPLATES")]
    pub templates: Option<String>,

    /// Environment name reported by /api/config
    #[arg(long, env = "CODE_STARTER_ENVIRONMENT")]
    pub environment: Option<String>,

    #[arg(long, env = "CODE_STARTER_GIT_COMMIT_ID")]
    pub git_commit_id: Option<String>,

    #[arg(long, env = "CODE_STARTER_GA_TRACKING_ID")]
    pub ga_tracking_id: Option<String>,

    #[arg(long, env = "CODE_STARTER_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,

    /// Feature flags exposed to the frontend (comma-separated)
    #[arg(long, env = "CODE_STARTER_FEATURES", value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Modification time for archive entries (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS),
    /// at least one day in the past
    #[arg(long, env = "CODE_STARTER_ARCHIVE_TIMESTAMP")]
    pub archive_timestamp: Option<ArchiveTimestamp>,

    #[arg(long, env = "CODE_STARTER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Settings accepted in the YAML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    bind: Option<SocketAddr>,
    catalog: Option<String>,
    templates: Option<String>,
    environment: Option<String>,
    git_commit_id: Option<String>,
    ga_tracking_id: Option<String>,
    sentry_dsn: Option<String>,
    features: Option<Vec<String>>,
    archive_timestamp: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub catalog: CatalogSource,
    pub templates: TemplateSource,
    pub environment: String,
    pub git_commit_id: String,
    pub ga_tracking_id: Option<String>,
    pub sentry_dsn: Option<String>,
    pub features: Vec<String>,
    pub archive_timestamp: ArchiveTimestamp,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let file_config = match args.config.as_deref() {
            Some(path) => load_config_file(path)?,
            None => PartialConfig::default(),
        };

        let bind = match args.bind.or(file_config.bind) {
            Some(bind) => bind,
            None => DEFAULT_BIND.parse().context("Invalid default bind address")?,
        };

        let catalog: CatalogSource = args
            .catalog
            .or(file_config.catalog)
            .unwrap_or_else(|| DEFAULT_CATALOG.to_string())
            .parse()?;

        let templates: TemplateSource = args
            .templates
            .or(file_config.templates)
            .unwrap_or_else(|| DEFAULT_TEMPLATES.to_string())
            .parse()?;

        let archive_timestamp = match (args.archive_timestamp, file_config.archive_timestamp) {
            (Some(timestamp), _) => timestamp,
            (None, Some(raw)) => raw
                .parse::<ArchiveTimestamp>()
                .map_err(|e| anyhow::anyhow!("Invalid archive_timestamp in config file: {}", e))?,
            (None, None) => ArchiveTimestamp::default(),
        };
        let archive_timestamp = archive_timestamp
            .ensure_in_past(Utc::now().naive_utc())
            .map_err(anyhow::Error::msg)?;

        let mut features: Vec<String> = args
            .features
            .or(file_config.features)
            .unwrap_or_default()
            .into_iter()
            .map(|feature| feature.trim().to_string())
            .filter(|feature| !feature.is_empty())
            .collect();
        features.sort();
        features.dedup();

        Ok(Self {
            bind,
            catalog,
            templates,
            environment: args
                .environment
                .or(file_config.environment)
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            git_commit_id: args
                .git_commit_id
                .or(file_config.git_commit_id)
                .unwrap_or_else(|| DEFAULT_GIT_COMMIT_ID.to_string()),
            ga_tracking_id: non_blank(args.ga_tracking_id.or(file_config.ga_tracking_id)),
            sentry_dsn: non_blank(args.sentry_dsn.or(file_config.sentry_dsn)),
            features,
            archive_timestamp,
        })
    }

    /// The public subset served by `/api/config`
    pub fn public_config(&self, catalog: &ExtensionCatalog) -> PublicConfig {
        PublicConfig {
            environment: self.environment.clone(),
            git_commit_id: self.git_commit_id.clone(),
            ga_tracking_id: self.ga_tracking_id.clone(),
            sentry_dsn: self.sentry_dsn.clone(),
            quarkus_version: catalog.platform_version().to_string(),
            features: self.features.clone(),
        }
    }
}

/// Configuration safe to expose to browsers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub environment: String,
    pub git_commit_id: String,
    pub ga_tracking_id: Option<String>,
    #[serde(rename = "sentryDSN")]
    pub sentry_dsn: Option<String>,
    pub quarkus_version: String,
    pub features: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
