//! Where the extension catalog is read from

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::fs;
use url::Url;

/// Catalog source - either a remote URL or a local YAML file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Remote(Url),
    Local(PathBuf),
}

impl CatalogSource {
    /// Read the raw catalog document
    pub async fn fetch(&self) -> Result<String> {
        match self {
            CatalogSource::Remote(url) => {
                let client = reqwest::Client::builder()
                    .user_agent(crate::USER_AGENT)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new());
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch extension catalog from {}", url))?;

                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch extension catalog from {}: HTTP {}",
                        url,
                        response.status()
                    );
                }

                response
                    .text()
                    .await
                    .context("Failed to read extension catalog body")
            }
            CatalogSource::Local(path) => fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

impl FromStr for CatalogSource {
    type Err = anyhow::Error;

    /// `http://` and `https://` values are remote, anything else is a path
    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).with_context(|| format!("Invalid catalog URL: {}", s))?;
            Ok(Self::Remote(url))
        } else {
            Ok(Self::Local(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Remote(url) => write!(f, "{}", url),
            CatalogSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
