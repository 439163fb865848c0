//! Extension catalog: loading, lookups and short-id expansion
//!
//! The catalog is built once at startup and never mutated afterwards, so it
//! can be shared across request handlers behind an `Arc` without locking.

pub mod manifest;
pub mod source;

use crate::error::ProjectError;
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};

pub use manifest::{CatalogManifest, ExtensionEntry};
pub use source::CatalogSource;

/// Immutable, indexed view of the extension catalog
#[derive(Debug, Clone)]
pub struct ExtensionCatalog {
    platform_version: String,
    extensions: Vec<ExtensionEntry>,
    by_id: HashMap<String, usize>,
    by_short_id: HashMap<String, usize>,
    by_artifact_id: HashMap<String, usize>,
}

impl ExtensionCatalog {
    /// Index a parsed catalog document, rejecting duplicate ids
    pub fn from_manifest(manifest: CatalogManifest) -> Result<Self> {
        semver::Version::parse(&manifest.platform_version).with_context(|| {
            format!(
                "Invalid platform version in catalog: {}",
                manifest.platform_version
            )
        })?;

        let mut extensions = manifest.extensions;
        extensions.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        let mut by_id = HashMap::new();
        let mut by_short_id = HashMap::new();
        let mut by_artifact_id = HashMap::new();

        for (idx, entry) in extensions.iter().enumerate() {
            if by_id.insert(entry.id.clone(), idx).is_some() {
                anyhow::bail!("Duplicate extension id in catalog: {}", entry.id);
            }
            if by_short_id.insert(entry.short_id.clone(), idx).is_some() {
                anyhow::bail!("Duplicate short id in catalog: {}", entry.short_id);
            }
            // First entry wins when two groups publish the same artifact name
            by_artifact_id
                .entry(entry.artifact_id().to_string())
                .or_insert(idx);
        }

        Ok(Self {
            platform_version: manifest.platform_version,
            extensions,
            by_id,
            by_short_id,
            by_artifact_id,
        })
    }

    /// Parse and index a YAML catalog document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: CatalogManifest =
            serde_yaml::from_str(content).context("Failed to parse extension catalog")?;
        Self::from_manifest(manifest)
    }

    /// Load the catalog from a local file or remote URL
    pub async fn load(source: &CatalogSource) -> Result<Self> {
        let content = source.fetch().await?;
        let catalog = Self::from_yaml(&content)?;
        tracing::info!(
            source = %source,
            extensions = catalog.len(),
            platform_version = %catalog.platform_version,
            "extension catalog loaded"
        );
        Ok(catalog)
    }

    pub fn platform_version(&self) -> &str {
        &self.platform_version
    }

    /// All entries, in display order
    pub fn extensions(&self) -> &[ExtensionEntry] {
        &self.extensions
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ExtensionEntry> {
        self.by_id.get(id).map(|&idx| &self.extensions[idx])
    }

    pub fn get_by_short_id(&self, short_id: &str) -> Option<&ExtensionEntry> {
        self.by_short_id.get(short_id).map(|&idx| &self.extensions[idx])
    }

    /// Resolve an explicit id: fully qualified first, then bare artifact id
    pub fn resolve(&self, id: &str) -> Option<&ExtensionEntry> {
        self.get(id).or_else(|| {
            if id.contains(':') {
                None
            } else {
                self.by_artifact_id.get(id).map(|&idx| &self.extensions[idx])
            }
        })
    }

    /// Expand a dot-separated short-id string into fully qualified ids
    pub fn parse_short_extensions(&self, raw: &str) -> Result<BTreeSet<String>, ProjectError> {
        raw.split('.')
            .filter(|short_id| !short_id.is_empty())
            .map(|short_id| {
                self.get_by_short_id(short_id)
                    .map(|entry| entry.id.clone())
                    .ok_or_else(|| ProjectError::UnknownShortId(short_id.to_string()))
            })
            .collect()
    }

    /// Canonicalize explicit ids and short ids and return their union.
    ///
    /// Blank explicit ids are skipped; any unknown id fails the whole merge.
    pub fn check_and_merge(
        &self,
        extensions: &BTreeSet<String>,
        short_extensions: &str,
    ) -> Result<BTreeSet<String>, ProjectError> {
        let mut merged = BTreeSet::new();
        for id in extensions.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            let entry = self
                .resolve(id)
                .ok_or_else(|| ProjectError::UnknownExtension(id.to_string()))?;
            merged.insert(entry.id.clone());
        }
        merged.extend(self.parse_short_extensions(short_extensions)?);
        Ok(merged)
    }
}
