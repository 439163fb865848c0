//! Codestart bundle loading from a remote URL or a local directory
//!
//! Both sources go through a zip:
//! - Remote: fetches the pre-built `bundle.zip` from the base URL
//! - Local: packs the template folder into an in-memory zip, then reads it
//!
//! This keeps development and production on the same extraction path.

use super::manifest::BundleManifest;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Name of the manifest at the bundle root
pub const MANIFEST_FILE: &str = "template.yaml";

/// Name of the pre-built archive served by remote sources
pub const BUNDLE_ZIP: &str = "bundle.zip";

/// Template source - either remote URL or local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl FromStr for TemplateSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).with_context(|| format!("Invalid template URL: {}", s))?;
            Ok(Self::Remote(url))
        } else {
            Ok(Self::Local(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Remote(url) => write!(f, "{}", url),
            TemplateSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A fully loaded codestart bundle: manifest plus every template file
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    manifest: BundleManifest,
    /// Keyed by `<codestart>/<file>`
    files: HashMap<String, Vec<u8>>,
}

impl TemplateBundle {
    /// Load a bundle from its source
    pub async fn load(source: &TemplateSource, user_agent: &str) -> Result<Self> {
        let zip_bytes = match source {
            TemplateSource::Remote(base_url) => {
                let zip_url = build_url(base_url, BUNDLE_ZIP)?;
                let client = reqwest::Client::builder()
                    .user_agent(user_agent)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new());
                let response = client
                    .get(zip_url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch template bundle from {}", zip_url))?;

                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch template bundle from {}: HTTP {}",
                        zip_url,
                        response.status()
                    );
                }

                response.bytes().await?.to_vec()
            }
            TemplateSource::Local(path) => Self::build_local_zip(path)?,
        };

        let bundle = Self::from_zip(&zip_bytes)?;
        tracing::info!(
            source = %source,
            version = %bundle.manifest.version,
            codestarts = bundle.manifest.codestarts.len(),
            files = bundle.files.len(),
            "template bundle loaded"
        );
        Ok(bundle)
    }

    /// Pack a local template directory (reads the file lists from template.yaml)
    pub fn build_local_zip(template_dir: &Path) -> Result<Vec<u8>> {
        let manifest_path = template_dir.join(MANIFEST_FILE);
        let manifest_content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let manifest: BundleManifest = serde_yaml::from_str(&manifest_content)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

        let mut zip_buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            zip.start_file(MANIFEST_FILE, options)?;
            zip.write_all(manifest_content.as_bytes())?;

            for codestart in &manifest.codestarts {
                for file_path in &codestart.files {
                    let full_path = template_dir.join(&codestart.name).join(file_path);
                    if !full_path.exists() {
                        // Surfaces at generation time as a missing file
                        tracing::warn!(
                            codestart = %codestart.name,
                            file = %full_path.display(),
                            "template file listed in manifest not found"
                        );
                        continue;
                    }
                    let content = std::fs::read(&full_path)
                        .with_context(|| format!("Failed to read {}", full_path.display()))?;
                    zip.start_file(format!("{}/{}", codestart.name, file_path), options)?;
                    zip.write_all(&content)?;
                }
            }

            zip.finish()?;
        }

        Ok(zip_buffer)
    }

    /// Extract a bundle zip into memory
    pub fn from_zip(zip_bytes: &[u8]) -> Result<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(zip_bytes)).context("Failed to read template bundle zip")?;

        let mut files = HashMap::new();
        let mut manifest: Option<BundleManifest> = None;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;

            if name == MANIFEST_FILE {
                manifest = Some(
                    serde_yaml::from_slice(&contents)
                        .context("Failed to parse template bundle manifest")?,
                );
                continue;
            }

            files.insert(name, contents);
        }

        let manifest =
            manifest.ok_or_else(|| anyhow::anyhow!("Template bundle missing {}", MANIFEST_FILE))?;

        Ok(Self { manifest, files })
    }

    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }

    /// Raw content of a codestart file
    pub fn file(&self, codestart: &str, file_path: &str) -> Option<&[u8]> {
        self.files
            .get(&format!("{}/{}", codestart, file_path))
            .map(Vec::as_slice)
    }
}

/// Build a URL by appending a path segment, preserving query parameters
fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
        .pop_if_empty()
        .push(path_segment);
    Ok(url)
}
