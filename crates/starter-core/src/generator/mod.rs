//! Project generation
//!
//! This module provides:
//! - The [`ProjectGenerator`] capability the archive assembler drives
//! - A template bundle generator that lays out projects from codestarts
//! - Bundle manifest types and bundle loading (local directory or remote zip)
//! - Version compatibility checking between the bundle and the catalog

pub mod bundle;
pub mod manifest;
pub mod render;
pub mod version;

use crate::definition::ProjectDefinition;
use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

pub use bundle::{TemplateBundle, TemplateSource};
pub use manifest::{BuildFiles, BundleManifest, CodestartKind, CodestartManifest};
pub use render::TemplateProjectGenerator;
pub use version::check_compatibility;

/// Java release targeted by generated projects
pub const JAVA_TARGET: &str = "11";

/// Codestart name that adds a CI workflow
pub const GITHUB_ACTION_CODESTART: &str = "github-action";

/// Primary language of the generated sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Java,
    Kotlin,
    Scala,
}

impl SourceType {
    /// Kotlin or Scala extensions switch the project language, Java otherwise
    pub fn from_extensions<'a>(extensions: impl IntoIterator<Item = &'a String>) -> Self {
        let mut source_type = SourceType::Java;
        for id in extensions {
            if id.contains("kotlin") {
                return SourceType::Kotlin;
            }
            if id.contains("scala") {
                source_type = SourceType::Scala;
            }
        }
        source_type
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Java => "java",
            SourceType::Kotlin => "kotlin",
            SourceType::Scala => "scala",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a generator needs to materialize one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub definition: ProjectDefinition,
    /// Canonical extension ids after short-id expansion and merging
    pub extensions: BTreeSet<String>,
    pub source_type: SourceType,
    /// Extra tooling codestarts requested by name (e.g. `github-action`)
    pub codestarts: BTreeSet<String>,
    pub java_target: String,
}

impl GenerationRequest {
    pub fn new(
        definition: ProjectDefinition,
        extensions: BTreeSet<String>,
        include_ci_workflow: bool,
    ) -> Self {
        let source_type = SourceType::from_extensions(&extensions);
        let mut codestarts = BTreeSet::new();
        if include_ci_workflow {
            codestarts.insert(GITHUB_ACTION_CODESTART.to_string());
        }
        Self {
            definition,
            extensions,
            source_type,
            codestarts,
            java_target: JAVA_TARGET.to_string(),
        }
    }
}

/// Materializes a project directory from a request.
///
/// Implementations must either fully populate `target_dir` and return `Ok`,
/// or return an error; callers never package a failed generation.
pub trait ProjectGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest, target_dir: &Path)
        -> Result<(), GenerationError>;
}
