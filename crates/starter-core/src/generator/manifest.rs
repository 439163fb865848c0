//! Template bundle manifest types and parsing

use super::{GenerationRequest, SourceType};
use crate::definition::BuildTool;
use serde::{Deserialize, Serialize};

/// File patterns that only belong to some build tools.
///
/// Files matching none of the lists are part of every project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildFiles {
    /// Files that require Maven
    #[serde(default)]
    pub maven: Vec<String>,

    /// Files that require either Gradle flavour
    #[serde(default)]
    pub gradle: Vec<String>,

    /// Files that require Gradle with the Groovy DSL
    #[serde(default)]
    pub gradle_groovy: Vec<String>,

    /// Files that require Gradle with the Kotlin DSL
    #[serde(default)]
    pub gradle_kotlin_dsl: Vec<String>,
}

/// Which build tool(s) a file is associated with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildFileKind {
    Maven,
    Gradle, // Either DSL
    GradleGroovy,
    GradleKotlinDsl,
}

impl BuildFiles {
    /// Check if a filename matches any pattern in a list
    pub(crate) fn matches_any(filename: &str, patterns: &[String]) -> bool {
        patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                // Suffix match: *.gradle matches settings.gradle
                filename.ends_with(suffix)
            } else if let Some(prefix) = pattern.strip_suffix('*') {
                // Prefix match: mvnw* matches mvnw.cmd
                filename.starts_with(prefix)
            } else {
                filename == pattern
            }
        })
    }

    /// Determine which build tool a file belongs to, `None` for shared files
    pub fn kind_for_file(&self, file_path: &str) -> Option<BuildFileKind> {
        let filename = file_path.rsplit('/').next().unwrap_or(file_path);

        if Self::matches_any(filename, &self.maven) {
            return Some(BuildFileKind::Maven);
        }
        if Self::matches_any(filename, &self.gradle_groovy) {
            return Some(BuildFileKind::GradleGroovy);
        }
        if Self::matches_any(filename, &self.gradle_kotlin_dsl) {
            return Some(BuildFileKind::GradleKotlinDsl);
        }
        if Self::matches_any(filename, &self.gradle) {
            return Some(BuildFileKind::Gradle);
        }
        None
    }

    /// Whether a file should be emitted for the given build tool
    pub fn includes(&self, file_path: &str, build_tool: BuildTool) -> bool {
        match self.kind_for_file(file_path) {
            None => true,
            Some(BuildFileKind::Maven) => build_tool == BuildTool::Maven,
            Some(BuildFileKind::Gradle) => build_tool.is_gradle(),
            Some(BuildFileKind::GradleGroovy) => build_tool == BuildTool::Gradle,
            Some(BuildFileKind::GradleKotlinDsl) => build_tool == BuildTool::GradleKotlinDsl,
        }
    }
}

/// When a codestart is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodestartKind {
    /// Always applied (build descriptor, wrappers, README)
    Project,
    /// Applied when requested by name
    Tooling,
    /// Applied when one of its extensions is selected
    Extension,
}

/// One named set of template files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodestartManifest {
    pub name: String,

    pub kind: CodestartKind,

    /// Extensions that activate an `extension` codestart
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Languages this codestart supports; empty means all
    #[serde(default)]
    pub languages: Vec<SourceType>,

    /// Example code, skipped when the request disables examples
    #[serde(default)]
    pub example: bool,

    /// Files relative to the codestart directory
    pub files: Vec<String>,
}

impl CodestartManifest {
    /// Check whether this codestart contributes to the requested project
    pub fn applies_to(&self, request: &GenerationRequest) -> bool {
        if self.example && request.definition.no_examples {
            return false;
        }
        if !self.languages.is_empty() && !self.languages.contains(&request.source_type) {
            return false;
        }
        match self.kind {
            CodestartKind::Project => true,
            CodestartKind::Tooling => request.codestarts.contains(&self.name),
            CodestartKind::Extension => self
                .extensions
                .iter()
                .any(|id| request.extensions.contains(id)),
        }
    }
}

/// Root bundle manifest (`template.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Semver version of the bundle, compared against the catalog platform
    pub version: String,

    #[serde(default)]
    pub build_files: BuildFiles,

    /// Patterns of files written with the executable bit set
    #[serde(default)]
    pub executables: Vec<String>,

    pub codestarts: Vec<CodestartManifest>,
}

impl BundleManifest {
    pub fn is_executable(&self, file_path: &str) -> bool {
        let filename = file_path.rsplit('/').next().unwrap_or(file_path);
        BuildFiles::matches_any(filename, &self.executables)
    }
}
