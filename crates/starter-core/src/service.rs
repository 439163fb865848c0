//! Project creation: merge extensions, generate into a private temporary
//! directory, then package the result

use crate::archive::{zip_directory, ArchiveTimestamp};
use crate::catalog::ExtensionCatalog;
use crate::definition::ProjectDefinition;
use crate::error::ProjectError;
use crate::generator::{GenerationRequest, ProjectGenerator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Lifecycle stages of one project creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStage {
    Idle,
    Validating,
    MergingExtensions,
    Generating,
    Packaging,
    Done,
    /// The definition or its extensions were refused
    Rejected,
    /// Generation or packaging broke
    Failed,
}

/// A generated project living in its own temporary directory.
///
/// The directory is removed when this value is dropped.
#[derive(Debug)]
pub struct GeneratedProject {
    _workdir: TempDir,
    location: PathBuf,
    request: GenerationRequest,
}

impl GeneratedProject {
    /// Project root, `<tmp>/<artifactId>`
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

/// Turns project definitions into zip archives
#[derive(Clone)]
pub struct ProjectService {
    catalog: Arc<ExtensionCatalog>,
    generator: Arc<dyn ProjectGenerator>,
    timestamp: ArchiveTimestamp,
}

impl ProjectService {
    pub fn new(catalog: Arc<ExtensionCatalog>, generator: Arc<dyn ProjectGenerator>) -> Self {
        Self {
            catalog,
            generator,
            timestamp: ArchiveTimestamp::default(),
        }
    }

    /// Override the modification time stamped on archive entries
    pub fn with_timestamp(mut self, timestamp: ArchiveTimestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.catalog
    }

    /// Generate the project and return the zip archive bytes
    pub fn create(&self, definition: &ProjectDefinition) -> Result<Vec<u8>, ProjectError> {
        let project = self.create_tmp(definition, false)?;

        trace_stage(&definition.artifact_id, CreationStage::Packaging);
        let bytes = zip_directory(project.location(), &definition.artifact_id, self.timestamp)
            .inspect_err(|e| {
                trace_stage(&definition.artifact_id, CreationStage::Failed);
                tracing::error!(artifact_id = %definition.artifact_id, error = %e, "packaging failed");
            })?;

        trace_stage(&definition.artifact_id, CreationStage::Done);
        tracing::info!(
            artifact_id = %definition.artifact_id,
            build_tool = %definition.build_tool,
            extensions = project.request().extensions.len(),
            bytes = bytes.len(),
            "project archive created"
        );
        Ok(bytes)
    }

    /// Generate the project into a fresh temporary directory.
    ///
    /// `include_ci_workflow` adds the CI workflow codestart.
    pub fn create_tmp(
        &self,
        definition: &ProjectDefinition,
        include_ci_workflow: bool,
    ) -> Result<GeneratedProject, ProjectError> {
        trace_stage(&definition.artifact_id, CreationStage::Idle);
        trace_stage(&definition.artifact_id, CreationStage::Validating);
        definition
            .validate()
            .inspect_err(|_| trace_stage(&definition.artifact_id, CreationStage::Rejected))?;

        trace_stage(&definition.artifact_id, CreationStage::MergingExtensions);
        let extensions = self
            .catalog
            .check_and_merge(&definition.extensions, &definition.short_extensions)
            .inspect_err(|e| {
                trace_stage(&definition.artifact_id, CreationStage::Rejected);
                tracing::info!(artifact_id = %definition.artifact_id, error = %e, "extensions rejected");
            })?;

        let workdir = tempfile::Builder::new().prefix("generated-").tempdir()?;
        let location = workdir.path().join(&definition.artifact_id);
        let request = GenerationRequest::new(definition.clone(), extensions, include_ci_workflow);

        trace_stage(&definition.artifact_id, CreationStage::Generating);
        self.generator
            .generate(&request, &location)
            .inspect_err(|e| {
                trace_stage(&definition.artifact_id, CreationStage::Failed);
                tracing::error!(artifact_id = %definition.artifact_id, error = %e, "generation failed");
            })?;

        Ok(GeneratedProject {
            _workdir: workdir,
            location,
            request,
        })
    }
}

fn trace_stage(artifact_id: &str, stage: CreationStage) {
    tracing::debug!(artifact_id, ?stage, "project creation stage");
}
