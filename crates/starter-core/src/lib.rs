//! Starter Core - project definitions, extension catalog and archive assembly
//!
//! This library holds everything the download service does besides HTTP:
//!
//! - **Definition**: parse and validate the requested project coordinates
//! - **Catalog**: load the extension catalog, expand short ids, merge extension sets
//! - **Generator**: the `ProjectGenerator` capability plus a codestart template implementation
//! - **Archive**: deterministic zip packaging with a fixed entry timestamp
//! - **Service**: `ProjectService`, which runs merge → generate → package per request
//!
//! # Example Usage
//!
//! ```ignore
//! use starter_core::{ExtensionCatalog, ProjectDefinition, ProjectService};
//!
//! let catalog = Arc::new(ExtensionCatalog::load(&catalog_source).await?);
//! let generator = Arc::new(TemplateProjectGenerator::new(bundle));
//! let service = ProjectService::new(catalog, generator);
//!
//! let definition = ProjectDefinition::from_params(params)?;
//! let zip_bytes = service.create(&definition)?;
//! ```

pub mod archive;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod generator;
pub mod service;

// Re-export main types for convenience
pub use archive::{zip_directory, ArchiveTimestamp};
pub use catalog::{CatalogSource, ExtensionCatalog, ExtensionEntry};
pub use definition::{BuildTool, DefinitionBody, DefinitionParams, ProjectDefinition};
pub use error::{GenerationError, ProjectError};
pub use generator::{
    GenerationRequest, ProjectGenerator, SourceType, TemplateBundle, TemplateProjectGenerator,
    TemplateSource,
};
pub use service::{GeneratedProject, ProjectService};

/// User agent for outbound catalog and template requests
pub const USER_AGENT: &str = concat!("code-starter/", env!("CARGO_PKG_VERSION"));
