//! Extension catalog document types

use serde::{Deserialize, Serialize};

/// One selectable extension, as listed by `/api/extensions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionEntry {
    /// Fully qualified id (`groupId:artifactId`)
    pub id: String,

    /// Compact id used in the `s=` download parameter
    pub short_id: String,

    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub short_name: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Whether the extension ships example code when examples are enabled
    #[serde(default)]
    pub provides_example_code: bool,

    #[serde(default)]
    pub guide: Option<String>,

    /// Display order within the catalog
    #[serde(default)]
    pub order: u32,
}

impl ExtensionEntry {
    /// The artifact part of the id (`quarkus-resteasy` for `io.quarkus:quarkus-resteasy`)
    pub fn artifact_id(&self) -> &str {
        self.id
            .split_once(':')
            .map(|(_, artifact)| artifact)
            .unwrap_or(&self.id)
    }

    /// The group part of the id, if the id is qualified
    pub fn group_id(&self) -> Option<&str> {
        self.id.split_once(':').map(|(group, _)| group)
    }
}

/// Root catalog document (`extensions.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogManifest {
    /// Framework version every extension in the catalog targets
    pub platform_version: String,

    pub extensions: Vec<ExtensionEntry>,
}
