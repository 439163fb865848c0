//! Project definition: the validated request for one generated project

use crate::error::ProjectError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GROUP_ID: &str = "org.acme";
pub const DEFAULT_ARTIFACT_ID: &str = "code-with-quarkus";
pub const DEFAULT_VERSION: &str = "1.0.0-SNAPSHOT";
pub const DEFAULT_CLASS_NAME: &str = "org.acme.ExampleResource";
pub const DEFAULT_PATH: &str = "/hello";

static JAVA_DOTTED_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z_$][a-zA-Z\d_$]*\.)*[a-zA-Z_$][a-zA-Z\d_$]*$").expect("valid regex")
});
static ARTIFACT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9\-._]*$").expect("valid regex"));
static URL_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([a-z0-9\-._~%!$&'()*+,;=:@]+/?)*$").expect("valid regex")
});
static SHORT_EXTENSIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+(\.[a-zA-Z0-9\-_]+)*$").expect("valid regex"));
static EXTENSION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\-._]+(:[a-zA-Z0-9\-._]+)?$").expect("valid regex"));

/// Target build system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum BuildTool {
    #[default]
    Maven,
    Gradle,
    GradleKotlinDsl,
}

impl BuildTool {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTool::Maven => "MAVEN",
            BuildTool::Gradle => "GRADLE",
            BuildTool::GradleKotlinDsl => "GRADLE_KOTLIN_DSL",
        }
    }

    pub fn is_gradle(&self) -> bool {
        matches!(self, BuildTool::Gradle | BuildTool::GradleKotlinDsl)
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildTool {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MAVEN" => Ok(BuildTool::Maven),
            "GRADLE" => Ok(BuildTool::Gradle),
            "GRADLE_KOTLIN_DSL" => Ok(BuildTool::GradleKotlinDsl),
            _ => Err(ProjectError::invalid("buildTool", s)),
        }
    }
}

impl TryFrom<String> for BuildTool {
    type Error = ProjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// `true`/`false`, also `1`/`0`, ignoring case
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Raw request parameters, as they arrive on the download query string.
///
/// Every field is optional; missing ones take the documented defaults.
/// Nothing is interpreted here, `ProjectDefinition::from_params` does that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionParams {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub class_name: Option<String>,
    pub path: Option<String>,
    pub build_tool: Option<String>,
    /// One entry per `e` occurrence, each possibly comma-separated
    pub extensions: Vec<String>,
    pub short_extensions: Option<String>,
    pub no_examples: Option<String>,
}

impl FromIterator<(String, String)> for DefinitionParams {
    /// Collect decoded query pairs (`g`, `a`, `v`, `c`, `p`, `b`, `e`, `s`, `ne`).
    ///
    /// `e` accumulates across repeats; for the other keys the last one wins.
    /// Unknown keys are ignored.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "g" => params.group_id = Some(value),
                "a" => params.artifact_id = Some(value),
                "v" => params.version = Some(value),
                "c" => params.class_name = Some(value),
                "p" => params.path = Some(value),
                "b" => params.build_tool = Some(value),
                "e" => params.extensions.push(value),
                "s" => params.short_extensions = Some(value),
                "ne" => params.no_examples = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// JSON body of `POST /api/download`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefinitionBody {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub class_name: Option<String>,
    pub path: Option<String>,
    pub build_tool: Option<String>,
    pub extensions: Vec<String>,
    pub short_extensions: Option<String>,
    pub no_examples: Option<bool>,
}

impl From<DefinitionBody> for DefinitionParams {
    fn from(body: DefinitionBody) -> Self {
        Self {
            group_id: body.group_id,
            artifact_id: body.artifact_id,
            version: body.version,
            class_name: body.class_name,
            path: body.path,
            build_tool: body.build_tool,
            extensions: body.extensions,
            short_extensions: body.short_extensions,
            no_examples: body.no_examples.map(|flag| flag.to_string()),
        }
    }
}

/// A validated, immutable description of the project to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectDefinition {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub class_name: String,
    pub path: String,
    pub build_tool: BuildTool,
    pub extensions: BTreeSet<String>,
    pub short_extensions: String,
    pub no_examples: bool,
}

impl Default for ProjectDefinition {
    fn default() -> Self {
        Self {
            group_id: DEFAULT_GROUP_ID.to_string(),
            artifact_id: DEFAULT_ARTIFACT_ID.to_string(),
            version: DEFAULT_VERSION.to_string(),
            class_name: DEFAULT_CLASS_NAME.to_string(),
            path: DEFAULT_PATH.to_string(),
            build_tool: BuildTool::default(),
            extensions: BTreeSet::new(),
            short_extensions: String::new(),
            no_examples: false,
        }
    }
}

impl ProjectDefinition {
    /// Build a definition from raw parameters, filling defaults and validating
    pub fn from_params(params: DefinitionParams) -> Result<Self, ProjectError> {
        let defaults = Self::default();

        let build_tool = match params.build_tool.as_deref() {
            Some(raw) => raw.parse()?,
            None => defaults.build_tool,
        };

        // `e=` is kept as the singleton empty id, the merger skips blanks
        let extensions: BTreeSet<String> = params
            .extensions
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(|id| id.trim().to_string())
            .collect();

        let no_examples = match params.no_examples.as_deref() {
            Some(raw) => parse_flag(raw).ok_or_else(|| ProjectError::invalid("noExamples", raw))?,
            None => false,
        };

        let definition = Self {
            group_id: params.group_id.unwrap_or(defaults.group_id),
            artifact_id: params.artifact_id.unwrap_or(defaults.artifact_id),
            version: params.version.unwrap_or(defaults.version),
            class_name: params.class_name.unwrap_or(defaults.class_name),
            path: params.path.unwrap_or(defaults.path),
            build_tool,
            extensions,
            short_extensions: params.short_extensions.unwrap_or_default(),
            no_examples,
        };

        definition.validate()?;
        Ok(definition)
    }

    /// Syntactic checks on every field. Catalog lookups happen in the merger.
    pub fn validate(&self) -> Result<(), ProjectError> {
        if !JAVA_DOTTED_PATH.is_match(&self.group_id) {
            return Err(ProjectError::invalid("groupId", &self.group_id));
        }
        if !ARTIFACT_ID.is_match(&self.artifact_id)
            || self.artifact_id.ends_with(&['.', '-', '_'][..])
        {
            return Err(ProjectError::invalid("artifactId", &self.artifact_id));
        }
        if self.version.is_empty() || self.version.chars().any(char::is_whitespace) {
            return Err(ProjectError::invalid("version", &self.version));
        }
        if !JAVA_DOTTED_PATH.is_match(&self.class_name) {
            return Err(ProjectError::invalid("className", &self.class_name));
        }
        if !URL_PATH.is_match(&self.path) {
            return Err(ProjectError::invalid("path", &self.path));
        }
        if !self.short_extensions.is_empty() && !SHORT_EXTENSIONS.is_match(&self.short_extensions)
        {
            return Err(ProjectError::invalid(
                "shortExtensions",
                &self.short_extensions,
            ));
        }
        if let Some(bad) = self
            .extensions
            .iter()
            .find(|id| !id.is_empty() && !EXTENSION_ID.is_match(id))
        {
            return Err(ProjectError::invalid("extensions", bad));
        }
        Ok(())
    }

    /// Package part of the class name (`org.acme` for `org.acme.ExampleResource`)
    pub fn package_name(&self) -> &str {
        self.class_name
            .rsplit_once('.')
            .map(|(package, _)| package)
            .unwrap_or(&self.group_id)
    }

    /// Simple class name (`ExampleResource` for `org.acme.ExampleResource`)
    pub fn class_simple_name(&self) -> &str {
        self.class_name
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&self.class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> DefinitionParams {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn invalid_field(result: Result<ProjectDefinition, ProjectError>) -> &'static str {
        match result {
            Err(ProjectError::InvalidField { field, .. }) => field,
            other => panic!("expected invalid field, got {:?}", other),
        }
    }

    #[test]
    fn test_no_params_gives_defaults() {
        let definition = ProjectDefinition::from_params(DefinitionParams::default()).unwrap();
        assert_eq!(definition, ProjectDefinition::default());
    }

    #[test]
    fn test_partial_params_fill_defaults() {
        let definition = ProjectDefinition::from_params(params(&[
            ("a", "test-app-with-a-few-arg"),
            ("v", "1.0.0"),
            ("b", "GRADLE"),
            ("s", "pDS.L0j"),
        ]))
        .unwrap();

        assert_eq!(
            definition,
            ProjectDefinition {
                artifact_id: "test-app-with-a-few-arg".into(),
                version: "1.0.0".into(),
                build_tool: BuildTool::Gradle,
                short_extensions: "pDS.L0j".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_empty_extensions_kept_as_singleton() {
        let definition =
            ProjectDefinition::from_params(params(&[("a", "test-empty-ext"), ("e", "")])).unwrap();
        assert_eq!(definition.extensions, BTreeSet::from([String::new()]));
    }

    #[test]
    fn test_empty_short_extensions() {
        let definition = ProjectDefinition::from_params(params(&[("s", "")])).unwrap();
        assert_eq!(definition.short_extensions, "");
        assert!(definition.extensions.is_empty());
    }

    #[test]
    fn test_extensions_split_and_trimmed() {
        let definition = ProjectDefinition::from_params(params(&[(
            "e",
            "io.quarkus:quarkus-resteasy, io.quarkus:quarkus-arc",
        )]))
        .unwrap();
        assert_eq!(
            definition.extensions,
            BTreeSet::from([
                "io.quarkus:quarkus-arc".to_string(),
                "io.quarkus:quarkus-resteasy".to_string(),
            ])
        );
    }

    #[test]
    fn test_repeated_extension_parameter_accumulates() {
        let definition = ProjectDefinition::from_params(params(&[
            ("e", "io.quarkus:quarkus-resteasy"),
            ("e", "io.quarkus:quarkus-arc,io.quarkus:quarkus-kotlin"),
        ]))
        .unwrap();
        assert_eq!(
            definition.extensions,
            BTreeSet::from([
                "io.quarkus:quarkus-arc".to_string(),
                "io.quarkus:quarkus-kotlin".to_string(),
                "io.quarkus:quarkus-resteasy".to_string(),
            ])
        );
    }

    #[test]
    fn test_last_single_valued_parameter_wins() {
        let p = params(&[("a", "first"), ("a", "second"), ("zz", "ignored")]);
        assert_eq!(p.artifact_id.as_deref(), Some("second"));
    }

    #[test]
    fn test_no_examples_flag() {
        assert!(ProjectDefinition::from_params(params(&[("ne", "true")])).unwrap().no_examples);
        assert!(ProjectDefinition::from_params(params(&[("ne", "1")])).unwrap().no_examples);
        assert!(!ProjectDefinition::from_params(params(&[("ne", "FALSE")])).unwrap().no_examples);
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(params(&[("ne", "maybe")]))),
            "noExamples"
        );
    }

    #[test]
    fn test_body_goes_through_the_same_validation() {
        let body: DefinitionBody = serde_json::from_str(
            r#"{"artifactId":"json-app","buildTool":"gradle","extensions":["io.quarkus:quarkus-arc"],"noExamples":true}"#,
        )
        .unwrap();
        let definition = ProjectDefinition::from_params(body.into()).unwrap();
        assert_eq!(definition.build_tool, BuildTool::Gradle);
        assert!(definition.no_examples);

        let body: DefinitionBody = serde_json::from_str(r#"{"buildTool":"ANT"}"#).unwrap();
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(body.into())),
            "buildTool"
        );
    }

    #[test]
    fn test_invalid_group_id() {
        let field = invalid_field(ProjectDefinition::from_params(params(&[("g", "org.acme.")])));
        assert_eq!(field, "groupId");
    }

    #[test]
    fn test_invalid_artifact_id() {
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(params(&[("a", "")]))),
            "artifactId"
        );
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(params(&[("a", "my-app.")]))),
            "artifactId"
        );
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(params(&[("a", "MyApp")]))),
            "artifactId"
        );
    }

    #[test]
    fn test_invalid_class_name() {
        let field = invalid_field(ProjectDefinition::from_params(params(&[(
            "c",
            "org.acme.1Resource",
        )])));
        assert_eq!(field, "className");
    }

    #[test]
    fn test_invalid_path() {
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(params(&[("p", "toto")]))),
            "path"
        );
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(params(&[("p", "/to to")]))),
            "path"
        );
    }

    #[test]
    fn test_invalid_short_extensions() {
        let field = invalid_field(ProjectDefinition::from_params(params(&[("s", "9Ie..L0j")])));
        assert_eq!(field, "shortExtensions");
    }

    #[test]
    fn test_invalid_extension_id() {
        let field = invalid_field(ProjectDefinition::from_params(params(&[(
            "e",
            "io.quarkus:quarkus resteasy",
        )])));
        assert_eq!(field, "extensions");
    }

    #[test]
    fn test_build_tool_parsing() {
        assert_eq!("gradle".parse::<BuildTool>().unwrap(), BuildTool::Gradle);
        assert_eq!(
            "GRADLE_KOTLIN_DSL".parse::<BuildTool>().unwrap(),
            BuildTool::GradleKotlinDsl
        );
        assert_eq!(
            invalid_field(ProjectDefinition::from_params(params(&[("b", "ANT")]))),
            "buildTool"
        );
    }

    #[test]
    fn test_class_name_parts() {
        let definition = ProjectDefinition {
            class_name: "org.toto.TotoResource".into(),
            ..Default::default()
        };
        assert_eq!(definition.package_name(), "org.toto");
        assert_eq!(definition.class_simple_name(), "TotoResource");
    }

    #[test]
    fn test_json_body_uses_camel_case_and_defaults() {
        let definition: ProjectDefinition = serde_json::from_str(
            r#"{"artifactId":"json-app","buildTool":"gradle_kotlin_dsl","extensions":["io.quarkus:quarkus-arc"]}"#,
        )
        .unwrap();
        assert_eq!(definition.artifact_id, "json-app");
        assert_eq!(definition.build_tool, BuildTool::GradleKotlinDsl);
        assert_eq!(definition.group_id, DEFAULT_GROUP_ID);
        assert!(definition.validate().is_ok());
    }
}
