//! Template bundle generator: lays out a project from the applicable codestarts

use super::bundle::TemplateBundle;
use super::manifest::CodestartKind;
use super::{GenerationRequest, ProjectGenerator};
use crate::definition::BuildTool;
use crate::error::GenerationError;
use std::fs;
use std::path::Path;

/// Generates projects by copying codestart files and substituting `{{variables}}`
#[derive(Debug, Clone)]
pub struct TemplateProjectGenerator {
    bundle: TemplateBundle,
}

impl TemplateProjectGenerator {
    pub fn new(bundle: TemplateBundle) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &TemplateBundle {
        &self.bundle
    }
}

impl ProjectGenerator for TemplateProjectGenerator {
    fn generate(
        &self,
        request: &GenerationRequest,
        target_dir: &Path,
    ) -> Result<(), GenerationError> {
        let manifest = self.bundle.manifest();
        let codestarts: Vec<_> = manifest
            .codestarts
            .iter()
            .filter(|codestart| codestart.applies_to(request))
            .collect();

        if !codestarts
            .iter()
            .any(|codestart| codestart.kind == CodestartKind::Project)
        {
            return Err(GenerationError::Unsuccessful(format!(
                "no project codestart supports {} sources",
                request.source_type
            )));
        }

        let vars = template_vars(request);
        fs::create_dir_all(target_dir)?;

        for codestart in codestarts {
            for file_path in &codestart.files {
                let rendered_path = render(file_path, &vars);
                if !manifest
                    .build_files
                    .includes(&rendered_path, request.definition.build_tool)
                {
                    continue;
                }

                let content = self.bundle.file(&codestart.name, file_path).ok_or_else(|| {
                    GenerationError::MissingFile {
                        codestart: codestart.name.clone(),
                        file: file_path.clone(),
                    }
                })?;

                let target_path = target_dir.join(&rendered_path);
                if let Some(parent) = target_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                // Binary files (wrapper jars) are copied untouched
                match std::str::from_utf8(content) {
                    Ok(text) => fs::write(&target_path, render(text, &vars))?,
                    Err(_) => fs::write(&target_path, content)?,
                }

                if manifest.is_executable(&rendered_path) {
                    set_executable(&target_path)?;
                }
            }
            tracing::debug!(codestart = %codestart.name, "codestart applied");
        }

        Ok(())
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Substitute every `{{name}}` occurrence
pub fn render(template: &str, vars: &[(&'static str, String)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in vars {
        let placeholder = format!("{{{{{}}}}}", name);
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, value);
        }
    }
    rendered
}

/// Variables available to every template file and path
pub fn template_vars(request: &GenerationRequest) -> Vec<(&'static str, String)> {
    let definition = &request.definition;
    let package_name = definition.package_name();
    vec![
        ("group_id", definition.group_id.clone()),
        ("artifact_id", definition.artifact_id.clone()),
        ("version", definition.version.clone()),
        ("class_name", definition.class_name.clone()),
        ("class_simple_name", definition.class_simple_name().to_string()),
        ("package_name", package_name.to_string()),
        ("package_dir", package_name.replace('.', "/")),
        ("path", definition.path.clone()),
        ("java_target", request.java_target.clone()),
        ("build_tool", definition.build_tool.to_string()),
        ("language", request.source_type.to_string()),
        ("maven_dependencies", maven_dependencies(request)),
        ("gradle_dependencies", gradle_dependencies(request)),
        (
            "extension_list",
            request.extensions.iter().cloned().collect::<Vec<_>>().join(", "),
        ),
    ]
}

fn maven_dependencies(request: &GenerationRequest) -> String {
    request
        .extensions
        .iter()
        .map(|id| match id.split_once(':') {
            Some((group, artifact)) => format!(
                "    <dependency>\n      <groupId>{}</groupId>\n      <artifactId>{}</artifactId>\n    </dependency>",
                group, artifact
            ),
            None => format!(
                "    <dependency>\n      <artifactId>{}</artifactId>\n    </dependency>",
                id
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn gradle_dependencies(request: &GenerationRequest) -> String {
    request
        .extensions
        .iter()
        .map(|id| match request.definition.build_tool {
            BuildTool::GradleKotlinDsl => format!("    implementation(\"{}\")", id),
            _ => format!("    implementation '{}'", id),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
