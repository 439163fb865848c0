use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use starter_core::{
    BuildTool, ExtensionCatalog, GenerationError, GenerationRequest, ProjectDefinition,
    ProjectGenerator, ProjectService,
};
use starter_server::{build_state, create_router, AppState, CliArgs, ServerConfig};
use std::collections::BTreeSet;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const CATALOG: &str = r#"
platformVersion: "2.16.0"
extensions:
  - id: io.quarkus:quarkus-resteasy
    shortId: 9Ie
    name: RESTEasy JAX-RS
    order: 1
  - id: io.quarkus:quarkus-resteasy-jackson
    shortId: pDS
    name: RESTEasy Jackson
    order: 2
  - id: io.quarkus:quarkus-hibernate-orm
    shortId: 7RG
    name: Hibernate ORM
    order: 3
  - id: io.quarkus:quarkus-kotlin
    shortId: L0j
    name: Kotlin
    order: 4
"#;

/// Records every request and writes a small deterministic project
#[derive(Default)]
struct RecordingGenerator {
    requests: Mutex<Vec<GenerationRequest>>,
    fail: bool,
}

impl RecordingGenerator {
    fn last_definition(&self) -> Option<ProjectDefinition> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|request| request.definition.clone())
    }

    fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ProjectGenerator for RecordingGenerator {
    fn generate(&self, request: &GenerationRequest, target_dir: &Path) -> Result<(), GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(GenerationError::Unsuccessful(
                "codestart engine exploded at /secret/path".into(),
            ));
        }
        std::fs::create_dir_all(target_dir)?;
        std::fs::write(
            target_dir.join("README.md"),
            format!("# {}\n", request.definition.artifact_id),
        )?;
        Ok(())
    }
}

fn test_app_with(generator: Arc<RecordingGenerator>) -> Router {
    let catalog = ExtensionCatalog::from_yaml(CATALOG).unwrap();
    let public_config = ServerConfig::from_args(CliArgs::default())
        .unwrap()
        .public_config(&catalog);
    let service = ProjectService::new(Arc::new(catalog), generator);
    create_router(AppState::new(service, public_config))
}

fn test_app() -> (Router, Arc<RecordingGenerator>) {
    let generator = Arc::new(RecordingGenerator::default());
    (test_app_with(generator.clone()), generator)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

fn assert_zip_download(status: StatusCode, headers: &HeaderMap, artifact_id: &str) {
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"{}.zip\"", artifact_id).as_str()
    );
}

#[tokio::test]
async fn download_without_parameters_uses_defaults() {
    let (router, generator) = test_app();
    let (status, headers, body) = get(&router, "/api/download").await;

    assert_zip_download(status, &headers, "code-with-quarkus");
    assert_eq!(generator.last_definition(), Some(ProjectDefinition::default()));

    let mut archive = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
    let mut readme = String::new();
    archive
        .by_name("code-with-quarkus/README.md")
        .unwrap()
        .read_to_string(&mut readme)
        .unwrap();
    assert_eq!(readme, "# code-with-quarkus\n");
}

#[tokio::test]
async fn download_with_all_parameters() {
    let (router, generator) = test_app();
    let (status, headers, _) = get(
        &router,
        "/api/download?g=com.toto&a=test-app&v=1.0.0&p=/toto/titi&c=org.toto.TotoResource&s=7RG.L0j.9Ie",
    )
    .await;

    assert_zip_download(status, &headers, "test-app");
    assert_eq!(
        generator.last_definition(),
        Some(ProjectDefinition {
            group_id: "com.toto".into(),
            artifact_id: "test-app".into(),
            version: "1.0.0".into(),
            class_name: "org.toto.TotoResource".into(),
            path: "/toto/titi".into(),
            short_extensions: "7RG.L0j.9Ie".into(),
            ..Default::default()
        })
    );
}

#[tokio::test]
async fn download_with_empty_extensions() {
    let (router, generator) = test_app();
    let (status, headers, _) = get(
        &router,
        "/api/download?g=org.acme&a=test-empty-ext&v=1.0.1&b=MAVEN&c=org.test.ExampleResource&e=",
    )
    .await;

    assert_zip_download(status, &headers, "test-empty-ext");
    assert_eq!(
        generator.last_definition(),
        Some(ProjectDefinition {
            artifact_id: "test-empty-ext".into(),
            version: "1.0.1".into(),
            class_name: "org.test.ExampleResource".into(),
            extensions: BTreeSet::from([String::new()]),
            ..Default::default()
        })
    );
}

#[tokio::test]
async fn download_with_old_extension_syntax() {
    let (router, generator) = test_app();
    let (status, headers, _) = get(
        &router,
        "/api/download?g=com.toto&a=test-app&v=1.0.0&p=/toto/titi&c=com.toto.TotoResource&e=io.quarkus:quarkus-resteasy&s=9Ie",
    )
    .await;

    assert_zip_download(status, &headers, "test-app");
    let requests = generator.requests.lock().unwrap();
    let request = requests.last().unwrap();
    assert_eq!(
        request.definition.extensions,
        BTreeSet::from(["io.quarkus:quarkus-resteasy".to_string()])
    );
    assert_eq!(request.definition.short_extensions, "9Ie");
    assert_eq!(
        request.extensions,
        BTreeSet::from(["io.quarkus:quarkus-resteasy".to_string()])
    );
}

#[tokio::test]
async fn long_and_short_extension_forms_produce_same_archive() {
    let (router, _) = test_app();
    let (_, _, long_form) = get(&router, "/api/download?a=same&e=io.quarkus:quarkus-resteasy").await;
    let (_, _, short_form) = get(&router, "/api/download?a=same&s=9Ie").await;
    assert!(!long_form.is_empty());
    assert_eq!(long_form, short_form);
}

#[tokio::test]
async fn download_gradle_with_a_few_parameters() {
    let (router, generator) = test_app();
    let (status, headers, _) = get(
        &router,
        "/api/download?b=GRADLE&a=test-app-with-a-few-arg&v=1.0.0&s=pDS.L0j",
    )
    .await;

    assert_zip_download(status, &headers, "test-app-with-a-few-arg");
    assert_eq!(
        generator.last_definition(),
        Some(ProjectDefinition {
            artifact_id: "test-app-with-a-few-arg".into(),
            version: "1.0.0".into(),
            build_tool: BuildTool::Gradle,
            short_extensions: "pDS.L0j".into(),
            ..Default::default()
        })
    );
}

#[tokio::test]
async fn short_route_alias_matches_canonical_route() {
    let (router, _) = test_app();
    let query = "g=com.toto&a=test-app&v=1.0.0&p=/toto/titi&c=org.toto.TotoResource&s=7RG.L0j.9Ie";

    let (status, headers, alias) = get(&router, &format!("/d?{}", query)).await;
    assert_zip_download(status, &headers, "test-app");
    let (_, _, canonical) = get(&router, &format!("/api/download?{}", query)).await;
    assert_eq!(alias, canonical);
}

#[tokio::test]
async fn repeated_downloads_are_byte_identical() {
    let (router, _) = test_app();
    let uri = "/api/download?a=repeat&s=9Ie.7RG";
    let (_, _, first) = get(&router, uri).await;
    let (_, _, second) = get(&router, uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_parameters_are_rejected_before_generation() {
    let cases = [
        ("/api/download?g=org.acme.", "INVALID_FIELD"),
        ("/api/download?a=", "INVALID_FIELD"),
        ("/api/download?a=my-app.", "INVALID_FIELD"),
        ("/api/download?c=org.acme.", "INVALID_FIELD"),
        ("/api/download?p=toto", "INVALID_FIELD"),
        ("/api/download?b=ANT", "INVALID_FIELD"),
        ("/api/download?s=9Ie..7RG", "INVALID_FIELD"),
        ("/api/download?s=zzz", "UNKNOWN_SHORT_ID"),
        ("/api/download?e=io.quarkus:quarkus-nope", "UNKNOWN_EXTENSION"),
        ("/d?s=zzz", "UNKNOWN_SHORT_ID"),
    ];

    for (uri, expected_code) in cases {
        let (router, generator) = test_app();
        let (status, _, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], expected_code, "{}", uri);
        assert_eq!(generator.count(), 0, "{} should not reach the generator", uri);
    }
}

#[tokio::test]
async fn generation_failure_hides_details() {
    let generator = Arc::new(RecordingGenerator {
        fail: true,
        ..Default::default()
    });
    let router = test_app_with(generator.clone());

    let (status, _, body) = get(&router, "/api/download").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert_eq!(json["message"], "Error during project creation");
    assert!(!String::from_utf8_lossy(&body).contains("/secret/path"));
    assert_eq!(generator.count(), 1);
}

#[tokio::test]
async fn post_download_accepts_json_definition() {
    let (router, generator) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"groupId":"com.toto","artifactId":"json-app","extensions":["io.quarkus:quarkus-resteasy"]}"#,
        ))
        .unwrap();

    let (status, headers, _) = send(&router, request).await;
    assert_zip_download(status, &headers, "json-app");

    let definition = generator.last_definition().unwrap();
    assert_eq!(definition.group_id, "com.toto");
    assert_eq!(definition.version, "1.0.0-SNAPSHOT");
}

#[tokio::test]
async fn post_download_validates_json_definition() {
    let (router, generator) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/download")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"artifactId":"Bad App"}"#))
        .unwrap();

    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(generator.count(), 0);
}

fn json_post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/download")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn post_download_parses_build_tool_like_the_query() {
    let (router, generator) = test_app();

    let (status, headers, _) = send(&router, json_post(r#"{"buildTool":"gradle"}"#)).await;
    assert_zip_download(status, &headers, "code-with-quarkus");
    assert_eq!(
        generator.last_definition().map(|d| d.build_tool),
        Some(BuildTool::Gradle)
    );

    let (status, _, body) = send(&router, json_post(r#"{"buildTool":"ANT"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "INVALID_FIELD");
    assert_eq!(generator.count(), 1);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let (router, generator) = test_app();
    let cases = [
        (json_post("{"), "MALFORMED_REQUEST"),
        (json_post(r#"{"noExamples":"yes"}"#), "MALFORMED_REQUEST"),
        (
            Request::builder()
                .uri("/api/download?ne=maybe")
                .body(Body::empty())
                .unwrap(),
            "INVALID_FIELD",
        ),
    ];

    for (request, expected_code) in cases {
        let (status, headers, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], expected_code);
        assert!(json["message"].is_string());
    }
    assert_eq!(generator.count(), 0);
}

#[tokio::test]
async fn no_examples_accepts_numeric_flag() {
    let (router, generator) = test_app();
    let (status, headers, _) = get(&router, "/api/download?ne=1").await;
    assert_zip_download(status, &headers, "code-with-quarkus");
    assert!(generator.last_definition().unwrap().no_examples);
}

#[tokio::test]
async fn repeated_extension_parameter_is_accepted() {
    let (router, generator) = test_app();
    let (status, headers, _) = get(
        &router,
        "/api/download?e=io.quarkus:quarkus-resteasy&e=io.quarkus:quarkus-kotlin",
    )
    .await;
    assert_zip_download(status, &headers, "code-with-quarkus");

    let requests = generator.requests.lock().unwrap();
    assert_eq!(
        requests.last().unwrap().extensions,
        BTreeSet::from([
            "io.quarkus:quarkus-kotlin".to_string(),
            "io.quarkus:quarkus-resteasy".to_string(),
        ])
    );
}

#[tokio::test]
async fn config_returns_public_configuration() {
    let (router, _) = test_app();
    let (status, _, body) = get(&router, "/api/config").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["environment"], "dev");
    assert!(json["gitCommitId"].is_string());
    assert!(json["gaTrackingId"].is_null());
    assert!(json["sentryDSN"].is_null());
    assert_eq!(json["quarkusVersion"], "2.16.0");
    assert_eq!(json["features"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn extensions_lists_catalog() {
    let (router, _) = test_app();
    let (status, _, body) = get(&router, "/api/extensions").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["id"], "io.quarkus:quarkus-resteasy");
    assert_eq!(entries[0]["shortId"], "9Ie");
}

fn workspace_path(relative: &str) -> String {
    format!("{}/../../{}", env!("CARGO_MANIFEST_DIR"), relative)
}

#[tokio::test]
async fn bundled_catalog_and_templates_generate_a_project() {
    let config = ServerConfig::from_args(CliArgs {
        catalog: Some(workspace_path("catalog/extensions.yaml")),
        templates: Some(workspace_path("templates")),
        ..Default::default()
    })
    .unwrap();
    let router = create_router(build_state(&config).await.unwrap());

    let (status, _, body) = get(&router, "/api/extensions").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json.as_array().unwrap().len() > 20);

    let (status, headers, body) = get(
        &router,
        "/api/download?g=com.toto&a=test-app&c=com.toto.TotoResource&p=/toto&e=io.quarkus:quarkus-resteasy",
    )
    .await;
    assert_zip_download(status, &headers, "test-app");

    let mut archive = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.contains(&"test-app/pom.xml".to_string()));
    assert!(names.contains(&"test-app/mvnw".to_string()));
    assert!(!names.iter().any(|name| name.ends_with("build.gradle")));

    let mut resource = String::new();
    archive
        .by_name("test-app/src/main/java/com/toto/TotoResource.java")
        .unwrap()
        .read_to_string(&mut resource)
        .unwrap();
    assert!(resource.contains("package com.toto;"));
    assert!(resource.contains("@Path(\"/toto\")"));

    let mut pom = String::new();
    archive
        .by_name("test-app/pom.xml")
        .unwrap()
        .read_to_string(&mut pom)
        .unwrap();
    assert!(pom.contains("<artifactId>quarkus-resteasy</artifactId>"));
}

#[tokio::test]
async fn bundled_templates_generate_gradle_kotlin_project() {
    let config = ServerConfig::from_args(CliArgs {
        catalog: Some(workspace_path("catalog/extensions.yaml")),
        templates: Some(workspace_path("templates")),
        ..Default::default()
    })
    .unwrap();
    let router = create_router(build_state(&config).await.unwrap());

    let (status, headers, body) = get(
        &router,
        "/api/download?a=kotlin-app&b=GRADLE_KOTLIN_DSL&e=io.quarkus:quarkus-kotlin,io.quarkus:quarkus-resteasy",
    )
    .await;
    assert_zip_download(status, &headers, "kotlin-app");

    let archive = zip::ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert!(names.contains(&"kotlin-app/build.gradle.kts".to_string()));
    assert!(names.contains(&"kotlin-app/gradlew".to_string()));
    assert!(names.contains(&"kotlin-app/src/main/kotlin/org/acme/ExampleResource.kt".to_string()));
    assert!(!names.contains(&"kotlin-app/pom.xml".to_string()));
}
