use smithy_scaffold::core::dependencies::{parse_coordinate, DependencyDeclarationSet};
use smithy_scaffold::core::unit::{sanitize_project_name, specification_output_path, GenerationSettings};
use smithy_scaffold::domain::model::DependencyCoordinate;
use smithy_scaffold::{ModelDefinitionUnit, ProjectContext, ScaffoldError, ServiceIdentity, SmithyModelOptions};

fn define(name: &str, outdir: &str, options: SmithyModelOptions) -> ModelDefinitionUnit {
    let mut context = ProjectContext::new(name, outdir);
    ModelDefinitionUnit::new(&mut context, options, &GenerationSettings::new("/repo/samples/smithy")).unwrap()
}

fn options(service_name: &str) -> SmithyModelOptions {
    SmithyModelOptions::new(ServiceIdentity::new("com.example", service_name))
}

#[test]
fn test_default_unit_has_exactly_required_dependencies() {
    let unit = define("api", "/repo/api", options("Api"));

    assert_eq!(
        unit.dependencies().remote_manifest(),
        vec![
            "software.amazon.smithy:smithy-cli:1.28.0",
            "software.amazon.smithy:smithy-model:1.28.0",
            "software.amazon.smithy:smithy-openapi:1.28.0",
            "software.amazon.smithy:smithy-aws-traits:1.28.0",
        ]
    );
    assert_eq!(unit.build_descriptor().dependencies().len(), 4);
}

#[test]
fn test_later_declarations_win_by_key() {
    let mut unit = define("api", "/repo/api", options("Api"));
    unit.add_deps(&["com.example:traits:1.0.0"]).unwrap();
    unit.add_deps(&["com.example:traits:2.0.0", "com.example:traits:2.0.0"]).unwrap();

    let traits: Vec<_> = unit
        .dependencies()
        .remote_manifest()
        .into_iter()
        .filter(|d| d.starts_with("com.example:traits"))
        .collect();
    assert_eq!(traits, vec!["com.example:traits:2.0.0"]);
}

#[test]
fn test_invalid_coordinate_fails_fast() {
    let mut unit = define("api", "/repo/api", options("Api"));
    let err = unit.add_deps(&["com.example"]).unwrap_err();
    assert!(matches!(err, ScaffoldError::InvalidCoordinateFormat { .. }));

    assert!(parse_coordinate("file://../x.jar").unwrap().is_local_file());
}

#[test]
fn test_custom_repositories_replace_defaults() {
    let mut opts = options("Api");
    opts.smithy_build.repository_urls = Some(vec!["https://x".to_string()]);
    let unit = define("api", "/repo/api", opts);

    assert_eq!(
        unit.build_descriptor().document()["maven"]["repositories"],
        serde_json::json!([{"url": "https://x"}])
    );
    assert!(!unit.build_gradle().contains("repo.maven.apache.org"));
}

#[test]
fn test_sanitization_and_output_path_are_deterministic() {
    assert_eq!(sanitize_project_name("my/api:svc"), "my-api-svc");
    assert_eq!(sanitize_project_name("my-api-svc"), "my-api-svc");

    let first = define("my/api:svc", "/repo/one", options("Svc"));
    let second = define("my/api:svc", "/repo/two", options("Svc"));
    assert_eq!(first.specification_output_path(), second.specification_output_path());
    assert_eq!(
        first.specification_output_path(),
        specification_output_path("my-api-svc", "Svc")
    );
}

#[test]
fn test_smithy_dependency_edge() {
    let shapes = define("shapes", "/repo/packages/shapes", options("Shapes"));
    let mut api = define("api", "/repo/packages/api", options("Api"));
    let remote_before = api.dependencies().remote_manifest();

    api.add_smithy_deps(&[&shapes]);

    assert_eq!(
        api.dependencies().local_files(),
        vec![&DependencyCoordinate::local_file("../shapes/build/libs/shapes.jar")]
    );
    assert_eq!(api.dependencies().remote_manifest(), remote_before);
    assert!(api
        .dependencies()
        .build_file_manifest()
        .contains(&"implementation files(\"../shapes/build/libs/shapes.jar\")".to_string()));
}

#[test]
fn test_declaration_set_is_usable_on_its_own() {
    let mut deps = DependencyDeclarationSet::new();
    deps.add([
        DependencyCoordinate::local_file("libs/a.jar"),
        DependencyCoordinate::maven("software.amazon.smithy", "smithy-cli", "1.40.0"),
    ]);

    assert_eq!(deps.remote_manifest()[3], "software.amazon.smithy:smithy-cli:1.40.0");
    assert_eq!(deps.build_file_manifest()[3], "implementation files(\"libs/a.jar\")");
}
