use anyhow::Result;
use smithy_scaffold::core::runner::StepOutcome;
use smithy_scaffold::core::synth::FileOutcome;
use smithy_scaffold::{GenerationRunner, LocalStorage, ScaffoldConfig, Synthesizer, Workspace};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_samples(root: &Path) {
    let samples = root.join("samples/smithy");
    fs::create_dir_all(samples.join("gradle/wrapper")).unwrap();
    fs::write(samples.join("gradle/wrapper/gradle-wrapper.jar"), b"jar").unwrap();
    fs::write(
        samples.join("gradle/wrapper/gradle-wrapper.properties"),
        "distributionUrl=https\\://services.gradle.org/distributions/gradle-7.6-bin.zip\n",
    )
    .unwrap();
    fs::write(samples.join("gradlew"), "#!/bin/sh\necho gradle\n").unwrap();
    fs::write(samples.join("gradlew.bat"), "@echo gradle\r\n").unwrap();
}

fn create_test_config(root: &Path, build_command: &str) -> ScaffoldConfig {
    // forward slashes keep Windows paths valid inside TOML strings
    let normalized_root = root.display().to_string().replace('\\', "/");
    let content = format!(
        r#"
[workspace]
root = "{root}"
samples_dir = "samples/smithy"
build_command = {build_command}

[[models]]
name = "shapes"
outdir = "packages/shapes"
[models.service]
namespace = "com.example.shapes"
name = "Shapes"

[[models]]
name = "api/model"
outdir = "packages/api/model"
depends_on = ["shapes"]
ignore_gradle_wrapper = false
[models.service]
namespace = "com.example.api"
name = "PetStore"
[models.smithy_build]
dependencies = ["software.amazon.smithy:smithy-openapi:1.30.0"]
repository_urls = ["https://repo.example.com/maven/"]
"#,
        root = normalized_root,
        build_command = build_command,
    );
    ScaffoldConfig::from_toml_str(&content).unwrap()
}

#[tokio::test]
async fn test_synthesize_workspace_to_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = create_test_config(temp_dir.path(), r#"["./gradlew", "build"]"#);

    let workspace = Workspace::from_config(&config)?;
    let synthesizer = Synthesizer::new(LocalStorage::new(workspace.root()));
    for project in workspace.projects() {
        synthesizer.synthesize(&project.context).await?;
    }

    let api_dir = temp_dir.path().join("packages/api/model");
    let settings = fs::read_to_string(api_dir.join("settings.gradle"))?;
    assert_eq!(settings, "rootProject.name = 'api-model'\n");

    let descriptor: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(api_dir.join("smithy-build.json"))?)?;
    assert_eq!(
        descriptor["projections"]["openapi"]["plugins"]["openapi"]["service"],
        "com.example.api#PetStore"
    );
    assert_eq!(
        descriptor["maven"]["repositories"],
        serde_json::json!([{"url": "https://repo.example.com/maven/"}])
    );
    let dependencies: Vec<&str> = descriptor["maven"]["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d.as_str())
        .collect();
    assert_eq!(
        dependencies,
        vec![
            "software.amazon.smithy:smithy-cli:1.28.0",
            "software.amazon.smithy:smithy-model:1.28.0",
            "software.amazon.smithy:smithy-aws-traits:1.28.0",
            "software.amazon.smithy:smithy-openapi:1.30.0",
        ]
    );

    let gradle = fs::read_to_string(api_dir.join("build.gradle"))?;
    assert!(gradle.contains("implementation files(\"../../shapes/build/libs/shapes.jar\")"));
    assert!(gradle.contains("maven { url \"https://repo.example.com/maven/\" }"));

    let gitignore = fs::read_to_string(api_dir.join(".gitignore"))?;
    assert!(!gitignore.lines().any(|l| l == "gradlew"));
    assert!(gitignore.lines().any(|l| l == ".gradle"));
    assert!(gitignore.lines().any(|l| l == "build"));

    let shapes_gitignore = fs::read_to_string(temp_dir.path().join("packages/shapes/.gitignore"))?;
    assert!(shapes_gitignore.lines().any(|l| l == "gradlew"));

    let model = fs::read_to_string(api_dir.join("src/main/smithy/main.smithy"))?;
    assert!(model.contains("namespace com.example.api"));
    assert!(model.contains("service PetStore {"));

    Ok(())
}

#[tokio::test]
async fn test_resynthesis_keeps_user_edits_to_samples() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = create_test_config(temp_dir.path(), r#"["./gradlew", "build"]"#);
    let workspace = Workspace::from_config(&config)?;
    let synthesizer = Synthesizer::new(LocalStorage::new(workspace.root()));
    let shapes = workspace.project("shapes").unwrap();

    synthesizer.synthesize(&shapes.context).await?;
    let model_path = temp_dir.path().join("packages/shapes/src/main/smithy/main.smithy");
    fs::write(&model_path, "$version: \"2\"\nnamespace com.example.custom\n")?;

    let results = synthesizer.synthesize(&shapes.context).await?;

    assert_eq!(
        fs::read_to_string(&model_path)?,
        "$version: \"2\"\nnamespace com.example.custom\n"
    );
    let model_result = results.iter().find(|r| r.path == model_path).unwrap();
    assert_eq!(model_result.outcome, FileOutcome::Kept);
    let descriptor_result = results
        .iter()
        .find(|r| r.path.ends_with("smithy-build.json"))
        .unwrap();
    assert_eq!(descriptor_result.outcome, FileOutcome::Written);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_generation_stages_wrapper_and_runs_build_in_order() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new()?;
    write_samples(temp_dir.path());
    // stands in for gradle: leaves a jar behind like a real build would
    let config = create_test_config(
        temp_dir.path(),
        r#"["sh", "-c", "mkdir -p build/libs && touch build/libs/built.jar"]"#,
    );

    let workspace = Workspace::from_config(&config)?;
    let reports = GenerationRunner::new().run_workspace(&workspace).await?;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].project, "shapes");
    assert_eq!(reports[1].project, "api/model");
    assert!(reports
        .iter()
        .all(|r| r.steps.iter().all(|(_, outcome)| *outcome == StepOutcome::Done)));

    let shapes_dir = temp_dir.path().join("packages/shapes");
    assert_eq!(
        fs::read(shapes_dir.join("gradle/wrapper/gradle-wrapper.jar"))?,
        b"jar".to_vec()
    );
    let gradlew_mode = fs::metadata(shapes_dir.join("gradlew"))?.permissions().mode();
    assert_eq!(gradlew_mode & 0o111, 0o111);
    let properties_mode = fs::metadata(shapes_dir.join("gradle/wrapper/gradle-wrapper.properties"))?
        .permissions()
        .mode();
    assert_eq!(properties_mode & 0o111, 0);
    assert!(shapes_dir.join("build/libs/built.jar").exists());

    // A second run keeps the wrapper a user may have replaced.
    fs::write(shapes_dir.join("gradlew"), "#!/bin/sh\necho custom\n")?;
    let reports = GenerationRunner::new().run_workspace(&workspace).await?;
    assert_eq!(reports[0].skipped(), 4);
    assert_eq!(fs::read_to_string(shapes_dir.join("gradlew"))?, "#!/bin/sh\necho custom\n");

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_build_stops_dependents() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_samples(temp_dir.path());
    let config = create_test_config(temp_dir.path(), r#"["sh", "-c", "exit 1"]"#);

    let workspace = Workspace::from_config(&config)?;
    let err = GenerationRunner::new()
        .run_workspace(&workspace)
        .await
        .unwrap_err();

    match err {
        smithy_scaffold::ScaffoldError::ExternalBuildFailure { project, .. } => {
            assert_eq!(project, "shapes")
        }
        other => panic!("expected ExternalBuildFailure, got {:?}", other),
    }
    assert!(!temp_dir.path().join("packages/api/model/gradlew").exists());
    Ok(())
}
