use super::*;
use crate::project::{load_project_spec, ProjectTargetDecl};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "analytics/dbt_project.yml",
        "name: jaffle\nprofile: jaffle\nrequires-dbt-version: \">=1.7\"\nseed-paths: [data]\n",
    );
    write(
        root,
        "analytics/packages.yml",
        "packages:\n  - package: dbt-labs/dbt_utils\n    version: 1.1.1\n  - local: ../shared\n",
    );
    write(root, "analytics/models/orders.sql", "select 1");
    write(root, "analytics/models/staging/stg_orders.py", "def model(dbt, s): pass");
    write(root, "analytics/models/schema.yml", "version: 2");
    write(root, "analytics/models/docs.md", "{% docs orders %}{% enddocs %}");
    write(root, "analytics/macros/cents.sql", "{% macro cents() %}{% endmacro %}");
    write(root, "analytics/tests/assert_positive.sql", "select 1");
    write(root, "analytics/data/customers.csv", "id\n1\n");
    write(root, "analytics/models/notes.txt", "ignored");
    dir
}

fn project(overrides: &str) -> ProjectTarget {
    let decl: ProjectTargetDecl = serde_yaml::from_str(&format!(
        "required_adapters: [dbt-duckdb]\ndependencies: [':seeds']\ntags: [dbt]\noverrides: {}",
        overrides
    ))
    .unwrap();
    ProjectTarget::from_decl("analytics", decl, "python-default").unwrap()
}

fn generate(dir: &TempDir, project: &ProjectTarget) -> CoreResult<Vec<Target>> {
    let spec = load_project_spec(dir.path(), project)?;
    generate_targets(dir.path(), project, &spec)
}

#[test]
fn test_generates_targets_for_every_source_directory() {
    let dir = setup_project();
    let targets = generate(&dir, &project("{}")).unwrap();

    let summary: Vec<(String, TargetKind)> = targets
        .iter()
        .map(|t| (t.address.to_string(), t.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("analytics/dbt_project.yml:project".to_string(), TargetKind::GeneratorSourcesHelper),
            ("analytics/packages.yml:project".to_string(), TargetKind::GeneratorSourcesHelper),
            ("analytics:project#data/customers.csv".to_string(), TargetKind::File),
            ("analytics:project#dbt_utils".to_string(), TargetKind::ThirdPartyPackage),
            ("analytics:project#macros/cents.sql".to_string(), TargetKind::Macro),
            ("analytics:project#models/docs.md".to_string(), TargetKind::Doc),
            ("analytics:project#models/orders.sql".to_string(), TargetKind::Model),
            ("analytics:project#models/schema.yml".to_string(), TargetKind::Config),
            ("analytics:project#models/staging/stg_orders.py".to_string(), TargetKind::Model),
            ("analytics:project#tests/assert_positive.sql".to_string(), TargetKind::Test),
        ]
    );
}

#[test]
fn test_generated_targets_copy_generator_fields() {
    let dir = setup_project();
    let targets = generate(&dir, &project("{}")).unwrap();
    let orders = targets
        .iter()
        .find(|t| t.address.generated_name() == Some("models/orders.sql"))
        .unwrap();

    assert_eq!(orders.file_path(), Some("analytics/models/orders.sql"));
    assert_eq!(orders.dependencies, vec![Address::new("analytics", Some("seeds"))]);
    assert_eq!(orders.tags, vec!["dbt"]);
}

#[test]
fn test_overrides_apply_to_matching_file() {
    let dir = setup_project();
    let targets = generate(&dir, &project("{models/orders.sql: {tags: [core]}}")).unwrap();
    let orders = targets
        .iter()
        .find(|t| t.address.generated_name() == Some("models/orders.sql"))
        .unwrap();
    assert_eq!(orders.tags, vec!["core"]);
}

#[test]
fn test_overriding_sources_is_rejected() {
    let dir = setup_project();
    let err = generate(&dir, &project("{models/orders.sql: {sources: [x.sql]}}")).unwrap_err();
    assert!(matches!(err, CoreError::InvalidOverride { .. }));
}

#[test]
fn test_package_targets_carry_their_spec() {
    let dir = setup_project();
    let targets = generate(&dir, &project("{}")).unwrap();
    let package = targets
        .iter()
        .find(|t| t.kind == TargetKind::ThirdPartyPackage)
        .unwrap();
    assert_eq!(package.package_name().as_deref(), Some("dbt_utils"));
    assert_eq!(
        package.package.as_ref().unwrap().get_str("version"),
        Some("1.1.1")
    );
}
