use super::*;
use crate::checksum::compute_checksum;
use std::path::Path;
use tempfile::TempDir;

fn decl(yaml: &str) -> ProjectTargetDecl {
    serde_yaml::from_str(yaml).unwrap()
}

fn project_target(packages_file: Option<&str>) -> ProjectTarget {
    let mut yaml = "required_adapters: [dbt-duckdb]\n".to_string();
    if let Some(file) = packages_file {
        yaml.push_str(&format!("packages_file: {}\n", file));
    }
    ProjectTarget::from_decl("a", decl(&yaml), "python-default").unwrap()
}

/// Write `a/dbt_project.yml` and, when given, the package manifest
fn write_project(
    root: &Path,
    requires_dbt_version: &str,
    packages_file: Option<&str>,
    packages_contents: Option<&str>,
) {
    std::fs::create_dir_all(root.join("a")).unwrap();
    std::fs::write(
        root.join("a/dbt_project.yml"),
        format!("name: a\nrequires-dbt-version: {}\n", requires_dbt_version),
    )
    .unwrap();
    if let Some(contents) = packages_contents {
        std::fs::write(
            root.join("a").join(packages_file.unwrap_or("packages.yml")),
            contents,
        )
        .unwrap();
    }
}

const PACKAGES: &str = "packages:\n  - a: b\n  - c: d\n";

fn load(requires: &str, packages_file: Option<&str>, contents: Option<&str>) -> CoreResult<ProjectSpec> {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), requires, packages_file, contents);
    load_project_spec(dir.path(), &project_target(packages_file))
}

#[test]
fn test_decl_defaults() {
    let decl = decl("required_adapters: [dbt-duckdb]");
    assert_eq!(decl.name, "project");
    assert_eq!(decl.project_file, "dbt_project.yml");
    assert_eq!(decl.profiles_file, "profiles.yml");
    assert_eq!(decl.packages_file, "packages.yml");
    assert_eq!(decl.env_vars, EnvVarsField::default());
}

#[test]
fn test_decl_requires_adapters() {
    assert!(serde_yaml::from_str::<ProjectTargetDecl>("name: project").is_err());
}

#[test]
fn test_decl_rejects_unknown_fields() {
    assert!(
        serde_yaml::from_str::<ProjectTargetDecl>("required_adapters: []\nsources: x").is_err()
    );
}

#[test]
fn test_packages_file_must_be_recognized() {
    let err = ProjectTarget::from_decl(
        "a",
        decl("required_adapters: []\npackages_file: deps.yml"),
        "python-default",
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "[P002] Invalid field `packages_file` at address a:project: must equal one of \
         'packages.yml', 'dependencies.yml' or 'package-lock.yml'"
    );
}

#[test]
fn test_project_file_must_be_dbt_project_yml() {
    let err = ProjectTarget::from_decl(
        "a",
        decl("required_adapters: []\nproject_file: project.yml"),
        "python-default",
    )
    .unwrap_err();
    assert!(err.to_string().contains("must equal 'dbt_project.yml'"));
}

#[test]
fn test_project_target_directories() {
    let target = ProjectTarget::from_decl(
        "analytics",
        decl(
            "required_adapters: [dbt-duckdb]\nproject_file: dbt/dbt_project.yml\nprofiles_file: profiles/profiles.yml",
        ),
        "python-default",
    )
    .unwrap();
    assert_eq!(target.project_dir(), "analytics/dbt");
    assert_eq!(target.profiles_dir(), "analytics/profiles");
    assert_eq!(target.project_file_path(), "analytics/dbt/dbt_project.yml");
    assert_eq!(target.packages_file_path(), "analytics/packages.yml");
    assert_eq!(target.resolve(), "python-default");
}

#[test]
fn test_project_target_at_build_root() {
    let target = ProjectTarget::from_decl("", decl("required_adapters: []"), "py").unwrap();
    assert_eq!(target.project_dir(), "");
    assert_eq!(target.project_file_path(), "dbt_project.yml");
}

#[test]
fn test_legacy_packages_file_skips_version_check() {
    for requires in ["\"<1.7\"", "\"<1.7,>=1.5\"", "[\"<1.7\", \">=1.5\"]"] {
        let spec = load(requires, None, Some(PACKAGES)).unwrap();
        assert_eq!(spec.name(), Some("a"));
        assert_eq!(spec.packages().len(), 2);
        assert_eq!(spec.third_party_packages().count(), 0);
    }
}

#[test]
fn test_lockfile_requires_dbt_1_7() {
    for requires in ["\"<1.7,>=1.5\"", "[\"<1.7\", \">=1.5\"]", "\"<1.7\""] {
        let err = load(requires, Some("package-lock.yml"), Some(PACKAGES)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidProject { .. }));
        assert_eq!(err.project_name(), Some("a"));
        assert!(err
            .to_string()
            .contains("package-lock.yml is only valid for dbt versions >=1.7"));
    }
}

#[test]
fn test_lockfile_accepted_for_new_enough_dbt() {
    for requires in [
        "\">=1.7\"",
        "[\">=1.7\"]",
        "\">=1.7.0,<2.0.0\"",
        "\">=1.7.0.post1,<2.0\"",
        "[\">=1.8.0rc1\", \"<2.0\"]",
    ] {
        let spec = load(requires, Some("package-lock.yml"), Some(PACKAGES)).unwrap();
        assert_eq!(spec.packages().len(), 2);
    }
}

#[test]
fn test_dependencies_file_requires_dbt_1_6() {
    assert!(load("\">=1.6\"", Some("dependencies.yml"), Some(PACKAGES)).is_ok());
    assert!(load("\">=1.5\"", Some("dependencies.yml"), Some(PACKAGES)).is_err());
}

#[test]
fn test_missing_requires_dbt_version_fails_for_new_formats() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("a")).unwrap();
    std::fs::write(dir.path().join("a/dbt_project.yml"), "name: a\n").unwrap();
    let err = load_project_spec(dir.path(), &project_target(Some("dependencies.yml"))).unwrap_err();
    assert!(matches!(err, CoreError::InvalidProject { .. }));
}

#[test]
fn test_missing_packages_header() {
    let err = load("\"<1.7\"", None, Some("bad_dict: yadda\n")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "[P001] Project a is invalid due to: Invalid packages file without `packages` header."
    );
}

#[test]
fn test_missing_packages_file_yields_no_packages() {
    let spec = load("\">=1.5\"", None, None).unwrap();
    assert!(spec.packages().is_empty());
}

#[test]
fn test_missing_project_file() {
    let dir = TempDir::new().unwrap();
    let err = load_project_spec(dir.path(), &project_target(None)).unwrap_err();
    assert!(matches!(err, CoreError::InvalidProject { .. }));
    assert!(err.to_string().contains("dbt_project"));
    assert!(err.to_string().contains("a:project"));
}

#[test]
fn test_spec_contents_and_digest() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path(), "\">=1.7\"", None, Some(PACKAGES));
    let spec = load_project_spec(dir.path(), &project_target(None)).unwrap();

    let raw = std::fs::read(dir.path().join("a/dbt_project.yml")).unwrap();
    assert_eq!(spec.digest(), compute_checksum(raw));
    assert_eq!(spec.contents().len(), 2);
    assert_eq!(spec.target_path(), "target");
    assert_eq!(spec.profile(), None);
    assert_eq!(spec.requires_dbt_version().unwrap().to_string(), ">=1.7");
}

#[test]
fn test_path_lists_fall_back_to_dbt_defaults() {
    let mut mapping = Mapping::new();
    mapping.insert("model-paths".into(), serde_yaml::from_str("[models, marts]").unwrap());
    let spec = ProjectSpec::new(mapping, String::new(), Vec::new());

    assert_eq!(spec.path_list(MODEL_PATHS), vec!["models", "marts"]);
    assert_eq!(spec.path_list(MACRO_PATHS), vec!["macros"]);
    assert_eq!(spec.path_list(SEED_PATHS), vec!["seeds"]);
}
