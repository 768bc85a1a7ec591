use super::*;
use crate::error::ManifestError;
use dg_core::{Address, CoreError, ProjectTargetDecl, TargetKind};
use serde_json::json;

fn project() -> ProjectTarget {
    let decl: ProjectTargetDecl =
        serde_yaml::from_str("required_adapters: [dbt-duckdb]").unwrap();
    ProjectTarget::from_decl("analytics", decl, "python-default").unwrap()
}

fn spec() -> ProjectSpec {
    ProjectSpec::new(
        serde_yaml::from_str("{name: jaffle, profile: jaffle, target-path: build}").unwrap(),
        String::new(),
        Vec::new(),
    )
}

fn target(rel: &str) -> Target {
    Target::new(
        Address::new("analytics", Some("project")).create_generated(rel),
        TargetKind::Model,
    )
    .with_source(format!("analytics/{}", rel))
}

fn manifest() -> BuildManifest {
    BuildManifest::new(
        Address::new("analytics", Some("project")),
        json!({
            "nodes": {
                "model.jaffle.orders": {
                    "original_file_path": "models/orders.sql",
                    "unique_id": "model.jaffle.orders",
                    "resource_type": "model",
                    "package_name": "jaffle"
                },
                "model.jaffle.customers": {
                    "original_file_path": "models/customers.sql",
                    "unique_id": "model.jaffle.customers",
                    "resource_type": "model",
                    "package_name": "jaffle",
                    "compiled_path": "build/compiled/jaffle/models/customers.sql"
                },
                "seed.jaffle.raw": {
                    "original_file_path": "models/orders.sql",
                    "unique_id": "seed.jaffle.raw",
                    "resource_type": "seed"
                }
            }
        }),
        String::new(),
    )
}

fn paths_for(rel: &str) -> ManifestResult<Vec<String>> {
    let manifest = manifest();
    let targets = [target("models/orders.sql"), target("models/customers.sql")];
    let index = AddressIndex::build(&manifest, "analytics", targets.iter());
    compiled_sql_paths(&target(rel), &project(), &spec(), &manifest, &index)
}

#[test]
fn test_compiled_path_from_package_and_original_file() {
    assert_eq!(
        paths_for("models/orders.sql").unwrap(),
        vec!["analytics/build/compiled/jaffle/models/orders.sql"]
    );
}

#[test]
fn test_recorded_compiled_path_wins() {
    assert_eq!(
        paths_for("models/customers.sql").unwrap(),
        vec!["analytics/build/compiled/jaffle/models/customers.sql"]
    );
}

#[test]
fn test_unindexed_target_has_no_compiled_sql() {
    assert!(paths_for("models/missing.sql").unwrap().is_empty());
}

#[test]
fn test_unowned_target_fails() {
    let manifest = manifest();
    let index = AddressIndex::default();
    let loose = Target::new(Address::new("analytics", Some("loose")), TargetKind::Model);
    let err = compiled_sql_paths(&loose, &project(), &spec(), &manifest, &index).unwrap_err();
    assert!(matches!(
        err,
        ManifestError::Core(CoreError::UnownedComponent { .. })
    ));
}
