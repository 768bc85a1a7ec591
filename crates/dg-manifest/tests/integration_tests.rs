//! Integration tests for manifest indexing over the sample project

use dg_core::{Address, LoadedProject, TargetKind, TargetUniverse, Workspace};
use dg_manifest::{
    build_dependency_graph, compiled_sql_paths, default_manifest_path, IndexedProject,
    ManifestError,
};
use std::collections::BTreeSet;
use std::path::Path;

const FIXTURE: &str = "tests/fixtures/sample_project";

struct Loaded {
    workspace: Workspace,
    projects: Vec<LoadedProject>,
    universe: TargetUniverse,
}

fn load() -> Loaded {
    let workspace = Workspace::load(Path::new(FIXTURE)).unwrap();
    let projects = workspace.load_all().unwrap();
    let universe = workspace.universe(&projects);
    Loaded {
        workspace,
        projects,
        universe,
    }
}

fn project_address() -> Address {
    Address::new("jaffle", Some("project"))
}

fn generated(rel: &str) -> Address {
    project_address().create_generated(rel)
}

fn names(addresses: &BTreeSet<Address>) -> Vec<String> {
    addresses.iter().map(Address::to_string).collect()
}

#[test]
fn test_workspace_generates_project_targets() {
    let loaded = load();
    assert_eq!(loaded.projects.len(), 1);
    let project = &loaded.projects[0];
    assert_eq!(project.spec.name(), Some("jaffle"));
    assert_eq!(project.target.resolve(), "dbt");

    let kinds: Vec<(String, TargetKind)> = project
        .targets
        .iter()
        .map(|t| (t.address.to_string(), t.kind))
        .collect();
    assert!(kinds.contains(&(
        "jaffle:project#models/fct_orders.sql".to_string(),
        TargetKind::Model
    )));
    assert!(kinds.contains(&(
        "jaffle:project#models/schema.yml".to_string(),
        TargetKind::Config
    )));
    assert!(kinds.contains(&(
        "jaffle:project#dbt_utils".to_string(),
        TargetKind::ThirdPartyPackage
    )));
    assert!(kinds.contains(&(
        "jaffle/dbt_project.yml:project".to_string(),
        TargetKind::GeneratorSourcesHelper
    )));
    assert!(loaded.universe.contains(&project_address()));
}

#[test]
fn test_manifest_nodes_map_onto_addresses() {
    let loaded = load();
    let project = &loaded.projects[0];
    let indexed = IndexedProject::load(loaded.workspace.root(), project, None).unwrap();

    assert_eq!(indexed.manifest.nodes().len(), 8);
    assert_eq!(
        indexed.index.address_for("model.jaffle.fct_orders"),
        Some(&generated("models/fct_orders.sql"))
    );
    assert_eq!(
        indexed.index.address_for("macro.dbt_utils.safe_divide"),
        Some(&generated("dbt_utils"))
    );
    assert_eq!(indexed.index.address_for("macro.dbt.test_not_null"), None);
    assert_eq!(
        indexed.index.unique_ids(&generated("models/schema.yml")),
        Some(&BTreeSet::from([
            "test.jaffle.not_null_fct_orders_order_id.5c1a1c8e".to_string()
        ]))
    );
}

#[test]
fn test_index_and_reverse_index_agree() {
    let loaded = load();
    let indexed = IndexedProject::load(loaded.workspace.root(), &loaded.projects[0], None).unwrap();

    for unique_id in indexed.manifest.nodes().keys() {
        if let Some(address) = indexed.index.address_for(unique_id) {
            assert!(indexed.index.unique_ids(address).unwrap().contains(unique_id));
        }
    }
    for (address, unique_ids) in indexed.index.iter() {
        for unique_id in unique_ids {
            assert_eq!(indexed.index.address_for(unique_id), Some(address));
        }
    }
}

#[test]
fn test_inferred_dependencies() {
    let loaded = load();
    let indexed = IndexedProject::load(loaded.workspace.root(), &loaded.projects[0], None).unwrap();
    let deps = indexed.dependencies(&loaded.universe);

    assert_eq!(
        names(&deps[&generated("models/fct_orders.sql")]),
        vec![
            "jaffle:project#models/schema.yml",
            "jaffle:project#models/stg_orders.sql",
            "jaffle:project#tests/assert_positive_amount.sql",
        ]
    );
    assert_eq!(
        names(&deps[&generated("models/stg_orders.sql")]),
        vec!["jaffle:project#seeds/raw_orders.csv"]
    );
    assert_eq!(
        names(&deps[&generated("macros/cents.sql")]),
        vec!["jaffle:project#dbt_utils"]
    );
    assert_eq!(
        names(&deps[&generated("tests/assert_positive_amount.sql")]),
        vec!["jaffle:project#models/fct_orders.sql"]
    );
    assert!(deps[&generated("seeds/raw_orders.csv")].is_empty());
    assert_eq!(
        names(&deps[&project_address()]),
        vec!["3rdparty/python:dbt-core", "3rdparty/python:dbt-duckdb"]
    );
}

#[test]
fn test_dependency_graph_queries() {
    let loaded = load();
    let indexed =
        vec![IndexedProject::load(loaded.workspace.root(), &loaded.projects[0], None).unwrap()];
    let graph = build_dependency_graph(&indexed, &loaded.universe);

    assert_eq!(
        names(&graph.dependents(&generated("models/stg_orders.sql")).unwrap()),
        vec!["jaffle:project#models/fct_orders.sql"]
    );
    assert_eq!(
        names(&graph.descendants(&generated("seeds/raw_orders.csv")).unwrap()),
        vec![
            "jaffle:project#models/fct_orders.sql",
            "jaffle:project#models/schema.yml",
            "jaffle:project#models/stg_orders.sql",
            "jaffle:project#tests/assert_positive_amount.sql",
        ]
    );

    // schema files and singular tests point back at the models they describe
    let err = graph.topological_order().unwrap_err();
    assert!(matches!(err, ManifestError::CircularDependency { .. }));
}

#[test]
fn test_compiled_sql_location() {
    let loaded = load();
    let project = &loaded.projects[0];
    let indexed = IndexedProject::load(loaded.workspace.root(), project, None).unwrap();
    let target = loaded
        .universe
        .get(&generated("models/fct_orders.sql"))
        .unwrap();

    let compiled = compiled_sql_paths(
        target,
        &project.target,
        &project.spec,
        &indexed.manifest,
        &indexed.index,
    )
    .unwrap();
    assert_eq!(
        compiled,
        vec!["jaffle/target/compiled/jaffle/models/fct_orders.sql"]
    );
}

#[test]
fn test_default_manifest_path() {
    let loaded = load();
    let path = default_manifest_path(loaded.workspace.root(), &loaded.projects[0]);
    assert!(path.ends_with("jaffle/target/manifest.json"));
    assert!(path.is_file());
}
