use super::*;

fn generator() -> Address {
    Address::new("analytics", Some("project"))
}

#[test]
fn test_kind_aliases_round_trip_through_serde() {
    for kind in [
        TargetKind::Project,
        TargetKind::Model,
        TargetKind::ThirdPartyPackage,
        TargetKind::GeneratorSourcesHelper,
    ] {
        let yaml = serde_yaml::to_string(&kind).unwrap();
        assert_eq!(yaml.trim(), kind.alias());
        let parsed: TargetKind = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, kind);
    }
}

#[test]
fn test_indexable_kinds() {
    assert!(TargetKind::Model.is_indexable_file());
    assert!(TargetKind::Config.is_indexable_file());
    assert!(TargetKind::File.is_indexable_file());
    assert!(!TargetKind::File.is_dbt_source());
    assert!(!TargetKind::ThirdPartyPackage.is_indexable_file());
    assert!(!TargetKind::Project.is_indexable_file());
}

#[test]
fn test_requirement_project_names() {
    assert_eq!(requirement_project_name("dbt-core~=1.7.0"), "dbt-core");
    assert_eq!(requirement_project_name("dbt_duckdb"), "dbt-duckdb");
    assert_eq!(requirement_project_name("Dbt.Snowflake>=1.7"), "dbt-snowflake");
    assert_eq!(requirement_project_name("requests[socks]==2.0"), "requests");
}

#[test]
fn test_python_requirement_uses_first_entry() {
    let requirement = PythonRequirement {
        requirements: vec!["dbt-duckdb".to_string(), "duckdb".to_string()],
        resolve: "python-default".to_string(),
    };
    assert_eq!(requirement.project_name().as_deref(), Some("dbt-duckdb"));
}

#[test]
fn test_third_party_package_name() {
    let mut target = Target::new(
        generator().create_generated("a/git/project"),
        TargetKind::ThirdPartyPackage,
    );
    target.package = Some(serde_yaml::from_str("git: https://github.com/a/git/project.git").unwrap());
    assert_eq!(target.package_name().as_deref(), Some("project"));
}

#[test]
fn test_apply_overrides() {
    let mut target = Target::new(generator().create_generated("models/a.sql"), TargetKind::Model);
    let overrides: Mapping =
        serde_yaml::from_str("{tags: [nightly], description: Orders, dependencies: [':seeds']}")
            .unwrap();
    target.apply_overrides(&overrides, &generator()).unwrap();

    assert_eq!(target.tags, vec!["nightly"]);
    assert_eq!(target.description.as_deref(), Some("Orders"));
    assert_eq!(target.dependencies, vec![Address::new("analytics", Some("seeds"))]);
}

#[test]
fn test_sources_cannot_be_overridden() {
    let mut target = Target::new(generator().create_generated("models/a.sql"), TargetKind::Model);
    let overrides: Mapping = serde_yaml::from_str("sources: [other.sql]").unwrap();
    let err = target.apply_overrides(&overrides, &generator()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "[P003] Cannot override field `sources` for target at address analytics:project"
    );
}

#[test]
fn test_unknown_override_field() {
    let mut target = Target::new(generator().create_generated("models/a.sql"), TargetKind::Model);
    let overrides: Mapping = serde_yaml::from_str("materialized: table").unwrap();
    assert!(matches!(
        target.apply_overrides(&overrides, &generator()),
        Err(CoreError::InvalidField { .. })
    ));
}
