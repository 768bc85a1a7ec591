use super::*;

fn model(name: &str) -> Target {
    let generator = Address::new("analytics", Some("project"));
    let rel = format!("models/{}", name);
    Target::new(generator.create_generated(&rel), TargetKind::Model)
        .with_source(format!("analytics/{}", rel))
}

#[test]
fn test_owners_by_file() {
    let universe = TargetUniverse::new([model("b.sql"), model("a.sql")]);

    let owners = universe.owners("analytics/models/a.sql");
    assert_eq!(owners.len(), 1);
    assert_eq!(
        owners.iter().next().unwrap().to_string(),
        "analytics:project#models/a.sql"
    );
    assert!(universe.owners("analytics/./models/../models/b.sql").len() == 1);
    assert!(universe.owners("analytics/models/c.sql").is_empty());
}

#[test]
fn test_targets_are_sorted_and_deduplicated() {
    let universe = TargetUniverse::new([model("b.sql"), model("a.sql"), model("a.sql")]);
    assert_eq!(universe.len(), 2);
    let names: Vec<String> = universe.iter().map(|t| t.address.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "analytics:project#models/a.sql",
            "analytics:project#models/b.sql"
        ]
    );
}

#[test]
fn test_lookup_by_address_and_kind() {
    let universe = TargetUniverse::new([model("a.sql")]);
    let address = Address::new("analytics", Some("project")).create_generated("models/a.sql");
    assert!(universe.contains(&address));
    assert_eq!(universe.get(&address).unwrap().kind, TargetKind::Model);
    assert_eq!(universe.of_kind(TargetKind::Model).count(), 1);
    assert_eq!(universe.of_kind(TargetKind::Macro).count(), 0);
}
