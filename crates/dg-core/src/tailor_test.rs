use super::*;
use tempfile::TempDir;

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in [
        "a/dbt_project.yml",
        "b/dbt_project.yml",
        "c/dbt_project.yml",
        "c/dbt_packages/dbt_utils/dbt_project.yml",
        ".venv/lib/dbt_project.yml",
    ] {
        let path = dir.path().join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "name: mock").unwrap();
    }
    dir
}

#[test]
fn test_tailor_skips_owned_projects() {
    let dir = setup();
    let owned: BTreeSet<String> = ["a/dbt_project.yml".to_string()].into();
    let putative = find_unowned_projects(dir.path(), &Settings::default(), &owned).unwrap();

    assert_eq!(
        putative,
        vec![
            PutativeTarget {
                path: "b".to_string(),
                name: "project".to_string(),
                kind: TargetKind::Project,
                triggering_sources: vec!["b/dbt_project.yml".to_string()],
                owned_sources: vec!["b/dbt_project.yml".to_string()],
            },
            PutativeTarget {
                path: "c".to_string(),
                name: "project".to_string(),
                kind: TargetKind::Project,
                triggering_sources: vec!["c/dbt_project.yml".to_string()],
                owned_sources: vec!["c/dbt_project.yml".to_string()],
            },
        ]
    );
}

#[test]
fn test_tailor_disabled() {
    let dir = setup();
    let settings = Settings {
        tailor_project_targets: false,
        ..Settings::default()
    };
    assert!(find_unowned_projects(dir.path(), &settings, &BTreeSet::new())
        .unwrap()
        .is_empty());
}

#[test]
fn test_render_snippet() {
    let target = PutativeTarget {
        path: "b".to_string(),
        name: "project".to_string(),
        kind: TargetKind::Project,
        triggering_sources: vec![],
        owned_sources: vec![],
    };
    assert_eq!(
        target.render(),
        "dbt_project:\n  name: project\n  required_adapters: []\n"
    );
}
