use super::*;

#[test]
fn test_join_handles_root() {
    assert_eq!(join("", "dbt_project.yml"), "dbt_project.yml");
    assert_eq!(join("a", "dbt_project.yml"), "a/dbt_project.yml");
    assert_eq!(join("a/", "./models/x.sql"), "a/models/x.sql");
    assert_eq!(join("a", ""), "a");
}

#[test]
fn test_dirname_and_basename() {
    assert_eq!(dirname("a/b/c.sql"), "a/b");
    assert_eq!(dirname("c.sql"), "");
    assert_eq!(basename("a/b/c.sql"), "c.sql");
    assert_eq!(basename("c.sql"), "c.sql");
}

#[test]
fn test_normalize() {
    assert_eq!(normalize("a/./b/../c"), "a/c");
    assert_eq!(normalize("../a"), "../a");
    assert_eq!(normalize("a//b/"), "a/b");
}

#[test]
fn test_relpath() {
    assert_eq!(relpath("proj/models/a.sql", "proj"), "models/a.sql");
    assert_eq!(relpath("proj/models/a.sql", ""), "proj/models/a.sql");
    assert_eq!(relpath("other/a.sql", "proj/sub"), "../../other/a.sql");
    assert_eq!(relpath("proj", "proj"), ".");
}

#[test]
fn test_to_relative_string() {
    let root = Path::new("/build/root");
    assert_eq!(
        to_relative_string(Path::new("/build/root/a/b.sql"), root).as_deref(),
        Some("a/b.sql")
    );
    assert!(to_relative_string(Path::new("/elsewhere/b.sql"), root).is_none());
}
