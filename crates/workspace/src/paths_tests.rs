use super::*;
use std::path::Path;

#[test]
fn resolves_simple_relative_path() {
    let root = Path::new("/workspace");
    let resolved = resolve(root, "tasks/abc.md").unwrap();
    assert_eq!(resolved, Path::new("/workspace/tasks/abc.md"));
}

#[test]
fn rejects_parent_dir_traversal() {
    let root = Path::new("/workspace");
    assert!(resolve(root, "../etc/passwd").is_err());
    assert!(resolve(root, "tasks/../../etc/passwd").is_err());
}

#[test]
fn rejects_absolute_path() {
    let root = Path::new("/workspace");
    assert!(resolve(root, "/etc/passwd").is_err());
}

#[test]
fn rejects_empty_path() {
    let root = Path::new("/workspace");
    assert!(resolve(root, "").is_err());
}

#[test]
fn curdir_components_are_ignored() {
    let root = Path::new("/workspace");
    let resolved = resolve(root, "./tasks/./abc.md").unwrap();
    assert_eq!(resolved, Path::new("/workspace/tasks/abc.md"));
}

#[test]
fn lock_path_appends_suffix() {
    let target = Path::new("/workspace/tasks/abc.md");
    assert_eq!(lock_path(target), Path::new("/workspace/tasks/abc.md.lock"));
}
