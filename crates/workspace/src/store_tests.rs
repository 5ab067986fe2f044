use super::*;

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    ws.write_file("tasks/abc.md", "hello").await.unwrap();
    let contents = ws.read_file("tasks/abc.md").await.unwrap();
    assert_eq!(contents, "hello");
}

#[tokio::test]
async fn write_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    ws.write_file("outputs/creative/copywriting/t1.md", "x").await.unwrap();
    assert!(ws.file_exists("outputs/creative/copywriting/t1.md").await.unwrap());
}

#[tokio::test]
async fn read_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let err = ws.read_file("tasks/missing.md").await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn file_exists_false_for_missing() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    assert!(!ws.file_exists("tasks/missing.md").await.unwrap());
}

#[tokio::test]
async fn delete_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    ws.write_file("tasks/abc.md", "hello").await.unwrap();
    ws.delete_file("tasks/abc.md").await.unwrap();
    assert!(!ws.file_exists("tasks/abc.md").await.unwrap());
}

#[tokio::test]
async fn delete_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let err = ws.delete_file("tasks/missing.md").await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn list_files_filters_by_extension_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    ws.write_file("tasks/b.md", "1").await.unwrap();
    ws.write_file("tasks/a.md", "2").await.unwrap();
    ws.write_file("tasks/notes.txt", "3").await.unwrap();

    let files = ws.list_files("tasks", ".md").await.unwrap();
    assert_eq!(files, vec!["tasks/a.md".to_string(), "tasks/b.md".to_string()]);
}

#[tokio::test]
async fn list_files_on_missing_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let files = ws.list_files("tasks", ".md").await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn path_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let err = ws.read_file("../escape.md").await.unwrap_err();
    assert_eq!(err.code(), "INVALID_PATH");
}
