use super::*;

#[tokio::test]
async fn write_output_creates_squad_skill_path() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path());
    let path = ws.write_output("creative", "copywriting", "copywriting-20260216-abc123", "# Draft\n\nHello.").await.unwrap();
    assert_eq!(path, "outputs/creative/copywriting/copywriting-20260216-abc123.md");
    let content = ws.read_output(&path).await.unwrap();
    assert_eq!(content, "# Draft\n\nHello.");
}
