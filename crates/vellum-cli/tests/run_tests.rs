//! End-to-end runs over a temporary content root.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vellum_cli::run;
use vellum_config::VellumConfig;
use vellum_pipeline::ProcessMode;

// ============================================================================
// Helpers
// ============================================================================

fn vault() -> (TempDir, VellumConfig) {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("essays")).unwrap();
    fs::create_dir_all(temp.path().join("journal")).unwrap();
    let config = VellumConfig {
        content_root: temp.path().to_path_buf(),
        ..Default::default()
    };
    (temp, config)
}

fn write(root: &Path, rel: &str, text: &str) {
    fs::write(root.join(rel), text).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

// ============================================================================
// Runs
// ============================================================================

#[tokio::test]
async fn test_check_reports_without_touching_notes() {
    let (temp, config) = vault();
    let original = "---\ntitle: ''\n---\nBody\n";
    write(temp.path(), "essays/first-note.md", original);

    let result = run(&config, ProcessMode::Check).await.unwrap();

    assert_eq!(result.summary.processed, 1);
    assert_eq!(result.summary.changed, 0);
    assert_eq!(result.exit_code(), 0);
    assert_eq!(read(temp.path(), "essays/first-note.md"), original);

    let report = result.report.expect("report written");
    assert!(report.starts_with(temp.path().join(".reports")));
    let text = fs::read_to_string(report).unwrap();
    assert!(text.contains("# Frontmatter Report"));
    assert!(text.contains("first-note.md"));
}

#[tokio::test]
async fn test_fix_rewrites_and_skips_untemplated() {
    let (temp, config) = vault();
    write(temp.path(), "essays/first-note.md", "---\ntitle: ''\n---\nBody\n");
    write(temp.path(), "journal/today.md", "No frontmatter here\n");

    let result = run(&config, ProcessMode::Fix).await.unwrap();

    assert_eq!(result.summary.processed, 1);
    assert_eq!(result.summary.changed, 1);
    assert_eq!(result.summary.skipped, 1);

    let fixed = read(temp.path(), "essays/first-note.md");
    assert!(fixed.starts_with("---\ntitle: First Note\n"));
    assert!(fixed.ends_with("---\nBody\n"));
    assert_eq!(read(temp.path(), "journal/today.md"), "No frontmatter here\n");
}

#[tokio::test]
async fn test_second_fix_changes_nothing() {
    let (temp, config) = vault();
    write(temp.path(), "essays/note.md", "Just a body\n");

    run(&config, ProcessMode::Fix).await.unwrap();
    let once = read(temp.path(), "essays/note.md");

    let result = run(&config, ProcessMode::Fix).await.unwrap();
    assert_eq!(result.summary.changed, 0);
    assert_eq!(read(temp.path(), "essays/note.md"), once);
}

#[tokio::test]
async fn test_unreadable_note_sets_failure_exit_code() {
    let (temp, config) = vault();
    fs::write(temp.path().join("essays/binary.md"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
    write(temp.path(), "essays/fine.md", "---\ntitle: Fine\n---\n");

    let result = run(&config, ProcessMode::Fix).await.unwrap();

    assert_eq!(result.summary.failed, 1);
    assert_eq!(result.summary.processed, 1);
    assert_eq!(result.exit_code(), 1);
    let text = fs::read_to_string(result.report.unwrap()).unwrap();
    assert!(text.contains("binary.md"));
}

#[tokio::test]
async fn test_missing_content_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let config = VellumConfig {
        content_root: temp.path().join("absent"),
        ..Default::default()
    };
    assert!(run(&config, ProcessMode::Check).await.is_err());
}
