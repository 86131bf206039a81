//! Integration tests for top-level CLI behavior.

use std::process::Command;

fn run_triage(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_triage");
    Command::new(bin)
        .args(args)
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("TRIAGE_RECORD")
        .output()
        .expect("failed to run triage binary")
}

#[test]
fn help_lists_subcommands() {
    let output = run_triage(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for subcommand in ["feedback", "release-notes", "linked-prs"] {
        assert!(stdout.contains(subcommand), "help is missing {subcommand}");
    }
}

#[test]
fn feedback_help_shows_dry_run() {
    let output = run_triage(&["feedback", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn release_notes_without_issue_shows_error() {
    let output = run_triage(&["release-notes"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("--issue"));
}

#[test]
fn missing_repository_is_reported() {
    let output = run_triage(&["linked-prs", "--issue", "1"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("GITHUB_REPOSITORY"));
}

#[test]
fn malformed_repository_is_reported() {
    let output = run_triage(&["--repo", "gradle", "feedback", "--dry-run"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("owner/name"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let output = run_triage(&["nonsense"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}
