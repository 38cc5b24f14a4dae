//! Declining the confirmation gate is a successful no-op, not a failure.

use std::io::Write;
use std::process::Stdio;

use tempfile::tempdir;

mod common;

fn run_with_answer(answer: &str) -> std::process::Output {
    let dir = tempdir().unwrap();
    common::write_config(dir.path());

    let mut child = common::cutover_cmd(dir.path())
        .args(["deploy", "--instance", "production"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(answer.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_answering_no_exits_cleanly() {
    let output = run_with_answer("no\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("We are about to deploy the instance 'production'"));
    assert!(stdout.contains("web1.example.com, web2.example.com"));
    assert!(stdout.contains("You did not type 'yes' - aborting."));
}

#[test]
fn test_empty_answer_declines() {
    let output = run_with_answer("\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("You did not type 'yes' - aborting."));
}

#[test]
fn test_single_letter_y_declines() {
    let output = run_with_answer("y\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("You did not type 'yes' - aborting."));
}
