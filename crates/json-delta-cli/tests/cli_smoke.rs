use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::NamedTempFile;

fn write_json(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn version_flag_prints_banner() {
    Command::cargo_bin("json-delta").unwrap().arg("--version").assert().success().stdout(contains("json-delta version"));
}

#[test]
fn diff_then_patch_round_trips() {
    let a = write_json(r#"{"name":"ada","count":1}"#);
    let b = write_json(r#"{"name":"ada","count":2}"#);

    let diff_output = Command::cargo_bin("json-delta")
        .unwrap()
        .arg("diff")
        .arg(a.path())
        .arg(b.path())
        .output()
        .expect("run diff");
    assert!(diff_output.status.success());

    let operation = write_json(std::str::from_utf8(&diff_output.stdout).unwrap());

    Command::cargo_bin("json-delta")
        .unwrap()
        .arg("patch")
        .arg(a.path())
        .arg(operation.path())
        .assert()
        .success()
        .stdout(contains("\"count\": 2"));
}

#[test]
fn missing_subcommand_is_an_error() {
    Command::cargo_bin("json-delta").unwrap().assert().failure();
}
