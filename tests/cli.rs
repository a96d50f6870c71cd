use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_export_command() {
    let mut cmd = Command::cargo_bin("worldstats").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"));
}

#[test]
fn export_help_documents_the_flags() {
    let mut cmd = Command::cargo_bin("worldstats").unwrap();
    cmd.args(["export", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--year"))
        .stdout(predicate::str::contains("--stats"))
        .stdout(predicate::str::contains("--base-url"));
}

#[test]
fn unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("worldstats").unwrap();
    cmd.arg("frobnicate").assert().failure();
}
