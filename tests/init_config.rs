//! Integration tests for `relogic init`.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn relogic() -> Command {
    Command::cargo_bin("relogic").expect("relogic binary")
}

#[test]
fn init_writes_default_config() {
    let tmp = assert_fs::TempDir::new().unwrap();

    relogic()
        .args(["init", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    tmp.child("relogic.toml")
        .assert(predicate::str::contains("frequency_hz = 50.0"))
        .assert(predicate::str::contains("blocking_term = \"HALARM\""));
}

#[test]
fn init_refuses_to_clobber_without_force() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let config = tmp.child("relogic.toml");
    config.write_str("frequency_hz = 60.0\n").unwrap();

    relogic()
        .args(["init", tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    config.assert("frequency_hz = 60.0\n");

    relogic()
        .args(["init", tmp.path().to_str().unwrap(), "--force"])
        .assert()
        .success();

    config.assert(predicate::str::contains("frequency_hz = 50.0"));
}
