//! End-to-end tests for the document rewriting commands.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn relogic() -> Command {
    Command::cargo_bin("relogic").expect("relogic binary")
}

#[test]
fn rename_applies_all_pairs_in_one_pass() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    input
        .write_str("PSV01 := IN201\nPSV02 := PSV01 AND IN202\n")
        .unwrap();
    let out = tmp.child("out.txt");

    // Chained pairs must not cascade: PSV01 lands on PSV02's old name.
    relogic()
        .args([
            "rename",
            input.path().to_str().unwrap(),
            "--map",
            "PSV01=PSV02",
            "--map",
            "PSV02=PSV03",
            "-o",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    out.assert("PSV02 := IN201\nPSV03 := PSV02 AND IN202\n");
}

#[test]
fn rename_rejects_malformed_pair() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    input.write_str("PSV01 := IN201\n").unwrap();

    relogic()
        .args(["rename", input.path().to_str().unwrap(), "--map", "PSV01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OLD=NEW"));
}

#[test]
fn change_domain_moves_latch_and_repads_width() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    input
        .write_str("PLT13S := IN201\nPLT13R := IN202\nPSV05 := PLT13 # latched\n")
        .unwrap();
    let out = tmp.child("out.txt");

    relogic()
        .args([
            "change-domain",
            input.path().to_str().unwrap(),
            "PLT13",
            "--to",
            "automation",
            "-o",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("PLT13S -> ALT13S"));

    out.assert("ALT13S := IN201\nALT13R := IN202\nPSV05 := ALT13 # latched\n");
}

#[test]
fn change_domain_refuses_conditioning_timers() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    input.write_str("PCT01IN := IN201\n").unwrap();

    relogic()
        .args([
            "change-domain",
            input.path().to_str().unwrap(),
            "PCT01",
            "--to",
            "automation",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no counterpart in the other domain"));
}

#[test]
fn convert_timers_rewrites_pickup_only_instance() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    input
        .write_str(
            "PCT01PU := 250.000000\n\
             PCT01DO := 0.000000\n\
             PCT01IN := PSV02\n\
             ASV001 := PCT01Q AND PLT01\n",
        )
        .unwrap();
    let out = tmp.child("out.txt");

    relogic()
        .args([
            "--no-color",
            "convert-timers",
            input.path().to_str().unwrap(),
            "PCT1",
            "--frequency",
            "50",
            "-o",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("PCT01: converted -> PST01"));

    out.assert(
        "PST01PT := 5.00000\n\
         PST01R := NOT (PSV02)\n\
         PST01IN := PSV02\n\
         ASV001 := PST01Q AND PLT01\n",
    );
}

#[test]
fn convert_timers_leaves_two_threshold_instances_alone() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    let text = "PCT03PU := 5.000000\nPCT03DO := 5.000000\nPCT03IN := IN201\n";
    input.write_str(text).unwrap();
    let out = tmp.child("out.txt");

    relogic()
        .args([
            "--no-color",
            "convert-timers",
            input.path().to_str().unwrap(),
            "PCT3",
            "-o",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("rejected"));

    out.assert(text);
}

#[test]
fn reorder_compacts_numbers_onto_fresh_slots() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    input
        .write_str("PLT05S := IN201\nPLT05R := IN202\nPSV01 := PLT05\n")
        .unwrap();
    let out = tmp.child("out.txt");

    relogic()
        .args([
            "reorder",
            input.path().to_str().unwrap(),
            "PLT",
            "--floor",
            "1",
            "-o",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("PLT05 -> PLT01"));

    out.assert("PLT01S := IN201\nPLT01R := IN202\nPSV01 := PLT01\n");
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("logic.txt");
    input.write_str("PSV01 := IN201\n").unwrap();
    let out = tmp.child("out.txt");

    relogic()
        .args([
            "--dry-run",
            "rename",
            input.path().to_str().unwrap(),
            "--map",
            "PSV01=PSV02",
            "-o",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    out.assert(predicate::path::missing());
}
