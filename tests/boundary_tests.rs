use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_boundary_balance_values() {
    // u64::MAX cents, then one more cent, which must be refused.
    let script = common::write_script(&[
        "frank, register, Frank",
        "admin, award, frank, 184467440737095516.15",
        "admin, award, frank, 0.01",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("contest-ledger"));
    cmd.arg(script.path()).arg("--admin").arg("admin");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "frank,Frank,user,184467440737095516.15",
        ))
        .stderr(predicate::str::contains("overflow"));
}

#[test]
fn test_exact_budget_and_roster_caps() {
    let script = common::write_script(&[
        "admin, add_player, 1, One, A, gk, 40.00",
        "admin, add_player, 2, Two, B, def, 30.00",
        "admin, add_player, 3, Three, C, mid, 30.00",
        "gina, register, Gina",
        // Exactly at both caps.
        "gina, create_team, 1, 2, 3",
        "admin, award, gina, 1.00",
        "admin, create_contest, Cup, 1.00, 0",
        "gina, join, 1",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("contest-ledger"));
    cmd.arg(script.path())
        .arg("--admin")
        .arg("admin")
        .arg("--roster-cap")
        .arg("3");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("gina,Gina,user,0.00"))
        .stderr(predicate::str::contains("command rejected").not());
}
