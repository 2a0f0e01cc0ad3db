#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

mod common;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: register, fund and configure payments
    let script1 = common::write_script(&[
        "ivan, register, Ivan",
        "admin, award, ivan, 1.00",
        "admin, configure_stripe, sk_test_1, US",
        "admin, create_contest, Cup, 0.25, 0",
    ])
    .unwrap();

    let mut cmd1 = Command::new(cargo_bin!("contest-ledger"));
    cmd1.arg(script1.path())
        .arg("--db-path")
        .arg(&db_path)
        .arg("--admin")
        .arg("admin")
        .arg("--allow-teamless-join");

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("ivan,Ivan,user,1.00"));

    // 2. Second run against the same database
    let script2 = common::write_script(&[
        "ivan, register, Ivan Again",
        "admin, award, ivan, 0.50",
        "ivan, join, 1",
        "ivan, checkout, 3.00",
    ])
    .unwrap();

    let mut cmd2 = Command::new(cargo_bin!("contest-ledger"));
    cmd2.arg(script2.path())
        .arg("--db-path")
        .arg(&db_path)
        .arg("--admin")
        .arg("admin")
        .arg("--allow-teamless-join");

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    let stderr2 = String::from_utf8_lossy(&output2.stderr);

    // 1.00 recovered, plus 0.50, minus the 0.25 entry fee of the recovered contest.
    assert!(stdout2.contains("ivan,Ivan,user,1.25"));
    // The Stripe configuration survived the restart.
    assert!(stderr2.contains("checkout session created"));
}

#[tokio::test]
async fn test_join_commit_survives_reopen() {
    use contest_ledger::config::LedgerConfig;
    use contest_ledger::infrastructure::rocksdb::RocksDBStore;

    let dir = tempdir().unwrap();
    let config = || {
        LedgerConfig::default()
            .with_admin(common::ADMIN)
            .with_team_requirement(false)
    };

    let contest_id = {
        let store = RocksDBStore::open(dir.path()).unwrap();
        let (svc, _) = common::ledger_over(store.stores(), config()).await;
        let nina = common::funded(&svc, "nina", 800).await;
        let id = svc
            .create_contest(&common::admin(), "Cup", 300, 0)
            .await
            .unwrap();
        svc.join_contest(&nina, id).await.unwrap();
        id
    };

    let store = RocksDBStore::open(dir.path()).unwrap();
    let (svc, _) = common::ledger_over(store.stores(), config()).await;
    let nina = contest_ledger::domain::principal::Principal::from("nina");
    assert_eq!(svc.get_balance(&nina).await.unwrap().cents(), 500);
    let contest = svc.get_contest(contest_id).await.unwrap().unwrap();
    assert_eq!(contest.participants, vec![nina]);
}
