#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_inputs(dir: &Path) {
    let mut staff = String::from("name,tier1,tier2,tier3,passive,elot,minor_ot,wound\n");
    for i in 1..=8 {
        staff.push_str(&format!("S{i},Yes,Yes,Yes,Yes,Yes,Yes,Yes\n"));
    }
    fs::write(dir.join("staff.csv"), staff).unwrap();
    fs::write(dir.join("leave.csv"), "date,name,kind\n2026-03-10,S1,absent\n").unwrap();
    fs::write(dir.join("month.json"), r#"{ "public_holidays": [2] }"#).unwrap();
}

fn cli(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("garde-cli").unwrap();
    cmd.current_dir(dir).args(args).args([
        "--staff",
        "staff.csv",
        "--leave",
        "leave.csv",
        "--config",
        "month.json",
        "--year",
        "2026",
        "--month",
        "3",
    ]);
    cmd
}

#[test]
fn generate_then_check_and_audit() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());

    cli(
        dir.path(),
        &[
            "generate",
            "--iterations",
            "40",
            "--seed",
            "9",
            "--out",
            "roster.json",
            "--out-csv",
            "roster.csv",
        ],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("Roster written to roster.json"));
    assert!(dir.path().join("roster.csv").exists());

    cli(dir.path(), &["check", "--roster", "roster.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no violations"));

    cli(dir.path(), &["audit", "--roster", "roster.json", "--out", "audit.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S8 | on-call"));
    assert!(dir.path().join("audit.csv").exists());
}

#[test]
fn check_flags_hand_edits() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());
    cli(dir.path(), &["generate", "--iterations", "10", "--seed", "1"])
        .assert()
        .success();

    // S1 est absent le 10 mars
    let path = dir.path().join("roster.json");
    let mut roster: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let day = roster["days"]
        .as_array_mut()
        .unwrap()
        .iter_mut()
        .find(|d| d["date"] == "2026-03-10")
        .unwrap();
    day["assignments"]["Tier1"] = serde_json::json!("S1");
    fs::write(&path, serde_json::to_string(&roster).unwrap()).unwrap();

    cli(dir.path(), &["check", "--roster", "roster.json", "--report", "report.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("absent"));
    let report = fs::read_to_string(dir.path().join("report.csv")).unwrap();
    assert!(report.contains("2026-03-10,Tier1,S1,absent"));
}

#[test]
fn missing_tier1_pool_is_fatal() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());
    fs::write(
        dir.path().join("staff.csv"),
        "name,tier1,tier2,tier3,passive\nS1,,Yes,Yes,Yes\nS2,,Yes,Yes,Yes\n",
    )
    .unwrap();
    cli(dir.path(), &["generate", "--iterations", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no staff eligible for Tier-1 on-call"));
}

#[test]
fn init_config_writes_defaults() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("garde-cli")
        .unwrap()
        .current_dir(dir.path())
        .args(["init-config", "--out", "month.json"])
        .assert()
        .success();
    let text = fs::read_to_string(dir.path().join("month.json")).unwrap();
    assert!(text.contains("\"passive_policy\": \"weekdays_only\""));
}
