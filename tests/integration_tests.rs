//! Integration tests for the VCT CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a vct command
fn vct() -> Command {
    Command::cargo_bin("vct").unwrap()
}

/// Helper to create a workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    vct().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to create a project and return its id
fn create_project(tmp: &TempDir, title: &str) -> String {
    let output = vct()
        .current_dir(tmp.path())
        .args([
            "project", "new", "--title", title, "--customer", "Acme Petrochem", "-q", "--actor",
            "jsmith", "--role", "engineering",
        ])
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to add a selection requirement
fn add_selection(tmp: &TempDir, project: &str, tag: &str, torque: &str, model: &str) {
    vct()
        .current_dir(tmp.path())
        .args([
            "sel",
            "add",
            project,
            "--tag",
            tag,
            "--torque",
            torque,
            "--model",
            model,
            "--series",
            "SF",
            "--action",
            "double_acting",
            "--price",
            "120.0",
            "--actual-torque",
            "785.0",
            "--actor",
            "jsmith",
            "--role",
            "engineering",
        ])
        .assert()
        .success();
}

#[test]
fn test_help_displays() {
    vct()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("commercial lifecycle"));
}

#[test]
fn test_version_displays() {
    vct()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vct"));
}

#[test]
fn test_unknown_command_fails() {
    vct()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();

    vct()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".vct/config.yaml").exists());
    assert!(tmp.path().join(".vct/team.yaml").exists());
    assert!(tmp.path().join("projects").is_dir());
    assert!(tmp.path().join("tickets").is_dir());
}

#[test]
fn test_init_twice_is_not_an_error() {
    let tmp = setup_workspace();
    vct()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_fail_outside_workspace() {
    let tmp = TempDir::new().unwrap();
    vct()
        .current_dir(tmp.path())
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a VCT workspace"));
}

#[test]
fn test_project_new_and_list() {
    let tmp = setup_workspace();
    let id = create_project(&tmp, "Refinery unit 4");
    assert!(id.starts_with("PRJ-"), "unexpected id: {}", id);

    vct()
        .current_dir(tmp.path())
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Refinery unit 4"))
        .stdout(predicate::str::contains("draft"));
}

#[test]
fn test_selection_requires_selection_stage() {
    let tmp = setup_workspace();
    let id = create_project(&tmp, "Refinery unit 4");

    // project is still in draft; selection edits are not permitted yet
    vct()
        .current_dir(tmp.path())
        .args([
            "sel", "add", &id, "--tag", "V-101", "--torque", "500", "--model", "SF10-DA",
            "--series", "SF", "--action", "double_acting", "--price", "120", "--actual-torque",
            "550", "--actor", "jsmith", "--role", "engineering",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("may not"));
}

fn advance(tmp: &TempDir, id: &str) {
    vct()
        .current_dir(tmp.path())
        .args([
            "project",
            "advance",
            id,
            "--actor",
            "alee",
            "--role",
            "management",
        ])
        .assert()
        .success();
}

/// Walk a project from draft all the way into production through the CLI
#[test]
fn test_full_lifecycle_to_production() {
    let tmp = setup_workspace();
    let id = create_project(&tmp, "Refinery unit 4");

    advance(&tmp, &id); // technical_assignment_pending
    advance(&tmp, &id); // technical_selection_in_progress

    add_selection(&tmp, &id, "V-101", "500.0", "SF10-DA");
    add_selection(&tmp, &id, "V-102", "700.0", "SF10-DA");

    // duplicate tag is refused
    vct()
        .current_dir(tmp.path())
        .args([
            "sel", "add", &id, "--tag", "V-101", "--torque", "100", "--model", "SF05-DA",
            "--series", "SF05", "--action", "double_acting", "--price", "60", "--actual-torque",
            "180", "--actor", "jsmith", "--role", "engineering",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // only engineering may submit
    vct()
        .current_dir(tmp.path())
        .args(["tech", "submit", &id, "--actor", "bwilson", "--role", "commercial"])
        .assert()
        .failure();

    vct()
        .current_dir(tmp.path())
        .args(["tech", "submit", &id, "--actor", "jsmith", "--role", "engineering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version 1"));

    // submission locks the list
    vct()
        .current_dir(tmp.path())
        .args([
            "sel", "add", &id, "--tag", "V-103", "--torque", "150", "--model", "SF05-DA",
            "--series", "SF05", "--action", "double_acting", "--price", "60", "--actual-torque",
            "180", "--actor", "jsmith", "--role", "engineering",
        ])
        .assert()
        .failure();

    vct()
        .current_dir(tmp.path())
        .args([
            "quote", "generate", &id, "--actor", "bwilson", "--role", "commercial",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("version 1"));

    advance(&tmp, &id); // contract_draft_pending
    advance(&tmp, &id); // contract_under_commercial_review
    advance(&tmp, &id); // contract_pending_client_seal

    vct()
        .current_dir(tmp.path())
        .args([
            "project",
            "sign",
            &id,
            "--document",
            "contracts/acme-2026-014.pdf",
            "--actor",
            "alee",
            "--role",
            "management",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("locked"));

    advance(&tmp, &id); // prepayment_pending

    // order before payment is refused, and leaves no audit entries behind
    vct()
        .current_dir(tmp.path())
        .args([
            "production", "create-order", &id, "--yes", "--actor", "alee", "--role", "management",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("prepayment"));

    vct()
        .current_dir(tmp.path())
        .args([
            "production", "confirm-payment", &id, "--actor", "alee", "--role", "management",
        ])
        .assert()
        .success();

    vct()
        .current_dir(tmp.path())
        .args([
            "production",
            "create-order",
            &id,
            "--yes",
            "--declaration",
            "wire ref 4417",
            "--actor",
            "alee",
            "--role",
            "management",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("in production"));

    let audit = vct()
        .current_dir(tmp.path())
        .args(["audit", &id])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&audit.stdout);
    assert_eq!(stdout.matches("payment_confirmed").count(), 1);
    assert_eq!(stdout.matches("production_order_created").count(), 1);
    assert!(stdout.contains("wire ref 4417"));
}

#[test]
fn test_reject_and_resubmit_bumps_version() {
    let tmp = setup_workspace();
    let id = create_project(&tmp, "Refinery unit 4");
    advance(&tmp, &id);
    advance(&tmp, &id);
    add_selection(&tmp, &id, "V-101", "500.0", "SF10-DA");

    vct()
        .current_dir(tmp.path())
        .args(["tech", "submit", &id, "--actor", "jsmith", "--role", "engineering"])
        .assert()
        .success();

    vct()
        .current_dir(tmp.path())
        .args([
            "tech",
            "reject",
            &id,
            "--version",
            "1",
            "--suggest",
            "V-101:SF10-DA:SF08-DA:oversized",
            "--actor",
            "bwilson",
            "--role",
            "commercial",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("MODR-"));

    // list is editable again; resubmission yields version 2
    add_selection(&tmp, &id, "V-102", "300.0", "SF08-DA");
    vct()
        .current_dir(tmp.path())
        .args(["tech", "submit", &id, "--actor", "jsmith", "--role", "engineering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version 2"));

    vct()
        .current_dir(tmp.path())
        .args(["tech", "versions", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"))
        .stdout(predicate::str::contains("submitted"));
}

#[test]
fn test_consolidate_groups_by_strongest_model() {
    let tmp = setup_workspace();
    let id = create_project(&tmp, "Refinery unit 4");
    advance(&tmp, &id);
    advance(&tmp, &id);
    add_selection(&tmp, &id, "V-101", "500.0", "SF10-DA");
    add_selection(&tmp, &id, "V-102", "700.0", "SF10-DA");

    vct()
        .current_dir(tmp.path())
        .args(["consolidate", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("SF10-DA"))
        .stdout(predicate::str::contains("V-101"))
        .stdout(predicate::str::contains("(50% consolidation)"));
}

#[test]
fn test_ticket_loop() {
    let tmp = setup_workspace();
    let id = create_project(&tmp, "Refinery unit 4");

    let output = vct()
        .current_dir(tmp.path())
        .args([
            "ticket", "new", &id, "--title", "Leak at stem seal", "-q", "--actor", "customer",
            "--role", "production",
        ])
        .output()
        .unwrap();
    let ticket_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(ticket_id.starts_with("TKT-"));

    for (subcmd, expect) in [
        ("start", "in_progress"),
        ("resolve", "resolved_pending_confirmation"),
        ("reopen", "reopened"),
        ("resolve", "resolved_pending_confirmation"),
        ("confirm", "closed"),
    ] {
        vct()
            .current_dir(tmp.path())
            .args([
                "ticket", subcmd, &ticket_id, "--actor", "tech", "--role", "production",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(expect));
    }

    // closed ticket admits no further transitions
    vct()
        .current_dir(tmp.path())
        .args([
            "ticket", "reopen", &ticket_id, "--actor", "tech", "--role", "production",
        ])
        .assert()
        .failure();
}

#[test]
fn test_team_roster_provides_default_role() {
    let tmp = setup_workspace();

    vct()
        .current_dir(tmp.path())
        .args([
            "team", "add", "--name", "Jane Smith", "--email", "jane@example.com", "--username",
            "jsmith", "--roles", "engineering",
        ])
        .assert()
        .success();

    vct()
        .current_dir(tmp.path())
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jsmith"))
        .stdout(predicate::str::contains("engineering"));

    // no --role needed once the roster knows the user
    vct()
        .current_dir(tmp.path())
        .args([
            "project", "new", "--title", "Test", "--customer", "Acme", "--actor", "jsmith",
        ])
        .assert()
        .success();
}
