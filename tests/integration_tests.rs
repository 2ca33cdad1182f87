//! Integration tests for the prodcfg CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a prodcfg command
fn prodcfg() -> Command {
    let mut cmd = Command::cargo_bin("prodcfg").unwrap();
    cmd.env_remove("PRODCFG_WORKSPACE").env_remove("PRODCFG_LOG");
    cmd
}

/// Helper to create a seeded workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    prodcfg().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a command in the workspace and return stdout
fn stdout_of(tmp: &TempDir, args: &[&str]) -> String {
    let output = prodcfg().current_dir(tmp.path()).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_workspace_structure() {
    let tmp = TempDir::new().unwrap();

    prodcfg()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized prodcfg workspace"));

    let dir = tmp.path().join(".prodcfg");
    assert!(dir.join("config.yaml").exists());
    assert!(dir.join("state.yaml").exists());
    assert!(dir.join("catalogs.yaml").exists());

    let state = fs::read_to_string(dir.join("state.yaml")).unwrap();
    assert!(state.contains("proj-001"));
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_empty_has_no_projects() {
    let tmp = TempDir::new().unwrap();
    prodcfg()
        .current_dir(tmp.path())
        .args(["init", "--empty"])
        .assert()
        .success();

    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a prodcfg workspace"));
}

// ============================================================================
// Projects
// ============================================================================

#[test]
fn test_project_list_shows_seeded_projects() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("proj-001"))
        .stdout(predicate::str::contains("Atlas Sedan Platform"))
        .stdout(predicate::str::contains("proj-002"));
}

#[test]
fn test_project_list_json_is_parseable() {
    let tmp = setup_workspace();
    let stdout = stdout_of(&tmp, &["project", "list", "-f", "json"]);
    let projects: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(projects.as_array().unwrap().len(), 2);
}

#[test]
fn test_project_new_requires_basics() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "new", "--code", "PX-400"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project name is required"))
        .stderr(predicate::str::contains("Select a category"));
}

#[test]
fn test_project_new_creates_and_navigates() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args([
            "project",
            "new",
            "--name",
            "Falcon Interceptor",
            "--code",
            "FX-9",
            "--category",
            "Aerial",
            "--type",
            "Special",
            "--set",
            "Airframe",
            "--structure",
            "Nose section",
            "--assembly",
            "Radome",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"))
        .stdout(predicate::str::contains("/production/treeview?project=proj-"));

    let list = stdout_of(&tmp, &["project", "list"]);
    assert!(list.contains("Falcon Interceptor"));

    let location = stdout_of(&tmp, &["-q", "nav", "show", "-f", "json"]);
    assert!(location.contains("proj-"));
}

#[test]
fn test_project_update_unknown_fails() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "update", "proj-missing", "--name", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found"));
}

#[test]
fn test_project_update_changes_name() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "update", "proj-002", "--name", "Skyline Mk II"])
        .assert()
        .success();

    let stdout = stdout_of(&tmp, &["project", "show", "proj-002", "-f", "yaml"]);
    assert!(stdout.contains("Skyline Mk II"));
}

#[test]
fn test_project_load_replaces_projects() {
    let tmp = setup_workspace();
    let file = tmp.path().join("projects.yaml");
    fs::write(
        &file,
        "- id: proj-100\n  name: Remote Program\n  sets:\n    - id: set-1\n      name: Body\n      structures: [Roof]\n",
    )
    .unwrap();

    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "load", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 project(s)"));

    let json = stdout_of(&tmp, &["project", "list", "-f", "json"]);
    let projects: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(projects.as_array().unwrap().len(), 1);
    assert_eq!(projects[0]["id"], "proj-100");
}

#[test]
fn test_project_load_malformed_file_keeps_state() {
    let tmp = setup_workspace();
    let state_path = tmp.path().join(".prodcfg/state.yaml");
    let before = fs::read_to_string(&state_path).unwrap();

    let file = tmp.path().join("projects.json");
    fs::write(&file, "{ not json").unwrap();

    prodcfg()
        .current_dir(tmp.path())
        .args(["project", "load", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load projects"));

    assert_eq!(fs::read_to_string(&state_path).unwrap(), before);
    let json = stdout_of(&tmp, &["project", "list", "-f", "json"]);
    let projects: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(projects.as_array().unwrap().len(), 2);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_nav_encode_from_flags() {
    prodcfg()
        .args([
            "nav",
            "encode",
            "--project",
            "proj-1",
            "--section",
            "configuration",
            "--view",
            "table",
        ])
        .assert()
        .success()
        .stdout("project=proj-1&section=configuration&view=table\n");
}

#[test]
fn test_nav_decode_falls_back_on_unknown_values() {
    let stdout = prodcfg()
        .args(["nav", "decode", "?project=proj-7&section=bogus&view=grid", "-f", "json"])
        .output()
        .unwrap()
        .stdout;
    let state: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(state["project"], "proj-7");
    assert_eq!(state["section"], "general");
    assert_eq!(state["view"], "card");
}

#[test]
fn test_nav_section_replaces_then_back_after_push() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["nav", "section", "configuration", "-p", "proj-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project=proj-002"))
        .stdout(predicate::str::contains("section=configuration"));

    // Tab changes do not add history entries
    prodcfg()
        .current_dir(tmp.path())
        .args(["nav", "back"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Already at the start of the history"));

    prodcfg()
        .current_dir(tmp.path())
        .args(["-q", "nav", "view", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("view=table"));

    prodcfg()
        .current_dir(tmp.path())
        .args(["-q", "nav", "open", "/production/configuration", "--push"])
        .assert()
        .success();

    prodcfg()
        .current_dir(tmp.path())
        .args(["nav", "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("section=configuration"));
}

#[test]
fn test_nav_back_at_start_fails() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["nav", "back"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Already at the start of the history"));
}

// ============================================================================
// Selection and tree
// ============================================================================

#[test]
fn test_select_project_shows_breadcrumb() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["select", "set", "project", "proj-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas Sedan Platform"));

    let stdout = stdout_of(&tmp, &["select", "show", "-f", "json"]);
    let view: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(view["selection"]["project"], "proj-001");
}

#[test]
fn test_select_clear_empties_tree_view_row() {
    let tmp = setup_workspace();
    stdout_of(&tmp, &["select", "set", "project", "proj-001"]);
    stdout_of(&tmp, &["select", "clear"]);

    prodcfg()
        .current_dir(tmp.path())
        .args(["select", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing selected"));
}

#[test]
fn test_tree_lists_projects() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["tree", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas Sedan Platform"))
        .stdout(predicate::str::contains("Chassis Set"));
}

// ============================================================================
// Configuration parts
// ============================================================================

#[test]
fn test_part_list_defaults_to_first_set() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["part", "list", "-p", "proj-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Guidance Control Set"))
        .stdout(predicate::str::contains("P-1001"));
}

#[test]
fn test_part_new_validation_errors() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["part", "new", "-p", "proj-001", "--id", "P-1001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Name is required"))
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_part_new_adds_to_set() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args([
            "part",
            "new",
            "-p",
            "proj-001",
            "--set",
            "set-telemetry",
            "--id",
            "P-1199",
            "--name",
            "Antenna Coupler",
            "--category",
            "Electrical",
            "--type",
            "Assembly",
            "--level",
            "L3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added part P-1199"));

    let stdout = stdout_of(&tmp, &["part", "list", "-p", "proj-001", "--set", "set-telemetry"]);
    assert!(stdout.contains("Antenna Coupler"));
}

// ============================================================================
// Qualification
// ============================================================================

#[test]
fn test_qual_score_ignores_undocumented_tests() {
    let tmp = setup_workspace();
    let stdout = stdout_of(&tmp, &["-q", "qual", "score", "P-1001", "-p", "proj-001"]);
    assert_eq!(stdout.trim(), "0.40");

    stdout_of(&tmp, &["qual", "attach", "P-1001", "qt-2", "-p", "proj-001"]);
    let stdout = stdout_of(&tmp, &["-q", "qual", "score", "P-1001", "-p", "proj-001"]);
    assert_eq!(stdout.trim(), "0.75");
}

#[test]
fn test_qual_add_test_and_list() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args([
            "qual", "add-test", "-p", "proj-001", "--part", "P-1002", "--name", "Torque Hold", "--order", "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added QC test"));

    let stdout = stdout_of(&tmp, &["qual", "list", "-p", "proj-001", "--part", "P-1002"]);
    assert!(stdout.contains("Torque Hold"));
    assert!(stdout.contains("Load Sweep"));
}

#[test]
fn test_qual_add_test_rejects_heavy_weight() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args([
            "qual", "add-test", "-p", "proj-001", "--part", "P-1001", "--name", "Shock", "--weight", "1.5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("QC weight must be between 0 and 1"));
}

#[test]
fn test_qual_transition_allows_draft_to_qualified() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["qual", "transition", "P-1002", "qualified", "-p", "proj-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Draft → Qualified"));

    prodcfg()
        .current_dir(tmp.path())
        .args(["qual", "transition", "P-1002", "qualified", "-p", "proj-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already Qualified"));
}

#[test]
fn test_qual_score_without_qualifying_tests_is_zero() {
    let tmp = setup_workspace();
    let stdout = stdout_of(&tmp, &["-q", "qual", "score", "P-1002", "-p", "proj-001"]);
    assert_eq!(stdout, "0.00\n");

    let stdout = stdout_of(&tmp, &["qual", "list", "-p", "proj-001", "--part", "P-1002"]);
    assert!(stdout.contains("score: 0.00"), "{}", stdout);
    assert!(!stdout.contains("-0.00"));
}

#[test]
fn test_qual_score_reports_status_supported_by_tests() {
    let tmp = setup_workspace();
    let stdout = stdout_of(&tmp, &["qual", "score", "P-1101", "-p", "proj-001"]);
    assert!(stdout.contains("0.30"));
    assert!(stdout.contains("tests support Qualified"), "{}", stdout);
}

#[test]
fn test_qual_list_keeps_tests_in_entry_order() {
    let tmp = setup_workspace();
    for (name, order) in [("Zeta", "3"), ("Alpha", "2")] {
        stdout_of(
            &tmp,
            &["qual", "add-test", "-p", "proj-001", "--part", "P-1002", "--name", name, "--order", order],
        );
    }

    let csv = stdout_of(&tmp, &["qual", "list", "-p", "proj-001", "--part", "P-1002", "-f", "csv"]);
    let zeta = csv.find("Zeta").unwrap();
    let alpha = csv.find("Alpha").unwrap();
    assert!(csv.find("Load Sweep").unwrap() < zeta);
    assert!(zeta < alpha, "{}", csv);

    let tree = stdout_of(&tmp, &["qual", "list", "-p", "proj-001", "--part", "P-1002"]);
    assert!(tree.find("Zeta").unwrap() < tree.find("Alpha").unwrap());

    let sorted = stdout_of(
        &tmp,
        &["qual", "list", "-p", "proj-001", "--part", "P-1002", "-f", "csv", "--sort-by-order"],
    );
    assert!(sorted.find("Alpha").unwrap() < sorted.find("Zeta").unwrap());
}

#[test]
fn test_qual_add_test_does_not_toggle_expansion() {
    let tmp = setup_workspace();
    for name in ["Torque Hold", "Backlash"] {
        stdout_of(&tmp, &["qual", "add-test", "-p", "proj-001", "--part", "P-1002", "--name", name]);
        let tree = stdout_of(&tmp, &["qual", "list", "-p", "proj-001", "--part", "P-1002"]);
        assert!(tree.contains("▸ P-1002"), "{}", tree);
        assert!(!tree.contains("▾"));
    }
}

#[test]
fn test_qual_toggle_expands_set_and_part() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["qual", "toggle", "P-1002", "-p", "proj-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P-1002 expanded"));
    stdout_of(&tmp, &["qual", "toggle", "set-gc", "-p", "proj-001"]);

    let tree = stdout_of(&tmp, &["qual", "list", "-p", "proj-001"]);
    assert!(tree.contains("▾ set-gc"), "{}", tree);
    assert!(tree.contains("▾ P-1002"));
    assert!(tree.contains("▸ P-1001"));

    prodcfg()
        .current_dir(tmp.path())
        .args(["qual", "toggle", "P-9999", "-p", "proj-001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Part P-9999 not found"));
}

// ============================================================================
// Build browser
// ============================================================================

#[test]
fn test_build_show_lists_default_node_parts() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["build", "show", "-p", "proj-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gyro Assembly"));
}

#[test]
fn test_build_show_unknown_node_fails() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["build", "show", "-p", "proj-001", "--node", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Build node not found"));
}

// ============================================================================
// Timeline
// ============================================================================

#[test]
fn test_timeline_show_lists_milestones_and_feed() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["timeline", "show", "-p", "proj-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Atlas Sedan Platform"))
        .stdout(predicate::str::contains("Supply Assurance"))
        .stdout(predicate::str::contains("2 updates"));
}

#[test]
fn test_timeline_comment_requires_author_and_text() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args(["timeline", "comment", "-p", "proj-001", "--author", " ", "--text", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Name is required"))
        .stderr(predicate::str::contains("Comment is required"));

    let json = stdout_of(&tmp, &["timeline", "show", "-p", "proj-001", "-f", "json"]);
    let timeline: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(timeline["comments"].as_array().unwrap().len(), 2);
}

#[test]
fn test_timeline_comment_is_newest_first() {
    let tmp = setup_workspace();
    prodcfg()
        .current_dir(tmp.path())
        .args([
            "timeline", "comment", "-p", "proj-001", "--author", "QA Lead", "--role", "Quality", "--text",
            "EMI chamber booked for 19 Sep.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Posted update cmt-"));

    let json = stdout_of(&tmp, &["timeline", "show", "-p", "proj-001", "-f", "json"]);
    let timeline: serde_json::Value = serde_json::from_str(&json).unwrap();
    let comments = timeline["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 3);
    assert_eq!(comments[0]["author"], "QA Lead");
    assert_eq!(comments[0]["role"], "Quality");
    assert_eq!(comments[1]["author"], "Supply Chain");
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    prodcfg()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prodcfg"));
}
