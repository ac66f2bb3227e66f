//! Integration tests for the `deals` CLI.
//!
//! Each test creates a temp board directory, runs `deals` as a subprocess,
//! and verifies stdout and/or the persisted state.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Create a board directory with two seed columns and a saved state file.
fn create_test_board(root: &Path) {
    fs::write(
        root.join("dealboard.toml"),
        r#"[guard]
debounce_ms = 300

[[columns]]
id = "open"
name = "Open"

[[columns]]
id = "closed"
name = "Closed"
"#,
    )
    .unwrap();

    fs::write(
        root.join("board.json"),
        r#"{
  "columns": [
    {
      "id": "open",
      "name": "Open",
      "cards": [
        {"id": "d1", "title": "First deal", "value": 100.0, "stage": "open",
         "created_at": "2025-05-01T10:00:00Z", "fields": {"company": "Acme"}},
        {"id": "d2", "title": "Second deal", "value": 250.5, "stage": "open",
         "created_at": "2025-05-02T10:00:00Z"},
        {"id": "d3", "title": "Third deal", "value": 0.0, "stage": "open",
         "created_at": "2025-05-03T10:00:00Z"}
      ]
    },
    {"id": "closed", "name": "Closed", "cards": []}
  ]
}
"#,
    )
    .unwrap();
}

/// Run `deals` with the given args in the given directory, returning (stdout, stderr, success).
fn run_deals(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_deals"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run deals");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `deals` expecting success, return stdout.
fn run_deals_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_deals(dir, args);
    if !success {
        panic!(
            "deals {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn read_state(dir: &Path) -> serde_json::Value {
    let text = fs::read_to_string(dir.join("board.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn column_ids(state: &serde_json::Value, column: usize) -> Vec<String> {
    state["columns"][column]["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_show_text() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let out = run_deals_ok(tmp.path(), &["show"]);
    assert!(out.contains("Open [open]  3 cards  350.50"));
    assert!(out.contains("  d1  First deal  100.00"));
    assert!(out.contains("Closed [closed]  0 cards  0.00"));
    assert!(out.contains("Total  3 cards  350.50"));
}

#[test]
fn test_show_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let out = run_deals_ok(tmp.path(), &["show", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["total_cards"], 3);
    assert_eq!(parsed["columns"][0]["cards"][0]["fields"]["company"], "Acme");
}

#[test]
fn test_show_without_state_uses_configured_seed() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    fs::remove_file(tmp.path().join("board.json")).unwrap();

    let out = run_deals_ok(tmp.path(), &["show"]);
    assert!(out.contains("Open [open]  0 cards"));
    assert!(out.contains("Closed [closed]  0 cards"));
    // Reading doesn't create state
    assert!(!tmp.path().join("board.json").exists());
}

#[test]
fn test_board_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    let board = tmp.path().join("pipeline");
    fs::create_dir_all(&board).unwrap();
    create_test_board(&board);

    let out = run_deals_ok(tmp.path(), &["-C", "pipeline", "show"]);
    assert!(out.contains("d2  Second deal"));
}

#[test]
fn test_drop_index() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    // Defaults: 8px padding, 88px cards
    assert_eq!(run_deals_ok(tmp.path(), &["drop-index", "open", "100"]).trim(), "1");
    assert_eq!(run_deals_ok(tmp.path(), &["drop-index", "open", "-40"]).trim(), "0");
    assert_eq!(run_deals_ok(tmp.path(), &["drop-index", "open", "9000"]).trim(), "3");

    let (_, stderr, ok) = run_deals(tmp.path(), &["drop-index", "nope", "10"]);
    assert!(!ok);
    assert!(stderr.contains("column not found: nope"));
}

#[test]
fn test_check_valid_and_invalid() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_deals_ok(tmp.path(), &["check"]);
    assert!(out.contains("Board is valid."));

    let text = fs::read_to_string(tmp.path().join("board.json"))
        .unwrap()
        .replace("\"stage\": \"open\",\n         \"created_at\": \"2025-05-02", "\"stage\": \"closed\",\n         \"created_at\": \"2025-05-02");
    fs::write(tmp.path().join("board.json"), text).unwrap();

    let (stdout, stderr, ok) = run_deals(tmp.path(), &["check"]);
    assert!(!ok);
    assert!(stdout.contains("[open] d2 has stage \"closed\""));
    assert!(stderr.contains("integrity errors"));
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[test]
fn test_add_to_first_column() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let id = run_deals_ok(
        tmp.path(),
        &[
            "add",
            "--title",
            "Fresh lead",
            "--value",
            "75",
            "--field",
            "company=Initech",
            "--field",
            "probability=0.2",
        ],
    );
    let id = id.trim();
    assert_eq!(id.len(), 36);

    let state = read_state(tmp.path());
    let ids = column_ids(&state, 0);
    assert_eq!(ids, vec![id, "d1", "d2", "d3"]);
    let card = &state["columns"][0]["cards"][0];
    assert_eq!(card["title"], "Fresh lead");
    assert_eq!(card["stage"], "open");
    assert_eq!(card["fields"]["company"], "Initech");
    assert_eq!(card["fields"]["probability"], 0.2);
}

#[test]
fn test_add_to_missing_column_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let (_, stderr, ok) = run_deals(tmp.path(), &["add", "--column", "ghost"]);
    assert!(!ok);
    assert!(stderr.contains("column not found: ghost"));
    assert_eq!(read_state(tmp.path())["columns"][0]["cards"].as_array().unwrap().len(), 3);
}

#[test]
fn test_mv_between_columns() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    run_deals_ok(tmp.path(), &["mv", "d1", "closed"]);
    let state = read_state(tmp.path());
    assert_eq!(column_ids(&state, 0), vec!["d2", "d3"]);
    assert_eq!(column_ids(&state, 1), vec!["d1"]);
    assert_eq!(state["columns"][1]["cards"][0]["stage"], "closed");
    // Payload survives the move
    assert_eq!(state["columns"][1]["cards"][0]["fields"]["company"], "Acme");
}

#[test]
fn test_mv_reorder_within_column() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    run_deals_ok(tmp.path(), &["mv", "d2", "open", "--index", "2"]);
    assert_eq!(column_ids(&read_state(tmp.path()), 0), vec!["d1", "d3", "d2"]);

    run_deals_ok(tmp.path(), &["mv", "d2", "open", "--index", "0"]);
    assert_eq!(column_ids(&read_state(tmp.path()), 0), vec!["d2", "d1", "d3"]);
}

#[test]
fn test_mv_unknown_card() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    let (_, stderr, ok) = run_deals(tmp.path(), &["mv", "zzz", "closed"]);
    assert!(!ok);
    assert!(stderr.contains("card not found: zzz"));
}

#[test]
fn test_rm_and_repeat() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    run_deals_ok(tmp.path(), &["rm", "d2"]);
    assert_eq!(column_ids(&read_state(tmp.path()), 0), vec!["d1", "d3"]);

    let (_, stderr, ok) = run_deals(tmp.path(), &["rm", "d2"]);
    assert!(!ok);
    assert!(stderr.contains("card not found: d2"));
    assert_eq!(column_ids(&read_state(tmp.path()), 0), vec!["d1", "d3"]);
}

#[test]
fn test_rename() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());

    run_deals_ok(tmp.path(), &["rename", "closed", "  Won  "]);
    assert_eq!(read_state(tmp.path())["columns"][1]["name"], "Won");

    let (_, stderr, ok) = run_deals(tmp.path(), &["rename", "closed", "   "]);
    assert!(!ok);
    assert!(stderr.contains("blank"));
    assert_eq!(read_state(tmp.path())["columns"][1]["name"], "Won");
}

// ---------------------------------------------------------------------------
// Init and recovery
// ---------------------------------------------------------------------------

#[test]
fn test_init_writes_config() {
    let tmp = tempfile::TempDir::new().unwrap();

    run_deals_ok(
        tmp.path(),
        &["init", "--column", "new", "New", "--column", "done", "Done"],
    );
    let text = fs::read_to_string(tmp.path().join("dealboard.toml")).unwrap();
    assert!(text.contains("id = \"new\""));

    let (_, stderr, ok) = run_deals(tmp.path(), &["init"]);
    assert!(!ok);
    assert!(stderr.contains("already exists"));
    run_deals_ok(tmp.path(), &["init", "--force"]);

    let out = run_deals_ok(tmp.path(), &["show"]);
    assert!(out.contains("Lead [lead]"));
}

#[test]
fn test_corrupt_state_falls_back_and_is_recoverable() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    fs::write(tmp.path().join("board.json"), "{\"columns\": [{\"id\": ").unwrap();

    let (stdout, stderr, ok) = run_deals(tmp.path(), &["show"]);
    assert!(ok);
    assert!(stdout.contains("Open [open]  0 cards"));
    assert!(stderr.contains("recovery log"));

    let out = run_deals_ok(tmp.path(), &["recovery", "--json"]);
    let entries: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(entries[0]["category"], "parse");
    assert_eq!(entries[0]["body"], "{\"columns\": [{\"id\": ");

    // The next write replaces the corrupt file with a valid board
    run_deals_ok(tmp.path(), &["add", "--title", "Restart"]);
    let state = read_state(tmp.path());
    assert_eq!(state["columns"][0]["cards"][0]["title"], "Restart");
}

#[test]
fn test_repeated_reads_of_corrupt_state_log_once() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    fs::write(tmp.path().join("board.json"), "{ broken").unwrap();

    for _ in 0..5 {
        run_deals_ok(tmp.path(), &["show"]);
    }
    run_deals(tmp.path(), &["check"]);
    run_deals_ok(tmp.path(), &["drop-index", "open", "10"]);

    let out = run_deals_ok(tmp.path(), &["recovery", "--json"]);
    let entries: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["body"], "{ broken");
}

#[test]
fn test_duplicate_card_state_survives_in_recovery_log() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let text = fs::read_to_string(tmp.path().join("board.json"))
        .unwrap()
        .replace("\"id\": \"d3\"", "\"id\": \"d1\"");
    fs::write(tmp.path().join("board.json"), &text).unwrap();

    run_deals_ok(tmp.path(), &["add", "--title", "After reset"]);

    let out = run_deals_ok(tmp.path(), &["recovery", "--json"]);
    let entries: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert!(entries[0]["body"].as_str().unwrap().contains("Second deal"));
    assert!(!fs::read_to_string(tmp.path().join("board.json")).unwrap().contains("Second deal"));
}

#[test]
fn test_recovery_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_deals_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("Recovery log is empty."));
}
