//! End-to-end runs of the `ladder` binary against a temporary data directory

use std::path::Path;
use std::process::{Command, Output};

fn ladder(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ladder"))
        .arg("--data-dir")
        .arg(dir)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn mutations_persist_between_runs() {
    let dir = tempfile::tempdir().unwrap();

    let added = ladder(dir.path(), &["add", "1", "resp", "Water plants"]);
    assert!(added.status.success(), "{}", stderr(&added));

    let shown = ladder(dir.path(), &["show"]);
    assert!(stdout(&shown).contains("  [ ] Water plants\n"));

    let mastered = ladder(dir.path(), &["master", "Water plants"]);
    assert!(mastered.status.success(), "{}", stderr(&mastered));
    assert!(stdout(&ladder(dir.path(), &["show"])).contains("  [x] Water plants\n"));

    let json = stdout(&ladder(dir.path(), &["show", "--json"]));
    let document: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(document["mastered"]["Kid 1"][0], "Water plants");
}

#[test]
fn rejected_mutation_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = ladder(dir.path(), &["add", "1", "resp", "Shower daily"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already exists"), "{}", stderr(&output));
}

#[test]
fn batch_runs_undo() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("batch.json");
    std::fs::write(
        &file,
        r#"[{"op": "add-child", "name": "Ana"}, {"op": "add-child", "name": "Bo"}, {"op": "undo"}]"#,
    )
    .unwrap();

    let output = ladder(dir.path(), &["batch", file.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&ladder(dir.path(), &["kids"])), "  Kid 1\n* Ana\n");
}

#[test]
fn invite_code_links_a_child_once() {
    let dir = tempfile::tempdir().unwrap();
    let issued = ladder(dir.path(), &["--user", "mom", "invite"]);
    assert!(issued.status.success(), "{}", stderr(&issued));
    let text = stdout(&issued);
    let code = text.split_whitespace().nth(2).unwrap().to_string();
    assert!(text.contains("for Kid 1"));

    let joined = ladder(dir.path(), &["--user", "kid", "join", &code]);
    assert!(joined.status.success(), "{}", stderr(&joined));
    assert!(stdout(&joined).starts_with("Kid 1:"));

    let again = ladder(dir.path(), &["--user", "other", "join", &code]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("already been used"));
}

#[test]
fn child_completions_build_a_streak() {
    let dir = tempfile::tempdir().unwrap();
    let issued = ladder(dir.path(), &["--user", "mom", "invite"]);
    assert!(issued.status.success(), "{}", stderr(&issued));
    let code = stdout(&issued).split_whitespace().nth(2).unwrap().to_string();

    let joined = ladder(dir.path(), &["--user", "kid", "join", &code]);
    assert!(joined.status.success(), "{}", stderr(&joined));

    let mastered = ladder(dir.path(), &["--user", "kid", "--invite", &code, "master", "Shower daily"]);
    assert!(mastered.status.success(), "{}", stderr(&mastered));
    assert!(stdout(&mastered).contains("  [x] Shower daily\n"));

    let own = stdout(&ladder(dir.path(), &["--user", "kid", "--invite", &code, "streak"]));
    assert!(own.starts_with("Current streak: 1 day\n"), "{own}");
    assert!(own.contains("    1d Shower daily\n"));

    let seen_by_parent = stdout(&ladder(dir.path(), &["--user", "mom", "streak", "--child", "kid"]));
    assert!(seen_by_parent.starts_with("Current streak: 1 day\n"), "{seen_by_parent}");

    let parent_board = stdout(&ladder(dir.path(), &["--user", "mom", "show"]));
    assert!(parent_board.contains("  [x] Shower daily\n"));
}
