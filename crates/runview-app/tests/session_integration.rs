//! End-to-end session tests: ingest real files, segment, navigate, edit.

use std::path::PathBuf;

use runview_app::{EditPolicy, Session};
use runview_core::{Direction, Error, PatternDef, PatternSet};

const PATTERNS: &str = r#"
[[pattern]]
name = "Run start"
pattern = 'Starting run (\w+)'
block_start = true
needed = false
property = "$1"
style = []
visible = true

[[pattern]]
name = "Completed"
pattern = "run complete"
block_start = false
needed = true
property = ""
style = []
visible = true
"#;

struct Fixture {
    _dir: tempfile::TempDir,
    log_files: Vec<PathBuf>,
    patterns_path: PathBuf,
}

/// Two log files, second one written later so mtime ordering holds
fn two_runs() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let patterns_path = dir.path().join("app.toml");
    std::fs::write(&patterns_path, PATTERNS).unwrap();

    let file1 = dir.path().join("run1.log");
    std::fs::write(
        &file1,
        "Starting run Run1\nINFO 2024-01-01T10:00:00 working\nrun complete\n",
    )
    .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(20));
    let file2 = dir.path().join("run2.log");
    std::fs::write(&file2, "Starting run Run2\nrun complete\n").unwrap();

    Fixture {
        log_files: vec![file2, file1], // deliberately out of order
        patterns_path,
        _dir: dir,
    }
}

fn session(fixture: &Fixture) -> Session {
    let patterns = PatternSet::load(&fixture.patterns_path).unwrap();
    Session::ingest(patterns, &fixture.log_files).unwrap()
}

#[test]
fn test_two_files_become_two_blocks_in_mtime_order() {
    let fixture = two_runs();
    let session = session(&fixture);

    let blocks = session.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].num, 1);
    assert_eq!(blocks[1].num, 2);
    assert_eq!(blocks[0].label(), "Run1");
    assert_eq!(blocks[1].label(), "Run2");
    assert_eq!(blocks[0].line_count(), 3);
    assert_eq!(blocks[1].line_count(), 2);
    // the boundary line is line 0 of its block
    assert_eq!(blocks[0].lines()[0], "Starting run Run1");
    assert_eq!(blocks[0].name, "01 Run1 OK");
    assert_eq!(blocks[1].name, "02 Run2 OK");
}

#[test]
fn test_initial_selection_is_first_block() {
    let fixture = two_runs();
    let mut session = session(&fixture);

    assert_eq!(session.selected_index(), 0);
    assert_eq!(session.current_block().label(), "Run1");

    session.select_block(1).unwrap();
    assert_eq!(session.current_block().label(), "Run2");
}

#[test]
fn test_select_block_out_of_range() {
    let fixture = two_runs();
    let mut session = session(&fixture);
    let err = session.select_block(5).unwrap_err();
    assert!(matches!(err, Error::BlockOutOfRange { index: 5, count: 2 }));
}

#[test]
fn test_free_search_and_navigation() {
    let fixture = two_runs();
    let mut session = session(&fixture);

    session.set_free_search("working").unwrap();
    assert_eq!(session.current_block().matches("free"), &[1]);
    assert_eq!(session.find_match("free", Direction::Next, 0), Some(1));
    assert_eq!(session.find_match("free", Direction::Next, 1), None);
    assert_eq!(session.find_match("free", Direction::Previous, 2), Some(1));

    // clearing the search empties the index
    session.set_free_search("").unwrap();
    assert!(session.current_block().matches("free").is_empty());
}

#[test]
fn test_match_only_edit_keeps_finalized_verdict() {
    let fixture = two_runs();
    let mut session = session(&fixture);

    let mut def = PatternDef::empty();
    def.name = "Completed".to_string();
    def.pattern = "no line has this".to_string();
    def.needed = true;
    session.edit_pattern("1", &def).unwrap();

    let block = session.current_block();
    assert!(block.matches("1").is_empty());
    // observed behavior: pass/fail and name stay as finalized
    assert!(block.passed);
    assert_eq!(block.name, "01 Run1 OK");
}

#[test]
fn test_refinalize_edit_updates_verdict() {
    let fixture = two_runs();
    let mut session = session(&fixture);
    session.set_edit_policy(EditPolicy::Refinalize);

    let mut def = PatternDef::empty();
    def.name = "Completed".to_string();
    def.pattern = "no line has this".to_string();
    def.needed = true;
    session.edit_pattern("1", &def).unwrap();

    let block = session.current_block();
    assert!(!block.passed);
    assert_eq!(block.name, "01 Run1 Crash");
}

#[test]
fn test_add_pattern_indexes_selected_block() {
    let fixture = two_runs();
    let mut session = session(&fixture);

    let mut def = PatternDef::empty();
    def.name = "Working".to_string();
    def.pattern = "working".to_string();
    let id = session.add_pattern(&def).unwrap();

    assert_eq!(id, "2");
    assert_eq!(session.current_block().matches("2"), &[1]);
    assert!(session.patterns().is_modified());
}

#[test]
fn test_rerun_patterns_rebuilds_whole_index() {
    let fixture = two_runs();
    let mut session = session(&fixture);
    session.set_free_search("working").unwrap();

    session.rerun_patterns();

    let block = session.current_block();
    assert_eq!(block.matches("0"), &[0]);
    assert_eq!(block.matches("1"), &[2]);
    assert_eq!(block.matches("free"), &[1]);
    assert!(block.passed);
}

#[test]
fn test_save_patterns_backs_up_previous_file() {
    let fixture = two_runs();
    let mut session = session(&fixture);

    let mut def = PatternDef::empty();
    def.name = "Working".to_string();
    def.pattern = "working".to_string();
    session.add_pattern(&def).unwrap();
    session.save_patterns().unwrap();

    let backup = fixture.patterns_path.with_extension("bkp");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), PATTERNS);
    assert!(!session.patterns().is_modified());

    let reloaded = PatternSet::load(&fixture.patterns_path).unwrap();
    assert_eq!(
        reloaded.names().collect::<Vec<_>>(),
        ["Run start", "Completed", "Working"]
    );
}

#[test]
fn test_bad_free_search_leaves_session_intact() {
    let fixture = two_runs();
    let mut session = session(&fixture);

    let err = session.set_free_search("[unclosed").unwrap_err();
    assert!(matches!(err, Error::InvalidExpression { .. }));
    // previous (empty) search still in place
    assert!(session.patterns().free().is_empty());
}
