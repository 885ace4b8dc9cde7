use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlrun_core::{collect_sql_files, split_and_write, split_statements, OutputFormat, SplitOptions, SplitStats};
use std::path::PathBuf;

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b_fees.sql"), "SELECT fee FROM t; -- tail;\n").unwrap();
    std::fs::write(dir.path().join("a_volume.sql"), "SELECT 1;\nSELECT ';';").unwrap();
    std::fs::write(dir.path().join("c_open.sql"), "SELECT 1; /* never closed; SELECT 2;").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "SELECT 'ignored';").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("deep.sql"), "SELECT 99;").unwrap();
    dir
}

fn run(dir: &tempfile::TempDir, opts: &SplitOptions) -> (String, SplitStats) {
    let mut out = Vec::new();
    let stats = split_and_write(&[dir.path().to_path_buf()], &mut out, opts).unwrap();
    (String::from_utf8(out).unwrap(), stats)
}

#[test]
fn directories_expand_to_sorted_sql_files() {
    let dir = fixture();
    let files = collect_sql_files(&[dir.path().to_path_buf()]).unwrap();
    let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
    assert_eq!(names, vec!["a_volume.sql", "b_fees.sql", "c_open.sql"]);
}

#[test]
fn missing_input_is_an_error() {
    let err = collect_sql_files(&[PathBuf::from("/definitely/not/here.sql")]).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn json_output_is_ordered_and_counted() {
    let dir = fixture();
    let opts = SplitOptions { format: OutputFormat::Json, threads: Some(1), ..Default::default() };
    let (text, stats) = run(&dir, &opts);

    let items: Value = serde_json::from_str(&text).unwrap();
    let sqls: Vec<_> = items.as_array().unwrap().iter().map(|i| i["sql"].as_str().unwrap().to_string()).collect();
    assert_eq!(
        sqls,
        vec!["SELECT 1", "SELECT ';'", "SELECT fee FROM t", "-- tail;", "SELECT 1", "/* never closed; SELECT 2;"]
    );
    assert_eq!(items[1]["index"], json!(2));
    assert!(items[0]["file"].as_str().unwrap().ends_with("a_volume.sql"));
    assert_eq!(stats, SplitStats { files_split: 3, files_skipped: 0, statements_written: 6, unterminated: 1 });
}

#[test]
fn parallel_output_matches_serial() {
    let dir = fixture();
    let serial = run(&dir, &SplitOptions { threads: Some(1), ..Default::default() });
    let parallel = run(&dir, &SplitOptions { threads: Some(4), ..Default::default() });
    assert_eq!(serial, parallel);
}

#[test]
fn text_output_terminates_each_statement() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.sql");
    std::fs::write(&path, "SELECT 1;SELECT 2").unwrap();

    let mut out = Vec::new();
    split_and_write(&[path.clone()], &mut out, &SplitOptions::default()).unwrap();
    let expected = format!("-- file: {}\nSELECT 1\n;\n\nSELECT 2\n;\n\n", path.display());
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn oversized_files_are_skipped() {
    let dir = fixture();
    let opts = SplitOptions { max_file_size: Some(21), threads: Some(1), ..Default::default() };
    let (_, stats) = run(&dir, &opts);
    // 只有 a_volume.sql（21 字节）不超过上限
    assert_eq!(stats.files_split, 1);
    assert_eq!(stats.files_skipped, 2);
}

#[test]
fn text_output_replays_statements_ending_in_line_comment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.sql");
    std::fs::write(&path, "SELECT 1 -- note\n;\nSELECT 2;").unwrap();

    let mut out = Vec::new();
    let stats = split_and_write(&[path], &mut out, &SplitOptions::default()).unwrap();
    assert_eq!(stats.statements_written, 2);

    let text = String::from_utf8(out).unwrap();
    let replayed = split_statements(&text);
    assert_eq!(replayed.len(), 2);
    assert!(replayed[0].ends_with("SELECT 1 -- note"));
    assert_eq!(replayed[1], "SELECT 2");
}
