use rowdupe::duplicates::{analyze, AnalyzerConfig, DuplicateAnalyzer};
use rowdupe::error::ExitCode;
use rowdupe::output::{CsvOutput, JsonOutput, WriteOutcome};
use rowdupe::table::{ReaderOptions, TableReader};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_export_matches_source_schema_plus_count() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "id,city,score\n1,Oslo,2.5\n2,Oslo,2.5\n3,Rome,\n").unwrap();

    let table = TableReader::default().read_path(&input).unwrap();
    let analysis = DuplicateAnalyzer::new(AnalyzerConfig::default().with_columns(["city", "score"]))
        .analyze(&table)
        .unwrap();
    let outcome = CsvOutput::new(&analysis.output).write_path(&output).unwrap();

    assert_eq!(
        outcome,
        WriteOutcome::Written {
            rows: 3,
            path: output.clone()
        }
    );
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "id,city,score,duplicate_count\n1,Oslo,2.5,2\n2,Oslo,2.5,2\n3,Rome,,1\n"
    );
}

#[test]
fn test_export_reads_back_with_same_values() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let table = TableReader::default()
        .read_from("a,b\n1.0,x\n1.0,x\n2.0,y\n".as_bytes())
        .unwrap();
    let analysis = analyze(&table, None, 5).unwrap();
    CsvOutput::new(&analysis.output).write_path(&output).unwrap();

    let reloaded = TableReader::default().read_path(&output).unwrap();
    assert_eq!(reloaded.columns(), &["a", "b", "duplicate_count"]);
    for (row, annotated) in reloaded.rows().iter().zip(analysis.output.rows()) {
        assert_eq!(&row[..2], annotated.values.as_slice());
    }
}

#[test]
fn test_export_with_semicolon_delimiter() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let options = ReaderOptions::default().with_delimiter(b';');
    let table = TableReader::new(options)
        .read_from("a;b\n1;2\n1;2\n".as_bytes())
        .unwrap();
    let analysis = analyze(&table, None, 1).unwrap();

    CsvOutput::new(&analysis.output)
        .with_delimiter(b';')
        .write_path(&output)
        .unwrap();
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "a;b;duplicate_count\n1;2;2\n"
    );
}

#[test]
fn test_json_report_lists_duplicate_patterns() {
    let table = TableReader::default()
        .read_from("k\na\na\na\nb\n".as_bytes())
        .unwrap();
    let analysis = analyze(&table, None, 2).unwrap();

    let json = JsonOutput::new(&analysis, ExitCode::Success)
        .to_json_pretty()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["duplicates"][0]["values"], serde_json::json!(["a"]));
    assert_eq!(value["duplicates"][0]["count"], 3);
    assert_eq!(value["duplicates"][0]["rows"], serde_json::json!([0, 1]));
    assert_eq!(value["summary"]["exported_duplicate_rows"], 2);
    assert_eq!(value["summary"]["single_rows"], 1);
}
