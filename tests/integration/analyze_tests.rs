use rowdupe::duplicates::{AnalyzerConfig, DuplicateAnalyzer, NullEquality};
use rowdupe::table::{ReaderOptions, TableReader, Value};
use std::fs;
use tempfile::tempdir;

fn read(csv: &str) -> rowdupe::table::Table {
    TableReader::new(ReaderOptions::default())
        .read_from(csv.as_bytes())
        .unwrap()
}

#[test]
fn test_analyze_file_all_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, "a,b\n1,2\n1,2\n3,4\n1,2\n").unwrap();

    let table = TableReader::default().read_path(&path).unwrap();
    let analysis = DuplicateAnalyzer::with_defaults().analyze(&table).unwrap();

    let counts: Vec<usize> = analysis
        .output
        .rows()
        .iter()
        .map(|r| r.duplicate_count)
        .collect();
    assert_eq!(counts, vec![3, 3, 3, 1]);
    assert_eq!(analysis.stats.exported_duplicate_rows, 3);
    assert_eq!(analysis.stats.single_rows, 1);
    assert_eq!(analysis.stats.duplicate_patterns, 1);
}

#[test]
fn test_cap_applies_per_pattern() {
    let mut csv = String::from("k\n");
    for _ in 0..7 {
        csv.push_str("x\n");
    }
    for _ in 0..3 {
        csv.push_str("y\n");
    }
    let table = read(&csv);

    let analyzer = DuplicateAnalyzer::new(AnalyzerConfig::default().with_max_duplicates(5));
    let analysis = analyzer.analyze(&table).unwrap();

    let rows = analysis.output.rows();
    assert_eq!(rows.len(), 8);
    assert!(rows[..5]
        .iter()
        .all(|r| r.values == vec![Value::Text("x".into())] && r.duplicate_count == 7));
    assert!(rows[5..]
        .iter()
        .all(|r| r.values == vec![Value::Text("y".into())] && r.duplicate_count == 3));
    assert_eq!(analysis.stats.exported_duplicate_rows, 8);
    assert_eq!(analysis.stats.omitted_rows, 2);
}

#[test]
fn test_subset_columns_keep_full_rows() {
    let table = read("id,name,email\n1,Ann,a@x\n2,Bob,a@x\n3,Cy,c@x\n");
    let analyzer = DuplicateAnalyzer::new(AnalyzerConfig::default().with_columns(["email"]));
    let analysis = analyzer.analyze(&table).unwrap();

    assert_eq!(analysis.key_columns, vec!["email"]);
    let rows = analysis.output.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].values[1], Value::Text("Ann".into()));
    assert_eq!(rows[1].values[1], Value::Text("Bob".into()));
    assert_eq!(rows[2].duplicate_count, 1);
}

#[test]
fn test_missing_values_group_together_by_default() {
    let table = read("a,b\n1,\n1,NA\n2,3\n");
    let analysis = DuplicateAnalyzer::with_defaults().analyze(&table).unwrap();
    assert_eq!(analysis.stats.duplicate_patterns, 1);
    assert_eq!(analysis.output.rows()[0].duplicate_count, 2);

    let distinct = DuplicateAnalyzer::new(
        AnalyzerConfig::default().with_null_equality(NullEquality::Distinct),
    )
    .analyze(&table)
    .unwrap();
    assert_eq!(distinct.stats.duplicate_patterns, 0);
    assert_eq!(distinct.stats.single_rows, 3);
}

#[test]
fn test_int_and_float_columns_compare_numerically() {
    let table = read("v\n1\n1.0\n2.5\n");
    let analysis = DuplicateAnalyzer::with_defaults().analyze(&table).unwrap();
    assert_eq!(analysis.stats.duplicate_patterns, 1);
    assert_eq!(analysis.stats.duplicate_rows, 2);
}

#[test]
fn test_parallel_extraction_on_large_table() {
    let mut csv = String::from("a,b\n");
    for i in 0..5000 {
        csv.push_str(&format!("{},{}\n", i % 100, i % 7));
    }
    let table = read(&csv);

    let sequential = DuplicateAnalyzer::new(AnalyzerConfig::default().with_parallel_threshold(usize::MAX))
        .analyze(&table)
        .unwrap();
    let parallel = DuplicateAnalyzer::new(AnalyzerConfig::default().with_parallel_threshold(0))
        .analyze(&table)
        .unwrap();

    assert_eq!(sequential.output, parallel.output);
    assert_eq!(sequential.stats, parallel.stats);
    assert_eq!(sequential.stats.distinct_patterns, 700);
}
