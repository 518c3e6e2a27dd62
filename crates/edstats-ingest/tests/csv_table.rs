use std::fs;
use std::path::PathBuf;

use edstats_ingest::{
    CsvTable, LabelVocabulary, ReadOptions, read_csv_table, read_csv_table_with_options,
    translate_tables, write_table,
};
use tempfile::TempDir;

fn temp_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_table_and_trims_cells() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(
        &dir,
        "wide.csv",
        "\u{feff}Agency  Name ,2017_A_A_A\n NAMPA SCHOOL DISTRICT ,15585\n,\nBOISE,-1\n",
    );
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.headers, vec!["Agency Name", "2017_A_A_A"]);
    assert_eq!(table.height(), 2);
    assert_eq!(table.cell(0, 0), "NAMPA SCHOOL DISTRICT");
    assert_eq!(table.cell(1, 1), "-1");
    assert_eq!(table.cell(5, 1), "");
    assert_eq!(table.column_index("2017_A_A_A"), Some(1));
}

#[test]
fn pads_short_rows() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "short.csv", "A,B,C\n1\n2,3,4\n");
    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.rows[0], vec!["1", "", ""]);
    assert_eq!(table.rows[1], vec!["2", "3", "4"]);
}

#[test]
fn skips_banner_and_footer() {
    let dir = TempDir::new().expect("temp dir");
    let mut contents = String::new();
    for line in 0..6 {
        contents.push_str(&format!("banner line {line}\n"));
    }
    contents.push_str("Agency Name,Total Students [District] 2017-18\n");
    contents.push_str("NAMPA SCHOOL DISTRICT,15585\n");
    for line in 0..7 {
        contents.push_str(&format!("footnote {line}\n"));
    }
    let path = temp_file(&dir, "export.csv", &contents);
    let table = read_csv_table_with_options(&path, ReadOptions::nces_export()).expect("read");
    assert_eq!(
        table.headers,
        vec!["Agency Name", "Total Students [District] 2017-18"]
    );
    assert_eq!(table.rows, vec![vec!["NAMPA SCHOOL DISTRICT", "15585"]]);
}

#[test]
fn empty_file_yields_empty_table() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "empty.csv", "\n\n");
    let table = read_csv_table(&path).expect("read csv");
    assert!(table.headers.is_empty());
    assert_eq!(table.height(), 0);
}

#[test]
fn translates_and_joins_raw_exports() {
    let first = CsvTable::new(
        vec![
            "Agency Name".to_string(),
            "Total Students [District] 2017-18".to_string(),
            "State Name [District] Latest available year".to_string(),
        ],
        vec![vec![
            "NAMPA SCHOOL DISTRICT".to_string(),
            "15585".to_string(),
            "Idaho".to_string(),
        ]],
    );
    let second = CsvTable::new(
        vec![
            "Agency Name".to_string(),
            "Grade 4 Students [District] 2017-18".to_string(),
            "Total Students [District] 2017-18 (revised)".to_string(),
        ],
        vec![vec![
            "NAMPA SCHOOL DISTRICT".to_string(),
            "1200".to_string(),
            "99999".to_string(),
        ]],
    );
    let joined = translate_tables(&LabelVocabulary::nces(), &[first, second]);
    assert_eq!(
        joined.headers,
        vec!["State Name", "Agency Name", "2017_A_A_A", "2017_G04_A_A"]
    );
    assert_eq!(
        joined.rows,
        vec![vec!["Idaho", "NAMPA SCHOOL DISTRICT", "15585", "1200"]]
    );

    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("nested").join("raw.csv");
    let bytes = write_table(&joined, &out).expect("write table");
    let text = String::from_utf8(bytes).expect("utf8");
    assert!(text.starts_with("State Name,Agency Name,2017_A_A_A,2017_G04_A_A\n"));
    assert_eq!(fs::read_to_string(&out).expect("read back"), text);
}
