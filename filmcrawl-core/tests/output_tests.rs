// Tests for record output formats

use filmcrawl_core::output::{
    OutputFormat, generate_csv, generate_json_lines, generate_text_output, render_records,
    save_output,
};
use filmcrawl_scanner::FilmRecord;
use tempfile::TempDir;

fn solaris() -> FilmRecord {
    FilmRecord {
        title: "Солярис".to_string(),
        genre: "драма; фантастика".to_string(),
        director: "Андрей Тарковский".to_string(),
        country: "СССР".to_string(),
        year: "1972".to_string(),
        source_url: "https://ru.wikipedia.org/wiki/Солярис_(фильм,_1972)".to_string(),
        ..FilmRecord::default()
    }
}

fn enriched() -> FilmRecord {
    FilmRecord {
        linked_entity_id: Some("Q130237".to_string()),
        external_id: Some("tt0069293".to_string()),
        external_rating: Some("8.0".to_string()),
        ..solaris()
    }
}

// ============================================================================
// Output Format Tests
// ============================================================================

#[test]
fn test_output_format_from_str() {
    assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
    assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
    assert_eq!(OutputFormat::from_str("jsonl"), Some(OutputFormat::JsonLines));
    assert_eq!(OutputFormat::from_str("ndjson"), Some(OutputFormat::JsonLines));
    assert_eq!(OutputFormat::from_str("csv"), Some(OutputFormat::Csv));
}

#[test]
fn test_output_format_from_str_case_insensitive() {
    assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
    assert_eq!(OutputFormat::from_str("Csv"), Some(OutputFormat::Csv));
}

#[test]
fn test_output_format_from_str_invalid() {
    assert_eq!(OutputFormat::from_str("html"), None);
    assert_eq!(OutputFormat::from_str(""), None);
}

// ============================================================================
// JSON Tests
// ============================================================================

#[test]
fn test_json_field_order_without_enrichment() {
    let json = render_records(&[solaris()], OutputFormat::Json).unwrap();

    let positions: Vec<usize> = ["\"title\"", "\"genre\"", "\"director\"", "\"country\"", "\"year\"", "\"source_url\""]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert!(!json.contains("linked_entity_id"));
    assert!(!json.contains("external_id"));
    assert!(!json.contains("external_rating"));
}

#[test]
fn test_json_includes_enrichment_fields() {
    let json = render_records(&[enriched()], OutputFormat::Json).unwrap();
    let parsed: Vec<FilmRecord> = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, vec![enriched()]);
    assert!(json.find("\"source_url\"").unwrap() < json.find("\"linked_entity_id\"").unwrap());
}

#[test]
fn test_json_keeps_empty_enrichment_values() {
    let mut record = solaris();
    record.settle_enrichment();

    let json = render_records(&[record], OutputFormat::Json).unwrap();
    assert!(json.contains("\"external_id\": \"\""));
}

#[test]
fn test_json_lines_one_record_per_line() {
    let output = generate_json_lines(&[solaris(), enriched()]).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 2);
    let first: FilmRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.title, "Солярис");
    assert!(lines[1].contains("tt0069293"));
}

#[test]
fn test_json_lines_empty() {
    assert_eq!(generate_json_lines(&[]).unwrap(), "");
}

// ============================================================================
// CSV Tests
// ============================================================================

#[test]
fn test_csv_header_without_enrichment() {
    let csv = generate_csv(&[solaris()]);
    let header = csv.lines().next().unwrap();
    assert_eq!(header, "title,genre,director,country,year,source_url");
}

#[test]
fn test_csv_header_with_enrichment() {
    let csv = generate_csv(&[enriched()]);
    let header = csv.lines().next().unwrap();
    assert_eq!(
        header,
        "title,genre,director,country,year,source_url,linked_entity_id,external_id,external_rating"
    );
    assert!(csv.contains("Q130237,tt0069293,8.0"));
}

#[test]
fn test_csv_escapes_commas_and_quotes() {
    let mut record = solaris();
    record.title = "Мама, я \"дома\"".to_string();

    let csv = generate_csv(&[record]);
    assert!(csv.contains("\"Мама, я \"\"дома\"\"\""));
}

#[test]
fn test_csv_plain_values_unquoted() {
    let csv = generate_csv(&[solaris()]);
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with("Солярис,драма; фантастика,Андрей Тарковский,СССР,1972,"));
}

#[test]
fn test_csv_empty_records() {
    let csv = generate_csv(&[]);
    assert_eq!(csv.lines().count(), 1);
}

// ============================================================================
// Text Tests
// ============================================================================

#[test]
fn test_text_output_lists_fields() {
    let text = generate_text_output(&[solaris()]);

    assert!(text.contains("1. Солярис (1972)"));
    assert!(text.contains("Genre"));
    assert!(text.contains("Андрей Тарковский"));
    assert!(text.contains("https://ru.wikipedia.org/wiki/"));
    assert!(!text.contains("IMDb"));
}

#[test]
fn test_text_output_skips_empty_fields() {
    let record = FilmRecord::new("Без данных".to_string(), "https://example.com/x".to_string());
    let text = generate_text_output(&[record]);

    assert!(text.contains("1. Без данных\n"));
    assert!(!text.contains("Genre"));
    assert!(!text.contains("Director"));
}

#[test]
fn test_text_output_shows_rating() {
    let text = generate_text_output(&[enriched()]);
    assert!(text.contains("IMDb"));
    assert!(text.contains("8.0 (tt0069293)"));
}

#[test]
fn test_text_output_missing_rating() {
    let mut record = enriched();
    record.external_rating = Some(String::new());
    let text = generate_text_output(&[record]);
    assert!(text.contains("n/a (tt0069293)"));
}

// ============================================================================
// Save Tests
// ============================================================================

#[test]
fn test_save_output() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("films.json");

    let content = render_records(&[solaris()], OutputFormat::Json).unwrap();
    save_output(&content, &path).unwrap();

    let read_back = std::fs::read_to_string(&path).unwrap();
    assert_eq!(read_back, content);
}

#[test]
fn test_save_output_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("films.csv");
    assert!(save_output("title\n", &path).is_err());
}
