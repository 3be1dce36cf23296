// Record output in the formats the CLI can write

use filmcrawl_scanner::FilmRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonLines,
    Csv,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "jsonl" | "ndjson" => Some(OutputFormat::JsonLines),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

const BASE_COLUMNS: [&str; 6] = ["title", "genre", "director", "country", "year", "source_url"];
const ENRICHMENT_COLUMNS: [&str; 3] = ["linked_entity_id", "external_id", "external_rating"];

pub fn render_records(records: &[FilmRecord], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(generate_text_output(records)),
        OutputFormat::Json => serde_json::to_string_pretty(records),
        OutputFormat::JsonLines => generate_json_lines(records),
        OutputFormat::Csv => Ok(generate_csv(records)),
    }
}

pub fn generate_json_lines(records: &[FilmRecord]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// CSV with a header row. Enrichment columns appear only when at least one
/// record carries enrichment fields.
pub fn generate_csv(records: &[FilmRecord]) -> String {
    let enriched = records.iter().any(|r| r.linked_entity_id.is_some());

    let mut columns: Vec<&str> = BASE_COLUMNS.to_vec();
    if enriched {
        columns.extend(ENRICHMENT_COLUMNS);
    }

    let mut out = columns.join(",");
    out.push('\n');

    for record in records {
        let mut fields = vec![
            record.title.as_str(),
            record.genre.as_str(),
            record.director.as_str(),
            record.country.as_str(),
            record.year.as_str(),
            record.source_url.as_str(),
        ];
        if enriched {
            fields.push(record.linked_entity_id.as_deref().unwrap_or_default());
            fields.push(record.external_id.as_deref().unwrap_or_default());
            fields.push(record.external_rating.as_deref().unwrap_or_default());
        }

        let line = fields
            .into_iter()
            .map(csv_escape)
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn generate_text_output(records: &[FilmRecord]) -> String {
    let mut out = String::new();

    for (idx, record) in records.iter().enumerate() {
        let year = if record.year.is_empty() {
            String::new()
        } else {
            format!(" ({})", record.year)
        };
        out.push_str(&format!("{:>4}. {}{}\n", idx + 1, record.title, year));

        for (label, value) in [
            ("Genre", &record.genre),
            ("Director", &record.director),
            ("Country", &record.country),
        ] {
            if !value.is_empty() {
                out.push_str(&format!("      {:<9} {}\n", label, value));
            }
        }

        if let Some(ref external_id) = record.external_id
            && !external_id.is_empty()
        {
            let rating = record
                .external_rating
                .as_deref()
                .filter(|r| !r.is_empty())
                .unwrap_or("n/a");
            out.push_str(&format!("      {:<9} {} ({})\n", "IMDb", rating, external_id));
        }

        out.push_str(&format!("      {}\n", record.source_url));
    }

    out
}

pub fn save_output(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
