//! Field extraction from the article infobox.
//!
//! Infobox rows are `<tr><th>label</th><td>value</td></tr>`. Labels vary
//! between articles (singular/plural, `ё`/`е` spellings), so every field is
//! looked up through an ordered group of candidate labels.

use crate::text::{normalize, uniq_preserve};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub const GENRE_LABELS: &[&str] = &["Жанр", "Жанры"];
pub const DIRECTOR_LABELS: &[&str] = &["Режиссёр", "Режиссер", "Режиссёры", "Режиссеры"];
pub const COUNTRY_LABELS: &[&str] = &["Страна", "Страны"];
pub const YEAR_LABELS: &[&str] = &["Год", "Годы", "Премьера", "Дата выхода"];

/// Separator between link texts of a multi-valued cell.
pub const VALUE_DELIMITER: &str = "; ";

static INFOBOX: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"table[class*="infobox"]"#).expect("valid selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static HEADER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").expect("valid selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(18|19|20)[0-9]{2}").expect("year pattern is valid"));

pub fn has_infobox(page: &Html) -> bool {
    page.select(&INFOBOX).next().is_some()
}

/// Value of the first infobox row matching one of `labels`, in label order.
///
/// Returns an empty string when nothing matches or the page has no infobox.
pub fn extract_field(page: &Html, labels: &[&str]) -> String {
    find_value_cell(page, labels)
        .map(cell_value)
        .unwrap_or_default()
}

/// First data cell of the row whose header contains a candidate label.
pub fn find_value_cell<'a>(page: &'a Html, labels: &[&str]) -> Option<ElementRef<'a>> {
    let rows: Vec<ElementRef<'a>> = page
        .select(&INFOBOX)
        .flat_map(|table| table.select(&ROW))
        .collect();

    labels.iter().find_map(|label| {
        rows.iter().find_map(|row| {
            let header_matches = row
                .select(&HEADER)
                .any(|th| th.text().collect::<String>().contains(label));
            if !header_matches {
                return None;
            }
            row.children()
                .filter_map(ElementRef::wrap)
                .find(|child| child.value().name() == "td")
        })
    })
}

/// Turn a value cell into text, preferring the texts of its links.
pub fn cell_value(cell: ElementRef<'_>) -> String {
    let link_texts: Vec<String> = cell
        .select(&ANCHOR)
        .filter(|a| !is_footnote_anchor(a))
        .flat_map(|a| a.text())
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "[" && *t != "]")
        .map(str::to_string)
        .collect();
    let link_texts = uniq_preserve(link_texts);

    if !link_texts.is_empty() {
        return normalize(&link_texts.join(VALUE_DELIMITER));
    }

    let raw = cell
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&raw)
}

// In-page references like <a href="#cite_note-3">[3]</a>
fn is_footnote_anchor(anchor: &ElementRef<'_>) -> bool {
    anchor
        .value()
        .attr("href")
        .is_some_and(|href| href.starts_with('#'))
}

/// Best-effort four digit year in the 1800-2099 range.
pub fn extract_year(text: &str) -> String {
    let text = normalize(text);
    YEAR.find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
