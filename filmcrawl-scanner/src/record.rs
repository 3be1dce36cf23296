use crate::infobox::{
    COUNTRY_LABELS, DIRECTOR_LABELS, GENRE_LABELS, YEAR_LABELS, extract_field, extract_year,
    has_infobox,
};
use crate::text::normalize;
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1#firstHeading").expect("valid selector"));

/// One extracted film.
///
/// Field order is the output order. The enrichment fields stay `None` when
/// enrichment is disabled and become `Some("")` when a lookup stage failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub title: String,
    pub genre: String,
    pub director: String,
    pub country: String,
    pub year: String,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_rating: Option<String>,
}

impl FilmRecord {
    pub fn new(title: String, source_url: String) -> Self {
        Self {
            title,
            source_url,
            ..Default::default()
        }
    }

    /// Fill every enrichment field that is still unset with an empty value.
    pub fn settle_enrichment(&mut self) {
        for field in [
            &mut self.linked_entity_id,
            &mut self.external_id,
            &mut self.external_rating,
        ] {
            field.get_or_insert_with(String::new);
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.external_rating.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// Build a record from an article page.
///
/// Pages without an infobox are not films and yield `None`; anything else
/// yields a record even when individual fields come out empty. The title is
/// the page heading, then the category link text, then the article name taken
/// from the URL.
pub fn extract_record(page: &Html, source_url: &str, fallback_title: &str) -> Option<FilmRecord> {
    if !has_infobox(page) {
        return None;
    }

    let heading = page
        .select(&HEADING)
        .next()
        .map(|h1| normalize(&h1.text().collect::<String>()))
        .unwrap_or_default();
    let title = [heading, normalize(fallback_title)]
        .into_iter()
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| title_from_url(source_url));

    let mut record = FilmRecord::new(title, source_url.to_string());
    record.genre = extract_field(page, GENRE_LABELS);
    record.director = extract_field(page, DIRECTOR_LABELS);
    record.country = extract_field(page, COUNTRY_LABELS);
    record.year = extract_year(&extract_field(page, YEAR_LABELS));

    Some(record)
}

/// Article name from the last path segment: percent-decoded, underscores as
/// spaces. Empty when the URL has no usable path.
pub fn title_from_url(source_url: &str) -> String {
    let Ok(url) = Url::parse(source_url) else {
        return String::new();
    };
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or_default();
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    normalize(&decoded.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILM_URL: &str = "https://ru.wikipedia.org/wiki/Solaris";

    #[test]
    fn test_extract_full_record() {
        let html = r#"<html><body>
            <h1 id="firstHeading"><span>Солярис (фильм,&nbsp;1972)</span></h1>
            <table class="infobox">
                <tr><th>Жанр</th><td><a href="/wiki/SF">научная фантастика</a>, <a href="/wiki/Drama">драма</a></td></tr>
                <tr><th>Режиссёр</th><td><a href="/wiki/Tarkovsky">Андрей Тарковский</a></td></tr>
                <tr><th>Страна</th><td>СССР</td></tr>
                <tr><th>Год</th><td>1972[1]</td></tr>
            </table>
        </body></html>"#;

        let record = extract_record(&Html::parse_document(html), FILM_URL, "ignored").unwrap();

        assert_eq!(record.title, "Солярис (фильм, 1972)");
        assert_eq!(record.genre, "научная фантастика; драма");
        assert_eq!(record.director, "Андрей Тарковский");
        assert_eq!(record.country, "СССР");
        assert_eq!(record.year, "1972");
        assert_eq!(record.source_url, FILM_URL);
        assert_eq!(record.linked_entity_id, None);
        assert_eq!(record.external_id, None);
        assert_eq!(record.external_rating, None);
    }

    #[test]
    fn test_page_without_infobox_is_rejected() {
        let html = r#"<html><body><h1 id="firstHeading">Фильм</h1><p>text</p></body></html>"#;
        assert!(extract_record(&Html::parse_document(html), FILM_URL, "Фильм").is_none());
    }

    #[test]
    fn test_empty_fields_still_yield_record() {
        let html = r#"<html><body>
            <h1 id="firstHeading">Безымянный</h1>
            <table class="infobox"><tr><th>Бюджет</th><td>1</td></tr></table>
        </body></html>"#;

        let record = extract_record(&Html::parse_document(html), FILM_URL, "").unwrap();
        assert_eq!(record.title, "Безымянный");
        assert_eq!(record.genre, "");
        assert_eq!(record.director, "");
        assert_eq!(record.country, "");
        assert_eq!(record.year, "");
    }

    #[test]
    fn test_fallback_title() {
        let html = r#"<html><body><table class="infobox"></table></body></html>"#;
        let record =
            extract_record(&Html::parse_document(html), FILM_URL, " Солярис ").unwrap();
        assert_eq!(record.title, "Солярис");
    }

    #[test]
    fn test_title_from_url_when_heading_and_link_text_are_empty() {
        let html = r#"<html><body><table class="infobox"></table></body></html>"#;
        let url = "https://ru.wikipedia.org/wiki/%D0%A1%D0%BE%D0%BB%D1%8F%D1%80%D0%B8%D1%81_(%D1%84%D0%B8%D0%BB%D1%8C%D0%BC)";

        let record = extract_record(&Html::parse_document(html), url, "").unwrap();
        assert_eq!(record.title, "Солярис (фильм)");
        assert_eq!(record.source_url, url);
    }

    #[test]
    fn test_title_from_url() {
        assert_eq!(title_from_url("https://ru.wikipedia.org/wiki/Stalker_(film)"), "Stalker (film)");
        assert_eq!(title_from_url("https://ru.wikipedia.org/wiki/Solaris/"), "Solaris");
        assert_eq!(title_from_url("https://ru.wikipedia.org/"), "");
        assert_eq!(title_from_url("not a url"), "");
    }

    #[test]
    fn test_serialized_field_order() {
        let mut record = FilmRecord::new("T".to_string(), "u".to_string());
        let plain = serde_json::to_string(&record).unwrap();
        assert_eq!(
            plain,
            r#"{"title":"T","genre":"","director":"","country":"","year":"","source_url":"u"}"#
        );

        record.settle_enrichment();
        let enriched = serde_json::to_string(&record).unwrap();
        assert!(enriched.ends_with(
            r#""source_url":"u","linked_entity_id":"","external_id":"","external_rating":""}"#
        ));
    }

    #[test]
    fn test_settle_enrichment_keeps_existing_values() {
        let mut record = FilmRecord::new("T".to_string(), "u".to_string());
        record.linked_entity_id = Some("Q1".to_string());
        record.settle_enrichment();
        assert_eq!(record.linked_entity_id.as_deref(), Some("Q1"));
        assert_eq!(record.external_id.as_deref(), Some(""));
        assert!(!record.is_enriched());
    }
}
