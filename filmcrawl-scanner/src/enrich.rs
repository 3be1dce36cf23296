//! The optional enrichment chain: article → Wikidata entity → IMDb rating.
//!
//! Every stage is a plain function from the record (plus whatever the
//! previous fetch returned) to the next [`ChainStep`]. A stage that finds
//! nothing settles the remaining fields as empty strings and emits the
//! record, so a failed lookup never loses the film.

use crate::frontier::FrontierItem;
use crate::record::FilmRecord;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

pub const DEFAULT_LINKED_DATA_BASE: &str = "https://www.wikidata.org/wiki";
pub const DEFAULT_RATING_BASE: &str = "https://www.imdb.com";

/// Wikidata property holding the IMDb identifier.
pub const EXTERNAL_ID_PROPERTY: &str = "P345";

pub const RATING_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

const ENTITY_HOST_MARKER: &str = "wikidata.org/wiki/";

static ENTITY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li#t-wikibase a[href]").expect("valid selector"));
static LD_JSON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// Base URLs of the two lookup services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub linked_data_base: String,
    pub rating_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            linked_data_base: DEFAULT_LINKED_DATA_BASE.to_string(),
            rating_base: DEFAULT_RATING_BASE.to_string(),
        }
    }
}

impl Endpoints {
    pub fn entity_data_url(&self, entity_id: &str) -> String {
        format!(
            "{}/Special:EntityData/{}.json?flavor=dump",
            self.linked_data_base.trim_end_matches('/'),
            entity_id
        )
    }

    pub fn title_url(&self, external_id: &str) -> String {
        format!(
            "{}/title/{}/",
            self.rating_base.trim_end_matches('/'),
            external_id
        )
    }
}

/// Where the chain goes after a stage.
#[derive(Debug)]
pub enum ChainStep {
    /// The record is complete and goes to the output.
    Emit(FilmRecord),
    /// Another lookup is needed.
    Follow(FrontierItem),
}

/// Stage 1: find the Wikidata item linked from the article.
pub fn start_chain(mut record: FilmRecord, page: &Html) -> ChainStep {
    match linked_entity_id(page) {
        Some(entity_id) => {
            record.linked_entity_id = Some(entity_id.clone());
            ChainStep::Follow(FrontierItem::LinkedEntity {
                record: Box::new(record),
                entity_id,
            })
        }
        None => {
            debug!("No linked entity on {}", record.source_url);
            record.settle_enrichment();
            ChainStep::Emit(record)
        }
    }
}

/// Stage 2: read the external id out of the entity document.
///
/// `body` is `None` when the entity fetch failed.
pub fn resume_after_entity(
    mut record: FilmRecord,
    entity_id: &str,
    body: Option<&str>,
) -> ChainStep {
    let external_id = body
        .map(|json| parse_external_id(json, entity_id))
        .unwrap_or_default();

    if external_id.is_empty() {
        debug!("No external id for entity {}", entity_id);
        record.settle_enrichment();
        return ChainStep::Emit(record);
    }

    record.external_id = Some(external_id.clone());
    ChainStep::Follow(FrontierItem::Rating {
        record: Box::new(record),
        external_id,
    })
}

/// Stage 3: attach the rating. Always terminal.
pub fn finish_after_rating(mut record: FilmRecord, body: Option<&str>) -> FilmRecord {
    record.external_rating = Some(body.map(parse_rating).unwrap_or_default());
    record.settle_enrichment();
    record
}

/// Entity id from the article's "Wikidata item" tool link.
pub fn linked_entity_id(page: &Html) -> Option<String> {
    let href = page.select(&ENTITY_LINK).next()?.value().attr("href")?;
    if !href.contains(ENTITY_HOST_MARKER) {
        return None;
    }

    let last_segment = href.rsplit('/').next()?;
    let id = last_segment.split('#').next()?.trim();

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(id.to_string())
}

/// First value of the external-id claim, or empty on any structural problem.
pub fn parse_external_id(json: &str, entity_id: &str) -> String {
    let Ok(document) = serde_json::from_str::<Value>(json) else {
        debug!("Entity document for {} is not valid JSON", entity_id);
        return String::new();
    };

    let entities = document.get("entities");
    let entity = entities.and_then(|e| e.get(entity_id)).or_else(|| {
        // Redirected items come back keyed by their new id
        entities
            .and_then(Value::as_object)
            .filter(|map| map.len() == 1)
            .and_then(|map| map.values().next())
    });

    entity
        .and_then(|e| e.get("claims"))
        .and_then(|claims| claims.get(EXTERNAL_ID_PROPERTY))
        .and_then(|values| values.get(0))
        .and_then(|claim| claim.pointer("/mainsnak/datavalue/value"))
        .and_then(Value::as_str)
        .map(|id| id.trim().to_string())
        .unwrap_or_default()
}

/// First aggregate rating found in the page's JSON-LD blocks.
pub fn parse_rating(html: &str) -> String {
    let document = Html::parse_document(html);

    for script in document.select(&LD_JSON) {
        let text = script.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let Ok(block) = serde_json::from_str::<Value>(text) else {
            continue;
        };

        let rating = match &block {
            Value::Array(objects) => objects.iter().find_map(aggregate_rating),
            Value::Object(_) => aggregate_rating(&block),
            _ => None,
        };
        if let Some(rating) = rating {
            return rating;
        }
    }

    String::new()
}

fn aggregate_rating(object: &Value) -> Option<String> {
    match object.get("aggregateRating")?.get("ratingValue")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}
