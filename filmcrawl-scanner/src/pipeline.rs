use crate::category::CategoryListing;
use crate::enrich::{
    ChainStep, Endpoints, finish_after_rating, resume_after_entity, start_chain,
};
use crate::fetch::Fetcher;
use crate::frontier::FrontierItem;
use crate::record::{FilmRecord, extract_record};
use crate::state::CrawlState;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info};

/// What processing one frontier item produced.
#[derive(Debug, Default)]
pub struct Outcome {
    pub follow: Vec<FrontierItem>,
    pub emitted: Vec<FilmRecord>,
}

impl Outcome {
    fn emit(record: FilmRecord) -> Self {
        Self {
            follow: Vec::new(),
            emitted: vec![record],
        }
    }
}

impl From<ChainStep> for Outcome {
    fn from(step: ChainStep) -> Self {
        match step {
            ChainStep::Emit(record) => Outcome::emit(record),
            ChainStep::Follow(item) => Outcome {
                follow: vec![item],
                emitted: Vec::new(),
            },
        }
    }
}

/// Turns one frontier item into follow-up items and finished records.
///
/// The only suspension point is the fetch; parsing runs synchronously on the
/// fetched body and the DOM is dropped before the next await.
pub struct Pipeline {
    fetcher: Fetcher,
    state: Arc<CrawlState>,
    endpoints: Endpoints,
    enrich: bool,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, state: Arc<CrawlState>, endpoints: Endpoints, enrich: bool) -> Self {
        Self {
            fetcher,
            state,
            endpoints,
            enrich,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn process(&self, item: FrontierItem) -> Outcome {
        let url = item.url(&self.endpoints);
        let headers = item.headers();

        match item {
            FrontierItem::Category { .. } | FrontierItem::CategoryPage { .. } => {
                if self.state.limit_reached() {
                    debug!("Record limit reached, not walking {}", url);
                    return Outcome::default();
                }
                let Some(response) = self.fetcher.fetch_ok(&url, headers).await else {
                    return Outcome::default();
                };
                // A redirect may land on a category we already walked
                if response.final_url != url && !self.state.claim_category(&response.final_url) {
                    debug!("{} redirected to visited {}", url, response.final_url);
                    return Outcome::default();
                }
                self.handle_category(&response.body, &response.final_url)
            }
            FrontierItem::Article { link_text, .. } => {
                if self.state.limit_reached() {
                    debug!("Record limit reached, skipping {}", url);
                    return Outcome::default();
                }
                let Some(response) = self.fetcher.fetch_ok(&url, headers).await else {
                    return Outcome::default();
                };
                self.handle_article(&response.body, &response.final_url, &link_text)
            }
            FrontierItem::LinkedEntity { record, entity_id } => {
                let body = self.fetcher.fetch_ok(&url, headers).await.map(|r| r.body);
                resume_after_entity(*record, &entity_id, body.as_deref()).into()
            }
            FrontierItem::Rating { record, .. } => {
                let body = self.fetcher.fetch_ok(&url, headers).await.map(|r| r.body);
                Outcome::emit(finish_after_rating(*record, body.as_deref()))
            }
        }
    }

    /// Queue subcategories, member articles and the next listing page.
    ///
    /// A page handled after the record limit is hit queues nothing. Once the
    /// limit is hit mid-page, enumeration of this page stops and its
    /// pagination is not followed. Items queued earlier by other pages are
    /// left alone.
    pub fn handle_category(&self, body: &str, page_url: &str) -> Outcome {
        if self.state.limit_reached() {
            debug!("Record limit reached, ignoring listing {}", page_url);
            return Outcome::default();
        }

        let listing = CategoryListing::parse(body, page_url);
        let mut follow = Vec::new();

        for url in listing.subcategories {
            if self.state.claim_category(&url) {
                follow.push(FrontierItem::Category { url });
            }
        }

        for member in listing.members {
            if !self.state.claim_record(&member.url) {
                continue;
            }
            if self.state.limit_reached() {
                debug!("Record limit reached while listing {}", page_url);
                return Outcome {
                    follow,
                    emitted: Vec::new(),
                };
            }
            follow.push(FrontierItem::Article {
                url: member.url,
                link_text: member.title,
            });
        }

        if let Some(url) = listing.next_page
            && self.state.claim_category(&url)
        {
            follow.push(FrontierItem::CategoryPage { url });
        }

        debug!("{} queued {} items", page_url, follow.len());
        Outcome {
            follow,
            emitted: Vec::new(),
        }
    }

    /// Extract a record and, when enrichment is on, start its lookup chain.
    pub fn handle_article(&self, body: &str, page_url: &str, link_text: &str) -> Outcome {
        let page = Html::parse_document(body);

        let Some(record) = extract_record(&page, page_url, link_text) else {
            debug!("No infobox on {}, not a film", page_url);
            return Outcome::default();
        };

        let total = self.state.record_extracted();
        info!(
            "Extracted \"{}\" ({}/{})",
            record.title,
            total,
            self.state.max_records()
        );

        if !self.enrich {
            return Outcome::emit(record);
        }
        start_chain(record, &page).into()
    }
}
