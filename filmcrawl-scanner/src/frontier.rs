//! Work queue shared by the crawl workers.

use crate::enrich::{Endpoints, RATING_ACCEPT_LANGUAGE};
use crate::record::FilmRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// One unit of crawl work. Each variant is one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierItem {
    /// A category reached through a subcategory link or as the seed.
    Category { url: String },
    /// The next page of a category listing already being traversed.
    CategoryPage { url: String },
    /// A candidate film article, with its link text from the listing.
    Article { url: String, link_text: String },
    /// Stage 2 of enrichment: the record waits on its Wikidata entity.
    LinkedEntity {
        record: Box<FilmRecord>,
        entity_id: String,
    },
    /// Stage 3 of enrichment: the record waits on its IMDb page.
    Rating {
        record: Box<FilmRecord>,
        external_id: String,
    },
}

impl FrontierItem {
    pub fn url(&self, endpoints: &Endpoints) -> String {
        match self {
            FrontierItem::Category { url }
            | FrontierItem::CategoryPage { url }
            | FrontierItem::Article { url, .. } => url.clone(),
            FrontierItem::LinkedEntity { entity_id, .. } => endpoints.entity_data_url(entity_id),
            FrontierItem::Rating { external_id, .. } => endpoints.title_url(external_id),
        }
    }

    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            FrontierItem::Rating { .. } => &[("Accept-Language", RATING_ACCEPT_LANGUAGE)],
            _ => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FrontierItem::Category { .. } => "category",
            FrontierItem::CategoryPage { .. } => "category page",
            FrontierItem::Article { .. } => "article",
            FrontierItem::LinkedEntity { .. } => "entity",
            FrontierItem::Rating { .. } => "rating",
        }
    }
}

/// Worker-owned FIFO queues with round-robin distribution.
///
/// A worker pops from its own queue first and steals from siblings when it
/// runs dry. `in_flight` counts items that were popped but not yet
/// finished, so an empty set of queues only means "done" once every worker
/// has pushed the follow-ups of its current item.
pub struct Frontier {
    queues: Vec<Mutex<VecDeque<FrontierItem>>>,
    next_queue: AtomicUsize,
    in_flight: AtomicUsize,
}

impl Frontier {
    pub fn new(workers: usize) -> Self {
        Self {
            queues: (0..workers.max(1))
                .map(|_| Mutex::new(VecDeque::new()))
                .collect(),
            next_queue: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub async fn push(&self, item: FrontierItem) {
        let target = self.next_queue.fetch_add(1, Ordering::Relaxed) % self.queues.len();
        self.queues[target].lock().await.push_back(item);
    }

    /// Take the next item for `worker_id`, marking it in flight.
    ///
    /// Every `Some` must be matched by a call to [`Frontier::done`].
    pub async fn pop(&self, worker_id: usize) -> Option<FrontierItem> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let count = self.queues.len();
        for offset in 0..count {
            let index = (worker_id + offset) % count;
            if let Some(item) = self.queues[index].lock().await.pop_front() {
                return Some(item);
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        None
    }

    pub fn done(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn pending(&self) -> usize {
        let mut total = 0;
        for queue in &self.queues {
            total += queue.lock().await.len();
        }
        total
    }

    /// No queued work and nothing in flight.
    pub async fn is_drained(&self) -> bool {
        if self.in_flight() > 0 {
            return false;
        }
        for queue in &self.queues {
            if !queue.lock().await.is_empty() {
                return false;
            }
        }
        self.in_flight() == 0
    }
}
