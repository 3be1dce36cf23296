use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Crawl-wide bookkeeping shared by every worker.
///
/// All claims are check-and-insert under one lock, so two workers can never
/// both win the same URL and the record counter is never double-counted.
#[derive(Debug)]
pub struct CrawlState {
    inner: Mutex<StateInner>,
    max_records: usize,
}

#[derive(Debug, Default)]
struct StateInner {
    seen_categories: HashSet<String>,
    seen_records: HashSet<String>,
    record_count: usize,
}

impl CrawlState {
    pub fn new(max_records: usize) -> Self {
        Self {
            inner: Mutex::new(StateInner::default()),
            max_records,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a category page as visited. Returns false if it already was.
    pub fn claim_category(&self, url: &str) -> bool {
        self.lock().seen_categories.insert(url.to_string())
    }

    /// Mark an article URL as scheduled. Returns false if it already was.
    pub fn claim_record(&self, url: &str) -> bool {
        self.lock().seen_records.insert(url.to_string())
    }

    pub fn limit_reached(&self) -> bool {
        self.lock().record_count >= self.max_records
    }

    /// Count one successfully extracted record, returning the new total.
    pub fn record_extracted(&self) -> usize {
        let mut inner = self.lock();
        inner.record_count += 1;
        inner.record_count
    }

    pub fn record_count(&self) -> usize {
        self.lock().record_count
    }

    pub fn categories_seen(&self) -> usize {
        self.lock().seen_categories.len()
    }

    pub fn records_seen(&self) -> usize {
        self.lock().seen_records.len()
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }
}
