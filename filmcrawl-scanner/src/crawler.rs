use crate::category::DEFAULT_START_URL;
use crate::enrich::Endpoints;
use crate::error::{Result, ScanError};
use crate::fetch::{DEFAULT_USER_AGENT, Fetcher};
use crate::frontier::{Frontier, FrontierItem};
use crate::pipeline::Pipeline;
use crate::record::FilmRecord;
use crate::state::CrawlState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;
pub type RecordCallback = Arc<dyn Fn(FilmRecord) + Send + Sync>;

const IDLE_BACKOFF: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub start_url: String,
    pub max_records: usize,
    pub enrich: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub endpoints: Endpoints,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            max_records: 200,
            enrich: false,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

pub struct Crawler {
    start_url: String,
    pipeline: Arc<Pipeline>,
    state: Arc<CrawlState>,
    records: Arc<Mutex<Vec<FilmRecord>>>,
    progress_callback: Option<ProgressCallback>,
    record_callback: Option<RecordCallback>,
}

impl Crawler {
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config.timeout_secs, &config.user_agent)?;
        let state = Arc::new(CrawlState::new(config.max_records));
        let pipeline = Pipeline::new(fetcher, state.clone(), config.endpoints, config.enrich);

        Ok(Self {
            start_url: config.start_url,
            pipeline: Arc::new(pipeline),
            state,
            records: Arc::new(Mutex::new(Vec::new())),
            progress_callback: None,
            record_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Called once for every finished record, as soon as it is complete.
    pub fn with_record_callback(mut self, callback: RecordCallback) -> Self {
        self.record_callback = Some(callback);
        self
    }

    /// Walk the category tree from the configured start URL.
    pub async fn crawl(&self, workers: usize) -> Result<Vec<FilmRecord>> {
        let start_url = canonical_url(&self.start_url)?;
        info!("Starting crawl of {} with {} workers", start_url, workers);

        self.state.claim_category(&start_url);
        self.run(vec![FrontierItem::Category { url: start_url }], workers)
            .await
    }

    /// Extract the given articles directly, skipping category traversal.
    pub async fn crawl_articles(&self, urls: &[String], workers: usize) -> Result<Vec<FilmRecord>> {
        info!("Extracting {} articles with {} workers", urls.len(), workers);

        let mut seeds = Vec::new();
        for url in urls {
            let url = canonical_url(url)?;
            if self.state.claim_record(&url) {
                seeds.push(FrontierItem::Article {
                    url,
                    link_text: String::new(),
                });
            }
        }
        self.run(seeds, workers).await
    }

    async fn run(&self, seeds: Vec<FrontierItem>, workers: usize) -> Result<Vec<FilmRecord>> {
        let workers = workers.max(1);
        let frontier = Arc::new(Frontier::new(workers));
        for seed in seeds {
            frontier.push(seed).await;
        }

        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let frontier = frontier.clone();
            let pipeline = self.pipeline.clone();
            let records = self.records.clone();
            let progress_cb = self.progress_callback.clone();
            let record_cb = self.record_callback.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);

                loop {
                    let Some(item) = frontier.pop(worker_id).await else {
                        if frontier.is_drained().await {
                            break;
                        }
                        tokio::time::sleep(IDLE_BACKOFF).await;
                        continue;
                    };

                    let url = item.url(pipeline.endpoints());
                    debug!("Worker {} took {} {}", worker_id, item.kind(), url);
                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, url);
                    }

                    let outcome = pipeline.process(item).await;

                    for record in outcome.emitted {
                        records.lock().await.push(record.clone());
                        if let Some(ref callback) = record_cb {
                            callback(record);
                        }
                    }
                    for next in outcome.follow {
                        frontier.push(next).await;
                    }

                    frontier.done();
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        for result in futures::future::join_all(worker_handles).await {
            result?;
        }

        let records = self.records.lock().await;
        info!(
            "Crawl complete. {} records from {} categories",
            records.len(),
            self.state.categories_seen()
        );
        Ok(records.clone())
    }

    pub async fn get_records(&self) -> Vec<FilmRecord> {
        self.records.lock().await.clone()
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }
}

fn canonical_url(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw, e)))?;
    url.set_fragment(None);
    Ok(url.to_string())
}
