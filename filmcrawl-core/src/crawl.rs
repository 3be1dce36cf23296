use chrono::Local;
use filmcrawl_scanner::enrich::Endpoints;
use filmcrawl_scanner::{Crawler, CrawlerConfig, FilmRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub start_url: String,
    /// Articles to extract directly. When non-empty the category tree is not walked.
    pub article_urls: Vec<String>,
    pub max_films: usize,
    pub enrich: bool,
    pub threads: usize,
    pub timeout_secs: u64,
    pub endpoints: Endpoints,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        let config = CrawlerConfig::default();
        Self {
            start_url: config.start_url,
            article_urls: Vec::new(),
            max_films: config.max_records,
            enrich: config.enrich,
            threads: 8,
            timeout_secs: config.timeout_secs,
            endpoints: config.endpoints,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for receiving each finished record as soon as it is complete
pub type CrawlRecordCallback = Arc<dyn Fn(FilmRecord) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the finished records in completion order
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
    record_callback: Option<CrawlRecordCallback>,
) -> Result<Vec<FilmRecord>, String> {
    let CrawlOptions {
        start_url,
        article_urls,
        max_films,
        enrich,
        threads,
        timeout_secs,
        endpoints,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| format!("Invalid progress template: {}", e))?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let film_count = Arc::new(AtomicUsize::new(0));

    let internal_progress_callback: filmcrawl_scanner::ProgressCallback = match progress_bar {
        Some(ref pb) => {
            let pb_clone = pb.clone();
            let processed = processed_count.clone();
            let films = film_count.clone();
            Arc::new(move |_worker_id: usize, url: String| {
                let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
                pb_clone.set_message(format!(
                    "Crawling... {} pages, {} films | {}",
                    count,
                    films.load(Ordering::Relaxed),
                    extract_url_path(&url)
                ));
            })
        }
        None => {
            let processed = processed_count.clone();
            Arc::new(move |_worker_id: usize, _url: String| {
                processed.fetch_add(1, Ordering::Relaxed);
            })
        }
    };

    let films = film_count.clone();
    let internal_record_callback: filmcrawl_scanner::RecordCallback =
        Arc::new(move |record: FilmRecord| {
            films.fetch_add(1, Ordering::Relaxed);
            if let Some(ref cb) = record_callback {
                cb(record);
            }
        });

    let config = CrawlerConfig {
        start_url: start_url.clone(),
        max_records: max_films,
        enrich,
        timeout_secs,
        endpoints,
        ..CrawlerConfig::default()
    };

    let crawler = Crawler::new(config)
        .map_err(|e| format!("Failed to build crawler: {}", e))?
        .with_progress_callback(internal_progress_callback)
        .with_record_callback(internal_record_callback);

    let result = if article_urls.is_empty() {
        if let Some(ref callback) = progress_callback {
            callback(format!("Crawling category tree from {}", start_url));
        }
        crawler.crawl(threads).await
    } else {
        if let Some(ref callback) = progress_callback {
            callback(format!("Extracting {} article(s)", article_urls.len()));
        }
        crawler.crawl_articles(&article_urls, threads).await
    };

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        match result {
            Ok(ref records) => pb.finish_with_message(format!(
                "Crawl complete! {} pages processed, {} films extracted",
                total,
                records.len()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result.map_err(|e| format!("Crawl failed: {}", e))
}

/// Generate a short summary of a finished crawl
pub fn generate_crawl_summary(records: &[FilmRecord]) -> String {
    let mut summary = String::new();
    summary.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    summary.push_str("# Summary:\n");
    summary.push_str(&format!(
        "  Generated: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    summary.push_str(&format!("  Films extracted: {}\n", records.len()));

    summary.push_str(&format!(
        "  With genre: {}\n",
        count_filled(records, |r| r.genre.as_str())
    ));
    summary.push_str(&format!(
        "  With director: {}\n",
        count_filled(records, |r| r.director.as_str())
    ));
    summary.push_str(&format!(
        "  With country: {}\n",
        count_filled(records, |r| r.country.as_str())
    ));
    summary.push_str(&format!(
        "  With year: {}\n",
        count_filled(records, |r| r.year.as_str())
    ));

    if records.iter().any(|r| r.linked_entity_id.is_some()) {
        let with_id = records
            .iter()
            .filter(|r| r.external_id.as_deref().is_some_and(|id| !id.is_empty()))
            .count();
        let rated = records
            .iter()
            .filter(|r| r.external_rating.as_deref().is_some_and(|v| !v.is_empty()))
            .count();
        summary.push_str(&format!("  With IMDb id: {}\n", with_id));
        summary.push_str(&format!("  Rated: {}\n", rated));
    }

    // Films per decade, oldest first
    let mut by_decade: HashMap<String, usize> = HashMap::new();
    for record in records {
        if record.year.len() == 4
            && let Some(prefix) = record.year.get(..3)
        {
            *by_decade.entry(format!("{}0s", prefix)).or_default() += 1;
        }
    }

    if !by_decade.is_empty() {
        summary.push_str("\n## By decade\n");
        let mut decades: Vec<_> = by_decade.into_iter().collect();
        decades.sort();
        for (decade, count) in decades {
            summary.push_str(&format!("  {}: {}\n", decade, count));
        }
    }

    summary.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    summary
}

fn count_filled<F>(records: &[FilmRecord], field: F) -> usize
where
    F: Fn(&FilmRecord) -> &str,
{
    records.iter().filter(|r| !field(r).is_empty()).count()
}
