// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_urls_from_file, load_urls_from_source, open_database, parse_toggle, parse_url_line,
    write_records,
};

// Re-export crawl functionality from filmcrawl-core
pub use filmcrawl_core::crawl::{
    CrawlOptions, CrawlProgressCallback, CrawlRecordCallback, execute_crawl, extract_url_path,
    generate_crawl_summary,
};
