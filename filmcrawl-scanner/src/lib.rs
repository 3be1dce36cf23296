pub mod category;
pub mod crawler;
pub mod enrich;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod infobox;
pub mod pipeline;
pub mod record;
pub mod state;
pub mod text;

pub use crawler::{Crawler, CrawlerConfig, ProgressCallback, RecordCallback};
pub use error::ScanError;
pub use record::FilmRecord;
