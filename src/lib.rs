pub mod cli;
pub mod config;
pub mod crawler;
pub mod error;
pub mod export;
pub mod models;
pub mod record;
pub mod utils;

pub use config::{ChapterWindow, CrawlConfig, OutputMode};
pub use crawler::{ComicCrawler, CrawlReport, Fetcher, HttpFetcher};
pub use error::{ParseError, ScrapeError};
pub use export::{Exporter, TabularExporter, TreeExporter};
pub use models::{Chapter, Comic, Count, Page};
