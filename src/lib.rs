pub mod cache;
pub mod checker;
pub mod config;
pub mod logging;
pub mod models;
pub mod plugins;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use cache::PriceCache;
pub use checker::{PriceChecker, ProductOutcome, RunContext, RunSummary};
pub use config::{AppConfig, Settings};
pub use models::{Product, ProductCatalog, Site};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
