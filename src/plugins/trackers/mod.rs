// Tracker implementations
pub mod price;

pub use price::{ChangeType, CurrencyFormat, PriceChange, PriceMatch, PriceTracker};
