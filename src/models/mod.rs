pub mod catalog;

// Re-exports for convenience
pub use catalog::*;
