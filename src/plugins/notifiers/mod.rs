// Notifier plugin implementations
pub mod slack;

pub use slack::{SlackConfig, SlackNotifier};
