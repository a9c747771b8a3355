pub mod traits;
pub mod trackers;
pub mod notifiers;

pub use traits::Notifier;
pub use trackers::PriceTracker;
pub use notifiers::SlackNotifier;
