pub mod notifier;

pub use notifier::{Notifier, NotificationEvent, NotificationResult};

#[cfg(test)]
pub use notifier::MockNotifier;
