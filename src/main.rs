use anyhow::Result;
use tracing::{error, info};

use price_check::{AppConfig, PriceChecker, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?.resolve_app_dir()?;

    // Initialize tracing
    let _guard = logging::init(&config)?;

    info!("Starting price check in {}", config.app_dir().display());

    let mut checker = PriceChecker::from_config(&config).inspect_err(|e| {
        error!("Could not load run data: {}", e);
    })?;

    match checker.run().await {
        Ok(summary) => {
            info!(
                "Checked {} products on {} sites: {} prices found, {} changed, {} notifications sent, {} failed",
                summary.products_checked,
                summary.sites_checked,
                summary.prices_found,
                summary.prices_changed,
                summary.notifications_sent,
                summary.notifications_failed
            );
            Ok(())
        }
        Err(e) => {
            error!("Price check aborted, cache not saved: {}", e);
            Err(e.into())
        }
    }
}
