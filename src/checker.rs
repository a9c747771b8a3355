use tracing::{debug, error, info, warn};

use crate::cache::PriceCache;
use crate::config::{AppConfig, Settings};
use crate::models::{Product, ProductCatalog, Site};
use crate::plugins::notifiers::SlackNotifier;
use crate::plugins::traits::{Notifier, NotificationEvent};
use crate::plugins::trackers::{ChangeType, CurrencyFormat, PriceMatch, PriceTracker};
use crate::scraper::{PageFetcher, build_client};
use crate::utils::error::Result;

/// Everything a run needs, built once and handed to each step.
pub struct RunContext {
    pub settings: Settings,
    pub cache: PriceCache,
    pub fetcher: PageFetcher,
    pub notifier: Box<dyn Notifier>,
    pub currency: CurrencyFormat,
}

impl RunContext {
    pub fn new(settings: Settings, cache: PriceCache, fetcher: PageFetcher, notifier: Box<dyn Notifier>) -> Self {
        let currency = CurrencyFormat::from_settings(&settings);
        Self {
            settings,
            cache,
            fetcher,
            notifier,
            currency,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductOutcome {
    NotFound,
    FirstSeen { price: f64 },
    Unchanged { price: f64 },
    Changed { old: f64, new: f64, notified: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sites_checked: usize,
    pub products_checked: usize,
    pub prices_found: usize,
    pub prices_changed: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ProductOutcome) {
        self.products_checked += 1;
        match outcome {
            ProductOutcome::NotFound => {}
            ProductOutcome::FirstSeen { .. } | ProductOutcome::Unchanged { .. } => {
                self.prices_found += 1;
            }
            ProductOutcome::Changed { notified, .. } => {
                self.prices_found += 1;
                self.prices_changed += 1;
                if *notified {
                    self.notifications_sent += 1;
                } else {
                    self.notifications_failed += 1;
                }
            }
        }
    }
}

/// Walks every site and product in catalog order, one request at a time.
pub struct PriceChecker {
    catalog: ProductCatalog,
    context: RunContext,
}

impl PriceChecker {
    pub fn new(catalog: ProductCatalog, context: RunContext) -> Self {
        Self { catalog, context }
    }

    /// Reads the settings, product list and cache from the app directory and
    /// wires up the HTTP client and Slack notifier.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let settings = Settings::load(&config.config_path())?;
        let catalog = ProductCatalog::load(&config.product_list_path())?;
        let cache = PriceCache::load(config.cache_path())?;

        let client = build_client(config)?;
        let notifier = SlackNotifier::from_settings(client.clone(), &settings);
        let context = RunContext::new(settings, cache, PageFetcher::new(client), Box::new(notifier));

        info!(
            "Loaded {} sites with {} products, {} cached prices",
            catalog.sites.len(),
            catalog.product_count(),
            context.cache.len()
        );
        Ok(Self::new(catalog, context))
    }

    /// Checks everything, then writes the cache once. Any fetch or pattern error
    /// aborts the run before the cache is written.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for site in &self.catalog.sites {
            check_site(&mut self.context, site, &mut summary).await?;
        }

        self.context.cache.save()?;
        Ok(summary)
    }

    pub fn into_context(self) -> RunContext {
        self.context
    }
}

pub async fn check_site(ctx: &mut RunContext, site: &Site, summary: &mut RunSummary) -> Result<()> {
    let tracker = PriceTracker::new(site.pattern()?);
    let headers = site.headers();

    for product in &site.products {
        debug!("Checking product \"{}\"", product.name);
        let body = ctx.fetcher.fetch(&product.url, &headers).await?;
        let outcome = apply_price(ctx, &tracker, product, tracker.find_price(&body)).await;
        summary.record(&outcome);
    }

    summary.sites_checked += 1;
    Ok(())
}

/// Compare, persist and notify for one product whose page has been scanned.
///
/// The cache entry is overwritten whenever a price was found. A notification is
/// sent only when a previous price existed and differs from the new one;
/// delivery failures are logged and otherwise ignored.
pub async fn apply_price(
    ctx: &mut RunContext,
    tracker: &PriceTracker,
    product: &Product,
    found: PriceMatch,
) -> ProductOutcome {
    let key = product.cache_key();
    let old_price = ctx.cache.get(key);

    // A matching line is enough to report the previous price
    if let Some(old) = old_price.filter(|_| found != PriceMatch::NoMatch) {
        info!("Old price is {}", ctx.currency.format(old));
    }

    let price = match found {
        PriceMatch::Found(price) => price,
        PriceMatch::NoMatch => {
            info!("Could not find price for \"{}\"", product.name);
            return ProductOutcome::NotFound;
        }
        PriceMatch::Unparsable { text } => {
            info!("Could not find price for \"{}\": {:?} is not a number", product.name, text);
            return ProductOutcome::NotFound;
        }
    };

    info!("Price: {}", ctx.currency.format(price));
    ctx.cache.set(key, price);

    let change = match tracker.compare(old_price, price) {
        None => return ProductOutcome::FirstSeen { price },
        Some(change) if !change.changed() => return ProductOutcome::Unchanged { price },
        Some(change) => change,
    };

    let direction = match change.change_type {
        ChangeType::Increased => "up",
        ChangeType::Decreased => "down",
        ChangeType::Unchanged => "unchanged",
    };
    info!("Price has changed ({})", direction);

    let event = NotificationEvent::new(product, change, &ctx.currency);
    let notified = send_notification(ctx.notifier.as_ref(), &event).await;

    ProductOutcome::Changed {
        old: change.old,
        new: change.new,
        notified,
    }
}

async fn send_notification(notifier: &dyn Notifier, event: &NotificationEvent) -> bool {
    match notifier.notify(event).await {
        Ok(result) if result.success => true,
        Ok(result) => {
            warn!(
                "{} rejected message for \"{}\" (status {:?}): {}",
                notifier.name(),
                event.product_name,
                result.status_code,
                result.error.unwrap_or_default()
            );
            false
        }
        Err(e) => {
            error!("Error sending message via {}: {}", notifier.name(), e);
            false
        }
    }
}
