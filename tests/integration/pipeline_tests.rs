use super::*;
use price_check::{AppError, PriceChecker, RunSummary};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_first_run_caches_without_notifying() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_settings();
    fixture.write_catalog(None, &[("Espresso Machine", "/p/1")]);
    fixture.mount_page("/p/1", product_page("249.00")).await;
    fixture.mount_webhook(200).await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let summary = checker.run().await?;

    assert_eq!(summary.prices_found, 1);
    assert_eq!(summary.prices_changed, 0);
    assert_eq!(fixture.read_cache(), json!({ fixture.url("/p/1"): 249.0 }));
    assert!(fixture.webhook_messages().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unchanged_price_is_rewritten_silently() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_settings();
    fixture.write_catalog(None, &[("Espresso Machine", "/p/1")]);
    fixture.write_cache(json!({ fixture.url("/p/1"): 19.99 }));
    fixture.mount_page("/p/1", product_page("19.99")).await;
    fixture.mount_webhook(200).await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let summary = checker.run().await?;

    assert_eq!(summary.prices_found, 1);
    assert_eq!(summary.prices_changed, 0);
    assert_eq!(fixture.read_cache(), json!({ fixture.url("/p/1"): 19.99 }));
    assert!(fixture.webhook_messages().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_price_leaves_cache_unchanged() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_settings();
    fixture.write_catalog(None, &[("Sold Out", "/p/1")]);
    fixture.write_cache(json!({ fixture.url("/p/1"): 12.0 }));
    fixture
        .mount_page("/p/1", "<html><body>Currently unavailable</body></html>".to_string())
        .await;
    fixture.mount_webhook(200).await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let summary = checker.run().await?;

    assert_eq!(summary.products_checked, 1);
    assert_eq!(summary.prices_found, 0);
    assert_eq!(fixture.read_cache(), json!({ fixture.url("/p/1"): 12.0 }));
    assert!(fixture.webhook_messages().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unparsable_price_leaves_cache_unchanged() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_settings();
    fixture.write_catalog(None, &[("Odd Listing", "/p/1")]);
    fixture.mount_page("/p/1", product_page("1.2.3")).await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let summary = checker.run().await?;

    assert_eq!(summary.prices_found, 0);
    assert_eq!(fixture.read_cache(), json!({}));
    Ok(())
}

#[tokio::test]
async fn test_products_keyed_by_url_across_sites() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_settings();
    fixture.write_raw_catalog(json!({
        "sites": [
            {
                "regex": PRICE_REGEX,
                "products": [
                    {"name": "Grinder", "url": fixture.url("/a/grinder")},
                    {"name": "Kettle", "url": fixture.url("/a/kettle")}
                ]
            },
            {
                "regex": "data-price=\"([0-9.]+)\"",
                "products": [
                    {"name": "Scale", "url": fixture.url("/b/scale")}
                ]
            }
        ]
    }));
    fixture.mount_page("/a/grinder", product_page("89.00")).await;
    fixture.mount_page("/a/kettle", product_page("45.50")).await;
    fixture
        .mount_page("/b/scale", "<div data-price=\"32.95\">Scale</div>".to_string())
        .await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let summary = checker.run().await?;

    assert_eq!(summary.sites_checked, 2);
    assert_eq!(summary.products_checked, 3);
    assert_eq!(
        fixture.read_cache(),
        json!({
            fixture.url("/a/grinder"): 89.0,
            fixture.url("/a/kettle"): 45.5,
            fixture.url("/b/scale"): 32.95
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_site_user_agent_is_sent() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_catalog(Some("Mozilla/5.0 (PriceCheck)"), &[("Grinder", "/p/1")]);
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .and(header("user-agent", "Mozilla/5.0 (PriceCheck)"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("10.00")))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let summary = checker.run().await?;

    assert_eq!(summary.prices_found, 1);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_aborts_without_saving() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_settings();
    fixture.write_raw_catalog(json!({
        "sites": [{
            "regex": PRICE_REGEX,
            "products": [
                {"name": "Reachable", "url": fixture.url("/p/1")},
                {"name": "Unreachable", "url": "http://127.0.0.1:1/p/2"}
            ]
        }]
    }));
    fixture.write_cache(json!({ fixture.url("/p/1"): 5.0 }));
    let before = std::fs::read_to_string(fixture.cache_path())?;
    fixture.mount_page("/p/1", product_page("6.00")).await;
    fixture.mount_webhook(200).await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let result = checker.run().await;

    assert!(matches!(result, Err(AppError::Http(_))));
    assert_eq!(std::fs::read_to_string(fixture.cache_path())?, before);
    Ok(())
}

#[tokio::test]
async fn test_missing_files_mean_empty_run() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;

    let mut checker = PriceChecker::from_config(&fixture.config())?;
    let summary = checker.run().await?;

    assert_eq!(summary, RunSummary::default());
    assert_eq!(fixture.read_cache(), json!({}));
    Ok(())
}

#[tokio::test]
async fn test_malformed_cache_is_rejected() {
    let fixture = Fixture::start().await;
    std::fs::write(fixture.cache_path(), "{\"broken\": ").unwrap();

    let result = PriceChecker::from_config(&fixture.config());
    assert!(matches!(result, Err(AppError::FileFormat { .. })));
}

#[tokio::test]
async fn test_malformed_catalog_is_rejected() {
    let fixture = Fixture::start().await;
    fixture.write_raw_catalog(json!({"sites": [{"products": []}]}));

    let result = PriceChecker::from_config(&fixture.config());
    assert!(matches!(result, Err(AppError::FileFormat { .. })));
}

#[tokio::test]
async fn test_second_run_sees_first_run_cache() -> anyhow::Result<()> {
    let fixture = Fixture::start().await;
    fixture.write_settings();
    fixture.write_catalog(None, &[("Grinder", "/p/1")]);
    fixture.mount_page("/p/1", product_page("89.00")).await;
    fixture.mount_webhook(200).await;

    let first = PriceChecker::from_config(&fixture.config())?.run().await?;
    let second = PriceChecker::from_config(&fixture.config())?.run().await?;

    assert_eq!(first.prices_found, 1);
    assert_eq!(second.prices_found, 1);
    assert_eq!(second.prices_changed, 0);
    assert!(fixture.webhook_messages().await.is_empty());
    Ok(())
}
