use crate::api::Marketplace;
use crate::core::error::AppResult;
use crate::core::types::Product;
use crate::labels::grouping::distinct_articles;
use crate::storage::{db, get_connection, DbPool};

/// What [`enrich_supply`] wrote into the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub products_fetched: usize,
    pub stickers_stored: usize,
}

/// Fills in product data and stickers for the cached orders of a supply.
///
/// Products that already have both name and barcode are not fetched again. Stickers are
/// requested in a single call covering every order of the supply. Any vendor error aborts
/// the enrichment.
pub async fn enrich_supply(pool: &DbPool, api: &dyn Marketplace, supply_id: &str) -> AppResult<EnrichmentStats> {
    let (order_ids, stale_articles) = {
        let conn = get_connection(pool)?;
        let orders = db::get_orders_for_supply(&conn, supply_id)?;

        let mut stale = Vec::new();
        for article in distinct_articles(&orders) {
            let enriched = db::get_product(&conn, &article)?
                .map(|product| product.is_enriched())
                .unwrap_or(false);
            if !enriched {
                stale.push(article);
            }
        }
        (orders.iter().map(|o| o.id).collect::<Vec<_>>(), stale)
    };

    let mut products: Vec<Product> = Vec::with_capacity(stale_articles.len());
    for article in &stale_articles {
        let product = api.fetch_product(article).await?;
        if !product.is_enriched() {
            log::warn!("Vendor card for article {} is incomplete", article);
        }
        products.push(product);
    }

    if !products.is_empty() {
        let conn = get_connection(pool)?;
        db::set_products_name_and_barcode(&conn, &products)?;
    }

    let mut stickers_stored = 0;
    if !order_ids.is_empty() {
        let stickers = api.fetch_stickers(&order_ids).await?;
        let conn = get_connection(pool)?;
        stickers_stored = db::add_stickers_to_orders(&conn, &stickers)?;
    }

    log::info!(
        "Supply {}: {} products fetched, {} stickers stored for {} orders",
        supply_id,
        products.len(),
        stickers_stored,
        order_ids.len()
    );

    Ok(EnrichmentStats {
        products_fetched: products.len(),
        stickers_stored,
    })
}
