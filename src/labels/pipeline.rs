use std::fs;
use std::path::PathBuf;

use super::enrich::enrich_supply;
use super::font::LabelFont;
use super::grouping::{group_orders_by_article, GroupedOrders};
use super::package::{zip_directory, LabelWorkspace};
use super::render::render_article_pdf;
use super::sticker::save_sticker_png;
use super::StickerReport;
use crate::api::Marketplace;
use crate::core::error::{AppError, AppResult};
use crate::core::types::Product;
use crate::core::utils::FileNamer;
use crate::storage::{db, get_connection, DbConnection, DbPool};

/// Result of a label run: the archive to send plus the per-article outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLabels {
    pub archive_path: PathBuf,
    pub report: StickerReport,
}

/// Builds the label archive of a supply from its cached orders.
///
/// Vendor failures during enrichment abort the run. Articles that cannot be rendered are
/// listed in `report.failed` and have no PDF in the archive. A supply without orders
/// yields an empty archive. Rendering and packing run on the blocking thread pool.
pub async fn prepare_labels(
    pool: &DbPool,
    api: &dyn Marketplace,
    workspace: &LabelWorkspace,
    supply_id: &str,
) -> AppResult<PreparedLabels> {
    log::info!("Preparing labels for supply {}", supply_id);
    enrich_supply(pool, api, supply_id).await?;

    let pool = pool.clone();
    let workspace = workspace.clone();
    let supply_id = supply_id.to_string();
    tokio::task::spawn_blocking(move || build_archive(&pool, &workspace, &supply_id))
        .await
        .map_err(|e| AppError::Task(format!("label build join error: {}", e)))?
}

/// Renders the cached orders of an enriched supply and packs them. Blocking.
pub fn build_archive(pool: &DbPool, workspace: &LabelWorkspace, supply_id: &str) -> AppResult<PreparedLabels> {
    let conn = get_connection(pool)?;
    let grouped = group_orders_by_article(db::get_orders_for_supply(&conn, supply_id)?);
    let font = LabelFont::load_or_builtin(workspace.font_path());

    let report = create_stickers(&conn, workspace, supply_id, &grouped, &font)?;
    let archive_path = zip_directory(&workspace.supply_dir(supply_id), &workspace.archive_path(supply_id))?;

    log::info!(
        "Supply {}: {} articles rendered, {} failed",
        supply_id,
        report.successfully.len(),
        report.failed.len()
    );
    Ok(PreparedLabels { archive_path, report })
}

/// Writes one PDF per article into the supply directory, starting from an empty directory.
///
/// Sticker files that are missing or undecodable abort the run; everything wrong with the
/// product itself only fails that article.
pub fn create_stickers(
    conn: &DbConnection,
    workspace: &LabelWorkspace,
    supply_id: &str,
    grouped: &GroupedOrders,
    font: &LabelFont,
) -> AppResult<StickerReport> {
    let supply_dir = workspace.supply_dir(supply_id);
    if supply_dir.exists() {
        fs::remove_dir_all(&supply_dir)?;
    }
    fs::create_dir_all(&supply_dir)?;

    let mut namer = FileNamer::reserving(grouped.keys().map(String::as_str));
    let mut report = StickerReport::default();

    for (article, orders) in grouped {
        let product = db::get_product(conn, article)?.unwrap_or_else(|| Product::placeholder(article.as_str()));

        let mut stickers = Vec::with_capacity(orders.len());
        for order in orders {
            stickers.push(save_sticker_png(workspace, order)?);
        }

        let out = supply_dir.join(format!("{}.pdf", namer.name_for(article)));
        match render_article_pdf(&stickers, &product, font, &out) {
            Ok(pages) => {
                log::debug!("Article {}: {} pages written to {}", article, pages, out.display());
                report.successfully.push(article.clone());
            }
            Err(e) => {
                log::warn!("Article {} skipped: {}", article, e);
                if out.exists() {
                    fs::remove_file(&out)?;
                }
                report.failed.push(article.clone());
            }
        }
    }

    Ok(report)
}
