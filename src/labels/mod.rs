//! Shipping label pipeline
//!
//! For one supply: enrich cached orders with product data and stickers, group them by
//! article, render one PDF per article and pack the PDFs into a zip archive.
//!
//! - [`enrich`]: product/sticker fetching into the cache
//! - [`grouping`]: orders → article groups
//! - [`sticker`]: base64 sticker payload → PNG file
//! - [`barcode`], [`font`], [`render`]: PDF generation
//! - [`package`]: workspace layout, zip archive, cleanup
//! - [`pipeline`]: the whole run

pub mod barcode;
pub mod enrich;
pub mod font;
pub mod grouping;
pub mod package;
pub mod pipeline;
pub mod render;
pub mod sticker;

use serde::Serialize;
use thiserror::Error;

pub use enrich::enrich_supply;
pub use font::LabelFont;
pub use grouping::{distinct_articles, group_orders_by_article, GroupedOrders};
pub use package::{archive_within_limit, cleanup_temp_artifacts, ArtifactsGuard, LabelWorkspace};
pub use pipeline::{build_archive, create_stickers, prepare_labels, PreparedLabels};

/// Outcome of a label run, by article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StickerReport {
    pub successfully: Vec<String>,
    pub failed: Vec<String>,
}

impl StickerReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Message listing the articles that got no PDF, for the user.
    pub fn failure_message(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        Some(format!(
            "Не удалось создать стикеры для артикулов:\n{}",
            self.failed.join("\n")
        ))
    }
}

/// Why a single article got no PDF.
///
/// These never abort a run: the article is recorded as failed and the next one is processed.
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("product has no barcode")]
    MissingBarcode,

    #[error("product has no name")]
    MissingName,

    #[error("barcode cannot be encoded: {0}")]
    Barcode(String),

    #[error("sticker image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_lists_articles() {
        let report = StickerReport {
            successfully: vec!["A1".into()],
            failed: vec!["A2".into(), "A3".into()],
        };
        assert!(report.has_failures());
        assert_eq!(
            report.failure_message().as_deref(),
            Some("Не удалось создать стикеры для артикулов:\nA2\nA3")
        );
        assert_eq!(StickerReport::default().failure_message(), None);
    }
}
