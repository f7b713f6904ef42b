//! Test fixtures
//!
//! [`TestEnvironment`] gives every test its own temporary directory holding the SQLite
//! database and the label workspace.

#![allow(dead_code)]

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;
use wbstickers::core::Order;
use wbstickers::labels::LabelWorkspace;
use wbstickers::storage::{create_pool, get_connection, DbPool};
use wbstickers::storage::db;

pub struct TestEnvironment {
    pub dir: TempDir,
    pub pool: DbPool,
    pub workspace: LabelWorkspace,
}

impl TestEnvironment {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy())?;
        let labels = dir.path().join("labels");
        std::fs::create_dir_all(&labels)?;
        // A font path that does not exist forces the built-in font
        let workspace = LabelWorkspace::new(&labels).with_font_path(dir.path().join("missing.ttf"));

        Ok(Self { dir, pool, workspace })
    }

    /// Caches `orders` as belonging to `supply_id`.
    pub fn seed_orders(&self, supply_id: &str, orders: &[Order]) -> anyhow::Result<()> {
        let conn = get_connection(&self.pool)?;
        db::upsert_orders(&conn, Some(supply_id), orders)?;
        Ok(())
    }
}

pub fn order(id: i64, article: &str) -> Order {
    Order {
        id,
        article: article.to_string(),
        created_at: Utc.with_ymd_and_hms(2023, 2, 1, 10, 0, 0).unwrap(),
        supply_id: None,
        sticker: None,
    }
}

/// A small real PNG, base64 encoded like vendor stickers.
pub fn png_base64() -> String {
    let image = RgbaImage::from_fn(16, 10, |x, y| {
        if (x + y) % 3 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    STANDARD.encode(bytes)
}
