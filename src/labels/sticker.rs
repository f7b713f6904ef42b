use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::package::LabelWorkspace;
use crate::core::error::{AppError, AppResult};
use crate::core::types::Order;

/// Decodes a vendor sticker payload.
///
/// Standard alphabet with canonical padding, anything else is rejected.
pub fn decode_sticker(order_id: i64, payload: &str) -> AppResult<Vec<u8>> {
    STANDARD
        .decode(payload)
        .map_err(|source| AppError::StickerDecode { order_id, source })
}

/// Writes the order's sticker to `stickers/<order_id>.png`, replacing an older file.
pub fn save_sticker_png(workspace: &LabelWorkspace, order: &Order) -> AppResult<PathBuf> {
    let payload = order.sticker.as_deref().ok_or(AppError::MissingSticker(order.id))?;
    let bytes = decode_sticker(order.id, payload)?;

    fs::create_dir_all(workspace.stickers_dir())?;
    let path = workspace.sticker_path(order);
    fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order_with(sticker: Option<&str>) -> Order {
        Order {
            id: 101,
            article: "A1".into(),
            created_at: Utc::now(),
            supply_id: None,
            sticker: sticker.map(str::to_string),
        }
    }

    #[test]
    fn test_sticker_bytes_survive_encoding() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = STANDARD.encode(&bytes);
        assert_eq!(decode_sticker(1, &encoded).unwrap(), bytes);
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        assert!(matches!(
            decode_sticker(7, "not base64!"),
            Err(AppError::StickerDecode { order_id: 7, .. })
        ));
        // Missing padding
        assert!(decode_sticker(7, "YWJj ZA").is_err());
        assert!(decode_sticker(7, "YWJjZA").is_err());
    }

    #[test]
    fn test_save_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = LabelWorkspace::new(dir.path());

        let first = save_sticker_png(&workspace, &order_with(Some(&STANDARD.encode(b"old")))).unwrap();
        let second = save_sticker_png(&workspace, &order_with(Some(&STANDARD.encode(b"new")))).unwrap();

        assert_eq!(first, dir.path().join("stickers").join("101.png"));
        assert_eq!(first, second);
        assert_eq!(fs::read(second).unwrap(), b"new");
    }

    #[test]
    fn test_missing_sticker_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = LabelWorkspace::new(dir.path());
        assert!(matches!(
            save_sticker_png(&workspace, &order_with(None)),
            Err(AppError::MissingSticker(101))
        ));
    }
}
