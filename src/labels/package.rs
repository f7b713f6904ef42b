//! Label workspace layout, archive packing and cleanup
//!
//! ```text
//! <root>/stickers/<order_id>.png
//! <root>/Stickers for <supply_id>/<article>.pdf
//! <root>/Stickers for <supply_id>.zip
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::config;
use crate::core::error::AppResult;
use crate::core::types::Order;
use crate::core::utils::sanitize_file_name;

const STICKERS_DIR: &str = "stickers";
const SUPPLY_PREFIX: &str = "Stickers for ";

/// Directory tree a label run writes into.
#[derive(Debug, Clone)]
pub struct LabelWorkspace {
    root: PathBuf,
    font_path: PathBuf,
}

impl LabelWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            font_path: PathBuf::from(config::FONT_PATH.as_str()),
        }
    }

    /// Workspace under `LABELS_DIR` using `FONT_PATH`.
    pub fn from_config() -> Self {
        Self::new(config::LABELS_DIR.as_str())
    }

    #[must_use]
    pub fn with_font_path(mut self, font_path: impl Into<PathBuf>) -> Self {
        self.font_path = font_path.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }

    pub fn stickers_dir(&self) -> PathBuf {
        self.root.join(STICKERS_DIR)
    }

    pub fn sticker_path(&self, order: &Order) -> PathBuf {
        self.stickers_dir().join(order.sticker_file_name())
    }

    pub fn supply_dir(&self, supply_id: &str) -> PathBuf {
        self.root.join(format!("{}{}", SUPPLY_PREFIX, sanitize_file_name(supply_id)))
    }

    pub fn archive_path(&self, supply_id: &str) -> PathBuf {
        self.root.join(format!("{}{}.zip", SUPPLY_PREFIX, sanitize_file_name(supply_id)))
    }
}

/// Packs the regular files of `dir` (no recursion) into a deflated zip at `archive`.
///
/// Entries are stored at the archive root and added in name order.
pub fn zip_directory(dir: &Path, archive: &Path) -> AppResult<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut writer = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non UTF-8 file name {:?}", path);
            continue;
        };
        writer.start_file(name, options)?;
        let mut reader = BufReader::new(File::open(path)?);
        io::copy(&mut reader, &mut writer)?;
    }

    writer.finish()?;
    log::info!("Packed {} files into {}", files.len(), archive.display());
    Ok(archive.to_path_buf())
}

/// True when `archive` is no larger than `limit` bytes.
pub fn archive_within_limit(archive: &Path, limit: u64) -> AppResult<bool> {
    Ok(fs::metadata(archive)?.len() <= limit)
}

/// Removes everything a label run leaves behind in `workspace`.
///
/// Safe to call any number of times, missing artifacts are skipped.
pub fn cleanup_temp_artifacts(workspace: &LabelWorkspace) -> AppResult<()> {
    let entries = match fs::read_dir(workspace.root()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let file_type = entry.file_type()?;

        let result = if file_type.is_dir() && (name == STICKERS_DIR || name.starts_with(SUPPLY_PREFIX)) {
            fs::remove_dir_all(entry.path())
        } else if file_type.is_file() && name.starts_with(SUPPLY_PREFIX) && name.ends_with(".zip") {
            fs::remove_file(entry.path())
        } else {
            continue;
        };

        match result {
            Ok(()) => log::debug!("Removed {}", entry.path().display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Runs [`cleanup_temp_artifacts`] when dropped unless [`ArtifactsGuard::finish`] already did.
pub struct ArtifactsGuard<'a> {
    workspace: &'a LabelWorkspace,
    done: bool,
}

impl<'a> ArtifactsGuard<'a> {
    pub fn new(workspace: &'a LabelWorkspace) -> Self {
        Self { workspace, done: false }
    }

    pub fn finish(mut self) -> AppResult<()> {
        self.done = true;
        cleanup_temp_artifacts(self.workspace)
    }
}

impl Drop for ArtifactsGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = cleanup_temp_artifacts(self.workspace) {
            log::error!("Failed to clean label artifacts in {}: {}", self.workspace.root().display(), e);
        }
    }
}
