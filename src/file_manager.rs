//! # File Management Module
//!
//! Questo modulo raccoglie le operazioni sui file condivise dagli altri moduli.
//!
//! ## Responsabilità:
//! - Determinazione formato file dall'estensione (case-insensitive)
//! - Dimensione dei file generati per le statistiche
//! - Pulizia della directory di output (`--clean`)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati sorgente supportati:
//! - **Immagini**: JPG, JPEG, PNG, WebP
//!
//! ## Esempio:
//! ```rust,ignore
//! if FileManager::is_supported_image(&path) {
//!     // transcode
//! }
//! ```

use anyhow::Result;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Source image extensions, lowercase and without the dot
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Manages file operations
pub struct FileManager;

impl FileManager {
    /// Lowercase extension of a path, if any
    pub fn extension(path: &Path) -> Option<String> {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Check if a file is a supported source image
    pub fn is_supported_image(path: &Path) -> bool {
        match Self::extension(path) {
            Some(ext) => SUPPORTED_EXTENSIONS.contains(&ext.as_str()),
            None => false,
        }
    }

    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Remove a previously generated output tree.
    ///
    /// Refuses to delete a directory that contains the source root.
    pub async fn clean_output_dir(output_dir: &Path, source_dir: &Path) -> Result<()> {
        if source_dir.starts_with(output_dir) {
            return Err(anyhow::anyhow!(
                "Refusing to clean {}: it contains the source directory",
                output_dir.display()
            ));
        }

        if fs::try_exists(output_dir).await? {
            fs::remove_dir_all(output_dir).await?;
            info!("🧹 Removed previous output: {}", output_dir.display());
        }
        Ok(())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
