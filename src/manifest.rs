//! # Manifest Generator
//!
//! Dopo il transcoding scansiona la directory di *output* e costruisce
//! `manifest.json`, l'indice dei formati disponibili per ogni immagine.
//!
//! ## Struttura:
//! ```json
//! {
//!   "generated": "2024-05-01T10:00:00.000Z",
//!   "breakpoints": { "mobile": 640, "tablet": 768, "desktop": 1024, "large": 1280, "xlarge": 1920 },
//!   "qualitySettings": { "avatar": { "webp": 85, "avif": 80, "jpeg": 90 } },
//!   "images": {
//!     "project/demo": { "avif": "project/demo.avif", "jpg": "project/demo-optimized.jpg", "webp": "project/demo.webp" },
//!     "project/demo-mobile": { "avif": "project/demo-mobile.avif", "webp": "project/demo-mobile.webp" }
//!   }
//! }
//! ```
//!
//! ## Regole:
//! - Solo file `.webp`, `.avif`, `.jpg` partecipano
//! - Chiave = directory relativa (con `/`) + nome senza estensione; il
//!   fallback `-optimized.jpg` confluisce nella voce dell'immagine a piena
//!   risoluzione
//! - Voci e formati sono ordinati: due scansioni dello stesso albero danno
//!   lo stesso contenuto a parte `generated`
//! - Il manifest viene sempre riscritto da zero

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{Breakpoint, BreakpointMap, Config, QualitySettings};
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::transcoder::JPEG_FALLBACK_SUFFIX;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Extensions indexed by the manifest
const MANIFEST_EXTENSIONS: &[&str] = &["webp", "avif", "jpg"];

/// Logical image name → format extension → relative output path
pub type ImageIndex = BTreeMap<String, BTreeMap<String, String>>;

/// JSON index of every generated variant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generated: String,
    #[serde(serialize_with = "serialize_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,
    pub quality_settings: QualitySettings,
    pub images: ImageIndex,
}

fn serialize_breakpoints<S: Serializer>(
    breakpoints: &[Breakpoint],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    BreakpointMap(breakpoints).serialize(serializer)
}

impl Manifest {
    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, OptimizeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `manifest.json` into `output_dir`, replacing any previous one
    pub async fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(MANIFEST_FILE_NAME);
        tokio::fs::write(&path, self.to_json()?).await?;
        Ok(path)
    }
}

/// Builds manifests by rescanning an output tree
pub struct ManifestGenerator;

impl ManifestGenerator {
    /// Scan `output_dir` and build a fresh manifest
    pub fn generate(output_dir: &Path, config: &Config) -> Result<Manifest> {
        Ok(Manifest {
            generated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            breakpoints: config.breakpoints.clone(),
            quality_settings: config.quality.clone(),
            images: Self::scan(output_dir)?,
        })
    }

    /// Generate and write the manifest, returning its path
    pub async fn generate_and_write(output_dir: &Path, config: &Config) -> Result<PathBuf> {
        let manifest = Self::generate(output_dir, config)?;
        let path = manifest.write(output_dir).await?;
        info!("📋 Generated image manifest ({} entries)", manifest.images.len());
        Ok(path)
    }

    /// Index every variant file below `output_dir`
    pub fn scan(output_dir: &Path) -> Result<ImageIndex> {
        let mut images = ImageIndex::new();

        for entry in WalkDir::new(output_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("⚠️ Skipping unreadable output entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(ext) = FileManager::extension(entry.path()) else {
                continue;
            };
            if !MANIFEST_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }

            let relative = entry.path().strip_prefix(output_dir)?;
            let (key, value) = Self::entry_for(relative, &ext);
            debug!("Manifest entry {} [{}] -> {}", key, ext, value);
            images.entry(key).or_default().insert(ext, value);
        }

        Ok(images)
    }

    /// Manifest key and value for a variant path relative to the output root
    fn entry_for(relative: &Path, ext: &str) -> (String, String) {
        let stem = relative
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let logical = if ext == "jpg" {
            stem.strip_suffix(JPEG_FALLBACK_SUFFIX).unwrap_or(stem.as_str()).to_string()
        } else {
            stem
        };

        let key = match relative.parent().map(Self::forward_slashes) {
            Some(dir) if !dir.is_empty() => format!("{}/{}", dir, logical),
            _ => logical,
        };

        (key, Self::forward_slashes(relative))
    }

    fn forward_slashes(path: &Path) -> String {
        path.components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
