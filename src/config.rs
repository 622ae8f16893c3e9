//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'ottimizzatore.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con percorsi, breakpoint e qualità
//! - Fornisce i valori di default del sito (breakpoint e tabella qualità)
//! - Valida i parametri prima dell'avvio
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `source_dir`: Directory delle immagini sorgente (default: `public/images`)
//! - `output_dir`: Directory di output (default: `public/images/optimized`)
//! - `breakpoints`: Larghezze responsive, in ordine (mobile=640 ... xlarge=1920)
//! - `quality`: Qualità WebP/AVIF/JPEG per tipo di immagine
//! - `clean_output`: Svuota la directory di output prima di elaborare
//! - `tools_dir`: Directory opzionale con i tool di encoding
//!
//! ## Validazione:
//! - Tutte le qualità devono essere 0-100
//! - Almeno un breakpoint, con nome non vuoto e univoco
//! - Larghezze dei breakpoint > 0
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut config = Config::from_file(&config_path).await?;
//! config.resolve_paths(&project_root);
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::classify::ImageType;

/// A named responsive width threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub name: String,
    pub width: u32,
}

impl Breakpoint {
    pub fn new(name: &str, width: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
        }
    }
}

/// Serializes a breakpoint list as an ordered `{ name: width }` object
pub struct BreakpointMap<'a>(pub &'a [Breakpoint]);

impl Serialize for BreakpointMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for breakpoint in self.0 {
            map.serialize_entry(&breakpoint.name, &breakpoint.width)?;
        }
        map.end()
    }
}

/// Encoder qualities (0-100) for one image type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySetting {
    pub webp: u8,
    pub avif: u8,
    pub jpeg: u8,
}

impl QualitySetting {
    pub const fn new(webp: u8, avif: u8, jpeg: u8) -> Self {
        Self { webp, avif, jpeg }
    }
}

/// Quality table keyed by image type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySettings {
    pub avatar: QualitySetting,
    pub project: QualitySetting,
    pub icon: QualitySetting,
    pub gallery: QualitySetting,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            avatar: QualitySetting::new(85, 80, 90),
            project: QualitySetting::new(80, 75, 85),
            icon: QualitySetting::new(75, 70, 80),
            gallery: QualitySetting::new(85, 80, 90),
        }
    }
}

impl QualitySettings {
    /// Quality used for a given image type
    pub fn for_type(&self, image_type: ImageType) -> QualitySetting {
        match image_type {
            ImageType::Avatar => self.avatar,
            ImageType::Project => self.project,
            ImageType::Icon => self.icon,
            ImageType::Gallery => self.gallery,
        }
    }
}

/// Default responsive breakpoints, smallest first
pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new("mobile", 640),
        Breakpoint::new("tablet", 768),
        Breakpoint::new("desktop", 1024),
        Breakpoint::new("large", 1280),
        Breakpoint::new("xlarge", 1920),
    ]
}

/// Configuration for a batch optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing the source images
    pub source_dir: PathBuf,
    /// Directory receiving the mirrored variant tree and the manifest
    pub output_dir: PathBuf,
    /// Responsive breakpoints, in manifest order
    pub breakpoints: Vec<Breakpoint>,
    /// Per image-type encoder qualities
    pub quality: QualitySettings,
    /// Remove the output directory before processing
    pub clean_output: bool,
    /// Extra directory searched for encoder binaries before PATH
    pub tools_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("public/images"),
            output_dir: PathBuf::from("public/images/optimized"),
            breakpoints: default_breakpoints(),
            quality: QualitySettings::default(),
            clean_output: false,
            tools_dir: None,
        }
    }
}

impl Config {
    /// Default configuration rooted at `root`
    pub fn for_root(root: &Path) -> Self {
        let mut config = Self::default();
        config.resolve_paths(root);
        config
    }

    /// Make relative source/output paths relative to `root`
    pub fn resolve_paths(&mut self, root: &Path) {
        if self.source_dir.is_relative() {
            self.source_dir = root.join(&self.source_dir);
        }
        if self.output_dir.is_relative() {
            self.output_dir = root.join(&self.output_dir);
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        for image_type in ImageType::ALL {
            let quality = self.quality.for_type(image_type);
            for (format, value) in [("webp", quality.webp), ("avif", quality.avif), ("jpeg", quality.jpeg)] {
                if value > 100 {
                    return Err(anyhow::anyhow!(
                        "{} quality for {} images must be between 0 and 100 (got {})",
                        format, image_type, value
                    ));
                }
            }
        }

        if self.breakpoints.is_empty() {
            return Err(anyhow::anyhow!("At least one breakpoint must be configured"));
        }

        let mut seen = HashSet::new();
        for breakpoint in &self.breakpoints {
            if breakpoint.name.trim().is_empty() {
                return Err(anyhow::anyhow!("Breakpoint names must not be empty"));
            }
            if breakpoint.width == 0 {
                return Err(anyhow::anyhow!("Breakpoint '{}' must have a width greater than 0", breakpoint.name));
            }
            if !seen.insert(breakpoint.name.as_str()) {
                return Err(anyhow::anyhow!("Duplicate breakpoint name: {}", breakpoint.name));
            }
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
