//! # Image Transcoder Module
//!
//! Questo modulo produce tutte le varianti di una singola immagine sorgente.
//!
//! ## Pipeline per immagine:
//! 1. Lettura dimensioni originali (solo header, crate `image`); il formato
//!    viene riconosciuto dal contenuto, non dall'estensione
//! 2. Per ogni breakpoint con larghezza < larghezza originale:
//!    WebP ridimensionato + AVIF ridimensionato (best-effort)
//! 3. WebP e AVIF (best-effort) a risoluzione piena
//! 4. JPEG progressivo di fallback a risoluzione piena
//!
//! ## Naming output:
//! - `{base}-{breakpoint}.webp` / `.avif` per le varianti responsive
//! - `{base}.webp` / `{base}.avif` a risoluzione piena
//! - `{base}-optimized.jpg` per il fallback
//!
//! ## Error handling:
//! - Errore AVIF: warning, la variante manca, l'immagine resta valida
//! - Qualsiasi altro errore: l'immagine viene abbandonata (le varianti già
//!   scritte restano su disco), nessun retry
//!
//! Le varianti vengono prodotte una alla volta, in sequenza.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::{Breakpoint, Config, QualitySetting};
use crate::encoder::{EncodeRequest, EncoderBackend, OutputFormat};
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::walker::ImageJob;

/// Suffix of the full-resolution JPEG fallback
pub const JPEG_FALLBACK_SUFFIX: &str = "-optimized";

/// One planned output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    pub file_name: String,
    pub format: OutputFormat,
    pub quality: u8,
    /// `None` for full resolution
    pub width: Option<u32>,
}

impl VariantSpec {
    /// AVIF is never fatal for an image
    pub fn is_best_effort(&self) -> bool {
        self.format == OutputFormat::Avif
    }
}

/// Plan every variant for an image of `original_width` pixels, in encoding order.
///
/// A breakpoint only yields variants when it is strictly narrower than the
/// original, so images are never upscaled.
pub fn plan_variants(
    base_name: &str,
    original_width: u32,
    quality: QualitySetting,
    breakpoints: &[Breakpoint],
) -> Vec<VariantSpec> {
    let mut variants = Vec::new();

    for breakpoint in breakpoints.iter().filter(|b| b.width < original_width) {
        for (format, q) in [(OutputFormat::Webp, quality.webp), (OutputFormat::Avif, quality.avif)] {
            variants.push(VariantSpec {
                file_name: format!("{}-{}.{}", base_name, breakpoint.name, format.extension()),
                format,
                quality: q,
                width: Some(breakpoint.width),
            });
        }
    }

    for (format, q) in [(OutputFormat::Webp, quality.webp), (OutputFormat::Avif, quality.avif)] {
        variants.push(VariantSpec {
            file_name: format!("{}.{}", base_name, format.extension()),
            format,
            quality: q,
            width: None,
        });
    }

    variants.push(VariantSpec {
        file_name: format!("{}{}.{}", base_name, JPEG_FALLBACK_SUFFIX, OutputFormat::Jpeg.extension()),
        format: OutputFormat::Jpeg,
        quality: quality.jpeg,
        width: None,
    });

    variants
}

/// Outcome of transcoding one image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeReport {
    pub original_width: u32,
    pub original_height: u32,
    pub variants_written: Vec<PathBuf>,
    pub avif_skipped: usize,
    pub bytes_written: u64,
}

/// Produces the variant set of single images through an encoder backend
pub struct ImageTranscoder<'a, B: EncoderBackend> {
    backend: &'a B,
    config: &'a Config,
}

impl<'a, B: EncoderBackend> ImageTranscoder<'a, B> {
    pub fn new(backend: &'a B, config: &'a Config) -> Self {
        Self { backend, config }
    }

    /// Transcode one image, logging and swallowing any failure.
    ///
    /// Returns `None` when the image was abandoned.
    pub async fn process(&self, job: &ImageJob) -> Option<TranscodeReport> {
        let name = job.base_name();
        info!("Optimizing: {} ({})", name, job.image_type);

        match self.transcode(job).await {
            Ok(report) => {
                info!("✅ Optimized: {}", name);
                Some(report)
            }
            Err(e) => {
                error!("❌ Failed to optimize {}: {}", job.display_name(), e);
                None
            }
        }
    }

    /// Transcode one image, stopping at the first non-AVIF failure
    pub async fn transcode(&self, job: &ImageJob) -> Result<TranscodeReport, OptimizeError> {
        let (original_width, original_height) = image::io::Reader::open(&job.source_path)?
            .with_guessed_format()?
            .into_dimensions()?;
        debug!(
            "{} is {}x{}",
            job.source_path.display(),
            original_width,
            original_height
        );

        let quality = self.config.quality.for_type(job.image_type);
        let variants = plan_variants(&job.base_name(), original_width, quality, &self.config.breakpoints);

        let mut report = TranscodeReport {
            original_width,
            original_height,
            ..Default::default()
        };

        for variant in variants {
            let request = EncodeRequest {
                input: job.source_path.clone(),
                output: job.output_dir.join(&variant.file_name),
                format: variant.format,
                quality: variant.quality,
                width: variant.width,
            };

            match self.backend.encode(&request).await {
                Ok(()) => {
                    report.bytes_written += Self::written_size(&request.output).await;
                    report.variants_written.push(request.output);
                }
                Err(e) if variant.is_best_effort() => {
                    warn!("⚠️ AVIF not supported for {}, skipping {} ({})", job.base_name(), variant.file_name, e);
                    report.avif_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    async fn written_size(path: &Path) -> u64 {
        FileManager::file_size(path).await.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ImageType;
    use crate::config::default_breakpoints;
    use crate::encoder::testing::RecordingBackend;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    fn job(source: &Path, relative: &str, output_dir: &Path, image_type: ImageType) -> ImageJob {
        ImageJob {
            source_path: source.join(relative),
            relative_path: PathBuf::from(relative),
            output_dir: output_dir.to_path_buf(),
            image_type,
        }
    }

    fn names(variants: &[VariantSpec]) -> Vec<&str> {
        variants.iter().map(|v| v.file_name.as_str()).collect()
    }

    #[test]
    fn test_plan_skips_breakpoints_at_or_above_width() {
        let plan = plan_variants("demo", 1500, QualitySetting::new(80, 75, 85), &default_breakpoints());
        assert_eq!(
            names(&plan),
            vec![
                "demo-mobile.webp", "demo-mobile.avif",
                "demo-tablet.webp", "demo-tablet.avif",
                "demo-desktop.webp", "demo-desktop.avif",
                "demo-large.webp", "demo-large.avif",
                "demo.webp", "demo.avif",
                "demo-optimized.jpg",
            ]
        );
        assert_eq!(plan[0].width, Some(640));
        assert_eq!(plan[0].quality, 80);
        assert_eq!(plan[1].quality, 75);
        assert_eq!(plan[10].quality, 85);
        assert_eq!(plan[10].width, None);
    }

    #[test]
    fn test_plan_small_image_has_no_responsive_variants() {
        let plan = plan_variants("avatar", 300, QualitySetting::new(85, 80, 90), &default_breakpoints());
        assert_eq!(names(&plan), vec!["avatar.webp", "avatar.avif", "avatar-optimized.jpg"]);

        // equal width is not strictly narrower
        let plan = plan_variants("edge", 640, QualitySetting::new(85, 80, 90), &default_breakpoints());
        assert!(plan.iter().all(|v| v.width.is_none()));
    }

    #[tokio::test]
    async fn test_transcode_writes_all_variants() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("images");
        let output = temp_dir.path().join("out/project");
        std::fs::create_dir_all(&output).unwrap();
        write_png(&source.join("project/demo.png"), 1500, 20);

        let backend = RecordingBackend::default();
        let config = Config::default();
        let transcoder = ImageTranscoder::new(&backend, &config);
        let report = transcoder
            .transcode(&job(&source, "project/demo.png", &output, ImageType::Project))
            .await
            .unwrap();

        assert_eq!(report.original_width, 1500);
        assert_eq!(report.variants_written.len(), 11);
        assert_eq!(report.avif_skipped, 0);
        assert!(output.join("demo-large.webp").exists());
        assert!(!output.join("demo-xlarge.webp").exists());
        assert!(output.join("demo-optimized.jpg").exists());

        let requests = backend.requests.lock().unwrap();
        let jpeg = requests.iter().find(|r| r.format == OutputFormat::Jpeg).unwrap();
        assert_eq!(jpeg.quality, 85);
        assert_eq!(jpeg.width, None);
    }

    #[tokio::test]
    async fn test_avif_failure_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");
        std::fs::create_dir_all(&output).unwrap();
        write_png(&temp_dir.path().join("hero.png"), 800, 10);

        let backend = RecordingBackend {
            fail_avif: true,
            ..Default::default()
        };
        let config = Config::default();
        let report = ImageTranscoder::new(&backend, &config)
            .process(&job(temp_dir.path(), "hero.png", &output, ImageType::Gallery))
            .await
            .unwrap();

        // mobile, tablet and full size AVIF all skipped
        assert_eq!(report.avif_skipped, 3);
        assert_eq!(report.variants_written.len(), 4);
        assert!(output.join("hero-optimized.jpg").exists());
        assert!(!output.join("hero.avif").exists());
    }

    #[tokio::test]
    async fn test_corrupt_image_is_abandoned() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");
        std::fs::create_dir_all(&output).unwrap();
        std::fs::write(temp_dir.path().join("broken.jpg"), b"not really a jpeg").unwrap();

        let backend = RecordingBackend::default();
        let config = Config::default();
        let transcoder = ImageTranscoder::new(&backend, &config);
        let broken = job(temp_dir.path(), "broken.jpg", &output, ImageType::Gallery);

        assert!(matches!(transcoder.transcode(&broken).await, Err(OptimizeError::Image(_))));
        assert!(transcoder.process(&broken).await.is_none());
        assert!(backend.outputs().is_empty());
    }

    #[tokio::test]
    async fn test_format_detected_from_content() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");
        std::fs::create_dir_all(&output).unwrap();
        // PNG bytes behind a .jpg name
        image::RgbImage::new(700, 10)
            .save_with_format(temp_dir.path().join("photo.jpg"), image::ImageFormat::Png)
            .unwrap();

        let backend = RecordingBackend::default();
        let config = Config::default();
        let report = ImageTranscoder::new(&backend, &config)
            .process(&job(temp_dir.path(), "photo.jpg", &output, ImageType::Avatar))
            .await
            .unwrap();

        assert_eq!(report.original_width, 700);
        assert!(output.join("photo-mobile.webp").exists());
        assert!(output.join("photo-optimized.jpg").exists());
    }

    #[tokio::test]
    async fn test_encoder_failure_stops_remaining_variants() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out");
        std::fs::create_dir_all(&output).unwrap();
        write_png(&temp_dir.path().join("odd.png"), 100, 10);

        let backend = RecordingBackend {
            fail_inputs: vec!["odd.png".to_string()],
            ..Default::default()
        };
        let config = Config::default();
        let result = ImageTranscoder::new(&backend, &config)
            .transcode(&job(temp_dir.path(), "odd.png", &output, ImageType::Gallery))
            .await;

        assert!(matches!(result, Err(OptimizeError::Tool(_))));
        // the first (webp) request failed, nothing after it was attempted
        assert_eq!(backend.outputs().len(), 1);
    }
}
