//! # Main Optimizer Orchestrator Module
//!
//! Questo è il modulo che orchestra tutto il processo di ottimizzazione.
//!
//! ## Flusso di esecuzione:
//! 1. **Dependency check**: Verifica che esista un encoder WebP e JPEG
//! 2. **Source check**: La directory sorgente deve esistere
//! 3. **Clean** (opzionale): Rimuove l'output precedente
//! 4. **Discovery**: Il walker replica le directory e raccoglie le immagini
//! 5. **Processing**: Una immagine alla volta, in sequenza
//! 6. **Manifest**: Riscansione dell'output e scrittura di `manifest.json`
//! 7. **Reporting**: Riepilogo finale
//!
//! ## Error handling:
//! - Dipendenze mancanti o sorgente inesistente: errore fatale, niente viene elaborato
//! - Errore su una singola immagine: loggato, si passa alla successiva
//! - Errore AVIF: warning, la variante manca dal manifest
//!
//! ## Esempio:
//! ```rust,ignore
//! let backend = ExternalToolBackend::new(ToolPathResolver::new(None));
//! let optimizer = ImageOptimizer::new(Config::for_root(&root), backend);
//! let stats = optimizer.run().await?;
//! ```

use anyhow::Result;
use tracing::info;

use crate::{
    config::Config,
    encoder::EncoderBackend,
    error::OptimizeError,
    file_manager::FileManager,
    manifest::{ManifestGenerator, MANIFEST_FILE_NAME},
    progress::{OptimizationStats, ProgressManager},
    transcoder::ImageTranscoder,
    walker::DirectoryWalker,
};

/// Batch optimizer orchestrator
pub struct ImageOptimizer<B: EncoderBackend> {
    config: Config,
    backend: B,
    show_progress: bool,
}

impl<B: EncoderBackend> ImageOptimizer<B> {
    /// Create a new optimizer instance
    pub fn new(config: Config, backend: B) -> Self {
        Self {
            config,
            backend,
            show_progress: true,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline: startup checks, transcoding, manifest
    pub async fn run(&self) -> Result<OptimizationStats> {
        info!("🚀 Starting image optimization...");
        self.config.validate()?;

        self.backend.check_dependencies()?;

        let source_dir = &self.config.source_dir;
        let output_dir = &self.config.output_dir;

        if !source_dir.is_dir() {
            return Err(OptimizeError::SourceNotFound(source_dir.clone()).into());
        }

        if self.config.clean_output {
            FileManager::clean_output_dir(output_dir, source_dir).await?;
        }
        tokio::fs::create_dir_all(output_dir).await?;

        let jobs = DirectoryWalker::walk(source_dir, output_dir)?;
        info!("🔍 Found {} images in {}", jobs.len(), source_dir.display());

        let progress = if self.show_progress {
            ProgressManager::new(jobs.len() as u64)
        } else {
            ProgressManager::hidden()
        };

        let transcoder = ImageTranscoder::new(&self.backend, &self.config);
        let mut stats = OptimizationStats::new();

        for job in &jobs {
            progress.set_message(&job.display_name());
            match transcoder.process(job).await {
                Some(report) => stats.add_optimized(&report),
                None => stats.add_failed(),
            }
            progress.inc();
        }
        progress.finish();

        ManifestGenerator::generate_and_write(output_dir, &self.config).await?;

        info!("✅ Image optimization completed!");
        info!("📁 Optimized images saved to: {}", output_dir.display());
        info!("📋 Check {} for all available image formats and sizes", MANIFEST_FILE_NAME);
        info!("{}", stats.format_summary());

        Ok(stats)
    }
}
