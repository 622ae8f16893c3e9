//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche della run.
//!
//! ## Componenti principali:
//! - `ProgressManager`: Progress bar `indicatif` sui file sorgente
//! - `OptimizationStats`: Statistiche cumulative della run
//!
//! ## Statistiche tracciate:
//! - **images_processed**: Immagini elaborate (riuscite + fallite)
//! - **images_optimized**: Immagini con tutte le varianti obbligatorie scritte
//! - **images_failed**: Immagini abbandonate per errore
//! - **variants_written**: File di output prodotti
//! - **avif_skipped**: Varianti AVIF saltate (best-effort)
//! - **bytes_written**: Byte totali scritti in output
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 9/15 (60%) project/demo.png
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::file_manager::FileManager;
use crate::transcoder::TranscodeReport;

/// Manages progress reporting for a batch run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Set a custom message without incrementing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Count one finished file
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Finish and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Statistics tracker for a batch run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OptimizationStats {
    pub images_processed: usize,
    pub images_optimized: usize,
    pub images_failed: usize,
    pub variants_written: usize,
    pub avif_skipped: usize,
    pub bytes_written: u64,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_optimized(&mut self, report: &TranscodeReport) {
        self.images_processed += 1;
        self.images_optimized += 1;
        self.variants_written += report.variants_written.len();
        self.avif_skipped += report.avif_skipped;
        self.bytes_written += report.bytes_written;
    }

    pub fn add_failed(&mut self) {
        self.images_processed += 1;
        self.images_failed += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} images | Optimized: {} | Failed: {} | Variants: {} | AVIF skipped: {} | Written: {}",
            self.images_processed,
            self.images_optimized,
            self.images_failed,
            self.variants_written,
            self.avif_skipped,
            FileManager::format_size(self.bytes_written)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = OptimizationStats::new();
        stats.add_optimized(&TranscodeReport {
            variants_written: vec![PathBuf::from("a.webp"), PathBuf::from("a-optimized.jpg")],
            avif_skipped: 1,
            bytes_written: 2048,
            ..Default::default()
        });
        stats.add_failed();

        assert_eq!(stats.images_processed, 2);
        assert_eq!(stats.images_optimized, 1);
        assert_eq!(stats.images_failed, 1);
        assert_eq!(stats.variants_written, 2);
        assert_eq!(stats.avif_skipped, 1);
        assert!(stats.format_summary().contains("Written: 2.00 KB"));
    }
}
