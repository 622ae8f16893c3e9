//! # Directory Walker
//!
//! Visita ricorsivamente la directory sorgente, replica la sua struttura nella
//! directory di output e produce un `ImageJob` per ogni immagine supportata.
//!
//! ## Comportamento:
//! - Ogni sottodirectory sorgente ottiene la sua controparte in output
//!   (creata se assente) prima di visitarne il contenuto
//! - I file con estensione non supportata vengono ignorati in silenzio
//! - L'ordine di visita è deterministico (ordinato per nome)
//! - La directory di output viene esclusa dalla visita quando si trova dentro
//!   la sorgente (layout di default `public/images/optimized`)
//! - I symlink (file e directory) vengono seguiti; i cicli vengono
//!   segnalati da `walkdir` e saltati con un warning

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::{classify, ImageType};
use crate::file_manager::FileManager;

/// One source image scheduled for transcoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    /// Absolute path of the source image
    pub source_path: PathBuf,
    /// Path relative to the source root
    pub relative_path: PathBuf,
    /// Mirrored directory receiving the variants
    pub output_dir: PathBuf,
    pub image_type: ImageType,
}

impl ImageJob {
    /// File name without its extension
    pub fn base_name(&self) -> String {
        self.source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name used in log lines
    pub fn display_name(&self) -> String {
        self.relative_path.to_string_lossy().replace('\\', "/")
    }
}

/// Mirrors a source tree into an output tree and collects image jobs
pub struct DirectoryWalker;

impl DirectoryWalker {
    /// Walk `source_dir`, creating mirrored directories under `output_dir`.
    ///
    /// Both directories must exist or be creatable; `output_dir` is created
    /// if missing.
    pub fn walk(source_dir: &Path, output_dir: &Path) -> Result<Vec<ImageJob>> {
        fs::create_dir_all(output_dir)?;
        let source_root = source_dir.canonicalize()
            .map_err(|e| anyhow::anyhow!("Failed to canonicalize source dir {}: {}", source_dir.display(), e))?;
        let output_root = output_dir.canonicalize()
            .map_err(|e| anyhow::anyhow!("Failed to canonicalize output dir {}: {}", output_dir.display(), e))?;

        let mut jobs = Vec::new();

        let entries = WalkDir::new(&source_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.path() != output_root.as_path());

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("⚠️ Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let relative_path = entry.path().strip_prefix(&source_root)?.to_path_buf();

            if entry.file_type().is_dir() {
                let mirrored = output_root.join(&relative_path);
                if !mirrored.exists() {
                    fs::create_dir_all(&mirrored)?;
                    debug!("Created output directory: {}", mirrored.display());
                }
            } else if entry.file_type().is_file() && FileManager::is_supported_image(entry.path()) {
                let output_dir = match relative_path.parent() {
                    Some(parent) => output_root.join(parent),
                    None => output_root.clone(),
                };
                jobs.push(ImageJob {
                    source_path: entry.path().to_path_buf(),
                    image_type: classify(&relative_path),
                    relative_path,
                    output_dir,
                });
            } else {
                debug!("Skipping unsupported file: {}", entry.path().display());
            }
        }

        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_walk_selects_supported_files_only() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("images");
        touch(&source.join("hero.jpg"));
        touch(&source.join("notes.txt"));
        touch(&source.join("icon-close.svg"));
        touch(&source.join("project/demo.PNG"));
        touch(&source.join("project/readme.md"));

        let jobs = DirectoryWalker::walk(&source, &temp_dir.path().join("out")).unwrap();
        let names: Vec<String> = jobs.iter().map(|job| job.display_name()).collect();

        assert_eq!(names, vec!["hero.jpg", "project/demo.PNG"]);
        assert_eq!(jobs[1].image_type, ImageType::Project);
        assert_eq!(jobs[1].base_name(), "demo");
    }

    #[test]
    fn test_walk_mirrors_directories() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("images");
        let output = temp_dir.path().join("out");
        touch(&source.join("project/app/shot.webp"));
        fs::create_dir_all(source.join("empty")).unwrap();

        let jobs = DirectoryWalker::walk(&source, &output).unwrap();

        assert!(output.join("project/app").is_dir());
        assert!(output.join("empty").is_dir());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_dir, output.canonicalize().unwrap().join("project/app"));
    }

    #[test]
    fn test_walk_skips_nested_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("images");
        let output = source.join("optimized");
        touch(&source.join("avatar.jpg"));
        touch(&output.join("avatar.webp"));
        touch(&output.join("avatar-optimized.jpg"));

        let jobs = DirectoryWalker::walk(&source, &output).unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].display_name(), "avatar.jpg");
        assert!(!output.join("optimized").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let shared = temp_dir.path().join("shared");
        let source = temp_dir.path().join("images");
        let output = temp_dir.path().join("out");
        touch(&shared.join("hero.png"));
        touch(&shared.join("screens/app.png"));
        fs::create_dir_all(&source).unwrap();
        symlink(shared.join("hero.png"), source.join("linked.png")).unwrap();
        symlink(shared.join("screens"), source.join("project")).unwrap();
        // loops back to the source root
        symlink(&source, source.join("again")).unwrap();

        let jobs = DirectoryWalker::walk(&source, &output).unwrap();
        let names: Vec<String> = jobs.iter().map(|job| job.display_name()).collect();

        assert_eq!(names, vec!["linked.png", "project/app.png"]);
        assert_eq!(jobs[1].image_type, ImageType::Project);
        assert!(output.join("project").is_dir());
    }

    #[test]
    fn test_walk_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = DirectoryWalker::walk(&temp_dir.path().join("nope"), &temp_dir.path().join("out"));
        assert!(result.is_err());
    }
}
