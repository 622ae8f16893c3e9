//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Lettura metadata immagine fallita (file corrotto, formato non riconosciuto)
//! - `Tool`: Un tool di encoding esterno è fallito
//! - `Manifest`: Serializzazione del manifest fallita
//! - `MissingDependency`: Nessun tool esterno disponibile per un formato richiesto
//! - `SourceNotFound`: Directory sorgente inesistente
//!
//! Gli errori fatali (`MissingDependency`, `SourceNotFound`) fermano il processo
//! con exit code 1; gli altri vengono loggati per singola immagine.

use std::path::PathBuf;

/// Custom error types for image optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image metadata error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Encoder error: {0}")]
    Tool(String),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Images directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

impl OptimizeError {
    /// Errors that abort the whole run before any image is processed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OptimizeError::MissingDependency(_) | OptimizeError::SourceNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(OptimizeError::MissingDependency("cwebp".into()).is_fatal());
        assert!(OptimizeError::SourceNotFound(PathBuf::from("/missing")).is_fatal());
        assert!(!OptimizeError::Tool("cwebp exited with 1".into()).is_fatal());
    }

    #[test]
    fn test_source_not_found_message() {
        let err = OptimizeError::SourceNotFound(PathBuf::from("/site/public/images"));
        assert_eq!(err.to_string(), "Images directory not found: /site/public/images");
    }
}
