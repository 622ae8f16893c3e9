//! # Responsive Image Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Breakpoint, tabella qualità, percorsi e validazione
//! - `error`: Tipi di errore custom
//! - `classify`: Classificazione avatar/project/icon/gallery dal percorso
//! - `walker`: Visita della sorgente e replica delle directory in output
//! - `encoder`: Backend di encoding (tool esterni cwebp/ImageMagick/libvips)
//! - `tool_resolver`: Ricerca dei tool esterni
//! - `transcoder`: Varianti responsive WebP/AVIF e fallback JPEG per immagine
//! - `manifest`: Generazione di `manifest.json` dall'albero di output
//! - `file_manager`: Operazioni sui file
//! - `progress`: Progress bar e statistiche
//! - `optimizer`: Orchestratore del processo
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use responsive_image_optimizer::{Config, ExternalToolBackend, ImageOptimizer, ToolPathResolver};
//!
//! let backend = ExternalToolBackend::new(ToolPathResolver::new(None));
//! let optimizer = ImageOptimizer::new(Config::for_root(&root), backend);
//! optimizer.run().await?;
//! ```

pub mod classify;
pub mod config;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod manifest;
pub mod optimizer;
pub mod progress;
pub mod tool_resolver;
pub mod transcoder;
pub mod walker;

pub use classify::{classify, ImageType};
pub use config::Config;
pub use encoder::{EncoderBackend, ExternalToolBackend};
pub use error::OptimizeError;
pub use manifest::{Manifest, ManifestGenerator};
pub use optimizer::ImageOptimizer;
pub use tool_resolver::ToolPathResolver;
