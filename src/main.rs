//! # Responsive Image Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap` (tutti opzionali)
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio dell'optimizer
//! - Mappatura degli errori fatali su exit code 1
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica la configurazione (default o file JSON) relativa alla root
//! 4. Istanzia ImageOptimizer con il backend a tool esterni e lo esegue
//!
//! ## Esempio di utilizzo:
//! ```bash
//! optimize-images                      # public/images -> public/images/optimized
//! optimize-images --root ../site --clean --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use responsive_image_optimizer::{Config, ExternalToolBackend, ImageOptimizer, OptimizeError, ToolPathResolver};

#[derive(Parser)]
#[command(name = "optimize-images")]
#[command(about = "Generate responsive WebP/AVIF/JPEG variants and an image manifest")]
struct Args {
    /// Project root containing public/images (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// JSON configuration file overriding breakpoints and quality settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Remove the output directory before processing
    #[arg(long)]
    clean: bool,

    /// Directory searched for encoder binaries before PATH
    #[arg(long)]
    tools_dir: Option<PathBuf>,

    /// Print the encoder availability report and exit
    #[arg(long)]
    check_tools: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<OptimizeError>() {
                Some(kind) if kind.is_fatal() => error!("❌ Cannot start optimization: {}", kind),
                _ => error!("❌ {:#}", e),
            }
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let mut config = match args.config {
        Some(ref path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
            }
            Config::from_file(path).await?
        }
        None => Config::default(),
    };
    config.resolve_paths(&root);
    config.clean_output |= args.clean;
    if args.tools_dir.is_some() {
        config.tools_dir = args.tools_dir;
    }

    let resolver = ToolPathResolver::new(config.tools_dir.clone());

    if args.check_tools {
        println!("{}", resolver.get_tools_report());
        return Ok(());
    }

    let optimizer = ImageOptimizer::new(config, ExternalToolBackend::new(resolver));
    optimizer.run().await?;

    Ok(())
}
