//! # Encoder Backend Module
//!
//! Questo modulo definisce il confine tra la logica di transcoding e gli
//! strumenti che producono fisicamente i file.
//!
//! ## Architettura
//!
//! - `EncoderBackend`: trait con una singola operazione `encode` (un file di
//!   output per richiesta) più il controllo delle dipendenze
//! - `ExternalToolBackend`: implementazione che orchestra tool esterni
//!
//! ## Strategia Tool Selection
//!
//! | Formato | Tool (priorità decrescente) |
//! |---------|-----------------------------|
//! | WebP    | cwebp, magick, convert, vips |
//! | AVIF    | magick, convert, vips (best-effort) |
//! | JPEG    | magick, convert, vips (progressive) |
//!
//! Se un tool fallisce si prova il successivo nella catena. Se nessun tool è
//! installato l'errore è `MissingDependency`, se tutti falliscono è `Tool`.
//!
//! ## Resize
//!
//! Il resize è sempre "fit inside" sulla larghezza, con aspect ratio
//! preservato e senza upscaling:
//! - cwebp: `-resize W 0`
//! - ImageMagick: `-resize Wx>`
//! - vips: `thumbnail ... W --size down`

use std::path::PathBuf;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::OptimizeError;
use crate::tool_resolver::ToolPathResolver;

/// Target encoding of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Webp,
    Avif,
    Jpeg,
}

impl OutputFormat {
    /// Extension of generated files, also used as the manifest format key
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Avif => "avif",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Tools able to produce this format, best first
    pub fn tool_chain(&self) -> &'static [&'static str] {
        match self {
            OutputFormat::Webp => &["cwebp", "magick", "convert", "vips"],
            OutputFormat::Avif | OutputFormat::Jpeg => &["magick", "convert", "vips"],
        }
    }
}

/// A single output file to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Encoder quality, 0-100
    pub quality: u8,
    /// Resize to this width; `None` keeps the original resolution
    pub width: Option<u32>,
}

/// Produces encoded image files
#[allow(async_fn_in_trait)]
pub trait EncoderBackend {
    /// Write `request.output`
    async fn encode(&self, request: &EncodeRequest) -> Result<(), OptimizeError>;

    /// Fail if WebP or JPEG output cannot be produced at all
    fn check_dependencies(&self) -> Result<(), OptimizeError>;
}

/// Encoder driving cwebp / ImageMagick / libvips command-line tools
pub struct ExternalToolBackend {
    resolver: ToolPathResolver,
}

impl ExternalToolBackend {
    pub fn new(resolver: ToolPathResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ToolPathResolver {
        &self.resolver
    }

    /// Command-line arguments for `tool` to fulfil `request`
    pub fn build_args(tool: &str, request: &EncodeRequest) -> Vec<String> {
        let input = request.input.to_string_lossy().into_owned();
        let output = request.output.to_string_lossy().into_owned();
        let quality = request.quality.to_string();

        match tool {
            "cwebp" => {
                let mut args = vec!["-quiet".to_string(), "-q".to_string(), quality, "-m".to_string(), "4".to_string()];
                if let Some(width) = request.width {
                    args.extend(["-resize".to_string(), width.to_string(), "0".to_string()]);
                }
                args.extend([input, "-o".to_string(), output]);
                args
            }
            "vips" => {
                let mut options = format!("Q={}", quality);
                match request.format {
                    OutputFormat::Jpeg => options.push_str(",interlace,strip"),
                    OutputFormat::Avif => options.push_str(",compression=av1,strip"),
                    OutputFormat::Webp => options.push_str(",strip"),
                }
                let target = format!("{}[{}]", output, options);
                match request.width {
                    Some(width) => vec![
                        "thumbnail".to_string(),
                        input,
                        target,
                        width.to_string(),
                        "--height".to_string(),
                        "10000000".to_string(),
                        "--size".to_string(),
                        "down".to_string(),
                    ],
                    None => vec!["copy".to_string(), input, target],
                }
            }
            // magick (ImageMagick 7) and convert (ImageMagick 6) share a syntax
            _ => {
                let mut args = vec![input];
                if let Some(width) = request.width {
                    args.extend(["-resize".to_string(), format!("{}x>", width)]);
                }
                args.extend(["-strip".to_string(), "-quality".to_string(), quality]);
                if request.format == OutputFormat::Jpeg {
                    args.extend(["-interlace".to_string(), "Plane".to_string()]);
                }
                args.push(output);
                args
            }
        }
    }

    fn has_any(&self, format: OutputFormat) -> bool {
        format.tool_chain().iter().any(|tool| self.resolver.is_tool_available(tool))
    }
}

impl EncoderBackend for ExternalToolBackend {
    async fn encode(&self, request: &EncodeRequest) -> Result<(), OptimizeError> {
        let tools = request.format.tool_chain();
        let mut any_tool_available = false;
        let mut last_failure = String::new();

        for tool_name in tools {
            let Some(tool_path) = self.resolver.resolve_tool(tool_name) else {
                continue;
            };
            any_tool_available = true;

            let args = Self::build_args(tool_name, request);
            debug!("Running {:?} {:?}", tool_path, args);

            let start_time = Instant::now();
            let output = match Command::new(&tool_path).args(&args).output().await {
                Ok(output) => output,
                Err(e) => {
                    warn!("Failed to start {}: {}, trying next tool", tool_name, e);
                    last_failure = format!("{}: {}", tool_name, e);
                    continue;
                }
            };
            let elapsed = start_time.elapsed();

            if output.status.success() && request.output.exists() {
                debug!("{} written by {} in {:?}", request.output.display(), tool_name, elapsed);
                return Ok(());
            }

            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("{} failed after {:?}: {}", tool_name, elapsed, stderr);
            last_failure = format!("{} exited with {}: {}", tool_name, output.status, stderr);
        }

        if !any_tool_available {
            Err(OptimizeError::MissingDependency(format!(
                "no {} encoder available (install one of: {})",
                request.format.extension(),
                tools.join(", ")
            )))
        } else {
            Err(OptimizeError::Tool(format!(
                "all {} encoders failed for {}: {}",
                request.format.extension(),
                request.input.display(),
                last_failure
            )))
        }
    }

    fn check_dependencies(&self) -> Result<(), OptimizeError> {
        info!("🔧 Checking image encoder dependencies...");

        let mut missing = Vec::new();
        for format in [OutputFormat::Webp, OutputFormat::Jpeg] {
            if !self.has_any(format) {
                missing.push(format!(
                    "{} (install one of: {})",
                    format.extension(),
                    format.tool_chain().join(", ")
                ));
            }
        }

        if !self.has_any(OutputFormat::Avif) {
            warn!("⚠️ No AVIF encoder found, AVIF variants will be skipped");
        }

        if !missing.is_empty() {
            return Err(OptimizeError::MissingDependency(format!(
                "image encoders missing for: {}",
                missing.join("; ")
            )));
        }

        info!("✅ Available encoders: {}", self.resolver.available_tools().join(", "));
        Ok(())
    }
}
