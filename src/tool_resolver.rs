//! # Tool Path Resolver
//!
//! Finds the external encoders used to produce image variants:
//! - an optional tools directory (flat or per-platform layout)
//! - the system `PATH`

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Every external tool the encoder backend knows how to drive
pub const KNOWN_TOOLS: &[&str] = &["cwebp", "magick", "convert", "vips"];

/// Tool path resolver for bundled and system-installed encoders
#[derive(Debug, Clone, Default)]
pub struct ToolPathResolver {
    /// Directory searched before PATH
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a new path resolver
    pub fn new(tools_dir: Option<PathBuf>) -> Self {
        Self { tools_dir }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        if let Some(ref tools_dir) = self.tools_dir {
            if let Some(bundled_path) = self.find_in_tools_dir(tools_dir, tool_name) {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled_path);
                return Some(bundled_path);
            }
        }

        if let Some(system_path) = self.find_in_system_path(tool_name) {
            debug!("Using system tool: {} -> {:?}", tool_name, system_path);
            return Some(system_path);
        }

        debug!("Tool not found: {}", tool_name);
        None
    }

    /// Look for a tool as `tools/{tool}` or `tools/{platform}/{tool}`
    fn find_in_tools_dir(&self, tools_dir: &Path, tool_name: &str) -> Option<PathBuf> {
        let platform = if cfg!(target_os = "macos") {
            "darwin"
        } else {
            env::consts::OS
        };
        let file_name = Self::executable_name(tool_name);

        [tools_dir.join(&file_name), tools_dir.join(platform).join(&file_name)]
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, tool_name: &str) -> Option<PathBuf> {
        let file_name = Self::executable_name(tool_name);

        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    fn executable_name(tool_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", tool_name)
        } else {
            tool_name.to_string()
        }
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.resolve_tool(tool_name).is_some()
    }

    /// Names of the known tools that resolve
    pub fn available_tools(&self) -> Vec<&'static str> {
        KNOWN_TOOLS
            .iter()
            .copied()
            .filter(|tool| self.is_tool_available(tool))
            .collect()
    }

    /// Get installation instructions for a tool
    pub fn install_instructions(tool_name: &str) -> String {
        match tool_name {
            "cwebp" => "sudo apt-get install webp  # or: brew install webp".to_string(),
            "magick" | "convert" => "sudo apt-get install imagemagick  # or: brew install imagemagick".to_string(),
            "vips" => "sudo apt-get install libvips-tools  # or: brew install vips".to_string(),
            _ => format!("sudo apt-get install {}", tool_name),
        }
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> Result<PathBuf, String> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            format!(
                "Tool '{}' not found. To install, run:\n  {}",
                tool_name,
                Self::install_instructions(tool_name)
            )
        })
    }

    /// Get a report of tool availability grouped by output format
    pub fn get_tools_report(&self) -> String {
        let mut report = String::from("Image encoder report\n");
        report.push_str(&format!("Tools dir: {:?}\n", self.tools_dir));

        let groups: [(&str, &[&str]); 3] = [
            ("WebP", &["cwebp", "magick", "convert", "vips"]),
            ("AVIF (optional)", &["magick", "convert", "vips"]),
            ("Progressive JPEG", &["magick", "convert", "vips"]),
        ];

        for (category, tools) in groups {
            report.push_str(&format!("\n{}:\n", category));
            for tool in tools {
                match self.check_tool_with_instructions(tool) {
                    Ok(path) => report.push_str(&format!("  ✅ {} -> {:?}\n", tool, path)),
                    Err(_) => report.push_str(&format!(
                        "  ❌ {} (install with: {})\n",
                        tool,
                        Self::install_instructions(tool)
                    )),
                }
            }
        }

        report
    }
}
