// Library exports for groupplot

pub mod assemble;
pub mod csv_reader;
pub mod error;
pub mod graph;
pub mod grouping;
pub mod parser;
pub mod runtime;
pub mod table;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    /// Pick a format from an output file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png),
            "svg" => Some(OutputFormat::Svg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
}

/// Largest canvas side accepted, in pixels
pub const MAX_CANVAS_SIDE: u32 = 16_384;

impl RenderOptions {
    /// Reject canvas sizes the backends cannot draw
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("Canvas size must be non-zero (got {}x{})", self.width, self.height);
        }
        if self.width > MAX_CANVAS_SIDE || self.height > MAX_CANVAS_SIDE {
            anyhow::bail!(
                "Canvas {}x{} is too large (max {} per side)",
                self.width,
                self.height,
                MAX_CANVAS_SIDE
            );
        }
        Ok(())
    }
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: OutputFormat::Png,
            title: None,
            y_label: None,
        }
    }
}
