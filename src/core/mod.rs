// psdate/src/core/mod.rs
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub mod pipeline;

pub use pipeline::{ConversionOutcome, ConversionPipeline};

/// The five raster formats a conversion run can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpg,
    WebP,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::WebP => "webp",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    // Case-insensitive; "jpeg" is accepted as a synonym for "jpg".
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "webp" => Ok(OutputFormat::WebP),
            "bmp" => Ok(OutputFormat::Bmp),
            "tiff" => Ok(OutputFormat::Tiff),
            other => Err(ConvertError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Immutable per-run output configuration.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// Encoder quality, 1-100. Meaningful for jpg and webp.
    pub quality: u8,
    /// Scale percentage, 1-200. 100 leaves dimensions unchanged.
    pub scale: u32,
    /// Lossless encoding. WebP only.
    pub lossless: bool,
    /// Encoder effort for png/jpg/webp; selects LZW compression for tiff.
    pub optimize: bool,
    /// Adds dimensions, modes and save parameters to the log trail.
    pub detailed_output: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: 90,
            scale: 100,
            lossless: false,
            optimize: true,
            detailed_output: false,
        }
    }
}

impl OutputSettings {
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ConvertError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if self.scale == 0 || self.scale > 200 {
            return Err(ConvertError::InvalidParameter(
                "Scale must be between 1 and 200 percent".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Cannot identify image file '{path}': {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("Could not create output directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not encode '{path}': {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Ordered, human-readable record of one conversion attempt.
///
/// Lines are mirrored to the `log` facade as they are recorded, so callers
/// that only watch the logger still see every message.
#[derive(Debug, Default)]
pub struct LogTrail {
    lines: Vec<String>,
}

impl LogTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.lines.push(message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.lines.push(message);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
