// psdate/src/cli.rs
use crate::core::{OutputFormat, OutputSettings};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "psdate")]
#[command(version)]
#[command(about = "Batch PSD to image converter that names outputs by creation date")]
pub struct Cli {
    /// PSD files, or directories to scan recursively for .psd files
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Directory where converted images are written (created if missing)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format: png, jpg, webp, bmp or tiff
    #[arg(short, long, default_value = "png")]
    pub format: OutputFormat,

    /// Encoder quality for jpg and webp
    #[arg(short, long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Scale percentage; 100 keeps the original size
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=200))]
    pub scale: u32,

    /// Lossless WebP encoding
    #[arg(long)]
    pub lossless: bool,

    /// Skip encoder optimization (png/jpg/webp effort, tiff LZW compression)
    #[arg(long)]
    pub no_optimize: bool,

    /// Log dimensions, color modes and save parameters per file
    #[arg(long)]
    pub detailed: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            format: self.format,
            quality: self.quality,
            scale: self.scale,
            lossless: self.lossless,
            optimize: !self.no_optimize,
            detailed_output: self.detailed,
        }
    }
}
