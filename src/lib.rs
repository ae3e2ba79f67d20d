mod cli;
mod core;
mod processors;
mod utils;

pub use cli::Cli;
pub use self::core::{
    ConversionOutcome, ConversionPipeline, ConvertError, LogTrail, OutputFormat, OutputSettings,
    Result,
};
pub use processors::{collect_psd_files, BatchRunner, EncodeProfile, RunSummary};
pub use utils::{base_name, format_file_size, is_psd_file};

pub mod prelude {
    pub use crate::{
        BatchRunner, ConversionOutcome, ConversionPipeline, OutputFormat, OutputSettings,
        RunSummary,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
