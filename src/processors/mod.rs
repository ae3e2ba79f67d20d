// psdate/src/processors/mod.rs
pub mod batch;
pub mod dates;
pub mod encoder;
pub mod loader;
pub mod namer;
pub mod normalizer;

pub use batch::{collect_psd_files, BatchRunner, RunSummary};
pub use encoder::EncodeProfile;
