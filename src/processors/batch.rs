// psdate/src/processors/batch.rs
use crate::core::{ConvertError, ConversionPipeline, OutputSettings, Result};
use crate::utils::is_psd_file;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Sequential driver for a whole conversion run: enumerates `.psd` files
/// from the given sources and feeds them through the pipeline one at a
/// time, counting successes.
pub struct BatchRunner {
    pipeline: ConversionPipeline,
    output_dir: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_converted: usize,
    pub output_dir: PathBuf,
}

impl BatchRunner {
    /// Creates the output directory up front. Failure here is the one
    /// run-level abort: it is surfaced to the caller before any file is
    /// attempted.
    pub fn new(settings: OutputSettings, output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::DirectoryCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            pipeline: ConversionPipeline::new(settings)?,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Attempts every discovered file; a failed conversion is counted and
    /// the run moves on to the next file.
    pub fn run(&self, sources: &[PathBuf]) -> RunSummary {
        let psd_files = collect_psd_files(sources);

        if psd_files.is_empty() {
            log::warn!("No PSD files found in the given sources");
            return RunSummary {
                files_found: 0,
                files_converted: 0,
                output_dir: self.output_dir.clone(),
            };
        }

        log::info!("Processing {} PSD files", psd_files.len());

        let pb = create_progress_bar(psd_files.len());

        let mut converted = 0usize;
        for path in &psd_files {
            let outcome = self.pipeline.convert(path, &self.output_dir);
            if outcome.converted {
                converted += 1;
            }
            pb.inc(1);
        }

        pb.finish_with_message(format!(
            "Converted {}/{} files",
            converted,
            psd_files.len()
        ));

        RunSummary {
            files_found: psd_files.len(),
            files_converted: converted,
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Enumerates candidate files. Missing sources are skipped with a warning;
/// plain files must carry the `.psd` extension; directories are walked
/// recursively, depth-first, in file-name order.
pub fn collect_psd_files(sources: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for source in sources {
        if !source.exists() {
            log::warn!(
                "Source path '{}' does not exist. Skipping.",
                source.display()
            );
            continue;
        }

        if source.is_file() {
            if is_psd_file(source) {
                files.push(source.clone());
            } else {
                log::info!("Skipping non-PSD file: {}", source.display());
            }
        } else if source.is_dir() {
            log::info!("Scanning directory: {}", source.display());

            for entry in WalkDir::new(source)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                if entry.file_type().is_file() && is_psd_file(entry.path()) {
                    log::info!("Found PSD: {}", entry.path().display());
                    files.push(entry.into_path());
                }
            }
        } else {
            log::warn!(
                "Source path '{}' is neither a file nor a directory. Skipping.",
                source.display()
            );
        }
    }

    files
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
