// psdate/src/core/pipeline.rs
use super::{ConvertError, LogTrail, OutputSettings, Result};
use crate::processors::encoder::{self, EncodeProfile};
use crate::processors::{dates, loader, namer, normalizer};
use crate::utils::{base_name, format_file_size};
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

/// Per-file conversion orchestrator.
///
/// Load, scale, resolve a date stem, reserve a collision-free name,
/// normalize the color mode, encode and persist. All of it synchronous,
/// one file at a time; any error is caught at this boundary and becomes a
/// failed outcome instead of propagating.
pub struct ConversionPipeline {
    settings: OutputSettings,
}

/// What one conversion attempt produced: success flag, the written path
/// when there is one, and the ordered message trail.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub converted: bool,
    pub output: Option<PathBuf>,
    pub trail: Vec<String>,
}

// Assembled immediately before the encode half of the pipeline and
// discarded with it.
struct ConversionRequest<'a> {
    source: &'a Path,
    output_dir: &'a Path,
    base_name: String,
}

impl ConversionPipeline {
    pub fn new(settings: OutputSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }

    /// Converts one PSD file into the configured format under `output_dir`.
    ///
    /// Never panics and never returns an error: failures are folded into
    /// the outcome so a multi-file run can keep going.
    pub fn convert(&self, psd_path: &Path, output_dir: &Path) -> ConversionOutcome {
        let mut trail = LogTrail::new();

        match self.run(psd_path, output_dir, &mut trail) {
            Ok(output) => {
                trail.info(format!(
                    "Successfully converted and saved to '{}'",
                    output.display()
                ));
                ConversionOutcome {
                    converted: true,
                    output: Some(output),
                    trail: trail.into_lines(),
                }
            }
            Err(e) => {
                trail.warn(format!("Error converting '{}': {}", base_name(psd_path), e));
                ConversionOutcome {
                    converted: false,
                    output: None,
                    trail: trail.into_lines(),
                }
            }
        }
    }

    fn run(&self, psd_path: &Path, output_dir: &Path, trail: &mut LogTrail) -> Result<PathBuf> {
        let detailed = self.settings.detailed_output;

        let mut image = loader::load_flattened(psd_path)?;

        if detailed {
            let (width, height) = image.dimensions();
            trail.info(format!("  Original image size: {}x{}", width, height));
            trail.info(format!("  Image mode: {:?}", image.color()));
        }

        if self.settings.scale != 100 {
            image = scale_image(&image, self.settings.scale);
            if detailed {
                trail.info(format!(
                    "  Scaled to: {}x{}",
                    image.width(),
                    image.height()
                ));
            }
        }

        std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::DirectoryCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        let request = ConversionRequest {
            source: psd_path,
            output_dir,
            base_name: dates::resolve_date_stem(psd_path, trail),
        };

        self.encode_and_persist(&request, image, trail)
    }

    fn encode_and_persist(
        &self,
        request: &ConversionRequest<'_>,
        image: DynamicImage,
        trail: &mut LogTrail,
    ) -> Result<PathBuf> {
        let detailed = self.settings.detailed_output;
        let extension = self.settings.format.extension();

        let output_path =
            namer::reserve_output_path(request.output_dir, &request.base_name, extension);

        trail.info(format!(
            "Converting '{}' to '{}' as {}...",
            base_name(request.source),
            base_name(&output_path),
            extension.to_uppercase()
        ));

        let image = normalizer::normalize_for_format(image, self.settings.format, trail, detailed);

        let profile = EncodeProfile::for_settings(&self.settings);
        if detailed {
            trail.info(format!("  {}", profile.describe()));
        }

        encoder::write_image(&image, &output_path, &profile)?;

        if detailed {
            if let Ok(metadata) = std::fs::metadata(&output_path) {
                trail.info(format!(
                    "  Saved file size: {}",
                    format_file_size(metadata.len())
                ));
            }
        }

        Ok(output_path)
    }
}

fn scale_image(image: &DynamicImage, scale: u32) -> DynamicImage {
    let factor = scale as f64 / 100.0;
    let width = ((image.width() as f64 * factor).round() as u32).max(1);
    let height = ((image.height() as f64 * factor).round() as u32).max(1);

    image.resize_exact(width, height, FilterType::Lanczos3)
}
