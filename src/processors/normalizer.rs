// psdate/src/processors/normalizer.rs
//
// Maps a decoded image onto a color mode the target format's encoder can
// accept. Transparency survives where the format supports it; for JPEG it
// is flattened against an opaque white canvas instead.
use crate::core::{LogTrail, OutputFormat};
use image::{imageops, DynamicImage, RgbImage, Rgba, RgbaImage};

pub fn normalize_for_format(
    image: DynamicImage,
    format: OutputFormat,
    trail: &mut LogTrail,
    detailed: bool,
) -> DynamicImage {
    match format {
        OutputFormat::Png => match image {
            // The PNG encoder takes 8- and 16-bit samples but not floats.
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                if detailed {
                    trail.info("  Converted float samples to 8-bit for PNG");
                }
                if image.color().has_alpha() {
                    DynamicImage::ImageRgba8(image.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(image.to_rgb8())
                }
            }
            other => other,
        },
        OutputFormat::WebP => match image {
            img @ (DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_)) => img,
            other => {
                if other.color().has_alpha() {
                    if detailed {
                        trail.info("  Converted image to RGBA for WebP");
                    }
                    DynamicImage::ImageRgba8(other.to_rgba8())
                } else {
                    if detailed {
                        trail.info("  Converted image to RGB for WebP");
                    }
                    DynamicImage::ImageRgb8(other.to_rgb8())
                }
            }
        },
        OutputFormat::Jpg => {
            if image.color().has_alpha() {
                if detailed {
                    trail.info("  Converted image with transparency to RGB with white background");
                }
                DynamicImage::ImageRgb8(flatten_onto_white(&image))
            } else if !matches!(
                image,
                DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_)
            ) {
                if detailed {
                    trail.info("  Converted image to RGB");
                }
                DynamicImage::ImageRgb8(image.to_rgb8())
            } else {
                image
            }
        }
        // No special-casing for these targets.
        OutputFormat::Bmp | OutputFormat::Tiff => image,
    }
}

/// Composites an alpha-bearing image onto an opaque white canvas of the
/// same size, using the alpha channel as the blend mask.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &rgba, 0, 0);

    DynamicImage::ImageRgba8(canvas).to_rgb8()
}
