// psdate/src/processors/encoder.rs
//
// Turns validated output settings into concrete encode parameters and
// persists the encoded bytes. One closed variant per target format keeps
// the parameter table exhaustiveness-checked.
use crate::core::{ConvertError, OutputFormat, OutputSettings, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use tiff::encoder::colortype;
use tiff::encoder::compression::{Compression, Lzw, Uncompressed};
use tiff::encoder::TiffEncoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeProfile {
    Png {
        optimize: bool,
    },
    Jpeg {
        quality: u8,
        optimize: bool,
    },
    WebP {
        quality: u8,
        lossless: bool,
        optimize: bool,
    },
    Bmp,
    Tiff {
        lzw: bool,
    },
}

impl EncodeProfile {
    pub fn for_settings(settings: &OutputSettings) -> Self {
        match settings.format {
            OutputFormat::Png => EncodeProfile::Png {
                optimize: settings.optimize,
            },
            OutputFormat::Jpg => EncodeProfile::Jpeg {
                quality: settings.quality,
                optimize: settings.optimize,
            },
            OutputFormat::WebP => EncodeProfile::WebP {
                quality: settings.quality,
                lossless: settings.lossless,
                optimize: settings.optimize,
            },
            OutputFormat::Bmp => EncodeProfile::Bmp,
            OutputFormat::Tiff => EncodeProfile::Tiff {
                lzw: settings.optimize,
            },
        }
    }

    /// One-line parameter summary for detailed output.
    pub fn describe(&self) -> String {
        match self {
            EncodeProfile::Png { optimize } => format!("PNG settings: optimize={}", optimize),
            EncodeProfile::Jpeg { quality, optimize } => {
                format!("JPEG settings: quality={}, optimize={}", quality, optimize)
            }
            EncodeProfile::WebP {
                quality,
                lossless,
                optimize,
            } => format!(
                "WebP settings: quality={}, lossless={}, optimize={}",
                quality, lossless, optimize
            ),
            EncodeProfile::Bmp => "BMP format selected (no additional settings)".to_string(),
            EncodeProfile::Tiff { lzw } => format!(
                "TIFF settings: compression={}",
                if *lzw { "LZW" } else { "None" }
            ),
        }
    }
}

/// Writes `image` to `path` using the profile's encoder parameters.
pub fn write_image(image: &DynamicImage, path: &Path, profile: &EncodeProfile) -> Result<()> {
    log::debug!("Saving image to {} with {:?}", path.display(), profile);

    match *profile {
        EncodeProfile::Png { optimize } => write_png(image, path, optimize),
        EncodeProfile::Jpeg { quality, .. } => write_jpeg(image, path, quality),
        EncodeProfile::WebP {
            quality,
            lossless,
            optimize,
        } => write_webp(image, path, quality, lossless, optimize),
        EncodeProfile::Bmp => write_plain(image, path, ImageFormat::Bmp),
        EncodeProfile::Tiff { lzw } => write_tiff(image, path, lzw),
    }
}

fn write_png(image: &DynamicImage, path: &Path, optimize: bool) -> Result<()> {
    if optimize {
        // Encode to memory first, then squeeze the bytes through oxipng.
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;

        let optimized =
            oxipng::optimize_from_memory(&buffer.into_inner(), &oxipng::Options::default())
                .map_err(|e| encode_error(path, format!("PNG optimization failed: {}", e)))?;

        std::fs::write(path, optimized)?;
    } else {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        image.write_to(&mut writer, ImageFormat::Png)?;
    }

    Ok(())
}

fn write_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let encoder = JpegEncoder::new_with_quality(writer, quality);
    image.write_with_encoder(encoder)?;

    Ok(())
}

fn write_webp(
    image: &DynamicImage,
    path: &Path,
    quality: u8,
    lossless: bool,
    optimize: bool,
) -> Result<()> {
    let encoder = webp::Encoder::from_image(image).map_err(|e| encode_error(path, e))?;

    let mut config = webp::WebPConfig::new()
        .map_err(|_| encode_error(path, "could not initialize WebP configuration"))?;
    config.lossless = i32::from(lossless);
    config.quality = f32::from(quality);
    // libwebp effort knob: 6 is the thorough end, 4 the library default.
    config.method = if optimize { 6 } else { 4 };

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| encode_error(path, format!("{:?}", e)))?;

    std::fs::write(path, &*memory)?;

    Ok(())
}

fn write_plain(image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    image.write_to(&mut writer, format)?;

    Ok(())
}

fn write_tiff(image: &DynamicImage, path: &Path, lzw: bool) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = TiffEncoder::new(writer).map_err(|e| encode_error(path, e))?;

    let written = if lzw {
        encode_tiff(&mut encoder, image, Lzw::default())
    } else {
        encode_tiff(&mut encoder, image, Uncompressed::default())
    };

    written.map_err(|e| encode_error(path, e))
}

fn encode_tiff<W, D>(
    encoder: &mut TiffEncoder<W>,
    image: &DynamicImage,
    compression: D,
) -> std::result::Result<(), tiff::TiffError>
where
    W: Write + Seek,
    D: Compression,
{
    let (width, height) = image.dimensions();

    match image {
        DynamicImage::ImageLuma8(img) => encoder
            .write_image_with_compression::<colortype::Gray8, _>(
                width,
                height,
                compression,
                img.as_raw(),
            ),
        DynamicImage::ImageRgb8(img) => encoder
            .write_image_with_compression::<colortype::RGB8, _>(
                width,
                height,
                compression,
                img.as_raw(),
            ),
        DynamicImage::ImageRgba8(img) => encoder
            .write_image_with_compression::<colortype::RGBA8, _>(
                width,
                height,
                compression,
                img.as_raw(),
            ),
        DynamicImage::ImageLuma16(img) => encoder
            .write_image_with_compression::<colortype::Gray16, _>(
                width,
                height,
                compression,
                img.as_raw(),
            ),
        DynamicImage::ImageRgb16(img) => encoder
            .write_image_with_compression::<colortype::RGB16, _>(
                width,
                height,
                compression,
                img.as_raw(),
            ),
        DynamicImage::ImageRgba16(img) => encoder
            .write_image_with_compression::<colortype::RGBA16, _>(
                width,
                height,
                compression,
                img.as_raw(),
            ),
        other => {
            // Gray-with-alpha and float layouts have no TIFF colortype here.
            let rgba = other.to_rgba8();
            encoder.write_image_with_compression::<colortype::RGBA8, _>(
                width,
                height,
                compression,
                rgba.as_raw(),
            )
        }
    }
}

fn encode_error(path: &Path, reason: impl ToString) -> ConvertError {
    ConvertError::Encode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(format: OutputFormat) -> OutputSettings {
        OutputSettings {
            format,
            quality: 85,
            scale: 100,
            lossless: true,
            optimize: true,
            detailed_output: false,
        }
    }

    #[test]
    fn profile_selection_covers_every_format() {
        assert_eq!(
            EncodeProfile::for_settings(&settings(OutputFormat::Png)),
            EncodeProfile::Png { optimize: true }
        );
        assert_eq!(
            EncodeProfile::for_settings(&settings(OutputFormat::Jpg)),
            EncodeProfile::Jpeg {
                quality: 85,
                optimize: true
            }
        );
        assert_eq!(
            EncodeProfile::for_settings(&settings(OutputFormat::WebP)),
            EncodeProfile::WebP {
                quality: 85,
                lossless: true,
                optimize: true
            }
        );
        assert_eq!(
            EncodeProfile::for_settings(&settings(OutputFormat::Bmp)),
            EncodeProfile::Bmp
        );
        assert_eq!(
            EncodeProfile::for_settings(&settings(OutputFormat::Tiff)),
            EncodeProfile::Tiff { lzw: true }
        );
    }

    #[test]
    fn optimize_off_disables_tiff_lzw() {
        let mut s = settings(OutputFormat::Tiff);
        s.optimize = false;
        assert_eq!(
            EncodeProfile::for_settings(&s),
            EncodeProfile::Tiff { lzw: false }
        );
    }

    #[test]
    fn describe_names_the_selected_compression() {
        assert_eq!(
            EncodeProfile::Tiff { lzw: true }.describe(),
            "TIFF settings: compression=LZW"
        );
        assert_eq!(
            EncodeProfile::Tiff { lzw: false }.describe(),
            "TIFF settings: compression=None"
        );
    }

    #[test]
    fn png_roundtrip_preserves_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        let image = DynamicImage::new_rgb8(7, 5);

        write_image(&image, &path, &EncodeProfile::Png { optimize: false }).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (7, 5));
    }

    #[test]
    fn lzw_tiff_is_decodable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tiff");
        let image = DynamicImage::new_rgba8(6, 4);

        write_image(&image, &path, &EncodeProfile::Tiff { lzw: true }).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (6, 4));
    }

    #[test]
    fn lossless_webp_is_decodable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.webp");
        let image = DynamicImage::new_rgba8(8, 3);

        write_image(
            &image,
            &path,
            &EncodeProfile::WebP {
                quality: 90,
                lossless: true,
                optimize: false,
            },
        )
        .unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (8, 3));
    }
}
