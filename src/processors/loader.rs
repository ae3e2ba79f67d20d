// psdate/src/processors/loader.rs
use crate::core::{ConvertError, Result};
use image::{DynamicImage, RgbaImage};
use psd::Psd;
use std::path::Path;

/// Decodes a PSD file into its flattened composite image.
///
/// Layer compositing is entirely the psd crate's job; what comes back here
/// is the final merged raster as RGBA.
pub fn load_flattened(path: &Path) -> Result<DynamicImage> {
    log::debug!("Loading PSD from: {}", path.display());

    validate_path(path)?;

    let bytes = std::fs::read(path)?;
    let psd = Psd::from_bytes(&bytes).map_err(|e| ConvertError::UnreadableImage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let (width, height) = (psd.width(), psd.height());
    let rgba = psd.rgba();

    let buffer =
        RgbaImage::from_raw(width, height, rgba).ok_or_else(|| ConvertError::UnreadableImage {
            path: path.to_path_buf(),
            reason: "composite pixel data does not match the declared dimensions".to_string(),
        })?;

    log::debug!("Loaded PSD: {}x{} pixels", width, height);

    Ok(DynamicImage::ImageRgba8(buffer))
}

fn validate_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ConvertError::UnreadableImage {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        });
    }

    let metadata = path.metadata()?;
    if metadata.len() == 0 {
        return Err(ConvertError::UnreadableImage {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_flattened(Path::new("no-such-file.psd")).unwrap_err();
        assert!(matches!(err, ConvertError::UnreadableImage { .. }));
    }

    #[test]
    fn empty_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.psd");
        std::fs::write(&path, b"").unwrap();

        let err = load_flattened(&path).unwrap_err();
        assert!(matches!(err, ConvertError::UnreadableImage { .. }));
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.psd");
        std::fs::write(&path, b"this is not a photoshop document").unwrap();

        let err = load_flattened(&path).unwrap_err();
        assert!(matches!(err, ConvertError::UnreadableImage { .. }));
    }
}
