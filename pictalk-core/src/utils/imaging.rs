//! Image inspection helpers built on the `image` crate.
//!
//! All functions log failures and return a sentinel instead of an error.

use std::path::Path;

use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use ndarray::Array4;
use serde::Serialize;

use crate::error::PictalkError;

/// Input size expected by the (not yet integrated) CNN.
pub const CNN_INPUT_SIZE: (u32, u32) = (224, 224);
pub const THUMBNAIL_SIZE: (u32, u32) = (150, 150);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: Option<String>,
    pub mode: String,
    pub size: u64,
}

fn decode(path: &Path) -> Result<(DynamicImage, Option<ImageFormat>), PictalkError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let img = reader.decode()?;
    Ok((img, format))
}

fn mode_name(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        other => format!("{:?}", other),
    }
}

pub fn validate_image(path: &Path) -> bool {
    match decode(path) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Image validation error for {}: {}", path.display(), e);
            false
        }
    }
}

pub fn get_image_info(path: &Path) -> Option<ImageInfo> {
    let info = decode(path).and_then(|(img, format)| {
        let size = std::fs::metadata(path)?.len();
        Ok(ImageInfo {
            width: img.width(),
            height: img.height(),
            format: format.map(|f| format!("{:?}", f).to_uppercase()),
            mode: mode_name(img.color()),
            size,
        })
    });

    match info {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!("Error getting image info for {}: {}", path.display(), e);
            None
        }
    }
}

/// Build a `(1, height, width, 3)` RGB tensor scaled to `[0, 1]`.
///
/// Placeholder input stage for a recognition model; nothing consumes it yet.
pub fn preprocess_image(path: &Path, target_size: (u32, u32)) -> Option<Array4<f32>> {
    let (img, _) = match decode(path) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!("Image preprocessing error for {}: {}", path.display(), e);
            return None;
        }
    };

    let (width, height) = target_size;
    let rgb = img
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::<f32>::zeros((1, height as usize, width as usize, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = f32::from(pixel[c]) / 255.0;
        }
    }
    Some(tensor)
}

/// Write a copy of `file_path` that fits inside `size`, keeping the aspect
/// ratio. Smaller images are saved unscaled.
pub fn create_thumbnail(file_path: &Path, output_path: &Path, size: (u32, u32)) -> bool {
    let result = decode(file_path).and_then(|(img, _)| {
        let (max_w, max_h) = size;
        let mut thumb = if img.width() <= max_w && img.height() <= max_h {
            img
        } else {
            img.resize(max_w, max_h, FilterType::Lanczos3)
        };
        if matches!(ImageFormat::from_path(output_path), Ok(ImageFormat::Jpeg)) {
            thumb = DynamicImage::ImageRgb8(thumb.to_rgb8());
        }
        thumb.save(output_path)?;
        Ok(())
    });

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Thumbnail creation error for {}: {}", file_path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x % 2 == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_validate_image() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(&dir, "good.png", 8, 8);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"definitely not a png").unwrap();

        assert!(validate_image(&good));
        assert!(!validate_image(&bad));
        assert!(!validate_image(&dir.path().join("missing.png")));
    }

    #[test]
    fn test_get_image_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "info.png", 64, 32);

        let info = get_image_info(&path).expect("info for a valid png");
        assert_eq!(info.width, 64);
        assert_eq!(info.height, 32);
        assert_eq!(info.format.as_deref(), Some("PNG"));
        assert_eq!(info.mode, "RGB");
        assert_eq!(info.size, std::fs::metadata(&path).unwrap().len());

        let bad = dir.path().join("bad.jpg");
        std::fs::write(&bad, b"junk").unwrap();
        assert!(get_image_info(&bad).is_none());
    }

    #[test]
    fn test_preprocess_image_shape_and_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "cnn.png", 40, 20);

        let tensor = preprocess_image(&path, CNN_INPUT_SIZE).expect("tensor");
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
        // Green channel is zero everywhere in the source.
        assert!(tensor.iter().skip(1).step_by(3).all(|v| *v == 0.0));

        assert!(preprocess_image(&dir.path().join("missing.png"), (4, 4)).is_none());
    }

    #[test]
    fn test_create_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let big = write_png(&dir, "big.png", 600, 300);
        let out = dir.path().join("thumb.jpg");

        assert!(create_thumbnail(&big, &out, THUMBNAIL_SIZE));
        let info = get_image_info(&out).unwrap();
        assert_eq!((info.width, info.height), (150, 75));
        assert_eq!(info.format.as_deref(), Some("JPEG"));

        let small = write_png(&dir, "small.png", 20, 10);
        let out_small = dir.path().join("thumb_small.png");
        assert!(create_thumbnail(&small, &out_small, THUMBNAIL_SIZE));
        let info = get_image_info(&out_small).unwrap();
        assert_eq!((info.width, info.height), (20, 10));

        assert!(!create_thumbnail(&dir.path().join("missing.png"), &out, THUMBNAIL_SIZE));
    }
}
