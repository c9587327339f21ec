//! Image preparation: turns an arbitrary raster image into the normalized
//! luminance field the router consumes.
//!
//! Steps, in order: grayscale conversion, center square crop, resize to the
//! target size, normalization to `[0, 1]`, optional inversion (dark areas
//! demand thread), optional min/max contrast stretch.

use std::path::Path;

use image::{imageops, DynamicImage};
use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::field::Field;

/// Options for preparing a raster image.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PrepOptions {
    /// Side length of the square working space, in pixels.
    pub target_size: u32,
    /// Invert luminance so dark input areas receive more thread.
    pub invert: bool,
    /// Stretch values to span the full unit range.
    pub stretch_contrast: bool,
}

impl Default for PrepOptions {
    fn default() -> Self {
        Self {
            target_size: 800,
            invert: true,
            stretch_contrast: true,
        }
    }
}

/// Load an image from disk and prepare it as a luminance field.
pub fn prepare_image(path: &Path, options: &PrepOptions) -> Result<Field, RouteError> {
    let img = image::open(path).map_err(|e| RouteError::Image {
        path: path.to_path_buf(),
        source: e,
    })?;
    prepare_dynamic(img, options)
}

/// Prepare an already-decoded image as a luminance field.
pub fn prepare_dynamic(img: DynamicImage, options: &PrepOptions) -> Result<Field, RouteError> {
    if options.target_size == 0 {
        return Err(RouteError::config("target_size must be >= 1".to_string()));
    }

    let gray = img.into_luma8();
    let side = gray.width().min(gray.height());
    let left = (gray.width() - side) / 2;
    let top = (gray.height() - side) / 2;
    let cropped = imageops::crop_imm(&gray, left, top, side, side).to_image();
    let resized = imageops::resize(
        &cropped,
        options.target_size,
        options.target_size,
        imageops::FilterType::Lanczos3,
    );

    let size = options.target_size as usize;
    let mut field = Field::new(size, size);
    for (x, y, pixel) in resized.enumerate_pixels() {
        let v = pixel[0] as f32 / 255.0;
        let v = if options.invert { 1.0 - v } else { v };
        field.set(x as usize, y as usize, v);
    }
    if options.stretch_contrast {
        stretch_contrast(&mut field);
    }
    Ok(field)
}

/// Rescale values to span `[0, 1]`. Flat fields are left untouched.
pub fn stretch_contrast(field: &mut Field) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in &field.data {
        min = min.min(v);
        max = max.max(v);
    }
    if max > min {
        let span = max - min;
        for v in &mut field.data {
            *v = (*v - min) / span;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gradient_image(w: u32, h: u32) -> DynamicImage {
        let img = GrayImage::from_fn(w, h, |x, _| Luma([(x * 255 / w.max(1)) as u8]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn output_is_square_at_target_size() {
        let options = PrepOptions {
            target_size: 64,
            ..Default::default()
        };
        let field = prepare_dynamic(gradient_image(120, 80), &options).unwrap();
        assert_eq!((field.w, field.h), (64, 64));
        assert!(field.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn inversion_flips_bright_and_dark() {
        let base = PrepOptions {
            target_size: 32,
            invert: false,
            stretch_contrast: false,
        };
        let plain = prepare_dynamic(gradient_image(32, 32), &base).unwrap();
        let inverted = prepare_dynamic(
            gradient_image(32, 32),
            &PrepOptions {
                invert: true,
                ..base
            },
        )
        .unwrap();
        for (a, b) in plain.data.iter().zip(&inverted.data) {
            assert!((a + b - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn contrast_stretch_spans_the_unit_range() {
        let mut field = Field::from_raw(2, 2, vec![0.2, 0.3, 0.4, 0.6]).unwrap();
        stretch_contrast(&mut field);
        assert_eq!(field.data[0], 0.0);
        assert_eq!(field.data[3], 1.0);
    }

    #[test]
    fn contrast_stretch_leaves_flat_fields_alone() {
        let mut field = Field::filled(4, 4, 0.5);
        stretch_contrast(&mut field);
        assert!(field.data.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn zero_target_size_is_rejected() {
        let options = PrepOptions {
            target_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            prepare_dynamic(gradient_image(8, 8), &options),
            Err(RouteError::InvalidConfiguration(_))
        ));
    }
}
