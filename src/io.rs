//! Disk helpers for fields, rendered previews, and JSON reports.

use std::fs;
use std::path::Path;

use image::{GrayImage, Luma, RgbImage};
use serde::Serialize;

use crate::error::RouteError;
use crate::field::Field;

/// Save a field to a grayscale PNG, mapping `[0, 1]` onto `[0, 255]`.
pub fn save_field_png(field: &Field, path: &Path) -> Result<(), RouteError> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(field.w as u32, field.h as u32);
    for y in 0..field.h {
        for (x, &v) in field.row(y).iter().enumerate() {
            let byte = (v.clamp(0.0, 1.0) * 255.0) as u8;
            out.put_pixel(x as u32, y as u32, Luma([byte]));
        }
    }
    out.save(path).map_err(|e| RouteError::Image {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save a rendered RGB preview to a PNG.
pub fn save_rgb_png(img: &RgbImage, path: &Path) -> Result<(), RouteError> {
    ensure_parent_dir(path)?;
    img.save(path).map_err(|e| RouteError::Image {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), RouteError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| RouteError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), RouteError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| RouteError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}
