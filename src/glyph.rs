//! Turns a glyph image into a sensor vector.
//!
//! Decoding, resizing and normalizing only; segmentation and feature
//! extraction belong to whatever produces the image.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::Result;

/// How an image is reduced to `width * height` sensor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphOptions {
    pub width: u32,
    pub height: u32,
    /// When set, pixels at or above this luma become `1.0` and the rest `0.0`.
    pub threshold: Option<u8>,
    /// Flip the result so dark ink on light paper reads as high values.
    pub invert: bool,
}

impl GlyphOptions {
    pub fn new(width: u32, height: u32) -> Self {
        GlyphOptions {
            width,
            height,
            threshold: None,
            invert: false,
        }
    }

    pub fn sensor_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

pub fn image_to_input<P: AsRef<Path>>(path: P, options: &GlyphOptions) -> Result<Vec<f64>> {
    let img = image::open(path)?;
    Ok(to_input(&img, options))
}

/// Decodes image bytes (PNG/JPEG/BMP/GIF) and converts them like
/// [`image_to_input`].
pub fn image_bytes_to_input(bytes: &[u8], options: &GlyphOptions) -> Result<Vec<f64>> {
    let img = image::load_from_memory(bytes)?;
    Ok(to_input(&img, options))
}

fn to_input(img: &DynamicImage, options: &GlyphOptions) -> Vec<f64> {
    let gray = if GenericImageView::dimensions(img) == (options.width, options.height) {
        img.to_luma8()
    } else {
        img.resize_exact(options.width, options.height, FilterType::Lanczos3)
            .to_luma8()
    };
    gray.pixels()
        .map(|p| {
            let luma = p.0[0];
            let value = match options.threshold {
                Some(t) => {
                    if luma >= t {
                        1.0
                    } else {
                        0.0
                    }
                }
                None => luma as f64 / 255.0,
            };
            if options.invert {
                1.0 - value
            } else {
                value
            }
        })
        .collect()
}
