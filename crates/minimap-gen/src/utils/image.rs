//! Image loading, resizing and compositing helpers

use crate::Result;
use anyhow::Context;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::path::Path;

/// Image utility functions shared by the composer and the effects
pub struct ImageUtils;

impl ImageUtils {
    /// Load any supported image as RGBA
    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        let image = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgba8();

        Ok(image)
    }

    /// Save losslessly as PNG regardless of the file extension
    pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
        image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to save image: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// High-quality resize used for icons
    pub fn resize(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        if image.dimensions() == (width, height) {
            return image.clone();
        }
        imageops::resize(image, width, height, FilterType::Lanczos3)
    }

    /// Replace the alpha channel with a disc inscribed in the image
    pub fn apply_circular_mask(image: &mut RgbaImage) {
        let (width, height) = image.dimensions();
        let mut mask = GrayImage::new(width, height);
        let radius = (width.min(height) / 2) as i32;
        draw_filled_circle_mut(
            &mut mask,
            ((width / 2) as i32, (height / 2) as i32),
            radius,
            Luma([255]),
        );

        for (pixel, alpha) in image.pixels_mut().zip(mask.pixels()) {
            pixel[3] = alpha[0];
        }
    }

    /// Alpha-over `top` onto `canvas` at a possibly negative offset
    pub fn paste(canvas: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(canvas, top, x, y);
    }
}
