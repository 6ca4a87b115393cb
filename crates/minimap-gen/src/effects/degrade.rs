use crate::bbox::SceneObjects;
use crate::traits::PostProcess;
use crate::Result;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use minimap_core::MinimapError;

/// Bilinear down/up-sample that blurs fine detail like a low-quality capture
#[derive(Debug, Clone, Copy)]
pub struct ResolutionDegrader {
    scale: f32,
}

impl ResolutionDegrader {
    pub fn new(scale: f32) -> Result<Self, MinimapError> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(MinimapError::InvalidConfig(format!(
                "degrade scale must be within (0, 1], got {scale}"
            )));
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn degrade(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        let small_width = (width as f32 * self.scale) as u32;
        let small_height = (height as f32 * self.scale) as u32;

        if (small_width, small_height) == (width, height) {
            return Ok(image.clone());
        }
        if small_width == 0 || small_height == 0 {
            return Err(MinimapError::InvalidConfig(format!(
                "degrade scale {} collapses a {}x{} canvas",
                self.scale, width, height
            ))
            .into());
        }

        let small = imageops::resize(image, small_width, small_height, FilterType::Triangle);
        Ok(imageops::resize(&small, width, height, FilterType::Triangle))
    }
}

impl Default for ResolutionDegrader {
    fn default() -> Self {
        Self { scale: 0.4 }
    }
}

impl PostProcess for ResolutionDegrader {
    fn name(&self) -> &str {
        "degrade"
    }

    fn apply(&self, canvas: &mut RgbaImage, _objects: &SceneObjects) -> Result<()> {
        *canvas = self.degrade(canvas)?;
        Ok(())
    }
}
