//! Fog-of-war
//!
//! Every placed object reveals a disc around its center. The union of discs
//! is blurred, inverted and used as the alpha of a black layer, capped below
//! full opacity so the map still shows faintly through the fog.

use crate::bbox::SceneObjects;
use crate::traits::PostProcess;
use crate::Result;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::filter::gaussian_blur_f32;
use minimap_core::MinimapError;
use serde::{Deserialize, Serialize};

use crate::utils::ImageUtils;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    /// Vision radius as a fraction of the object's larger side
    pub vision_scale: f32,
    /// Gaussian sigma softening the visibility edge, in pixels
    pub blur_sigma: f32,
    /// Alpha of fully fogged areas, 0.0..=1.0
    pub max_opacity: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            vision_scale: 0.8,
            blur_sigma: 15.0,
            max_opacity: 0.9,
        }
    }
}

impl FogConfig {
    pub fn validate(&self) -> Result<(), MinimapError> {
        if !(0.0..=1.0).contains(&self.max_opacity) {
            return Err(MinimapError::InvalidConfig(format!(
                "fog max_opacity must be within 0..=1, got {}",
                self.max_opacity
            )));
        }
        if self.vision_scale < 0.0 || self.blur_sigma < 0.0 {
            return Err(MinimapError::InvalidConfig(
                "fog vision_scale and blur_sigma must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityMask {
    config: FogConfig,
}

impl VisibilityMask {
    pub fn new(config: FogConfig) -> Self {
        Self { config }
    }

    /// Blurred union of the objects' vision discs; 255 is fully visible
    pub fn visibility(&self, width: u32, height: u32, objects: &SceneObjects) -> GrayImage {
        let mut mask = GrayImage::new(width, height);

        for object in objects {
            let radius = (object.width.max(object.height) as f32 * self.config.vision_scale) as i32;
            draw_filled_circle_mut(&mut mask, object.center(), radius, Luma([255]));
        }

        if self.config.blur_sigma > 0.0 {
            gaussian_blur_f32(&mask, self.config.blur_sigma)
        } else {
            mask
        }
    }

    /// Black layer whose alpha is the inverted, attenuated visibility
    pub fn fog_layer(&self, width: u32, height: u32, objects: &SceneObjects) -> RgbaImage {
        let visibility = self.visibility(width, height, objects);

        RgbaImage::from_fn(width, height, |x, y| {
            let hidden = 255 - visibility.get_pixel(x, y)[0];
            Rgba([0, 0, 0, (hidden as f32 * self.config.max_opacity) as u8])
        })
    }
}

impl PostProcess for VisibilityMask {
    fn name(&self) -> &str {
        "fog"
    }

    fn apply(&self, canvas: &mut RgbaImage, objects: &SceneObjects) -> Result<()> {
        let (width, height) = canvas.dimensions();
        let fog = self.fog_layer(width, height, objects);
        ImageUtils::paste(canvas, &fog, 0, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::PlacedObject;

    fn scene_with(object: PlacedObject) -> SceneObjects {
        std::iter::once(object).collect()
    }

    #[test]
    fn test_fog_reveals_object_surroundings() -> Result<()> {
        let mut canvas = RgbaImage::from_pixel(200, 200, Rgba([200, 200, 200, 255]));
        let objects = scene_with(PlacedObject::new("Ahri", 20, 20, 40, 40));

        VisibilityMask::default().apply(&mut canvas, &objects)?;

        let near = canvas.get_pixel(40, 40)[0];
        let far = canvas.get_pixel(190, 190)[0];
        assert!(near > 150, "object center should stay visible, got {near}");
        assert!(far < 60, "distant area should be fogged, got {far}");
        // Fog never reaches full black
        assert!(far > 0);
        Ok(())
    }

    #[test]
    fn test_empty_scene_is_uniformly_fogged() {
        let fog = VisibilityMask::default().fog_layer(32, 32, &SceneObjects::new());
        let alpha = (255.0f32 * 0.9) as u8;
        assert!(fog.pixels().all(|pixel| pixel[3] == alpha));
    }

    #[test]
    fn test_unblurred_disc_radius() {
        let mask = VisibilityMask::new(FogConfig {
            blur_sigma: 0.0,
            ..FogConfig::default()
        });
        let objects = scene_with(PlacedObject::new("tower", 40, 40, 20, 10));

        // radius = 0.8 * 20 = 16 around (50, 45)
        let visibility = mask.visibility(100, 100, &objects);
        assert_eq!(visibility.get_pixel(50, 45)[0], 255);
        assert_eq!(visibility.get_pixel(65, 45)[0], 255);
        assert_eq!(visibility.get_pixel(68, 45)[0], 0);
    }

    #[test]
    fn test_invalid_opacity() {
        let config = FogConfig {
            max_opacity: 1.5,
            ..FogConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
