//! Composer configuration

use crate::effects::FogConfig;
use minimap_core::MinimapError;
use serde::{Deserialize, Serialize};

/// Knobs for the randomized phases and the post-processing passes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Upper bound on portraits per scene (fewer if the roster is smaller)
    pub portrait_count: usize,
    pub portrait_size: u32,
    /// Restrict portraits to these identifiers (intersected with the dictionary)
    pub portrait_roster: Option<Vec<String>>,
    pub marker_count: usize,
    pub marker_size: u32,
    /// Recall badges extend this far beyond the portrait on every side
    pub badge_margin: u32,
    pub ring_width: u32,
    pub fog: FogConfig,
    pub degrade_scale: f32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            portrait_count: 15,
            portrait_size: 45,
            portrait_roster: None,
            marker_count: 20,
            marker_size: 30,
            badge_margin: 5,
            ring_width: 2,
            fog: FogConfig::default(),
            degrade_scale: 0.4,
        }
    }
}

impl ComposerConfig {
    pub fn validate(&self) -> Result<(), MinimapError> {
        if self.portrait_size == 0 || self.marker_size == 0 {
            return Err(MinimapError::InvalidConfig(
                "portrait_size and marker_size must be positive".to_string(),
            ));
        }
        if self.ring_width > self.portrait_size / 2 {
            return Err(MinimapError::InvalidConfig(format!(
                "ring_width {} is wider than the portrait radius",
                self.ring_width
            )));
        }
        if !(self.degrade_scale > 0.0 && self.degrade_scale <= 1.0) {
            return Err(MinimapError::InvalidConfig(format!(
                "degrade_scale must be within (0, 1], got {}",
                self.degrade_scale
            )));
        }
        self.fog.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() -> serde_json::Result<()> {
        let json = r#"{
            "marker_count": 5,
            "fog": {"vision_scale": 1.0, "blur_sigma": 4.0, "max_opacity": 0.5}
        }"#;
        let config: ComposerConfig = serde_json::from_str(json)?;
        assert_eq!(config.marker_count, 5);
        assert_eq!(config.portrait_count, 15);
        assert_eq!(config.fog.max_opacity, 0.5);
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ComposerConfig {
            degrade_scale: 0.0,
            ..ComposerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ComposerConfig {
            ring_width: 40,
            ..ComposerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
