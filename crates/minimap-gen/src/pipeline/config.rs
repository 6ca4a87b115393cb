//! Generator configuration

use crate::compose::ComposerConfig;
use crate::export::DEFAULT_IGNORE_LABELS;
use crate::Result;
use anyhow::Context;
use minimap_core::MinimapError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// What a batch does when one scene fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the batch at the first failed scene
    #[default]
    Abort,
    /// Log the failure, count it and continue with the next scene
    Skip,
}

/// Main generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub base_map: PathBuf,
    pub layout_file: PathBuf,
    /// Root of the icon tree the catalog manifest is relative to
    pub icons_dir: PathBuf,
    pub portraits_dir: PathBuf,
    /// Structure/pool manifest; the built-in one when absent
    pub catalog_manifest: Option<PathBuf>,
    /// Where to persist the class dictionary for downstream consumers
    pub classes_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub scenes: usize,
    /// Base seed; drawn at random (and logged) when absent
    pub seed: Option<u64>,
    pub error_policy: ErrorPolicy,
    pub ignore_labels: Vec<String>,
    /// Log progress every this many scenes (0 disables)
    pub progress_every: usize,
    pub composer: ComposerConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_map: "assets/minimap.png".into(),
            layout_file: "assets/locations_item_map.json".into(),
            icons_dir: "assets/icons".into(),
            portraits_dir: "assets/character_items".into(),
            catalog_manifest: None,
            classes_file: None,
            output_dir: "train_images".into(),
            scenes: 5000,
            seed: None,
            error_policy: ErrorPolicy::Abort,
            ignore_labels: DEFAULT_IGNORE_LABELS.iter().map(|s| s.to_string()).collect(),
            progress_every: 500,
            composer: ComposerConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| MinimapError::InvalidConfig(e.to_string()))
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MinimapError> {
        if self.scenes == 0 {
            return Err(MinimapError::InvalidConfig("scenes must be at least 1".to_string()));
        }
        self.composer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_config() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            br#"{"scenes": 3, "seed": 42, "error_policy": "skip",
                "classes_file": "out/classes.json",
                "composer": {"marker_count": 4}}"#,
        )?;

        let config = GeneratorConfig::load(file.path())?;
        assert_eq!(config.scenes, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.error_policy, ErrorPolicy::Skip);
        assert_eq!(config.classes_file, Some(PathBuf::from("out/classes.json")));
        assert_eq!(config.composer.marker_count, 4);
        assert_eq!(config.composer.portrait_count, 15);
        assert_eq!(config.ignore_labels, vec!["nexus", "inhibitor", "ping"]);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_unknown_policy_is_config_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(br#"{"error_policy": "retry"}"#)?;

        let err = GeneratorConfig::load(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MinimapError>(),
            Some(MinimapError::InvalidConfig(_))
        ));
        Ok(())
    }

    #[test]
    fn test_zero_scenes_rejected() {
        let config = GeneratorConfig {
            scenes: 0,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
