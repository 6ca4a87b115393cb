//! Asset directory scanning

use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Lists and resolves image files inside asset directories
#[derive(Debug, Clone)]
pub struct AssetLoader {
    supported_extensions: Vec<String>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self {
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Loader accepting only the given extensions
    pub fn with_extensions(extensions: &[&str]) -> Self {
        Self {
            supported_extensions: extensions.iter().map(|ext| ext.to_lowercase()).collect(),
        }
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.supported_extensions.contains(&ext))
    }

    /// File names of supported images in `dir`, sorted so pools are
    /// enumerated identically on every platform
    pub fn list_images(&self, dir: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory: {:?}", dir))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && self.is_supported(&path) {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();

        Ok(names)
    }

    /// Resolve `file_name` inside `dir`, falling back to a case-insensitive match
    pub fn find_file(&self, dir: &Path, file_name: &str) -> Option<PathBuf> {
        let path = dir.join(file_name);
        if path.is_file() {
            return Some(path);
        }

        let wanted = file_name.to_lowercase();
        fs::read_dir(dir)
            .ok()?
            .flatten()
            .find(|entry| entry.file_name().to_string_lossy().to_lowercase() == wanted)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}
