//! Portrait identifier to detector class id mapping
//!
//! Ids are handed out densely in file-name order, so building the dictionary
//! twice from the same directory always yields the same mapping. Generation
//! and training must agree on it or labels silently point at wrong classes.

use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MinimapError;

pub const PORTRAIT_PREFIX: &str = "square_";
pub const PORTRAIT_SUFFIX: &str = ".png";

/// Marker carried by placeholder portraits that must never become classes
const PLACEHOLDER_MARKER: &str = "generic";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDictionary {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl ClassDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the identifier from a `square_<id>.png` file name
    pub fn identifier_from_file_name(file_name: &str) -> Option<&str> {
        let stem = file_name.strip_prefix(PORTRAIT_PREFIX)?;
        let split = stem.len().checked_sub(PORTRAIT_SUFFIX.len())?;
        if !stem.is_char_boundary(split) || !stem[split..].eq_ignore_ascii_case(PORTRAIT_SUFFIX) {
            return None;
        }

        let id = &stem[..split];
        (!id.is_empty()).then_some(id)
    }

    pub fn portrait_file_name(identifier: &str) -> String {
        format!("{PORTRAIT_PREFIX}{identifier}{PORTRAIT_SUFFIX}")
    }

    /// Build from a directory of portrait images
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(MinimapError::MissingDirectory(dir.to_path_buf()).into());
        }

        let mut file_names = Vec::new();
        let entries =
            fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;
        for entry in entries {
            let entry = entry?;
            // follows symlinks, like the catalog's portrait lookup
            if entry.path().is_file() {
                file_names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        // read_dir order is platform dependent
        file_names.sort();

        let mut dictionary = Self::new();
        for file_name in &file_names {
            if let Some(identifier) = Self::identifier_from_file_name(file_name) {
                dictionary.insert(identifier);
            }
        }

        log::info!("Built class dictionary with {} classes from {:?}", dictionary.len(), dir);
        Ok(dictionary)
    }

    /// Copy every non-placeholder portrait found under `source` into `dest`,
    /// then build the dictionary from `dest`.
    pub fn prepare_portraits<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<Self> {
        let source = source.as_ref();
        let dest = dest.as_ref();
        if !source.is_dir() {
            return Err(MinimapError::MissingDirectory(source.to_path_buf()).into());
        }
        fs::create_dir_all(dest)
            .with_context(|| format!("Failed to create directory: {:?}", dest))?;

        let mut portraits = Vec::new();
        collect_portraits(source, &mut portraits)?;

        let mut copied = 0;
        for path in portraits {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let target = dest.join(file_name);
            match fs::copy(&path, &target) {
                Ok(_) => copied += 1,
                Err(e) => log::warn!("Failed to copy {:?}: {}", path, e),
            }
        }
        log::info!("Copied {} portraits into {:?}", copied, dest);

        Self::from_dir(dest)
    }

    /// Append an identifier, returning its id. Known identifiers keep their id.
    pub fn insert(&mut self, identifier: &str) -> u32 {
        if let Some(&id) = self.ids.get(identifier) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(identifier.to_string());
        self.ids.insert(identifier.to_string(), id);
        id
    }

    pub fn get(&self, identifier: &str) -> Option<u32> {
        self.ids.get(identifier).copied()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.ids.contains_key(identifier)
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Identifiers in id order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if self.is_empty() {
            return Err(MinimapError::EmptyDictionary.into());
        }

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize class dictionary")?;
        fs::write(path, json).with_context(|| format!("Failed to write classes to: {:?}", path))?;

        log::info!("Saved {} classes to {:?}", self.len(), path);
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read classes file: {:?}", path))?;
        let raw: HashMap<String, u32> = serde_json::from_str(&text)
            .map_err(|e| MinimapError::InvalidClassFile(e.to_string()))
            .with_context(|| format!("Failed to parse classes file: {:?}", path))?;

        Ok(Self::from_ids(raw)?)
    }

    /// Rebuild from an `identifier -> id` map whose ids must be exactly `0..n`
    pub fn from_ids(raw: HashMap<String, u32>) -> Result<Self, MinimapError> {
        let mut pairs: Vec<(String, u32)> = raw.into_iter().collect();
        pairs.sort_by_key(|(_, id)| *id);

        let mut dictionary = Self::new();
        for (expected, (identifier, id)) in pairs.into_iter().enumerate() {
            if id as usize != expected {
                return Err(MinimapError::InvalidClassFile(format!(
                    "ids are not dense: '{identifier}' has id {id}, expected {expected}"
                )));
            }
            dictionary.insert(&identifier);
        }

        Ok(dictionary)
    }
}

impl Serialize for ClassDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len()))?;
        for (id, name) in self.names.iter().enumerate() {
            map.serialize_entry(name, &id)?;
        }
        map.end()
    }
}

fn collect_portraits(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_portraits(&path, found)?;
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        let is_placeholder = file_name.to_lowercase().contains(PLACEHOLDER_MARKER);
        if !is_placeholder && ClassDictionary::identifier_from_file_name(&file_name).is_some() {
            found.push(path);
        }
    }

    Ok(())
}
