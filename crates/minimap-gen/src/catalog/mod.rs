//! Asset catalog
//!
//! Resolves structure categories to skin variants and enumerates the bulk
//! pools (jungle props, ping markers, portraits, recall badges). Built once
//! and shared read-only; per-scene selection state lives in [`UsedVariants`].

pub mod loader;

pub use loader::AssetLoader;

use crate::Result;
use anyhow::Context;
use image::RgbaImage;
use minimap_core::{ClassDictionary, MinimapError, SlotCategory};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::utils::ImageUtils;

/// Where every asset family lives, relative to the asset root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogManifest {
    /// category -> variant key -> image path
    pub structures: BTreeMap<String, BTreeMap<String, PathBuf>>,
    pub jungle_dir: PathBuf,
    /// Fixed image for buff camps, excluded from the jungle pool
    pub buff_image: PathBuf,
    pub ping_dir: PathBuf,
    pub red_badge: PathBuf,
    pub blue_badge: PathBuf,
}

impl CatalogManifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open catalog manifest: {:?}", path))?;
        let manifest = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| MinimapError::InvalidConfig(e.to_string()))
            .with_context(|| format!("Failed to parse catalog manifest: {:?}", path))?;

        Ok(manifest)
    }

    /// Catalog category backing a structure slot
    pub fn category_for(slot: SlotCategory) -> Option<&'static str> {
        match slot {
            SlotCategory::Nexus => Some("nexus"),
            SlotCategory::Tower => Some("tower"),
            SlotCategory::Inhibitor => Some("inhibitor"),
            SlotCategory::JungleCamp | SlotCategory::BuffCamp => None,
        }
    }
}

fn variants(dir: &str, files: &[&str]) -> BTreeMap<String, PathBuf> {
    files
        .iter()
        .map(|file| (file.to_string(), Path::new(dir).join(format!("{file}.png"))))
        .collect()
}

impl Default for CatalogManifest {
    fn default() -> Self {
        let mut structures = BTreeMap::new();
        structures.insert(
            "nexus".to_string(),
            variants("nexus", &["nexus_blue", "nexus_red", "nexus_died"]),
        );
        structures.insert(
            "tower".to_string(),
            variants(
                "towers",
                &[
                    "tower_died",
                    "tower_died_low",
                    "tower_died_medium",
                    "tower_blue_bounty",
                    "tower_blue_low_bounty",
                    "tower_blue_low_bounty_wiouth",
                    "tower_blue_medium_bounty",
                    "tower_blue_medium_bounty_wiouth",
                    "tower_red_bounty",
                    "tower_red_bounty_wiouth",
                    "tower_red_low_bounty",
                    "tower_red_low_bounty_wiouth",
                    "tower_red_medium_bounty",
                    "tower_red_medium_bounty_wiouth",
                    "turret_1plate",
                    "turret_2plate",
                    "turret_3plate",
                    "turret_4plate",
                    "turret_5plate",
                    "turret_red_1plate",
                    "turret_red_2plate",
                    "turret_red_3plate",
                    "turret_red_4plate",
                    "turret_red_5plate",
                    "turret_blue_1plate",
                    "turret_blue_2plate",
                    "turret_blue_3plate",
                    "turret_blue_4plate",
                    "turret_blue_5plate",
                ],
            ),
        );
        structures.insert(
            "inhibitor".to_string(),
            variants("inhib", &["inhibitor_died", "inhibitor_blue", "inhibitor_red"]),
        );

        Self {
            structures,
            jungle_dir: "jungle".into(),
            buff_image: "jungle/blue_red.png".into(),
            ping_dir: "pings".into(),
            red_badge: "recall/red_recall.png".into(),
            blue_badge: "recall/blue_recall.png".into(),
        }
    }
}

/// Variant keys already drawn in the current scene, per category
#[derive(Debug, Clone, Default)]
pub struct UsedVariants {
    used: HashMap<String, HashSet<String>>,
}

impl UsedVariants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, category: &str, key: &str) -> bool {
        self.used.get(category).is_some_and(|keys| keys.contains(key))
    }

    pub fn record(&mut self, category: &str, key: &str) {
        self.used.entry(category.to_string()).or_default().insert(key.to_string());
    }

    pub fn count(&self, category: &str) -> usize {
        self.used.get(category).map_or(0, HashSet::len)
    }
}

/// Recall badge colors drawn around portraits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Red,
    Blue,
}

/// Read-only view over the on-disk asset tree
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
    portraits_dir: PathBuf,
    manifest: CatalogManifest,
    loader: AssetLoader,
    jungle_pool: Vec<String>,
    ping_pool: Vec<String>,
}

impl AssetCatalog {
    /// Scan the asset tree. Missing directories are configuration errors.
    pub fn build<P: AsRef<Path>, Q: AsRef<Path>>(
        root: P,
        portraits_dir: Q,
        manifest: CatalogManifest,
    ) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let portraits_dir = portraits_dir.as_ref().to_path_buf();

        for dir in [
            root.clone(),
            root.join(&manifest.jungle_dir),
            root.join(&manifest.ping_dir),
            portraits_dir.clone(),
        ] {
            if !dir.is_dir() {
                return Err(MinimapError::MissingDirectory(dir).into());
            }
        }

        let loader = AssetLoader::new();
        let buff_name = manifest
            .buff_image
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        let jungle_pool: Vec<String> = loader
            .list_images(&root.join(&manifest.jungle_dir))?
            .into_iter()
            .filter(|name| Some(name) != buff_name.as_ref())
            .collect();
        let ping_pool =
            AssetLoader::with_extensions(&["png"]).list_images(&root.join(&manifest.ping_dir))?;

        log::info!(
            "Asset catalog at {:?}: {} structure categories, {} jungle props, {} pings",
            root,
            manifest.structures.len(),
            jungle_pool.len(),
            ping_pool.len()
        );

        Ok(Self {
            root,
            portraits_dir,
            manifest,
            loader,
            jungle_pool,
            ping_pool,
        })
    }

    pub fn jungle_pool(&self) -> &[String] {
        &self.jungle_pool
    }

    pub fn ping_pool(&self) -> &[String] {
        &self.ping_pool
    }

    pub fn variant_keys(&self, category: &str) -> Result<Vec<&str>> {
        let variants = self
            .manifest
            .structures
            .get(category)
            .ok_or_else(|| MinimapError::UnknownCategory(category.to_string()))?;

        Ok(variants.keys().map(String::as_str).collect())
    }

    /// Draw one skin for `category`. Without `allow_repeat`, keys already in
    /// `used` are excluded and an empty candidate set is an error.
    pub fn variant_for<R: Rng + ?Sized>(
        &self,
        category: &str,
        allow_repeat: bool,
        used: &mut UsedVariants,
        rng: &mut R,
    ) -> Result<(String, RgbaImage)> {
        let variants = self
            .manifest
            .structures
            .get(category)
            .ok_or_else(|| MinimapError::UnknownCategory(category.to_string()))?;

        let candidates: Vec<&String> = variants
            .keys()
            .filter(|key| allow_repeat || !used.contains(category, key))
            .collect();

        let Some(key) = candidates.choose(rng).copied() else {
            return Err(MinimapError::pool_exhausted(
                category,
                used.count(category) + 1,
                variants.len(),
            )
            .into());
        };

        used.record(category, key);
        let image = self.load_asset(key, &self.root.join(&variants[key]))?;

        Ok((key.clone(), image))
    }

    /// Jungle pool in random order; each entry may be used once per scene
    pub fn shuffled_jungle<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let mut pool = self.jungle_pool.clone();
        pool.shuffle(rng);
        pool
    }

    /// Draw `count` distinct ping files
    pub fn sample_pings<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<String>> {
        sample_distinct("pings", &self.ping_pool, count, rng)
    }

    pub fn jungle_image(&self, file_name: &str) -> Result<RgbaImage> {
        let path = self.root.join(&self.manifest.jungle_dir).join(file_name);
        self.load_asset(file_name, &path)
    }

    pub fn buff_image(&self) -> Result<RgbaImage> {
        self.load_asset("buff", &self.root.join(&self.manifest.buff_image))
    }

    pub fn ping_image(&self, file_name: &str) -> Result<RgbaImage> {
        let path = self.root.join(&self.manifest.ping_dir).join(file_name);
        self.load_asset(file_name, &path)
    }

    pub fn badge_image(&self, badge: Badge) -> Result<RgbaImage> {
        let (key, path) = match badge {
            Badge::Red => ("red_badge", &self.manifest.red_badge),
            Badge::Blue => ("blue_badge", &self.manifest.blue_badge),
        };
        self.load_asset(key, &self.root.join(path))
    }

    pub fn portrait_image(&self, identifier: &str) -> Result<RgbaImage> {
        let file_name = ClassDictionary::portrait_file_name(identifier);
        let path = self
            .loader
            .find_file(&self.portraits_dir, &file_name)
            .unwrap_or_else(|| self.portraits_dir.join(&file_name));
        self.load_asset(identifier, &path)
    }

    fn load_asset(&self, key: &str, path: &Path) -> Result<RgbaImage> {
        if !path.is_file() {
            return Err(MinimapError::MissingAsset {
                key: key.to_string(),
                path: path.to_path_buf(),
            }
            .into());
        }
        ImageUtils::load_rgba(path)
    }
}

/// Sample without replacement; asking for more than the pool holds fails
pub fn sample_distinct<R: Rng + ?Sized>(
    pool_name: &str,
    pool: &[String],
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    if count > pool.len() {
        return Err(MinimapError::pool_exhausted(pool_name, count, pool.len()).into());
    }

    Ok(pool.choose_multiple(rng, count).cloned().collect())
}
