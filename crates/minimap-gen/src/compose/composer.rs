//! Scene composer
//!
//! Fills every layout slot with a randomly skinned structure or neutral camp,
//! then scatters champion portraits and ping markers at random positions.
//! Later phases are drawn over earlier ones.

use super::config::ComposerConfig;
use crate::bbox::{PlacedObject, SceneObjects};
use crate::catalog::{sample_distinct, AssetCatalog, Badge, CatalogManifest, UsedVariants};
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_circle_mut;
use minimap_core::{ClassDictionary, LayoutSpec, MinimapError, Slot, SlotCategory};
use rand::seq::SliceRandom;
use rand::Rng;

pub const PING_LABEL: &str = "ping";

const RED_RING: Rgba<u8> = Rgba([213, 32, 22, 255]);
const BLUE_RING: Rgba<u8> = Rgba([10, 121, 186, 255]);

/// Cosmetic marking drawn over a portrait; never labeled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    RedRing,
    BlueRing,
    RedRecall,
    BlueRecall,
}

impl Decoration {
    pub const ALL: [Decoration; 4] = [
        Decoration::RedRing,
        Decoration::BlueRing,
        Decoration::RedRecall,
        Decoration::BlueRecall,
    ];
}

/// A composed scene before post-processing
#[derive(Debug, Clone)]
pub struct Scene {
    pub canvas: RgbaImage,
    pub objects: SceneObjects,
    pub used: UsedVariants,
}

impl Scene {
    fn new(base_map: &RgbaImage) -> Self {
        Self {
            canvas: base_map.clone(),
            objects: SceneObjects::new(),
            used: UsedVariants::new(),
        }
    }

    fn insert(&mut self, icon: &RgbaImage, x: u32, y: u32, object: PlacedObject) {
        ImageUtils::paste(&mut self.canvas, icon, x as i64, y as i64);
        self.objects.push(object);
    }
}

/// Composes scenes from shared, read-only inputs
pub struct SceneComposer<'a> {
    base_map: &'a RgbaImage,
    layout: &'a LayoutSpec,
    catalog: &'a AssetCatalog,
    config: &'a ComposerConfig,
    roster: Vec<String>,
}

impl<'a> SceneComposer<'a> {
    /// Check the inputs fit together; failures here are configuration errors
    pub fn new(
        base_map: &'a RgbaImage,
        layout: &'a LayoutSpec,
        catalog: &'a AssetCatalog,
        dictionary: &ClassDictionary,
        config: &'a ComposerConfig,
    ) -> Result<Self> {
        config.validate()?;

        let (width, height) = base_map.dimensions();
        layout.check_bounds(width, height)?;

        let largest_icon = config.portrait_size.max(config.marker_size);
        if largest_icon > width || largest_icon > height {
            return Err(MinimapError::InvalidConfig(format!(
                "{largest_icon}px icons do not fit a {width}x{height} base map"
            ))
            .into());
        }

        for slot in layout.iter() {
            if let Some(category) = CatalogManifest::category_for(slot.category) {
                catalog
                    .variant_keys(category)
                    .with_context(|| format!("No skins for slot '{}'", slot.name))?;
            }
        }

        let roster: Vec<String> = match &config.portrait_roster {
            Some(wanted) => dictionary
                .identifiers()
                .filter(|id| wanted.iter().any(|w| w == id))
                .map(str::to_string)
                .collect(),
            None => dictionary.identifiers().map(str::to_string).collect(),
        };
        if roster.len() < config.portrait_count {
            log::warn!(
                "Portrait roster has {} entries; scenes will hold fewer than {} portraits",
                roster.len(),
                config.portrait_count
            );
        }

        Ok(Self {
            base_map,
            layout,
            catalog,
            config,
            roster,
        })
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Run every placement phase in z-order
    pub fn compose<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Scene> {
        let mut scene = Scene::new(self.base_map);

        for category in [SlotCategory::Nexus, SlotCategory::Tower, SlotCategory::Inhibitor] {
            self.place_structures(&mut scene, category, rng)?;
        }
        self.place_neutral(&mut scene, rng)?;
        self.place_portraits(&mut scene, rng)?;
        self.place_pings(&mut scene, rng)?;

        Ok(scene)
    }

    fn place_structures<R: Rng + ?Sized>(
        &self,
        scene: &mut Scene,
        category: SlotCategory,
        rng: &mut R,
    ) -> Result<()> {
        let Some(catalog_category) = CatalogManifest::category_for(category) else {
            return Ok(());
        };

        for slot in self.layout.of_category(category) {
            let (key, icon) = self
                .catalog
                .variant_for(catalog_category, category.allows_repeat(), &mut scene.used, rng)
                .with_context(|| format!("Failed to fill slot '{}'", slot.name))?;

            self.fill_slot(scene, slot, &icon, key);
        }

        Ok(())
    }

    fn place_neutral<R: Rng + ?Sized>(&self, scene: &mut Scene, rng: &mut R) -> Result<()> {
        let camps = self.layout.count(SlotCategory::JungleCamp);
        let mut pool = self.catalog.shuffled_jungle(rng);
        if camps > pool.len() {
            return Err(MinimapError::pool_exhausted("jungle", camps, pool.len()).into());
        }

        let mut buff = None;
        for slot in self.layout.iter() {
            match slot.category {
                SlotCategory::JungleCamp => {
                    let file = pool
                        .pop()
                        .ok_or_else(|| MinimapError::pool_exhausted("jungle", camps, 0))?;
                    let icon = self.catalog.jungle_image(&file)?;
                    self.fill_slot(scene, slot, &icon, file);
                }
                SlotCategory::BuffCamp => {
                    if buff.is_none() {
                        buff = Some(self.catalog.buff_image()?);
                    }
                    if let Some(icon) = &buff {
                        self.fill_slot(scene, slot, icon, "buff");
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn fill_slot(
        &self,
        scene: &mut Scene,
        slot: &Slot,
        icon: &RgbaImage,
        variant: impl Into<String>,
    ) {
        let icon = ImageUtils::resize(icon, slot.width, slot.height);
        let label = slot.category.label();
        let object =
            PlacedObject::new(label, slot.x, slot.y, slot.width, slot.height).with_variant(variant);
        scene.insert(&icon, slot.x, slot.y, object);
    }

    fn place_portraits<R: Rng + ?Sized>(&self, scene: &mut Scene, rng: &mut R) -> Result<()> {
        let count = self.config.portrait_count.min(self.roster.len());
        if count == 0 {
            return Ok(());
        }

        let red_badge = self.catalog.badge_image(Badge::Red)?;
        let blue_badge = self.catalog.badge_image(Badge::Blue)?;
        let size = self.config.portrait_size;
        let badge_size = size + 2 * self.config.badge_margin;
        let red_badge = ImageUtils::resize(&red_badge, badge_size, badge_size);
        let blue_badge = ImageUtils::resize(&blue_badge, badge_size, badge_size);

        for identifier in sample_distinct("portraits", &self.roster, count, rng)? {
            let portrait = self
                .catalog
                .portrait_image(&identifier)
                .with_context(|| format!("Portrait for '{identifier}' is missing"))?;
            let mut icon = ImageUtils::resize(&portrait, size, size);
            ImageUtils::apply_circular_mask(&mut icon);

            let (x, y) = self.random_position(size, rng);
            let object = PlacedObject::new(identifier.as_str(), x, y, size, size)
                .with_variant(identifier.as_str());
            scene.insert(&icon, x, y, object);

            let decoration = *Decoration::ALL.choose(rng).unwrap_or(&Decoration::RedRing);
            let margin = self.config.badge_margin as i64;
            let (badge_x, badge_y) = (x as i64 - margin, y as i64 - margin);
            match decoration {
                Decoration::RedRing => self.draw_ring(&mut scene.canvas, x, y, RED_RING),
                Decoration::BlueRing => self.draw_ring(&mut scene.canvas, x, y, BLUE_RING),
                Decoration::RedRecall => {
                    ImageUtils::paste(&mut scene.canvas, &red_badge, badge_x, badge_y)
                }
                Decoration::BlueRecall => {
                    ImageUtils::paste(&mut scene.canvas, &blue_badge, badge_x, badge_y)
                }
            }
        }

        Ok(())
    }

    /// Outline drawn on the portrait's edge, growing inwards
    fn draw_ring(&self, canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
        let radius = (self.config.portrait_size / 2) as i32;
        let center = (x as i32 + radius, y as i32 + radius);
        for inset in 0..self.config.ring_width as i32 {
            draw_hollow_circle_mut(canvas, center, radius - inset, color);
        }
    }

    fn place_pings<R: Rng + ?Sized>(&self, scene: &mut Scene, rng: &mut R) -> Result<()> {
        let size = self.config.marker_size;

        for file in self.catalog.sample_pings(self.config.marker_count, rng)? {
            let icon = ImageUtils::resize(&self.catalog.ping_image(&file)?, size, size);
            let (x, y) = self.random_position(size, rng);
            let object = PlacedObject::new(PING_LABEL, x, y, size, size).with_variant(file);
            scene.insert(&icon, x, y, object);
        }

        Ok(())
    }

    /// Uniform top-left corner keeping a `size` square inside the canvas
    fn random_position<R: Rng + ?Sized>(&self, size: u32, rng: &mut R) -> (u32, u32) {
        let (width, height) = self.base_map.dimensions();
        (rng.gen_range(0..=width - size), rng.gen_range(0..=height - size))
    }
}
