use serde::{Deserialize, Serialize};

use crate::error::MinimapError;

/// What kind of object a slot receives, resolved once from the slot name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotCategory {
    /// Fixed-role objective (one per side), distinct skin per slot
    Nexus,
    /// Tiered structure, distinct skin per slot
    Tower,
    /// Paired structure, skins may repeat
    Inhibitor,
    /// Neutral camp filled from the shuffled jungle pool
    JungleCamp,
    /// Neutral camp always drawn with the fixed buff image
    BuffCamp,
}

impl SlotCategory {
    const PREFIXES: [(&'static str, SlotCategory); 5] = [
        ("nex_", SlotCategory::Nexus),
        ("tower_", SlotCategory::Tower),
        ("inhib_", SlotCategory::Inhibitor),
        ("jungle_", SlotCategory::JungleCamp),
        ("redblue_", SlotCategory::BuffCamp),
    ];

    pub fn from_slot_name(name: &str) -> Result<Self, MinimapError> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, category)| *category)
            .ok_or_else(|| {
                MinimapError::InvalidLayout(format!("slot '{name}' has no known category prefix"))
            })
    }

    /// Label every object placed in a slot of this category is recorded under
    pub fn label(&self) -> &'static str {
        match self {
            SlotCategory::Nexus => "nexus",
            SlotCategory::Tower => "tower",
            SlotCategory::Inhibitor => "inhibitor",
            SlotCategory::JungleCamp | SlotCategory::BuffCamp => "jungle",
        }
    }

    /// Whether the same variant may fill several slots of one scene
    pub fn allows_repeat(&self) -> bool {
        matches!(self, SlotCategory::Inhibitor)
    }
}

/// Raw slot record as stored in the layout file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRecord {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A fixed placement region that every scene fills exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub name: String,
    pub category: SlotCategory,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Slot {
    pub fn from_record(record: SlotRecord) -> Result<Self, MinimapError> {
        let category = SlotCategory::from_slot_name(&record.name)?;

        if record.width == 0 || record.height == 0 {
            return Err(MinimapError::InvalidLayout(format!(
                "slot '{}' has an empty box",
                record.name
            )));
        }

        Ok(Self {
            name: record.name,
            category,
            x: record.x,
            y: record.y,
            width: record.width,
            height: record.height,
        })
    }

    /// Right and bottom edges (exclusive)
    pub fn extent(&self) -> (u64, u64) {
        (
            self.x as u64 + self.width as u64,
            self.y as u64 + self.height as u64,
        )
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let (right, bottom) = self.extent();
        right <= width as u64 && bottom <= height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> SlotRecord {
        SlotRecord {
            name: name.to_string(),
            x: 10,
            y: 20,
            width: 30,
            height: 40,
        }
    }

    #[test]
    fn test_category_from_prefix() {
        assert_eq!(SlotCategory::from_slot_name("nex_blue").unwrap(), SlotCategory::Nexus);
        assert_eq!(SlotCategory::from_slot_name("tower_top_1").unwrap(), SlotCategory::Tower);
        assert_eq!(SlotCategory::from_slot_name("inhib_mid").unwrap(), SlotCategory::Inhibitor);
        assert_eq!(SlotCategory::from_slot_name("jungle_krugs").unwrap(), SlotCategory::JungleCamp);
        assert_eq!(SlotCategory::from_slot_name("redblue_1").unwrap(), SlotCategory::BuffCamp);
        assert!(SlotCategory::from_slot_name("dragon_pit").is_err());
    }

    #[test]
    fn test_shared_labels() {
        assert_eq!(SlotCategory::JungleCamp.label(), SlotCategory::BuffCamp.label());
        assert!(SlotCategory::Inhibitor.allows_repeat());
        assert!(!SlotCategory::Tower.allows_repeat());
    }

    #[test]
    fn test_slot_bounds() {
        let slot = Slot::from_record(record("tower_1")).unwrap();
        assert!(slot.fits_within(40, 60));
        assert!(!slot.fits_within(39, 60));
        assert!(!slot.fits_within(40, 59));
    }

    #[test]
    fn test_empty_box_rejected() {
        let mut empty = record("tower_1");
        empty.width = 0;
        assert!(matches!(
            Slot::from_record(empty),
            Err(MinimapError::InvalidLayout(_))
        ));
    }
}
