use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::MinimapError;
use crate::layout::slot::{Slot, SlotCategory, SlotRecord};

/// The static list of slots every generated scene must fill
#[derive(Debug, Clone, Default)]
pub struct LayoutSpec {
    pub slots: Vec<Slot>,
}

impl LayoutSpec {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LayoutSpec> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open layout file: {:?}", path))?;

        let records: Vec<SlotRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| MinimapError::InvalidLayout(e.to_string()))
            .with_context(|| format!("Failed to parse layout file: {:?}", path))?;

        let layout = Self::from_records(records)
            .with_context(|| format!("Invalid layout in {:?}", path))?;

        log::info!("Loaded {} slots from {:?}", layout.len(), path);
        Ok(layout)
    }

    pub fn from_records(records: Vec<SlotRecord>) -> Result<LayoutSpec, MinimapError> {
        let mut seen = HashSet::new();
        let mut slots = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.name.clone()) {
                return Err(MinimapError::InvalidLayout(format!(
                    "slot '{}' is listed twice",
                    record.name
                )));
            }
            slots.push(Slot::from_record(record)?);
        }

        Ok(LayoutSpec { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    /// Slots of one category, in file order
    pub fn of_category(&self, category: SlotCategory) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(move |slot| slot.category == category)
    }

    pub fn count(&self, category: SlotCategory) -> usize {
        self.of_category(category).count()
    }

    /// Every slot must lie inside the base map it will be drawn onto
    pub fn check_bounds(&self, width: u32, height: u32) -> Result<(), MinimapError> {
        match self.slots.iter().find(|slot| !slot.fits_within(width, height)) {
            Some(slot) => Err(MinimapError::InvalidLayout(format!(
                "slot '{}' ({}, {}, {}x{}) exceeds the {}x{} base map",
                slot.name, slot.x, slot.y, slot.width, slot.height, width, height
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LAYOUT: &str = r#"[
        {"name": "nex_blue", "x": 10, "y": 200, "width": 20, "height": 20},
        {"name": "nex_red", "x": 200, "y": 10, "width": 20, "height": 20},
        {"name": "tower_top_1", "x": 15, "y": 50, "width": 12, "height": 12},
        {"name": "inhib_top", "x": 30, "y": 180, "width": 10, "height": 10},
        {"name": "jungle_gromp", "x": 60, "y": 100, "width": 14, "height": 14},
        {"name": "redblue_blue", "x": 70, "y": 120, "width": 14, "height": 14}
    ]"#;

    #[test]
    fn test_load_layout_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(LAYOUT.as_bytes())?;

        let layout = LayoutSpec::load(file.path())?;
        assert_eq!(layout.len(), 6);
        assert_eq!(layout.count(SlotCategory::Nexus), 2);
        assert_eq!(layout.count(SlotCategory::Tower), 1);
        assert_eq!(layout.count(SlotCategory::BuffCamp), 1);
        assert_eq!(layout.slots[2].name, "tower_top_1");
        Ok(())
    }

    #[test]
    fn test_malformed_layout_is_config_error() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(br#"[{"name": "nex_blue", "x": 10}]"#)?;

        let err = LayoutSpec::load(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MinimapError>(),
            Some(MinimapError::InvalidLayout(_))
        ));
        Ok(())
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let record = SlotRecord {
            name: "tower_1".to_string(),
            x: 0,
            y: 0,
            width: 5,
            height: 5,
        };
        let result = LayoutSpec::from_records(vec![record.clone(), record]);
        assert!(matches!(result, Err(MinimapError::InvalidLayout(_))));
    }

    #[test]
    fn test_bounds_check() -> Result<()> {
        let records: Vec<SlotRecord> = serde_json::from_str(LAYOUT)?;
        let layout = LayoutSpec::from_records(records)?;

        assert!(layout.check_bounds(256, 256).is_ok());
        assert!(layout.check_bounds(219, 256).is_err());
        Ok(())
    }
}
