//! YOLO-style label records
//!
//! One line per exported object: `<class_id> <x_center> <y_center> <width> <height>`,
//! all coordinates normalized by the image size and printed with six decimals.

use crate::bbox::{PlacedObject, SceneObjects};
use crate::Result;
use anyhow::Context;
use minimap_core::{ClassDictionary, MinimapError};
use std::fmt;

/// Bookkeeping labels that never become detector classes
pub const DEFAULT_IGNORE_LABELS: [&str; 3] = ["nexus", "inhibitor", "ping"];

/// One normalized detection record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRecord {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRecord {
    pub fn from_object(
        class_id: u32,
        object: &PlacedObject,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let (cx, cy) = object.center_f64();
        Self {
            class_id,
            x_center: cx / image_width as f64,
            y_center: cy / image_height as f64,
            width: object.width as f64 / image_width as f64,
            height: object.height as f64 / image_height as f64,
        }
    }

    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            anyhow::bail!("Expected 5 fields in label line, got {}: '{}'", fields.len(), line);
        }

        let class_id = fields[0]
            .parse()
            .with_context(|| format!("Invalid class id: '{}'", fields[0]))?;
        let mut values = [0.0f64; 4];
        for (value, field) in values.iter_mut().zip(&fields[1..]) {
            *value = field
                .parse()
                .with_context(|| format!("Invalid coordinate: '{}'", field))?;
        }

        Ok(Self {
            class_id,
            x_center: values[0],
            y_center: values[1],
            width: values[2],
            height: values[3],
        })
    }

    /// Pixel box `(x, y, width, height)` against the given image size
    pub fn to_pixels(&self, image_width: u32, image_height: u32) -> (f64, f64, f64, f64) {
        let width = self.width * image_width as f64;
        let height = self.height * image_height as f64;
        (
            self.x_center * image_width as f64 - width / 2.0,
            self.y_center * image_height as f64 - height / 2.0,
            width,
            height,
        )
    }
}

impl fmt::Display for LabelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// Turns a scene's objects into label records
#[derive(Debug, Clone)]
pub struct LabelExporter {
    ignore_labels: Vec<String>,
}

impl LabelExporter {
    pub fn new<S: AsRef<str>>(ignore_labels: &[S]) -> Self {
        Self {
            ignore_labels: ignore_labels.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn is_ignored(&self, label: &str) -> bool {
        self.ignore_labels
            .iter()
            .any(|prefix| label == prefix || label.starts_with(prefix.as_str()))
    }

    /// Records for every object that is neither ignored nor unknown to the dictionary
    pub fn records(
        &self,
        objects: &SceneObjects,
        image_width: u32,
        image_height: u32,
        dictionary: &ClassDictionary,
    ) -> Result<Vec<LabelRecord>> {
        if dictionary.is_empty() {
            return Err(MinimapError::EmptyDictionary.into());
        }

        let mut records = Vec::new();
        for object in objects {
            if self.is_ignored(&object.label) {
                log::trace!("Skipping ignored label '{}'", object.label);
                continue;
            }
            let Some(class_id) = dictionary.get(&object.label) else {
                log::trace!("Skipping label '{}' absent from the class dictionary", object.label);
                continue;
            };
            records.push(LabelRecord::from_object(class_id, object, image_width, image_height));
        }

        Ok(records)
    }

    /// Label file contents, one newline-terminated line per record
    pub fn render(
        &self,
        objects: &SceneObjects,
        image_width: u32,
        image_height: u32,
        dictionary: &ClassDictionary,
    ) -> Result<String> {
        let records = self.records(objects, image_width, image_height, dictionary)?;
        Ok(records.iter().map(|record| format!("{record}\n")).collect())
    }
}

impl Default for LabelExporter {
    fn default() -> Self {
        Self::new(&DEFAULT_IGNORE_LABELS)
    }
}
