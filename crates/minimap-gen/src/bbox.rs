//! Placed objects and the per-scene object list
//!
//! Ground truth of a scene: every image composited onto the canvas, in
//! z-order, with the label it is recorded under.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where and under which label an image was composited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub label: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Catalog variant or pool file the image came from
    pub variant: Option<String>,
}

impl PlacedObject {
    pub fn new(label: impl Into<String>, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            width,
            height,
            variant: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Integer pixel center
    pub fn center(&self) -> (i32, i32) {
        (
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }

    /// Exact center, as exported in label files
    pub fn center_f64(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// Append-only object list of one scene; insertion order is z-order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneObjects {
    objects: Vec<PlacedObject>,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: PlacedObject) {
        self.objects.push(object);
    }

    pub fn as_slice(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlacedObject> {
        self.objects.iter()
    }

    pub fn with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a PlacedObject> + 'a {
        self.objects.iter().filter(move |object| object.label == label)
    }

    pub fn group_by_label(&self) -> HashMap<&str, Vec<&PlacedObject>> {
        let mut groups: HashMap<&str, Vec<&PlacedObject>> = HashMap::new();

        for object in &self.objects {
            groups.entry(object.label.as_str()).or_default().push(object);
        }

        groups
    }

    /// Number of objects per label
    pub fn label_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for object in &self.objects {
            *counts.entry(object.label.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl IntoIterator for SceneObjects {
    type Item = PlacedObject;
    type IntoIter = std::vec::IntoIter<PlacedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

impl<'a> IntoIterator for &'a SceneObjects {
    type Item = &'a PlacedObject;
    type IntoIter = std::slice::Iter<'a, PlacedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

impl FromIterator<PlacedObject> for SceneObjects {
    fn from_iter<T: IntoIterator<Item = PlacedObject>>(iter: T) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}
