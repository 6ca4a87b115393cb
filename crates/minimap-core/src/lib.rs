//! Minimap data model
//!
//! Layout slots, the class dictionary and the error taxonomy shared by the
//! generator crates.

pub mod classes;
pub mod error;
pub mod layout;

pub use classes::ClassDictionary;
pub use error::MinimapError;
pub use layout::{LayoutSpec, Slot, SlotCategory};
