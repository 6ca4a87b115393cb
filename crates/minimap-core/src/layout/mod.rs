pub mod data;
pub mod slot;

pub use data::LayoutSpec;
pub use slot::{Slot, SlotCategory};
