//! Minimap scene generator
//!
//! Composites map iconography onto a base minimap and exports detector
//! labels for every generated image.

pub mod bbox;
pub mod catalog;
pub mod compose;
pub mod effects;
pub mod export;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use bbox::{PlacedObject, SceneObjects};
pub use catalog::{AssetCatalog, CatalogManifest, UsedVariants};
pub use compose::{ComposerConfig, Scene, SceneComposer};
pub use effects::{FogConfig, ResolutionDegrader, VisibilityMask};
pub use export::{LabelExporter, LabelRecord, SceneWriter};
pub use pipeline::{BatchSummary, ErrorPolicy, Generator, GeneratorConfig};

// Error handling
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Core traits for the generator
pub mod traits {
    use super::*;
    use image::RgbaImage;

    /// A whole-canvas pass run after every object has been placed
    pub trait PostProcess {
        fn name(&self) -> &str;
        fn apply(&self, canvas: &mut RgbaImage, objects: &SceneObjects) -> Result<()>;
    }
}
