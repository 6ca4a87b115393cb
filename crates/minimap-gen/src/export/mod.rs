//! Label export and scene persistence

pub mod labels;
pub mod writer;

pub use labels::{LabelExporter, LabelRecord, DEFAULT_IGNORE_LABELS};
pub use writer::{SceneId, SceneWriter, WrittenScene};
