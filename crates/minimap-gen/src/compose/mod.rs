//! Scene composition

pub mod composer;
pub mod config;

pub use composer::{Decoration, Scene, SceneComposer, PING_LABEL};
pub use config::ComposerConfig;
