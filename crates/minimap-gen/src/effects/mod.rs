//! Post-processing passes applied to a composed scene

pub mod degrade;
pub mod fog;

pub use degrade::ResolutionDegrader;
pub use fog::{FogConfig, VisibilityMask};
