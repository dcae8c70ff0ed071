//! Occupancy systems.

pub mod settings;
pub mod update;

pub use settings::apply_occupancy_settings;
pub use update::{snapshot_scene, update_occupancy};
