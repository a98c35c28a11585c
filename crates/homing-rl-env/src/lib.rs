//! Synthetic arenas for goal-homing agents
//!
//! This crate provides:
//! - A ticked differential-drive arena with proximity sensors and obstacles
//! - A registry of named arena layouts
//! - Wrappers such as a host tick limit

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arena;
pub mod registry;
pub mod wrappers;

// Re-export environments
pub use arena::{ArenaConfig, Obstacle, SimulatedArena, SENSOR_BEARINGS};
pub use registry::{layout_config, list_layouts, make_arena, register_layout, ArenaRegistry};
pub use wrappers::TickLimit;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{make_arena, ArenaConfig, SimulatedArena, TickLimit};
    pub use homing_rl_core::prelude::*;
}
