//! Core tabular reinforcement learning types for goal-homing agents
//!
//! This crate provides the foundational pieces shared by the trainer and
//! the replayer: the closed action set, position discretization, the
//! Q-table, episode path entries, and the environment adapter that hides
//! the simulation behind a tick-driven interface.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod environment;
pub mod error;
pub mod persist;
pub mod reward;
pub mod state;
pub mod trajectory;
pub mod value;

// Re-export core traits and types
pub use action::{Action, WheelSpeeds};
pub use environment::{drive, EnvironmentAdapter, Pose};
pub use error::{RLError, Result};
pub use reward::{Reward, RewardModel};
pub use state::{Discretizer, Position, State};
pub use trajectory::{Path, PathEntry, OBSTACLE_SENTINEL};
pub use value::{ActionValues, QLearningParams, QTable};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, Discretizer, EnvironmentAdapter, Path, PathEntry, Pose, Position, QTable,
        Result, Reward, State,
    };
}
