//! Tabular Q-learning trainer and path replayer for goal-homing agents
//!
//! This crate provides:
//! - An epsilon-greedy policy engine that probes each action for one tick
//! - An obstacle guard that overrides the policy with an evasive maneuver
//! - Episode bookkeeping with efficiency bonuses and pose resets
//! - Best-path tracking and open-loop replay of the stored path

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod best_path;
pub mod config;
pub mod episode;
pub mod guard;
pub mod policy;
pub mod replay;
pub mod report;
pub mod trainer;

// Re-export the training loop
pub use trainer::Trainer;
pub use replay::{ReplayOutcome, Replayer};

// Re-export components
pub use best_path::BestPathTracker;
pub use episode::{Episode, EpisodeManager, EpisodeStatus, FinishedEpisode};
pub use guard::{execute_maneuver, ObstacleGuard};
pub use policy::{PolicyEngine, Selection, SelectionMode};
pub use report::{EpisodeSummary, RunOutcome, RunReport};

// Re-export configuration
pub use config::{
    EvasionManeuver, GuardConfig, LearningConfig, MotionConfig, ReplayConfig, RewardConfig,
    StorageConfig, TrainingConfig,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ReplayConfig, ReplayOutcome, Replayer, RunOutcome, RunReport, Trainer, TrainingConfig,
    };
    pub use homing_rl_core::prelude::*;
}
