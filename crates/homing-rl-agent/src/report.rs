//! Run reports

use std::path::Path as FsPath;

use chrono::{DateTime, Utc};
use homing_rl_core::{persist, Position};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a training run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// An episode used up the step budget
    StepBudgetExceeded,
    /// The host simulation stopped advancing
    HostStopped,
    /// The configured number of successful episodes was reached
    EpisodeLimitReached,
    /// A shutdown signal arrived
    Interrupted,
}

/// Summary of one goal-reaching episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// One-based episode number
    pub episode: usize,
    /// Position when the goal was detected
    pub final_position: Position,
    /// Steps taken
    pub steps: usize,
    /// Total reward including the efficiency bonus
    pub reward: f64,
    /// Efficiency bonus granted
    pub bonus: f64,
    /// Obstacle evasions performed
    pub evasions: usize,
    /// Whether this episode produced a new best path
    pub new_best: bool,
}

/// Summary of a whole training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: Uuid,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub finished_at: DateTime<Utc>,
    /// Why the run ended
    pub outcome: RunOutcome,
    /// Episodes that reached the goal
    pub episodes_completed: usize,
    /// Steps taken across all episodes
    pub total_steps: usize,
    /// Length of the best path, if any episode succeeded
    pub best_path_len: Option<usize>,
    /// Per-episode summaries
    pub episodes: Vec<EpisodeSummary>,
}

impl RunReport {
    /// Write the report as pretty JSON
    pub async fn save(&self, path: &FsPath) -> homing_rl_core::Result<()> {
        persist::write_json_atomic(path, self, true).await
    }
}
