//! Replaying a learned path without any learning

use homing_rl_core::environment::tick;
use homing_rl_core::{drive, EnvironmentAdapter, Path, PathEntry, Position};
use tracing::{info, warn};

use crate::config::ReplayConfig;
use crate::guard::execute_maneuver;

/// What a replay did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayOutcome {
    /// No best-path file exists; the agent never moved
    NoPathAvailable,
    /// Every entry was executed
    Completed {
        /// Entries executed
        steps: usize,
        /// Position after the last entry
        final_position: Position,
        /// Distance from the final position to the target
        distance: f64,
        /// Whether `distance` is under the success threshold
        reached: bool,
    },
}

/// Drives a stored path open-loop and reports where it ended up
#[derive(Debug, Clone)]
pub struct Replayer {
    config: ReplayConfig,
}

impl Replayer {
    /// Create a replayer
    #[must_use]
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    /// The settings in use
    #[must_use]
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Execute the stored path entry by entry.
    ///
    /// Entries are validated as they are reached: an unknown entry stops the
    /// replay with [`homing_rl_core::RLError::InvalidPathFormat`] and the
    /// moves already made stand.
    pub async fn replay<E>(&self, env: &mut E) -> homing_rl_core::Result<ReplayOutcome>
    where
        E: EnvironmentAdapter + ?Sized,
    {
        self.config.validate()?;

        let Some(entries) = Path::load_raw(&self.config.best_path).await? else {
            warn!(path = %self.config.best_path.display(), "Learned path file not found!");
            return Ok(ReplayOutcome::NoPathAvailable);
        };

        tick(env).await?;
        if let Some(pose) = self.config.start_pose {
            env.set_pose(pose).await?;
            tick(env).await?;
        }

        info!("▶️  Replaying {} learned moves", entries.len());
        let speed = self.config.motion.speed;
        for (index, value) in entries.iter().enumerate() {
            let step = index + 1;
            match PathEntry::from_json(index, value)? {
                PathEntry::Action(action) => {
                    info!("Step {}: {}", step, action);
                    drive(env, action.wheel_speeds(speed), self.config.motion.move_ticks).await?;
                }
                PathEntry::ObstacleEvasion => {
                    info!("Step {}: obstacle → left turn", step);
                    execute_maneuver(env, self.config.maneuver, speed).await?;
                }
            }
        }

        let final_position = env.sample_position().await?;
        let distance = final_position.distance_to(&self.config.target);
        let reached = distance < self.config.success_threshold;
        info!("📍 Final position: {}", final_position);
        info!("📏 Distance to target: {:.3}", distance);
        if reached {
            info!("🏁 Target reached successfully!");
        } else {
            warn!("❌ Did not reach the target.");
        }

        Ok(ReplayOutcome::Completed {
            steps: entries.len(),
            final_position,
            distance,
            reached,
        })
    }
}
