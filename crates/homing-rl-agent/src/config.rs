//! Training and replay configuration

use std::path::{Path, PathBuf};

use homing_rl_core::state::MAX_DECIMALS;
use homing_rl_core::{Discretizer, Pose, Position, QLearningParams, RLError, RewardModel};
use serde::{Deserialize, Serialize};

/// Wheel speed and motion durations, in simulation ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Wheel speed magnitude used by every action
    pub speed: f64,
    /// Ticks a committed action is driven for
    pub move_ticks: u32,
    /// Ticks a probe (and its undo) is driven for
    pub probe_ticks: u32,
    /// Ticks to let the simulation settle after a pose reset
    pub settle_ticks: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            move_ticks: 50,
            probe_ticks: 1,
            settle_ticks: 10,
        }
    }
}

/// Q-learning coefficients and state resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Learning rate (alpha)
    pub learning_rate: f64,
    /// Discount factor (gamma)
    pub discount: f64,
    /// Exploration rate (epsilon)
    pub epsilon: f64,
    /// Decimals kept when discretizing positions
    pub state_decimals: u8,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.9,
            epsilon: 0.2,
            state_decimals: 2,
        }
    }
}

impl LearningConfig {
    /// Q-update coefficients
    #[must_use]
    pub fn params(&self) -> QLearningParams {
        QLearningParams {
            learning_rate: self.learning_rate,
            discount: self.discount,
        }
    }

    /// Position discretizer
    #[must_use]
    pub fn discretizer(&self) -> Discretizer {
        Discretizer::new(self.state_decimals)
    }
}

/// Reward shaping constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Probe reward when an obstacle is sensed
    pub obstacle_penalty: f64,
    /// Multiplier on distance gained during a probe
    pub progress_scale: f64,
    /// Episode reward added for each obstacle evasion
    pub evasion_penalty: f64,
    /// Efficiency bonus for a zero-step episode
    pub efficiency_base: f64,
    /// Efficiency bonus lost per step taken
    pub efficiency_step_cost: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            obstacle_penalty: -20.0,
            progress_scale: 100.0,
            evasion_penalty: -10.0,
            efficiency_base: 1000.0,
            efficiency_step_cost: 5.0,
        }
    }
}

impl RewardConfig {
    /// Probe reward model
    #[must_use]
    pub fn model(&self) -> RewardModel {
        RewardModel {
            obstacle_penalty: self.obstacle_penalty,
            progress_scale: self.progress_scale,
        }
    }

    /// `max(0, base − cost × steps)`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn efficiency_bonus(&self, steps: usize) -> f64 {
        (self.efficiency_base - self.efficiency_step_cost * steps as f64).max(0.0)
    }
}

/// The fixed turn-then-advance evasive maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvasionManeuver {
    /// Ticks spent turning left
    pub turn_ticks: u32,
    /// Ticks spent moving forward afterwards
    pub forward_ticks: u32,
}

impl Default for EvasionManeuver {
    fn default() -> Self {
        Self {
            turn_ticks: 20,
            forward_ticks: 30,
        }
    }
}

/// Obstacle detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Sensors facing the direction of travel
    pub front_sensors: [usize; 2],
    /// Reading above which an obstacle is considered present
    pub threshold: f64,
    /// Maneuver executed when an obstacle is present
    pub maneuver: EvasionManeuver,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            front_sensors: [0, 7],
            threshold: 80.0,
            maneuver: EvasionManeuver::default(),
        }
    }
}

/// Where learning artifacts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Q-table file
    pub q_table: PathBuf,
    /// Best-path file
    pub best_path: PathBuf,
    /// Run report file
    pub report: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            q_table: PathBuf::from("q_table.json"),
            best_path: PathBuf::from("learned_path.json"),
            report: PathBuf::from("training_report.json"),
        }
    }
}

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Target location
    pub target: Position,
    /// Distance under which the goal counts as reached
    pub goal_threshold: f64,
    /// Step budget; exhausting it ends the whole run
    pub max_steps: usize,
    /// Stop after this many successful episodes
    pub max_episodes: Option<usize>,
    /// Save the Q-table every N successful episodes (0 disables)
    pub checkpoint_interval: usize,
    /// Random seed
    pub seed: Option<u64>,
    /// Motion settings
    pub motion: MotionConfig,
    /// Learning settings
    pub learning: LearningConfig,
    /// Reward settings
    pub reward: RewardConfig,
    /// Obstacle guard settings
    pub guard: GuardConfig,
    /// Artifact locations
    pub storage: StorageConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target: Position::new(-0.5, 0.3),
            goal_threshold: 0.05,
            max_steps: 5000,
            max_episodes: None,
            checkpoint_interval: 10,
            seed: None,
            motion: MotionConfig::default(),
            learning: LearningConfig::default(),
            reward: RewardConfig::default(),
            guard: GuardConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Read a JSON configuration file; missing fields take their defaults
    pub fn from_file(path: &Path) -> homing_rl_core::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the learner cannot work with
    pub fn validate(&self) -> homing_rl_core::Result<()> {
        let unit = [
            ("learning.learning_rate", self.learning.learning_rate),
            ("learning.discount", self.learning.discount),
            ("learning.epsilon", self.learning.epsilon),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(RLError::InvalidConfig(format!("{name} must be in [0, 1], got {value}")));
            }
        }
        if self.learning.state_decimals > MAX_DECIMALS {
            return Err(RLError::InvalidConfig(format!(
                "learning.state_decimals must be at most {MAX_DECIMALS}, got {}",
                self.learning.state_decimals
            )));
        }
        if !self.goal_threshold.is_finite() || self.goal_threshold <= 0.0 {
            return Err(RLError::InvalidConfig(format!(
                "goal_threshold must be positive, got {}",
                self.goal_threshold
            )));
        }
        validate_motion(&self.motion)
    }

    /// Replay settings matching this training run
    #[must_use]
    pub fn replay(&self) -> ReplayConfig {
        ReplayConfig {
            target: self.target,
            best_path: self.storage.best_path.clone(),
            motion: self.motion.clone(),
            maneuver: self.guard.maneuver,
            ..ReplayConfig::default()
        }
    }
}

/// Configuration for replaying a learned path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Target location
    pub target: Position,
    /// Distance under which the replay counts as a success
    pub success_threshold: f64,
    /// Best-path file to replay
    pub best_path: PathBuf,
    /// Pose to start from; the current pose when unset
    pub start_pose: Option<Pose>,
    /// Motion settings
    pub motion: MotionConfig,
    /// Maneuver replayed for obstacle markers
    pub maneuver: EvasionManeuver,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            target: Position::new(-0.5, 0.3),
            success_threshold: 0.5,
            best_path: PathBuf::from("learned_path.json"),
            start_pose: None,
            motion: MotionConfig::default(),
            maneuver: EvasionManeuver::default(),
        }
    }
}

impl ReplayConfig {
    /// Reject values the replayer cannot work with
    pub fn validate(&self) -> homing_rl_core::Result<()> {
        if !self.success_threshold.is_finite() || self.success_threshold <= 0.0 {
            return Err(RLError::InvalidConfig(format!(
                "success_threshold must be positive, got {}",
                self.success_threshold
            )));
        }
        validate_motion(&self.motion)
    }
}

fn validate_motion(motion: &MotionConfig) -> homing_rl_core::Result<()> {
    if motion.move_ticks == 0 || motion.probe_ticks == 0 {
        return Err(RLError::InvalidConfig(
            "move_ticks and probe_ticks must be at least 1".to_string(),
        ));
    }
    if !motion.speed.is_finite() || motion.speed <= 0.0 {
        return Err(RLError::InvalidConfig(format!(
            "speed must be positive, got {}",
            motion.speed
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_bonus() {
        let reward = RewardConfig::default();
        assert_eq!(reward.efficiency_bonus(50), 750.0);
        assert_eq!(reward.efficiency_bonus(200), 0.0);
        assert_eq!(reward.efficiency_bonus(300), 0.0);
        assert_eq!(reward.efficiency_bonus(0), 1000.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"max_steps": 10, "learning": {"epsilon": 0.0}}"#).unwrap();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.learning.epsilon, 0.0);
        assert_eq!(config.learning.learning_rate, 0.1);
        assert_eq!(config.guard.front_sensors, [0, 7]);
        assert_eq!(config.motion.move_ticks, 50);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = TrainingConfig::default();
        config.learning.epsilon = 1.5;
        assert!(matches!(config.validate(), Err(RLError::InvalidConfig(_))));

        let mut config = TrainingConfig::default();
        config.motion.move_ticks = 0;
        assert!(config.validate().is_err());

        let mut replay = ReplayConfig::default();
        replay.success_threshold = 0.0;
        assert!(replay.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_thresholds() {
        let mut config = TrainingConfig::default();
        config.goal_threshold = f64::NAN;
        assert!(matches!(config.validate(), Err(RLError::InvalidConfig(_))));

        let mut replay = ReplayConfig::default();
        replay.success_threshold = f64::NAN;
        assert!(matches!(replay.validate(), Err(RLError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_bounds_state_decimals() {
        let mut config = TrainingConfig::default();
        config.learning.state_decimals = MAX_DECIMALS;
        config.validate().unwrap();

        config.learning.state_decimals = 20;
        assert!(matches!(config.validate(), Err(RLError::InvalidConfig(_))));
    }

    #[test]
    fn test_replay_follows_training_settings() {
        let mut config = TrainingConfig::default();
        config.target = Position::new(1.0, 2.0);
        config.storage.best_path = PathBuf::from("out/path.json");
        let replay = config.replay();
        assert_eq!(replay.target, Position::new(1.0, 2.0));
        assert_eq!(replay.best_path, PathBuf::from("out/path.json"));
        assert_eq!(replay.success_threshold, 0.5);
    }
}
