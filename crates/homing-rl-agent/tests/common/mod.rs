#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use homing_rl_agent::TrainingConfig;
use homing_rl_core::{EnvironmentAdapter, Pose, Position, Result, WheelSpeeds};

/// Meters moved per tick per unit of wheel speed
pub const SCALE: f64 = 0.1 / 150.0;

/// Grid-world stand-in for the simulator.
///
/// Wheel commands move the agent without any rotation: the common-mode
/// part moves it along x and the differential part along y, so at speed 3
/// a 50-tick Forward is +0.1 x and a 50-tick Left is +0.1 y.
pub struct ScriptedEnv {
    pub pose: Pose,
    pub wheels: WheelSpeeds,
    pub ticks: u64,
    pub stop_after: Option<u64>,
    /// Obstacle flags returned by successive proximity samples; clear once exhausted
    pub obstacles: VecDeque<bool>,
    pub proximity_samples: usize,
    pub set_poses: Vec<Pose>,
}

impl ScriptedEnv {
    pub fn new() -> Self {
        Self {
            pose: Pose::default(),
            wheels: WheelSpeeds::STOP,
            ticks: 0,
            stop_after: None,
            obstacles: VecDeque::new(),
            proximity_samples: 0,
            set_poses: Vec::new(),
        }
    }

    pub fn with_obstacles(flags: impl IntoIterator<Item = bool>) -> Self {
        Self {
            obstacles: flags.into_iter().collect(),
            ..Self::new()
        }
    }

    pub fn position(&self) -> Position {
        self.pose.position
    }
}

#[async_trait]
impl EnvironmentAdapter for ScriptedEnv {
    async fn sample_position(&mut self) -> Result<Position> {
        Ok(self.pose.position)
    }

    async fn sample_proximity(&mut self) -> Result<Vec<f64>> {
        self.proximity_samples += 1;
        let mut readings = vec![0.0; 8];
        if self.obstacles.pop_front().unwrap_or(false) {
            readings[0] = 300.0;
        }
        Ok(readings)
    }

    async fn actuate(&mut self, speeds: WheelSpeeds) -> Result<()> {
        self.wheels = speeds;
        Ok(())
    }

    async fn advance_tick(&mut self) -> Result<bool> {
        if self.stop_after.is_some_and(|limit| self.ticks >= limit) {
            return Ok(false);
        }
        self.ticks += 1;
        let WheelSpeeds { left, right } = self.wheels;
        self.pose.position.x += (left + right) / 2.0 * SCALE;
        self.pose.position.y += (right - left) / 2.0 * SCALE;
        Ok(true)
    }

    async fn get_pose(&mut self) -> Result<Pose> {
        Ok(self.pose)
    }

    async fn set_pose(&mut self, pose: Pose) -> Result<()> {
        self.set_poses.push(pose);
        self.pose = pose;
        Ok(())
    }
}

/// Deterministic greedy training writing its artifacts under `dir`
pub fn greedy_config(dir: &Path) -> TrainingConfig {
    let mut config = TrainingConfig::default();
    config.learning.epsilon = 0.0;
    config.seed = Some(42);
    config.max_episodes = Some(2);
    config.storage.q_table = dir.join("q_table.json");
    config.storage.best_path = dir.join("learned_path.json");
    config.storage.report = dir.join("training_report.json");
    config
}
