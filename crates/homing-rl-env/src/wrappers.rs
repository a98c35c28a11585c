//! Environment wrappers

use async_trait::async_trait;
use homing_rl_core::{EnvironmentAdapter, Pose, Position, Result, WheelSpeeds};
use tracing::debug;

/// Tick limit wrapper: the host reports it is stopping once `max_ticks` have elapsed
pub struct TickLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum ticks
    pub max_ticks: u64,
    /// Ticks elapsed
    pub ticks: u64,
}

impl<E> TickLimit<E> {
    /// Create a new tick limit wrapper
    pub fn new(env: E, max_ticks: u64) -> Self {
        Self {
            env,
            max_ticks,
            ticks: 0,
        }
    }

    /// Unwrap the inner environment
    pub fn into_inner(self) -> E {
        self.env
    }
}

#[async_trait]
impl<E> EnvironmentAdapter for TickLimit<E>
where
    E: EnvironmentAdapter,
{
    async fn sample_position(&mut self) -> Result<Position> {
        self.env.sample_position().await
    }

    async fn sample_proximity(&mut self) -> Result<Vec<f64>> {
        self.env.sample_proximity().await
    }

    async fn actuate(&mut self, speeds: WheelSpeeds) -> Result<()> {
        self.env.actuate(speeds).await
    }

    async fn advance_tick(&mut self) -> Result<bool> {
        if self.ticks >= self.max_ticks {
            debug!(ticks = self.ticks, "tick limit reached");
            return Ok(false);
        }
        self.ticks += 1;
        self.env.advance_tick().await
    }

    async fn get_pose(&mut self) -> Result<Pose> {
        self.env.get_pose().await
    }

    async fn set_pose(&mut self, pose: Pose) -> Result<()> {
        self.env.set_pose(pose).await
    }
}
