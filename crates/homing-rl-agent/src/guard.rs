//! Obstacle guard: forces an evasive maneuver when something blocks the way

use homing_rl_core::{drive, Action, EnvironmentAdapter, RLError};
use tracing::debug;

use crate::config::{EvasionManeuver, GuardConfig};

/// Watches the front proximity sensors and drives the evasive maneuver
#[derive(Debug, Clone)]
pub struct ObstacleGuard {
    config: GuardConfig,
    speed: f64,
}

impl ObstacleGuard {
    /// Create a guard driving its maneuver at `speed`
    #[must_use]
    pub fn new(config: GuardConfig, speed: f64) -> Self {
        Self { config, speed }
    }

    /// Whether either front sensor in `readings` is above the threshold
    pub fn is_blocked(&self, readings: &[f64]) -> homing_rl_core::Result<bool> {
        let mut blocked = false;
        for &index in &self.config.front_sensors {
            let reading = readings.get(index).ok_or(RLError::DimensionMismatch {
                expected: index + 1,
                actual: readings.len(),
            })?;
            blocked |= *reading > self.config.threshold;
        }
        Ok(blocked)
    }

    /// Sample the sensors and report whether an obstacle is present
    pub async fn detect<E>(&self, env: &mut E) -> homing_rl_core::Result<bool>
    where
        E: EnvironmentAdapter + ?Sized,
    {
        let readings = env.sample_proximity().await?;
        let blocked = self.is_blocked(&readings)?;
        if blocked {
            debug!(?readings, "front sensors above threshold");
        }
        Ok(blocked)
    }

    /// Execute the evasive maneuver
    pub async fn evade<E>(&self, env: &mut E) -> homing_rl_core::Result<()>
    where
        E: EnvironmentAdapter + ?Sized,
    {
        execute_maneuver(env, self.config.maneuver, self.speed).await
    }
}

/// Turn left, then advance; shared by training and replay
pub async fn execute_maneuver<E>(
    env: &mut E,
    maneuver: EvasionManeuver,
    speed: f64,
) -> homing_rl_core::Result<()>
where
    E: EnvironmentAdapter + ?Sized,
{
    drive(env, Action::Left.wheel_speeds(speed), maneuver.turn_ticks).await?;
    drive(env, Action::Forward.wheel_speeds(speed), maneuver.forward_ticks).await
}
