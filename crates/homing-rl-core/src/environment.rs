//! The environment adapter: the only path between the learner and the simulation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Position, RLError, WheelSpeeds};

/// Placement of the agent in the arena
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Location
    pub position: Position,
    /// Heading in radians, counter-clockwise from +x
    pub heading: f64,
}

impl Pose {
    /// Create a new pose
    #[must_use]
    pub fn new(position: Position, heading: f64) -> Self {
        Self { position, heading }
    }
}

/// Tick-driven access to a simulated (or real) differential-drive agent.
///
/// A wheel command given to [`EnvironmentAdapter::actuate`] stays in force
/// across ticks until replaced. [`EnvironmentAdapter::advance_tick`] is the
/// only call that lets simulated time pass.
#[async_trait]
pub trait EnvironmentAdapter: Send {
    /// Current (x, y) position of the agent
    async fn sample_position(&mut self) -> crate::Result<Position>;

    /// Current proximity readings, one per sensor, on the sensor's native scale
    async fn sample_proximity(&mut self) -> crate::Result<Vec<f64>>;

    /// Set the wheel velocities
    async fn actuate(&mut self, speeds: WheelSpeeds) -> crate::Result<()>;

    /// Advance the simulation one tick; `false` means the host is stopping
    async fn advance_tick(&mut self) -> crate::Result<bool>;

    /// Current pose of the agent
    async fn get_pose(&mut self) -> crate::Result<Pose>;

    /// Teleport the agent to `pose`
    async fn set_pose(&mut self, pose: Pose) -> crate::Result<()>;
}

/// Advance one tick, turning a host stop into [`RLError::HostStopped`]
pub async fn tick<E: EnvironmentAdapter + ?Sized>(env: &mut E) -> crate::Result<()> {
    if env.advance_tick().await? {
        Ok(())
    } else {
        Err(RLError::HostStopped)
    }
}

/// Drive with `speeds` for `ticks` ticks, then stop and advance one settling tick
pub async fn drive<E: EnvironmentAdapter + ?Sized>(
    env: &mut E,
    speeds: WheelSpeeds,
    ticks: u32,
) -> crate::Result<()> {
    env.actuate(speeds).await?;
    for _ in 0..ticks {
        tick(env).await?;
    }
    env.actuate(WheelSpeeds::STOP).await?;
    tick(env).await
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts ticks and records the commands it receives
    #[derive(Default)]
    struct Recorder {
        ticks: u32,
        stop_after: Option<u32>,
        commands: Vec<WheelSpeeds>,
    }

    #[async_trait]
    impl EnvironmentAdapter for Recorder {
        async fn sample_position(&mut self) -> crate::Result<Position> {
            Ok(Position::default())
        }

        async fn sample_proximity(&mut self) -> crate::Result<Vec<f64>> {
            Ok(vec![0.0; 8])
        }

        async fn actuate(&mut self, speeds: WheelSpeeds) -> crate::Result<()> {
            self.commands.push(speeds);
            Ok(())
        }

        async fn advance_tick(&mut self) -> crate::Result<bool> {
            if self.stop_after.is_some_and(|limit| self.ticks >= limit) {
                return Ok(false);
            }
            self.ticks += 1;
            Ok(true)
        }

        async fn get_pose(&mut self) -> crate::Result<Pose> {
            Ok(Pose::default())
        }

        async fn set_pose(&mut self, _pose: Pose) -> crate::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drive_stops_and_syncs() {
        let mut env = Recorder::default();
        drive(&mut env, WheelSpeeds::new(3.0, 3.0), 50).await.unwrap();

        assert_eq!(env.ticks, 51);
        assert_eq!(env.commands, vec![WheelSpeeds::new(3.0, 3.0), WheelSpeeds::STOP]);
    }

    #[tokio::test]
    async fn test_drive_reports_host_stop() {
        let mut env = Recorder {
            stop_after: Some(3),
            ..Recorder::default()
        };
        let err = drive(&mut env, WheelSpeeds::new(1.0, 1.0), 10).await.unwrap_err();
        assert!(matches!(err, RLError::HostStopped));
        assert_eq!(env.ticks, 3);
    }
}
