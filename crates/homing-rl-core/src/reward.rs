//! Reward signals and the progress/obstacle reward model

use serde::{Deserialize, Serialize};

/// Reward signal from a single step
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Reward(pub f64);

impl Reward {
    /// Create a new reward
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Reward {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Reward> for f64 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::ops::AddAssign for Reward {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Rewards a probe by its progress towards the target.
///
/// An obstacle sensed after the probe always yields `obstacle_penalty`,
/// whatever the progress made.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardModel {
    /// Reward when an obstacle is sensed after moving
    pub obstacle_penalty: f64,
    /// Multiplier applied to the distance gained
    pub progress_scale: f64,
}

impl Default for RewardModel {
    fn default() -> Self {
        Self {
            obstacle_penalty: -20.0,
            progress_scale: 100.0,
        }
    }
}

impl RewardModel {
    /// Reward for moving from `old_distance` to `new_distance`
    #[must_use]
    pub fn reward(&self, old_distance: f64, new_distance: f64, obstacle: bool) -> Reward {
        if obstacle {
            Reward(self.obstacle_penalty)
        } else {
            Reward((old_distance - new_distance) * self.progress_scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_progress_is_rewarded() {
        let model = RewardModel::default();
        assert_relative_eq!(model.reward(0.5, 0.4, false).value(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(model.reward(0.4, 0.5, false).value(), -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_obstacle_penalty_wins_over_progress() {
        let model = RewardModel::default();
        assert_eq!(model.reward(5.0, 0.0, true), Reward(-20.0));
    }

    #[test]
    fn test_reward_accumulates() {
        let mut total = Reward::default();
        total += Reward(2.5);
        total += Reward(-1.0);
        assert_eq!(total + Reward(0.5), Reward(2.0));
    }
}
