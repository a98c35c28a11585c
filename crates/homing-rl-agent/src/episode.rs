//! Episode lifecycle: step budget, goal detection, and pose resets

use homing_rl_core::{environment::tick, EnvironmentAdapter, Path, PathEntry, Pose, Reward};

use crate::config::RewardConfig;

/// Where the current episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// Keep stepping
    Running,
    /// The agent is within the goal threshold
    GoalReached,
    /// The step budget is spent; the whole run ends
    StepBudgetExceeded,
}

/// The episode in progress
#[derive(Debug, Clone, Default)]
pub struct Episode {
    /// Entries committed so far
    pub path: Path,
    /// Steps taken so far
    pub steps: usize,
    /// Accumulated reward
    pub reward: Reward,
}

/// An episode that reached the goal
#[derive(Debug, Clone)]
pub struct FinishedEpisode {
    /// One-based episode number
    pub number: usize,
    /// Committed entries
    pub path: Path,
    /// Steps taken
    pub steps: usize,
    /// Total reward including the efficiency bonus
    pub reward: Reward,
    /// Efficiency bonus granted
    pub bonus: f64,
}

/// Owns the current episode and decides when it ends
#[derive(Debug, Clone)]
pub struct EpisodeManager {
    current: Episode,
    number: usize,
    goal_threshold: f64,
    max_steps: usize,
    rewards: RewardConfig,
    initial_pose: Pose,
    settle_ticks: u32,
}

impl EpisodeManager {
    /// Start the first episode; resets return the agent to `initial_pose`
    #[must_use]
    pub fn new(
        goal_threshold: f64,
        max_steps: usize,
        rewards: RewardConfig,
        initial_pose: Pose,
        settle_ticks: u32,
    ) -> Self {
        Self {
            current: Episode::default(),
            number: 1,
            goal_threshold,
            max_steps,
            rewards,
            initial_pose,
            settle_ticks,
        }
    }

    /// Episode in progress
    #[must_use]
    pub fn current(&self) -> &Episode {
        &self.current
    }

    /// One-based number of the episode in progress
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Episodes that reached the goal so far
    #[must_use]
    pub fn completed(&self) -> usize {
        self.number - 1
    }

    /// Pose every episode starts from
    #[must_use]
    pub fn initial_pose(&self) -> Pose {
        self.initial_pose
    }

    /// Classify the current tick given the distance to the target
    #[must_use]
    pub fn status(&self, distance: f64) -> EpisodeStatus {
        if distance < self.goal_threshold {
            EpisodeStatus::GoalReached
        } else if self.current.steps >= self.max_steps {
            EpisodeStatus::StepBudgetExceeded
        } else {
            EpisodeStatus::Running
        }
    }

    /// Record one taken step
    pub fn record(&mut self, entry: impl Into<PathEntry>, reward: Reward) {
        self.current.path.push(entry);
        self.current.steps += 1;
        self.current.reward += reward;
    }

    /// Close the current episode with its efficiency bonus and start the next one
    pub fn complete(&mut self) -> FinishedEpisode {
        let episode = std::mem::take(&mut self.current);
        let bonus = self.rewards.efficiency_bonus(episode.steps);
        let finished = FinishedEpisode {
            number: self.number,
            path: episode.path,
            steps: episode.steps,
            reward: episode.reward + Reward(bonus),
            bonus,
        };
        self.number += 1;
        finished
    }

    /// Put the agent back at the initial pose and let the simulation settle
    pub async fn reset_agent<E>(&self, env: &mut E) -> homing_rl_core::Result<()>
    where
        E: EnvironmentAdapter + ?Sized,
    {
        env.set_pose(self.initial_pose).await?;
        for _ in 0..self.settle_ticks {
            tick(env).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homing_rl_core::Action;

    fn manager(max_steps: usize) -> EpisodeManager {
        EpisodeManager::new(0.05, max_steps, RewardConfig::default(), Pose::default(), 10)
    }

    #[test]
    fn test_starts_running_and_empty() {
        let episodes = manager(5000);
        assert_eq!(episodes.status(1.0), EpisodeStatus::Running);
        assert_eq!(episodes.current().steps, 0);
        assert!(episodes.current().path.is_empty());
        assert_eq!(episodes.current().reward, Reward(0.0));
        assert_eq!(episodes.number(), 1);
    }

    #[test]
    fn test_goal_takes_precedence_over_budget() {
        let mut episodes = manager(1);
        episodes.record(Action::Forward, Reward(1.0));
        assert_eq!(episodes.status(0.04), EpisodeStatus::GoalReached);
        assert_eq!(episodes.status(0.05), EpisodeStatus::StepBudgetExceeded);
    }

    #[test]
    fn test_complete_applies_bonus_and_clears() {
        let mut episodes = manager(5000);
        for _ in 0..50 {
            episodes.record(Action::Left, Reward(1.0));
        }
        let finished = episodes.complete();

        assert_eq!(finished.number, 1);
        assert_eq!(finished.steps, 50);
        assert_eq!(finished.path.len(), 50);
        assert_eq!(finished.bonus, 750.0);
        assert_eq!(finished.reward, Reward(800.0));

        assert_eq!(episodes.number(), 2);
        assert_eq!(episodes.completed(), 1);
        assert_eq!(episodes.current().steps, 0);
        assert!(episodes.current().path.is_empty());
        assert_eq!(episodes.current().reward, Reward(0.0));
    }

    #[test]
    fn test_long_episode_gets_no_bonus() {
        let mut episodes = manager(5000);
        for _ in 0..300 {
            episodes.record(PathEntry::ObstacleEvasion, Reward(-10.0));
        }
        let finished = episodes.complete();
        assert_eq!(finished.bonus, 0.0);
        assert_eq!(finished.reward, Reward(-3000.0));
    }
}
