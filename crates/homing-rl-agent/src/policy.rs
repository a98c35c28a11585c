//! Epsilon-greedy policy engine with one-tick probing

use homing_rl_core::{
    drive, Action, Discretizer, EnvironmentAdapter, Position, QTable, Reward, RewardModel,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::TrainingConfig;
use crate::guard::ObstacleGuard;

/// How an action was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Uniformly random action
    Explore,
    /// Best probed action
    Exploit,
}

/// The action chosen for one control step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Action to commit
    pub action: Action,
    /// Contribution to the episode reward
    pub reward: Reward,
    /// How the action was chosen
    pub mode: SelectionMode,
}

/// Chooses actions and owns the Q-table for the duration of a run.
///
/// Exploitation probes every action for a single tick, scores the probe
/// with the reward model, feeds it to the Q-table, and undoes it with the
/// negated wheel command before trying the next one.
pub struct PolicyEngine {
    q_table: QTable,
    discretizer: Discretizer,
    reward_model: RewardModel,
    target: Position,
    epsilon: f64,
    speed: f64,
    probe_ticks: u32,
    rng: StdRng,
}

impl PolicyEngine {
    /// Create an engine around `q_table`
    #[must_use]
    pub fn new(q_table: QTable, config: &TrainingConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            discretizer: q_table.discretizer(),
            q_table,
            reward_model: config.reward.model(),
            target: config.target,
            epsilon: config.learning.epsilon,
            speed: config.motion.speed,
            probe_ticks: config.motion.probe_ticks,
            rng,
        }
    }

    /// The learned table
    #[must_use]
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Give up the table
    #[must_use]
    pub fn into_q_table(self) -> QTable {
        self.q_table
    }

    /// Choose the action for the agent standing at `position`
    pub async fn select<E>(
        &mut self,
        env: &mut E,
        guard: &ObstacleGuard,
        position: Position,
    ) -> homing_rl_core::Result<Selection>
    where
        E: EnvironmentAdapter + ?Sized,
    {
        if self.rng.gen::<f64>() < self.epsilon {
            let action = Action::sample(&mut self.rng);
            debug!(%action, "exploring");
            return Ok(Selection {
                action,
                reward: Reward::default(),
                mode: SelectionMode::Explore,
            });
        }

        let state = self.discretizer.discretize(position);
        let distance = position.distance_to(&self.target);
        let mut best: Option<(Action, Reward)> = None;

        for action in Action::ALL {
            let speeds = action.wheel_speeds(self.speed);
            drive(env, speeds, self.probe_ticks).await?;

            let probed = env.sample_position().await?;
            let obstacle = guard.detect(env).await?;
            let reward = self
                .reward_model
                .reward(distance, probed.distance_to(&self.target), obstacle);
            self.q_table
                .update(state, action, reward, self.discretizer.discretize(probed));
            debug!(%action, reward = reward.value(), obstacle, "probed");

            if best.map_or(true, |(_, top)| reward > top) {
                best = Some((action, reward));
            }

            drive(env, -speeds, self.probe_ticks).await?;
        }

        let (action, reward) = best.unwrap_or((Action::Forward, Reward::default()));
        Ok(Selection {
            action,
            reward,
            mode: SelectionMode::Exploit,
        })
    }
}
