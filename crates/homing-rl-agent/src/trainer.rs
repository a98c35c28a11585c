//! The training control loop

use std::future::Future;

use chrono::Utc;
use homing_rl_core::environment::tick;
use homing_rl_core::{drive, EnvironmentAdapter, PathEntry, Position, QTable, RLError, Reward};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::best_path::BestPathTracker;
use crate::config::TrainingConfig;
use crate::episode::{EpisodeManager, EpisodeStatus};
use crate::guard::ObstacleGuard;
use crate::policy::PolicyEngine;
use crate::report::{EpisodeSummary, RunOutcome, RunReport};

/// Runs Q-learning episodes against an environment until a terminal condition.
///
/// The Q-table is written on every way out of [`Trainer::run`]: budget
/// exhaustion, host stop, episode limit, shutdown signal, and errors.
pub struct Trainer<E> {
    env: E,
    config: TrainingConfig,
    policy: PolicyEngine,
    guard: ObstacleGuard,
    episodes: EpisodeManager,
    best: BestPathTracker,
    summaries: Vec<EpisodeSummary>,
    total_steps: usize,
    run_id: Uuid,
}

impl<E: EnvironmentAdapter> Trainer<E> {
    /// Load the Q-table and capture the run-start pose
    pub async fn new(mut env: E, config: TrainingConfig) -> homing_rl_core::Result<Self> {
        config.validate()?;

        let q_table = QTable::load(
            &config.storage.q_table,
            config.learning.params(),
            config.learning.discretizer(),
        )
        .await?;
        info!(
            states = q_table.len(),
            path = %config.storage.q_table.display(),
            "loaded q-table"
        );

        tick(&mut env).await?;
        let initial_pose = env.get_pose().await?;

        Ok(Self {
            policy: PolicyEngine::new(q_table, &config),
            guard: ObstacleGuard::new(config.guard.clone(), config.motion.speed),
            episodes: EpisodeManager::new(
                config.goal_threshold,
                config.max_steps,
                config.reward.clone(),
                initial_pose,
                config.motion.settle_ticks,
            ),
            best: BestPathTracker::new(config.storage.best_path.clone()),
            summaries: Vec::new(),
            total_steps: 0,
            run_id: Uuid::new_v4(),
            env,
            config,
        })
    }

    /// The environment
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The learned table
    pub fn q_table(&self) -> &QTable {
        self.policy.q_table()
    }

    /// Best path tracker
    pub fn best_path(&self) -> &BestPathTracker {
        &self.best
    }

    /// Episode manager
    pub fn episodes(&self) -> &EpisodeManager {
        &self.episodes
    }

    /// Train until a terminal condition or until `shutdown` resolves, then persist the Q-table
    pub async fn run<F>(&mut self, shutdown: F) -> homing_rl_core::Result<RunReport>
    where
        F: Future<Output = ()>,
    {
        let started_at = Utc::now();
        info!(run_id = %self.run_id, target = %self.config.target, "starting training");

        let outcome = {
            let training = self.train_loop();
            tokio::pin!(training);
            tokio::select! {
                result = &mut training => result,
                () = shutdown => {
                    warn!("⚠️  Shutdown requested, stopping training");
                    Ok(RunOutcome::Interrupted)
                }
            }
        };
        let outcome = match outcome {
            Err(RLError::HostStopped) => {
                warn!("host simulation stopped");
                Ok(RunOutcome::HostStopped)
            }
            other => other,
        };

        let saved = self.policy.q_table().save(&self.config.storage.q_table).await;
        let outcome = match (outcome, saved) {
            (Ok(outcome), Ok(())) => outcome,
            (Ok(_), Err(err)) => return Err(err),
            (Err(err), saved) => {
                if let Err(save_err) = saved {
                    error!(error = %save_err, "failed to persist q-table after training error");
                }
                return Err(err);
            }
        };
        info!(
            states = self.policy.q_table().len(),
            path = %self.config.storage.q_table.display(),
            "q-table saved"
        );

        let report = RunReport {
            run_id: self.run_id,
            started_at,
            finished_at: Utc::now(),
            outcome,
            episodes_completed: self.episodes.completed(),
            total_steps: self.total_steps,
            best_path_len: self.best.best_len(),
            episodes: self.summaries.clone(),
        };
        info!(?outcome, episodes = report.episodes_completed, "✅ Training complete.");
        Ok(report)
    }

    async fn train_loop(&mut self) -> homing_rl_core::Result<RunOutcome> {
        loop {
            // Simulated hosts never suspend; give the shutdown branch a chance to run.
            tokio::task::yield_now().await;
            tick(&mut self.env).await?;
            let position = self.env.sample_position().await?;
            let distance = position.distance_to(&self.config.target);

            match self.episodes.status(distance) {
                EpisodeStatus::GoalReached => {
                    self.finish_episode(position).await?;
                    if self
                        .config
                        .max_episodes
                        .is_some_and(|limit| self.episodes.completed() >= limit)
                    {
                        return Ok(RunOutcome::EpisodeLimitReached);
                    }
                }
                EpisodeStatus::StepBudgetExceeded => {
                    info!("⛔ Max steps reached in episode {}.", self.episodes.number());
                    return Ok(RunOutcome::StepBudgetExceeded);
                }
                EpisodeStatus::Running => self.control_step(position).await?,
            }
        }
    }

    /// One guarded policy step; the guard wins over whatever the policy picked
    async fn control_step(&mut self, position: Position) -> homing_rl_core::Result<()> {
        if self.guard.detect(&mut self.env).await? {
            return self.evade().await;
        }

        let selection = self
            .policy
            .select(&mut self.env, &self.guard, position)
            .await?;

        if self.guard.detect(&mut self.env).await? {
            return self.evade().await;
        }

        drive(
            &mut self.env,
            selection.action.wheel_speeds(self.config.motion.speed),
            self.config.motion.move_ticks,
        )
        .await?;
        self.episodes
            .record(PathEntry::Action(selection.action), selection.reward);
        self.total_steps += 1;
        Ok(())
    }

    async fn evade(&mut self) -> homing_rl_core::Result<()> {
        info!("🚧 Obstacle detected → turning left.");
        self.guard.evade(&mut self.env).await?;
        self.episodes.record(
            PathEntry::ObstacleEvasion,
            Reward(self.config.reward.evasion_penalty),
        );
        self.total_steps += 1;
        metrics::increment_counter!("homing_obstacle_evasions");
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    async fn finish_episode(&mut self, position: Position) -> homing_rl_core::Result<()> {
        let finished = self.episodes.complete();
        info!("🏁 Target reached at episode {}!", finished.number);
        info!("📍 Final position: {}", position);
        info!("🪜 Steps taken: {}", finished.steps);
        info!("🎯 Episode total reward: {:.2}", finished.reward.value());

        let new_best = self.best.consider(&finished.path).await?;
        self.summaries.push(EpisodeSummary {
            episode: finished.number,
            final_position: position,
            steps: finished.steps,
            reward: finished.reward.value(),
            bonus: finished.bonus,
            evasions: finished.path.evasions(),
            new_best,
        });
        metrics::increment_counter!("homing_episodes_completed");
        metrics::histogram!("homing_episode_steps", finished.steps as f64);

        self.episodes.reset_agent(&mut self.env).await?;

        let interval = self.config.checkpoint_interval;
        if interval > 0 && self.episodes.completed() % interval == 0 {
            self.policy
                .q_table()
                .save(&self.config.storage.q_table)
                .await?;
            info!(episode = finished.number, "q-table checkpoint written");
        }
        Ok(())
    }
}
