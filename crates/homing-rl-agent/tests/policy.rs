mod common;

use approx::assert_relative_eq;
use common::{greedy_config, ScriptedEnv};
use homing_rl_agent::{ObstacleGuard, PolicyEngine, SelectionMode, TrainingConfig};
use homing_rl_core::{Action, Position, QTable, Reward};

fn engine(config: &TrainingConfig) -> (PolicyEngine, ObstacleGuard) {
    let q_table = QTable::new(config.learning.params(), config.learning.discretizer());
    (
        PolicyEngine::new(q_table, config),
        ObstacleGuard::new(config.guard.clone(), config.motion.speed),
    )
}

fn greedy() -> TrainingConfig {
    greedy_config(std::path::Path::new("unused"))
}

#[tokio::test]
async fn test_exploit_probes_every_action_and_restores_position() {
    let config = greedy();
    let (mut policy, guard) = engine(&config);
    let mut env = ScriptedEnv::new();

    let selection = policy.select(&mut env, &guard, Position::default()).await.unwrap();

    assert_eq!(selection.mode, SelectionMode::Exploit);
    assert_eq!(selection.action, Action::Backward);
    assert!(selection.reward > Reward(0.0));
    // probe tick + stop tick, out and back, for four actions
    assert_eq!(env.ticks, 16);
    assert_eq!(env.proximity_samples, 4);
    assert_relative_eq!(env.position().x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(env.position().y, 0.0, epsilon = 1e-12);

    let state = config.learning.discretizer().discretize(Position::default());
    let q = |action| policy.q_table().peek(&state, action);
    assert!(q(Action::Forward) < 0.0);
    assert!(q(Action::Left) > 0.0);
    assert!(q(Action::Right) < 0.0);
    // Probes stay inside the cell, so the best value seen so far is Left's
    assert_relative_eq!(
        q(Action::Backward),
        0.1 * (selection.reward.value() + 0.9 * q(Action::Left)),
        epsilon = 1e-12
    );
}

#[tokio::test]
async fn test_explore_returns_zero_reward_without_probing() {
    let mut config = greedy();
    config.learning.epsilon = 1.0;
    let (mut policy, guard) = engine(&config);
    let mut env = ScriptedEnv::new();

    let selection = policy.select(&mut env, &guard, Position::default()).await.unwrap();

    assert_eq!(selection.mode, SelectionMode::Explore);
    assert_eq!(selection.reward, Reward(0.0));
    assert_eq!(env.ticks, 0);
    assert!(policy.q_table().is_empty());
}

#[tokio::test]
async fn test_obstacle_penalty_overrides_progress() {
    let config = greedy();
    let (mut policy, guard) = engine(&config);
    // Only the Backward probe senses an obstacle
    let mut env = ScriptedEnv::with_obstacles([false, false, false, true]);

    let selection = policy.select(&mut env, &guard, Position::default()).await.unwrap();

    assert_eq!(selection.action, Action::Left);
    let state = config.learning.discretizer().discretize(Position::default());
    let left = policy.q_table().peek(&state, Action::Left);
    assert_relative_eq!(
        policy.q_table().peek(&state, Action::Backward),
        0.1 * (-20.0 + 0.9 * left),
        epsilon = 1e-12
    );
}

#[tokio::test]
async fn test_ties_go_to_the_first_action() {
    let mut config = greedy();
    config.target = Position::default();
    let (mut policy, guard) = engine(&config);
    let mut env = ScriptedEnv::new();

    let selection = policy.select(&mut env, &guard, Position::default()).await.unwrap();

    assert_eq!(selection.action, Action::Forward);
    assert!(selection.reward < Reward(0.0));
}
