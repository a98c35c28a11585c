// Subcommand implementations for homingctl

use std::future::Future;
use std::path::Path as FsPath;

use anyhow::{Context, Result};
use homing_rl_agent::{ReplayOutcome, Replayer, RunOutcome, Trainer, TrainingConfig};
use homing_rl_core::{Action, Path, Position, QTable};
use homing_rl_env::{layout_config, ArenaConfig, SimulatedArena, TickLimit};
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use crate::{ArenaArgs, InspectArgs, ReplayArgs, TrainArgs};

fn load_config(path: Option<&FsPath>) -> Result<TrainingConfig> {
    match path {
        Some(path) => TrainingConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(TrainingConfig::default()),
    }
}

/// Re-root the artifact files under `dir`, keeping their file names
fn relocate_storage(config: &mut TrainingConfig, dir: &FsPath) {
    let storage = &mut config.storage;
    for file in [&mut storage.q_table, &mut storage.best_path, &mut storage.report] {
        if let Some(name) = file.file_name() {
            *file = dir.join(name);
        }
    }
}

fn build_arena(args: &ArenaArgs, seed: Option<u64>) -> Result<TickLimit<SimulatedArena>> {
    let mut config = match &args.arena_file {
        Some(path) => ArenaConfig::from_file(path)
            .with_context(|| format!("Failed to load arena {}", path.display()))?,
        None => layout_config(&args.arena)?,
    };
    if seed.is_some() {
        config.seed = seed;
    }
    let arena = SimulatedArena::new(config).context("Failed to build arena")?;
    Ok(TickLimit::new(arena, args.max_ticks.unwrap_or(u64::MAX)))
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
///
/// The SIGTERM handler is installed when this is called, not when the
/// returned future is first polled.
fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(err) => {
            warn!("⚠️  Could not listen for SIGTERM: {err}");
            None
        }
    };

    async move {
        let ctrl_c = async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("⚠️  Could not listen for Ctrl-C; training runs until it ends on its own");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            match terminate {
                Some(mut stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => info!("🛑 Ctrl-C received"),
            () = terminate => info!("🛑 SIGTERM received"),
        }
    }
}

pub async fn train(args: TrainArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(max_episodes) = args.max_episodes {
        config.max_episodes = Some(max_episodes);
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(epsilon) = args.epsilon {
        config.learning.epsilon = epsilon;
    }
    if let Some(x) = args.target_x {
        config.target.x = x;
    }
    if let Some(y) = args.target_y {
        config.target.y = y;
    }
    if let Some(dir) = &args.output_dir {
        relocate_storage(&mut config, dir);
    }
    config.validate().context("Invalid training configuration")?;

    let log_file = crate::logging::init(Some(&args.log_dir))?;
    if let Some(log_file) = log_file {
        info!("📝 Logging to {}", log_file.display());
    }

    let env = build_arena(&args.arena, config.seed)?;
    let mut trainer = Trainer::new(env, config.clone())
        .await
        .context("Failed to start training")?;
    let report = trainer.run(shutdown_signal()).await.context("Training failed")?;

    report
        .save(&config.storage.report)
        .await
        .context("Failed to write training report")?;

    println!("🤖 Training finished: {}", describe(report.outcome));
    println!("   Episodes completed: {}", report.episodes_completed);
    println!("   Total steps: {}", report.total_steps);
    match report.best_path_len {
        Some(len) => println!("   Best path length: {len}"),
        None => println!("   Best path length: none"),
    }
    println!("   Q-table: {}", config.storage.q_table.display());
    println!("   Report: {}", config.storage.report.display());
    Ok(())
}

fn describe(outcome: RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::StepBudgetExceeded => "step budget exhausted",
        RunOutcome::HostStopped => "host stopped",
        RunOutcome::EpisodeLimitReached => "episode limit reached",
        RunOutcome::Interrupted => "interrupted",
    }
}

pub async fn replay(args: ReplayArgs) -> Result<()> {
    crate::logging::init(None)?;

    let training = load_config(args.config.as_deref())?;
    let mut config = training.replay();
    if let Some(path) = args.path {
        config.best_path = path;
    }
    if let Some(threshold) = args.threshold {
        config.success_threshold = threshold;
    }

    let mut env = build_arena(&args.arena, training.seed)?;
    if config.start_pose.is_none() {
        config.start_pose = Some(env.env.config().start);
    }
    match Replayer::new(config).replay(&mut env).await.context("Replay failed")? {
        ReplayOutcome::NoPathAvailable => println!("Learned path file not found!"),
        ReplayOutcome::Completed {
            steps,
            final_position,
            distance,
            reached,
        } => {
            println!("Replayed {steps} steps, ended at {final_position} ({distance:.3} from target)");
            println!("{}", if reached { "🏁 Target reached" } else { "❌ Target missed" });
        }
    }
    Ok(())
}

pub async fn inspect(args: InspectArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = &args.output_dir {
        relocate_storage(&mut config, dir);
    }

    let q_table = QTable::load(
        &config.storage.q_table,
        config.learning.params(),
        config.learning.discretizer(),
    )
    .await
    .with_context(|| format!("Failed to load {}", config.storage.q_table.display()))?;

    let visited = q_table
        .iter()
        .map(|(_, values)| values.iter().filter(|(_, value)| *value != 0.0).count())
        .sum::<usize>();
    println!("📊 Q-table {}", config.storage.q_table.display());
    println!("   States: {}", q_table.len());
    println!("   Non-zero state-action values: {visited}");

    if let (Some(x), Some(y)) = (args.x, args.y) {
        print_state(&q_table, Position::new(x, y));
    }

    print_best_path(&config.storage.best_path).await
}

fn print_state(q_table: &QTable, position: Position) {
    let state = q_table.discretizer().discretize(position);
    match q_table.greedy_action(&state) {
        Some(action) => {
            println!("   State {state}: greedy action {action}");
            for candidate in Action::ALL {
                println!("     {candidate}: {:.4}", q_table.peek(&state, candidate));
            }
        }
        None => println!("   State {state}: never visited"),
    }
}

async fn print_best_path(file: &FsPath) -> Result<()> {
    match Path::load_raw(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?
    {
        Some(entries) => {
            println!("🗺️  Best path {} ({} entries)", file.display(), entries.len());
            let names: Vec<String> = entries
                .iter()
                .map(|entry| entry.as_str().map_or_else(|| entry.to_string(), str::to_string))
                .collect();
            println!("   {}", names.join(" "));
        }
        None => println!("🗺️  No best path at {}", file.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_relocate_storage_keeps_file_names() {
        let mut config = TrainingConfig::default();
        relocate_storage(&mut config, FsPath::new("runs/a"));
        assert_eq!(config.storage.q_table, PathBuf::from("runs/a/q_table.json"));
        assert_eq!(config.storage.best_path, PathBuf::from("runs/a/learned_path.json"));
        assert_eq!(config.storage.report, PathBuf::from("runs/a/training_report.json"));
    }

    #[test]
    fn test_build_arena_from_layout_and_file() {
        let args = ArenaArgs {
            arena: "pillar".to_string(),
            arena_file: None,
            max_ticks: Some(10),
        };
        let env = build_arena(&args, Some(5)).unwrap();
        assert_eq!(env.max_ticks, 10);
        assert_eq!(env.env.config().obstacles.len(), 1);
        assert_eq!(env.env.config().seed, Some(5));

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("arena.json");
        std::fs::write(&file, r#"{"half_size": 0.5}"#).unwrap();
        let args = ArenaArgs {
            arena: "unknown".to_string(),
            arena_file: Some(file),
            max_ticks: None,
        };
        let env = build_arena(&args, None).unwrap();
        assert_eq!(env.env.config().half_size, 0.5);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sigterm_resolves_shutdown() {
        let shutdown = shutdown_signal();
        let status = std::process::Command::new("kill")
            .arg("-TERM")
            .arg(std::process::id().to_string())
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(std::time::Duration::from_secs(5), shutdown)
            .await
            .expect("SIGTERM should end the shutdown future");
    }

    #[test]
    fn test_unknown_layout_is_an_error() {
        let args = ArenaArgs {
            arena: "maze".to_string(),
            arena_file: None,
            max_ticks: None,
        };
        assert!(build_arena(&args, None).is_err());
    }
}
