// Homing control CLI
// Train, replay and inspect tabular Q-learning homing agents

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "homingctl")]
#[command(about = "Goal-homing Q-learning control CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent in a simulated arena
    Train(TrainArgs),

    /// Replay the stored best path open-loop
    Replay(ReplayArgs),

    /// Show what has been learned so far
    Inspect(InspectArgs),
}

/// Where the agent lives
#[derive(Args, Clone)]
pub struct ArenaArgs {
    /// Arena layout name (open, pillar, cluttered)
    #[arg(short, long, default_value = "open")]
    pub arena: String,

    /// JSON arena description; takes precedence over --arena
    #[arg(long)]
    pub arena_file: Option<PathBuf>,

    /// Host stops after this many simulation ticks
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

#[derive(Args)]
pub struct TrainArgs {
    /// JSON training configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub arena: ArenaArgs,

    /// Random seed for exploration and sensor noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many successful episodes
    #[arg(long)]
    pub max_episodes: Option<usize>,

    /// Step budget
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Exploration rate
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Target x coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub target_x: Option<f64>,

    /// Target y coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub target_y: Option<f64>,

    /// Directory for the Q-table, best path and report
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Directory for the training log file
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON training configuration the path was learned with
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub arena: ArenaArgs,

    /// Best-path file to replay
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Success distance
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// JSON training configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the Q-table and best path
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Query the greedy action at this x coordinate
    #[arg(long, allow_hyphen_values = true, requires = "y")]
    pub x: Option<f64>,

    /// Query the greedy action at this y coordinate
    #[arg(long, allow_hyphen_values = true, requires = "x")]
    pub y: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => commands::train(args).await?,
        Commands::Replay(args) => commands::replay(args).await?,
        Commands::Inspect(args) => commands::inspect(args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_accepts_negative_target() {
        let cli = Cli::try_parse_from([
            "homingctl",
            "train",
            "--target-x",
            "-0.5",
            "--target-y",
            "0.3",
            "--arena",
            "pillar",
            "--max-episodes",
            "3",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.target_x, Some(-0.5));
        assert_eq!(args.arena.arena, "pillar");
        assert_eq!(args.max_episodes, Some(3));
    }

    #[test]
    fn test_inspect_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["homingctl", "inspect", "--x", "0.1"]).is_err());
        assert!(Cli::try_parse_from(["homingctl", "inspect", "--x", "0.1", "--y", "-0.2"]).is_ok());
    }
}
