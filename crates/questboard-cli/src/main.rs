mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, points::PointsSubcommand, project::ProjectSubcommand,
    skill::SkillSubcommand, task::TaskSubcommand, user::UserSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "questboard",
    about = "Gamified task tracking: XP, levels, badges and a skill tree",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .questboard/)
    #[arg(long, global = true, env = "QUESTBOARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a questboard workspace in the current directory
    Init {
        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Run the REST API server
    Serve {
        /// Port to listen on (defaults to server.port in config)
        #[arg(long)]
        port: Option<u16>,
        /// Interface to bind (defaults to server.host in config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Manage the skill tree
    Skill {
        #[command(subcommand)]
        subcommand: SkillSubcommand,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Show the top users by points
    Leaderboard {
        /// Number of users to show
        #[arg(long, default_value_t = questboard_core::leaderboard::DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Grant spendable points
    Points {
        #[command(subcommand)]
        subcommand: PointsSubcommand,
    },

    /// Validate the workspace configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Serve { port, host } => cmd::serve::run(&root, host, port),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Skill { subcommand } => cmd::skill::run(&root, subcommand, cli.json),
        Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Leaderboard { limit } => cmd::leaderboard::run(&root, limit, cli.json),
        Commands::Points { subcommand } => cmd::points::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
