use anyhow::Result;
use clap::{Parser, Subcommand};
use nlpbox::cli::{UpArgs, launcher, setup};
use nlpbox::infra::config::default_config_dir;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nlpbox",
    version,
    about = "Launches the NLP Suite containers and cleans them up on exit"
)]
struct Cli {
    /// Config directory (default: ~/.config/nlpbox)
    #[arg(long, env = "NLPBOX_CONFIG_DIR", default_value_os_t = default_config_dir())]
    config_dir: std::path::PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install, start and keep the suite running until interrupted (default)
    Up(UpArgs),
    /// Stop and remove the containers and the suite network
    Down,
    /// Show the state of each suite container
    Status,
    /// Write the default nlpbox.toml into the config directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "nlpbox=debug" } else { "nlpbox=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match cli.command.unwrap_or_else(|| Commands::Up(UpArgs::default())) {
        Commands::Up(args) => launcher::up(args, &cli.config_dir),
        Commands::Down => launcher::down(&cli.config_dir),
        Commands::Status => launcher::status(&cli.config_dir),
        Commands::Init => setup::install(&cli.config_dir),
    }
}
