mod app;
mod checker;
mod commands;
mod config;
mod runner;
mod status;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use terminal::UpgradeKind;

#[derive(Parser)]
#[command(name = "sparkdock-manager")]
#[command(version)]
#[command(about = "Watch Sparkdock and Homebrew for pending updates", long_about = None)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/sparkdock-manager/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep running and re-check on a timer, on resume and on demand (default)
    Watch,
    /// Run a single update check and print the result
    Check {
        /// Print the check report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show where the tools are and how the manager is configured
    Status,
    /// Run an upgrade command in this terminal
    Upgrade {
        #[arg(value_enum)]
        kind: UpgradeKind,
        /// Skip the update check that guards the upgrade
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // 配置优先级：命令行参数 > 默认路径
    let config_path = cli.config.clone().unwrap_or_else(config::Config::default_path);
    let config = config::Config::load_or_default(&config_path)?;

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => app::run(config).await?,
        Commands::Check { json } => commands::check(&config, json).await?,
        Commands::Status => commands::status(&config, &config_path)?,
        Commands::Upgrade { kind, force } => {
            let code = commands::upgrade(&config, kind, force).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
