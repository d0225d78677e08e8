use anyhow::Result;
use clap::Parser;
use gpm::commands::{self, Config};
use gpm::repository::{RepositoryType, UpdateStrategy};
use std::path::PathBuf;

/// gpm - Git package manager for Home Assistant
///
/// Installs integrations straight from their git repositories and keeps them
/// at the latest tag, pre-release or commit.
///
/// Examples:
///   gpm add https://github.com/user/awesome-component
///   gpm check
///   gpm update awesome-component --version v1.2.0
#[derive(Parser, Debug)]
#[command(author, version = env!("GPM_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Home Assistant configuration directory (also via GPM_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "GPM_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Clone, install and register a repository
    Add(AddArgs),

    /// List configured repositories
    List,

    /// Fetch and show whether updates are available
    Check(CheckArgs),

    /// Switch a repository to another version
    Update(UpdateArgs),

    /// Change the update strategy of a repository
    Strategy(StrategyArgs),

    /// Uninstall and delete a repository
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Git URL of the repository
    #[arg(value_name = "URL")]
    pub url: String,

    /// What the repository provides
    #[arg(long = "type", value_enum, default_value_t = RepositoryType::Integration)]
    pub repo_type: RepositoryType,

    /// Which versions count as updates
    #[arg(long, value_enum, default_value_t = UpdateStrategy::LatestTag)]
    pub strategy: UpdateStrategy,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Identifier, URL or name of the repository (default: all)
    #[arg(value_name = "PACKAGE")]
    pub package: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Identifier, URL or name of the repository
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Tag or commit to install (default: latest)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Request a backup before the update
    #[arg(long)]
    pub backup: bool,
}

#[derive(clap::Args, Debug)]
pub struct StrategyArgs {
    /// Identifier, URL or name of the repository
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// New update strategy
    #[arg(value_enum, value_name = "STRATEGY")]
    pub strategy: UpdateStrategy,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Identifier, URL or name of the repository
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = Config::new(gpm::runtime::RealRuntime, cli.root)?;

    match cli.command {
        Commands::Add(args) => {
            commands::add(&config, &args.url, args.repo_type, args.strategy).await?
        }
        Commands::List => commands::list(&config).await?,
        Commands::Check(args) => commands::check(&config, args.package.as_deref()).await?,
        Commands::Update(args) => {
            commands::update(&config, &args.package, args.version, args.backup).await?
        }
        Commands::Strategy(args) => commands::strategy(&config, &args.package, args.strategy)?,
        Commands::Remove(args) => commands::remove(&config, &args.package, args.yes).await?,
    }
    Ok(())
}
