use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

/// larder - pantry-aware weekly meal planning
#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Weekly meal plans from the recipes and ingredients you have", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate and store a weekly meal plan
    Plan {
        /// Diet to plan for (defaults to the user's dietary goal)
        #[arg(long)]
        diet: Option<String>,

        /// Seed for a reproducible plan
        #[arg(long)]
        seed: Option<u64>,

        /// Deduct the planned ingredients from stock
        #[arg(long)]
        consume: bool,
    },
    /// Show the best recipes for a diet
    Suggest {
        #[arg(long)]
        diet: Option<String>,
    },
    /// Manage ingredient stock files
    #[command(subcommand)]
    Ingredients(cli::ingredients::IngredientsCommand),
    /// Manage the diet reference table
    #[command(subcommand)]
    Preferences(cli::preferences::PreferencesCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = larder::config::Config::load(cli.config.clone())?;

    larder::observability::init_observability(
        "larder",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => {
            config.validate().map_err(|e| anyhow::anyhow!(e))?;
            cli::server::serve(config, host, port).await
        }
        Commands::Plan { diet, seed, consume } => cli::plan::plan(config, diet, seed, consume).await,
        Commands::Suggest { diet } => cli::plan::suggest(config, diet),
        Commands::Ingredients(command) => cli::ingredients::run(config, command).await,
        Commands::Preferences(command) => cli::preferences::run(config, command).await,
    }
}
