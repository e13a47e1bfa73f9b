use anyhow::Result;
use clap::Subcommand;
use larder::config::Config;
use larder::store::DataStore;
use larder_recipe::DietPreferences;

#[derive(Subcommand)]
pub enum PreferencesCommand {
    /// Write the built-in diet table
    Init {
        /// Replace an existing table
        #[arg(long)]
        force: bool,
    },
    /// List the configured diets and their daily goals
    List,
}

pub async fn run(config: Config, command: PreferencesCommand) -> Result<()> {
    let data = DataStore::new(config.data);
    match command {
        PreferencesCommand::Init { force } => {
            let path = data.paths().path(&data.paths().diet_preferences_file);
            if path.exists() && !force {
                tracing::warn!("{} already exists, pass --force to replace it", path.display());
                return Ok(());
            }
            data.save_diet_preferences(&DietPreferences::builtin()).await?;
            println!("Wrote diet preferences to {}", path.display());
        }
        PreferencesCommand::List => {
            for entry in data.diet_preferences()?.entries {
                let goals = entry.nutritional_goals;
                println!(
                    "{}: {} kcal, {}g protein, {}g carbs, {}g fat",
                    entry.diet, goals.calories, goals.protein, goals.carbs, goals.fat
                );
            }
        }
    }
    Ok(())
}
