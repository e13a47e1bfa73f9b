use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use larder::config::Config;
use larder::import::{generate_ingredients, import_lines};
use larder::store::DataStore;
use larder_recipe::io as recipe_io;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Subcommand)]
pub enum IngredientsCommand {
    /// Add `name,quantity,unit` lines to the user stock
    Import {
        /// Read lines from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Overwrite the main stock file with random ingredients
    Generate {
        #[arg(long, default_value_t = 50)]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

pub async fn run(config: Config, command: IngredientsCommand) -> Result<()> {
    let data = DataStore::new(config.data);
    match command {
        IngredientsCommand::Import { file } => import(&data, file).await,
        IngredientsCommand::Generate { count, seed } => generate(&data, count, seed),
    }
}

async fn import(data: &DataStore, file: Option<PathBuf>) -> Result<()> {
    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let lines = reader.lines().collect::<Result<Vec<String>, _>>()?;
    let report = import_lines(lines.iter().map(String::as_str));

    for status in &report.lines {
        match &status.result {
            Ok(entry) => println!("line {}: added {} {} {}", status.line, entry.name, entry.quantity, entry.unit),
            Err(reason) => println!("line {}: rejected '{}': {}", status.line, status.input, reason),
        }
    }

    let accepted: Vec<_> = report.accepted().cloned().collect();
    if !accepted.is_empty() {
        data.update_user_ingredients(|ledger| -> Result<()> {
            for entry in &accepted {
                ledger.upsert(&entry.name, entry.quantity, entry.unit)?;
            }
            Ok(())
        })
        .await?;
    }

    println!(
        "{} ingredient(s) imported, {} line(s) rejected",
        accepted.len(),
        report.rejected()
    );
    tracing::info!(
        accepted = accepted.len(),
        rejected = report.rejected(),
        "Ingredient import finished"
    );
    Ok(())
}

fn generate(data: &DataStore, count: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let ledger = generate_ingredients(count, &mut rng);

    let path = data.paths().path(&data.paths().ingredients_file);
    recipe_io::save_ingredients(&path, &ledger)?;

    println!("Wrote {} ingredients to {}", ledger.len(), path.display());
    Ok(())
}
