use anyhow::Result;
use larder::config::Config;
use larder::planning::{PlanOptions, generate_and_store, resolve_diet};
use larder::store::DataStore;
use larder_mealplan::{DEFAULT_SUGGESTIONS, suggest as suggest_recipes};
use larder_shopping::export::format_amount;

pub async fn plan(
    config: Config,
    diet: Option<String>,
    seed: Option<u64>,
    consume: bool,
) -> Result<()> {
    let data = DataStore::new(config.data);
    let options = PlanOptions {
        diet,
        seed,
        consume_ingredients: consume,
    };

    let generated = generate_and_store(&data, &options).await?;

    println!("Diet: {}", generated.diet);
    print!("{}", generated.outcome.plan.render_text());

    let diagnostics = &generated.outcome.diagnostics;
    if !diagnostics.unfilled.is_empty() {
        println!("\n{} slot(s) could not be filled", diagnostics.unfilled.len());
    }
    for day in diagnostics.repaired_days() {
        println!("Protein repaired on {}", day);
    }

    if generated.shortfall.is_empty() {
        println!("\nEverything is in stock.");
    } else {
        println!("\nGrocery list:");
        for entry in &generated.shortfall {
            println!(
                "  {}: {} {}",
                entry.ingredient,
                format_amount(entry.missing_amount),
                entry.unit
            );
        }
    }

    tracing::info!(
        grocery_list = %data.paths().path(&data.paths().grocery_list_file).display(),
        "Plan written"
    );
    Ok(())
}

pub fn suggest(config: Config, diet: Option<String>) -> Result<()> {
    let data = DataStore::new(config.data);
    let catalog = data.recipes()?;
    let ledger = data.merged_ingredients()?;
    let (diet, goals) = resolve_diet(diet.as_deref(), &data.user_data()?, &data.diet_preferences()?)?;

    let suggestions = suggest_recipes(&catalog, &ledger, &diet, &goals, DEFAULT_SUGGESTIONS);
    if suggestions.is_empty() {
        println!("No {} recipes can be made from current stock.", diet);
        return Ok(());
    }

    println!("Top {} recipes:", diet);
    for (rank, suggestion) in suggestions.iter().enumerate() {
        println!(
            "{}. {} (score {:.2}) - {}",
            rank + 1,
            suggestion.recipe.name,
            suggestion.score,
            suggestion.reason
        );
    }
    Ok(())
}
