use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use receitas_nutri::builder::{load_catalog, open_store};
use receitas_nutri::{
    extract_quantity, AppConfig, DocumentStore, IngredientMatcher, NutritionCalculator,
    ProductCatalog, RecipeError, RecipeSite,
};

/// Scrapes recipes and estimates their nutrition.
#[derive(Parser)]
#[command(name = "receitas-nutri", version, about)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./receitas.toml if present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search recipes by title
    Search { title: String },

    /// Show a recipe's details
    Recipe { id: String },

    /// Estimate a recipe's nutrition
    Nutrition {
        id: String,

        /// Do not save the result to the store
        #[arg(long)]
        no_persist: bool,

        /// Ignore any stored result
        #[arg(long)]
        refresh: bool,
    },

    /// Replace the matched product of one ingredient line and keep the choice
    Substitute {
        id: String,

        /// Ingredient position, counting from 0 across all sections
        index: usize,

        /// Product name to look up in the catalog
        product: String,
    },

    /// Estimate the grams of one ingredient line
    Quantity { text: String },

    /// Show the search term and best product matches for an ingredient line
    Ingredient { text: String },

    /// Start the HTTP server
    Serve,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), RecipeError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_catalog(config: &AppConfig) -> Result<Arc<ProductCatalog>, RecipeError> {
    load_catalog(config)?.ok_or_else(|| {
        RecipeError::BuilderError(
            "No product catalog configured. Set nutrition.products_path".to_string(),
        )
    })
}

fn build_calculator(
    config: &AppConfig,
    catalog: Arc<ProductCatalog>,
    store: Arc<DocumentStore>,
) -> Result<NutritionCalculator, RecipeError> {
    NutritionCalculator::builder()
        .products(catalog)
        .recipes(store)
        .weights(config.matcher.clone())
        .concurrency(config.nutrition.concurrency)
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search { title } => {
            let site = RecipeSite::from_config(&config.site)?;
            print_json(&site.search(&title).await?)?;
        }
        Commands::Recipe { id } => {
            let site = RecipeSite::from_config(&config.site)?;
            let store = open_store(&config).await?;
            print_json(&site.get_recipe_cached(&id, store.as_ref()).await?)?;
        }
        Commands::Nutrition {
            id,
            no_persist,
            refresh,
        } => {
            let catalog = require_catalog(&config)?;
            let site = RecipeSite::from_config(&config.site)?;
            let store = open_store(&config).await?;
            let calculator = build_calculator(&config, catalog, store.clone())?;

            let recipe = site.get_recipe_cached(&id, store.as_ref()).await?;
            let nutrition = if refresh {
                calculator.recalculate(&recipe, !no_persist).await?
            } else {
                calculator.get_recipe_nutrition(&recipe, !no_persist).await?
            };
            print_json(&nutrition)?;
        }
        Commands::Substitute { id, index, product } => {
            let catalog = require_catalog(&config)?;
            let replacement = catalog.search(&product).into_iter().next().ok_or_else(|| {
                RecipeError::Repository(format!("No product matching '{}'", product))
            })?;
            let site = RecipeSite::from_config(&config.site)?;
            let store = open_store(&config).await?;
            let calculator = build_calculator(&config, catalog, store.clone())?;

            let recipe = site.get_recipe_cached(&id, store.as_ref()).await?;
            let nutrition = calculator.get_recipe_nutrition(&recipe, true).await?;
            print_json(
                &calculator
                    .substitute_ingredient(&nutrition, index, replacement, true)
                    .await?,
            )?;
        }
        Commands::Quantity { text } => {
            print_json(&json!({ "text": text, "grams": extract_quantity(&text) }))?;
        }
        Commands::Ingredient { text } => {
            let catalog = require_catalog(&config)?;
            let matcher = IngredientMatcher::new(catalog, config.matcher.clone());
            let result = matcher.match_ingredient(&text).await;
            print_json(&result)?;
        }
        Commands::Serve => {
            receitas_nutri::server::run_server(&config).await?;
        }
    }

    Ok(())
}
