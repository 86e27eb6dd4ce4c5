pub mod builder;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod matcher;
pub mod model;
pub mod nutrition;
pub mod products;
pub mod quantity;
pub mod repository;
pub mod server;
pub mod site;

// Re-export commonly used types
pub use builder::NutritionCalculatorBuilder;
pub use config::AppConfig;
pub use error::RecipeError;
pub use extractors::{extract_recipe, extract_search_results};
pub use fetchers::{PageFetcher, RequestFetcher};
pub use matcher::{extract_main_ingredient, IngredientMatcher, ScoringWeights};
pub use model::{
    CalculationMethod, IngredientMatch, IngredientNutrition, NutrientValues, Product,
    RecipeDetails, RecipeNutrition, RecipeSection, RecipeStats, SearchResult, Substitution,
    Substitutions,
};
pub use nutrition::NutritionCalculator;
pub use products::{ProductCatalog, ProductRepository};
pub use quantity::extract_quantity;
pub use repository::{DocumentStore, RecipeRepository};
pub use site::RecipeSite;

/// Scrapes a recipe by id using the configured site settings.
///
/// This is a convenience wrapper around [`RecipeSite`].
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), receitas_nutri::RecipeError> {
/// let recipe = receitas_nutri::fetch_recipe("23-bolo-de-cenoura").await?;
/// println!("{}", recipe.title);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_recipe(id: &str) -> Result<RecipeDetails, RecipeError> {
    let config = AppConfig::load(None)?;
    RecipeSite::from_config(&config.site)?.get_recipe(id).await
}

/// Searches recipes by title using the configured site settings.
pub async fn search_recipes(title: &str) -> Result<Vec<SearchResult>, RecipeError> {
    let config = AppConfig::load(None)?;
    RecipeSite::from_config(&config.site)?.search(title).await
}
