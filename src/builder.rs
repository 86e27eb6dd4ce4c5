use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::matcher::{IngredientMatcher, ScoringWeights};
use crate::nutrition::NutritionCalculator;
use crate::products::{ProductCatalog, ProductRepository};
use crate::repository::{DocumentStore, RecipeRepository};

const DEFAULT_CONCURRENCY: usize = 8;

/// Builder for configuring a [`NutritionCalculator`]
#[derive(Default)]
pub struct NutritionCalculatorBuilder {
    products: Option<Arc<dyn ProductRepository>>,
    recipes: Option<Arc<dyn RecipeRepository>>,
    weights: Option<ScoringWeights>,
    concurrency: Option<usize>,
}

impl NutritionCalculatorBuilder {
    /// Set the product repository ingredients are matched against
    ///
    /// # Example
    /// ```
    /// use receitas_nutri::{NutritionCalculator, ProductCatalog};
    /// use std::sync::Arc;
    ///
    /// let catalog = ProductCatalog::new(Vec::new(), 20);
    /// let builder = NutritionCalculator::builder().products(Arc::new(catalog));
    /// ```
    pub fn products(mut self, products: Arc<dyn ProductRepository>) -> Self {
        self.products = Some(products);
        self
    }

    /// Set the repository nutrition results are read from and saved to
    pub fn recipes(mut self, recipes: Arc<dyn RecipeRepository>) -> Self {
        self.recipes = Some(recipes);
        self
    }

    /// Override the matcher scoring constants
    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Maximum number of ingredient lookups in flight, clamped to
    /// `1..=Semaphore::MAX_PERMITS`
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit);
        self
    }

    /// Build the calculator
    ///
    /// # Errors
    /// Returns `RecipeError::BuilderError` if the product or recipe
    /// repository was not set.
    ///
    /// # Example
    /// ```
    /// use receitas_nutri::{DocumentStore, NutritionCalculator, ProductCatalog};
    /// use std::sync::Arc;
    ///
    /// let calculator = NutritionCalculator::builder()
    ///     .products(Arc::new(ProductCatalog::new(Vec::new(), 20)))
    ///     .recipes(Arc::new(DocumentStore::in_memory()))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn build(self) -> Result<NutritionCalculator, RecipeError> {
        let products = self.products.ok_or_else(|| {
            RecipeError::BuilderError("No product repository specified. Use .products()".to_string())
        })?;
        let recipes = self.recipes.ok_or_else(|| {
            RecipeError::BuilderError("No recipe repository specified. Use .recipes()".to_string())
        })?;

        Ok(NutritionCalculator {
            matcher: IngredientMatcher::new(products, self.weights.unwrap_or_default()),
            recipes,
            concurrency: self
                .concurrency
                .unwrap_or(DEFAULT_CONCURRENCY)
                .clamp(1, Semaphore::MAX_PERMITS),
        })
    }
}

/// Opens the recipe store named by the configuration, in memory if none is set.
pub async fn open_store(config: &AppConfig) -> Result<Arc<DocumentStore>, RecipeError> {
    let store = match &config.nutrition.store_path {
        Some(path) => DocumentStore::open(path).await?,
        None => DocumentStore::in_memory(),
    };
    Ok(Arc::new(store))
}

/// Loads the configured product catalog, `None` when no path is set.
pub fn load_catalog(config: &AppConfig) -> Result<Option<Arc<ProductCatalog>>, RecipeError> {
    config
        .nutrition
        .products_path
        .as_ref()
        .map(|path| ProductCatalog::from_path(path, config.nutrition.search_limit).map(Arc::new))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_products_is_an_error() {
        let result = NutritionCalculator::builder()
            .recipes(Arc::new(DocumentStore::in_memory()))
            .build();
        assert!(matches!(result, Err(RecipeError::BuilderError(_))));
    }

    #[test]
    fn test_missing_recipes_is_an_error() {
        let result = NutritionCalculator::builder()
            .products(Arc::new(ProductCatalog::new(Vec::new(), 20)))
            .build();
        assert!(matches!(result, Err(RecipeError::BuilderError(_))));
    }

    #[test]
    fn test_build_applies_settings() {
        let weights = ScoringWeights {
            max_matches: 1,
            ..Default::default()
        };
        let calculator = NutritionCalculator::builder()
            .products(Arc::new(ProductCatalog::new(Vec::new(), 20)))
            .recipes(Arc::new(DocumentStore::in_memory()))
            .weights(weights.clone())
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(calculator.matcher().weights(), &weights);
        assert_eq!(calculator.concurrency, 1);
    }

    #[tokio::test]
    async fn test_oversized_concurrency_is_clamped() {
        let calculator = NutritionCalculator::builder()
            .products(Arc::new(ProductCatalog::new(Vec::new(), 20)))
            .recipes(Arc::new(DocumentStore::in_memory()))
            .concurrency(usize::MAX)
            .build()
            .unwrap();
        assert_eq!(calculator.concurrency, Semaphore::MAX_PERMITS);

        let recipe = crate::model::RecipeDetails {
            id: "1-ovo".to_string(),
            title: "Ovo cozido".to_string(),
            stats: Default::default(),
            ingredients: vec![crate::model::RecipeSection {
                title: "Ingredientes".to_string(),
                items: vec!["2 ovos".to_string()],
            }],
            instructions: Vec::new(),
        };
        let nutrition = calculator.calculate(&recipe).await;
        assert_eq!(nutrition.ingredients.len(), 1);
    }

    #[test]
    fn test_no_catalog_configured() {
        assert!(load_catalog(&AppConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_catalog_from_config_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            "nome;energia_kcal;carboidrato_total_g;proteina_g;lipidios_g;fibra_alimentar_g\nOvo;143;1,6;13;8,9;0\n"
                .as_bytes(),
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.nutrition.products_path = Some(file.path().to_path_buf());
        let catalog = load_catalog(&config).unwrap().unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_store_without_path() {
        let store = open_store(&AppConfig::default()).await.unwrap();
        assert!(store.get_recipe("x").await.unwrap().is_none());
    }
}
