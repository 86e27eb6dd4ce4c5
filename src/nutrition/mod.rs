use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::builder::NutritionCalculatorBuilder;
use crate::error::RecipeError;
use crate::matcher::IngredientMatcher;
use crate::model::{
    CalculationMethod, IngredientNutrition, Product, RecipeDetails, RecipeNutrition, Substitution,
    Substitutions,
};
use crate::quantity::extract_quantity;
use crate::repository::RecipeRepository;

/// Aggregates per-ingredient nutrition into recipe totals, with stored
/// results served from the recipe repository.
pub struct NutritionCalculator {
    pub(crate) matcher: IngredientMatcher,
    pub(crate) recipes: Arc<dyn RecipeRepository>,
    pub(crate) concurrency: usize,
}

impl NutritionCalculator {
    /// Creates a new builder for the calculator
    ///
    /// # Example
    /// ```
    /// use receitas_nutri::NutritionCalculator;
    ///
    /// let builder = NutritionCalculator::builder().concurrency(4);
    /// ```
    pub fn builder() -> NutritionCalculatorBuilder {
        NutritionCalculatorBuilder::default()
    }

    pub fn matcher(&self) -> &IngredientMatcher {
        &self.matcher
    }

    /// Stored nutrition for the recipe if there is one, otherwise a fresh
    /// calculation, saved when `persist` is set.
    pub async fn get_recipe_nutrition(
        &self,
        recipe: &RecipeDetails,
        persist: bool,
    ) -> Result<RecipeNutrition, RecipeError> {
        if let Some(mut stored) = self.recipes.get_nutrition(&recipe.id).await? {
            debug!("Using stored nutrition for recipe {}", recipe.id);
            stored.calculation_method = CalculationMethod::Stored;
            return Ok(stored);
        }
        self.recalculate(recipe, persist).await
    }

    /// Calculates ignoring any stored result. Substitutions recorded for the
    /// recipe are applied on top of the fresh matches.
    pub async fn recalculate(
        &self,
        recipe: &RecipeDetails,
        persist: bool,
    ) -> Result<RecipeNutrition, RecipeError> {
        let mut nutrition = self.calculate(recipe).await;
        let substitutions = self.recipes.get_substitutions(&recipe.id).await?;
        if !substitutions.is_empty() {
            nutrition = apply_substitutions(&nutrition, &substitutions);
        }
        if persist {
            self.recipes.save_nutrition(&recipe.id, &nutrition).await?;
        }
        Ok(nutrition)
    }

    /// Pure calculation, no repository access besides product lookups.
    pub async fn calculate(&self, recipe: &RecipeDetails) -> RecipeNutrition {
        let lines = recipe.ingredient_lines();
        let quantities: Vec<f64> = lines.iter().map(|line| extract_quantity(line)).collect();
        let products = self.best_products(&lines).await;

        let ingredients: Vec<IngredientNutrition> = lines
            .into_iter()
            .zip(quantities)
            .zip(products)
            .map(|((line, grams), product)| IngredientNutrition::new(line, grams, product))
            .collect();

        let matched = ingredients
            .iter()
            .filter(|i| i.matched_product.is_some())
            .count();
        let nutrition =
            RecipeNutrition::calculated(recipe.id.clone(), recipe.stats.portions(), ingredients);

        info!(
            "Calculated nutrition for recipe {}: {} of {} ingredients matched, {:.1} kcal total",
            recipe.id,
            matched,
            nutrition.ingredients.len(),
            nutrition.totals.calories
        );
        nutrition
    }

    /// Replaces the product of ingredient `index`, keeping its estimated
    /// quantity, and re-sums the totals. No other ingredient is re-matched.
    /// With `persist` the choice is recorded so later recalculations keep it.
    pub async fn substitute_ingredient(
        &self,
        nutrition: &RecipeNutrition,
        index: usize,
        product: Product,
        persist: bool,
    ) -> Result<RecipeNutrition, RecipeError> {
        let original = nutrition
            .ingredients
            .get(index)
            .ok_or(RecipeError::InvalidIngredient(index))?;
        debug!(
            "Substituting '{}' with '{}'",
            original.original_text, product.name
        );
        let substitution = Substitution::new(original.original_text.clone(), product);

        let mut substitutions = Substitutions::new();
        substitutions.insert(index, substitution.clone());
        let updated = apply_substitutions(nutrition, &substitutions);

        if persist {
            self.recipes
                .save_substitution(&updated.recipe_id, index, &substitution)
                .await?;
            self.recipes
                .save_nutrition(&updated.recipe_id, &updated)
                .await?;
        }
        Ok(updated)
    }

    /// Best product per line, by line index. Lookups run concurrently up to
    /// the configured limit; a lookup that fails leaves its line unmatched.
    async fn best_products(&self, lines: &[String]) -> Vec<Option<Product>> {
        let permits = self.concurrency.clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for (index, line) in lines.iter().cloned().enumerate() {
            let matcher = self.matcher.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = matcher.match_ingredient(&line).await;
                debug!(
                    "Ingredient {} '{}' -> {:?}",
                    index,
                    line,
                    result.matches.first().map(|p| p.name.as_str())
                );
                (index, result.matches.into_iter().next())
            });
        }

        let mut products = vec![None; lines.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, product)) => products[index] = product,
                Err(e) => warn!("Ingredient lookup task failed: {}", e),
            }
        }
        products
    }
}

/// Swaps in the substituted products, keeping each line's quantity, and
/// re-sums. A substitution whose index or line text no longer matches the
/// recipe is skipped.
fn apply_substitutions(
    nutrition: &RecipeNutrition,
    substitutions: &Substitutions,
) -> RecipeNutrition {
    let mut ingredients = nutrition.ingredients.clone();
    for (&index, substitution) in substitutions {
        match ingredients.get_mut(index) {
            Some(entry) if entry.original_text == substitution.original_ingredient => {
                *entry = IngredientNutrition::new(
                    std::mem::take(&mut entry.original_text),
                    entry.estimated_quantity,
                    Some(substitution.product.clone()),
                );
            }
            _ => warn!(
                "Skipping stale substitution of ingredient {} ('{}') in recipe {}",
                index, substitution.original_ingredient, nutrition.recipe_id
            ),
        }
    }

    RecipeNutrition::calculated(
        nutrition.recipe_id.clone(),
        nutrition.portion_output,
        ingredients,
    )
}
