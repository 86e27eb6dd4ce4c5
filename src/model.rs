use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A titled group of ingredient lines or instruction steps, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSection {
    pub title: String,
    pub items: Vec<String>,
}

impl RecipeSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeStats {
    #[serde(default)]
    pub prepare_time_minutes: u32,
    #[serde(default = "default_portion_output")]
    pub portion_output: u32,
    #[serde(default)]
    pub favorites: u32,
}

fn default_portion_output() -> u32 {
    1
}

impl Default for RecipeStats {
    fn default() -> Self {
        Self {
            prepare_time_minutes: 0,
            portion_output: default_portion_output(),
            favorites: 0,
        }
    }
}

impl RecipeStats {
    /// Portion count usable as a divisor (never zero).
    pub fn portions(&self) -> u32 {
        self.portion_output.max(1)
    }
}

/// Structured recipe as extracted from a detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetails {
    /// Site identifier, filled in by whoever knows which page was fetched.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub stats: RecipeStats,
    #[serde(default)]
    pub ingredients: Vec<RecipeSection>,
    #[serde(default)]
    pub instructions: Vec<RecipeSection>,
}

impl RecipeDetails {
    /// All ingredient lines across sections, in order.
    pub fn ingredient_lines(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .flat_map(|section| section.items.iter().cloned())
            .collect()
    }
}

/// One entry of a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub id: String,
}

/// The five tracked nutrients. Used both per 100 g and as absolute amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientValues {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl NutrientValues {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            carbs: self.carbs * factor,
            protein: self.protein * factor,
            fat: self.fat * factor,
            fiber: self.fiber * factor,
        }
    }

    pub fn divided_by(&self, divisor: f64) -> Self {
        Self {
            calories: self.calories / divisor,
            carbs: self.carbs / divisor,
            protein: self.protein / divisor,
            fat: self.fat / divisor,
            fiber: self.fiber / divisor,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for NutrientValues {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            calories: self.calories + other.calories,
            carbs: self.carbs + other.carbs,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            fiber: self.fiber + other.fiber,
        }
    }
}

impl AddAssign for NutrientValues {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for NutrientValues {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Reference food item. Nutrient values are per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl Product {
    pub fn per_100g(&self) -> NutrientValues {
        NutrientValues {
            calories: self.calories,
            carbs: self.carbs,
            protein: self.protein,
            fat: self.fat,
            fiber: self.fiber,
        }
    }

    /// Nutrients contributed by `grams` of this product.
    pub fn contribution(&self, grams: f64) -> NutrientValues {
        self.per_100g().scaled(grams / 100.0)
    }
}

/// Search result for one ingredient line, best candidates first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMatch {
    pub original_text: String,
    pub search_term: String,
    pub matches: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientNutrition {
    pub original_text: String,
    pub matched_product: Option<Product>,
    /// Grams
    pub estimated_quantity: f64,
    pub nutrition_contribution: NutrientValues,
}

impl IngredientNutrition {
    pub fn new(original_text: String, estimated_quantity: f64, product: Option<Product>) -> Self {
        let nutrition_contribution = product
            .as_ref()
            .map(|p| p.contribution(estimated_quantity))
            .unwrap_or_default();
        Self {
            original_text,
            matched_product: product,
            estimated_quantity,
            nutrition_contribution,
        }
    }

    pub fn unmatched(original_text: String, estimated_quantity: f64) -> Self {
        Self::new(original_text, estimated_quantity, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMethod {
    Stored,
    Calculated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeNutrition {
    pub recipe_id: String,
    #[serde(flatten)]
    pub totals: NutrientValues,
    pub portion_output: u32,
    pub per_serving: NutrientValues,
    pub calculation_method: CalculationMethod,
    pub last_calculated: DateTime<Utc>,
    pub ingredients: Vec<IngredientNutrition>,
}

impl RecipeNutrition {
    /// Builds a freshly calculated result, summing contributions in ingredient order.
    pub fn calculated(
        recipe_id: impl Into<String>,
        portion_output: u32,
        ingredients: Vec<IngredientNutrition>,
    ) -> Self {
        let portion_output = portion_output.max(1);
        let totals: NutrientValues = ingredients
            .iter()
            .map(|ingredient| ingredient.nutrition_contribution)
            .sum();
        Self {
            recipe_id: recipe_id.into(),
            totals,
            portion_output,
            per_serving: totals.divided_by(portion_output as f64),
            calculation_method: CalculationMethod::Calculated,
            last_calculated: Utc::now(),
            ingredients,
        }
    }
}

/// A user's choice of product for one ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    /// Line text at the time of the substitution; a line that has changed
    /// since is no longer substituted.
    pub original_ingredient: String,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

impl Substitution {
    pub fn new(original_ingredient: impl Into<String>, product: Product) -> Self {
        Self {
            original_ingredient: original_ingredient.into(),
            product,
            created_at: Utc::now(),
        }
    }
}

/// Substitutions of a recipe by ingredient index.
pub type Substitutions = BTreeMap<usize, Substitution>;
