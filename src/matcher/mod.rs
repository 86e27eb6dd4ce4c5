use log::{debug, warn};
use std::sync::Arc;

use crate::model::IngredientMatch;
use crate::products::ProductRepository;

mod normalize;
mod scoring;

pub use normalize::{extract_main_ingredient, fold_diacritics, singularize};
pub use scoring::ScoringWeights;

/// Finds reference products for free-text ingredient lines.
#[derive(Clone)]
pub struct IngredientMatcher {
    products: Arc<dyn ProductRepository>,
    weights: Arc<ScoringWeights>,
}

impl IngredientMatcher {
    pub fn new(products: Arc<dyn ProductRepository>, weights: ScoringWeights) -> Self {
        Self {
            products,
            weights: Arc::new(weights),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Best candidates for `text`, best first. Repository failures are logged
    /// and reported as an empty match list.
    pub async fn match_ingredient(&self, text: &str) -> IngredientMatch {
        let search_term = extract_main_ingredient(text);
        debug!("Matching '{}' with search term '{}'", text, search_term);

        let matches = match self.products.search_products(&search_term).await {
            Ok(candidates) => {
                let total = candidates.len();
                let ranked = self.weights.rank(candidates, &search_term);
                debug!(
                    "Kept {} of {} candidates for '{}'",
                    ranked.len(),
                    total,
                    search_term
                );
                ranked
            }
            Err(e) => {
                warn!("Product search failed for '{}': {}", search_term, e);
                Vec::new()
            }
        };

        IngredientMatch {
            original_text: text.to_string(),
            search_term,
            matches,
        }
    }
}
