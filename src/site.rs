use log::{debug, info};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::error::RecipeError;
use crate::extractors::{extract_recipe, extract_search_results};
use crate::fetchers::{PageFetcher, RequestFetcher};
use crate::model::{RecipeDetails, SearchResult};
use crate::repository::RecipeRepository;

/// Client for the recipe site: builds page URLs, fetches and extracts them.
#[derive(Clone)]
pub struct RecipeSite {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    max_results: usize,
}

impl RecipeSite {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: impl Into<String>, max_results: usize) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_results,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self, RecipeError> {
        let fetcher = RequestFetcher::new(Some(Duration::from_secs(config.timeout_secs)))?;
        Ok(Self::new(Arc::new(fetcher), config.base_url.clone(), config.max_results))
    }

    /// Search page URL with the title form-encoded, so spaces become `+` and
    /// characters such as `&` or `#` stay inside the `search` value.
    pub fn search_url(&self, title: &str) -> Result<String, RecipeError> {
        let terms = title.split_whitespace().collect::<Vec<_>>().join(" ");
        let url = Url::parse_with_params(&format!("{}/busca", self.base_url), [("search", terms)])
            .map_err(|e| RecipeError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        Ok(url.into())
    }

    pub fn recipe_url(&self, id: &str) -> String {
        format!("{}/receita/{}.html", self.base_url, id)
    }

    pub async fn search(&self, title: &str) -> Result<Vec<SearchResult>, RecipeError> {
        info!("Searching recipes for '{}'", title);
        let html = self.fetcher.fetch(&self.search_url(title)?).await?;
        extract_search_results(&html, self.max_results)
    }

    /// Fetches and extracts a recipe, stamping `id` on the result.
    pub async fn get_recipe(&self, id: &str) -> Result<RecipeDetails, RecipeError> {
        info!("Fetching recipe {}", id);
        let html = self.fetcher.fetch(&self.recipe_url(id)).await?;
        let mut recipe = extract_recipe(&html)?;
        recipe.id = id.to_string();
        Ok(recipe)
    }

    /// Reads through `repository`, scraping and saving the recipe on a miss.
    pub async fn get_recipe_cached(
        &self,
        id: &str,
        repository: &dyn RecipeRepository,
    ) -> Result<RecipeDetails, RecipeError> {
        if let Some(recipe) = repository.get_recipe(id).await? {
            debug!("Recipe {} served from repository", id);
            return Ok(recipe);
        }

        let recipe = self.get_recipe(id).await?;
        repository.save_recipe(&recipe).await?;
        Ok(recipe)
    }
}
