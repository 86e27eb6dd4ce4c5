use crate::error::RecipeError;
use crate::model::{RecipeDetails, SearchResult};
use log::debug;
use scraper::{ElementRef, Html, Selector};

mod json_ld;
mod search;
mod sections;
mod title;

pub use json_ld::{extract_stats, JsonLdRecipe};
pub use search::{extract_recipe_id, extract_search_results};
pub use sections::{extract_ingredients, extract_instructions};
pub use title::extract_title;

/// Marker the site leaves in the body when a recipe URL bounced elsewhere.
const NOT_FOUND_MARKER: &str = "redirected";

/// One way of finding a value in a document. `None` means "try the next one".
pub type Strategy<T> = Box<dyn Fn(&Html) -> Option<T>>;

/// Runs `strategies` in order and returns the first value found.
pub fn first_success<T>(document: &Html, strategies: &[Strategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(document))
}

/// Extracts a recipe from a detail page.
///
/// Missing pieces degrade to defaults; the only failure is the site's
/// not-found marker.
pub fn extract_recipe(html: &str) -> Result<RecipeDetails, RecipeError> {
    let document = Html::parse_document(html);

    if is_not_found(&document) {
        debug!("Page carries the not-found marker");
        return Err(RecipeError::NotFound);
    }

    let json_ld = JsonLdRecipe::from_document(&document);
    let recipe = RecipeDetails {
        id: String::new(),
        title: extract_title(&document, &json_ld),
        stats: extract_stats(&json_ld),
        ingredients: extract_ingredients(&document),
        instructions: extract_instructions(&document),
    };

    debug!(
        "Extracted '{}' with {} ingredient sections and {} instruction sections",
        recipe.title,
        recipe.ingredients.len(),
        recipe.instructions.len()
    );
    Ok(recipe)
}

fn is_not_found(document: &Html) -> bool {
    let Ok(body) = Selector::parse("body") else {
        return false;
    };
    document
        .select(&body)
        .next()
        .is_some_and(|body| body.inner_html().contains(NOT_FOUND_MARKER))
}

/// Text content of an element with runs of whitespace (newlines included)
/// collapsed to single spaces.
pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text for `css` under `scope`.
pub(crate) fn select_text(scope: ElementRef, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_marker() {
        let html = "<html><body><p>You are being redirected.</p></body></html>";
        assert!(matches!(extract_recipe(html), Err(RecipeError::NotFound)));
    }

    #[test]
    fn test_marker_outside_body_is_ignored() {
        let html = "<html><head><title>redirected</title></head><body><h1>Pudim</h1></body></html>";
        let recipe = extract_recipe(html).unwrap();
        assert_eq!(recipe.title, "Pudim");
    }

    #[test]
    fn test_bare_page_degrades_to_defaults() {
        let recipe = extract_recipe("<html><body></body></html>").unwrap();
        assert_eq!(recipe.title, "Untitled Recipe");
        assert_eq!(recipe.stats.portion_output, 1);
        assert_eq!(recipe.stats.prepare_time_minutes, 0);
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_first_success_order() {
        let document = Html::parse_document("<html><body></body></html>");
        let strategies: Vec<Strategy<&str>> = vec![
            Box::new(|_| None),
            Box::new(|_| Some("second")),
            Box::new(|_| Some("third")),
        ];
        assert_eq!(first_success(&document, &strategies), Some("second"));
        assert_eq!(first_success::<&str>(&document, &[]), None);
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let document = Html::parse_fragment("<h1>\n  Bolo de\n   fubá  </h1>");
        assert_eq!(element_text(document.root_element()), "Bolo de fubá");
    }
}
