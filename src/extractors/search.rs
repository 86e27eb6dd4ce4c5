use log::debug;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::element_text;
use crate::error::RecipeError;
use crate::model::SearchResult;

static RECIPE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/receita/([^/\s]+)\.html").unwrap());

/// Recipe id from a detail page link, e.g. `/receita/123-bolo.html` gives
/// `123-bolo`. The last match wins when a link contains several.
pub fn extract_recipe_id(link: &str) -> Option<String> {
    RECIPE_ID
        .captures_iter(link)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Parses a search results page into at most `max_results` entries.
///
/// Cards without a link are skipped but still count towards the limit.
pub fn extract_search_results(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, RecipeError> {
    let document = Html::parse_document(html);

    if let Ok(no_results) = Selector::parse(".no-results") {
        if document.select(&no_results).next().is_some() {
            return Err(RecipeError::NoResults);
        }
    }

    let (Ok(cards), Ok(link)) = (Selector::parse(".card-recipe"), Selector::parse(".card-link"))
    else {
        return Ok(Vec::new());
    };

    let results: Vec<SearchResult> = document
        .select(&cards)
        .take(max_results)
        .filter_map(|card| {
            let anchor = card.select(&link).next()?;
            let href = anchor.value().attr("href")?;
            let id = extract_recipe_id(href)?;
            Some(SearchResult {
                title: element_text(anchor),
                id,
            })
        })
        .collect();

    debug!("Parsed {} search results", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, href: &str) -> String {
        format!(
            r#"<div class="card-recipe"><a class="card-link" href="{href}">
                <h2>{title}</h2>
            </a></div>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", cards.concat())
    }

    #[test]
    fn test_recipe_id() {
        assert_eq!(
            extract_recipe_id("https://www.tudogostoso.com.br/receita/23-bolo-de-cenoura.html"),
            Some("23-bolo-de-cenoura".to_string())
        );
        assert_eq!(extract_recipe_id("/receita/42-pudim.html?ref=busca"), Some("42-pudim".to_string()));
        assert_eq!(extract_recipe_id("/categorias/bolos"), None);
    }

    #[test]
    fn test_parses_cards() {
        let html = page(&[
            card("Bolo de\n cenoura", "/receita/23-bolo-de-cenoura.html"),
            card("Pudim", "https://www.tudogostoso.com.br/receita/42-pudim.html"),
        ]);
        let results = extract_search_results(&html, 5).unwrap();
        assert_eq!(
            results,
            vec![
                SearchResult {
                    title: "Bolo de cenoura".to_string(),
                    id: "23-bolo-de-cenoura".to_string()
                },
                SearchResult {
                    title: "Pudim".to_string(),
                    id: "42-pudim".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_caps_results() {
        let cards: Vec<String> = (1..=8)
            .map(|i| card(&format!("Receita {i}"), &format!("/receita/{i}-receita.html")))
            .collect();
        let results = extract_search_results(&page(&cards), 5).unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[4].id, "5-receita");
    }

    #[test]
    fn test_cards_without_links_are_skipped() {
        let html = page(&[
            r#"<div class="card-recipe"><span>Anúncio</span></div>"#.to_string(),
            card("Brigadeiro", "/receita/7-brigadeiro.html"),
        ]);
        let results = extract_search_results(&html, 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Brigadeiro");
    }

    #[test]
    fn test_no_results_marker() {
        let html = r#"<html><body><div class="no-results">Nenhuma receita</div></body></html>"#;
        assert!(matches!(
            extract_search_results(html, 5),
            Err(RecipeError::NoResults)
        ));
    }

    #[test]
    fn test_page_without_cards() {
        assert!(extract_search_results("<html><body></body></html>", 5)
            .unwrap()
            .is_empty());
    }
}
