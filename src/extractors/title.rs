use scraper::Html;

use super::json_ld::JsonLdRecipe;
use super::{first_success, select_text, Strategy};

const UNTITLED: &str = "Untitled Recipe";

/// Most specific first.
const TITLE_SELECTORS: &[&str] = &[
    "div.recipe-title h1",
    ".recipe-title h1",
    "h1.recipe-title",
    "article h1",
    "h1",
];

/// Recipe title from the page headings, then the structured data name.
/// Never fails.
pub fn extract_title(document: &Html, json_ld: &JsonLdRecipe) -> String {
    let mut strategies: Vec<Strategy<String>> = TITLE_SELECTORS
        .iter()
        .map(|&css| -> Strategy<String> {
            Box::new(move |doc: &Html| select_text(doc.root_element(), css))
        })
        .collect();

    let name = json_ld.name.clone();
    strategies.push(Box::new(move |_| name.clone()));

    first_success(document, &strategies).unwrap_or_else(|| UNTITLED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_of(html: &str) -> String {
        let document = Html::parse_document(html);
        let json_ld = JsonLdRecipe::from_document(&document);
        extract_title(&document, &json_ld)
    }

    #[test]
    fn test_specific_container_wins() {
        let html = r#"<html><body>
            <h1>Site header</h1>
            <div class="recipe-title"><h1>Bolo de
                cenoura</h1></div>
        </body></html>"#;
        assert_eq!(title_of(html), "Bolo de cenoura");
    }

    #[test]
    fn test_empty_heading_is_skipped() {
        let html = r#"<html><body><article><h1>  </h1></article><h1>Pudim</h1></body></html>"#;
        // The empty article heading falls through to the generic selector
        assert_eq!(title_of(html), "Pudim");
    }

    #[test]
    fn test_structured_data_name_fallback() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "Recipe", "name": "Feij&amp;atilde;o tropeiro"}
        </script></head><body></body></html>"#;
        assert_eq!(title_of(html), "Feijão tropeiro");
    }

    #[test]
    fn test_untitled_fallback() {
        assert_eq!(title_of("<html><body><p>nothing</p></body></html>"), UNTITLED);
    }
}
