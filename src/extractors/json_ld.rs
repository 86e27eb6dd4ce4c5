use crate::model::RecipeStats;
use html_escape::decode_html_entities;
use log::debug;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static PREP_MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"PT(\d+)M").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Recipe fields read from the page's JSON-LD blocks.
///
/// When several blocks describe a recipe, later blocks overwrite the fields
/// they provide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonLdRecipe {
    pub name: Option<String>,
    pub prep_time_minutes: Option<u32>,
    pub recipe_yield: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    name: Option<String>,
    #[serde(rename = "prepTime")]
    prep_time: Option<String>,
    #[serde(rename = "recipeYield")]
    recipe_yield: Option<RecipeYield>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeYield {
    String(String),
    Number(serde_json::Number),
    Array(Vec<Value>),
}

impl RecipeYield {
    fn as_text(&self) -> String {
        match self {
            RecipeYield::String(s) => s.clone(),
            RecipeYield::Number(n) => n.to_string(),
            RecipeYield::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

fn decode_html_symbols(text: &str) -> String {
    // Some sites double-encode entities
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| kind.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Parses a script body, falling back to the span from the first `{` to the
/// last `}` when the block carries extra text around the object.
fn parse_block(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
        return Some(value);
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn candidates(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            let graph = match object.remove("@graph") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let mut all = vec![Value::Object(object)];
            all.extend(graph);
            all
        }
        _ => Vec::new(),
    }
}

impl JsonLdRecipe {
    pub fn from_document(document: &Html) -> Self {
        let mut recipe = Self::default();
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return recipe;
        };

        for (index, script) in document.select(&selector).enumerate() {
            let Some(value) = parse_block(&script.inner_html()) else {
                debug!("Skipping unparsable JSON-LD block {}", index);
                continue;
            };

            for candidate in candidates(value).into_iter().filter(is_recipe_type) {
                match serde_json::from_value::<RawRecipe>(candidate) {
                    Ok(raw) => recipe.merge(raw),
                    Err(e) => debug!("Skipping malformed recipe in block {}: {}", index, e),
                }
            }
        }

        recipe
    }

    fn merge(&mut self, raw: RawRecipe) {
        if let Some(name) = raw.name.map(|n| decode_html_symbols(n.trim())) {
            if !name.is_empty() {
                self.name = Some(name);
            }
        }
        if let Some(minutes) = raw.prep_time.as_deref().and_then(prep_minutes) {
            self.prep_time_minutes = Some(minutes);
        }
        if let Some(portions) = raw
            .recipe_yield
            .map(|y| y.as_text())
            .as_deref()
            .and_then(first_number)
        {
            self.recipe_yield = Some(portions);
        }
    }
}

fn prep_minutes(duration: &str) -> Option<u32> {
    PREP_MINUTES.captures(duration)?.get(1)?.as_str().parse().ok()
}

fn first_number(text: &str) -> Option<u32> {
    DIGITS.find(text)?.as_str().parse().ok()
}

/// Stats from structured data. Favorites are not published there and stay 0;
/// a yield of zero is ignored so the portion count stays usable as a divisor.
pub fn extract_stats(json_ld: &JsonLdRecipe) -> RecipeStats {
    let mut stats = RecipeStats::default();
    if let Some(minutes) = json_ld.prep_time_minutes {
        stats.prepare_time_minutes = minutes;
    }
    if let Some(portions) = json_ld.recipe_yield.filter(|p| *p > 0) {
        stats.portion_output = portions;
    }
    stats
}
