use serde::Deserialize;

use super::normalize::fold_diacritics;
use crate::model::Product;

/// Names of cooked dishes rather than ingredients. Matched on folded text.
const PREPARED_DISH_KEYWORDS: &[&str] = &[
    "frito", "frita", "fritos", "fritas", "assado", "assada", "assados", "assadas", "empanado",
    "empanada", "milanesa", "ensopado", "ensopada", "refogado", "refogada", "gratinado",
    "gratinada", "mexido", "mexidos", "benedict", "ao molho", "com molho", "a moda", "com", "e",
];

const SIMPLE_KEYWORDS: &[&str] = &[
    "cru", "crua", "crus", "cruas", "natural", "puro", "pura", "inteiro", "inteira", "simples",
    "em po",
];

/// Score deltas for ranking product candidates.
///
/// The defaults are the tuned values; changing them changes ranking, not
/// correctness.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub prepared_dish_penalty: i32,
    pub brand_penalty: i32,
    pub simple_bonus: i32,
    pub short_name_bonus: i32,
    pub three_word_bonus: i32,
    pub per_word_penalty: i32,
    pub prefix_bonus: i32,
    pub after_comma_bonus: i32,
    pub exact_head_bonus: i32,
    /// Candidates must score strictly above this to survive filtering.
    pub min_score: i32,
    pub max_matches: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            prepared_dish_penalty: 100,
            brand_penalty: 50,
            simple_bonus: 50,
            short_name_bonus: 30,
            three_word_bonus: 10,
            per_word_penalty: 5,
            prefix_bonus: 100,
            after_comma_bonus: 80,
            exact_head_bonus: 150,
            min_score: -50,
            max_matches: 3,
        }
    }
}

impl ScoringWeights {
    /// Relevance of `product_name` for `search_term`. Higher is better.
    pub fn score(&self, product_name: &str, search_term: &str) -> i32 {
        let name = fold_diacritics(product_name);
        let term = fold_diacritics(search_term.trim());
        let mut score = 0;

        for keyword in PREPARED_DISH_KEYWORDS {
            score -= self.prepared_dish_penalty * count_word_occurrences(&name, keyword) as i32;
        }

        if looks_like_brand(product_name) {
            score -= self.brand_penalty;
        }

        for keyword in SIMPLE_KEYWORDS {
            score += self.simple_bonus * count_word_occurrences(&name, keyword) as i32;
        }

        let word_count = name
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|word| !word.is_empty())
            .count();
        score += match word_count {
            0..=2 => self.short_name_bonus,
            3 => self.three_word_bonus,
            n => -self.per_word_penalty * n as i32,
        };

        if term.is_empty() {
            return score;
        }

        if name.starts_with(&term) {
            score += self.prefix_bonus;
        }
        if name.contains(&format!(",{term}")) || name.contains(&format!(", {term}")) {
            score += self.after_comma_bonus;
        }
        let head = name
            .split(|c: char| c.is_whitespace() || c == ',')
            .find(|word| !word.is_empty());
        if head == Some(term.as_str()) {
            score += self.exact_head_bonus;
        }

        score
    }

    /// Orders candidates best-first and keeps at most `max_matches`.
    ///
    /// Candidates at or below `min_score` are dropped, unless that would leave
    /// nothing, in which case the single best candidate is kept.
    pub fn rank(&self, candidates: Vec<Product>, search_term: &str) -> Vec<Product> {
        let mut scored: Vec<(i32, Product)> = candidates
            .into_iter()
            .map(|product| (self.score(&product.name, search_term), product))
            .collect();
        // Stable: ties keep repository order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let passing = scored
            .iter()
            .filter(|(score, _)| *score > self.min_score)
            .count();
        let keep = if passing == 0 {
            1
        } else {
            passing.min(self.max_matches)
        };

        scored
            .into_iter()
            .take(keep)
            .map(|(_, product)| product)
            .collect()
    }
}

/// Occurrences of `keyword` in `text` that are not part of a longer word.
fn count_word_occurrences(text: &str, keyword: &str) -> usize {
    text.match_indices(keyword)
        .filter(|(start, _)| {
            let before = text[..*start].chars().next_back();
            let after = text[start + keyword.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count()
}

/// Upper-case words that are part of ordinary food names, not brands.
const FOOD_ACRONYMS: &[&str] = &["UHT", "PTS", "TBCA"];

fn looks_like_brand(name: &str) -> bool {
    if name.contains('®') || name.contains('™') {
        return true;
    }
    if count_word_occurrences(&name.to_lowercase(), "marca") > 0 {
        return true;
    }

    // An all-caps word inside an otherwise mixed-case name, e.g. "Biscoito NESTLÉ"
    let letters_upper = name
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase);
    !letters_upper
        && name.split_whitespace().any(|word| {
            let letters: String = word.chars().filter(|c| c.is_alphabetic()).collect();
            letters.chars().count() >= 3
                && letters.chars().all(char::is_uppercase)
                && !FOOD_ACRONYMS.contains(&letters.as_str())
        })
}
