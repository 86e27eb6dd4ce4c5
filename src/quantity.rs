//! Estimates the mass in grams described by a free-text ingredient line.
//!
//! The grammar is small: an optional leading magnitude (mixed number, fraction
//! or decimal) followed somewhere by a unit from a fixed table. Lines without a
//! unit fall back to per-item weights for a few common produce items.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Returned when the line carries no quantity at all.
pub const DEFAULT_GRAMS: f64 = 20.0;
/// Returned for "a gosto", "pitada" and similar.
pub const NEGLIGIBLE_GRAMS: f64 = 1.0;
/// Weight of a generic counted item ("2 pimentões").
pub const GENERIC_ITEM_GRAMS: f64 = 30.0;

const NEGLIGIBLE_MARKERS: &[&str] = &["pitada", "a gosto", "q.b.", "quanto baste"];

const UNIT_GRAMS: &[(&str, f64)] = &[
    // Weight
    ("kg", 1000.0),
    ("g", 1.0),
    ("gr", 1.0),
    ("grama", 1.0),
    ("gramas", 1.0),
    // Volume to weight, approximate
    ("xícara", 120.0),
    ("xícaras", 120.0),
    ("xic", 120.0),
    ("copo", 240.0),
    ("copos", 240.0),
    // Tablespoon
    ("colher (sopa)", 15.0),
    ("colheres (sopa)", 15.0),
    ("colher de sopa", 15.0),
    ("colheres de sopa", 15.0),
    ("colher sopa", 15.0),
    ("col. sopa", 15.0),
    ("col sopa", 15.0),
    ("cs", 15.0),
    ("(sopa)", 15.0),
    ("sopa", 15.0),
    // Teaspoon
    ("colher (chá)", 5.0),
    ("colheres (chá)", 5.0),
    ("colher de chá", 5.0),
    ("colheres de chá", 5.0),
    ("colher chá", 5.0),
    ("col. chá", 5.0),
    ("col chá", 5.0),
    ("cc", 5.0),
    ("(chá)", 5.0),
    // Liquid
    ("ml", 1.0),
    ("mililitro", 1.0),
    ("mililitros", 1.0),
    ("litro", 1000.0),
    ("litros", 1000.0),
    // Counted items
    ("ovo", 50.0),
    ("ovos", 50.0),
    ("dente", 5.0),
    ("dentes", 5.0),
];

const ITEM_GRAMS: &[(&str, f64)] = &[
    ("banana", 120.0),
    ("tomate", 100.0),
    ("cebola", 150.0),
    ("batata", 150.0),
    ("cenoura", 100.0),
    ("maçã", 150.0),
];

/// Unit table ordered longest key first; ties keep table order.
static UNITS_LONGEST_FIRST: LazyLock<Vec<(&'static str, f64)>> = LazyLock::new(|| {
    let mut units = UNIT_GRAMS.to_vec();
    units.sort_by_key(|(unit, _)| std::cmp::Reverse(unit.chars().count()));
    units
});

static MIXED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+(?:e\s+)?(\d+)\s*/\s*(\d+)").unwrap());
static FRACTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").unwrap());
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").unwrap());
static LITER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*l\b").unwrap());

/// Estimated grams for an ingredient line. Never fails; see [`estimate_grams`]
/// for the cases that fall back to [`DEFAULT_GRAMS`].
pub fn extract_quantity(text: &str) -> f64 {
    match estimate_grams(text) {
        Some(grams) if grams.is_finite() && grams >= 0.0 => grams,
        _ => DEFAULT_GRAMS,
    }
}

/// Estimated grams, or `None` when neither a magnitude nor a unit is present.
pub fn estimate_grams(text: &str) -> Option<f64> {
    let text = text.to_lowercase();

    if NEGLIGIBLE_MARKERS.iter().any(|marker| text.contains(marker)) {
        return Some(NEGLIGIBLE_GRAMS);
    }

    let magnitude = parse_magnitude(&text);

    if let Some((unit, grams_per_unit)) = find_unit(&text) {
        // "uma xícara" has no digits but still means one
        let count = magnitude.unwrap_or(1.0);
        debug!("Quantity: {} {} = {}g", count, unit, count * grams_per_unit);
        return Some(count * grams_per_unit);
    }

    let magnitude = magnitude?;

    if LITER_SUFFIX.is_match(&text) {
        return Some(magnitude * 1000.0);
    }

    if let Some((item, grams)) = ITEM_GRAMS.iter().find(|(item, _)| text.contains(item)) {
        debug!("Quantity: {} {} = {}g", magnitude, item, magnitude * grams);
        return Some(magnitude * grams);
    }

    Some(magnitude * GENERIC_ITEM_GRAMS)
}

/// Leading numeric magnitude: mixed number, then bare fraction, then decimal.
pub fn parse_magnitude(text: &str) -> Option<f64> {
    if let Some(caps) = MIXED_NUMBER.captures(text) {
        let whole: f64 = caps[1].parse().ok()?;
        if let Some(fraction) = ratio(&caps[2], &caps[3]) {
            return Some(whole + fraction);
        }
    }

    if let Some(caps) = FRACTION.captures(text) {
        if let Some(fraction) = ratio(&caps[1], &caps[2]) {
            return Some(fraction);
        }
    }

    DECIMAL
        .find(text)
        .and_then(|m| m.as_str().replace(',', ".").parse().ok())
}

fn ratio(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator: f64 = numerator.parse().ok()?;
    let denominator: f64 = denominator.parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// First unit, longest key first, that occurs in `text` as a whole token.
fn find_unit(text: &str) -> Option<(&'static str, f64)> {
    UNITS_LONGEST_FIRST
        .iter()
        .copied()
        .find(|(unit, _)| contains_token(text, unit))
}

/// Substring match that does not start or end inside a word, so "g" matches
/// "200g" but not "grandes".
fn contains_token(text: &str, needle: &str) -> bool {
    text.match_indices(needle).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
    })
}
