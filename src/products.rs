use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::error::RecipeError;
use crate::matcher::fold_diacritics;
use crate::model::Product;

/// Source of nutrition reference data.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Products whose name contains `term`, case and diacritic insensitive.
    async fn search_products(&self, term: &str) -> Result<Vec<Product>, RecipeError>;
}

/// Row of the TBCA-style food composition table.
#[derive(Debug, Deserialize)]
struct ProductRow {
    nome: String,
    #[serde(default)]
    energia_kcal: String,
    #[serde(default)]
    carboidrato_total_g: String,
    #[serde(default)]
    proteina_g: String,
    #[serde(default)]
    lipidios_g: String,
    #[serde(default)]
    fibra_alimentar_g: String,
}

impl ProductRow {
    fn into_product(self) -> Option<Product> {
        let name = self.nome.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Product {
            name,
            calories: parse_amount(&self.energia_kcal),
            carbs: parse_amount(&self.carboidrato_total_g),
            protein: parse_amount(&self.proteina_g),
            fat: parse_amount(&self.lipidios_g),
            fiber: parse_amount(&self.fibra_alimentar_g),
        })
    }
}

/// Table cells use comma decimals and markers like "NA" or "tr" (trace).
fn parse_amount(cell: &str) -> f64 {
    cell.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(0.0)
}

/// In-memory product catalog, loaded once when constructed.
pub struct ProductCatalog {
    products: Vec<Product>,
    folded_names: Vec<String>,
    limit: usize,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>, limit: usize) -> Self {
        let folded_names = products.iter().map(|p| fold_diacritics(&p.name)).collect();
        Self {
            products,
            folded_names,
            limit,
        }
    }

    /// Reads a `;`-delimited table with a header row.
    pub fn from_reader<R: Read>(reader: R, limit: usize) -> Result<Self, RecipeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut products = Vec::new();
        for row in csv_reader.deserialize::<ProductRow>() {
            if let Some(product) = row?.into_product() {
                products.push(product);
            }
        }

        info!("Loaded {} products", products.len());
        Ok(Self::new(products, limit))
    }

    pub fn from_path(path: impl AsRef<Path>, limit: usize) -> Result<Self, RecipeError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file, limit)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Synchronous search used by the repository implementation.
    ///
    /// A name matches when it contains the term, or every word of a multi-word
    /// term ("farinha trigo" finds "Farinha, de trigo"). Ordering: names
    /// starting with the term, then names containing it as a whole word, then
    /// alphabetical.
    pub fn search(&self, term: &str) -> Vec<Product> {
        let query = fold_diacritics(term.trim());
        if query.is_empty() {
            return Vec::new();
        }
        let words: Vec<&str> = query.split_whitespace().collect();

        let mut hits: Vec<(usize, &str)> = self
            .folded_names
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                name.contains(&query) || words.iter().all(|word| name.contains(word))
            })
            .map(|(index, name)| (index, name.as_str()))
            .collect();

        hits.sort_by(|(_, a), (_, b)| {
            let a_key = (!a.starts_with(&query), !has_whole_word(a, &query));
            let b_key = (!b.starts_with(&query), !has_whole_word(b, &query));
            a_key.cmp(&b_key).then_with(|| a.cmp(b))
        });

        debug!("Product search '{}' matched {} items", term, hits.len());

        hits.into_iter()
            .take(self.limit)
            .map(|(index, _)| self.products[index].clone())
            .collect()
    }
}

fn has_whole_word(name: &str, query: &str) -> bool {
    name.match_indices(query).any(|(start, _)| {
        let before = name[..start].chars().next_back();
        let after = name[start + query.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[async_trait]
impl ProductRepository for ProductCatalog {
    async fn search_products(&self, term: &str) -> Result<Vec<Product>, RecipeError> {
        Ok(self.search(term))
    }
}
