use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::RecipeError;
use crate::model::{RecipeDetails, RecipeNutrition, Substitution, Substitutions};

/// Field of a recipe document holding its nutrition result.
const NUTRITION_FIELD: &str = "nutrition";
/// Field of a recipe document holding user substitutions by ingredient index.
const SUBSTITUTIONS_FIELD: &str = "substitutions";

/// Persistent storage for scraped recipes and their nutrition results.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn get_recipe(&self, id: &str) -> Result<Option<RecipeDetails>, RecipeError>;

    /// Merges the recipe into its document; other fields are left untouched.
    async fn save_recipe(&self, recipe: &RecipeDetails) -> Result<(), RecipeError>;

    async fn get_nutrition(&self, id: &str) -> Result<Option<RecipeNutrition>, RecipeError>;

    /// Merges the nutrition result into the recipe's document.
    async fn save_nutrition(&self, id: &str, nutrition: &RecipeNutrition)
        -> Result<(), RecipeError>;

    /// Substitutions chosen for the recipe, keyed by ingredient index.
    async fn get_substitutions(&self, id: &str) -> Result<Substitutions, RecipeError>;

    /// Records the substitution for one ingredient, replacing any earlier
    /// one at the same index.
    async fn save_substitution(
        &self,
        id: &str,
        index: usize,
        substitution: &Substitution,
    ) -> Result<(), RecipeError>;
}

/// JSON document store keyed by recipe id, optionally mirrored to a file.
#[derive(Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Map<String, Value>>>,
    path: Option<PathBuf>,
}

impl DocumentStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed store, starting empty if the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RecipeError> {
        let path = path.as_ref().to_path_buf();
        let documents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if !contents.trim().is_empty() => serde_json::from_str(&contents)?,
            Ok(_) => HashMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened document store {:?} with {} documents", path, documents.len());

        Ok(Self {
            documents: RwLock::new(documents),
            path: Some(path),
        })
    }

    /// Raw document for `id`, mostly useful for inspection.
    pub async fn document(&self, id: &str) -> Option<Map<String, Value>> {
        self.documents.read().await.get(id).cloned()
    }

    /// Applies `change` to a copy of the document for `id` and commits it
    /// only once the file, if any, has been written.
    async fn update<F>(&self, id: &str, change: F) -> Result<(), RecipeError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<(), RecipeError> + Send,
    {
        let mut documents = self.documents.write().await;
        let mut document = documents.get(id).cloned().unwrap_or_default();
        change(&mut document)?;

        if let Some(path) = &self.path {
            let mut snapshot = documents.clone();
            snapshot.insert(id.to_string(), document.clone());
            let contents = serde_json::to_string_pretty(&snapshot)?;
            tokio::fs::write(path, contents).await?;
        }

        documents.insert(id.to_string(), document);
        Ok(())
    }

    async fn merge(&self, id: &str, fields: Map<String, Value>) -> Result<(), RecipeError> {
        self.update(id, |document| {
            document.extend(fields);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl RecipeRepository for DocumentStore {
    async fn get_recipe(&self, id: &str) -> Result<Option<RecipeDetails>, RecipeError> {
        let documents = self.documents.read().await;
        let Some(document) = documents.get(id) else {
            return Ok(None);
        };
        if !document.contains_key("title") {
            return Ok(None);
        }

        let mut fields = document.clone();
        fields.remove(NUTRITION_FIELD);
        fields.remove(SUBSTITUTIONS_FIELD);
        let recipe = serde_json::from_value(Value::Object(fields))?;
        Ok(Some(recipe))
    }

    async fn save_recipe(&self, recipe: &RecipeDetails) -> Result<(), RecipeError> {
        let Value::Object(fields) = serde_json::to_value(recipe)? else {
            return Err(RecipeError::Repository(
                "recipe did not serialize to an object".to_string(),
            ));
        };
        self.merge(&recipe.id, fields).await
    }

    async fn get_nutrition(&self, id: &str) -> Result<Option<RecipeNutrition>, RecipeError> {
        let documents = self.documents.read().await;
        match documents.get(id).and_then(|doc| doc.get(NUTRITION_FIELD)) {
            Some(value) if !value.is_null() => Ok(Some(serde_json::from_value(value.clone())?)),
            _ => Ok(None),
        }
    }

    async fn save_nutrition(
        &self,
        id: &str,
        nutrition: &RecipeNutrition,
    ) -> Result<(), RecipeError> {
        let mut fields = Map::new();
        fields.insert(NUTRITION_FIELD.to_string(), serde_json::to_value(nutrition)?);
        self.merge(id, fields).await
    }

    async fn get_substitutions(&self, id: &str) -> Result<Substitutions, RecipeError> {
        let documents = self.documents.read().await;
        match documents.get(id).and_then(|doc| doc.get(SUBSTITUTIONS_FIELD)) {
            Some(value) if !value.is_null() => Ok(serde_json::from_value(value.clone())?),
            _ => Ok(Substitutions::new()),
        }
    }

    async fn save_substitution(
        &self,
        id: &str,
        index: usize,
        substitution: &Substitution,
    ) -> Result<(), RecipeError> {
        let record = serde_json::to_value(substitution)?;
        self.update(id, move |document| {
            let field = document
                .entry(SUBSTITUTIONS_FIELD)
                .or_insert_with(|| Value::Object(Map::new()));
            if !field.is_object() {
                *field = Value::Object(Map::new());
            }
            if let Value::Object(substitutions) = field {
                substitutions.insert(index.to_string(), record);
            }
            Ok(())
        })
        .await
    }
}
