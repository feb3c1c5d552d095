//! Recipe storage.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use dashmap::DashMap;
use thiserror::Error;

use crate::recipes::model::{Recipe, RecipeSummary};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read access to recipes.
pub trait RecipeCatalog: Send + Sync {
    /// All recipes, ordered by id.
    fn list(&self) -> Vec<RecipeSummary>;

    fn get(&self, id: &str) -> Option<Recipe>;
}

/// Thread-safe in-memory catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    recipes: DashMap<String, Recipe>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of recipes.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let reader = BufReader::new(File::open(path)?);
        let recipes: Vec<Recipe> = serde_json::from_reader(reader)?;

        let catalog = Self::new();
        for recipe in recipes {
            catalog.insert(recipe);
        }
        tracing::info!(count = catalog.len(), path = ?path, "Loaded recipe catalog");
        Ok(catalog)
    }

    /// Insert or replace a recipe by id.
    pub fn insert(&self, recipe: Recipe) {
        self.recipes.insert(recipe.id.clone(), recipe);
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl RecipeCatalog for InMemoryCatalog {
    fn list(&self) -> Vec<RecipeSummary> {
        let mut summaries: Vec<RecipeSummary> = self
            .recipes
            .iter()
            .map(|entry| RecipeSummary::from(entry.value()))
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    fn get(&self, id: &str) -> Option<Recipe> {
        self.recipes.get(id).map(|entry| entry.value().clone())
    }
}
