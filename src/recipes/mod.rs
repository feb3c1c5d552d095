//! Recipe catalog.
//!
//! The catalog is a collaborator: recipes are served read-only from an
//! in-memory store seeded from a JSON file. Premium recipes are gated by
//! [`crate::entitlements`].

pub mod catalog;
pub mod handlers;
pub mod model;

pub use catalog::{CatalogError, InMemoryCatalog, RecipeCatalog};
pub use model::{Ingredient, Recipe, RecipeSummary};
