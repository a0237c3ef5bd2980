use async_trait::async_trait;

use crate::contract::model::{Comment, NewComment, NewRecipe, Recipe};
use crate::domain::query::FilterRequest;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait RecipesRepository: Send + Sync {
    /// Recipes matching the filters, in the requested order.
    async fn list(&self, query: &FilterRequest) -> anyhow::Result<Vec<Recipe>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Recipe>>;
    /// Whether another recipe (other than `exclude_id`) already uses `name`.
    async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> anyhow::Result<bool>;
    /// Persist a new recipe; storage assigns the id.
    async fn insert(&self, recipe: NewRecipe) -> anyhow::Result<Recipe>;
    /// Overwrite the row with primary key `recipe.id`.
    async fn update(&self, recipe: Recipe) -> anyhow::Result<()>;
    /// Delete the recipe and its comments. Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    /// Comments of one recipe, oldest first.
    async fn list_comments(&self, recipe_id: i64) -> anyhow::Result<Vec<Comment>>;
    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Comment>;
}

/// Raised by adapters when a write hits a uniqueness constraint, so the
/// service can tell a lost race on `name` apart from other storage faults.
#[derive(Debug, thiserror::Error)]
#[error("unique constraint violated on {column}")]
pub struct UniqueViolation {
    pub column: &'static str,
}
