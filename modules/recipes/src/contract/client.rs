use async_trait::async_trait;

use crate::contract::{
    error::RecipesError,
    model::{Comment, NewRecipe, Recipe, RecipePatch, RecipeWithComments},
};

/// Public API of the recipes module for in-process consumers.
///
/// Inputs are typed, so the registry's presence checks are already satisfied;
/// value checks (name alphabetic, prep time range and so on) still apply.
#[async_trait]
pub trait RecipesApi: Send + Sync {
    /// List every recipe, id ascending.
    async fn list_recipes(&self) -> Result<Vec<Recipe>, RecipesError>;

    /// Get a recipe together with its comments.
    async fn get_recipe(&self, id: i64) -> Result<RecipeWithComments, RecipesError>;

    async fn create_recipe(&self, new_recipe: NewRecipe) -> Result<Recipe, RecipesError>;

    /// Overwrite every attribute of an existing recipe.
    async fn replace_recipe(&self, id: i64, recipe: NewRecipe) -> Result<Recipe, RecipesError>;

    async fn patch_recipe(&self, id: i64, patch: RecipePatch) -> Result<Recipe, RecipesError>;

    /// Idempotent; comments go with the recipe.
    async fn delete_recipe(&self, id: i64) -> Result<(), RecipesError>;

    async fn add_comment(&self, recipe_id: i64, content: String) -> Result<Comment, RecipesError>;
}
