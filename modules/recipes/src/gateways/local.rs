use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::RecipesApi,
    error::RecipesError,
    model::{Comment, NewRecipe, Recipe, RecipePatch, RecipeWithComments},
};
use crate::domain::query::FilterRequest;
use crate::domain::service::Service;

/// Local implementation of the RecipesApi trait that delegates to the domain service
pub struct RecipesLocalClient {
    service: Arc<Service>,
}

impl RecipesLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RecipesApi for RecipesLocalClient {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, RecipesError> {
        self.service
            .list_recipes_filtered(FilterRequest::default())
            .await
            .map_err(Into::into)
    }

    async fn get_recipe(&self, id: i64) -> Result<RecipeWithComments, RecipesError> {
        self.service.get_recipe(id).await.map_err(Into::into)
    }

    async fn create_recipe(&self, new_recipe: NewRecipe) -> Result<Recipe, RecipesError> {
        self.service
            .create_new_recipe(new_recipe)
            .await
            .map_err(Into::into)
    }

    async fn replace_recipe(&self, id: i64, recipe: NewRecipe) -> Result<Recipe, RecipesError> {
        self.service
            .replace_with(id, recipe)
            .await
            .map_err(Into::into)
    }

    async fn patch_recipe(&self, id: i64, patch: RecipePatch) -> Result<Recipe, RecipesError> {
        self.service.patch_with(id, patch).await.map_err(Into::into)
    }

    async fn delete_recipe(&self, id: i64) -> Result<(), RecipesError> {
        self.service.delete_recipe(id).await.map_err(Into::into)
    }

    async fn add_comment(&self, recipe_id: i64, content: String) -> Result<Comment, RecipesError> {
        self.service
            .add_comment(recipe_id, &content)
            .await
            .map_err(Into::into)
    }
}
