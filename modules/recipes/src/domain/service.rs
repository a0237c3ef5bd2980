use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{
    Comment, NewComment, NewRecipe, Recipe, RecipePatch, RecipeWithComments,
};
use crate::domain::error::DomainError;
use crate::domain::fields::{
    parse_prep_time, FieldInput, FieldRegistry, RecipeField, ValidationProfile,
};
use crate::domain::query::FilterRequest;
use crate::domain::repo::{RecipesRepository, UniqueViolation};

const IMAGE_URL_KEY: &str = "image_url";

/// Domain service: validation and orchestration for every recipe operation.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn RecipesRepository>,
    registry: Arc<FieldRegistry>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub validation_profile: ValidationProfile,
}

fn storage(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

/// Unique-violation races on `name` surface as a conflict, not a 500.
fn storage_or_conflict(e: anyhow::Error, name: &str) -> DomainError {
    if e.downcast_ref::<UniqueViolation>().is_some() {
        DomainError::name_already_exists(name)
    } else {
        storage(e)
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, DomainError> {
    body.as_object().ok_or(DomainError::InvalidBody)
}

fn json_string(map: &Map<String, Value>, field: RecipeField) -> Result<String, DomainError> {
    map.get(field.as_str())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DomainError::field_invalid(field.as_str()))
}

fn json_prep_time(map: &Map<String, Value>) -> Result<i32, DomainError> {
    map.get(RecipeField::PrepTime.as_str())
        .and_then(|v| parse_prep_time(FieldInput::Json(v)))
        .ok_or_else(|| DomainError::field_invalid(RecipeField::PrepTime.as_str()))
}

fn optional_image_url(map: &Map<String, Value>) -> Result<Option<String>, DomainError> {
    match map.get(IMAGE_URL_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DomainError::field_invalid(IMAGE_URL_KEY)),
    }
}

/// Build a recipe from a body that already passed `check_required`.
fn new_recipe_from_json(map: &Map<String, Value>) -> Result<NewRecipe, DomainError> {
    Ok(NewRecipe {
        name: json_string(map, RecipeField::Name)?,
        category: json_string(map, RecipeField::Category)?,
        description: json_string(map, RecipeField::Description)?,
        prep_time: json_prep_time(map)?,
        instructions: json_string(map, RecipeField::Instructions)?,
        image_url: optional_image_url(map)?,
    })
}

/// Build a patch from a body that already passed `check_patch`.
fn patch_from_json(map: &Map<String, Value>) -> Result<RecipePatch, DomainError> {
    let mut patch = RecipePatch::default();
    for key in map.keys() {
        match RecipeField::parse(key) {
            Some(RecipeField::Name) => patch.name = Some(json_string(map, RecipeField::Name)?),
            Some(RecipeField::Category) => {
                patch.category = Some(json_string(map, RecipeField::Category)?)
            }
            Some(RecipeField::Description) => {
                patch.description = Some(json_string(map, RecipeField::Description)?)
            }
            Some(RecipeField::PrepTime) => patch.prep_time = Some(json_prep_time(map)?),
            Some(RecipeField::Instructions) => {
                patch.instructions = Some(json_string(map, RecipeField::Instructions)?)
            }
            None => return Err(DomainError::field_not_allowed(key.as_str())),
        }
    }
    Ok(patch)
}

/// Build a recipe from a form that already passed `check_form`.
fn new_recipe_from_form(form: &[(String, String)]) -> Result<NewRecipe, DomainError> {
    let get = |field: &str| {
        form.iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.clone())
    };
    let text = |field: RecipeField| {
        get(field.as_str()).ok_or_else(|| DomainError::field_invalid(field.as_str()))
    };
    let prep_time = get(RecipeField::PrepTime.as_str())
        .and_then(|v| parse_prep_time(FieldInput::Text(&v)))
        .ok_or_else(|| DomainError::field_invalid(RecipeField::PrepTime.as_str()))?;

    Ok(NewRecipe {
        name: text(RecipeField::Name)?,
        category: text(RecipeField::Category)?,
        description: text(RecipeField::Description)?,
        prep_time,
        instructions: text(RecipeField::Instructions)?,
        image_url: get(IMAGE_URL_KEY).filter(|s| !s.trim().is_empty()),
    })
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repo: Arc<dyn RecipesRepository>, config: ServiceConfig) -> Self {
        let registry = Arc::new(FieldRegistry::for_profile(config.validation_profile));
        Self {
            repo,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn require_recipe(&self, id: i64) -> Result<Recipe, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| DomainError::recipe_not_found(id))
    }

    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i64>) -> Result<(), DomainError> {
        if self
            .repo
            .name_exists(name, exclude_id)
            .await
            .map_err(storage)?
        {
            return Err(DomainError::name_already_exists(name));
        }
        Ok(())
    }

    /// List recipes from raw query-string pairs.
    #[instrument(name = "recipes.service.list_recipes", skip(self, query))]
    pub async fn list_recipes(&self, query: &[(String, String)]) -> Result<Vec<Recipe>, DomainError> {
        let request = FilterRequest::from_query(query, &self.registry)?;
        self.list_recipes_filtered(request).await
    }

    #[instrument(name = "recipes.service.list_recipes_filtered", skip(self))]
    pub async fn list_recipes_filtered(
        &self,
        request: FilterRequest,
    ) -> Result<Vec<Recipe>, DomainError> {
        debug!("Listing recipes");
        let recipes = self.repo.list(&request).await.map_err(storage)?;
        debug!("Successfully listed {} recipes", recipes.len());
        Ok(recipes)
    }

    #[instrument(name = "recipes.service.get_recipe", skip(self), fields(recipe_id = id))]
    pub async fn get_recipe(&self, id: i64) -> Result<RecipeWithComments, DomainError> {
        debug!("Getting recipe by id");
        let recipe = self.require_recipe(id).await?;
        let comments = self.repo.list_comments(id).await.map_err(storage)?;
        Ok(RecipeWithComments { recipe, comments })
    }

    /// Create from a JSON body.
    #[instrument(name = "recipes.service.create_recipe", skip(self, body))]
    pub async fn create_recipe(&self, body: &Value) -> Result<Recipe, DomainError> {
        info!("Creating new recipe");
        let map = as_object(body)?;
        self.registry.check_required(map)?;
        let new_recipe = new_recipe_from_json(map)?;
        self.insert_recipe(new_recipe).await
    }

    /// Create from an urlencoded HTML form.
    #[instrument(name = "recipes.service.create_recipe_from_form", skip(self, form))]
    pub async fn create_recipe_from_form(
        &self,
        form: &[(String, String)],
    ) -> Result<Recipe, DomainError> {
        info!("Creating new recipe from form");
        self.registry.check_form(form)?;
        let new_recipe = new_recipe_from_form(form)?;
        self.insert_recipe(new_recipe).await
    }

    /// Create from a typed value (in-process clients).
    #[instrument(name = "recipes.service.create_new_recipe", skip(self, new_recipe), fields(name = %new_recipe.name))]
    pub async fn create_new_recipe(&self, new_recipe: NewRecipe) -> Result<Recipe, DomainError> {
        info!("Creating new recipe");
        self.registry.check_new_recipe(&new_recipe)?;
        self.insert_recipe(new_recipe).await
    }

    async fn insert_recipe(&self, new_recipe: NewRecipe) -> Result<Recipe, DomainError> {
        self.ensure_name_free(&new_recipe.name, None).await?;
        let name = new_recipe.name.clone();
        let recipe = self
            .repo
            .insert(new_recipe)
            .await
            .map_err(|e| storage_or_conflict(e, &name))?;
        info!("Successfully created recipe with id={}", recipe.id);
        Ok(recipe)
    }

    /// Full overwrite from a JSON body; the id is preserved.
    #[instrument(name = "recipes.service.replace_recipe", skip(self, body), fields(recipe_id = id))]
    pub async fn replace_recipe(&self, id: i64, body: &Value) -> Result<Recipe, DomainError> {
        info!("Replacing recipe");
        self.require_recipe(id).await?;
        let map = as_object(body)?;
        self.registry.check_required(map)?;
        let replacement = new_recipe_from_json(map)?;
        self.overwrite_recipe(id, replacement).await
    }

    #[instrument(name = "recipes.service.replace_with", skip(self, replacement), fields(recipe_id = id))]
    pub async fn replace_with(&self, id: i64, replacement: NewRecipe) -> Result<Recipe, DomainError> {
        info!("Replacing recipe");
        self.require_recipe(id).await?;
        self.registry.check_new_recipe(&replacement)?;
        self.overwrite_recipe(id, replacement).await
    }

    async fn overwrite_recipe(&self, id: i64, replacement: NewRecipe) -> Result<Recipe, DomainError> {
        self.ensure_name_free(&replacement.name, Some(id)).await?;
        let recipe = replacement.into_recipe(id);
        self.repo
            .update(recipe.clone())
            .await
            .map_err(|e| storage_or_conflict(e, &recipe.name))?;
        info!("Successfully replaced recipe");
        Ok(recipe)
    }

    /// Partial update from a JSON body; absent fields stay as they are.
    #[instrument(name = "recipes.service.patch_recipe", skip(self, body), fields(recipe_id = id))]
    pub async fn patch_recipe(&self, id: i64, body: &Value) -> Result<Recipe, DomainError> {
        info!("Patching recipe");
        let current = self.require_recipe(id).await?;
        let map = as_object(body)?;
        self.registry.check_patch(map)?;
        let patch = patch_from_json(map)?;
        self.merge_patch(current, patch).await
    }

    #[instrument(name = "recipes.service.patch_with", skip(self, patch), fields(recipe_id = id))]
    pub async fn patch_with(&self, id: i64, patch: RecipePatch) -> Result<Recipe, DomainError> {
        info!("Patching recipe");
        let current = self.require_recipe(id).await?;
        self.registry.check_typed_patch(&patch)?;
        self.merge_patch(current, patch).await
    }

    async fn merge_patch(&self, mut current: Recipe, patch: RecipePatch) -> Result<Recipe, DomainError> {
        if patch.is_empty() {
            debug!("Empty patch, nothing to persist");
            return Ok(current);
        }
        if let Some(ref new_name) = patch.name {
            if new_name != &current.name {
                self.ensure_name_free(new_name, Some(current.id)).await?;
            }
        }

        patch.apply(&mut current);
        self.repo
            .update(current.clone())
            .await
            .map_err(|e| storage_or_conflict(e, &current.name))?;
        info!("Successfully patched recipe");
        Ok(current)
    }

    /// Idempotent: deleting an unknown id succeeds. Comments go with the recipe.
    #[instrument(name = "recipes.service.delete_recipe", skip(self), fields(recipe_id = id))]
    pub async fn delete_recipe(&self, id: i64) -> Result<(), DomainError> {
        info!("Deleting recipe");
        let deleted = self.repo.delete(id).await.map_err(storage)?;
        if deleted {
            info!("Successfully deleted recipe");
        } else {
            debug!("Recipe did not exist, nothing deleted");
        }
        Ok(())
    }

    #[instrument(name = "recipes.service.add_comment", skip(self, content))]
    pub async fn add_comment(&self, recipe_id: i64, content: &str) -> Result<Comment, DomainError> {
        info!("Adding comment");
        if content.trim().is_empty() {
            warn!("Rejected empty comment");
            return Err(DomainError::CommentContentRequired);
        }
        self.require_recipe(recipe_id).await?;
        let comment = self
            .repo
            .insert_comment(NewComment {
                recipe_id,
                content: content.to_string(),
            })
            .await
            .map_err(storage)?;
        info!("Successfully added comment with id={}", comment.id);
        Ok(comment)
    }

    #[instrument(name = "recipes.service.list_comments", skip(self))]
    pub async fn list_comments(&self, recipe_id: i64) -> Result<Vec<Comment>, DomainError> {
        self.repo.list_comments(recipe_id).await.map_err(storage)
    }
}
