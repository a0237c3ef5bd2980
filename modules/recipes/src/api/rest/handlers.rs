use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Redirect},
    Extension,
};
use serde_json::Value;
use tracing::{error, info};

use api_ingress::AppError;

use crate::api::rest::dto::{MessageDto, RecipeDetailDto, RecipeDto};
use crate::api::rest::error::{map_domain_error, parse_recipe_id};
use crate::domain::service::Service;

/// List recipes; `ordering`, registry fields and `search` come from the query string
pub async fn list_recipes(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<RecipeDto>>, AppError> {
    info!("Listing recipes with query: {:?}", query);

    match svc.list_recipes(&query).await {
        Ok(recipes) => Ok(Json(recipes.into_iter().map(RecipeDto::from).collect())),
        Err(e) => {
            error!("Failed to list recipes: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

/// Get one recipe with its comments
pub async fn get_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<Json<RecipeDetailDto>, AppError> {
    let id = parse_recipe_id(&raw_id)?;
    info!("Getting recipe with id: {}", id);

    match svc.get_recipe(id).await {
        Ok(detail) => Ok(Json(RecipeDetailDto::from(detail))),
        Err(e) => {
            error!("Failed to get recipe {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn create_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating recipe");

    match svc.create_recipe(&body).await {
        Ok(recipe) => {
            let location = format!("/recipes/{}/", recipe.id);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(MessageDto::added(recipe.id)),
            ))
        }
        Err(e) => {
            error!("Failed to create recipe: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

/// Full overwrite; every registry field must be present
pub async fn replace_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<MessageDto>, AppError> {
    let id = parse_recipe_id(&raw_id)?;
    info!("Replacing recipe {}", id);

    match svc.replace_recipe(id, &body).await {
        Ok(recipe) => Ok(Json(MessageDto::updated(recipe.id))),
        Err(e) => {
            error!("Failed to replace recipe {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn patch_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<MessageDto>, AppError> {
    let id = parse_recipe_id(&raw_id)?;
    info!("Patching recipe {}", id);

    match svc.patch_recipe(id, &body).await {
        Ok(recipe) => Ok(Json(MessageDto::updated(recipe.id))),
        Err(e) => {
            error!("Failed to patch recipe {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

/// Delete a recipe; unknown ids also answer 204
pub async fn delete_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_recipe_id(&raw_id)?;
    info!("Deleting recipe {}", id);

    match svc.delete_recipe(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete recipe {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn redirect_to_recipes() -> Redirect {
    Redirect::permanent("/recipes")
}
