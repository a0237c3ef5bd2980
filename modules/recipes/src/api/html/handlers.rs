use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use maud::Markup;
use tracing::{error, info, warn};

use api_ingress::AppError;

use crate::api::html::views;
use crate::api::rest::error::map_domain_error;
use crate::domain::error::DomainError;
use crate::domain::query::SEARCH_QUERY_KEY;
use crate::domain::service::Service;

/// Mount point of the pages, e.g. "/ui".
#[derive(Debug, Clone)]
pub struct HtmlPrefix(pub Arc<str>);

fn page(status: StatusCode, markup: Markup) -> Response {
    (status, Html(markup.into_string())).into_response()
}

fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub async fn index(
    Extension(svc): Extension<Arc<Service>>,
    Extension(HtmlPrefix(prefix)): Extension<HtmlPrefix>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    info!("Rendering recipe index with query: {:?}", query);
    let search = first(&query, SEARCH_QUERY_KEY);

    match svc.list_recipes(&query).await {
        Ok(recipes) => Ok(page(
            StatusCode::OK,
            views::index(&prefix, &recipes, search, None),
        )),
        Err(e) if e.is_validation() => {
            warn!("Rejected recipe index query: {}", e);
            Ok(page(
                StatusCode::BAD_REQUEST,
                views::index(&prefix, &[], search, Some(&e.to_string())),
            ))
        }
        Err(e) => {
            error!("Failed to list recipes: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn detail(
    Extension(svc): Extension<Arc<Service>>,
    Extension(HtmlPrefix(prefix)): Extension<HtmlPrefix>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(id) = raw_id.parse::<i64>() else {
        return Ok(page(StatusCode::NOT_FOUND, views::not_found(&prefix)));
    };
    info!("Rendering recipe {}", id);

    match svc.get_recipe(id).await {
        Ok(rc) => Ok(page(StatusCode::OK, views::detail(&prefix, &rc))),
        Err(DomainError::RecipeNotFound { .. }) => {
            Ok(page(StatusCode::NOT_FOUND, views::not_found(&prefix)))
        }
        Err(e) => {
            error!("Failed to get recipe {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn add_form(Extension(HtmlPrefix(prefix)): Extension<HtmlPrefix>) -> Html<String> {
    Html(views::add_form(&prefix, &[], None).into_string())
}

/// Missing fields answer with JSON; invalid or conflicting values re-render the form.
pub async fn add_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Extension(HtmlPrefix(prefix)): Extension<HtmlPrefix>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    info!("Adding recipe from form");

    match svc.create_recipe_from_form(&form).await {
        Ok(recipe) => {
            Ok(Redirect::to(&format!("{}/recipes/{}/", prefix, recipe.id)).into_response())
        }
        Err(e @ DomainError::FormIncomplete) => {
            warn!("Rejected incomplete form: {}", e);
            Err(map_domain_error(&e))
        }
        Err(e @ DomainError::NameAlreadyExists { .. }) => {
            warn!("Rejected form: {}", e);
            Ok(page(
                StatusCode::CONFLICT,
                views::add_form(&prefix, &form, Some(&e.to_string())),
            ))
        }
        Err(e) if e.is_validation() => {
            warn!("Rejected form: {}", e);
            Ok(page(
                StatusCode::BAD_REQUEST,
                views::add_form(&prefix, &form, Some(&e.to_string())),
            ))
        }
        Err(e) => {
            error!("Failed to add recipe: {}", e);
            Err(map_domain_error(&e))
        }
    }
}

pub async fn add_comment(
    Extension(svc): Extension<Arc<Service>>,
    Extension(HtmlPrefix(prefix)): Extension<HtmlPrefix>,
    Path(raw_id): Path<String>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let Ok(id) = raw_id.parse::<i64>() else {
        return Ok(page(StatusCode::NOT_FOUND, views::not_found(&prefix)));
    };
    info!("Adding comment to recipe {}", id);
    let content = first(&form, "content").unwrap_or_default();

    match svc.add_comment(id, content).await {
        Ok(_) => Ok(Redirect::to(&format!("{}/recipes/{}/", prefix, id)).into_response()),
        Err(DomainError::RecipeNotFound { .. }) => {
            Ok(page(StatusCode::NOT_FOUND, views::not_found(&prefix)))
        }
        Err(e) => {
            error!("Failed to add comment to recipe {}: {}", id, e);
            Err(map_domain_error(&e))
        }
    }
}
