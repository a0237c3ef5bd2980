//! Handlers log on entry and on failure; storage faults never leak into bodies.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Extension, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing_test::traced_test;

use recipes::api::rest::handlers;
use recipes::contract::model::{Comment, NewComment, NewRecipe, Recipe};
use recipes::domain::query::FilterRequest;
use recipes::domain::repo::RecipesRepository;
use recipes::domain::service::{Service, ServiceConfig};

/// Every storage call fails.
struct BrokenRepository;

#[async_trait::async_trait]
impl RecipesRepository for BrokenRepository {
    async fn list(&self, _query: &FilterRequest) -> Result<Vec<Recipe>> {
        Err(anyhow!("disk on fire"))
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<Recipe>> {
        Err(anyhow!("disk on fire"))
    }

    async fn name_exists(&self, _name: &str, _exclude_id: Option<i64>) -> Result<bool> {
        Err(anyhow!("disk on fire"))
    }

    async fn insert(&self, _recipe: NewRecipe) -> Result<Recipe> {
        Err(anyhow!("disk on fire"))
    }

    async fn update(&self, _recipe: Recipe) -> Result<()> {
        Err(anyhow!("disk on fire"))
    }

    async fn delete(&self, _id: i64) -> Result<bool> {
        Err(anyhow!("disk on fire"))
    }

    async fn list_comments(&self, _recipe_id: i64) -> Result<Vec<Comment>> {
        Err(anyhow!("disk on fire"))
    }

    async fn insert_comment(&self, _comment: NewComment) -> Result<Comment> {
        Err(anyhow!("disk on fire"))
    }
}

fn create_test_router() -> Router {
    let service = Arc::new(Service::new(
        Arc::new(BrokenRepository),
        ServiceConfig::default(),
    ));

    Router::new()
        .route(
            "/recipes",
            get(handlers::list_recipes).post(handlers::create_recipe),
        )
        .route(
            "/recipes/{id}",
            get(handlers::get_recipe).delete(handlers::delete_recipe),
        )
        .layer(Extension(service))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[traced_test]
#[tokio::test]
async fn list_failure_is_logged_and_hidden() {
    let request = Request::builder()
        .uri("/recipes?ordering=-name")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(create_test_router(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "internal error" }));
    assert!(logs_contain("Listing recipes with query"));
    assert!(logs_contain("Failed to list recipes"));
    assert!(logs_contain("disk on fire"));
}

#[traced_test]
#[tokio::test]
async fn validation_failure_is_logged_without_storage() {
    let request = Request::builder()
        .uri("/recipes?name=Soup42")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(create_test_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "name is invalid" }));
    assert!(logs_contain("Failed to list recipes: name is invalid"));
    assert!(!logs_contain("disk on fire"));
}

#[traced_test]
#[tokio::test]
async fn get_failure_is_logged_with_the_id() {
    let request = Request::builder()
        .uri("/recipes/12")
        .body(Body::empty())
        .unwrap();

    let (status, _) = call(create_test_router(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(logs_contain("Getting recipe with id: 12"));
    assert!(logs_contain("Failed to get recipe 12"));
}

#[traced_test]
#[tokio::test]
async fn create_runs_inside_service_span() {
    let request = Request::builder()
        .method("POST")
        .uri("/recipes")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Soup",
                "category": "Dinner",
                "description": "Hot soup",
                "prep_time": 20,
                "instructions": "Boil it"
            })
            .to_string(),
        ))
        .unwrap();

    let (status, _) = call(create_test_router(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(logs_contain("recipes.service.create_recipe"));
    assert!(logs_contain("Failed to create recipe"));
}
