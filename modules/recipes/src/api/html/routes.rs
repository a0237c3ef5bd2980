use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::html::handlers::{self, HtmlPrefix};
use crate::domain::service::Service;

/// Mount the pages under `prefix` ("/ui" style: leading slash, no trailing one).
pub fn register_html_routes(
    mut router: Router,
    service: Arc<Service>,
    prefix: &str,
) -> anyhow::Result<Router> {
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        anyhow::bail!("invalid html prefix '{prefix}'");
    }

    let pages = Router::new()
        .route(prefix, get(handlers::index))
        .route(&format!("{prefix}/"), get(handlers::index))
        .route(
            &format!("{prefix}/recipes/add"),
            get(handlers::add_form).post(handlers::add_recipe),
        )
        .route(&format!("{prefix}/recipes/{{id}}"), get(handlers::detail))
        .route(&format!("{prefix}/recipes/{{id}}/"), get(handlers::detail))
        .route(
            &format!("{prefix}/recipes/{{id}}/comments"),
            post(handlers::add_comment),
        )
        .layer(Extension(HtmlPrefix(Arc::from(prefix))))
        .layer(Extension(service));

    router = router.merge(pages);
    Ok(router)
}
