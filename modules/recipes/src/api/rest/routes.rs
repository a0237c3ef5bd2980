use axum::{routing::get, Extension, Router};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(mut router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    // GET/POST /recipes
    router = router.route(
        "/recipes",
        get(handlers::list_recipes).post(handlers::create_recipe),
    );

    // GET/PUT/PATCH/DELETE /recipes/{id}, with or without the trailing slash
    for path in ["/recipes/{id}", "/recipes/{id}/"] {
        router = router.route(
            path,
            get(handlers::get_recipe)
                .put(handlers::replace_recipe)
                .patch(handlers::patch_recipe)
                .delete(handlers::delete_recipe),
        );
    }

    router = router.route("/", get(handlers::redirect_to_recipes));

    router = router.layer(Extension(service));

    Ok(router)
}
