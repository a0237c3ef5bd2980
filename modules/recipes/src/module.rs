use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::html::routes as html_routes;
use crate::api::rest::routes;
use crate::config::RecipesConfig;
use crate::contract::client::RecipesApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::RecipesLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmRecipesRepository;

/// The recipes module: owns the domain service once `init` has run and
/// contributes the JSON and HTML routes to the host router.
#[derive(Default)]
pub struct RecipesModule {
    service: ArcSwapOption<Service>,
    config: ArcSwapOption<RecipesConfig>,
}

impl RecipesModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the SeaORM repository into the domain service.
    pub async fn init(&self, db: &db::DbHandle, cfg: RecipesConfig) -> anyhow::Result<()> {
        info!("Initializing recipes module");
        debug!(
            "Loaded recipes config: validation_profile={:?}, html_enabled={}, html_prefix={}",
            cfg.validation_profile, cfg.html_enabled, cfg.html_prefix
        );

        let repo = SeaOrmRecipesRepository::new(db.sea());
        let service_config = ServiceConfig {
            validation_profile: cfg.validation_profile,
        };
        let service = Service::new(Arc::new(repo), service_config);

        self.service.store(Some(Arc::new(service)));
        self.config.store(Some(Arc::new(cfg)));
        Ok(())
    }

    pub async fn migrate(&self, db: &db::DbHandle) -> anyhow::Result<()> {
        info!("Running recipes database migrations");
        let conn = db.sea();
        Migrator::up(&conn, None)
            .await
            .context("recipes migrations failed")?;
        info!("Recipes database migrations completed successfully");
        Ok(())
    }

    fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// In-process client backed by the same service as the HTTP routes.
    pub fn client(&self) -> anyhow::Result<Arc<dyn RecipesApi>> {
        Ok(Arc::new(RecipesLocalClient::new(self.service()?)))
    }

    pub fn register_rest(&self, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering recipes REST routes");
        let service = self.service()?;
        let cfg = self.config.load_full().unwrap_or_default();

        let mut router = routes::register_routes(router, service.clone())?;
        if cfg.html_enabled {
            let prefix = cfg.normalized_html_prefix();
            router = html_routes::register_html_routes(router, service, &prefix)?;
            info!("Recipes HTML pages mounted at {}", prefix);
        }
        info!("Recipes REST routes registered successfully");
        Ok(router)
    }
}
