use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use stockroom_core::config::{AppConfig, ConfigError, LoadOptions};
use stockroom_core::errors::CatalogError;
use stockroom_store::{JsonFileStorage, ProductCatalog};

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<ProductCatalog>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("catalog load failed: {0}")]
    CatalogLoad(#[source] CatalogError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let storage = Arc::new(JsonFileStorage::new(&config.catalog.path));
    let catalog = ProductCatalog::load(storage).await.map_err(BootstrapError::CatalogLoad)?;

    let products = catalog.len().await;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        catalog_path = %config.catalog.path.display(),
        products,
        "catalog loaded"
    );

    Ok(Application { config, catalog: Arc::new(catalog) })
}
