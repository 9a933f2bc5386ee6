use std::sync::Arc;

use rust_decimal::Decimal;

use stockroom_core::config::{AppConfig, LoadOptions};
use stockroom_core::domain::product::ProductDraft;
use stockroom_store::{CatalogStorage, JsonFileStorage, ProductCatalog};

use crate::commands::CommandResult;

pub fn run(force: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let catalog_path = config.catalog.path.clone();
    let result = runtime.block_on(async {
        let storage = Arc::new(JsonFileStorage::new(&catalog_path));
        let catalog = ProductCatalog::load(storage.clone() as Arc<dyn CatalogStorage>)
            .await
            .map_err(|error| ("catalog_load", error.to_string(), 4u8))?;

        if !catalog.is_empty().await {
            if !force {
                return Err((
                    "catalog_not_empty",
                    format!(
                        "catalog at `{}` already holds {} products; pass --force to replace it",
                        catalog_path.display(),
                        catalog.len().await
                    ),
                    5u8,
                ));
            }

            storage
                .write(b"[]")
                .await
                .map_err(|error| ("catalog_reset", error.to_string(), 4u8))?;
        }

        // Reload so a forced reset starts from an empty collection.
        let catalog = ProductCatalog::load(storage as Arc<dyn CatalogStorage>)
            .await
            .map_err(|error| ("catalog_load", error.to_string(), 4u8))?;

        let mut seeded = Vec::new();
        for draft in demo_products() {
            let created = catalog
                .create(draft)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 6u8))?;
            seeded.push(format!(
                "  - {} {} ({}, stock {})",
                created.id, created.name, created.code_value, created.quantity
            ));
        }

        Ok(seeded)
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "seeded {} demo products into `{}`:\n{}",
                seeded.len(),
                config.catalog.path.display(),
                seeded.join("\n")
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

/// Deterministic demo fixtures. Expirations sit far in the future so the
/// validator accepts them for years to come; one record is unpublished and
/// one runs on minimal stock to make quote failures reproducible.
fn demo_products() -> Vec<ProductDraft> {
    vec![
        ProductDraft {
            name: "Oil".to_string(),
            quantity: 439,
            code_value: "S82254D".to_string(),
            is_published: true,
            expiration: "15/12/2099".to_string(),
            price: Decimal::new(7142, 2),
        },
        ProductDraft {
            name: "Rice 5kg".to_string(),
            quantity: 120,
            code_value: "R10401B".to_string(),
            is_published: true,
            expiration: "01/06/2100".to_string(),
            price: Decimal::new(2858, 2),
        },
        ProductDraft {
            name: "Sea Salt".to_string(),
            quantity: 80,
            code_value: "S55001A".to_string(),
            is_published: true,
            expiration: "09/09/2100".to_string(),
            price: Decimal::new(350, 2),
        },
        ProductDraft {
            name: "Olive Jar".to_string(),
            quantity: 1,
            code_value: "O77120C".to_string(),
            is_published: true,
            expiration: "20/03/2100".to_string(),
            price: Decimal::new(1299, 2),
        },
        ProductDraft {
            name: "Tea Sampler".to_string(),
            quantity: 54,
            code_value: "T90210E".to_string(),
            is_published: false,
            expiration: "11/11/2100".to_string(),
            price: Decimal::new(999, 2),
        },
    ]
}
