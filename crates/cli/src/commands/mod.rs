//! CLI subcommands.

pub mod menu;
pub mod replay;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use kiosk::{Catalog, KioskConfig};
use tracing::info;

/// Load configuration from the environment and pick the catalog.
///
/// An explicit `--catalog` wins over `KIOSK_CATALOG_PATH`; with neither the
/// built-in menu is used.
pub fn load(
    catalog_override: Option<&Path>,
) -> Result<(KioskConfig, Arc<Catalog>), Box<dyn std::error::Error>> {
    let config = KioskConfig::from_env()?;

    let catalog = match catalog_override.or(config.catalog_path.as_deref()) {
        Some(path) => Catalog::from_yaml_file(path)?,
        None => Catalog::builtin(),
    };

    info!(
        categories = catalog.categories().len(),
        items = catalog.item_count(),
        currency = %config.pricing.currency,
        "Catalog loaded"
    );

    Ok((config, Arc::new(catalog)))
}
