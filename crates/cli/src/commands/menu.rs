//! Menu listing and catalog validation.

use std::path::Path;

use kiosk::Catalog;
use tracing::info;

use crate::render;

/// Print the whole menu, or the items matching `search`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the catalog cannot be
/// loaded.
pub fn show(
    catalog_path: Option<&Path>,
    search: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, catalog) = super::load(catalog_path)?;
    let currency = config.pricing.currency;

    let output = match search {
        Some(query) => {
            let hits = catalog.search(query);
            info!(query, hits = hits.len(), "Menu search");
            render::search_results(query, &hits, currency)
        }
        None => render::menu(&catalog, currency),
    };

    #[allow(clippy::print_stdout)]
    {
        print!("{output}");
    }
    Ok(())
}

/// Validate a YAML catalog and print a summary.
///
/// # Errors
///
/// Returns the first validation or parse error.
pub fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %path.display(), "Checking catalog");
    let catalog = Catalog::from_yaml_file(path)?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{}: {} categories, {} items - OK",
            path.display(),
            catalog.categories().len(),
            catalog.item_count()
        );
    }
    Ok(())
}
