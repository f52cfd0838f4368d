//! Read-only menu catalog.
//!
//! The catalog is validated once when it is built and never mutated
//! afterwards. Sessions share it through an `Arc`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kiosk_core::{CategoryId, ItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Highest unit price a catalog may list.
pub const MAX_ITEM_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog has no categories")]
    Empty,

    #[error("Duplicate category id: {0}")]
    DuplicateCategory(CategoryId),

    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemId),

    #[error("Blank name: {0}")]
    BlankName(String),

    #[error("Negative price for item {0}")]
    NegativePrice(ItemId),

    #[error("Price for item {0} exceeds {max}", max = MAX_ITEM_PRICE)]
    PriceTooHigh(ItemId),

    #[error("Failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// A single orderable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    /// Unit price in the kiosk's currency.
    pub price: Decimal,
    /// Display glyph or image URI. Opaque to the core.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A menu category and its items, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display token for the category tile.
    pub icon: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl Category {
    /// Find an item of this category by id.
    #[must_use]
    pub fn item(&self, item_id: ItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    categories: Vec<Category>,
}

/// Validated, immutable category/item hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog, validating ids, names and prices.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when there are no categories, ids repeat, a
    /// name is blank, or a price is negative.
    pub fn new(categories: Vec<Category>) -> Result<Self, CatalogError> {
        validate(&categories)?;
        Ok(Self { categories })
    }

    /// Parse and validate a YAML catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML and the validation
    /// errors of [`Catalog::new`] otherwise.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.categories)
    }

    /// Read, parse and validate a YAML catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, plus every
    /// error of [`Catalog::from_yaml_str`].
    #[instrument]
    pub fn from_yaml_file(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        debug!(
            categories = catalog.categories.len(),
            items = catalog.item_count(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// The built-in demo menu.
    #[must_use]
    pub fn builtin() -> Self {
        let category = |id: u32, name: &str, icon: &str, items: &[(u32, &str, i64, &str)]| {
            Category {
                id: CategoryId::new(id),
                name: name.to_string(),
                icon: icon.to_string(),
                items: items
                    .iter()
                    .map(|&(item_id, item_name, cents, image)| MenuItem {
                        id: ItemId::new(item_id),
                        name: item_name.to_string(),
                        price: Decimal::new(cents, 2),
                        image: image.to_string(),
                        description: None,
                    })
                    .collect(),
            }
        };

        Self {
            categories: vec![
                category(
                    1,
                    "Mains",
                    "🍔",
                    &[
                        (1, "Signature Burger", 1290, "🍔"),
                        (2, "Grilled Chicken", 1490, "🍗"),
                        (3, "Fish & Chips", 1590, "🐟"),
                        (4, "Beef Steak", 2290, "🥩"),
                    ],
                ),
                category(
                    2,
                    "Sides",
                    "🍟",
                    &[
                        (5, "Crispy Fries", 490, "🍟"),
                        (6, "Onion Rings", 590, "🧅"),
                        (7, "Garden Salad", 690, "🥗"),
                        (8, "Garlic Bread", 390, "🥖"),
                    ],
                ),
                category(
                    3,
                    "Beverages",
                    "🥤",
                    &[
                        (9, "Fresh Juice", 450, "🧃"),
                        (10, "Iced Coffee", 590, "☕"),
                        (11, "Soft Drinks", 390, "🥤"),
                        (12, "Smoothie", 690, "🥤"),
                    ],
                ),
                category(
                    4,
                    "Desserts",
                    "🍰",
                    &[
                        (13, "Chocolate Cake", 790, "🍰"),
                        (14, "Ice Cream", 490, "🍦"),
                        (15, "Fresh Cookies", 390, "🍪"),
                        (16, "Fruit Tart", 690, "🥧"),
                    ],
                ),
            ],
        }
    }

    /// All categories in display order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category.
    #[must_use]
    pub fn find_category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Look up an item within a specific category.
    #[must_use]
    pub fn find_item(&self, category_id: CategoryId, item_id: ItemId) -> Option<&MenuItem> {
        self.find_category(category_id)?.item(item_id)
    }

    /// Look up an item in any category. Item ids are unique catalog-wide.
    #[must_use]
    pub fn find_item_anywhere(&self, item_id: ItemId) -> Option<&MenuItem> {
        self.categories
            .iter()
            .find_map(|category| category.item(item_id))
    }

    /// Case-insensitive substring search over item names and descriptions.
    ///
    /// An empty or blank query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&MenuItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.categories
            .iter()
            .flat_map(|category| category.items.iter())
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Total number of items across all categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

fn validate(categories: &[Category]) -> Result<(), CatalogError> {
    if categories.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut category_ids = HashSet::new();
    let mut item_ids = HashSet::new();

    for category in categories {
        if !category_ids.insert(category.id) {
            return Err(CatalogError::DuplicateCategory(category.id));
        }
        if category.name.trim().is_empty() {
            return Err(CatalogError::BlankName(format!("category {}", category.id)));
        }

        for item in &category.items {
            if !item_ids.insert(item.id) {
                return Err(CatalogError::DuplicateItem(item.id));
            }
            if item.name.trim().is_empty() {
                return Err(CatalogError::BlankName(format!("item {}", item.id)));
            }
            if item.price.is_sign_negative() && !item.price.is_zero() {
                return Err(CatalogError::NegativePrice(item.id));
            }
            if item.price > MAX_ITEM_PRICE {
                return Err(CatalogError::PriceTooHigh(item.id));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
categories:
  - id: 10
    name: Burgers
    icon: "🍔"
    items:
      - id: 100
        name: Big Burger
        price: "7.99"
        image: "https://example.com/burger.jpg"
        description: Two patties, special sauce
      - id: 101
        name: Quarter Burger
        price: "9.49"
        image: "🍔"
  - id: 20
    name: Drinks
    icon: "🥤"
    items:
      - id: 200
        name: Cola
        price: "2.49"
        image: "🥤"
"#;

    #[test]
    fn test_builtin_is_valid() {
        let catalog = Catalog::builtin();
        assert!(Catalog::new(catalog.categories().to_vec()).is_ok());
        assert_eq!(catalog.categories().len(), 4);
        assert_eq!(catalog.item_count(), 16);
    }

    #[test]
    fn test_categories_keep_order() {
        let names: Vec<_> = Catalog::builtin()
            .categories()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, ["Mains", "Sides", "Beverages", "Desserts"]);
    }

    #[test]
    fn test_find_category_and_item() {
        let catalog = Catalog::builtin();
        let mains = catalog.find_category(CategoryId::new(1)).unwrap();
        assert_eq!(mains.name, "Mains");

        let burger = catalog.find_item(CategoryId::new(1), ItemId::new(1)).unwrap();
        assert_eq!(burger.name, "Signature Burger");
        assert_eq!(burger.price, Decimal::new(1290, 2));
    }

    #[test]
    fn test_missing_ids_are_none() {
        let catalog = Catalog::builtin();
        assert!(catalog.find_category(CategoryId::new(99)).is_none());
        // item 5 exists, but not in Mains
        assert!(catalog.find_item(CategoryId::new(1), ItemId::new(5)).is_none());
        assert!(catalog.find_item(CategoryId::new(99), ItemId::new(1)).is_none());
        assert!(catalog.find_item_anywhere(ItemId::new(5)).is_some());
        assert!(catalog.find_item_anywhere(ItemId::new(500)).is_none());
    }

    #[test]
    fn test_search() {
        let catalog = Catalog::from_yaml_str(SAMPLE_YAML).unwrap();

        let hits: Vec<_> = catalog.search("burger").iter().map(|i| i.id).collect();
        assert_eq!(hits, [ItemId::new(100), ItemId::new(101)]);

        // matches description
        let hits = catalog.search("SAUCE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ItemId::new(100));

        assert!(catalog.search("   ").is_empty());
        assert!(catalog.search("pizza").is_empty());
    }

    #[test]
    fn test_from_yaml_str() {
        let catalog = Catalog::from_yaml_str(SAMPLE_YAML).unwrap();
        assert_eq!(catalog.categories().len(), 2);
        let cola = catalog.find_item_anywhere(ItemId::new(200)).unwrap();
        assert_eq!(cola.price, Decimal::new(249, 2));
        assert!(cola.description.is_none());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));
        assert!(matches!(
            Catalog::from_yaml_str("categories: []"),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut categories = Catalog::builtin().categories().to_vec();
        categories[1].id = CategoryId::new(1);
        assert!(matches!(
            Catalog::new(categories),
            Err(CatalogError::DuplicateCategory(id)) if id == CategoryId::new(1)
        ));

        let mut categories = Catalog::builtin().categories().to_vec();
        categories[3].items[0].id = ItemId::new(1);
        assert!(matches!(
            Catalog::new(categories),
            Err(CatalogError::DuplicateItem(id)) if id == ItemId::new(1)
        ));
    }

    #[test]
    fn test_rejects_negative_price_and_blank_name() {
        let mut categories = Catalog::builtin().categories().to_vec();
        categories[0].items[2].price = Decimal::new(-1, 0);
        assert!(matches!(
            Catalog::new(categories),
            Err(CatalogError::NegativePrice(id)) if id == ItemId::new(3)
        ));

        let mut categories = Catalog::builtin().categories().to_vec();
        categories[2].name = "  ".to_string();
        assert!(matches!(
            Catalog::new(categories),
            Err(CatalogError::BlankName(_))
        ));
    }

    #[test]
    fn test_rejects_absurd_price() {
        let yaml = SAMPLE_YAML.replace(
            r#"price: "2.49""#,
            r#"price: "100000000000000000000""#,
        );
        let err = Catalog::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, CatalogError::PriceTooHigh(id) if id == ItemId::new(200)));

        let mut categories = Catalog::builtin().categories().to_vec();
        categories[0].items[0].price = MAX_ITEM_PRICE;
        assert!(Catalog::new(categories).is_ok());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Catalog::from_yaml_str("categories: [ {id: one} ]"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Catalog::from_yaml_file(Path::new("/nonexistent/menu.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/menu.yaml"));
    }
}
