//! Kiosk screens.

use serde::{Deserialize, Serialize};

/// The mutually exclusive screens a kiosk session can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Attract screen shown between sessions.
    #[default]
    Welcome,
    /// Grid of menu categories.
    CategoryList,
    /// Items of the selected category.
    ItemList,
    /// Order review and checkout.
    Cart,
}

impl Screen {
    /// All screens in navigation order.
    pub const ALL: [Self; 4] = [Self::Welcome, Self::CategoryList, Self::ItemList, Self::Cart];

    /// Stable lowercase name used in logs and scripts.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::CategoryList => "category_list",
            Self::ItemList => "item_list",
            Self::Cart => "cart",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "welcome" => Ok(Self::Welcome),
            "category_list" => Ok(Self::CategoryList),
            "item_list" => Ok(Self::ItemList),
            "cart" => Ok(Self::Cart),
            _ => Err(format!("invalid screen: {s}")),
        }
    }
}
