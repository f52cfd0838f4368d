//! Read-only snapshot handed to the rendering layer.

use kiosk_core::{CategoryId, CurrencyCode, Price, Screen};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::CartLine;
use crate::catalog::Category;
use crate::history::OrderReceipt;

/// Category header shown on the item list and cart screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedCategory {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
}

impl From<&Category> for SelectedCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            icon: category.icon.clone(),
        }
    }
}

/// Everything a renderer needs to draw the current screen.
///
/// Amounts are unrounded; use [`ViewModel::price`] to format them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub screen: Screen,
    pub selected_category: Option<SelectedCategory>,
    pub cart_lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub item_count: u64,
    pub free_delivery_remaining: Option<Decimal>,
    pub currency: CurrencyCode,
    /// Receipt of the most recent order, until the next session starts.
    pub last_order: Option<OrderReceipt>,
}

impl ViewModel {
    /// Pair an amount with the view's currency for display.
    #[must_use]
    pub const fn price(&self, amount: Decimal) -> Price {
        Price::new(amount, self.currency)
    }

    /// Number of cart lines, as shown on the cart button.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.cart_lines.len()
    }
}
