//! In-memory order history.
//!
//! Receipts live for the lifetime of the process only and are capped so a
//! kiosk left running for weeks does not grow without bound.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use kiosk_core::{CurrencyCode, OrderId, Price};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLine, CartTotals};

/// Receipts kept before the oldest is dropped.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Snapshot of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub currency: CurrencyCode,
}

impl OrderReceipt {
    /// The order total as a display price.
    #[must_use]
    pub const fn total(&self) -> Price {
        Price::new(self.totals.total, self.currency)
    }
}

/// Bounded, newest-last list of receipts.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    orders: VecDeque<OrderReceipt>,
    next_order_id: OrderId,
    capacity: usize,
}

impl Default for OrderHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl OrderHistory {
    /// An empty history keeping at most `capacity` receipts (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            orders: VecDeque::with_capacity(capacity),
            next_order_id: OrderId::new(1),
            capacity,
        }
    }

    /// Assign the next order number and store the receipt.
    pub fn record(
        &mut self,
        lines: Vec<CartLine>,
        totals: CartTotals,
        currency: CurrencyCode,
        placed_at: DateTime<Utc>,
    ) -> OrderReceipt {
        let order_id = self.next_order_id;
        self.next_order_id = order_id.next();

        let receipt = OrderReceipt {
            order_id,
            placed_at,
            lines,
            totals,
            currency,
        };

        if self.orders.len() == self.capacity {
            self.orders.pop_front();
        }
        self.orders.push_back(receipt.clone());
        receipt
    }

    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<&OrderReceipt> {
        self.orders.iter().find(|order| order.order_id == order_id)
    }

    /// Receipts, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &OrderReceipt> {
        self.orders.iter().rev()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kiosk_core::{ItemId, LineId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::MenuItem;
    use crate::cart::CartStore;
    use crate::config::PricingConfig;

    fn one_line_cart(cents: i64) -> CartStore {
        let mut cart = CartStore::new();
        cart.add(MenuItem {
            id: ItemId::new(1),
            name: "Signature Burger".to_string(),
            price: Decimal::new(cents, 2),
            image: "🍔".to_string(),
            description: None,
        });
        cart
    }

    fn record(history: &mut OrderHistory, cents: i64) -> OrderReceipt {
        let cart = one_line_cart(cents);
        let totals = cart.totals(&PricingConfig::default());
        history.record(cart.lines().to_vec(), totals, CurrencyCode::USD, Utc::now())
    }

    #[test]
    fn test_order_ids_are_sequential() {
        let mut history = OrderHistory::default();
        assert_eq!(record(&mut history, 100).order_id, OrderId::new(1));
        assert_eq!(record(&mut history, 100).order_id, OrderId::new(2));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_receipt_copies_lines_and_totals() {
        let mut history = OrderHistory::default();
        let receipt = record(&mut history, 1290);

        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.lines.first().unwrap().line_id, LineId::new(1));
        assert_eq!(receipt.totals.subtotal, Decimal::new(1290, 2));
        // 12.90 + 1.032 tax + 2.99 delivery
        assert_eq!(receipt.total().display(), "$16.92");
        assert_eq!(history.get(receipt.order_id), Some(&receipt));
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut history = OrderHistory::default();
        record(&mut history, 100);
        record(&mut history, 200);
        let ids: Vec<_> = history.recent().map(|r| r.order_id).collect();
        assert_eq!(ids, [OrderId::new(2), OrderId::new(1)]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = OrderHistory::with_capacity(2);
        record(&mut history, 100);
        record(&mut history, 200);
        record(&mut history, 300);

        assert_eq!(history.len(), 2);
        assert!(history.get(OrderId::new(1)).is_none());
        assert!(history.get(OrderId::new(3)).is_some());
    }
}
