//! In-memory cart store.
//!
//! Every `add` appends a fresh line, even when the item is already in the
//! cart, so item counts and totals are computed by summing lines. Line ids
//! are never reused, including across `clear`, so a stale line id from the
//! rendering layer can only ever miss.
//!
//! Totals are derived on demand at full precision; rounding happens when a
//! [`kiosk_core::Price`] is displayed. Quantities are capped at
//! [`MAX_LINE_QUANTITY`] and derived amounts saturate instead of overflowing.

use kiosk_core::LineId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::MenuItem;
use crate::config::PricingConfig;
use crate::error::{KioskError, Result};

/// Largest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// One addition event in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub line_id: LineId,
    /// Copy of the item as it was when added.
    pub item: MenuItem,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.item.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Derived cart amounts for a given pricing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub item_count: u64,
    /// Amount still needed before delivery becomes free.
    pub free_delivery_remaining: Option<Decimal>,
}

/// Ordered sequence of cart lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStore {
    lines: Vec<CartLine>,
    next_line_id: LineId,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            next_line_id: LineId::new(1),
        }
    }

    /// Append a new line with quantity 1 and return its id.
    pub fn add(&mut self, item: MenuItem) -> LineId {
        self.add_with_quantity(item, 1)
    }

    /// Append a new line with the given quantity, clamped to
    /// `1..=MAX_LINE_QUANTITY`.
    pub(crate) fn add_with_quantity(&mut self, item: MenuItem, quantity: u32) -> LineId {
        let line_id = self.next_line_id;
        self.next_line_id = line_id.next();
        self.lines.push(CartLine {
            line_id,
            item,
            quantity: quantity.clamp(1, MAX_LINE_QUANTITY),
        });
        line_id
    }

    /// Set a line's quantity.
    ///
    /// A quantity of 0 removes the line.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for negative quantities, quantities above
    /// [`MAX_LINE_QUANTITY`] or a line total that does not fit, `NotFound` for
    /// an unknown line. The cart is unchanged on error.
    pub fn set_quantity(&mut self, line_id: LineId, quantity: i64) -> Result<()> {
        if quantity < 0 {
            return Err(KioskError::InvalidArgument(format!(
                "quantity must not be negative (got {quantity})"
            )));
        }
        if quantity == 0 {
            return self.remove(line_id).map(|_| ());
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|&quantity| quantity <= MAX_LINE_QUANTITY)
            .ok_or_else(|| quantity_too_large(quantity))?;

        let line = self.line_mut(line_id)?;
        ensure_line_total_fits(&line.item, quantity)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Increase a line's quantity by one.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown line, `InvalidArgument` when the line is
    /// already at [`MAX_LINE_QUANTITY`].
    pub fn increment(&mut self, line_id: LineId) -> Result<u32> {
        let line = self.line_mut(line_id)?;
        let quantity = line
            .quantity
            .checked_add(1)
            .filter(|&quantity| quantity <= MAX_LINE_QUANTITY)
            .ok_or_else(|| quantity_too_large(i64::from(line.quantity) + 1))?;
        ensure_line_total_fits(&line.item, quantity)?;
        line.quantity = quantity;
        Ok(quantity)
    }

    /// Decrease a line's quantity by one, removing it when it reaches zero.
    ///
    /// Returns the remaining quantity (0 when the line was removed).
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown line.
    pub fn decrement(&mut self, line_id: LineId) -> Result<u32> {
        let remaining = self.line(line_id)?.quantity.saturating_sub(1);
        self.set_quantity(line_id, i64::from(remaining))?;
        Ok(remaining)
    }

    /// Delete a line and return it.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown line.
    pub fn remove(&mut self, line_id: LineId) -> Result<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|line| line.line_id == line_id)
            .ok_or_else(|| line_not_found(line_id))?;
        Ok(self.lines.remove(index))
    }

    /// Empty the cart. Returns the number of lines dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.lines.len();
        self.lines.clear();
        dropped
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown line.
    pub fn line(&self, line_id: LineId) -> Result<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.line_id == line_id)
            .ok_or_else(|| line_not_found(line_id))
    }

    fn line_mut(&mut self, line_id: LineId) -> Result<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.line_id == line_id)
            .ok_or_else(|| line_not_found(line_id))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Exact `sum(price * quantity)`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// `subtotal * rate`, unrounded.
    #[must_use]
    pub fn tax(&self, rate: Decimal) -> Decimal {
        self.subtotal().saturating_mul(rate)
    }

    /// Zero when the subtotal is strictly above `threshold`, `fee` otherwise.
    #[must_use]
    pub fn delivery_fee(&self, threshold: Decimal, fee: Decimal) -> Decimal {
        delivery_fee_for(self.subtotal(), threshold, fee)
    }

    /// `subtotal + tax + delivery_fee`.
    #[must_use]
    pub fn total(&self, pricing: &PricingConfig) -> Decimal {
        self.totals(pricing).total
    }

    /// Amount still needed before delivery is free.
    ///
    /// `None` when the cart is empty or the subtotal has reached the
    /// threshold. At exactly the threshold the fee is still charged but
    /// there is no positive amount to suggest, so no hint is given.
    #[must_use]
    pub fn free_delivery_remaining(&self, threshold: Decimal) -> Option<Decimal> {
        let subtotal = self.subtotal();
        (!self.is_empty() && subtotal < threshold).then(|| threshold - subtotal)
    }

    /// All derived amounts at once.
    #[must_use]
    pub fn totals(&self, pricing: &PricingConfig) -> CartTotals {
        let subtotal = self.subtotal();
        let tax = subtotal.saturating_mul(pricing.tax_rate);
        let delivery_fee = delivery_fee_for(
            subtotal,
            pricing.free_delivery_threshold,
            pricing.delivery_fee,
        );

        CartTotals {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal.saturating_add(tax).saturating_add(delivery_fee),
            item_count: self.item_count(),
            free_delivery_remaining: self.free_delivery_remaining(pricing.free_delivery_threshold),
        }
    }
}

fn delivery_fee_for(subtotal: Decimal, threshold: Decimal, fee: Decimal) -> Decimal {
    if subtotal > threshold {
        Decimal::ZERO
    } else {
        fee
    }
}

fn line_not_found(line_id: LineId) -> KioskError {
    KioskError::NotFound(format!("cart line {line_id}"))
}

fn quantity_too_large(quantity: i64) -> KioskError {
    KioskError::InvalidArgument(format!(
        "quantity {quantity} exceeds the limit of {MAX_LINE_QUANTITY}"
    ))
}

fn ensure_line_total_fits(item: &MenuItem, quantity: u32) -> Result<()> {
    item.price
        .checked_mul(Decimal::from(quantity))
        .map(|_| ())
        .ok_or_else(|| {
            KioskError::InvalidArgument(format!("line total for {} is too large", item.name))
        })
}
