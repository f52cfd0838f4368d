//! Screen navigation state machine.
//!
//! ```text
//! welcome        --start-------------------> category_list
//! category_list  --select_category(c)------> item_list (selected = c)
//! category_list  --view_cart---------------> cart
//! category_list  --back--------------------> welcome
//! item_list      --view_cart---------------> cart
//! item_list      --back--------------------> category_list (selection cleared)
//! cart           --back--------------------> item_list if selected, else category_list
//! cart           --place_order (non-empty)-> welcome (cart cleared)
//! ```
//!
//! `category_list --back--> welcome` keeps the cart. `inactivity_timeout` is
//! accepted from every screen and resets to `welcome`. The navigator never
//! touches the cart itself; it reports through [`Transition::clears_cart`]
//! when the caller must clear it.

use kiosk_core::{CategoryId, Screen};
use serde::Serialize;

use crate::error::{KioskError, Result};

/// Input events of the navigation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Start,
    SelectCategory(CategoryId),
    ViewCart,
    Back,
    PlaceOrder,
    InactivityTimeout,
}

impl NavEvent {
    /// Name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectCategory(_) => "select_category",
            Self::ViewCart => "view_cart",
            Self::Back => "back",
            Self::PlaceOrder => "place_order",
            Self::InactivityTimeout => "inactivity_timeout",
        }
    }
}

/// Result of an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Screen,
    pub to: Screen,
    /// The caller must clear the cart (order placed or session timed out).
    pub clears_cart: bool,
}

/// Current screen plus the selected category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Navigator {
    screen: Screen,
    selected_category: Option<CategoryId>,
}

impl Navigator {
    /// A navigator on the welcome screen with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            screen: Screen::Welcome,
            selected_category: None,
        }
    }

    /// Build from raw parts without checking invariants.
    #[cfg(test)]
    pub(crate) const fn from_parts(screen: Screen, selected_category: Option<CategoryId>) -> Self {
        Self {
            screen,
            selected_category,
        }
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub const fn selected_category(&self) -> Option<CategoryId> {
        self.selected_category
    }

    /// Apply an event.
    ///
    /// `cart_is_empty` gates `PlaceOrder`. The caller is responsible for
    /// validating the category id of `SelectCategory` against the catalog.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for `PlaceOrder` on an empty cart, and
    /// `InvalidTransition` for events the current screen does not accept.
    /// State is unchanged on error.
    pub fn apply(&mut self, event: NavEvent, cart_is_empty: bool) -> Result<Transition> {
        let from = self.screen;
        let (to, selected, clears_cart) = match (from, event) {
            (_, NavEvent::InactivityTimeout) => (Screen::Welcome, None, true),
            (Screen::Welcome, NavEvent::Start) => (Screen::CategoryList, None, false),
            (Screen::CategoryList, NavEvent::SelectCategory(id)) => {
                (Screen::ItemList, Some(id), false)
            }
            (Screen::CategoryList, NavEvent::Back) => (Screen::Welcome, None, false),
            (Screen::CategoryList | Screen::ItemList, NavEvent::ViewCart) => {
                (Screen::Cart, self.selected_category, false)
            }
            (Screen::ItemList, NavEvent::Back) => (Screen::CategoryList, None, false),
            (Screen::Cart, NavEvent::Back) => match self.selected_category {
                Some(id) => (Screen::ItemList, Some(id), false),
                None => (Screen::CategoryList, None, false),
            },
            (Screen::Cart, NavEvent::PlaceOrder) => {
                if cart_is_empty {
                    return Err(KioskError::InvalidArgument(
                        "cannot place an order with an empty cart".to_string(),
                    ));
                }
                (Screen::Welcome, None, true)
            }
            (screen, event) => {
                return Err(KioskError::InvalidTransition {
                    screen,
                    intent: event.name(),
                });
            }
        };

        self.screen = to;
        self.selected_category = selected;
        Ok(Transition {
            from,
            to,
            clears_cart,
        })
    }

    /// Check the structural invariant: `item_list` always has a selected category.
    ///
    /// # Errors
    ///
    /// `InternalInconsistency` when the invariant does not hold.
    pub fn check(&self) -> Result<()> {
        if self.screen == Screen::ItemList && self.selected_category.is_none() {
            return Err(KioskError::InternalInconsistency(
                "item list shown without a selected category".to_string(),
            ));
        }
        Ok(())
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
