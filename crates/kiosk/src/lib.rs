//! Kiosk - self-service ordering session library.
//!
//! One [`KioskSession`] drives a single touch-screen terminal: it owns the
//! screen navigator, the cart, the inactivity monitor and the in-memory
//! order history. Rendering layers send [`Intent`]s and draw the returned
//! [`ViewModel`].
//!
//! # Modules
//!
//! - [`catalog`] - Categories and menu items, built in or loaded from YAML
//! - [`cart`] - Cart lines, quantities and order totals
//! - [`navigation`] - Screen transition table
//! - [`inactivity`] - Idle deadline tracking
//! - [`session`] - Intent dispatch over all of the above
//! - [`driver`] - Tokio task that owns a session and fires the idle reset
//! - [`history`] - Receipts of placed orders
//! - [`config`] - Environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod history;
pub mod inactivity;
pub mod intent;
pub mod navigation;
pub mod session;
pub mod view;

pub use cart::{CartLine, CartStore, CartTotals};
pub use catalog::{Catalog, CatalogError, Category, MenuItem};
pub use config::{ConfigError, KioskConfig, PricingConfig};
pub use driver::{DriverError, SessionHandle};
pub use error::{KioskError, Result};
pub use history::{OrderHistory, OrderReceipt};
pub use intent::Intent;
pub use session::{KioskSession, Outcome};
pub use view::{SelectedCategory, ViewModel};
