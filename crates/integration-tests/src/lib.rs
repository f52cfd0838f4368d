//! Integration tests for the ordering kiosk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kiosk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `kiosk_scenarios` - Full sessions driven intent by intent
//! - `kiosk_timeout` - Idle reset through the async session driver
//! - `catalog_loading` - YAML catalogs and intent scripts from disk
//!
//! Shared helpers live here so every test file builds sessions the same way.

use std::path::PathBuf;
use std::sync::Arc;

use kiosk::{Catalog, Intent, KioskConfig, KioskError, KioskSession, Outcome};
use kiosk_core::{CategoryId, ItemId};
use tokio::time::Instant;

/// Category id of "Mains" in the built-in menu.
pub const MAINS: CategoryId = CategoryId::new(1);

/// Item id of the "Signature Burger" (12.90) in the built-in menu.
pub const BURGER: ItemId = ItemId::new(1);

/// A session on the built-in menu with a clock the test controls.
pub struct TestKiosk {
    pub session: KioskSession,
    pub now: Instant,
}

impl TestKiosk {
    /// Default configuration and the built-in menu.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&KioskConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &KioskConfig) -> Self {
        Self::with_catalog(Catalog::builtin(), config)
    }

    #[must_use]
    pub fn with_catalog(catalog: Catalog, config: &KioskConfig) -> Self {
        Self {
            session: KioskSession::new(Arc::new(catalog), config),
            now: Instant::now(),
        }
    }

    /// Dispatch at the current test time.
    ///
    /// # Errors
    ///
    /// Whatever the session rejects.
    pub fn act(&mut self, intent: Intent) -> Result<Outcome, KioskError> {
        self.session.dispatch(intent, self.now)
    }

    /// Move the test clock forward.
    pub fn advance(&mut self, by: std::time::Duration) {
        self.now += by;
    }

    /// `start` then open Mains.
    ///
    /// # Panics
    ///
    /// If either intent is rejected.
    #[allow(clippy::unwrap_used)]
    pub fn open_mains(&mut self) {
        self.act(Intent::Start).unwrap();
        self.act(Intent::SelectCategory { category_id: MAINS })
            .unwrap();
    }

    /// Add `item_id` and return the new line's id.
    ///
    /// # Panics
    ///
    /// If the add is rejected.
    #[allow(clippy::unwrap_used)]
    pub fn add(&mut self, item_id: ItemId) -> kiosk_core::LineId {
        match self.act(Intent::AddToCart { item_id }).unwrap() {
            Outcome::Added(lines) => *lines.first().unwrap(),
            other => panic!("expected Added, got {other:?}"),
        }
    }
}

impl Default for TestKiosk {
    fn default() -> Self {
        Self::new()
    }
}

/// Path of a file under `tests/fixtures`.
#[must_use]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
