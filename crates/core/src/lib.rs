//! Kiosk Core - Shared types library.
//!
//! This crate provides common types used across all kiosk components:
//! - `kiosk` - Catalog, cart, navigation and session logic
//! - `cli` - Command-line driver for demos, scripted replays and catalog checks
//!
//! # Architecture
//!
//! The core crate contains only types - no timers, no I/O, no logging.
//! This keeps it lightweight and lets a rendering layer depend on it without
//! pulling in the session runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and screens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
