//! Core types for the ordering kiosk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod screen;

pub use id::*;
pub use price::{CurrencyCode, ParseCurrencyError, Price};
pub use screen::Screen;
