//! Translation health engine.
//!
//! Collects translation lookup failures and related localization defects
//! reported by a running UI, de-duplicates them into issues, and scores the
//! health of each locale. An HTTP surface in [`server`] exposes the engine to
//! operators and to the client-side reporters.

pub mod config;
pub mod error;
pub mod health;
pub mod i18n;
pub mod server;
