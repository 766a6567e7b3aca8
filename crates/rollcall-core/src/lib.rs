//! Core types and trait definitions for the Rollcall roster reconciler.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod event;
pub mod person;
pub mod record;
pub mod store;
pub mod unit;

pub use error::{Error, Result};
