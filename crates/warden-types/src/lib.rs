//! Shared types, entity records, adapter traits, and errors for Warden.
//!
//! This crate contains the foundational types that are shared between the
//! policy core and all persistence adapter implementations. Keeping them in a
//! separate crate allows adapters to compile without pulling in the engine.

pub mod error;
pub mod model;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
