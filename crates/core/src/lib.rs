//! Domain logic for outing grouping: tenting and eating (grubmaster) groups.
//!
//! This crate has no database or HTTP dependencies. Everything here is a pure
//! function over value types so the validators and auto-assignment
//! heuristics can be exercised directly from unit tests.

pub mod error;
pub mod grouping;
pub mod outing;
pub mod roles;
pub mod types;
