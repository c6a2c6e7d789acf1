//! Access-control checks (group membership).
//!
//! Profile- and visibility-based checks over the app metadata document live in
//! `crate::permissions`; they build on the predicate defined here.

pub mod membership;

pub use membership::*;
