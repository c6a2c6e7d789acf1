#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! grit-roles: group-based authorization helpers for the grit applications.
//!
//! The centre of the crate is [`access::has_group`], a read-only predicate
//! answering whether an authenticated user belongs to a named group. Around it
//! sit the template filter surface, the app/tab visibility and profile
//! permission checks, and the static registration records of the
//! sub-applications. Users and memberships are owned by an external subsystem
//! and reached through [`store::MembershipStore`].

// Identifier types shared across modules.
pub mod types;

// Identities, groups and membership edges.
pub mod primitives;

// Re-export all core primitives for easier access at the crate root.
pub use primitives::*;

pub mod error;

// Membership store trait and the in-memory implementation.
pub mod store;

// Group membership predicate.
pub mod access;

// Named template filters (`user|has_group:"editors"`).
pub mod filters;

// Visibility and CRUD checks over the app metadata document.
pub mod permissions;

// Sub-application registration records.
pub mod apps;

pub use access::{has_any_group, has_group};
pub use store::{InMemoryMembershipStore, MembershipStore};

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}
