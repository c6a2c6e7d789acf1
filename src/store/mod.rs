//!
//! Membership store abstraction.
//!
//! Group memberships are owned by an external user-and-permissions subsystem.
//! This module defines the read-only seam through which the crate queries it,
//! keeping the predicate and permission helpers independent of how (or where)
//! the membership relation is persisted.

use crate::error::StoreError;
use crate::types::UserId;

/// Read-only view over the user/group membership relation.
///
/// Implementations must be safe to share between threads; concurrent calls are
/// independent and the store is responsible for its own consistency.
/// Group names are compared exactly (case-sensitive).
pub trait MembershipStore: Send + Sync {
    /// Whether `user` has an edge to a group named exactly `group_name`.
    /// A nonexistent group is simply `Ok(false)`.
    fn is_member(&self, user: &UserId, group_name: &str) -> Result<bool, StoreError>;

    /// Names of every group `user` belongs to, sorted and without duplicates.
    fn groups_of(&self, user: &UserId) -> Result<Vec<String>, StoreError>;
}

impl<S: MembershipStore + ?Sized> MembershipStore for &S {
    fn is_member(&self, user: &UserId, group_name: &str) -> Result<bool, StoreError> {
        (**self).is_member(user, group_name)
    }

    fn groups_of(&self, user: &UserId) -> Result<Vec<String>, StoreError> {
        (**self).groups_of(user)
    }
}

impl<S: MembershipStore + ?Sized> MembershipStore for std::sync::Arc<S> {
    fn is_member(&self, user: &UserId, group_name: &str) -> Result<bool, StoreError> {
        (**self).is_member(user, group_name)
    }

    fn groups_of(&self, user: &UserId) -> Result<Vec<String>, StoreError> {
        (**self).groups_of(user)
    }
}

pub mod memory;

// Re-export the concrete store for easier access
pub use memory::InMemoryMembershipStore;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
