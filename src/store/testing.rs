//! Store wrappers for tests: a query counter and an always-failing store.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::StoreError;
use crate::store::MembershipStore;
use crate::types::UserId;

/// Wraps another store and counts every query made against it.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    inner: S,
    queries: AtomicUsize,
}

impl<S: MembershipStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        CountingStore { inner, queries: AtomicUsize::new(0) }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: MembershipStore> MembershipStore for CountingStore<S> {
    fn is_member(&self, user: &UserId, group_name: &str) -> Result<bool, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.is_member(user, group_name)
    }

    fn groups_of(&self, user: &UserId) -> Result<Vec<String>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.groups_of(user)
    }
}

/// A store whose backend is permanently down.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl MembershipStore for UnavailableStore {
    fn is_member(&self, _user: &UserId, _group_name: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn groups_of(&self, _user: &UserId) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
