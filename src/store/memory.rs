//! In-process membership store.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::primitives::{Group, MembershipEdge};
use crate::store::MembershipStore;
use crate::types::UserId;

#[derive(Debug, Default)]
struct Inner {
    groups: BTreeSet<String>,
    members: HashMap<UserId, BTreeSet<String>>,
}

/// A `MembershipStore` held entirely in memory.
///
/// Suitable for hosts that mirror memberships from another system and for
/// tests. Readers never block each other.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    inner: RwLock<Inner>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a list of edges, creating groups as needed.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = MembershipEdge>,
    {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for edge in edges {
                inner.groups.insert(edge.group.clone());
                inner.members.entry(edge.user).or_default().insert(edge.group);
            }
        }
        store
    }

    /// Creates the group if it does not exist yet. Returns `true` when it was new.
    pub fn add_group(&self, group: &Group) -> bool {
        self.inner.write().groups.insert(group.name.clone())
    }

    /// Adds `user` to an existing group.
    pub fn add_member(&self, user: UserId, group_name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if !inner.groups.contains(group_name) {
            return Err(StoreError::UnknownGroup(group_name.to_string()));
        }
        inner
            .members
            .entry(user)
            .or_default()
            .insert(group_name.to_string());
        tracing::debug!(%user, group = group_name, "membership added");
        Ok(())
    }

    /// Removes the edge if present. Returns `true` when an edge was removed.
    pub fn remove_member(&self, user: &UserId, group_name: &str) -> bool {
        let mut inner = self.inner.write();
        let removed = match inner.members.get_mut(user) {
            Some(groups) => groups.remove(group_name),
            None => false,
        };
        if inner.members.get(user).is_some_and(|g| g.is_empty()) {
            inner.members.remove(user);
        }
        removed
    }

    /// All known group names, sorted.
    pub fn groups(&self) -> Vec<Group> {
        self.inner.read().groups.iter().map(Group::new).collect()
    }
}

impl MembershipStore for InMemoryMembershipStore {
    fn is_member(&self, user: &UserId, group_name: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .members
            .get(user)
            .is_some_and(|groups| groups.contains(group_name)))
    }

    fn groups_of(&self, user: &UserId) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .members
            .get(user)
            .map(|groups| groups.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_member_requires_known_group() {
        let store = InMemoryMembershipStore::new();
        let user = UserId::new_v4();
        assert_eq!(
            store.add_member(user, "editors"),
            Err(StoreError::UnknownGroup("editors".to_string()))
        );
        assert!(store.add_group(&Group::new("editors")));
        assert!(!store.add_group(&Group::new("editors")));
        store.add_member(user, "editors").unwrap();
        assert_eq!(store.is_member(&user, "editors"), Ok(true));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let user = UserId::new_v4();
        let store = InMemoryMembershipStore::from_edges([MembershipEdge {
            user,
            group: "Admins".to_string(),
        }]);
        assert_eq!(store.is_member(&user, "Admins"), Ok(true));
        assert_eq!(store.is_member(&user, "admins"), Ok(false));
    }

    #[test]
    fn groups_of_is_sorted_and_unique() {
        let user = UserId::new_v4();
        let edge = |g: &str| MembershipEdge { user, group: g.to_string() };
        let store = InMemoryMembershipStore::from_edges([edge("sales"), edge("editors"), edge("sales")]);
        assert_eq!(store.groups_of(&user).unwrap(), vec!["editors", "sales"]);
        assert!(store.groups_of(&UserId::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn remove_member_drops_edge() {
        let user = UserId::new_v4();
        let store = InMemoryMembershipStore::from_edges([MembershipEdge {
            user,
            group: "editors".to_string(),
        }]);
        assert!(store.remove_member(&user, "editors"));
        assert!(!store.remove_member(&user, "editors"));
        assert_eq!(store.is_member(&user, "editors"), Ok(false));
        // The group itself survives.
        assert_eq!(store.groups(), vec![Group::new("editors")]);
    }
}
