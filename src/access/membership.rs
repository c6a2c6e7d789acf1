use crate::primitives::UserIdentity;
use crate::store::MembershipStore;

/// Checks whether `user` currently belongs to the group named `group_name`.
///
/// Unauthenticated identities are rejected before the store is consulted, so a
/// stray group relation attached to an anonymous user never grants anything.
/// Names are matched exactly and case-sensitively.
///
/// This never fails: an unknown group, an empty name or a store error all
/// yield `false`. Store errors are logged at `warn`.
///
/// # Arguments
/// * `store` - The external membership relation to query.
/// * `user` - Any identity, including the anonymous sentinel.
/// * `group_name` - The group to test for.
///
/// # Returns
/// `true` only if an edge between `user` and `group_name` was confirmed.
pub fn has_group<S>(store: &S, user: &UserIdentity, group_name: &str) -> bool
where
    S: MembershipStore + ?Sized,
{
    if !user.is_authenticated {
        return false;
    }
    if group_name.is_empty() {
        return false;
    }
    match store.is_member(&user.id, group_name) {
        Ok(found) => {
            tracing::debug!(user = %user.id, group = group_name, found, "group membership lookup");
            found
        }
        Err(err) => {
            tracing::warn!(user = %user.id, group = group_name, error = %err, "membership lookup failed, denying");
            false
        }
    }
}

/// `true` if `user` belongs to at least one of `group_names`.
///
/// Stops at the first confirmed membership. Same short-circuit rules as
/// [`has_group`].
pub fn has_any_group<S, I, N>(store: &S, user: &UserIdentity, group_names: I) -> bool
where
    S: MembershipStore + ?Sized,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    if !user.is_authenticated {
        return false;
    }
    group_names
        .into_iter()
        .any(|name| has_group(store, user, name.as_ref()))
}

/// The user's group names, or an empty list for anonymous users and on store
/// failure.
pub(crate) fn user_group_names<S>(store: &S, user: &UserIdentity) -> Vec<String>
where
    S: MembershipStore + ?Sized,
{
    if !user.is_authenticated {
        return Vec::new();
    }
    match store.groups_of(&user.id) {
        Ok(groups) => groups,
        Err(err) => {
            tracing::warn!(user = %user.id, error = %err, "group listing failed, treating user as groupless");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::MembershipEdge;
    use crate::store::testing::{CountingStore, UnavailableStore};
    use crate::store::InMemoryMembershipStore;
    use crate::types::UserId;

    fn alice_store() -> (UserIdentity, InMemoryMembershipStore) {
        let alice = UserIdentity::authenticated(UserId::new_v4(), "alice");
        let store = InMemoryMembershipStore::from_edges([MembershipEdge {
            user: alice.id,
            group: "editors".to_string(),
        }]);
        (alice, store)
    }

    #[test]
    fn test_member_and_non_member() {
        let (alice, store) = alice_store();
        assert!(has_group(&store, &alice, "editors"));
        assert!(!has_group(&store, &alice, "admins"));
    }

    #[test]
    fn test_anonymous_short_circuits() {
        // Anonymous sentinel has a stored edge, which must be ignored.
        let store = CountingStore::new(InMemoryMembershipStore::from_edges([MembershipEdge {
            user: UserId::anonymous(),
            group: "editors".to_string(),
        }]));
        let anon = UserIdentity::anonymous();
        assert!(!has_group(&store, &anon, "editors"));
        assert!(!has_any_group(&store, &anon, ["editors", "admins"]));
        assert_eq!(store.queries(), 0);
    }

    #[test]
    fn test_unauthenticated_known_user() {
        let (mut alice, store) = alice_store();
        alice.is_authenticated = false;
        assert!(!has_group(&store, &alice, "editors"));
    }

    #[test]
    fn test_empty_name_is_not_queried() {
        let (alice, store) = alice_store();
        let store = CountingStore::new(store);
        assert!(!has_group(&store, &alice, ""));
        assert_eq!(store.queries(), 0);
    }

    #[test]
    fn test_store_failure_denies() {
        let alice = UserIdentity::authenticated(UserId::new_v4(), "alice");
        assert!(!has_group(&UnavailableStore, &alice, "editors"));
        assert!(user_group_names(&UnavailableStore, &alice).is_empty());
    }

    #[test]
    fn test_has_any_group_stops_at_first_hit() {
        let (alice, store) = alice_store();
        let store = CountingStore::new(store);
        assert!(has_any_group(&store, &alice, ["editors", "admins", "sales"]));
        assert_eq!(store.queries(), 1);
        assert!(!has_any_group(&store, &alice, Vec::<String>::new()));
    }

    #[test]
    fn test_works_through_trait_object() {
        let (alice, store) = alice_store();
        let dyn_store: &dyn MembershipStore = &store;
        assert!(has_group(dyn_store, &alice, "editors"));
    }
}
