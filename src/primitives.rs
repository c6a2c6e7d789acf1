use crate::types::UserId;

// --- Identities -------------------------------------------------------------

/// An actor recognised by the external identity subsystem.
///
/// The crate only reads these; authentication and lifecycle belong to the host.
/// Group memberships are not carried here, they are looked up in a
/// [`MembershipStore`](crate::store::MembershipStore) at check time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub username: String,
    pub is_authenticated: bool,
    #[serde(default)]
    pub is_superuser: bool,
    /// Name of the CRUD profile assigned to this user, if any.
    #[serde(default)]
    pub profile: Option<String>,
}

impl UserIdentity {
    /// An authenticated, non-privileged identity.
    pub fn authenticated(id: UserId, username: impl Into<String>) -> Self {
        UserIdentity {
            id,
            username: username.into(),
            is_authenticated: true,
            is_superuser: false,
            profile: None,
        }
    }

    /// The unauthenticated sentinel.
    pub fn anonymous() -> Self {
        UserIdentity {
            id: UserId::anonymous(),
            username: String::new(),
            is_authenticated: false,
            is_superuser: false,
            profile: None,
        }
    }

    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Superuser status only counts for authenticated identities.
    pub fn is_superuser(&self) -> bool {
        self.is_authenticated && self.is_superuser
    }
}

// --- Groups -----------------------------------------------------------------

/// A named collection of user identities. Names are unique within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Group {
    pub name: String,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Group { name: name.into() }
    }
}

/// A many-to-many edge between a user and a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MembershipEdge {
    pub user: UserId,
    pub group: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_never_superuser() {
        let anon = UserIdentity::anonymous().with_superuser(true);
        assert!(!anon.is_superuser());
        assert!(!anon.is_authenticated);
    }

    #[test]
    fn authenticated_superuser() {
        let root = UserIdentity::authenticated(UserId::new_v4(), "root").with_superuser(true);
        assert!(root.is_superuser());
    }

    #[test]
    fn identity_deserializes_with_defaults() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","username":"alice","is_authenticated":true}"#;
        let user: UserIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "alice");
        assert!(!user.is_superuser);
        assert_eq!(user.profile, None);
    }
}
