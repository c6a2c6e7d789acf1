//! Shared identifier types.
//!
//! Identities, groups and memberships themselves live in `primitives.rs`; this
//! file holds the small value types those structures are keyed by.

use uuid::Uuid;

/// Stable identifier of a user as issued by the external identity subsystem.
///
/// The nil UUID is reserved for the anonymous sentinel (see
/// [`UserIdentity::anonymous`](crate::primitives::UserIdentity::anonymous)).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generates a fresh random identifier.
    pub fn new_v4() -> Self {
        UserId(Uuid::new_v4())
    }

    /// The identifier carried by the anonymous sentinel.
    pub const fn anonymous() -> Self {
        UserId(Uuid::nil())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        UserId(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_id_is_nil() {
        assert!(UserId::anonymous().is_anonymous());
        assert!(!UserId::new_v4().is_anonymous());
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = UserId::new_v4();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
