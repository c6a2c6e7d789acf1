//!
//! Defines error types for grit-roles.
//!
//! None of these ever escape the membership predicate itself, which degrades to
//! `false`; they surface from the store, template, registry and settings layers.

/// Errors reported by a [`MembershipStore`](crate::store::MembershipStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or answered with a failure.
    #[error("Membership store unavailable: {0}")]
    Unavailable(String),
    /// A mutation referenced a group the store does not know.
    #[error("Unknown group: {0}")]
    UnknownGroup(String),
}

/// Errors raised while parsing or evaluating a filter expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("Invalid filter expression: {0}")]
    Syntax(String),
    #[error("No filter registered under the name {0:?}")]
    UnknownFilter(String),
    #[error("Variable {0:?} is not bound")]
    UnboundVariable(String),
}

/// Misconfiguration detected while registering application records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Application name must not be empty")]
    EmptyName,
    /// Two records resolved to the same label.
    #[error("Application labels aren't unique, duplicates: {0}")]
    DuplicateLabel(String),
    #[error("Application {0} is already registered")]
    DuplicateName(String),
}

/// Failure to load an `AppMetadataSettings` document.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
