//!
//! Application registration records.
//!
//! Each sub-application is described by a constant [`AppConfig`] that the host
//! reads once at startup. The records carry no behaviour and perform no
//! validation; label clashes are detected by [`AppRegistry::register`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Primary-key field used for models that do not declare one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefaultAutoField {
    AutoField,
    #[default]
    BigAutoField,
    SmallAutoField,
}

impl DefaultAutoField {
    /// Dotted path understood by the host's model layer.
    pub const fn as_path(&self) -> &'static str {
        match self {
            DefaultAutoField::AutoField => "django.db.models.AutoField",
            DefaultAutoField::BigAutoField => "django.db.models.BigAutoField",
            DefaultAutoField::SmallAutoField => "django.db.models.SmallAutoField",
        }
    }
}

impl std::fmt::Display for DefaultAutoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_path())
    }
}

/// Identity of one sub-application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Full dotted module name, e.g. `grit.sales`.
    pub name: Cow<'static, str>,
    #[serde(default)]
    pub label: Option<Cow<'static, str>>,
    #[serde(default)]
    pub verbose_name: Option<Cow<'static, str>>,
    #[serde(default)]
    pub default_auto_field: DefaultAutoField,
}

impl AppConfig {
    pub const fn new(name: &'static str) -> Self {
        AppConfig {
            name: Cow::Borrowed(name),
            label: None,
            verbose_name: None,
            default_auto_field: DefaultAutoField::BigAutoField,
        }
    }

    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_verbose_name(mut self, verbose_name: impl Into<Cow<'static, str>>) -> Self {
        self.verbose_name = Some(verbose_name.into());
        self
    }

    pub fn with_default_auto_field(mut self, field: DefaultAutoField) -> Self {
        self.default_auto_field = field;
        self
    }

    /// Explicit label, else the last dotted component of `name`.
    pub fn label(&self) -> &str {
        match &self.label {
            Some(label) => label.as_ref(),
            None => self.name.rsplit('.').next().unwrap_or(self.name.as_ref()),
        }
    }

    /// Explicit verbose name, else the label in title case.
    pub fn verbose_name(&self) -> Cow<'_, str> {
        match &self.verbose_name {
            Some(v) => Cow::Borrowed(v.as_ref()),
            None => Cow::Owned(title_case(self.label())),
        }
    }
}

// Uppercases the first letter of every alphabetic run, lowercases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

pub const CORE: AppConfig = AppConfig {
    name: Cow::Borrowed("grit.core"),
    label: Some(Cow::Borrowed("core")),
    verbose_name: Some(Cow::Borrowed("Core")),
    default_auto_field: DefaultAutoField::BigAutoField,
};

pub const SALES: AppConfig = AppConfig {
    name: Cow::Borrowed("grit.sales"),
    label: Some(Cow::Borrowed("core_sales")),
    verbose_name: Some(Cow::Borrowed("Sales")),
    default_auto_field: DefaultAutoField::BigAutoField,
};

pub const CUSTOM_AUTH: AppConfig = AppConfig {
    name: Cow::Borrowed("grit.auth"),
    label: Some(Cow::Borrowed("customauth")),
    verbose_name: Some(Cow::Borrowed("Users")),
    default_auto_field: DefaultAutoField::BigAutoField,
};

/// Label derives from the name (`core_agent`).
pub const AGENTS: AppConfig = AppConfig {
    name: Cow::Borrowed("core_agent"),
    label: None,
    verbose_name: Some(Cow::Borrowed("Agents")),
    default_auto_field: DefaultAutoField::BigAutoField,
};

/// Applications the host registers at startup, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct AppRegistry {
    apps: BTreeMap<String, AppConfig>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the four built-in records.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for config in [CORE, SALES, CUSTOM_AUTH, AGENTS] {
            registry.register(config)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, config: AppConfig) -> Result<(), RegistryError> {
        if config.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let label = config.label().to_string();
        if self.apps.contains_key(&label) {
            return Err(RegistryError::DuplicateLabel(label));
        }
        if self.apps.values().any(|existing| existing.name == config.name) {
            return Err(RegistryError::DuplicateName(config.name.into_owned()));
        }
        tracing::debug!(
            name = %config.name,
            label = %label,
            auto_field = %config.default_auto_field,
            "registered application"
        );
        self.apps.insert(label, config);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&AppConfig> {
        self.apps.get(label)
    }

    /// Registered records in label order.
    pub fn iter(&self) -> impl Iterator<Item = &AppConfig> {
        self.apps.values()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
