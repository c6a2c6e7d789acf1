//!
//! Group- and profile-based permissions over the app metadata document.
//!
//! The host publishes an `AppMetadataSettings` document describing its apps,
//! tabs and models, plus per-group visibility rules (`GROUPS`) and per-profile
//! visibility, CRUD and field grants (`PROFILES`). The helpers here answer, for
//! a given user, which parts of that document they may see and what they may do
//! with a model or one of its fields.
//!
//! Model-level checks are deny-by-default and return `false` rather than an
//! error, so callers can OR several checks together. Superusers bypass all of
//! them. Maps keep document order: the first app listing a model owns it, and
//! filtered menus come out in the order they were defined.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::access::membership::user_group_names;
use crate::error::SettingsError;
use crate::primitives::UserIdentity;
use crate::store::MembershipStore;

/// Whether a tab is shown.
///
/// Only the exact string `"visible"` counts as visible. Any other value
/// (other spellings, `null`, numbers) is read as hidden instead of failing the
/// whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    Visible,
    #[default]
    Hidden,
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
        })
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) if s == "visible" => Ok(Visibility::Visible),
            _ => Ok(Visibility::Hidden),
        }
    }
}

// Truthiness the way the settings authors write it: `true`, `1`, `"yes"` all
// enable; `false`, `0`, `""`, `null`, empty containers disable.
fn deserialize_truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    use serde_json::Value;

    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

/// `app_visibilities` entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVisibility {
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub visible: bool,
}

/// `tab_visibilities` entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabVisibility {
    #[serde(default)]
    pub visibility: Visibility,
}

/// Visibility rules carried by a group or a profile.
///
/// Each section is optional; a profile with neither section does not take part
/// in visibility filtering at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_visibilities: Option<IndexMap<String, AppVisibility>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_visibilities: Option<IndexMap<String, TabVisibility>>,
}

impl VisibilityRules {
    fn has_rules(&self) -> bool {
        self.app_visibilities.is_some() || self.tab_visibilities.is_some()
    }

    fn app_visible(&self, app: &str) -> bool {
        self.app_visibilities
            .as_ref()
            .and_then(|apps| apps.get(app))
            .is_some_and(|v| v.visible)
    }

    fn tab_visible(&self, tab: &str) -> bool {
        self.tab_visibilities
            .as_ref()
            .and_then(|tabs| tabs.get(tab))
            .is_some_and(|v| v.visibility == Visibility::Visible)
    }

    fn grants(&self, app: &str, tab: &str) -> bool {
        self.app_visible(app) && self.tab_visible(tab)
    }

    fn collect_into<'a>(&'a self, apps: &mut BTreeSet<&'a str>, tabs: &mut BTreeSet<&'a str>) {
        if let Some(app_visibilities) = &self.app_visibilities {
            apps.extend(
                app_visibilities
                    .iter()
                    .filter(|(_, v)| v.visible)
                    .map(|(k, _)| k.as_str()),
            );
        }
        if let Some(tab_visibilities) = &self.tab_visibilities {
            tabs.extend(
                tab_visibilities
                    .iter()
                    .filter(|(_, v)| v.visibility == Visibility::Visible)
                    .map(|(k, _)| k.as_str()),
            );
        }
    }
}

/// One entry of `APPS`. Keys other than `label`, `icon` and `tabs` are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub tabs: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// CRUD operation checked by [`check_profile_permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "allow_create")]
    Create,
    #[serde(rename = "allow_read")]
    Read,
    #[serde(rename = "allow_edit")]
    Edit,
    #[serde(rename = "allow_delete")]
    Delete,
}

/// CRUD grants of a profile for one model. Unspecified flags are denied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPermissions {
    #[serde(default)]
    pub allow_create: bool,
    #[serde(default)]
    pub allow_read: bool,
    #[serde(default)]
    pub allow_edit: bool,
    #[serde(default)]
    pub allow_delete: bool,
    /// Every field of the model is readable unless listed otherwise.
    #[serde(default)]
    pub view_all_fields: bool,
}

impl ModelPermissions {
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Create => self.allow_create,
            Permission::Read => self.allow_read,
            Permission::Edit => self.allow_edit,
            Permission::Delete => self.allow_delete,
        }
    }
}

fn yes() -> bool {
    true
}

/// Access to one field. Unspecified flags are granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccess {
    #[serde(default = "yes")]
    pub readable: bool,
    #[serde(default = "yes")]
    pub editable: bool,
}

impl Default for FieldAccess {
    fn default() -> Self {
        FieldAccess { readable: true, editable: true }
    }
}

/// A named permission set assignable to users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(flatten)]
    pub visibility: VisibilityRules,
    #[serde(default)]
    pub model_permissions: IndexMap<String, ModelPermissions>,
    /// Keyed by `"<model>.<field>"`.
    #[serde(default)]
    pub field_permissions: IndexMap<String, FieldAccess>,
}

/// The host's app metadata document.
///
/// `GROUPS` and `PROFILES` are optional; their absence changes the outcome of
/// the checks (see the individual functions), so it is kept distinct from an
/// empty section. Unrecognised top-level sections are carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppMetadataSettings {
    #[serde(rename = "APPS", default)]
    pub apps: IndexMap<String, AppEntry>,
    #[serde(rename = "MODELS", default)]
    pub models: IndexMap<String, serde_json::Value>,
    #[serde(rename = "TABS", default)]
    pub tabs: IndexMap<String, serde_json::Value>,
    #[serde(rename = "GROUPS", default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<IndexMap<String, VisibilityRules>>,
    #[serde(rename = "PROFILES", default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<IndexMap<String, ProfileConfig>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppMetadataSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading app metadata settings");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn without_apps(&self) -> Self {
        let mut stripped = self.clone();
        stripped.apps.clear();
        stripped
    }

    // Keeps visible apps that still have a visible tab, in document order.
    fn restricted_to(&self, visible_apps: &BTreeSet<&str>, visible_tabs: &BTreeSet<&str>) -> Self {
        let mut filtered = self.clone();
        filtered.apps = self
            .apps
            .iter()
            .filter(|(key, _)| visible_apps.contains(key.as_str()))
            .filter_map(|(key, app)| {
                let tabs: Vec<String> = app
                    .tabs
                    .iter()
                    .filter(|tab| visible_tabs.contains(tab.as_str()))
                    .cloned()
                    .collect();
                if tabs.is_empty() {
                    return None;
                }
                let mut app = app.clone();
                app.tabs = tabs;
                Some((key.clone(), app))
            })
            .collect();
        filtered
    }
}

/// Profile name of `user`, if one is assigned and non-empty.
fn assigned_profile(user: &UserIdentity) -> Option<&str> {
    user.profile.as_deref().filter(|p| !p.is_empty())
}

/// Visibility rules of `user`'s profile, if the profile exists and has any.
fn profile_visibility_rules<'a>(
    settings: &'a AppMetadataSettings,
    user: &UserIdentity,
) -> Option<&'a VisibilityRules> {
    let profiles = settings.profiles.as_ref()?;
    let profile = profiles.get(assigned_profile(user)?)?;
    Some(&profile.visibility).filter(|rules| rules.has_rules())
}

/// Filters `settings` down to the apps and tabs `user`'s groups may see.
///
/// * No `GROUPS` section: `APPS` is emptied, superusers included.
/// * A superuser: returned unchanged.
/// * A user without groups (any anonymous user included): `APPS` is emptied.
/// * Otherwise visibility is the union over the user's groups. An app is kept
///   only if it is visible and still has at least one visible tab.
///
/// `settings` itself is never modified.
pub fn filter_app_metadata_by_user_groups<S>(
    settings: &AppMetadataSettings,
    user: &UserIdentity,
    store: &S,
) -> AppMetadataSettings
where
    S: MembershipStore + ?Sized,
{
    let Some(groups_config) = settings.groups.as_ref() else {
        return settings.without_apps();
    };
    if user.is_superuser() {
        return settings.clone();
    }

    let user_groups = user_group_names(store, user);
    if user_groups.is_empty() {
        return settings.without_apps();
    }

    let mut visible_apps = BTreeSet::new();
    let mut visible_tabs = BTreeSet::new();
    for group in user_groups.iter().filter_map(|name| groups_config.get(name)) {
        group.collect_into(&mut visible_apps, &mut visible_tabs);
    }

    let filtered = settings.restricted_to(&visible_apps, &visible_tabs);
    tracing::debug!(
        user = %user.id,
        groups = user_groups.len(),
        apps = filtered.apps.len(),
        "filtered app metadata by groups"
    );
    filtered
}

/// Filters `settings` down to the apps and tabs `user`'s profile may see.
///
/// The profile layer only restricts when it has something to say: without a
/// `PROFILES` section, for superusers, for users without a profile, and for
/// profiles that carry no visibility rules, `settings` is returned unchanged.
pub fn filter_app_metadata_by_user_profile(
    settings: &AppMetadataSettings,
    user: &UserIdentity,
) -> AppMetadataSettings {
    if user.is_superuser() {
        return settings.clone();
    }
    let Some(rules) = profile_visibility_rules(settings, user) else {
        return settings.clone();
    };

    let mut visible_apps = BTreeSet::new();
    let mut visible_tabs = BTreeSet::new();
    rules.collect_into(&mut visible_apps, &mut visible_tabs);
    settings.restricted_to(&visible_apps, &visible_tabs)
}

/// Combines a group-filtered and a profile-filtered copy of `original`.
///
/// An app or tab is kept if either layer kept it. Apps and tabs come out in
/// `original`'s order, and an app without any surviving tab is dropped.
pub fn merge_filtered_settings(
    group_filtered: &AppMetadataSettings,
    profile_filtered: &AppMetadataSettings,
    original: &AppMetadataSettings,
) -> AppMetadataSettings {
    let mut visible_apps = BTreeSet::new();
    let mut visible_tabs = BTreeSet::new();
    for (key, app) in group_filtered.apps.iter().chain(profile_filtered.apps.iter()) {
        visible_apps.insert(key.as_str());
        visible_tabs.extend(app.tabs.iter().map(String::as_str));
    }
    original.restricted_to(&visible_apps, &visible_tabs)
}

/// The menu `user` is shown: group and profile filtering merged with OR logic.
///
/// A profile layer that has no visibility rules for `user` contributes
/// nothing here, so users without groups or a visibility profile see no apps.
/// Superusers see everything.
pub fn filter_app_metadata_for_user<S>(
    settings: &AppMetadataSettings,
    user: &UserIdentity,
    store: &S,
) -> AppMetadataSettings
where
    S: MembershipStore + ?Sized,
{
    let by_groups = filter_app_metadata_by_user_groups(settings, user, store);
    let by_profile = if user.is_superuser() || profile_visibility_rules(settings, user).is_some() {
        filter_app_metadata_by_user_profile(settings, user)
    } else {
        settings.without_apps()
    };
    merge_filtered_settings(&by_groups, &by_profile, settings)
}

/// Locates the app and tab a model is shown under.
///
/// The model must be declared in `TABS` or `MODELS`; the first app in document
/// order listing it among its tabs wins, and the tab key is the model key.
pub fn find_app_and_tab_for_model(
    model_name: &str,
    settings: &AppMetadataSettings,
) -> Option<(String, String)> {
    if !settings.tabs.contains_key(model_name) && !settings.models.contains_key(model_name) {
        return None;
    }
    settings
        .apps
        .iter()
        .find(|(_, app)| app.tabs.iter().any(|tab| tab == model_name))
        .map(|(app_key, _)| (app_key.clone(), model_name.to_string()))
}

/// Whether any of `user`'s groups makes both the model's app and tab visible.
pub fn check_group_permission<S>(
    user: &UserIdentity,
    model_name: &str,
    settings: &AppMetadataSettings,
    store: &S,
) -> bool
where
    S: MembershipStore + ?Sized,
{
    if user.is_superuser() {
        return true;
    }
    let Some(groups_config) = settings.groups.as_ref() else {
        return false;
    };

    let user_groups = user_group_names(store, user);
    if user_groups.is_empty() {
        return false;
    }

    let Some((app_key, tab_key)) = find_app_and_tab_for_model(model_name, settings) else {
        tracing::debug!(model = model_name, "model not present in app metadata, denying");
        return false;
    };

    user_groups
        .iter()
        .filter_map(|name| groups_config.get(name))
        .any(|group| group.grants(&app_key, &tab_key))
}

/// Whether `user`'s profile makes both the model's app and tab visible.
pub fn check_profile_visibility(
    user: &UserIdentity,
    model_name: &str,
    settings: &AppMetadataSettings,
) -> bool {
    if user.is_superuser() {
        return true;
    }
    let Some(rules) = profile_visibility_rules(settings, user) else {
        return false;
    };

    find_app_and_tab_for_model(model_name, settings)
        .is_some_and(|(app_key, tab_key)| rules.grants(&app_key, &tab_key))
}

/// Whether the profile assigned to `user` grants `permission` on `model_name`.
pub fn check_profile_permission(
    user: &UserIdentity,
    model_name: &str,
    permission: Permission,
    settings: &AppMetadataSettings,
) -> bool {
    if user.is_superuser() {
        return true;
    }
    let Some(profiles) = settings.profiles.as_ref() else {
        return false;
    };
    let Some(profile_name) = assigned_profile(user) else {
        return false;
    };

    profiles
        .get(profile_name)
        .and_then(|profile| profile.model_permissions.get(model_name))
        .is_some_and(|grants| grants.allows(permission))
}

/// Field-level access of one user on one model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPermissionSet {
    /// Explicitly configured fields of the model, keyed by bare field name.
    pub fields: IndexMap<String, FieldAccess>,
    /// The profile has `field_permissions` at all. When set, unlisted fields
    /// are denied (whitelist mode).
    pub has_config: bool,
    /// Unlisted fields are readable (but not editable).
    pub view_all_fields: bool,
}

impl FieldPermissionSet {
    /// No restriction applies.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn readable(&self, field_name: &str) -> bool {
        if !self.has_config && !self.view_all_fields {
            return true;
        }
        if let Some(access) = self.fields.get(field_name) {
            return access.readable;
        }
        self.view_all_fields || !self.has_config
    }

    pub fn editable(&self, field_name: &str) -> bool {
        if !self.has_config {
            return true;
        }
        self.fields.get(field_name).is_some_and(|access| access.editable)
    }
}

/// Resolves the field permissions `user`'s profile sets on `model_name`.
///
/// Superusers, users without a profile and documents without `PROFILES` get
/// [`FieldPermissionSet::unrestricted`].
pub fn get_user_field_permissions(
    user: &UserIdentity,
    model_name: &str,
    settings: &AppMetadataSettings,
) -> FieldPermissionSet {
    if user.is_superuser() {
        return FieldPermissionSet::unrestricted();
    }
    let Some(profiles) = settings.profiles.as_ref() else {
        return FieldPermissionSet::unrestricted();
    };
    let Some(profile) = assigned_profile(user).and_then(|name| profiles.get(name)) else {
        return FieldPermissionSet::unrestricted();
    };

    let view_all_fields = profile
        .model_permissions
        .get(model_name)
        .is_some_and(|m| m.view_all_fields);
    if profile.field_permissions.is_empty() {
        return FieldPermissionSet { view_all_fields, ..FieldPermissionSet::unrestricted() };
    }

    let prefix = format!("{model_name}.");
    let fields = profile
        .field_permissions
        .iter()
        .filter_map(|(key, access)| {
            key.strip_prefix(&prefix)
                .map(|field| (field.to_string(), *access))
        })
        .collect();
    FieldPermissionSet { fields, has_config: true, view_all_fields }
}

pub fn check_field_readable(
    user: &UserIdentity,
    model_name: &str,
    field_name: &str,
    settings: &AppMetadataSettings,
) -> bool {
    get_user_field_permissions(user, model_name, settings).readable(field_name)
}

/// `view_all_fields` never grants editing; only an explicit entry does.
pub fn check_field_editable(
    user: &UserIdentity,
    model_name: &str,
    field_name: &str,
    settings: &AppMetadataSettings,
) -> bool {
    get_user_field_permissions(user, model_name, settings).editable(field_name)
}
