//!
//! Template filter surface.
//!
//! Exposes the membership predicate to a presentation layer as a named filter,
//! so templates can write `user|has_group:"editors"` inside a conditional.
//! The library is an ordinary value handed to whatever renderer the host uses;
//! nothing is registered globally.

use std::collections::{BTreeMap, HashMap};

use crate::access::has_group;
use crate::error::TemplateError;
use crate::primitives::UserIdentity;
use crate::store::MembershipStore;

/// Signature shared by every boolean filter: `subject|filter:"argument"`.
pub type FilterFn = fn(&dyn MembershipStore, &UserIdentity, &str) -> bool;

/// Variables visible to an expression, keyed by name (e.g. `"user"`).
pub type Bindings = HashMap<String, UserIdentity>;

/// Name under which the membership predicate is registered.
pub const HAS_GROUP: &str = "has_group";

fn has_group_filter(store: &dyn MembershipStore, user: &UserIdentity, group_name: &str) -> bool {
    has_group(store, user, group_name)
}

/// A set of named filters.
#[derive(Clone, Default)]
pub struct FilterLibrary {
    filters: BTreeMap<String, FilterFn>,
}

impl std::fmt::Debug for FilterLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.filters.keys()).finish()
    }
}

impl FilterLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// The role filters: currently just `has_group`.
    pub fn roles() -> Self {
        let mut library = Self::new();
        library.register(HAS_GROUP, has_group_filter);
        library
    }

    /// Registers `filter` under `name`, replacing any previous filter with that name.
    pub fn register(&mut self, name: impl Into<String>, filter: FilterFn) -> Option<FilterFn> {
        let name = name.into();
        tracing::debug!(filter = %name, "registering template filter");
        self.filters.insert(name, filter)
    }

    pub fn get(&self, name: &str) -> Option<FilterFn> {
        self.filters.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }
}

/// A parsed `subject|filter:"argument"` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub subject: String,
    pub filter: String,
    pub argument: String,
}

fn is_identifier(s: &str, allow_dots: bool) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || (allow_dots && c == '.'))
}

fn unquote(raw: &str) -> Option<&str> {
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
    if inner.contains(quote) {
        return None;
    }
    Some(inner)
}

impl FilterExpr {
    /// Parses an expression such as `user|has_group:"editors"`.
    ///
    /// The subject may be a dotted lookup (`request.user`); the argument must be
    /// a single- or double-quoted string literal.
    pub fn parse(input: &str) -> Result<Self, TemplateError> {
        let (subject, rest) = input
            .split_once('|')
            .ok_or_else(|| TemplateError::Syntax(format!("expected '|' in {input:?}")))?;
        let subject = subject.trim();
        if !is_identifier(subject, true) {
            return Err(TemplateError::Syntax(format!("invalid variable {subject:?}")));
        }

        let (filter, argument) = rest
            .split_once(':')
            .ok_or_else(|| TemplateError::Syntax(format!("filter in {input:?} requires an argument")))?;
        let filter = filter.trim();
        if !is_identifier(filter, false) {
            return Err(TemplateError::Syntax(format!("invalid filter name {filter:?}")));
        }

        let argument = unquote(argument.trim())
            .ok_or_else(|| TemplateError::Syntax(format!("argument must be a quoted string: {argument:?}")))?;

        Ok(FilterExpr {
            subject: subject.to_string(),
            filter: filter.to_string(),
            argument: argument.to_string(),
        })
    }

    /// Resolves the filter and subject, then applies the filter.
    pub fn evaluate(
        &self,
        library: &FilterLibrary,
        store: &dyn MembershipStore,
        bindings: &Bindings,
    ) -> Result<bool, TemplateError> {
        let filter = library
            .get(&self.filter)
            .ok_or_else(|| TemplateError::UnknownFilter(self.filter.clone()))?;
        let user = bindings
            .get(&self.subject)
            .ok_or_else(|| TemplateError::UnboundVariable(self.subject.clone()))?;
        Ok(filter(store, user, &self.argument))
    }
}

impl std::str::FromStr for FilterExpr {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterExpr::parse(s)
    }
}

impl std::fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quote = if self.argument.contains('"') { '\'' } else { '"' };
        write!(f, "{}|{}:{quote}{}{quote}", self.subject, self.filter, self.argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::MembershipEdge;
    use crate::store::InMemoryMembershipStore;
    use crate::types::UserId;

    fn setup() -> (InMemoryMembershipStore, Bindings) {
        let alice = UserIdentity::authenticated(UserId::new_v4(), "alice");
        let store = InMemoryMembershipStore::from_edges([MembershipEdge {
            user: alice.id,
            group: "editors".to_string(),
        }]);
        let mut bindings = Bindings::new();
        bindings.insert("user".to_string(), alice);
        bindings.insert("guest".to_string(), UserIdentity::anonymous());
        (store, bindings)
    }

    #[test]
    fn test_parse_basic() {
        let expr = FilterExpr::parse(r#"user|has_group:"editors""#).unwrap();
        assert_eq!(expr.subject, "user");
        assert_eq!(expr.filter, "has_group");
        assert_eq!(expr.argument, "editors");
        assert_eq!(expr.to_string(), r#"user|has_group:"editors""#);
    }

    #[test]
    fn test_parse_single_quotes_dotted_and_whitespace() {
        let expr: FilterExpr = " request.user | has_group : 'Sales Team' ".parse().unwrap();
        assert_eq!(expr.subject, "request.user");
        assert_eq!(expr.argument, "Sales Team");
    }

    #[test]
    fn test_display_reparses_embedded_quotes() {
        let expr = FilterExpr::parse(r#"user|has_group:'say "hi"'"#).unwrap();
        assert_eq!(expr.argument, r#"say "hi""#);
        assert_eq!(expr.to_string(), r#"user|has_group:'say "hi"'"#);
        assert_eq!(FilterExpr::parse(&expr.to_string()), Ok(expr));

        let expr = FilterExpr::parse(r#"user|has_group:"it's""#).unwrap();
        assert_eq!(expr.to_string(), r#"user|has_group:"it's""#);
        assert_eq!(FilterExpr::parse(&expr.to_string()), Ok(expr));
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "user",
            "user|has_group",
            "user|has_group:editors",
            r#"user|has_group:"editors'"#,
            r#"|has_group:"editors""#,
            r#"1user|has_group:"editors""#,
            r#"user|has-group:"editors""#,
            r#"user|has_group:"a"b""#,
        ] {
            assert!(
                matches!(FilterExpr::parse(bad), Err(TemplateError::Syntax(_))),
                "expected syntax error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_evaluate() {
        let (store, bindings) = setup();
        let library = FilterLibrary::roles();
        let eval = |src: &str| FilterExpr::parse(src).unwrap().evaluate(&library, &store, &bindings);

        assert_eq!(eval(r#"user|has_group:"editors""#), Ok(true));
        assert_eq!(eval(r#"user|has_group:"admins""#), Ok(false));
        assert_eq!(eval(r#"user|has_group:"""#), Ok(false));
        assert_eq!(eval(r#"guest|has_group:"editors""#), Ok(false));
        assert_eq!(
            eval(r#"nobody|has_group:"editors""#),
            Err(TemplateError::UnboundVariable("nobody".to_string()))
        );
        assert_eq!(
            eval(r#"user|in_group:"editors""#),
            Err(TemplateError::UnknownFilter("in_group".to_string()))
        );
    }

    #[test]
    fn test_register_replaces() {
        fn always(_: &dyn MembershipStore, _: &UserIdentity, _: &str) -> bool {
            true
        }
        let mut library = FilterLibrary::roles();
        assert!(library.register(HAS_GROUP, always).is_some());
        assert_eq!(library.names().collect::<Vec<_>>(), vec![HAS_GROUP]);

        let (store, bindings) = setup();
        let expr = FilterExpr::parse(r#"guest|has_group:"anything""#).unwrap();
        assert_eq!(expr.evaluate(&library, &store, &bindings), Ok(true));
    }
}
