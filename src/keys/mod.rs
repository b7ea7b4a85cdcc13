//! Deterministic cache key derivation.
//!
//! A cache key has the form `<prefix>:<scope>:<digest>` where `scope` is
//! `list` (paginated) or `all` (unpaginated) and `digest` is a SHA-256 over
//! the canonical serialization of every relevant field. Two equivalent query
//! specifications always derive the identical key; absent optional fields are
//! digested as an explicit null sentinel so presence itself is part of the
//! input.

mod digest;

use serde::Serialize;

use crate::query::PageRequest;

/// Scope segment of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    List,
    All,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::All => "all",
        }
    }
}

/// A single scalar field of a query specification, normalized for hashing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    /// Sentinel for an absent or blank optional field.
    Null,
    Text(String),
    Int(i64),
    Flag(bool),
}

impl Field {
    /// A required text field, kept verbatim.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// An optional text field; `None` and blank both collapse to the
    /// sentinel so `filter = {}` and `filter = {field: null}` derive the
    /// same key.
    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(text) if !text.trim().is_empty() => Self::Text(text.to_string()),
            _ => Self::Null,
        }
    }

    /// An optional text field that the underlying query matches
    /// case-insensitively: trimmed and lowercased before hashing so
    /// logically identical queries do not fragment the key space.
    pub fn opt_normalized(value: Option<&str>) -> Self {
        match value {
            Some(text) if !text.trim().is_empty() => Self::Text(text.trim().to_lowercase()),
            _ => Self::Null,
        }
    }

    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }

    pub fn opt_int(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }

    pub fn flag(value: bool) -> Self {
        Self::Flag(value)
    }

    pub fn opt_flag(value: Option<bool>) -> Self {
        value.map_or(Self::Null, Self::Flag)
    }
}

/// Ordered list of named fields feeding the key digest.
///
/// Construction order is the digest order; entity filters document their
/// field order once and always push in that order.
#[derive(Debug, Clone, Default)]
pub struct KeyFields {
    fields: Vec<(&'static str, Field)>,
}

impl KeyFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style append.
    pub fn field(mut self, name: &'static str, field: Field) -> Self {
        self.fields.push((name, field));
        self
    }

    pub fn push(&mut self, name: &'static str, field: Field) {
        self.fields.push((name, field));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn pairs(&self) -> &[(&'static str, Field)] {
        &self.fields
    }
}

/// Key derivation for one entity's cache namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityKeys {
    prefix: &'static str,
}

impl EntityKeys {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Derive the key for a paginated read. Pagination fields digest first,
    /// then the filter fields in their documented order.
    pub fn list_key(&self, page: &PageRequest, filter: &KeyFields) -> String {
        let mut fields = Vec::with_capacity(4 + filter.len());
        fields.push(("page", Field::int(i64::from(page.page))));
        fields.push(("size", Field::int(i64::from(page.size))));
        fields.push(("sort", Field::text(page.sort_by.clone())));
        fields.push(("dir", Field::text(page.sort_direction.as_str())));
        fields.extend_from_slice(filter.pairs());

        self.key(Scope::List, &fields)
    }

    /// Derive the key for an unpaginated read over the same filter shape.
    pub fn all_key(&self, filter: &KeyFields) -> String {
        self.key(Scope::All, filter.pairs())
    }

    /// Glob matching every key in this entity's namespace, both scopes.
    pub fn invalidation_pattern(&self) -> String {
        format!("{}:*", self.prefix)
    }

    fn key(&self, scope: Scope, fields: &[(&'static str, Field)]) -> String {
        format!(
            "{}:{}:{}",
            self.prefix,
            scope.as_str(),
            digest::digest_fields(fields)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;

    const CURRENCY: EntityKeys = EntityKeys::new("currency");

    fn page() -> PageRequest {
        PageRequest::new(0, 10, "name", SortDirection::Ascending)
    }

    #[test]
    fn equivalent_specifications_derive_identical_keys() {
        let first = KeyFields::new()
            .field("search", Field::opt_text(Some("usd")))
            .field("active", Field::opt_text(Some("1")));
        let second = KeyFields::new()
            .field("search", Field::opt_text(Some("usd")))
            .field("active", Field::opt_text(Some("1")));

        assert_eq!(CURRENCY.list_key(&page(), &first), CURRENCY.list_key(&page(), &second));
    }

    #[test]
    fn explicit_null_equals_omitted_field() {
        let explicit = KeyFields::new()
            .field("active", Field::opt_text(Some("1")))
            .field("search", Field::opt_text(None));
        let blank = KeyFields::new()
            .field("active", Field::opt_text(Some("1")))
            .field("search", Field::opt_text(Some("   ")));

        assert_eq!(CURRENCY.list_key(&page(), &explicit), CURRENCY.list_key(&page(), &blank));
    }

    #[test]
    fn presence_differs_from_absence() {
        let present = KeyFields::new().field("search", Field::opt_text(Some("usd")));
        let absent = KeyFields::new().field("search", Field::opt_text(None));

        assert_ne!(CURRENCY.list_key(&page(), &present), CURRENCY.list_key(&page(), &absent));
    }

    #[test]
    fn normalized_text_ignores_case_and_whitespace() {
        let upper = KeyFields::new().field("search", Field::opt_normalized(Some("  USD ")));
        let lower = KeyFields::new().field("search", Field::opt_normalized(Some("usd")));

        assert_eq!(CURRENCY.list_key(&page(), &upper), CURRENCY.list_key(&page(), &lower));
    }

    #[test]
    fn pagination_changes_the_key() {
        let filter = KeyFields::new().field("active", Field::opt_text(Some("1")));
        let other_page = PageRequest::new(1, 10, "name", SortDirection::Ascending);

        assert_ne!(
            CURRENCY.list_key(&page(), &filter),
            CURRENCY.list_key(&other_page, &filter)
        );
    }

    #[test]
    fn scopes_do_not_collide() {
        let filter = KeyFields::new().field("active", Field::opt_text(Some("1")));
        let list = CURRENCY.list_key(&page(), &filter);
        let all = CURRENCY.all_key(&filter);

        assert!(list.starts_with("currency:list:"));
        assert!(all.starts_with("currency:all:"));
        assert_ne!(list, all);
    }

    #[test]
    fn invalidation_pattern_covers_the_namespace() {
        assert_eq!(CURRENCY.invalidation_pattern(), "currency:*");
    }

    #[test]
    fn differing_values_produce_differing_digests() {
        let usd = KeyFields::new().field("search", Field::opt_text(Some("usd")));
        let eur = KeyFields::new().field("search", Field::opt_text(Some("eur")));

        assert_ne!(CURRENCY.all_key(&usd), CURRENCY.all_key(&eur));
    }
}
