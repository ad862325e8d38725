//! Canonical codec: structural conventions shared by every family.
//!
//! Inbound, [`FieldReader`] gives typed access to the fields of one JSON
//! object and tracks a dotted path so errors point at the offending field
//! (`rollup.function`, `status.options[2].name`). Absent fields and
//! explicit `null` both read as "not provided"; unknown fields are never
//! looked at, so API additions pass through silently.
//!
//! Outbound, [`ObjectWriter`] builds objects with an explicit per-field
//! [`Absent`] policy, and [`EncodeMode`] decides whether a tagged value
//! writes its own discriminator.

use std::fmt;

use serde_json::{Map, Number, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

use crate::error::DecodeError;

/// A JSON object as produced and consumed by the codec.
pub type Object = Map<String, Value>;

// ── Wire enums ──────────────────────────────────────────────────────

/// A closed set of string literals with a fixed wire spelling.
pub trait WireEnum: Sized + Copy + 'static {
    /// Every member, in declaration order.
    const ALL: &'static [Self];
    /// Human-readable name used in mismatch errors.
    const EXPECTED: &'static str;

    fn as_str(&self) -> &'static str;

    fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// Declares a fieldless enum together with its [`WireEnum`] spelling.
///
/// ```ignore
/// notion_core::wire_enum! {
///     /// Sort direction.
///     pub enum Direction("sort direction") {
///         Ascending => "ascending",
///         Descending => "descending",
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($label:literal) {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::codec::WireEnum for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const EXPECTED: &'static str = $label;

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::codec::WireEnum::as_str(self))
            }
        }
    };
}

// ── Scalars ─────────────────────────────────────────────────────────

/// An RFC 3339 instant whose canonical text is fixed at construction, so
/// encoding never fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Timestamp {
    at: OffsetDateTime,
    text: String,
}

impl Timestamp {
    pub fn parse(text: &str) -> Option<Self> {
        let at = OffsetDateTime::parse(text, &Rfc3339).ok()?;
        Self::from_datetime(at)
    }

    /// Returns `None` for instants RFC 3339 cannot express (years past 9999,
    /// offsets with a seconds component).
    pub fn from_datetime(at: OffsetDateTime) -> Option<Self> {
        let text = at.format(&Rfc3339).ok()?;
        Some(Self { at, text })
    }

    pub fn datetime(&self) -> OffsetDateTime {
        self.at
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Parses an absolute `http`/`https` URL.
pub fn parse_http_url(text: &str) -> Option<Url> {
    let url = Url::parse(text).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

// ── Diagnostics helpers ─────────────────────────────────────────────

pub fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Describes a found value for mismatch errors: strings are quoted
/// verbatim, everything else is named by its JSON kind.
pub fn describe(v: &Value) -> String {
    match v {
        Value::String(s) => format!("{:?}", s),
        other => kind_of(other).to_owned(),
    }
}

pub fn join_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_owned()
    } else {
        format!("{}.{}", parent, field)
    }
}

pub fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "$"
    } else {
        path
    }
}

// ── Reading ─────────────────────────────────────────────────────────

/// Typed, path-aware access to the fields of one JSON object.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    obj: &'a Object,
    path: String,
}

impl<'a> FieldReader<'a> {
    /// Wraps `tree`, which must be a JSON object.
    pub fn new(tree: &'a Value, path: impl Into<String>) -> Result<Self, DecodeError> {
        let path = path.into();
        match tree {
            Value::Object(obj) => Ok(Self { obj, path }),
            other => Err(DecodeError::mismatch(
                display_path(&path),
                "object",
                describe(other),
            )),
        }
    }

    pub fn root(tree: &'a Value) -> Result<Self, DecodeError> {
        Self::new(tree, "")
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn object(&self) -> &'a Object {
        self.obj
    }

    pub fn field_path(&self, field: &str) -> String {
        join_path(&self.path, field)
    }

    /// The field's value, treating explicit `null` as absent.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.obj.get(field).filter(|v| !v.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.obj.keys().map(String::as_str)
    }

    pub fn mismatch(&self, field: &str, expected: &str, found: &Value) -> DecodeError {
        DecodeError::mismatch(self.field_path(field), expected, describe(found))
    }

    fn missing(&self, field: &str, expected: &str) -> DecodeError {
        DecodeError::mismatch(self.field_path(field), expected, "missing")
    }

    pub fn optional_str(&self, field: &str) -> Result<Option<String>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(field, "string", other)),
        }
    }

    pub fn required_str(&self, field: &str) -> Result<String, DecodeError> {
        self.optional_str(field)?
            .ok_or_else(|| self.missing(field, "string"))
    }

    pub fn optional_bool(&self, field: &str) -> Result<Option<bool>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(field, "boolean", other)),
        }
    }

    pub fn required_bool(&self, field: &str) -> Result<bool, DecodeError> {
        self.optional_bool(field)?
            .ok_or_else(|| self.missing(field, "boolean"))
    }

    pub fn optional_number(&self, field: &str) -> Result<Option<Number>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(other) => Err(self.mismatch(field, "number", other)),
        }
    }

    pub fn required_number(&self, field: &str) -> Result<Number, DecodeError> {
        self.optional_number(field)?
            .ok_or_else(|| self.missing(field, "number"))
    }

    /// Reads a string field and converts it with `parse`; a string that
    /// `parse` rejects is reported as a mismatch against `expected`.
    pub fn optional_parsed<T>(
        &self,
        field: &str,
        expected: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .and_then(parse)
                .map(Some)
                .ok_or_else(|| self.mismatch(field, expected, value)),
        }
    }

    pub fn required_parsed<T>(
        &self,
        field: &str,
        expected: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, DecodeError> {
        self.optional_parsed(field, expected, parse)?
            .ok_or_else(|| self.missing(field, expected))
    }

    pub fn optional_uuid(&self, field: &str) -> Result<Option<Uuid>, DecodeError> {
        self.optional_parsed(field, "uuid", |s| Uuid::parse_str(s).ok())
    }

    pub fn required_uuid(&self, field: &str) -> Result<Uuid, DecodeError> {
        self.required_parsed(field, "uuid", |s| Uuid::parse_str(s).ok())
    }

    pub fn required_url(&self, field: &str) -> Result<Url, DecodeError> {
        self.required_parsed(field, "http(s) url", parse_http_url)
    }

    pub fn optional_timestamp(&self, field: &str) -> Result<Option<Timestamp>, DecodeError> {
        self.optional_parsed(field, "RFC 3339 timestamp", Timestamp::parse)
    }

    pub fn required_timestamp(&self, field: &str) -> Result<Timestamp, DecodeError> {
        self.required_parsed(field, "RFC 3339 timestamp", Timestamp::parse)
    }

    pub fn optional_enum<E: WireEnum>(&self, field: &str) -> Result<Option<E>, DecodeError> {
        self.optional_parsed(field, E::EXPECTED, E::from_wire)
    }

    pub fn required_enum<E: WireEnum>(&self, field: &str) -> Result<E, DecodeError> {
        self.required_parsed(field, E::EXPECTED, E::from_wire)
    }

    /// A nested object field, read with its own extended path.
    pub fn nested(&self, field: &str) -> Result<Option<FieldReader<'a>>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => FieldReader::new(value, self.field_path(field)).map(Some),
        }
    }

    pub fn required_nested(&self, field: &str) -> Result<FieldReader<'a>, DecodeError> {
        self.nested(field)?
            .ok_or_else(|| self.missing(field, "object"))
    }

    /// An array field decoded item by item. `item` receives each element
    /// and its indexed path.
    pub fn optional_list<T>(
        &self,
        field: &str,
        mut item: impl FnMut(&'a Value, &str) -> Result<T, DecodeError>,
    ) -> Result<Option<Vec<T>>, DecodeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let base = self.field_path(field);
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| item(v, &index_path(&base, i)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Some)
            }
            Some(other) => Err(self.mismatch(field, "array", other)),
        }
    }

    /// Like [`optional_list`](Self::optional_list), with an absent field
    /// read as an empty list.
    pub fn list<T>(
        &self,
        field: &str,
        item: impl FnMut(&'a Value, &str) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        Ok(self.optional_list(field, item)?.unwrap_or_default())
    }

    /// A string list, e.g. option ids.
    pub fn optional_str_list(&self, field: &str) -> Result<Option<Vec<String>>, DecodeError> {
        self.optional_list(field, |v, path| match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(DecodeError::mismatch(path, "string", describe(other))),
        })
    }

    /// An object field kept as raw JSON; absent reads as empty.
    pub fn raw_object(&self, field: &str) -> Result<Object, DecodeError> {
        match self.get(field) {
            None => Ok(Object::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(self.mismatch(field, "object", other)),
        }
    }

    /// Requires `field` to hold exactly the string `literal`, e.g.
    /// `"object": "page"`.
    pub fn expect_literal(&self, field: &str, literal: &str) -> Result<(), DecodeError> {
        let expected = format!("{:?}", literal);
        match self.get(field) {
            Some(Value::String(s)) if s == literal => Ok(()),
            Some(other) => Err(self.mismatch(field, &expected, other)),
            None => Err(self.missing(field, &expected)),
        }
    }
}

// ── Writing ─────────────────────────────────────────────────────────

/// What to emit for an optional field that holds no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absent {
    /// Leave the key out.
    Omit,
    /// Write the key with `null`.
    Null,
}

/// Whether a tagged value writes its discriminator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeMode {
    #[default]
    WithDiscriminator,
    /// Used when the surrounding context already fixes the variant, e.g.
    /// property schemas keyed by name in a database request body.
    ExcludeDiscriminator,
}

/// Builds one JSON object field by field.
#[derive(Debug, Clone, Default)]
pub struct ObjectWriter {
    obj: Object,
}

impl ObjectWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.obj.insert(key.to_owned(), value.into());
        self
    }

    pub fn put_opt<T: Into<Value>>(mut self, key: &str, value: Option<T>, absent: Absent) -> Self {
        match (value, absent) {
            (Some(v), _) => {
                self.obj.insert(key.to_owned(), v.into());
            }
            (None, Absent::Null) => {
                self.obj.insert(key.to_owned(), Value::Null);
            }
            (None, Absent::Omit) => {}
        }
        self
    }

    pub fn put_list<T>(self, key: &str, items: &[T], encode: impl Fn(&T) -> Value) -> Self {
        let arr: Vec<Value> = items.iter().map(encode).collect();
        self.put(key, Value::Array(arr))
    }

    /// Copies every entry of `other` into this object.
    pub fn extend(mut self, other: Object) -> Self {
        self.obj.extend(other);
        self
    }

    pub fn into_object(self) -> Object {
        self.obj
    }

    pub fn finish(self) -> Value {
        Value::Object(self.obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    crate::wire_enum! {
        enum Shade("shade") {
            Light => "light",
            Dark => "dark_gray",
        }
    }

    #[test]
    fn test_reader_rejects_non_object() {
        let err = FieldReader::root(&json!([1, 2])).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("$", "object", "array"));
    }

    #[test]
    fn test_null_reads_as_absent() {
        let tree = json!({"name": null});
        let r = FieldReader::root(&tree).unwrap();
        assert_eq!(r.optional_str("name").unwrap(), None);
        assert!(!r.contains("name"));
    }

    #[test]
    fn test_mismatch_reports_nested_path() {
        let tree = json!({"rollup": {"function": 3}});
        let r = FieldReader::root(&tree).unwrap();
        let inner = r.required_nested("rollup").unwrap();
        let err = inner.required_str("function").unwrap_err();
        assert_eq!(err, DecodeError::mismatch("rollup.function", "string", "number"));
    }

    #[test]
    fn test_missing_required_field() {
        let tree = json!({});
        let r = FieldReader::root(&tree).unwrap();
        let err = r.required_url("url").unwrap_err();
        assert_eq!(err, DecodeError::mismatch("url", "http(s) url", "missing"));
    }

    #[test]
    fn test_url_scheme_restricted() {
        let tree = json!({"url": "ftp://x.test/a.png"});
        let r = FieldReader::root(&tree).unwrap();
        let err = r.required_url("url").unwrap_err();
        assert_eq!(
            err,
            DecodeError::mismatch("url", "http(s) url", "\"ftp://x.test/a.png\"")
        );
    }

    #[test]
    fn test_list_paths_are_indexed() {
        let tree = json!({"ids": ["a", 7]});
        let r = FieldReader::root(&tree).unwrap();
        let err = r.optional_str_list("ids").unwrap_err();
        assert_eq!(err, DecodeError::mismatch("ids[1]", "string", "number"));
    }

    #[test]
    fn test_wire_enum_spelling() {
        assert_eq!(Shade::from_wire("dark_gray"), Some(Shade::Dark));
        assert_eq!(Shade::from_wire("Dark"), None);
        assert_eq!(Shade::Light.to_string(), "light");
        assert_eq!(Shade::ALL.len(), 2);

        let tree = json!({"shade": "purple"});
        let r = FieldReader::root(&tree).unwrap();
        let err = r.required_enum::<Shade>("shade").unwrap_err();
        assert_eq!(err, DecodeError::mismatch("shade", "shade", "\"purple\""));
    }

    #[test]
    fn test_timestamp_canonical_text() {
        let ts = Timestamp::parse("2024-03-01T10:15:00.000Z").unwrap();
        assert_eq!(ts.as_str(), "2024-03-01T10:15:00Z");
        assert_eq!(Timestamp::parse(ts.as_str()), Some(ts));
        assert!(Timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_writer_absent_policies() {
        let none: Option<String> = None;
        let v = ObjectWriter::new()
            .put("a", 1)
            .put_opt("b", none.clone(), Absent::Null)
            .put_opt("c", none, Absent::Omit)
            .finish();
        assert_eq!(v, json!({"a": 1, "b": null}));
    }
}
