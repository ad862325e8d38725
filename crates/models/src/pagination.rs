//! The `{"object": "list", ...}` envelope of paginated endpoints.
//!
//! Only one page of results is modeled; following `next_cursor` is the
//! caller's job.

use notion_core::codec::{index_path, Absent};
use notion_core::invariant::require_any_when;
use notion_core::{DecodeError, FieldReader, Object, ObjectWriter, Record, WireEnum};
use serde_json::Value;

notion_core::wire_enum! {
    /// What the `results` of a list hold.
    pub enum ListType("list type") {
        Block => "block",
        Comment => "comment",
        Database => "database",
        Page => "page",
        PageOrDatabase => "page_or_database",
        PropertyItem => "property_item",
        User => "user",
    }
}

/// One page of results. Built with [`PaginatedList::complete`] or
/// [`PaginatedList::partial`], or decoded; either way a list that has
/// more results carries the cursor to fetch them.
///
/// ```compile_fail
/// use notion_models::{ListType, PaginatedList, PartialUser};
///
/// let list: PaginatedList<PartialUser> = PaginatedList {
///     list_type: ListType::User,
///     results: Vec::new(),
///     next_cursor: None,
///     has_more: true,
///     type_data: Default::default(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedList<T> {
    list_type: ListType,
    results: Vec<T>,
    next_cursor: Option<String>,
    has_more: bool,
    /// The object under the key named after `list_type`, kept as sent.
    type_data: Object,
}

impl<T> PaginatedList<T> {
    /// A last (or only) page: no cursor, nothing more to fetch.
    pub fn complete(list_type: ListType, results: Vec<T>) -> Self {
        Self {
            list_type,
            results,
            next_cursor: None,
            has_more: false,
            type_data: Object::new(),
        }
    }

    /// A page followed by more results starting at `cursor`.
    pub fn partial(list_type: ListType, results: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            next_cursor: Some(cursor.into()),
            has_more: true,
            ..Self::complete(list_type, results)
        }
    }

    pub fn list_type(&self) -> ListType {
        self.list_type
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn type_data(&self) -> &Object {
        &self.type_data
    }

    fn cursor_present(&self) -> Result<(), String> {
        require_any_when(
            self.has_more,
            "has_more is true",
            &[("next_cursor", self.next_cursor.is_some())],
        )
    }
}

impl<T: Record> Record for PaginatedList<T> {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        r.expect_literal("object", "list")?;
        let list_type: ListType = r.required_enum("type")?;
        let results = match r.get("results") {
            Some(Value::Array(items)) => {
                let base = r.field_path("results");
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| T::decode_at(item, &index_path(&base, i)))
                    .collect::<Result<Vec<_>, _>>()?
            }
            Some(other) => return Err(r.mismatch("results", "array", other)),
            None => Vec::new(),
        };
        let list = Self {
            list_type,
            results,
            next_cursor: r.optional_str("next_cursor")?,
            has_more: r.required_bool("has_more")?,
            type_data: r.raw_object(list_type.as_str())?,
        };
        list.cursor_present()
            .map_err(|reason| DecodeError::invariant("list", reason))?;
        Ok(list)
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put("object", "list")
            .put_list("results", &self.results, T::encode)
            .put_opt("next_cursor", self.next_cursor.clone(), Absent::Null)
            .put("has_more", self.has_more)
            .put("type", self.list_type.as_str())
            .put(self.list_type.as_str(), Value::Object(self.type_data.clone()))
            .finish()
    }
}
