//! Database query filters.
//!
//! ```json
//! {"and": [
//!     {"property": "Done", "checkbox": {"equals": false}},
//!     {"timestamp": "created_time", "created_time": {"past_week": {}}},
//!     {"or": [{"property": "Cost", "number": {"greater_than": 10}}]}
//! ]}
//! ```
//!
//! Property filters carry no `type`: the condition key names the property
//! type, so [`PropertyCondition`] is always read untagged.

mod condition;

pub use condition::{
    CheckboxCondition, CheckboxOps, Condition, ConditionKind, DateCondition, DateOps,
    FilesCondition, FilesOps, IdCondition, IdOps, MultiSelectCondition, MultiSelectOps,
    NumberCondition, NumberOps, Operand, OperandKind, SelectCondition, SelectOps, TextCondition,
    TextOps, UniqueIdCondition, UniqueIdOps,
};

use notion_core::codec::{index_path, EncodeMode};
use notion_core::invariant::{exactly_one, within_depth};
use notion_core::{
    construct, DecodeError, Family, FieldReader, Invariant, Object, ObjectWriter, Payload,
    PayloadShape, Polymorphic, Record,
};
use once_cell::sync::Lazy;
use serde_json::Value;

/// Compound filters may nest this many levels.
pub const MAX_FILTER_DEPTH: usize = 2;

/// Decodes `{operator: operand}` as variant `tag` of `V`, through the same
/// registry path as wire input.
fn build<V: Polymorphic>(tag: &str, operator: &str, operand: Operand) -> Result<V, DecodeError> {
    let payload = ObjectWriter::new().put(operator, operand.to_value()).finish();
    V::family().lookup(tag)?.decode_payload(Some(&payload), tag)
}

// ── Formula conditions ──────────────────────────────────────────────

/// Condition on a formula property, keyed by the formula's result type:
/// `{"formula": {"number": {"greater_than": 3}}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaCondition {
    String(TextCondition),
    Checkbox(CheckboxCondition),
    Number(NumberCondition),
    Date(DateCondition),
}

static FORMULA_CONDITIONS: Lazy<Family<FormulaCondition>> = Lazy::new(|| {
    Family::builder("formula condition", "type")
        .variant("string", FormulaCondition::String)
        .variant("checkbox", FormulaCondition::Checkbox)
        .variant("number", FormulaCondition::Number)
        .variant("date", FormulaCondition::Date)
        .build()
});

impl Polymorphic for FormulaCondition {
    fn family() -> &'static Family<Self> {
        &FORMULA_CONDITIONS
    }

    fn tag(&self) -> &'static str {
        match self {
            FormulaCondition::String(_) => "string",
            FormulaCondition::Checkbox(_) => "checkbox",
            FormulaCondition::Number(_) => "number",
            FormulaCondition::Date(_) => "date",
        }
    }

    fn encode_payload(&self) -> Value {
        match self {
            FormulaCondition::String(c) => c.encode(),
            FormulaCondition::Checkbox(c) => c.encode(),
            FormulaCondition::Number(c) => c.encode(),
            FormulaCondition::Date(c) => c.encode(),
        }
    }
}

impl Payload for FormulaCondition {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        Self::decode_untagged(&FieldReader::new(tree, path)?)
    }

    fn encode(&self) -> Value {
        self.encode_with(EncodeMode::ExcludeDiscriminator)
    }
}

impl FormulaCondition {
    /// `result_type` is one of `string`, `checkbox`, `number`, `date`.
    pub fn new(result_type: &str, operator: &str, operand: Operand) -> Result<Self, DecodeError> {
        build(result_type, operator, operand)
    }
}

// ── Property conditions ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyCondition {
    Checkbox(CheckboxCondition),
    Date(DateCondition),
    Email(TextCondition),
    Files(FilesCondition),
    Formula(FormulaCondition),
    MultiSelect(MultiSelectCondition),
    Number(NumberCondition),
    People(IdCondition),
    PhoneNumber(TextCondition),
    Relation(IdCondition),
    RichText(TextCondition),
    Select(SelectCondition),
    Status(SelectCondition),
    Title(TextCondition),
    UniqueId(UniqueIdCondition),
    Url(TextCondition),
    CreatedBy(IdCondition),
    LastEditedBy(IdCondition),
    CreatedTime(DateCondition),
    LastEditedTime(DateCondition),
}

static PROPERTY_CONDITIONS: Lazy<Family<PropertyCondition>> = Lazy::new(|| {
    Family::builder("property filter", "type")
        .variant("checkbox", PropertyCondition::Checkbox)
        .variant("date", PropertyCondition::Date)
        .variant("email", PropertyCondition::Email)
        .variant("files", PropertyCondition::Files)
        .variant("formula", PropertyCondition::Formula)
        .variant("multi_select", PropertyCondition::MultiSelect)
        .variant("number", PropertyCondition::Number)
        .variant("people", PropertyCondition::People)
        .variant("phone_number", PropertyCondition::PhoneNumber)
        .variant("relation", PropertyCondition::Relation)
        .variant("rich_text", PropertyCondition::RichText)
        .variant("select", PropertyCondition::Select)
        .variant("status", PropertyCondition::Status)
        .variant("title", PropertyCondition::Title)
        .variant("unique_id", PropertyCondition::UniqueId)
        .variant("url", PropertyCondition::Url)
        .variant("created_by", PropertyCondition::CreatedBy)
        .variant("last_edited_by", PropertyCondition::LastEditedBy)
        .variant("created_time", PropertyCondition::CreatedTime)
        .variant("last_edited_time", PropertyCondition::LastEditedTime)
        .build()
});

impl Polymorphic for PropertyCondition {
    fn family() -> &'static Family<Self> {
        &PROPERTY_CONDITIONS
    }

    fn tag(&self) -> &'static str {
        match self {
            PropertyCondition::Checkbox(_) => "checkbox",
            PropertyCondition::Date(_) => "date",
            PropertyCondition::Email(_) => "email",
            PropertyCondition::Files(_) => "files",
            PropertyCondition::Formula(_) => "formula",
            PropertyCondition::MultiSelect(_) => "multi_select",
            PropertyCondition::Number(_) => "number",
            PropertyCondition::People(_) => "people",
            PropertyCondition::PhoneNumber(_) => "phone_number",
            PropertyCondition::Relation(_) => "relation",
            PropertyCondition::RichText(_) => "rich_text",
            PropertyCondition::Select(_) => "select",
            PropertyCondition::Status(_) => "status",
            PropertyCondition::Title(_) => "title",
            PropertyCondition::UniqueId(_) => "unique_id",
            PropertyCondition::Url(_) => "url",
            PropertyCondition::CreatedBy(_) => "created_by",
            PropertyCondition::LastEditedBy(_) => "last_edited_by",
            PropertyCondition::CreatedTime(_) => "created_time",
            PropertyCondition::LastEditedTime(_) => "last_edited_time",
        }
    }

    fn encode_payload(&self) -> Value {
        match self {
            PropertyCondition::Checkbox(c) => c.encode(),
            PropertyCondition::Date(c)
            | PropertyCondition::CreatedTime(c)
            | PropertyCondition::LastEditedTime(c) => c.encode(),
            PropertyCondition::Email(c)
            | PropertyCondition::PhoneNumber(c)
            | PropertyCondition::RichText(c)
            | PropertyCondition::Title(c)
            | PropertyCondition::Url(c) => c.encode(),
            PropertyCondition::Files(c) => c.encode(),
            PropertyCondition::Formula(c) => Payload::encode(c),
            PropertyCondition::MultiSelect(c) => c.encode(),
            PropertyCondition::Number(c) => c.encode(),
            PropertyCondition::People(c)
            | PropertyCondition::Relation(c)
            | PropertyCondition::CreatedBy(c)
            | PropertyCondition::LastEditedBy(c) => c.encode(),
            PropertyCondition::Select(c) | PropertyCondition::Status(c) => c.encode(),
            PropertyCondition::UniqueId(c) => c.encode(),
        }
    }
}

impl PropertyCondition {
    /// Builds the condition `{property_type: {operator: operand}}`.
    ///
    /// Fails like decoding would: unknown `property_type`, an operand of
    /// the wrong kind, or an operator outside the type's table.
    pub fn new(property_type: &str, operator: &str, operand: Operand) -> Result<Self, DecodeError> {
        build(property_type, operator, operand)
    }

    pub fn formula(condition: FormulaCondition) -> Self {
        PropertyCondition::Formula(condition)
    }
}

/// A condition on one named property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub property: String,
    pub condition: PropertyCondition,
}

impl PropertyFilter {
    pub fn new(property: impl Into<String>, condition: PropertyCondition) -> Self {
        Self {
            property: property.into(),
            condition,
        }
    }
}

impl Record for PropertyFilter {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            property: r.required_str("property")?,
            condition: PropertyCondition::decode_untagged(&r)?,
        })
    }

    fn encode(&self) -> Value {
        let mut out = ObjectWriter::new()
            .put("property", self.property.clone())
            .into_object();
        self.condition
            .write_into(&mut out, EncodeMode::ExcludeDiscriminator);
        Value::Object(out)
    }
}

// ── Timestamp filters ───────────────────────────────────────────────

/// A date condition on the page's own timestamps rather than on a
/// property: `{"timestamp": "created_time", "created_time": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampFilter {
    CreatedTime(DateCondition),
    LastEditedTime(DateCondition),
}

static TIMESTAMP_FILTERS: Lazy<Family<TimestampFilter>> = Lazy::new(|| {
    Family::builder("timestamp filter", "timestamp")
        .variant("created_time", TimestampFilter::CreatedTime)
        .variant("last_edited_time", TimestampFilter::LastEditedTime)
        .build()
});

impl Polymorphic for TimestampFilter {
    fn family() -> &'static Family<Self> {
        &TIMESTAMP_FILTERS
    }

    fn tag(&self) -> &'static str {
        match self {
            TimestampFilter::CreatedTime(_) => "created_time",
            TimestampFilter::LastEditedTime(_) => "last_edited_time",
        }
    }

    fn encode_payload(&self) -> Value {
        match self {
            TimestampFilter::CreatedTime(c) | TimestampFilter::LastEditedTime(c) => c.encode(),
        }
    }
}

impl TimestampFilter {
    pub fn created_time(operator: &str, operand: Operand) -> Result<Self, DecodeError> {
        build("created_time", operator, operand)
    }

    pub fn last_edited_time(operator: &str, operand: Operand) -> Result<Self, DecodeError> {
        build("last_edited_time", operator, operand)
    }
}

// ── Compound filters ────────────────────────────────────────────────

/// The operands of an `and`/`or` filter. Groups are only obtained from
/// [`Filter::and`], [`Filter::or`] or decoding, all of which check the
/// nesting limit:
///
/// ```compile_fail
/// use notion_models::{Filter, FilterGroup};
///
/// let deep = Filter::Or(FilterGroup(Vec::new()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup(Vec<Filter>);

impl FilterGroup {
    pub fn filters(&self) -> &[Filter] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.0.iter()
    }

    /// Levels of compound nesting, counting this group.
    pub fn depth(&self) -> usize {
        1 + self.0.iter().map(Filter::depth).max().unwrap_or(0)
    }

    fn nesting_limit(&self) -> Result<(), String> {
        within_depth("compound filter", self.depth(), MAX_FILTER_DEPTH)
    }
}

impl Payload for FilterGroup {
    const SHAPE: PayloadShape = PayloadShape::List;
    const INVARIANTS: &'static [Invariant<Self>] = &[Invariant {
        name: "nesting_limit",
        check: Self::nesting_limit,
    }];

    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        match tree {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| Filter::decode_at(item, &index_path(path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(FilterGroup),
            other => Err(DecodeError::mismatch(
                path,
                "array",
                notion_core::codec::describe(other),
            )),
        }
    }

    fn encode(&self) -> Value {
        Value::Array(self.0.iter().map(Filter::encode).collect())
    }
}

/// A query filter: a single condition or a compound of filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Property(PropertyFilter),
    Timestamp(TimestampFilter),
    And(FilterGroup),
    Or(FilterGroup),
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Result<Self, DecodeError> {
        construct("and", FilterGroup(filters), Filter::And)
    }

    pub fn or(filters: Vec<Filter>) -> Result<Self, DecodeError> {
        construct("or", FilterGroup(filters), Filter::Or)
    }

    pub fn depth(&self) -> usize {
        match self {
            Filter::Property(_) | Filter::Timestamp(_) => 0,
            Filter::And(group) | Filter::Or(group) => group.depth(),
        }
    }

    fn decode_group(
        r: &FieldReader<'_>,
        key: &'static str,
        wrap: fn(FilterGroup) -> Filter,
    ) -> Result<Self, DecodeError> {
        let tree = r.get(key).unwrap_or(&Value::Null);
        let group = FilterGroup::decode(tree, &r.field_path(key))?;
        construct(key, group, wrap)
    }
}

impl From<PropertyFilter> for Filter {
    fn from(f: PropertyFilter) -> Self {
        Filter::Property(f)
    }
}

impl From<TimestampFilter> for Filter {
    fn from(f: TimestampFilter) -> Self {
        Filter::Timestamp(f)
    }
}

impl Record for Filter {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        let compound: Vec<&str> = ["and", "or"]
            .into_iter()
            .filter(|key| r.contains(key))
            .collect();
        if !compound.is_empty() {
            exactly_one("compound operator", &["and", "or"], &compound)
                .map_err(|reason| DecodeError::invariant("filter", reason))?;
        }

        match compound.first() {
            Some(&"and") => Self::decode_group(&r, "and", Filter::And),
            Some(_) => Self::decode_group(&r, "or", Filter::Or),
            None if r.contains("timestamp") => TimestampFilter::decode_from(&r).map(Filter::Timestamp),
            None => PropertyFilter::decode_at(tree, path).map(Filter::Property),
        }
    }

    fn encode(&self) -> Value {
        match self {
            Filter::Property(f) => f.encode(),
            Filter::Timestamp(f) => f.encode(),
            Filter::And(group) => {
                let mut out = Object::new();
                out.insert("and".to_owned(), group.encode());
                Value::Object(out)
            }
            Filter::Or(group) => {
                let mut out = Object::new();
                out.insert("or".to_owned(), group.encode());
                Value::Object(out)
            }
        }
    }
}
