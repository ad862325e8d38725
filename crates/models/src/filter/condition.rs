//! Typed filter conditions: one operator from a per-kind table plus its
//! operand, e.g. `{"greater_than": 10}` or `{"past_week": {}}`.

use std::marker::PhantomData;

use notion_core::codec::{describe, Timestamp};
use notion_core::invariant::exactly_one;
use notion_core::{DecodeError, FieldReader, Invariant, ObjectWriter, Payload};
use serde_json::{Number, Value};
use time::macros::format_description;
use uuid::Uuid;

/// The JSON kind an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Bool,
    Number,
    Text,
    /// ISO 8601 date (`2024-03-01`) or RFC 3339 timestamp.
    Date,
    Uuid,
    /// The literal `true`, as in `{"is_empty": true}`.
    Flag,
    /// The empty object of relative date operators (`{"past_week": {}}`).
    Relative,
}

impl OperandKind {
    pub fn expected(self) -> &'static str {
        match self {
            OperandKind::Bool => "boolean",
            OperandKind::Number => "number",
            OperandKind::Text => "string",
            OperandKind::Date => "ISO 8601 date",
            OperandKind::Uuid => "uuid",
            OperandKind::Flag => "true",
            OperandKind::Relative => "empty object",
        }
    }

    fn read(self, v: &Value) -> Option<Operand> {
        match (self, v) {
            (OperandKind::Bool, Value::Bool(b)) => Some(Operand::Bool(*b)),
            (OperandKind::Number, Value::Number(n)) => Some(Operand::Number(n.clone())),
            (OperandKind::Text, Value::String(s)) => Some(Operand::Text(s.clone())),
            (OperandKind::Date, Value::String(s)) if is_iso_date(s) => {
                Some(Operand::Date(s.clone()))
            }
            (OperandKind::Uuid, Value::String(s)) => Uuid::parse_str(s).ok().map(Operand::Uuid),
            (OperandKind::Flag, Value::Bool(true)) => Some(Operand::Flag),
            (OperandKind::Relative, Value::Object(_)) => Some(Operand::Relative),
            _ => None,
        }
    }

    pub fn decode(self, v: &Value, path: &str) -> Result<Operand, DecodeError> {
        self.read(v)
            .ok_or_else(|| DecodeError::mismatch(path, self.expected(), describe(v)))
    }
}

fn is_iso_date(text: &str) -> bool {
    time::Date::parse(text, format_description!("[year]-[month]-[day]")).is_ok()
        || Timestamp::parse(text).is_some()
}

/// A decoded operand. Dates keep the caller's spelling so that a date-only
/// value is not widened to a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Bool(bool),
    Number(Number),
    Text(String),
    Date(String),
    Uuid(Uuid),
    Flag,
    Relative,
}

impl Operand {
    pub fn text(s: impl Into<String>) -> Self {
        Operand::Text(s.into())
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Operand::Number(n.into())
    }

    pub fn date(s: impl Into<String>) -> Self {
        Operand::Date(s.into())
    }

    pub fn to_value(&self) -> Value {
        match self {
            Operand::Bool(b) => Value::Bool(*b),
            Operand::Number(n) => Value::Number(n.clone()),
            Operand::Text(s) | Operand::Date(s) => Value::String(s.clone()),
            Operand::Uuid(id) => Value::String(id.hyphenated().to_string()),
            Operand::Flag => Value::Bool(true),
            Operand::Relative => Value::Object(Default::default()),
        }
    }
}

/// The operator table of one condition kind.
pub trait ConditionKind: 'static {
    const OPERATORS: &'static [(&'static str, OperandKind)];

    fn operator_names() -> Vec<&'static str> {
        Self::OPERATORS.iter().map(|(name, _)| *name).collect()
    }
}

const EMPTINESS: [(&str, OperandKind); 2] = [
    ("is_empty", OperandKind::Flag),
    ("is_not_empty", OperandKind::Flag),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxOps;

impl ConditionKind for CheckboxOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("equals", OperandKind::Bool),
        ("does_not_equal", OperandKind::Bool),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOps;

impl ConditionKind for DateOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("after", OperandKind::Date),
        ("before", OperandKind::Date),
        ("equals", OperandKind::Date),
        ("on_or_after", OperandKind::Date),
        ("on_or_before", OperandKind::Date),
        EMPTINESS[0],
        EMPTINESS[1],
        ("next_month", OperandKind::Relative),
        ("next_week", OperandKind::Relative),
        ("next_year", OperandKind::Relative),
        ("past_month", OperandKind::Relative),
        ("past_week", OperandKind::Relative),
        ("past_year", OperandKind::Relative),
        ("this_week", OperandKind::Relative),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilesOps;

impl ConditionKind for FilesOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &EMPTINESS;
}

/// People, `created_by`/`last_edited_by` and relation conditions all match
/// against ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdOps;

impl ConditionKind for IdOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("contains", OperandKind::Uuid),
        ("does_not_contain", OperandKind::Uuid),
        EMPTINESS[0],
        EMPTINESS[1],
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiSelectOps;

impl ConditionKind for MultiSelectOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("contains", OperandKind::Text),
        ("does_not_contain", OperandKind::Text),
        EMPTINESS[0],
        EMPTINESS[1],
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberOps;

impl ConditionKind for NumberOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("equals", OperandKind::Number),
        ("does_not_equal", OperandKind::Number),
        ("greater_than", OperandKind::Number),
        ("greater_than_or_equal_to", OperandKind::Number),
        ("less_than", OperandKind::Number),
        ("less_than_or_equal_to", OperandKind::Number),
        EMPTINESS[0],
        EMPTINESS[1],
    ];
}

/// Select and status conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOps;

impl ConditionKind for SelectOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("equals", OperandKind::Text),
        ("does_not_equal", OperandKind::Text),
        EMPTINESS[0],
        EMPTINESS[1],
    ];
}

/// Rich text, title, url, email and phone number conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOps;

impl ConditionKind for TextOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("contains", OperandKind::Text),
        ("does_not_contain", OperandKind::Text),
        ("does_not_equal", OperandKind::Text),
        ("ends_with", OperandKind::Text),
        ("equals", OperandKind::Text),
        ("starts_with", OperandKind::Text),
        EMPTINESS[0],
        EMPTINESS[1],
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueIdOps;

impl ConditionKind for UniqueIdOps {
    const OPERATORS: &'static [(&'static str, OperandKind)] = &[
        ("equals", OperandKind::Number),
        ("does_not_equal", OperandKind::Number),
        ("greater_than", OperandKind::Number),
        ("greater_than_or_equal_to", OperandKind::Number),
        ("less_than", OperandKind::Number),
        ("less_than_or_equal_to", OperandKind::Number),
    ];
}

/// A condition of kind `K`. Decoding collects every operator of `K`'s
/// table that is present; the `single_operator` invariant then insists on
/// exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition<K> {
    clauses: Vec<(&'static str, Operand)>,
    kind: PhantomData<K>,
}

pub type CheckboxCondition = Condition<CheckboxOps>;
pub type DateCondition = Condition<DateOps>;
pub type FilesCondition = Condition<FilesOps>;
pub type IdCondition = Condition<IdOps>;
pub type MultiSelectCondition = Condition<MultiSelectOps>;
pub type NumberCondition = Condition<NumberOps>;
pub type SelectCondition = Condition<SelectOps>;
pub type TextCondition = Condition<TextOps>;
pub type UniqueIdCondition = Condition<UniqueIdOps>;

impl<K: ConditionKind> Condition<K> {
    /// The operator and its operand. Always `Some` for a value that went
    /// through decoding or a factory.
    pub fn clause(&self) -> Option<(&'static str, &Operand)> {
        self.clauses.first().map(|(op, operand)| (*op, operand))
    }

    fn single_operator(&self) -> Result<(), String> {
        let present: Vec<&str> = self.clauses.iter().map(|(op, _)| *op).collect();
        exactly_one("operator", &K::operator_names(), &present)
    }
}

impl<K: ConditionKind> Payload for Condition<K> {
    const INVARIANTS: &'static [Invariant<Self>] = &[Invariant {
        name: "single_operator",
        check: Self::single_operator,
    }];

    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        let mut clauses = Vec::new();
        for (op, kind) in K::OPERATORS {
            if let Some(v) = r.get(op) {
                clauses.push((*op, kind.decode(v, &r.field_path(op))?));
            }
        }
        Ok(Self {
            clauses,
            kind: PhantomData,
        })
    }

    fn encode(&self) -> Value {
        self.clauses
            .iter()
            .fold(ObjectWriter::new(), |w, (op, operand)| {
                w.put(op, operand.to_value())
            })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notion_core::invariant::enforce;
    use serde_json::json;

    #[test]
    fn test_number_condition() {
        let c = NumberCondition::decode(&json!({"greater_than": 10}), "number").unwrap();
        assert!(enforce("number", &c).is_ok());
        assert_eq!(c.clause(), Some(("greater_than", &Operand::number(10))));
        assert_eq!(c.encode(), json!({"greater_than": 10}));
    }

    #[test]
    fn test_operand_kind_checked_per_operator() {
        let err = NumberCondition::decode(&json!({"equals": "10"}), "number").unwrap_err();
        assert_eq!(err, DecodeError::mismatch("number.equals", "number", "\"10\""));

        let err = TextCondition::decode(&json!({"is_empty": false}), "title").unwrap_err();
        assert_eq!(err, DecodeError::mismatch("title.is_empty", "true", "boolean"));
    }

    #[test]
    fn test_exactly_one_operator() {
        let c = TextCondition::decode(&json!({"contains": "a", "ends_with": "b"}), "title").unwrap();
        let err = enforce("title", &c).unwrap_err();
        assert_eq!(
            err,
            DecodeError::invariant("title", "expected exactly one operator, found 2: contains, ends_with")
        );

        let c = CheckboxCondition::decode(&json!({"contains": true}), "checkbox").unwrap();
        let err = enforce("checkbox", &c).unwrap_err();
        assert_eq!(
            err,
            DecodeError::invariant(
                "checkbox",
                "expected exactly one operator, found none (allowed: equals, does_not_equal)"
            )
        );
    }

    #[test]
    fn test_date_operands() {
        for operand in [json!("2024-03-01"), json!("2024-03-01T10:15:00+02:00")] {
            let c = DateCondition::decode(&json!({"on_or_after": operand}), "date").unwrap();
            assert_eq!(c.encode()["on_or_after"], operand);
        }
        let err = DateCondition::decode(&json!({"before": "March 1st"}), "date").unwrap_err();
        assert_eq!(
            err,
            DecodeError::mismatch("date.before", "ISO 8601 date", "\"March 1st\"")
        );

        let c = DateCondition::decode(&json!({"past_week": {}}), "date").unwrap();
        assert_eq!(c.clause(), Some(("past_week", &Operand::Relative)));
        assert_eq!(c.encode(), json!({"past_week": {}}));
    }

    #[test]
    fn test_people_condition_takes_uuid() {
        let id = "6794760a-1f15-45cd-9c65-0dfe42f5135a";
        let c = IdCondition::decode(&json!({"contains": id}), "people").unwrap();
        assert_eq!(c.encode(), json!({"contains": id}));
        assert!(IdCondition::decode(&json!({"contains": "ada"}), "people").is_err());
    }
}
