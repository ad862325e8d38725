use notion_core::{DecodeError, FieldReader, ObjectWriter, Record, WireEnum};
use serde_json::Value;

notion_core::wire_enum! {
    pub enum Direction("sort direction") {
        Ascending => "ascending",
        Descending => "descending",
    }
}

notion_core::wire_enum! {
    /// Page timestamps a query can sort by.
    pub enum TimestampKind("timestamp kind") {
        CreatedTime => "created_time",
        LastEditedTime => "last_edited_time",
    }
}

/// What a sort orders by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Property(String),
    Timestamp(TimestampKind),
}

/// One entry of a query's `sorts` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub direction: Direction,
}

impl Sort {
    pub fn property(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            key: SortKey::Property(name.into()),
            direction,
        }
    }

    pub fn timestamp(kind: TimestampKind, direction: Direction) -> Self {
        Self {
            key: SortKey::Timestamp(kind),
            direction,
        }
    }
}

impl Record for Sort {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        let key = match (r.optional_str("property")?, r.optional_enum("timestamp")?) {
            (Some(name), None) => SortKey::Property(name),
            (None, Some(kind)) => SortKey::Timestamp(kind),
            (Some(_), Some(_)) => {
                return Err(DecodeError::invariant(
                    "sort",
                    "property and timestamp are mutually exclusive",
                ))
            }
            (None, None) => {
                return Err(DecodeError::invariant(
                    "sort",
                    "property or timestamp is required",
                ))
            }
        };
        Ok(Self {
            key,
            direction: r.required_enum("direction")?,
        })
    }

    fn encode(&self) -> Value {
        let w = match &self.key {
            SortKey::Property(name) => ObjectWriter::new().put("property", name.clone()),
            SortKey::Timestamp(kind) => ObjectWriter::new().put("timestamp", kind.as_str()),
        };
        w.put("direction", self.direction.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_sort() {
        let sort = Sort::property("Due", Direction::Ascending);
        let tree = json!({"property": "Due", "direction": "ascending"});
        assert_eq!(sort.encode(), tree);
        assert_eq!(Sort::decode(&tree).unwrap(), sort);
    }

    #[test]
    fn test_timestamp_sort() {
        let tree = json!({"timestamp": "last_edited_time", "direction": "descending"});
        assert_eq!(
            Sort::decode(&tree).unwrap(),
            Sort::timestamp(TimestampKind::LastEditedTime, Direction::Descending)
        );
    }

    #[test]
    fn test_sort_needs_exactly_one_key() {
        let err = Sort::decode(&json!({"direction": "ascending"})).unwrap_err();
        assert_eq!(err, DecodeError::invariant("sort", "property or timestamp is required"));

        let err = Sort::decode(&json!({"property": "A", "timestamp": "created_time", "direction": "ascending"}))
            .unwrap_err();
        assert_eq!(err.kind(), "invariant_violation");
    }

    #[test]
    fn test_direction_spelling() {
        let err = Sort::decode(&json!({"property": "A", "direction": "asc"})).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("direction", "sort direction", "\"asc\""));
    }
}
