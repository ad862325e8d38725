//! Options of `select`/`multi_select`/`status` properties and the groups
//! status options are sorted into.

use notion_core::codec::Absent;
use notion_core::{DecodeError, FieldReader, ObjectWriter};
use serde_json::Value;

use crate::common::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<Color>,
    pub description: Option<String>,
}

impl SelectOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
            description: None,
        }
    }

    pub fn colored(name: impl Into<String>, color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::new(name)
        }
    }

    pub(crate) fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            id: r.optional_str("id")?,
            name: r.required_str("name")?,
            color: r.optional_enum("color")?,
            description: r.optional_str("description")?,
        })
    }

    pub(crate) fn encode(&self) -> Value {
        ObjectWriter::new()
            .put_opt("id", self.id.clone(), Absent::Omit)
            .put("name", self.name.clone())
            .put_opt("color", self.color, Absent::Omit)
            .put_opt("description", self.description.clone(), Absent::Omit)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusOption {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Option<Color>,
}

impl StatusOption {
    pub(crate) fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            id: r.optional_str("id")?,
            name: r.optional_str("name")?,
            color: r.optional_enum("color")?,
        })
    }

    pub(crate) fn encode(&self) -> Value {
        ObjectWriter::new()
            .put_opt("id", self.id.clone(), Absent::Omit)
            .put_opt("name", self.name.clone(), Absent::Omit)
            .put_opt("color", self.color, Absent::Omit)
            .finish()
    }
}

/// A named bucket of status options (`To-do`, `In progress`, `Complete`).
///
/// `option_ids` is kept as the API sends it; it is not cross-checked
/// against the options of the same property while decoding. See
/// [`StatusConfig::unknown_group_option_ids`](super::StatusConfig::unknown_group_option_ids).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Option<Color>,
    pub option_ids: Option<Vec<String>>,
}

impl StatusGroup {
    pub(crate) fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            id: r.optional_str("id")?,
            name: r.optional_str("name")?,
            color: r.optional_enum("color")?,
            option_ids: r.optional_str_list("option_ids")?,
        })
    }

    pub(crate) fn encode(&self) -> Value {
        ObjectWriter::new()
            .put_opt("id", self.id.clone(), Absent::Omit)
            .put_opt("name", self.name.clone(), Absent::Omit)
            .put_opt("color", self.color, Absent::Omit)
            .put_opt("option_ids", self.option_ids.clone(), Absent::Omit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_option_requires_name() {
        let err = SelectOption::decode(&json!({"color": "red"}), "select.options[0]").unwrap_err();
        assert_eq!(
            err,
            DecodeError::mismatch("select.options[0].name", "string", "missing")
        );
    }

    #[test]
    fn test_select_option_omits_absent_fields() {
        let opt = SelectOption::colored("Done", Color::Green);
        assert_eq!(opt.encode(), json!({"name": "Done", "color": "green"}));
    }

    #[test]
    fn test_unknown_color_is_a_mismatch() {
        let tree = json!({"name": "x", "color": "teal"});
        let err = SelectOption::decode(&tree, "select.options[2]").unwrap_err();
        assert_eq!(
            err,
            DecodeError::mismatch("select.options[2].color", "color", "\"teal\"")
        );
    }

    #[test]
    fn test_status_group_keeps_option_ids() {
        let tree = json!({"name": "Complete", "color": "green", "option_ids": ["a", "b"]});
        let group = StatusGroup::decode(&tree, "status.groups[0]").unwrap();
        assert_eq!(group.option_ids.as_deref(), Some(&["a".to_owned(), "b".to_owned()][..]));
        assert_eq!(group.encode(), tree);
    }
}
