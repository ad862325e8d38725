//! Small shared objects: colors and user references.

use notion_core::{DecodeError, FieldReader, ObjectWriter, Record};
use serde_json::Value;
use uuid::Uuid;

notion_core::wire_enum! {
    /// Text and background colors accepted by options and groups.
    pub enum Color("color") {
        Default => "default",
        Gray => "gray",
        Brown => "brown",
        Orange => "orange",
        Yellow => "yellow",
        Green => "green",
        Blue => "blue",
        Purple => "purple",
        Pink => "pink",
        Red => "red",
        DefaultBackground => "default_background",
        GrayBackground => "gray_background",
        BrownBackground => "brown_background",
        OrangeBackground => "orange_background",
        YellowBackground => "yellow_background",
        GreenBackground => "green_background",
        BlueBackground => "blue_background",
        PurpleBackground => "purple_background",
        PinkBackground => "pink_background",
        RedBackground => "red_background",
    }
}

impl From<Color> for Value {
    fn from(color: Color) -> Self {
        Value::String(notion_core::WireEnum::as_str(&color).to_owned())
    }
}

/// A user reference as embedded in pages: `{"object": "user", "id": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialUser {
    pub id: Uuid,
}

impl PartialUser {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

impl Record for PartialUser {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        r.expect_literal("object", "user")?;
        Ok(Self {
            id: r.required_uuid("id")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put("object", "user")
            .put("id", self.id.hyphenated().to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notion_core::WireEnum;
    use serde_json::json;

    #[test]
    fn test_background_colors_are_distinct() {
        assert_eq!(Color::from_wire("red_background"), Some(Color::RedBackground));
        assert_eq!(Color::from_wire("red"), Some(Color::Red));
        assert_eq!(Value::from(Color::GrayBackground), json!("gray_background"));
    }

    #[test]
    fn test_partial_user_requires_object_literal() {
        let tree = json!({"object": "bot", "id": "6794760a-1f15-45cd-9c65-0dfe42f5135a"});
        let err = PartialUser::decode(&tree).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("object", "\"user\"", "\"bot\""));
    }

    #[test]
    fn test_partial_user_ignores_extra_fields() {
        let tree = json!({
            "object": "user",
            "id": "6794760a-1f15-45cd-9c65-0dfe42f5135a",
            "name": "Ada",
            "avatar_url": null
        });
        let user = PartialUser::decode(&tree).unwrap();
        assert_eq!(
            user.encode(),
            json!({"object": "user", "id": "6794760a-1f15-45cd-9c65-0dfe42f5135a"})
        );
    }
}
