use notion_core::codec::{Absent, EncodeMode};
use notion_core::{
    DecodeError, FieldReader, Object, ObjectWriter, Polymorphic, Record, Timestamp,
};
use serde_json::Value;
use uuid::Uuid;

use crate::common::PartialUser;
use crate::file::FileSource;
use crate::icon::Icon;
use crate::parent::PageParent;

/// A page as returned by the pages and query endpoints. Property values
/// are kept as raw JSON keyed by property name.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: Uuid,
    pub created_time: Timestamp,
    pub created_by: PartialUser,
    pub last_edited_time: Timestamp,
    pub last_edited_by: PartialUser,
    pub archived: bool,
    pub in_trash: bool,
    pub icon: Option<Icon>,
    pub cover: Option<FileSource>,
    pub properties: Object,
    pub parent: PageParent,
    pub url: String,
    pub public_url: Option<String>,
}

impl Page {
    /// The value of the property named `title`, if the page has one under
    /// that name.
    pub fn title_property(&self) -> Option<&Value> {
        self.properties.get("title")
    }
}

fn optional_family<V: Polymorphic>(
    r: &FieldReader<'_>,
    field: &str,
) -> Result<Option<V>, DecodeError> {
    r.nested(field)?
        .map(|nested| V::decode_from(&nested))
        .transpose()
}

fn encode_optional<V: Polymorphic>(v: &Option<V>) -> Option<Value> {
    v.as_ref().map(|v| v.encode_with(EncodeMode::WithDiscriminator))
}

impl Record for Page {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        r.expect_literal("object", "page")?;
        let user = |field: &str| match r.get(field) {
            Some(v) => PartialUser::decode_at(v, &r.field_path(field)),
            None => Err(DecodeError::mismatch(r.field_path(field), "object", "missing")),
        };
        Ok(Self {
            id: r.required_uuid("id")?,
            created_time: r.required_timestamp("created_time")?,
            created_by: user("created_by")?,
            last_edited_time: r.required_timestamp("last_edited_time")?,
            last_edited_by: user("last_edited_by")?,
            archived: r.required_bool("archived")?,
            in_trash: r.required_bool("in_trash")?,
            icon: optional_family(&r, "icon")?,
            cover: optional_family(&r, "cover")?,
            properties: r.raw_object("properties")?,
            parent: PageParent::decode_from(&r.required_nested("parent")?)?,
            url: r.required_str("url")?,
            public_url: r.optional_str("public_url")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put("object", "page")
            .put("id", self.id.hyphenated().to_string())
            .put("created_time", self.created_time.as_str())
            .put("created_by", self.created_by.encode())
            .put("last_edited_time", self.last_edited_time.as_str())
            .put("last_edited_by", self.last_edited_by.encode())
            .put("archived", self.archived)
            .put("in_trash", self.in_trash)
            .put_opt("icon", encode_optional(&self.icon), Absent::Null)
            .put_opt("cover", encode_optional(&self.cover), Absent::Null)
            .put("properties", Value::Object(self.properties.clone()))
            .put("parent", self.parent.encode())
            .put("url", self.url.clone())
            .put_opt("public_url", self.public_url.clone(), Absent::Null)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "created_time": "2022-03-01T19:05:00.000Z",
            "created_by": {"object": "user", "id": "ee5f0f84-409a-440f-983a-a5315961c6e4"},
            "last_edited_time": "2022-07-06T20:25:00.000Z",
            "last_edited_by": {"object": "user", "id": "0c3e9826-b8f7-4f73-927d-2caaf86f1103"},
            "archived": false,
            "in_trash": false,
            "icon": {"type": "emoji", "emoji": "🐞"},
            "cover": {"type": "external", "external": {"url": "https://upload.wikimedia.org/a.jpg"}},
            "properties": {
                "title": {"id": "title", "type": "title", "title": []},
                "Done": {"id": "a%3Bc", "type": "checkbox", "checkbox": true}
            },
            "parent": {"type": "database_id", "database_id": "d9824bdc-8445-4327-be8b-5b47500af6ce"},
            "url": "https://www.notion.so/Tuscan-kale-598337872cf94fdf8782e53db20768a5",
            "public_url": null
        })
    }

    #[test]
    fn test_decode_page() {
        let page = Page::decode(&sample()).unwrap();
        assert_eq!(page.icon, Some(Icon::emoji("🐞")));
        assert!(matches!(page.cover, Some(FileSource::External(_))));
        assert!(matches!(page.parent, PageParent::Database(_)));
        assert_eq!(page.title_property().unwrap()["id"], "title");
        assert_eq!(page.public_url, None);
    }

    #[test]
    fn test_page_round_trip() {
        let page = Page::decode(&sample()).unwrap();
        let encoded = page.encode();
        assert_eq!(encoded["created_time"], "2022-03-01T19:05:00Z");
        assert_eq!(encoded["public_url"], Value::Null);
        assert_eq!(Page::decode(&encoded).unwrap(), page);
    }

    #[test]
    fn test_object_must_be_page() {
        let mut tree = sample();
        tree["object"] = json!("database");
        let err = Page::decode(&tree).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("object", "\"page\"", "\"database\""));
    }

    #[test]
    fn test_nested_errors_carry_path() {
        let mut tree = sample();
        tree["parent"] = json!({"type": "database_id", "database_id": 7});
        let err = Page::decode(&tree).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("parent.database_id", "uuid", "number"));

        let mut tree = sample();
        tree["created_by"]["id"] = json!("nobody");
        let err = Page::decode(&tree).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("created_by.id", "uuid", "\"nobody\""));
    }

    #[test]
    fn test_missing_icon_reads_as_none() {
        let mut tree = sample();
        tree.as_object_mut().unwrap().remove("icon");
        tree["cover"] = Value::Null;
        let page = Page::decode(&tree).unwrap();
        assert_eq!(page.icon, None);
        assert_eq!(page.cover, None);
    }
}
