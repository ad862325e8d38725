//! Database property schemas.
//!
//! A schema is `{id?, name?, description?, type, <type>: {config}}`. In
//! responses every schema carries its `type`; in create/update request
//! bodies the type is implied by the single config key, so the request
//! form is written with [`EncodeMode::ExcludeDiscriminator`] and read back
//! with [`PropertySchema::decode_untagged`].

mod config;
mod options;

pub use config::{
    FormulaConfig, MultiSelectConfig, NumberConfig, NumberFormat, PropertyRef, RelationConfig,
    RelationType, RollupConfig, RollupFunction, SelectConfig, StatusConfig,
};
pub use options::{SelectOption, StatusGroup, StatusOption};

use std::collections::BTreeMap;

use notion_core::codec::{join_path, Absent, EncodeMode};
use notion_core::{
    construct, DecodeError, Empty, Family, FieldReader, Object, ObjectWriter, Payload,
    Polymorphic, Record,
};
use once_cell::sync::Lazy;
use serde_json::Value;
use uuid::Uuid;

/// The type-specific half of a property schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyConfig {
    Checkbox,
    CreatedBy,
    CreatedTime,
    Date,
    Email,
    Files,
    Formula(FormulaConfig),
    LastEditedBy,
    LastEditedTime,
    MultiSelect(MultiSelectConfig),
    Number(NumberConfig),
    People,
    PhoneNumber,
    Relation(RelationConfig),
    RichText,
    Rollup(RollupConfig),
    Select(SelectConfig),
    Status(StatusConfig),
    Title,
    Url,
}

static PROPERTY_CONFIGS: Lazy<Family<PropertyConfig>> = Lazy::new(|| {
    Family::builder("database property", "type")
        .variant("checkbox", |_: Empty| PropertyConfig::Checkbox)
        .variant("created_by", |_: Empty| PropertyConfig::CreatedBy)
        .variant("created_time", |_: Empty| PropertyConfig::CreatedTime)
        .variant("date", |_: Empty| PropertyConfig::Date)
        .variant("email", |_: Empty| PropertyConfig::Email)
        .variant("files", |_: Empty| PropertyConfig::Files)
        .variant("formula", PropertyConfig::Formula)
        .variant("last_edited_by", |_: Empty| PropertyConfig::LastEditedBy)
        .variant("last_edited_time", |_: Empty| PropertyConfig::LastEditedTime)
        .variant("multi_select", PropertyConfig::MultiSelect)
        .variant("number", PropertyConfig::Number)
        .variant("people", |_: Empty| PropertyConfig::People)
        .variant("phone_number", |_: Empty| PropertyConfig::PhoneNumber)
        .variant("relation", PropertyConfig::Relation)
        .variant("rich_text", |_: Empty| PropertyConfig::RichText)
        .variant("rollup", PropertyConfig::Rollup)
        .variant("select", PropertyConfig::Select)
        .variant("status", PropertyConfig::Status)
        .variant("title", |_: Empty| PropertyConfig::Title)
        .variant("url", |_: Empty| PropertyConfig::Url)
        .build()
});

impl Polymorphic for PropertyConfig {
    fn family() -> &'static Family<Self> {
        &PROPERTY_CONFIGS
    }

    fn tag(&self) -> &'static str {
        match self {
            PropertyConfig::Checkbox => "checkbox",
            PropertyConfig::CreatedBy => "created_by",
            PropertyConfig::CreatedTime => "created_time",
            PropertyConfig::Date => "date",
            PropertyConfig::Email => "email",
            PropertyConfig::Files => "files",
            PropertyConfig::Formula(_) => "formula",
            PropertyConfig::LastEditedBy => "last_edited_by",
            PropertyConfig::LastEditedTime => "last_edited_time",
            PropertyConfig::MultiSelect(_) => "multi_select",
            PropertyConfig::Number(_) => "number",
            PropertyConfig::People => "people",
            PropertyConfig::PhoneNumber => "phone_number",
            PropertyConfig::Relation(_) => "relation",
            PropertyConfig::RichText => "rich_text",
            PropertyConfig::Rollup(_) => "rollup",
            PropertyConfig::Select(_) => "select",
            PropertyConfig::Status(_) => "status",
            PropertyConfig::Title => "title",
            PropertyConfig::Url => "url",
        }
    }

    fn encode_payload(&self) -> Value {
        match self {
            PropertyConfig::Formula(c) => c.encode(),
            PropertyConfig::MultiSelect(c) => c.encode(),
            PropertyConfig::Number(c) => c.encode(),
            PropertyConfig::Relation(c) => c.encode(),
            PropertyConfig::Rollup(c) => c.encode(),
            PropertyConfig::Select(c) => c.encode(),
            PropertyConfig::Status(c) => c.encode(),
            _ => Empty.encode(),
        }
    }
}

// ── Factories ───────────────────────────────────────────────────────

impl PropertyConfig {
    pub fn formula(expression: impl Into<String>) -> Self {
        PropertyConfig::Formula(FormulaConfig {
            expression: expression.into(),
        })
    }

    pub fn multi_select(options: Vec<SelectOption>) -> Self {
        PropertyConfig::MultiSelect(MultiSelectConfig { options })
    }

    pub fn number(format: Option<NumberFormat>) -> Self {
        PropertyConfig::Number(NumberConfig { format })
    }

    pub fn relation(config: RelationConfig) -> Result<Self, DecodeError> {
        construct("relation", config, PropertyConfig::Relation)
    }

    /// Shorthand for a two-way relation, which needs no synced property.
    pub fn dual_relation(database_id: Uuid) -> Result<Self, DecodeError> {
        Self::relation(RelationConfig::dual_property(database_id))
    }

    pub fn rollup(config: RollupConfig) -> Result<Self, DecodeError> {
        construct("rollup", config, PropertyConfig::Rollup)
    }

    pub fn select(options: Vec<SelectOption>) -> Self {
        PropertyConfig::Select(SelectConfig { options })
    }

    pub fn status(options: Vec<StatusOption>, groups: Vec<StatusGroup>) -> Self {
        PropertyConfig::Status(StatusConfig { options, groups })
    }
}

// ── Schema ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySchema {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub config: PropertyConfig,
}

impl PropertySchema {
    pub fn new(config: PropertyConfig) -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            config,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.config.tag()
    }

    fn decode_fields(r: &FieldReader<'_>, config: PropertyConfig) -> Result<Self, DecodeError> {
        Ok(Self {
            id: r.optional_str("id")?,
            name: r.optional_str("name")?,
            description: r.optional_str("description")?,
            config,
        })
    }

    /// Reads the request form, where the type is implied by the config key.
    pub fn decode_untagged(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        let config = PropertyConfig::decode_untagged(&r)?;
        Self::decode_fields(&r, config)
    }

    pub fn decode_with(tree: &Value, path: &str, mode: EncodeMode) -> Result<Self, DecodeError> {
        match mode {
            EncodeMode::WithDiscriminator => Self::decode_at(tree, path),
            EncodeMode::ExcludeDiscriminator => Self::decode_untagged(tree, path),
        }
    }

    pub fn encode_with(&self, mode: EncodeMode) -> Value {
        let mut out = ObjectWriter::new()
            .put_opt("id", self.id.clone(), Absent::Omit)
            .put_opt("name", self.name.clone(), Absent::Omit)
            .put_opt("description", self.description.clone(), Absent::Omit)
            .into_object();
        self.config.write_into(&mut out, mode);
        Value::Object(out)
    }
}

impl Record for PropertySchema {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        let config = PropertyConfig::decode_from(&r)?;
        Self::decode_fields(&r, config)
    }

    fn encode(&self) -> Value {
        self.encode_with(EncodeMode::WithDiscriminator)
    }
}

/// Encodes the `properties` object of a database body, keyed by property
/// name.
pub fn encode_property_map(properties: &BTreeMap<String, PropertySchema>, mode: EncodeMode) -> Value {
    let out: Object = properties
        .iter()
        .map(|(name, schema)| (name.clone(), schema.encode_with(mode)))
        .collect();
    Value::Object(out)
}

/// Decodes a `properties` object; each entry's path is `<path>.<name>`.
pub fn decode_property_map(
    tree: &Value,
    path: &str,
    mode: EncodeMode,
) -> Result<BTreeMap<String, PropertySchema>, DecodeError> {
    let r = FieldReader::new(tree, path)?;
    r.object()
        .iter()
        .map(|(name, entry)| {
            let schema = PropertySchema::decode_with(entry, &join_path(path, name), mode)?;
            Ok((name.clone(), schema))
        })
        .collect()
}
