//! Per-type configuration payloads of database property schemas.

use std::collections::BTreeSet;

use notion_core::codec::Absent;
use notion_core::invariant::{require_any, require_any_when};
use notion_core::{DecodeError, FieldReader, Invariant, ObjectWriter, Payload, WireEnum};
use serde_json::Value;
use uuid::Uuid;

use super::options::{SelectOption, StatusGroup, StatusOption};

notion_core::wire_enum! {
    /// Display format of a `number` property.
    pub enum NumberFormat("number format") {
        Number => "number",
        NumberWithCommas => "number_with_commas",
        Percent => "percent",
        Dollar => "dollar",
        CanadianDollar => "canadian_dollar",
        SingaporeDollar => "singapore_dollar",
        Euro => "euro",
        Pound => "pound",
        Yen => "yen",
        Ruble => "ruble",
        Rupee => "rupee",
        Won => "won",
        Yuan => "yuan",
        Real => "real",
        Lira => "lira",
        Rupiah => "rupiah",
        Franc => "franc",
        HongKongDollar => "hong_kong_dollar",
        NewZealandDollar => "new_zealand_dollar",
        Krona => "krona",
        NorwegianKrone => "norwegian_krone",
        MexicanPeso => "mexican_peso",
        Rand => "rand",
        NewTaiwanDollar => "new_taiwan_dollar",
        DanishKrone => "danish_krone",
        Zloty => "zloty",
        Baht => "baht",
        Forint => "forint",
        Koruna => "koruna",
        Shekel => "shekel",
        ChileanPeso => "chilean_peso",
        PhilippinePeso => "philippine_peso",
        Dirham => "dirham",
        ColombianPeso => "colombian_peso",
        Riyal => "riyal",
        Ringgit => "ringgit",
        Leu => "leu",
        ArgentinePeso => "argentine_peso",
        UruguayanPeso => "uruguayan_peso",
        PeruvianSol => "peruvian_sol",
    }
}

notion_core::wire_enum! {
    /// Aggregation applied by a `rollup` property.
    pub enum RollupFunction("rollup function") {
        Average => "average",
        Checked => "checked",
        Count => "count",
        CountPerGroup => "count_per_group",
        CountValues => "count_values",
        DateRange => "date_range",
        EarliestDate => "earliest_date",
        Empty => "empty",
        LatestDate => "latest_date",
        Max => "max",
        Median => "median",
        Min => "min",
        NotEmpty => "not_empty",
        PercentChecked => "percent_checked",
        PercentEmpty => "percent_empty",
        PercentNotEmpty => "percent_not_empty",
        PercentPerGroup => "percent_per_group",
        PercentUnchecked => "percent_unchecked",
        Range => "range",
        ShowOriginal => "show_original",
        ShowUnique => "show_unique",
        Sum => "sum",
        Unchecked => "unchecked",
        Unique => "unique",
    }
}

notion_core::wire_enum! {
    /// Whether a relation is mirrored by a property in the related database.
    pub enum RelationType("relation type") {
        SingleProperty => "single_property",
        DualProperty => "dual_property",
    }
}

fn wire(e: impl WireEnum) -> Value {
    Value::String(e.as_str().to_owned())
}

// ── formula ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaConfig {
    pub expression: String,
}

impl Payload for FormulaConfig {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            expression: r.required_str("expression")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put("expression", self.expression.clone())
            .finish()
    }
}

// ── number ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberConfig {
    pub format: Option<NumberFormat>,
}

impl Payload for NumberConfig {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            format: r.optional_enum("format")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put_opt("format", self.format.map(wire), Absent::Omit)
            .finish()
    }

    fn absent() -> Option<Self> {
        Some(Self::default())
    }
}

// ── relation ────────────────────────────────────────────────────────

/// Configuration of a `relation` property.
///
/// Fields are read through accessors; a config comes either from
/// [`RelationConfig::single_property`] / [`RelationConfig::dual_property`]
/// or from a decoded schema, so a one-way relation always names its
/// synced property:
///
/// ```compile_fail
/// use notion_models::property::RelationConfig;
///
/// let config = RelationConfig {
///     relation_type: None,
///     database_id: uuid::Uuid::nil(),
///     synced_property_id: None,
///     synced_property_name: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationConfig {
    relation_type: Option<RelationType>,
    database_id: Uuid,
    synced_property_id: Option<String>,
    synced_property_name: Option<String>,
}

impl RelationConfig {
    /// A one-way relation; Notion creates no property on the other side,
    /// so the related property is named up front.
    pub fn single_property(database_id: Uuid, synced: PropertyRef) -> Self {
        let (synced_property_name, synced_property_id) = synced.split();
        Self {
            relation_type: Some(RelationType::SingleProperty),
            database_id,
            synced_property_id,
            synced_property_name,
        }
    }

    /// A two-way relation mirrored by a property in `database_id`.
    pub fn dual_property(database_id: Uuid) -> Self {
        Self {
            relation_type: Some(RelationType::DualProperty),
            database_id,
            synced_property_id: None,
            synced_property_name: None,
        }
    }

    pub fn synced_name(mut self, name: impl Into<String>) -> Self {
        self.synced_property_name = Some(name.into());
        self
    }

    pub fn synced_id(mut self, id: impl Into<String>) -> Self {
        self.synced_property_id = Some(id.into());
        self
    }

    pub fn relation_type(&self) -> Option<RelationType> {
        self.relation_type
    }

    pub fn database_id(&self) -> Uuid {
        self.database_id
    }

    pub fn synced_property_id(&self) -> Option<&str> {
        self.synced_property_id.as_deref()
    }

    pub fn synced_property_name(&self) -> Option<&str> {
        self.synced_property_name.as_deref()
    }

    fn synced_property_named(&self) -> Result<(), String> {
        require_any_when(
            self.relation_type == Some(RelationType::SingleProperty),
            "type is single_property",
            &[
                ("synced_property_name", self.synced_property_name.is_some()),
                ("synced_property_id", self.synced_property_id.is_some()),
            ],
        )
    }
}

impl Payload for RelationConfig {
    const INVARIANTS: &'static [Invariant<Self>] = &[Invariant {
        name: "synced_property_named",
        check: Self::synced_property_named,
    }];

    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            relation_type: r.optional_enum("type")?,
            database_id: r.required_uuid("database_id")?,
            synced_property_id: r.optional_str("synced_property_id")?,
            synced_property_name: r.optional_str("synced_property_name")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put_opt("type", self.relation_type.map(wire), Absent::Omit)
            .put("database_id", self.database_id.hyphenated().to_string())
            .put_opt(
                "synced_property_id",
                self.synced_property_id.clone(),
                Absent::Null,
            )
            .put_opt(
                "synced_property_name",
                self.synced_property_name.clone(),
                Absent::Null,
            )
            .finish()
    }
}

// ── rollup ──────────────────────────────────────────────────────────

/// A property of another database, addressed by name or by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyRef {
    Name(String),
    Id(String),
}

impl PropertyRef {
    fn split(self) -> (Option<String>, Option<String>) {
        match self {
            PropertyRef::Name(name) => (Some(name), None),
            PropertyRef::Id(id) => (None, Some(id)),
        }
    }
}

/// Configuration of a `rollup` property. Built with [`RollupConfig::new`],
/// which takes both property references, or decoded from a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupConfig {
    relation_property_name: Option<String>,
    relation_property_id: Option<String>,
    rollup_property_name: Option<String>,
    rollup_property_id: Option<String>,
    function: RollupFunction,
}

impl RollupConfig {
    /// Rolls up `target` of the pages linked through `relation`.
    pub fn new(function: RollupFunction, relation: PropertyRef, target: PropertyRef) -> Self {
        let (relation_property_name, relation_property_id) = relation.split();
        let (rollup_property_name, rollup_property_id) = target.split();
        Self {
            relation_property_name,
            relation_property_id,
            rollup_property_name,
            rollup_property_id,
            function,
        }
    }

    pub fn function(&self) -> RollupFunction {
        self.function
    }

    pub fn relation_property_name(&self) -> Option<&str> {
        self.relation_property_name.as_deref()
    }

    pub fn relation_property_id(&self) -> Option<&str> {
        self.relation_property_id.as_deref()
    }

    pub fn rollup_property_name(&self) -> Option<&str> {
        self.rollup_property_name.as_deref()
    }

    pub fn rollup_property_id(&self) -> Option<&str> {
        self.rollup_property_id.as_deref()
    }

    fn relation_property_named(&self) -> Result<(), String> {
        require_any(&[
            ("relation_property_name", self.relation_property_name.is_some()),
            ("relation_property_id", self.relation_property_id.is_some()),
        ])
    }

    fn rollup_property_named(&self) -> Result<(), String> {
        require_any(&[
            ("rollup_property_name", self.rollup_property_name.is_some()),
            ("rollup_property_id", self.rollup_property_id.is_some()),
        ])
    }
}

impl Payload for RollupConfig {
    const INVARIANTS: &'static [Invariant<Self>] = &[
        Invariant {
            name: "relation_property_named",
            check: Self::relation_property_named,
        },
        Invariant {
            name: "rollup_property_named",
            check: Self::rollup_property_named,
        },
    ];

    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            relation_property_name: r.optional_str("relation_property_name")?,
            relation_property_id: r.optional_str("relation_property_id")?,
            rollup_property_name: r.optional_str("rollup_property_name")?,
            rollup_property_id: r.optional_str("rollup_property_id")?,
            function: r.required_enum("function")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put_opt(
                "relation_property_name",
                self.relation_property_name.clone(),
                Absent::Omit,
            )
            .put_opt(
                "relation_property_id",
                self.relation_property_id.clone(),
                Absent::Omit,
            )
            .put_opt(
                "rollup_property_name",
                self.rollup_property_name.clone(),
                Absent::Omit,
            )
            .put_opt(
                "rollup_property_id",
                self.rollup_property_id.clone(),
                Absent::Omit,
            )
            .put("function", wire(self.function))
            .finish()
    }
}

// ── select / multi_select ───────────────────────────────────────────

fn decode_options(tree: &Value, path: &str) -> Result<Vec<SelectOption>, DecodeError> {
    let r = FieldReader::new(tree, path)?;
    r.list("options", SelectOption::decode)
}

fn encode_options(options: &[SelectOption]) -> Value {
    ObjectWriter::new()
        .put_list("options", options, SelectOption::encode)
        .finish()
}

/// Options of a `select` property; an absent payload means no options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectConfig {
    pub options: Vec<SelectOption>,
}

impl Payload for SelectConfig {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        Ok(Self {
            options: decode_options(tree, path)?,
        })
    }

    fn encode(&self) -> Value {
        encode_options(&self.options)
    }

    fn absent() -> Option<Self> {
        Some(Self::default())
    }
}

/// Options of a `multi_select` property. Unlike `select`, the payload
/// object itself is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSelectConfig {
    pub options: Vec<SelectOption>,
}

impl Payload for MultiSelectConfig {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        Ok(Self {
            options: decode_options(tree, path)?,
        })
    }

    fn encode(&self) -> Value {
        encode_options(&self.options)
    }
}

// ── status ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusConfig {
    pub options: Vec<StatusOption>,
    pub groups: Vec<StatusGroup>,
}

impl StatusConfig {
    /// Group `option_ids` entries that match no option id of this
    /// property, in group order. Options without an id are ignored.
    pub fn unknown_group_option_ids(&self) -> Vec<&str> {
        let known: BTreeSet<&str> = self.options.iter().filter_map(|o| o.id.as_deref()).collect();
        self.groups
            .iter()
            .filter_map(|g| g.option_ids.as_ref())
            .flatten()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect()
    }
}

impl Payload for StatusConfig {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            options: r.list("options", StatusOption::decode)?,
            groups: r.list("groups", StatusGroup::decode)?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put_list("options", &self.options, StatusOption::encode)
            .put_list("groups", &self.groups, StatusGroup::encode)
            .finish()
    }
}
