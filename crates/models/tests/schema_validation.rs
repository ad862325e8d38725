//! Validates encoder output against the wire contract in
//! schema/notion-objects.schema.json.

use std::collections::BTreeMap;
use std::path::Path;

use notion_core::codec::EncodeMode;
use notion_core::{Polymorphic, Record};
use notion_models::filter::Operand;
use notion_models::property::{
    NumberFormat, PropertyRef, RelationConfig, RollupConfig, RollupFunction,
};
use notion_models::{
    encode_property_map, Color, FileObject, Filter, Icon, ListType, Page, PageParent,
    PaginatedList, PartialUser, PropertyCondition, PropertyConfig, PropertyFilter,
    PropertySchema, SelectOption, Sort, TimestampFilter, TimestampKind,
};
use serde_json::{json, Value};
use uuid::Uuid;

const DB: &str = "8c4a056e-6709-4dd1-ba58-d34d9480855a";

fn workspace_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
}

fn schema_defs() -> Value {
    let schema_path = workspace_root().join("schema/notion-objects.schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema: Value = serde_json::from_str(&schema_src).unwrap();
    schema["$defs"].clone()
}

/// Validates every instance against `#/$defs/<def>`, collecting failures.
fn check(def: &str, instances: &[Value], failures: &mut Vec<String>) {
    let schema = json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$defs": schema_defs(),
        "$ref": format!("#/$defs/{}", def),
    });
    let validator = jsonschema::validator_for(&schema)
        .unwrap_or_else(|e| panic!("Failed to compile schema for {}: {}", def, e));
    for (i, instance) in instances.iter().enumerate() {
        if let Err(error) = validator.validate(instance) {
            failures.push(format!("{}[{}]: {} in {}", def, i, error, instance));
        }
    }
}

fn db() -> Uuid {
    Uuid::parse_str(DB).unwrap()
}

fn sample_schemas() -> Vec<PropertySchema> {
    vec![
        PropertySchema::new(PropertyConfig::Title).named("Name"),
        PropertySchema::new(PropertyConfig::number(Some(NumberFormat::Percent))).named("Done %"),
        PropertySchema::new(PropertyConfig::formula("prop(\"Cost\") * 2")),
        PropertySchema::new(PropertyConfig::select(vec![
            SelectOption::colored("High", Color::Red),
            SelectOption::new("Low"),
        ])),
        PropertySchema::new(
            PropertyConfig::relation(RelationConfig::single_property(db(), PropertyRef::Id("a%3Bc".into())))
                .unwrap(),
        ),
        PropertySchema::new(PropertyConfig::dual_relation(db()).unwrap()),
        PropertySchema::new(
            PropertyConfig::rollup(RollupConfig::new(
                RollupFunction::Average,
                PropertyRef::Name("Items".into()),
                PropertyRef::Id("xyz".into()),
            ))
            .unwrap(),
        )
        .described("Average item cost"),
    ]
}

#[test]
fn validate_files_icons_and_parents() {
    let mut failures = Vec::new();
    check(
        "file_object",
        &[
            FileObject::new_external("https://x.test/a.png").unwrap().encode(),
            FileObject::new_uploaded("https://s3.test/a.png", None)
                .unwrap()
                .with_name("a.png")
                .encode(),
        ],
        &mut failures,
    );
    check(
        "icon",
        &[
            Icon::emoji("🎯").encode(),
            Icon::external("https://x.test/i.svg").unwrap().encode(),
        ],
        &mut failures,
    );
    check(
        "page_parent",
        &[
            PageParent::database(db()).encode(),
            PageParent::page(db()).encode(),
            PageParent::workspace().encode(),
        ],
        &mut failures,
    );
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn validate_property_schemas_in_both_modes() {
    let mut failures = Vec::new();
    let schemas = sample_schemas();
    let tagged: Vec<Value> = schemas.iter().map(|s| s.encode()).collect();
    let untagged: Vec<Value> = schemas
        .iter()
        .map(|s| s.encode_with(EncodeMode::ExcludeDiscriminator))
        .collect();
    check("property_schema", &tagged, &mut failures);
    check("property_schema_request", &untagged, &mut failures);
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn validate_property_map_entries() {
    let map: BTreeMap<String, PropertySchema> = sample_schemas()
        .into_iter()
        .enumerate()
        .map(|(i, s)| (format!("p{}", i), s))
        .collect();
    let encoded = encode_property_map(&map, EncodeMode::ExcludeDiscriminator);
    let entries: Vec<Value> = encoded.as_object().unwrap().values().cloned().collect();
    let mut failures = Vec::new();
    check("property_schema_request", &entries, &mut failures);
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn validate_filters_and_sorts() {
    let done: Filter = PropertyFilter::new(
        "Done",
        PropertyCondition::new("checkbox", "equals", Operand::Bool(false)).unwrap(),
    )
    .into();
    let recent: Filter = TimestampFilter::created_time("on_or_after", Operand::date("2024-01-01"))
        .unwrap()
        .into();
    let compound = Filter::and(vec![done.clone(), Filter::or(vec![recent.clone()]).unwrap()])
        .unwrap();

    let mut failures = Vec::new();
    check(
        "filter",
        &[done.encode(), recent.encode(), compound.encode()],
        &mut failures,
    );
    check(
        "sort",
        &[
            Sort::property("Due", notion_models::Direction::Ascending).encode(),
            Sort::timestamp(TimestampKind::CreatedTime, notion_models::Direction::Descending)
                .encode(),
        ],
        &mut failures,
    );
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn validate_page_and_list_fixtures() {
    let root = workspace_root().join("fixtures");
    let page_src = std::fs::read_to_string(root.join("page.json")).unwrap();
    let page = Page::decode(&serde_json::from_str(&page_src).unwrap()).unwrap();

    let list_src = std::fs::read_to_string(root.join("page_list.json")).unwrap();
    let list = PaginatedList::<Page>::decode(&serde_json::from_str(&list_src).unwrap()).unwrap();

    let users = PaginatedList::complete(ListType::User, vec![PartialUser::new(Uuid::nil())]);

    let mut failures = Vec::new();
    check("page", &[page.encode()], &mut failures);
    check("list", &[list.encode(), users.encode()], &mut failures);
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
