//! `notion decode`: dispatch on the requested object kind.

use clap::ValueEnum;
use notion_core::codec::{EncodeMode, FieldReader};
use notion_core::{DecodeError, Polymorphic, Record};
use notion_models::{
    FileObject, Filter, Icon, Page, PageParent, PaginatedList, PropertySchema, Sort,
};
use serde_json::Value;

/// Object kinds the `decode` subcommand understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Kind {
    /// File object (`external` / `file`) with optional name
    File,
    /// Page or database icon
    Icon,
    /// Page parent
    Parent,
    /// Database property schema
    Property,
    /// Database query filter
    Filter,
    /// Database query sort
    Sort,
    /// Page object
    Page,
    /// Paginated list of pages
    PageList,
}

impl Kind {
    /// Kinds whose wire form has a discriminator that can be left out.
    pub(crate) fn supports_untagged(self) -> bool {
        matches!(self, Kind::Icon | Kind::Parent | Kind::Property)
    }
}

fn round_trip_family<V: Polymorphic>(tree: &Value, mode: EncodeMode) -> Result<Value, DecodeError> {
    let value = match mode {
        EncodeMode::WithDiscriminator => V::decode(tree)?,
        EncodeMode::ExcludeDiscriminator => V::decode_untagged(&FieldReader::root(tree)?)?,
    };
    Ok(value.encode_with(mode))
}

fn round_trip_record<R: Record>(tree: &Value) -> Result<Value, DecodeError> {
    Ok(R::decode(tree)?.encode())
}

/// Decodes `tree` as `kind` and returns its canonical encoding.
pub(crate) fn canonicalize(kind: Kind, tree: &Value, mode: EncodeMode) -> Result<Value, DecodeError> {
    tracing::debug!(?kind, ?mode, "canonicalizing input");
    match kind {
        Kind::File => round_trip_record::<FileObject>(tree),
        Kind::Icon => round_trip_family::<Icon>(tree, mode),
        Kind::Parent => round_trip_family::<PageParent>(tree, mode),
        Kind::Property => {
            let schema = PropertySchema::decode_with(tree, "", mode)?;
            Ok(schema.encode_with(mode))
        }
        Kind::Filter => round_trip_record::<Filter>(tree),
        Kind::Sort => round_trip_record::<Sort>(tree),
        Kind::Page => round_trip_record::<Page>(tree),
        Kind::PageList => round_trip_record::<PaginatedList<Page>>(tree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_untagged_round_trip() {
        let tree = json!({"name": "Done", "checkbox": {}});
        let out = canonicalize(Kind::Property, &tree, EncodeMode::ExcludeDiscriminator).unwrap();
        assert_eq!(out, tree);
    }

    #[test]
    fn test_parent_tagged() {
        let tree = json!({"type": "workspace", "workspace": true});
        let out = canonicalize(Kind::Parent, &tree, EncodeMode::WithDiscriminator).unwrap();
        assert_eq!(out, tree);
    }

    #[test]
    fn test_untagged_support() {
        assert!(Kind::Property.supports_untagged());
        assert!(!Kind::Filter.supports_untagged());
        assert!(!Kind::File.supports_untagged());
    }
}
