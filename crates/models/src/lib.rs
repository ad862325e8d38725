//! notion-models: typed Notion API objects built on `notion-core`.
//!
//! Each polymorphic object is a closed enum implementing
//! [`notion_core::Polymorphic`]; plain records implement
//! [`notion_core::Record`]. Associated constructors are the factories: the
//! ones for variants with invariants return `Result` and validate exactly
//! like decoding does.

pub mod common;
pub mod file;
pub mod filter;
pub mod icon;
pub mod page;
pub mod pagination;
pub mod parent;
pub mod property;
pub mod sort;

pub use common::{Color, PartialUser};
pub use file::{ExternalFile, FileObject, FileSource, UploadedFile};
pub use filter::{
    Filter, FilterGroup, FormulaCondition, Operand, PropertyCondition, PropertyFilter,
    TimestampFilter,
};
pub use icon::Icon;
pub use page::Page;
pub use pagination::{ListType, PaginatedList};
pub use parent::PageParent;
pub use property::{
    decode_property_map, encode_property_map, PropertyConfig, PropertySchema, SelectOption,
    StatusGroup, StatusOption,
};
pub use sort::{Direction, Sort, SortKey, TimestampKind};

use notion_core::{Family, Polymorphic};

/// Name, discriminator field and legal tags of one registered family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilySummary {
    pub name: &'static str,
    pub discriminator: &'static str,
    pub tags: Vec<&'static str>,
}

impl<V> From<&Family<V>> for FamilySummary {
    fn from(family: &Family<V>) -> Self {
        Self {
            name: family.name(),
            discriminator: family.discriminator(),
            tags: family.tags().to_vec(),
        }
    }
}

/// Every family defined in this crate.
pub fn catalog() -> Vec<FamilySummary> {
    vec![
        FileSource::family().into(),
        Icon::family().into(),
        PageParent::family().into(),
        PropertyConfig::family().into(),
        PropertyCondition::family().into(),
        FormulaCondition::family().into(),
        TimestampFilter::family().into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_every_family_once() {
        let names: Vec<&str> = catalog().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "file object",
                "icon",
                "page parent",
                "database property",
                "property filter",
                "formula condition",
                "timestamp filter"
            ]
        );
    }

    #[test]
    fn test_same_tag_in_different_families() {
        let catalog = catalog();
        let with_file: Vec<&str> = catalog
            .iter()
            .filter(|f| f.tags.contains(&"file"))
            .map(|f| f.name)
            .collect();
        assert_eq!(with_file, vec!["file object", "icon"]);
    }
}
