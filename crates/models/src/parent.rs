use notion_core::{Family, Flag, Payload, Polymorphic};
use once_cell::sync::Lazy;
use serde_json::Value;
use uuid::Uuid;

/// What a page hangs under. The payload of the id variants is the bare
/// uuid string; `workspace` carries the literal `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageParent {
    Database(Uuid),
    Page(Uuid),
    Workspace,
}

static PAGE_PARENTS: Lazy<Family<PageParent>> = Lazy::new(|| {
    Family::builder("page parent", "type")
        .variant("database_id", PageParent::Database)
        .variant("page_id", PageParent::Page)
        .variant("workspace", |_: Flag| PageParent::Workspace)
        .build()
});

impl Polymorphic for PageParent {
    fn family() -> &'static Family<Self> {
        &PAGE_PARENTS
    }

    fn tag(&self) -> &'static str {
        match self {
            PageParent::Database(_) => "database_id",
            PageParent::Page(_) => "page_id",
            PageParent::Workspace => "workspace",
        }
    }

    fn encode_payload(&self) -> Value {
        match self {
            PageParent::Database(id) | PageParent::Page(id) => Payload::encode(id),
            PageParent::Workspace => Flag.encode(),
        }
    }
}

impl PageParent {
    pub fn database(id: Uuid) -> Self {
        PageParent::Database(id)
    }

    pub fn page(id: Uuid) -> Self {
        PageParent::Page(id)
    }

    pub fn workspace() -> Self {
        PageParent::Workspace
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            PageParent::Database(id) | PageParent::Page(id) => Some(*id),
            PageParent::Workspace => None,
        }
    }
}
