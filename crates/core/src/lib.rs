//! notion-core: typed tagged-union modeling for Notion API JSON.
//!
//! Every polymorphic Notion object has the same wire shape: a
//! discriminator field (usually `"type"`) names the variant, and a sibling
//! key spelled exactly like the tag carries that variant's payload:
//!
//! ```json
//! {"type": "external", "external": {"url": "https://x.test/a.png"}}
//! ```
//!
//! This crate provides the machinery shared by every such family. The
//! concrete families live in `notion-models`.
//!
//! # Public API
//!
//! - [`Family`] / [`FamilyBuilder`] -- the variant registry of one family
//! - [`Payload`] -- a variant's data plus its [`Invariant`] table
//! - [`Polymorphic`] -- decode/encode for a closed family enum
//! - [`construct()`] -- the single validated construction path
//! - [`FieldReader`] / [`ObjectWriter`] -- the canonical codec
//! - [`DecodeError`] -- every failure the above can report

pub mod codec;
pub mod error;
pub mod invariant;
pub mod registry;
pub mod value;

// ── Convenience re-exports ───────────────────────────────────────────

pub use codec::{Absent, EncodeMode, FieldReader, Object, ObjectWriter, Timestamp, WireEnum};
pub use error::DecodeError;
pub use invariant::{enforce, Invariant};
pub use registry::{Family, FamilyBuilder, VariantDescriptor};
pub use value::{construct, Empty, Flag, Payload, PayloadShape, Polymorphic, Record};
