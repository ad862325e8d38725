//! Variant registry: the closed set of tags of one family and the
//! decoder attached to each.
//!
//! A [`Family`] is built once, through [`FamilyBuilder`], inside a
//! `once_cell::sync::Lazy` static owned by the family's enum, and is
//! read-only afterwards. Lookups are scoped to one family, so the same tag
//! string may appear in several families without any relation.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::codec::{join_path, FieldReader};
use crate::error::DecodeError;
use crate::value::{self, Payload, PayloadShape};

type DecodeFn<V> = dyn Fn(Option<&Value>, &str) -> Result<V, DecodeError> + Send + Sync;

/// One tag of a family: its payload shape, its invariants and the
/// type-erased decoder producing the family value.
pub struct VariantDescriptor<V> {
    tag: &'static str,
    shape: PayloadShape,
    defaultable: bool,
    invariants: Vec<&'static str>,
    decode: Box<DecodeFn<V>>,
}

impl<V> VariantDescriptor<V> {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn shape(&self) -> PayloadShape {
        self.shape
    }

    /// Whether decoding fails when the tag-named key is absent.
    pub fn requires_payload(&self) -> bool {
        !self.defaultable
    }

    /// Names of the invariants checked for this tag, in evaluation order.
    pub fn invariant_names(&self) -> &[&'static str] {
        &self.invariants
    }

    /// Decodes (or synthesizes) the payload, validates it and wraps it.
    pub fn decode_payload(&self, payload: Option<&Value>, path: &str) -> Result<V, DecodeError> {
        (self.decode)(payload, path)
    }
}

impl<V> fmt::Debug for VariantDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("tag", &self.tag)
            .field("shape", &self.shape)
            .field("defaultable", &self.defaultable)
            .field("invariants", &self.invariants)
            .finish()
    }
}

/// A polymorphic family: discriminator field name plus its closed tag set.
pub struct Family<V> {
    name: &'static str,
    discriminator: &'static str,
    variants: HashMap<&'static str, VariantDescriptor<V>>,
    tags: Vec<&'static str>,
}

impl<V: 'static> Family<V> {
    pub fn builder(name: &'static str, discriminator: &'static str) -> FamilyBuilder<V> {
        FamilyBuilder {
            family: Family {
                name,
                discriminator,
                variants: HashMap::new(),
                tags: Vec::new(),
            },
        }
    }
}

impl<V> Family<V> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn discriminator(&self) -> &'static str {
        self.discriminator
    }

    /// Every legal tag, in registration order.
    pub fn tags(&self) -> &[&'static str] {
        &self.tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.variants.contains_key(tag)
    }

    pub fn lookup(&self, tag: &str) -> Result<&VariantDescriptor<V>, DecodeError> {
        self.variants
            .get(tag)
            .ok_or_else(|| DecodeError::unknown_variant(self.name, tag))
    }

    /// Decodes the object in `reader`: discriminator first, then the
    /// matching descriptor, then the tag-named payload and its invariants.
    pub fn decode(&self, reader: &FieldReader<'_>) -> Result<V, DecodeError> {
        let tag = reader
            .get(self.discriminator)
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::missing_discriminator(self.name, self.discriminator))?;
        self.decode_variant(reader, tag)
    }

    /// Decodes an object that carries no discriminator; the variant is the
    /// single registered tag present as a key.
    pub fn decode_untagged(&self, reader: &FieldReader<'_>) -> Result<V, DecodeError> {
        let mut candidates = reader.keys().filter(|k| self.contains(k));
        match (candidates.next(), candidates.next()) {
            (Some(tag), None) => self.decode_variant(reader, tag),
            _ => Err(DecodeError::missing_discriminator(
                self.name,
                self.discriminator,
            )),
        }
    }

    fn decode_variant(&self, reader: &FieldReader<'_>, tag: &str) -> Result<V, DecodeError> {
        let descriptor = self.lookup(tag)?;
        tracing::trace!(family = self.name, tag, path = reader.path(), "decoding variant");
        descriptor.decode_payload(reader.get(tag), &join_path(reader.path(), tag))
    }
}

impl<V> fmt::Debug for Family<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Family")
            .field("name", &self.name)
            .field("discriminator", &self.discriminator)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Registers the variants of one family. Not shareable: a builder is
/// consumed by [`FamilyBuilder::build`] inside a single static initializer.
pub struct FamilyBuilder<V> {
    family: Family<V>,
}

impl<V: 'static> FamilyBuilder<V> {
    /// Registers `tag` with payload type `C`, wrapped into the family
    /// value by `wrap`.
    ///
    /// # Panics
    ///
    /// If `tag` is already registered in this family.
    pub fn variant<C: Payload>(mut self, tag: &'static str, wrap: fn(C) -> V) -> Self {
        assert!(
            !self.family.variants.contains_key(tag),
            "{}: tag '{}' registered twice",
            self.family.name,
            tag
        );
        let family = self.family.name;
        let decode = move |payload: Option<&Value>, path: &str| -> Result<V, DecodeError> {
            let payload = match payload {
                Some(tree) => C::decode(tree, path)?,
                None => C::absent().ok_or_else(|| DecodeError::missing_payload(family, tag))?,
            };
            value::construct(tag, payload, wrap)
        };
        let descriptor = VariantDescriptor {
            tag,
            shape: C::SHAPE,
            defaultable: C::absent().is_some(),
            invariants: C::INVARIANTS.iter().map(|inv| inv.name).collect(),
            decode: Box::new(decode),
        };
        self.family.variants.insert(tag, descriptor);
        self.family.tags.push(tag);
        self
    }

    pub fn build(self) -> Family<V> {
        tracing::debug!(
            family = self.family.name,
            variants = self.family.tags.len(),
            "variant registry initialized"
        );
        self.family
    }
}
