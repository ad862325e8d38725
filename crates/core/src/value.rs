//! Tagged values and the payloads they carry.

use serde_json::Value;
use uuid::Uuid;

use crate::codec::{describe, EncodeMode, FieldReader, Object, ObjectWriter};
use crate::error::DecodeError;
use crate::invariant::{self, Invariant};
use crate::registry::Family;

/// How a variant's payload appears under its tag-named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// A JSON object of named fields.
    Record,
    /// A bare JSON scalar (uuid string, emoji, `true`).
    Scalar,
    /// A JSON array, as in `{"and": [...]}`.
    List,
}

/// The data one variant carries under its tag-named key.
pub trait Payload: Sized + 'static {
    const SHAPE: PayloadShape = PayloadShape::Record;

    /// Cross-field rules, checked in order after decoding or construction.
    const INVARIANTS: &'static [Invariant<Self>] = &[];

    /// Decodes the payload sub-tree found at `path`.
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError>;

    fn encode(&self) -> Value;

    /// The payload to synthesize when the tag-named key is missing.
    /// `None` means the payload is required.
    fn absent() -> Option<Self> {
        None
    }
}

/// Validates `payload` as variant `tag` and wraps it.
///
/// This is the only way a variant value comes into existence: the
/// registry's decoders and every factory go through here.
pub fn construct<C: Payload, V>(
    tag: &str,
    payload: C,
    wrap: impl FnOnce(C) -> V,
) -> Result<V, DecodeError> {
    invariant::enforce(tag, &payload)?;
    Ok(wrap(payload))
}

/// A closed sum type with one case per tag of its [`Family`].
pub trait Polymorphic: Sized + 'static {
    fn family() -> &'static Family<Self>;

    fn tag(&self) -> &'static str;

    fn encode_payload(&self) -> Value;

    fn decode(tree: &Value) -> Result<Self, DecodeError> {
        Self::decode_from(&FieldReader::root(tree)?)
    }

    /// Decodes the variant whose discriminator sits in `reader`'s object.
    fn decode_from(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::family().decode(reader)
    }

    /// Decodes the discriminator-less form written by
    /// [`EncodeMode::ExcludeDiscriminator`].
    fn decode_untagged(reader: &FieldReader<'_>) -> Result<Self, DecodeError> {
        Self::family().decode_untagged(reader)
    }

    fn encode(&self) -> Value {
        self.encode_with(EncodeMode::WithDiscriminator)
    }

    fn encode_with(&self, mode: EncodeMode) -> Value {
        let mut out = Object::new();
        self.write_into(&mut out, mode);
        Value::Object(out)
    }

    /// Writes the discriminator (unless excluded) and the tag-named
    /// payload into an object that may carry other sibling fields.
    fn write_into(&self, out: &mut Object, mode: EncodeMode) {
        if mode == EncodeMode::WithDiscriminator {
            out.insert(
                Self::family().discriminator().to_owned(),
                Value::String(self.tag().to_owned()),
            );
        }
        out.insert(self.tag().to_owned(), self.encode_payload());
    }
}

/// A plain record decoded from and encoded to one JSON object, such as a
/// page or a list element.
pub trait Record: Sized {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError>;

    fn encode(&self) -> Value;

    fn decode(tree: &Value) -> Result<Self, DecodeError> {
        Self::decode_at(tree, "")
    }
}

// ── Shared payloads ─────────────────────────────────────────────────

/// The configuration of variants that take no settings: `{}` on the wire,
/// synthesized when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Empty;

impl Payload for Empty {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        FieldReader::new(tree, path)?;
        Ok(Empty)
    }

    fn encode(&self) -> Value {
        ObjectWriter::new().finish()
    }

    fn absent() -> Option<Self> {
        Some(Empty)
    }
}

impl Payload for Uuid {
    const SHAPE: PayloadShape = PayloadShape::Scalar;

    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        tree.as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| DecodeError::mismatch(path, "uuid", describe(tree)))
    }

    fn encode(&self) -> Value {
        Value::String(self.hyphenated().to_string())
    }
}

impl Payload for String {
    const SHAPE: PayloadShape = PayloadShape::Scalar;

    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        tree.as_str()
            .map(str::to_owned)
            .ok_or_else(|| DecodeError::mismatch(path, "string", describe(tree)))
    }

    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

/// A payload that must be the literal `true`, as in
/// `{"type": "workspace", "workspace": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flag;

impl Payload for Flag {
    const SHAPE: PayloadShape = PayloadShape::Scalar;

    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        match tree {
            Value::Bool(true) => Ok(Flag),
            other => Err(DecodeError::mismatch(path, "true", describe(other))),
        }
    }

    fn encode(&self) -> Value {
        Value::Bool(true)
    }
}
