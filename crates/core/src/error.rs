/// Errors raised while decoding or constructing a tagged value.
///
/// Every variant names the stage that rejected the input. None of them is
/// recoverable within the call that produced it: a caller either receives
/// a fully validated value or exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The discriminator field is absent or is not a string.
    #[error("{family}: missing or invalid discriminator field '{field}'")]
    MissingOrInvalidDiscriminator { family: String, field: String },

    /// The discriminator names a tag outside the family's closed set.
    #[error("{family}: unknown variant '{tag}'")]
    UnknownVariant { family: String, tag: String },

    /// The tag-named payload object is absent and the variant has no default.
    #[error("{family}: variant '{tag}' requires a '{tag}' payload")]
    MissingPayload { family: String, tag: String },

    /// A field is present but holds the wrong JSON kind or an unparseable value.
    #[error("field '{field}': expected {expected}, found {actual}")]
    FieldTypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// A cross-field rule of the variant rejected the payload.
    #[error("variant '{variant}' violates invariant: {reason}")]
    InvariantViolation { variant: String, reason: String },
}

impl DecodeError {
    pub fn missing_discriminator(family: &str, field: &str) -> Self {
        Self::MissingOrInvalidDiscriminator {
            family: family.to_owned(),
            field: field.to_owned(),
        }
    }

    pub fn unknown_variant(family: &str, tag: &str) -> Self {
        Self::UnknownVariant {
            family: family.to_owned(),
            tag: tag.to_owned(),
        }
    }

    pub fn missing_payload(family: &str, tag: &str) -> Self {
        Self::MissingPayload {
            family: family.to_owned(),
            tag: tag.to_owned(),
        }
    }

    /// Creates a field mismatch error.
    ///
    /// `actual` should describe what was found, e.g. `"string"` or
    /// `"\"not-a-uuid\""`; see [`crate::codec::describe`].
    pub fn mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::FieldTypeMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invariant(variant: &str, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            variant: variant.to_owned(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case label for the failing stage.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingOrInvalidDiscriminator { .. } => "missing_or_invalid_discriminator",
            Self::UnknownVariant { .. } => "unknown_variant",
            Self::MissingPayload { .. } => "missing_payload",
            Self::FieldTypeMismatch { .. } => "field_type_mismatch",
            Self::InvariantViolation { .. } => "invariant_violation",
        }
    }

    /// Structured form for tooling output. Always includes `kind` and
    /// `message`; the remaining keys depend on the variant.
    pub fn to_json_value(&self) -> serde_json::Value {
        let detail = match self {
            Self::MissingOrInvalidDiscriminator { family, field } => {
                serde_json::json!({ "family": family, "field": field })
            }
            Self::UnknownVariant { family, tag } | Self::MissingPayload { family, tag } => {
                serde_json::json!({ "family": family, "tag": tag })
            }
            Self::FieldTypeMismatch {
                field,
                expected,
                actual,
            } => serde_json::json!({ "field": field, "expected": expected, "actual": actual }),
            Self::InvariantViolation { variant, reason } => {
                serde_json::json!({ "variant": variant, "reason": reason })
            }
        };
        let mut out = serde_json::Map::new();
        out.insert("kind".to_owned(), self.kind().into());
        out.insert("message".to_owned(), self.to_string().into());
        if let serde_json::Value::Object(fields) = detail {
            out.extend(fields);
        }
        serde_json::Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_message() {
        let err = DecodeError::unknown_variant("file object", "bogus");
        assert_eq!(err.to_string(), "file object: unknown variant 'bogus'");
        assert_eq!(err.kind(), "unknown_variant");
    }

    #[test]
    fn test_mismatch_message() {
        let err = DecodeError::mismatch("rollup.function", "rollup function", "\"avg\"");
        assert_eq!(
            err.to_string(),
            "field 'rollup.function': expected rollup function, found \"avg\""
        );
    }

    #[test]
    fn test_json_form_carries_kind_and_detail() {
        let err = DecodeError::invariant("rollup", "relation_property_name or relation_property_id is required");
        let v = err.to_json_value();
        assert_eq!(v["kind"], "invariant_violation");
        assert_eq!(v["variant"], "rollup");
        assert!(v["message"].as_str().unwrap().contains("rollup"));
    }
}
