//! Cross-field invariants, declared as data.
//!
//! Each payload type lists its rules in [`Payload::INVARIANTS`]. The
//! registry and the factories both call [`enforce`], which walks the table
//! in declared order and reports the first failure.

use crate::error::DecodeError;
use crate::value::Payload;

/// A named predicate over one variant payload.
pub struct Invariant<C> {
    pub name: &'static str,
    pub check: fn(&C) -> Result<(), String>,
}

impl<C> Clone for Invariant<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Invariant<C> {}

impl<C> std::fmt::Debug for Invariant<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invariant").field("name", &self.name).finish()
    }
}

/// Runs every invariant of `C` against `payload`, fail-fast.
pub fn enforce<C: Payload>(variant: &str, payload: &C) -> Result<(), DecodeError> {
    for inv in C::INVARIANTS {
        (inv.check)(payload).map_err(|reason| DecodeError::invariant(variant, reason))?;
    }
    Ok(())
}

// ── Predicate helpers ───────────────────────────────────────────────

fn field_list(fields: &[(&str, bool)]) -> String {
    fields
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Either-or: at least one of the named fields must be present.
pub fn require_any(fields: &[(&str, bool)]) -> Result<(), String> {
    if fields.iter().any(|(_, present)| *present) {
        Ok(())
    } else {
        Err(format!("{} is required", field_list(fields)))
    }
}

/// Conditional requirement: like [`require_any`], but only when `active`.
/// `condition` describes the triggering state for the error message.
pub fn require_any_when(
    active: bool,
    condition: &str,
    fields: &[(&str, bool)],
) -> Result<(), String> {
    if !active {
        return Ok(());
    }
    require_any(fields).map_err(|reason| format!("{} when {}", reason, condition))
}

/// Exactly one of `allowed` must be present; `present` lists what was found.
pub fn exactly_one(what: &str, allowed: &[&str], present: &[&str]) -> Result<(), String> {
    match present.len() {
        1 => Ok(()),
        0 => Err(format!(
            "expected exactly one {}, found none (allowed: {})",
            what,
            allowed.join(", ")
        )),
        _ => Err(format!(
            "expected exactly one {}, found {}: {}",
            what,
            present.len(),
            present.join(", ")
        )),
    }
}

/// Structural nesting limit.
pub fn within_depth(what: &str, depth: usize, limit: usize) -> Result<(), String> {
    if depth <= limit {
        Ok(())
    } else {
        Err(format!(
            "{} nested {} levels deep, at most {} allowed",
            what, depth, limit
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ObjectWriter;
    use serde_json::Value;

    #[derive(Debug, PartialEq)]
    struct Pair {
        a: Option<String>,
        b: Option<String>,
        strict: bool,
    }

    impl Pair {
        fn a_or_b(&self) -> Result<(), String> {
            require_any(&[("a", self.a.is_some()), ("b", self.b.is_some())])
        }

        fn strict_needs_a(&self) -> Result<(), String> {
            require_any_when(self.strict, "strict is set", &[("a", self.a.is_some())])
        }
    }

    impl Payload for Pair {
        const INVARIANTS: &'static [Invariant<Self>] = &[
            Invariant {
                name: "a_or_b",
                check: Self::a_or_b,
            },
            Invariant {
                name: "strict_needs_a",
                check: Self::strict_needs_a,
            },
        ];

        fn decode(_tree: &Value, _path: &str) -> Result<Self, DecodeError> {
            unreachable!("not decoded in these tests")
        }

        fn encode(&self) -> Value {
            ObjectWriter::new().finish()
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let p = Pair {
            a: None,
            b: None,
            strict: true,
        };
        let err = enforce("pair", &p).unwrap_err();
        assert_eq!(err, DecodeError::invariant("pair", "a or b is required"));
    }

    #[test]
    fn test_conditional_rule_only_when_active() {
        let lenient = Pair {
            a: None,
            b: Some("x".into()),
            strict: false,
        };
        assert!(enforce("pair", &lenient).is_ok());

        let strict = Pair {
            strict: true,
            ..lenient
        };
        let err = enforce("pair", &strict).unwrap_err();
        assert_eq!(
            err,
            DecodeError::invariant("pair", "a is required when strict is set")
        );
    }

    #[test]
    fn test_exactly_one() {
        assert!(exactly_one("operator", &["x", "y"], &["x"]).is_ok());
        assert!(exactly_one("operator", &["x", "y"], &[])
            .unwrap_err()
            .contains("found none"));
        assert!(exactly_one("operator", &["x", "y"], &["x", "y"])
            .unwrap_err()
            .contains("found 2"));
    }

    #[test]
    fn test_within_depth() {
        assert!(within_depth("filter", 2, 2).is_ok());
        assert_eq!(
            within_depth("filter", 3, 2).unwrap_err(),
            "filter nested 3 levels deep, at most 2 allowed"
        );
    }
}
