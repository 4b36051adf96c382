//! Policy document and criteria types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::pattern::Matcher;

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the action on the resource
    Allow,
    /// Refuse the action on the resource, overriding any allow
    Deny,
}

/// A pattern field authored as either a single string or a list of strings.
///
/// The authored shape is preserved through compilation and re-serialization,
/// so a scalar `"Action": "CanRead"` is echoed back as a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSet {
    /// Single pattern
    One(String),
    /// Ordered list of patterns
    Many(Vec<String>),
}

impl PatternSet {
    /// View the patterns as a slice, regardless of authored shape
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(pattern) => std::slice::from_ref(pattern),
            Self::Many(patterns) => patterns.as_slice(),
        }
    }

    /// Iterate the patterns in authored order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.as_slice().iter()
    }

    /// Number of patterns in the field
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True if the field holds no patterns (an empty authored list)
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for PatternSet {
    fn from(pattern: &str) -> Self {
        Self::One(pattern.to_string())
    }
}

impl From<Vec<String>> for PatternSet {
    fn from(patterns: Vec<String>) -> Self {
        Self::Many(patterns)
    }
}

/// One Allow/Deny rule as authored.
///
/// The effect is kept as a raw string here so that an unknown value is
/// reported as [`IamError::InvalidEffect`](crate::IamError::InvalidEffect)
/// during compilation rather than as a deserialization failure. Missing
/// Action/Resource fields are likewise deferred to compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Raw effect string, validated at compile time
    #[serde(rename = "Effect")]
    pub effect: String,

    /// Action pattern(s)
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<PatternSet>,

    /// Resource pattern(s)
    #[serde(rename = "Resource", default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<PatternSet>,
}

/// An ordered policy document as supplied by the caller.
///
/// Statement order is preserved for traceability; it does not affect
/// decisions because deny always overrides allow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Statements in authored order
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

/// A statement with its compiled matchers attached.
///
/// The matcher lists are parallel in length and order to the raw
/// Action/Resource patterns. Matchers are internal and never serialized.
#[derive(Debug, Clone)]
pub struct CompiledStatement {
    /// Validated effect
    pub effect: Effect,
    /// Raw action patterns, original shape preserved
    pub action: PatternSet,
    /// Raw resource patterns, original shape preserved
    pub resource: PatternSet,
    /// One matcher per action pattern, in source order
    pub action_matchers: Vec<Matcher>,
    /// One matcher per resource pattern, in source order
    pub resource_matchers: Vec<Matcher>,
}

/// An immutable compiled policy.
///
/// Only [`compile`](crate::compile) constructs this type, so evaluation
/// can assume every statement carries validated matchers. A compiled
/// document is read-only and may be shared freely across threads.
#[derive(Debug, Clone)]
pub struct CompiledPolicyDocument {
    pub(crate) statements: Vec<CompiledStatement>,
}

impl CompiledPolicyDocument {
    /// Compiled statements in authored order
    pub fn statements(&self) -> &[CompiledStatement] {
        &self.statements
    }
}

/// Kind of criteria constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Constraint on a single resource id
    Resource,
}

/// A single excluded or required resource id within a scope.
///
/// Serializes as `{"type": "resource", "id": "1500"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint kind
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    /// Resource id, the final path segment of the authored pattern
    pub id: String,
}

impl Constraint {
    /// Resource-id constraint
    pub fn resource(id: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::Resource,
            id: id.into(),
        }
    }
}

/// Per-scope inclusion/exclusion constraints for one action.
///
/// Interpretation: with an empty `Must` and a non-empty `MustNot`, a
/// resource id is authorized iff it is not listed in `MustNot`. With a
/// non-empty `Must`, a resource id is authorized iff it is listed in
/// `Must` and not in `MustNot`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCriteria {
    /// Explicitly required resource ids, duplicate-free, insertion order
    #[serde(rename = "Must")]
    pub must: Vec<Constraint>,
    /// Explicitly excluded resource ids, duplicate-free, insertion order
    #[serde(rename = "MustNot")]
    pub must_not: Vec<Constraint>,
}

/// Mapping from scope id to its criteria.
///
/// A scope absent from the map means the action is not covered for that
/// scope at all.
pub type CriteriaResult = BTreeMap<String, ScopeCriteria>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_set_deserializes_scalar_and_list() {
        let scalar: PatternSet = serde_json::from_str("\"CanRead\"").unwrap();
        assert_eq!(scalar, PatternSet::One("CanRead".to_string()));
        assert_eq!(scalar.len(), 1);

        let list: PatternSet = serde_json::from_str("[\"CanRead\", \"CanView\"]").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_slice()[1], "CanView");
    }

    #[test]
    fn statement_round_trips_scalar_shape() {
        let json = serde_json::json!({
            "Effect": "Allow",
            "Action": "CanRead",
            "Resource": ["organisation:partition:iam::100:resource/2"]
        });

        let statement: Statement = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(
            statement.action,
            Some(PatternSet::One("CanRead".to_string()))
        );

        let echoed = serde_json::to_value(&statement).unwrap();
        assert_eq!(echoed, json);
    }

    #[test]
    fn constraint_serializes_with_type_tag() {
        let constraint = Constraint::resource("1500");
        let json = serde_json::to_value(&constraint).unwrap();
        assert_eq!(json, serde_json::json!({"type": "resource", "id": "1500"}));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let statement: Statement =
            serde_json::from_value(serde_json::json!({"Effect": "Allow"})).unwrap();
        assert!(statement.action.is_none());
        assert!(statement.resource.is_none());
    }
}
