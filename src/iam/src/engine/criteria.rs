//! Per-scope Must/MustNot criteria extraction
//!
//! Lets a caller holding many candidate resource ids within a known scope
//! decide membership without running the full matcher per candidate.

use crate::pattern::{sanitize, SCOPE_FIELD};
use crate::types::{
    CompiledPolicyDocument, Constraint, CriteriaResult, Effect, ScopeCriteria,
};

/// Summarizes, per scope, which resource ids the policy explicitly requires
/// or excludes for `action`.
///
/// Statements are selected by their action matchers; each of their resource
/// patterns then contributes according to its trailing path:
///
/// * bare `*` under an Allow: the scope key is recorded with no
///   constraints (unconstrained allow);
/// * a concrete resource path under an Allow: its final segment joins the
///   scope's `Must` list;
/// * a concrete resource path under a Deny: its final segment joins the
///   scope's `MustNot` list.
///
/// Patterns with partial wildcards, with an empty or wildcard scope
/// segment, or a bare `*` under a Deny contribute nothing. A scope absent
/// from the result is not covered for the action at all.
pub fn get_action_criteria(action: &str, policy: &CompiledPolicyDocument) -> CriteriaResult {
    let mut result = CriteriaResult::new();
    for statement in policy.statements() {
        if !statement.action_matchers.iter().any(|m| m.matches(action)) {
            continue;
        }
        for raw in statement.resource.iter() {
            apply_pattern(&mut result, statement.effect, raw);
        }
    }
    result
}

fn apply_pattern(result: &mut CriteriaResult, effect: Effect, raw: &str) {
    let clean = sanitize(raw);
    let fields: Vec<&str> = clean.split(':').collect();
    if fields.len() <= SCOPE_FIELD + 1 {
        return;
    }

    let scope = fields[SCOPE_FIELD];
    if scope.is_empty() || scope.contains('*') {
        // No tenant boundary to bucket under
        return;
    }

    let path = fields[SCOPE_FIELD + 1..].join(":");
    if path == "*" {
        if effect == Effect::Allow {
            result.entry(scope.to_string()).or_default();
        }
        return;
    }
    if path.contains('*') {
        return;
    }

    let id = path.rsplit('/').next().unwrap_or(path.as_str());
    let constraint = Constraint::resource(id);
    let criteria: &mut ScopeCriteria = result.entry(scope.to_string()).or_default();
    let list = match effect {
        Effect::Allow => &mut criteria.must,
        Effect::Deny => &mut criteria.must_not,
    };
    if !list.contains(&constraint) {
        list.push(constraint);
    }
}
