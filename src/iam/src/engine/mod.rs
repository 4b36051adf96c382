//! Policy evaluation
//!
//! Read-only consumers of a compiled policy: the authorizer decides a
//! single (resource, action) request, the criteria extractor summarizes
//! per-scope constraints for one action.

mod criteria;

pub use criteria::get_action_criteria;

use tracing::debug;

use crate::types::{CompiledPolicyDocument, CompiledStatement, Effect};

/// Decides whether `action` on `resource_id` is authorized.
///
/// A statement matches the request iff at least one of its action matchers
/// accepts the action and at least one of its resource matchers accepts the
/// resource. Any matching Deny forces a `false` result; otherwise the
/// result is `true` iff some Allow matched (implicit default deny).
///
/// Pure function of its inputs: no side effects, deterministic, and safe to
/// call concurrently on a shared compiled document.
pub fn authorize(resource_id: &str, action: &str, policy: &CompiledPolicyDocument) -> bool {
    let mut allowed = false;
    for statement in policy.statements() {
        if !statement_matches(statement, resource_id, action) {
            continue;
        }
        match statement.effect {
            Effect::Deny => {
                debug!("explicit deny: resource={}, action={}", resource_id, action);
                return false;
            }
            Effect::Allow => allowed = true,
        }
    }
    debug!(
        "decision: resource={}, action={}, allowed={}",
        resource_id, action, allowed
    );
    allowed
}

fn statement_matches(statement: &CompiledStatement, resource_id: &str, action: &str) -> bool {
    statement.action_matchers.iter().any(|m| m.matches(action))
        && statement
            .resource_matchers
            .iter()
            .any(|m| m.matches(resource_id))
}
