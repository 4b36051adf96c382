//! Policy document compilation

use tracing::debug;

use crate::error::{IamError, Result};
use crate::pattern::{compile_action_pattern, compile_resource_pattern};
use crate::types::{
    CompiledPolicyDocument, CompiledStatement, Effect, PolicyDocument, Statement,
};

/// Compiles a raw policy document, attaching one matcher per authored
/// pattern in source order.
///
/// The caller-supplied document is not mutated; matchers are always
/// recomputed from the raw Action/Resource fields, so recompiling the same
/// document yields behaviorally identical matchers.
///
/// # Errors
///
/// * [`IamError::InvalidEffect`] if Effect is not exactly "Allow" or "Deny"
/// * [`IamError::MalformedStatement`] if Action or Resource is missing
/// * [`IamError::InvalidPattern`] if a pattern is empty after sanitization,
///   or a literal adjacent to a wildcard violates the wildcard charset
pub fn compile(doc: &PolicyDocument) -> Result<CompiledPolicyDocument> {
    let mut statements = Vec::with_capacity(doc.statement.len());
    for (idx, statement) in doc.statement.iter().enumerate() {
        statements.push(compile_statement(idx, statement)?);
    }
    debug!("compiled policy document with {} statements", statements.len());
    Ok(CompiledPolicyDocument { statements })
}

fn compile_statement(idx: usize, statement: &Statement) -> Result<CompiledStatement> {
    let effect = parse_effect(&statement.effect)?;

    let action = statement.action.clone().ok_or_else(|| {
        IamError::MalformedStatement(format!("statement {idx} has no Action"))
    })?;
    let resource = statement.resource.clone().ok_or_else(|| {
        IamError::MalformedStatement(format!("statement {idx} has no Resource"))
    })?;

    let mut action_matchers = Vec::with_capacity(action.len());
    for raw in action.iter() {
        action_matchers.push(compile_action_pattern(raw)?);
    }

    let mut resource_matchers = Vec::with_capacity(resource.len());
    for raw in resource.iter() {
        resource_matchers.push(compile_resource_pattern(raw)?);
    }

    debug_assert_eq!(action_matchers.len(), action.len());
    debug_assert_eq!(resource_matchers.len(), resource.len());

    Ok(CompiledStatement {
        effect,
        action,
        resource,
        action_matchers,
        resource_matchers,
    })
}

fn parse_effect(raw: &str) -> Result<Effect> {
    match raw {
        "Allow" => Ok(Effect::Allow),
        "Deny" => Ok(Effect::Deny),
        other => Err(IamError::InvalidEffect(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternSet;

    fn statement(effect: &str, action: &str, resource: &str) -> Statement {
        Statement {
            effect: effect.to_string(),
            action: Some(PatternSet::from(action)),
            resource: Some(PatternSet::from(resource)),
        }
    }

    #[test]
    fn compiles_one_matcher_per_pattern() {
        let doc = PolicyDocument {
            statement: vec![Statement {
                effect: "Allow".to_string(),
                action: Some(PatternSet::Many(vec![
                    "*Read".to_string(),
                    "CanView".to_string(),
                ])),
                resource: Some(PatternSet::Many(vec![
                    "organisation:partition:iam::100:*".to_string(),
                    "organisation:partition:iam::200:*".to_string(),
                ])),
            }],
        };

        let compiled = compile(&doc).unwrap();
        let statement = &compiled.statements()[0];
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.action_matchers.len(), statement.action.len());
        assert_eq!(statement.resource_matchers.len(), statement.resource.len());
    }

    #[test]
    fn preserves_scalar_shape() {
        let doc = PolicyDocument {
            statement: vec![statement(
                "Allow",
                "CanRead",
                "organisation:partition:iam::100:resource/2",
            )],
        };

        let compiled = compile(&doc).unwrap();
        let statement = &compiled.statements()[0];
        assert_eq!(statement.action, PatternSet::One("CanRead".to_string()));
        assert_eq!(statement.action_matchers.len(), 1);
    }

    #[test]
    fn rejects_unknown_effect() {
        let doc = PolicyDocument {
            statement: vec![statement("Permit", "CanRead", "a:b:c::100:r/1")],
        };
        assert!(matches!(
            compile(&doc),
            Err(IamError::InvalidEffect(effect)) if effect == "Permit"
        ));
    }

    #[test]
    fn rejects_missing_action() {
        let doc = PolicyDocument {
            statement: vec![Statement {
                effect: "Allow".to_string(),
                action: None,
                resource: Some(PatternSet::from("a:b:c::100:r/1")),
            }],
        };
        assert!(matches!(
            compile(&doc),
            Err(IamError::MalformedStatement(_))
        ));
    }

    #[test]
    fn rejects_missing_resource() {
        let doc = PolicyDocument {
            statement: vec![Statement {
                effect: "Deny".to_string(),
                action: Some(PatternSet::from("CanRead")),
                resource: None,
            }],
        };
        assert!(matches!(
            compile(&doc),
            Err(IamError::MalformedStatement(_))
        ));
    }

    #[test]
    fn rejects_empty_pattern() {
        let doc = PolicyDocument {
            statement: vec![statement("Allow", "\u{200B}", "a:b:c::100:r/1")],
        };
        assert!(matches!(compile(&doc), Err(IamError::InvalidPattern(_))));
    }

    #[test]
    fn recompilation_is_behaviorally_identical() {
        let doc = PolicyDocument {
            statement: vec![statement(
                "Allow",
                "Can*",
                "organisation:partition:iam::100:*",
            )],
        };

        let first = compile(&doc).unwrap();
        let second = compile(&doc).unwrap();
        let a = &first.statements()[0].resource_matchers[0];
        let b = &second.statements()[0].resource_matchers[0];
        assert_eq!(a.as_pattern(), b.as_pattern());
    }
}
