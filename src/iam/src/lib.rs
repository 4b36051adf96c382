//! # SSRN IAM policy evaluator
//!
//! Evaluates declarative Allow/Deny policy documents over SSRN resource
//! names (`organisation:partition:service:region:scope:path`) and wildcard
//! action names.
//!
//! The pipeline is one-way: a raw [`PolicyDocument`] is compiled once
//! (sanitizing every authored pattern and attaching an anchored matcher per
//! pattern), and the resulting [`CompiledPolicyDocument`] is then consumed
//! read-only by [`authorize`] (deny-overrides-allow, implicit default deny)
//! and [`get_action_criteria`] (per-scope Must/MustNot constraint summary).
//! All operations are synchronous and pure; a compiled document can be
//! shared across threads without synchronization.
//!
//! ## Example
//!
//! ```rust
//! use ssrn_iam::{authorize, compile, PolicyDocument};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc: PolicyDocument = serde_json::from_value(serde_json::json!({
//!     "Statement": [{
//!         "Effect": "Allow",
//!         "Action": ["CanRead"],
//!         "Resource": ["organisation:partition:iam::100:resource/*"]
//!     }]
//! }))?;
//!
//! let policy = compile(&doc)?;
//! assert!(authorize(
//!     "organisation:partition:iam::100:resource/2",
//!     "CanRead",
//!     &policy,
//! ));
//! assert!(!authorize(
//!     "organisation:partition:iam::100:resource/2",
//!     "CanUpdate",
//!     &policy,
//! ));
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod types;

// Re-export the operations and boundary types
pub use compiler::compile;
pub use engine::{authorize, get_action_criteria};
pub use error::{IamError, Result};
pub use pattern::{sanitize, Matcher};
pub use types::{
    CompiledPolicyDocument, CompiledStatement, Constraint, ConstraintKind,
    CriteriaResult, Effect, PatternSet, PolicyDocument, ScopeCriteria, Statement,
};
