//! Wildcard pattern compilation
//!
//! Resource identifiers are colon-delimited
//! (`organisation:partition:service:region:scope:path`) with a trailing
//! `/`-separated path; action names are short colon-delimited identifiers.
//! A `*` in a resource pattern expands to zero or more path segments, a `*`
//! in an action pattern to zero or more alphanumeric characters. Compiled
//! matchers are anchored: a pattern without wildcards accepts exactly its
//! sanitized literal and nothing else.
//!
//! Compiled matchers are cached process-wide, keyed by the sanitized
//! pattern. Entries are immutable once inserted, so reads need no
//! synchronization beyond the map itself.


use dashmap::DashMap;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::trace;

use crate::error::{IamError, Result};

/// Index of the scope (account/tenant) field in the colon layout
pub(crate) const SCOPE_FIELD: usize = 4;

/// Resource wildcard expansion: zero or more `/`-separated path segments
const RESOURCE_WILDCARD: &str = "([0-9A-Za-z_]+/?)*";

/// Action wildcard expansion: zero or more alphanumeric characters
const ACTION_WILDCARD: &str = "([0-9A-Za-z]+)*";

/// Strips zero-width and other invisible format characters from an authored
/// pattern, so copy-pasted identifiers behave as if the characters were
/// absent.
///
/// Only authored patterns are sanitized; request-time resource and action
/// strings are matched as given.
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| !is_invisible(*c)).collect()
}

/// Invisible/zero-width characters stripped by [`sanitize`]
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{034F}'
            | '\u{180B}'..='\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{206A}'..='\u{206F}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
    )
}

/// A compiled, full-string acceptance test for one wildcard pattern.
///
/// Cheap to clone; the underlying regex is shared.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Arc<Regex>,
}

impl Matcher {
    /// Whether the candidate matches the whole pattern
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The anchored regex source, for diagnostics and fixtures
    pub fn as_pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// Pattern namespace: resource and action wildcards expand differently,
/// so identical raw strings must not share cache entries across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PatternKind {
    Resource,
    Action,
}

/// Process-wide compiled-pattern cache. Empty at startup, never torn down;
/// entries are inserted once and never mutated.
fn cache() -> &'static DashMap<(PatternKind, String), Matcher> {
    static CACHE: OnceLock<DashMap<(PatternKind, String), Matcher>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Compiles a resource pattern into an anchored matcher.
pub fn compile_resource_pattern(raw: &str) -> Result<Matcher> {
    compile(PatternKind::Resource, raw)
}

/// Compiles an action pattern into an anchored matcher.
pub fn compile_action_pattern(raw: &str) -> Result<Matcher> {
    compile(PatternKind::Action, raw)
}

fn compile(kind: PatternKind, raw: &str) -> Result<Matcher> {
    let clean = sanitize(raw);
    if clean.is_empty() {
        return Err(IamError::InvalidPattern(format!(
            "pattern {raw:?} is empty after sanitization"
        )));
    }

    if let Some(cached) = cache().get(&(kind, clean.clone())) {
        return Ok(cached.clone());
    }

    validate_wildcard_literals(kind, &clean)?;

    let source = match kind {
        PatternKind::Resource => translate_resource(&clean),
        PatternKind::Action => translate_action(&clean),
    };
    trace!("compiled {:?} pattern {:?} -> {}", kind, clean, source);

    let regex = Regex::new(&source)
        .map_err(|e| IamError::InvalidPattern(format!("{clean:?}: {e}")))?;
    let matcher = Matcher {
        regex: Arc::new(regex),
    };
    cache().insert((kind, clean), matcher.clone());
    Ok(matcher)
}

/// Rejects literals that sit in the same segment as a wildcard but fall
/// outside the charset that wildcard expands to. Such a pattern could
/// never match anything the wildcard produces.
fn validate_wildcard_literals(kind: PatternKind, pattern: &str) -> Result<()> {
    // Literals must stay inside the charset their wildcard expands to:
    // [0-9A-Za-z_] for resource path segments, [0-9A-Za-z] for actions.
    let allowed = |c: char| match kind {
        PatternKind::Resource => c.is_ascii_alphanumeric() || c == '_',
        PatternKind::Action => c.is_ascii_alphanumeric(),
    };
    for field in pattern.split(':') {
        let segments: Vec<&str> = match kind {
            PatternKind::Resource => field.split('/').collect(),
            PatternKind::Action => vec![field],
        };
        for segment in segments {
            if !segment.contains('*') {
                continue;
            }
            if let Some(bad) = segment.chars().find(|&c| c != '*' && !allowed(c)) {
                return Err(IamError::InvalidPattern(format!(
                    "literal {bad:?} adjacent to wildcard in {pattern:?}"
                )));
            }
        }
    }
    Ok(())
}

/// Translates a sanitized resource pattern into anchored regex source.
///
/// Each colon field is translated independently: literal runs are escaped,
/// each `*` becomes [`RESOURCE_WILDCARD`]. When the trailing path field is
/// the bare wildcard, the scope field is emitted as optional: the wildcard
/// absorbs an empty scope segment, so a scope-level `...::608:*` grant
/// matches `...:::search`. Deployed policies rely on this known looseness;
/// do not tighten it without product sign-off. A non-empty scope mismatch
/// (`100` vs `101`) still fails.
fn translate_resource(pattern: &str) -> String {
    let fields: Vec<&str> = pattern.split(':').collect();
    let mut source = String::with_capacity(pattern.len() + 32);
    source.push('^');
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            source.push(':');
        }
        if idx == SCOPE_FIELD && scope_is_absorbed(&fields) {
            source.push_str("(?:");
            source.push_str(&regex::escape(field));
            source.push_str(")?");
        } else {
            source.push_str(&expand_field(field, RESOURCE_WILDCARD));
        }
    }
    source.push('$');
    source
}

/// True when the trailing path is the bare wildcard and the scope field is
/// a plain literal, the one layout where the wildcard absorbs the scope.
fn scope_is_absorbed(fields: &[&str]) -> bool {
    fields.len() == SCOPE_FIELD + 2
        && fields[SCOPE_FIELD + 1] == "*"
        && !fields[SCOPE_FIELD].is_empty()
        && !fields[SCOPE_FIELD].contains('*')
}

/// Translates a sanitized action pattern into anchored regex source.
fn translate_action(pattern: &str) -> String {
    format!("^{}$", expand_field(pattern, ACTION_WILDCARD))
}

/// Escapes literal runs and substitutes every `*` with the expansion
fn expand_field(field: &str, wildcard: &str) -> String {
    field
        .split('*')
        .map(|literal| regex::escape(literal))
        .collect::<Vec<_>>()
        .join(wildcard)
}
