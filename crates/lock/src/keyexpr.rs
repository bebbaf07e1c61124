//! Dynamic lock-key expressions over call-site arguments.
//!
//! A key expression concatenates single-quoted literals and `#` argument
//! references with `+`, e.g.:
//!
//! ```text
//! 'account:' + #from + ':to:' + #to
//! #order.id
//! 'job:' + #p0
//! ```
//!
//! Arguments are bound by declared name and, as a fallback for call sites
//! where names are unavailable, by position as `p0`, `p1`, ... Both forms
//! resolve to the same bound values for the same call.

use std::collections::HashMap;

use serde_json::Value;

/// Why a key expression failed to evaluate.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyExpressionError {
    #[error("parse error at byte {at}: {message}")]
    Parse { at: usize, message: String },

    #[error("unknown argument reference: #{0}")]
    UnknownArgument(String),

    #[error("no field `{field}` on argument #{root}")]
    UnknownField { root: String, field: String },

    #[error("argument #{0} is not a scalar value")]
    NonScalar(String),

    #[error("expression evaluated to an empty key")]
    Empty,
}

// ---------------------------------------------------------------------------
// Argument binding context
// ---------------------------------------------------------------------------

/// Flat name/position binding of one call's arguments.
#[derive(Debug, Clone, Default)]
pub struct LockContext {
    by_name: HashMap<String, Value>,
    positional: Vec<Value>,
}

impl LockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the next argument under `name`. The value is also reachable
    /// positionally as `p{n}` where `n` is the number of earlier binds.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.by_name.insert(name.into(), value.clone());
        self.positional.push(value);
        self
    }

    /// Bind an argument with no declared name; reachable only as `p{n}`.
    pub fn bind_positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    fn resolve(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.by_name.get(name) {
            return Some(value);
        }
        // Positional fallback: p0, p1, ... -- only when no argument was
        // explicitly bound under that name.
        name.strip_prefix('p')
            .and_then(|rest| rest.parse::<usize>().ok())
            .and_then(|idx| self.positional.get(idx))
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate `expression` against `ctx`, producing the lock key.
pub fn evaluate(expression: &str, ctx: &LockContext) -> Result<String, KeyExpressionError> {
    let terms = parse(expression)?;
    let mut out = String::new();
    for term in &terms {
        match term {
            Term::Literal(text) => out.push_str(text),
            Term::Reference { root, path } => out.push_str(&resolve_reference(ctx, root, path)?),
        }
    }
    if out.is_empty() {
        return Err(KeyExpressionError::Empty);
    }
    Ok(out)
}

fn resolve_reference(
    ctx: &LockContext,
    root: &str,
    path: &[String],
) -> Result<String, KeyExpressionError> {
    let mut value = ctx
        .resolve(root)
        .ok_or_else(|| KeyExpressionError::UnknownArgument(root.to_string()))?;

    for field in path {
        value = value
            .get(field)
            .ok_or_else(|| KeyExpressionError::UnknownField {
                root: root.to_string(),
                field: field.clone(),
            })?;
    }

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        // Match the source convention: null renders as the empty string.
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => {
            Err(KeyExpressionError::NonScalar(root.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Term {
    Literal(String),
    Reference { root: String, path: Vec<String> },
}

fn parse(expression: &str) -> Result<Vec<Term>, KeyExpressionError> {
    let bytes = expression.as_bytes();
    let mut pos = 0;
    let mut terms = Vec::new();
    let mut expect_term = true;

    loop {
        skip_spaces(bytes, &mut pos);
        if pos >= bytes.len() {
            break;
        }
        if expect_term {
            match bytes[pos] {
                b'\'' => terms.push(parse_literal(expression, &mut pos)?),
                b'#' => terms.push(parse_reference(expression, &mut pos)?),
                _ => {
                    return Err(KeyExpressionError::Parse {
                        at: pos,
                        message: "expected a 'literal' or #argument reference".to_string(),
                    })
                }
            }
            expect_term = false;
        } else {
            if bytes[pos] != b'+' {
                return Err(KeyExpressionError::Parse {
                    at: pos,
                    message: "expected `+` between terms".to_string(),
                });
            }
            pos += 1;
            expect_term = true;
        }
    }

    if expect_term {
        return Err(KeyExpressionError::Parse {
            at: pos,
            message: if terms.is_empty() {
                "empty expression".to_string()
            } else {
                "dangling `+`".to_string()
            },
        });
    }
    Ok(terms)
}

fn skip_spaces(bytes: &[u8], pos: &mut usize) {
    while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
}

fn parse_literal(expression: &str, pos: &mut usize) -> Result<Term, KeyExpressionError> {
    let bytes = expression.as_bytes();
    let start = *pos;
    *pos += 1; // opening quote
    let content_start = *pos;
    while *pos < bytes.len() && bytes[*pos] != b'\'' {
        *pos += 1;
    }
    if *pos >= bytes.len() {
        return Err(KeyExpressionError::Parse {
            at: start,
            message: "unterminated string literal".to_string(),
        });
    }
    let text = expression[content_start..*pos].to_string();
    *pos += 1; // closing quote
    Ok(Term::Literal(text))
}

fn parse_reference(expression: &str, pos: &mut usize) -> Result<Term, KeyExpressionError> {
    let bytes = expression.as_bytes();
    *pos += 1; // '#'
    let root = parse_ident(expression, pos)?;
    let mut path = Vec::new();
    while *pos < bytes.len() && bytes[*pos] == b'.' {
        *pos += 1;
        path.push(parse_ident(expression, pos)?);
    }
    Ok(Term::Reference { root, path })
}

fn parse_ident(expression: &str, pos: &mut usize) -> Result<String, KeyExpressionError> {
    let bytes = expression.as_bytes();
    let start = *pos;
    while *pos < bytes.len() && (bytes[*pos].is_ascii_alphanumeric() || bytes[*pos] == b'_') {
        *pos += 1;
    }
    if *pos == start {
        return Err(KeyExpressionError::Parse {
            at: start,
            message: "expected an identifier".to_string(),
        });
    }
    Ok(expression[start..*pos].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_only() {
        let ctx = LockContext::new();
        assert_eq!(evaluate("'inventory:sync'", &ctx).unwrap(), "inventory:sync");
    }

    #[test]
    fn test_named_reference() {
        let ctx = LockContext::new().bind("userId", 42);
        assert_eq!(evaluate("#userId", &ctx).unwrap(), "42");
    }

    #[test]
    fn test_concatenation() {
        let ctx = LockContext::new().bind("from", "A").bind("to", "B");
        assert_eq!(
            evaluate("'account:' + #from + ':to:' + #to", &ctx).unwrap(),
            "account:A:to:B"
        );
    }

    #[test]
    fn test_field_path_traversal() {
        let ctx = LockContext::new().bind("order", json!({ "id": 9001, "buyer": { "id": 7 } }));
        assert_eq!(evaluate("#order.id", &ctx).unwrap(), "9001");
        assert_eq!(evaluate("'buyer:' + #order.buyer.id", &ctx).unwrap(), "buyer:7");
    }

    #[test]
    fn test_positional_fallback_matches_named_binding() {
        let ctx = LockContext::new().bind("orderId", 5).bind("region", "eu");
        // Name and position resolve to the same bound values.
        assert_eq!(evaluate("#orderId", &ctx).unwrap(), evaluate("#p0", &ctx).unwrap());
        assert_eq!(evaluate("#region", &ctx).unwrap(), evaluate("#p1", &ctx).unwrap());
    }

    #[test]
    fn test_explicit_binding_shadows_positional_name() {
        // An argument literally named `p1` wins over the positional fallback.
        let ctx = LockContext::new().bind("p1", "named").bind("other", "positional");
        assert_eq!(evaluate("#p1", &ctx).unwrap(), "named");
    }

    #[test]
    fn test_unknown_argument_is_an_error() {
        let ctx = LockContext::new();
        assert_eq!(
            evaluate("#ghost", &ctx).unwrap_err(),
            KeyExpressionError::UnknownArgument("ghost".to_string())
        );
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let ctx = LockContext::new().bind("order", json!({ "id": 1 }));
        assert_eq!(
            evaluate("#order.missing", &ctx).unwrap_err(),
            KeyExpressionError::UnknownField {
                root: "order".to_string(),
                field: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_non_scalar_reference_is_an_error() {
        let ctx = LockContext::new().bind("order", json!({ "id": 1 }));
        assert_eq!(
            evaluate("#order", &ctx).unwrap_err(),
            KeyExpressionError::NonScalar("order".to_string())
        );
    }

    #[test]
    fn test_null_renders_empty_and_empty_key_is_an_error() {
        let ctx = LockContext::new().bind("maybe", Value::Null);
        assert_eq!(evaluate("'k:' + #maybe", &ctx).unwrap(), "k:");
        assert_eq!(evaluate("#maybe", &ctx).unwrap_err(), KeyExpressionError::Empty);
    }

    #[test]
    fn test_parse_errors() {
        let ctx = LockContext::new();
        assert!(matches!(
            evaluate("'unterminated", &ctx).unwrap_err(),
            KeyExpressionError::Parse { .. }
        ));
        assert!(matches!(
            evaluate("#a #b", &ctx).unwrap_err(),
            KeyExpressionError::Parse { .. }
        ));
        assert!(matches!(
            evaluate("#a +", &ctx).unwrap_err(),
            KeyExpressionError::Parse { .. }
        ));
        assert!(matches!(
            evaluate("", &ctx).unwrap_err(),
            KeyExpressionError::Parse { .. }
        ));
    }
}
