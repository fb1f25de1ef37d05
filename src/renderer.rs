//! Renders a file body by evaluating backtick-delimited expression spans.

use crate::error::{Error, Result};
use crate::expr;
use crate::value::{ChoiceRegistry, Environment};

/// Renders `body` against the shared environment.
///
/// A single backtick toggles expression mode: entering starts buffering,
/// leaving evaluates the buffered text (after case substitution) and
/// splices the value's textual form into the output. A doubled backtick
/// emits one literal backtick instead. Everything else passes through
/// verbatim.
///
/// # Errors
/// * [`Error::Eval`] when a span is malformed or left unterminated at the
///   end of the body
/// * [`Error::UnboundVariable`] when a span references an unbound name
pub fn render_body(
    body: &str,
    env: &Environment,
    registry: &ChoiceRegistry,
) -> Result<String> {
    let mut rendered = String::with_capacity(body.len());
    let mut span = String::new();
    let mut in_expression = false;

    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '`' {
            if chars.get(i + 1) == Some(&'`') {
                rendered.push('`');
                i += 2;
                continue;
            }
            in_expression = !in_expression;
            if !in_expression {
                let value = expr::evaluate(&registry.substitute(&span), env, registry)?
                    .ok_or_else(|| Error::Eval {
                        message: "inline expression produced no value".to_string(),
                    })?;
                rendered.push_str(&value.to_string());
                span.clear();
            }
            i += 1;
        } else {
            if in_expression {
                span.push(chars[i]);
            } else {
                rendered.push(chars[i]);
            }
            i += 1;
        }
    }

    if in_expression {
        return Err(Error::Eval {
            message: "unterminated expression span at end of file".to_string(),
        });
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn env() -> Environment {
        let mut env = Environment::new();
        env.insert("name".to_string(), Value::Str("Ada".to_string()));
        env.insert("count".to_string(), Value::Int(3));
        env
    }

    #[test]
    fn test_plain_body_unchanged() {
        let registry = ChoiceRegistry::new();
        let body = "no expressions here\n";
        assert_eq!(render_body(body, &env(), &registry).unwrap(), body);
    }

    #[test]
    fn test_inline_span_is_evaluated() {
        let registry = ChoiceRegistry::new();
        let out = render_body("Hello, `name`!\n", &env(), &registry).unwrap();
        assert_eq!(out, "Hello, Ada!\n");
    }

    #[test]
    fn test_span_with_arithmetic() {
        let registry = ChoiceRegistry::new();
        let out = render_body("`count * 2` items", &env(), &registry).unwrap();
        assert_eq!(out, "6 items");
    }

    #[test]
    fn test_double_backtick_escapes() {
        let registry = ChoiceRegistry::new();
        let out = render_body("a ``quoted`` word", &env(), &registry).unwrap();
        assert_eq!(out, "a `quoted` word");
    }

    #[test]
    fn test_unbound_reference_fails() {
        let registry = ChoiceRegistry::new();
        let err = render_body("`missing`", &env(), &registry).unwrap_err();
        assert!(matches!(err, Error::UnboundVariable { .. }));
    }

    #[test]
    fn test_unterminated_span_fails() {
        let registry = ChoiceRegistry::new();
        let err = render_body("open `name and on", &env(), &registry).unwrap_err();
        assert!(matches!(err, Error::Eval { .. }));
    }
}
