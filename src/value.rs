//! Typed values, the shared environment and the choice registry.
//!
//! An instantiate run owns exactly one [`Environment`] and one
//! [`ChoiceRegistry`]; both are threaded through every file processed in
//! that run and discarded when it ends.

use indexmap::IndexMap;
use std::fmt;

/// A tagged value bound to a template variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A case of a registered choice type, e.g. `Color.red`.
    Symbol { type_name: String, case_index: usize, case_label: String },
}

impl fmt::Display for Value {
    /// Renders the value the way it appears when spliced into a file body.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Symbol { case_label, .. } => write!(f, "{}", case_label),
        }
    }
}

/// Ordered mapping from variable name to its bound value.
///
/// Insertion order is the order in which variables were first declared
/// across the run. A bound name is never rebound.
pub type Environment = IndexMap<String, Value>;

/// An enumerated type created from a `[case|case|...]` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceType {
    /// Variable name with its first letter uppercased.
    pub type_name: String,
    pub cases: Vec<String>,
}

impl ChoiceType {
    pub fn new(type_name: impl Into<String>, cases: Vec<String>) -> Self {
        Self { type_name: type_name.into(), cases }
    }

    /// Builds the symbol value for the case at `index`, if in range.
    pub fn symbol(&self, index: usize) -> Option<Value> {
        self.cases.get(index).map(|case| Value::Symbol {
            type_name: self.type_name.clone(),
            case_index: index,
            case_label: case.clone(),
        })
    }
}

/// Registry of choice types and the case-substitution table for one run.
///
/// The substitution table maps every registered case label to its qualified
/// `Type.case` form so that raw case tokens in expression text become
/// resolvable symbol references. Labels are assumed unique across the run;
/// when they collide the most recent registration wins.
#[derive(Debug, Default)]
pub struct ChoiceRegistry {
    types: IndexMap<String, ChoiceType>,
    substitutions: IndexMap<String, String>,
}

impl ChoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a choice type and extends the substitution table with all of
    /// its case labels.
    pub fn register(&mut self, choice_type: ChoiceType) {
        for case in &choice_type.cases {
            self.substitutions.insert(
                case.clone(),
                format!("{}.{}", choice_type.type_name, case),
            );
        }
        self.types.insert(choice_type.type_name.clone(), choice_type);
    }

    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Resolves a qualified `Type.case` reference into a symbol value.
    pub fn resolve(&self, type_name: &str, case: &str) -> Option<Value> {
        let choice_type = self.types.get(type_name)?;
        let index = choice_type.cases.iter().position(|c| c == case)?;
        choice_type.symbol(index)
    }

    /// Rewrites every whole-token occurrence of a registered case label in
    /// `text` into its qualified `Type.case` form.
    ///
    /// A label inside a longer identifier is not a match, a token
    /// immediately preceded by `.` is already qualified and left alone,
    /// and double-quoted string literals are never rewritten.
    pub fn substitute(&self, text: &str) -> String {
        if self.substitutions.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '"' {
                // Copy the whole string literal untouched.
                out.push(c);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    if chars[i] == '"' {
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            } else if c.is_ascii_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_')
                {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                let qualified = start > 0 && chars[start - 1] == '.';
                match self.substitutions.get(&token) {
                    Some(replacement) if !qualified => out.push_str(replacement),
                    _ => out.push_str(&token),
                }
            } else {
                out.push(c);
                i += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ChoiceRegistry {
        let mut registry = ChoiceRegistry::new();
        registry.register(ChoiceType::new(
            "Color",
            vec!["red".to_string(), "green".to_string()],
        ));
        registry
    }

    #[test]
    fn test_substitute_whole_tokens() {
        let registry = registry();
        assert_eq!(registry.substitute("color == red"), "color == Color.red");
        assert_eq!(registry.substitute("thread == 1"), "thread == 1");
        assert_eq!(registry.substitute("redis"), "redis");
    }

    #[test]
    fn test_substitute_leaves_string_literals_alone() {
        let registry = registry();
        assert_eq!(
            registry.substitute("if color == red then \"out/red.txt\" else \"x\""),
            "if color == Color.red then \"out/red.txt\" else \"x\""
        );
    }

    #[test]
    fn test_substitute_skips_qualified_references() {
        let registry = registry();
        assert_eq!(
            registry.substitute("color == Color.red"),
            "color == Color.red"
        );
    }

    #[test]
    fn test_resolve_symbol() {
        let registry = registry();
        let symbol = registry.resolve("Color", "green").unwrap();
        assert_eq!(
            symbol,
            Value::Symbol {
                type_name: "Color".to_string(),
                case_index: 1,
                case_label: "green".to_string(),
            }
        );
        assert!(registry.resolve("Color", "blue").is_none());
        assert!(registry.resolve("Shape", "red").is_none());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Str("Ada".to_string()).to_string(), "Ada");
        let symbol = registry().resolve("Color", "red").unwrap();
        assert_eq!(symbol.to_string(), "red");
    }
}
