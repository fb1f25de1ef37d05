use tmpl::error::Error;
use tmpl::expr::evaluate;
use tmpl::value::{ChoiceRegistry, ChoiceType, Environment, Value};

fn env() -> Environment {
    let mut env = Environment::new();
    env.insert("name".to_string(), Value::Str("Ada".to_string()));
    env.insert("count".to_string(), Value::Int(4));
    env.insert("ratio".to_string(), Value::Float(0.5));
    env.insert("gui".to_string(), Value::Bool(true));
    env
}

fn registry() -> ChoiceRegistry {
    let mut registry = ChoiceRegistry::new();
    registry.register(ChoiceType::new(
        "Color",
        vec!["red".to_string(), "green".to_string()],
    ));
    registry
}

fn eval(source: &str) -> Option<Value> {
    evaluate(source, &env(), &registry()).unwrap()
}

#[test]
fn test_literals() {
    assert_eq!(eval("42"), Some(Value::Int(42)));
    assert_eq!(eval("2.5"), Some(Value::Float(2.5)));
    assert_eq!(eval("\"hi\""), Some(Value::Str("hi".to_string())));
    assert_eq!(eval("true"), Some(Value::Bool(true)));
    assert_eq!(eval("false"), Some(Value::Bool(false)));
    assert_eq!(eval("null"), None);
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        eval(r#""a\n\t\"b\"""#),
        Some(Value::Str("a\n\t\"b\"".to_string()))
    );
}

#[test]
fn test_variable_references() {
    assert_eq!(eval("name"), Some(Value::Str("Ada".to_string())));
    assert_eq!(eval("count"), Some(Value::Int(4)));
}

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(eval("1 + 2 * 3"), Some(Value::Int(7)));
    assert_eq!(eval("(1 + 2) * 3"), Some(Value::Int(9)));
    assert_eq!(eval("10 % 3"), Some(Value::Int(1)));
    assert_eq!(eval("-count"), Some(Value::Int(-4)));
    assert_eq!(eval("count / 2"), Some(Value::Int(2)));
}

#[test]
fn test_mixed_numeric_promotion() {
    assert_eq!(eval("count + ratio"), Some(Value::Float(4.5)));
    assert_eq!(eval("1 + 0.5"), Some(Value::Float(1.5)));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        eval("\"src/\" + name + \".rs\""),
        Some(Value::Str("src/Ada.rs".to_string()))
    );
    assert_eq!(
        eval("\"v\" + count"),
        Some(Value::Str("v4".to_string()))
    );
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("count > 3"), Some(Value::Bool(true)));
    assert_eq!(eval("count <= 3"), Some(Value::Bool(false)));
    assert_eq!(eval("name == \"Ada\""), Some(Value::Bool(true)));
    assert_eq!(eval("name < \"B\""), Some(Value::Bool(true)));
    assert_eq!(eval("count == 4.0"), Some(Value::Bool(true)));
}

#[test]
fn test_boolean_operators() {
    assert_eq!(eval("gui && count > 1"), Some(Value::Bool(true)));
    assert_eq!(eval("!gui || false"), Some(Value::Bool(false)));
    // The right side never evaluates, so an unbound name there is fine.
    assert_eq!(eval("gui || missing"), Some(Value::Bool(true)));
    assert_eq!(eval("!gui && missing"), Some(Value::Bool(false)));
}

#[test]
fn test_if_then_else() {
    assert_eq!(
        eval("if gui then \"app/ui/\" else \"app/core/\""),
        Some(Value::Str("app/ui/".to_string()))
    );
    assert_eq!(eval("if count > 10 then \"big\" else null"), None);
}

#[test]
fn test_symbol_equality() {
    let mut env = env();
    let registry = registry();
    env.insert("color".to_string(), registry.resolve("Color", "red").unwrap());

    assert_eq!(
        evaluate("color == Color.red", &env, &registry).unwrap(),
        Some(Value::Bool(true))
    );
    assert_eq!(
        evaluate("color == Color.green", &env, &registry).unwrap(),
        Some(Value::Bool(false))
    );
    assert_eq!(
        evaluate("color != Color.green", &env, &registry).unwrap(),
        Some(Value::Bool(true))
    );
}

#[test]
fn test_unknown_symbol_fails() {
    let err = evaluate("Color.blue", &env(), &registry()).unwrap_err();
    assert!(matches!(err, Error::Eval { .. }));
}

#[test]
fn test_unbound_variable_fails() {
    let err = evaluate("missing + 1", &env(), &registry()).unwrap_err();
    match err {
        Error::UnboundVariable { name } => assert_eq!(name, "missing"),
        other => panic!("expected UnboundVariable, got {:?}", other),
    }
}

#[test]
fn test_malformed_expressions_fail() {
    for source in ["1 +", "(1", "\"open", "if gui then 1", "1 1", "", "count = 1"] {
        let result = evaluate(source, &env(), &registry());
        assert!(
            matches!(result, Err(Error::Eval { .. })),
            "expected Eval error for {:?}, got {:?}",
            source,
            result
        );
    }
}

#[test]
fn test_type_mismatches_fail() {
    for source in ["gui + 1", "1 && true", "-name", "!count", "null + 1"] {
        let result = evaluate(source, &env(), &registry());
        assert!(
            matches!(result, Err(Error::Eval { .. })),
            "expected Eval error for {:?}, got {:?}",
            source,
            result
        );
    }
}

#[test]
fn test_division_by_zero_fails() {
    assert!(matches!(eval_err("1 / 0"), Error::Eval { .. }));
    assert!(matches!(eval_err("1 % 0"), Error::Eval { .. }));
}

#[test]
fn test_multiline_script() {
    let script = "if gui\nthen \"app/ui/\"\nelse \"app/core/\"\n";
    assert_eq!(eval(script), Some(Value::Str("app/ui/".to_string())));
}

fn eval_err(source: &str) -> Error {
    evaluate(source, &env(), &registry()).unwrap_err()
}
