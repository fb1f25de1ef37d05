use tmpl::prompt::ScriptedPrompter;
use tmpl::resolver::resolve_declarations;
use tmpl::value::{ChoiceRegistry, Environment, Value};

fn resolve(declarations: &str, answers: &[&str]) -> (Environment, ChoiceRegistry) {
    let mut env = Environment::new();
    let mut registry = ChoiceRegistry::new();
    let prompter = ScriptedPrompter::new(answers.iter().copied());
    resolve_declarations(declarations, "test.txt", &mut env, &mut registry, &prompter)
        .unwrap();
    (env, registry)
}

#[test]
fn test_boolean_binding() {
    let (env, _) = resolve("flag:boolean", &["y"]);
    assert_eq!(env.get("flag"), Some(&Value::Bool(true)));

    let (env, _) = resolve("flag:boolean", &["N"]);
    assert_eq!(env.get("flag"), Some(&Value::Bool(false)));
}

#[test]
fn test_boolean_reprompts_until_valid() {
    let (env, _) = resolve("flag:boolean", &["maybe", "", "yes"]);
    assert_eq!(env.get("flag"), Some(&Value::Bool(true)));
}

#[test]
fn test_string_binding_keeps_raw_text() {
    let (env, _) = resolve("name:string", &["  Ada Lovelace "]);
    assert_eq!(
        env.get("name"),
        Some(&Value::Str("  Ada Lovelace ".to_string()))
    );
}

#[test]
fn test_numeric_bindings_reprompt_on_parse_failure() {
    let (env, _) = resolve("count:int", &["four", "4"]);
    assert_eq!(env.get("count"), Some(&Value::Int(4)));

    let (env, _) = resolve("ratio:float", &["half", "0.5"]);
    assert_eq!(env.get("ratio"), Some(&Value::Float(0.5)));
}

#[test]
fn test_multiple_declarations_in_order() {
    let (env, _) = resolve("a:int|b:string", &["1", "two"]);
    assert_eq!(env.get("a"), Some(&Value::Int(1)));
    assert_eq!(env.get("b"), Some(&Value::Str("two".to_string())));
    // Bound in declaration order.
    let names: Vec<&String> = env.keys().collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_bound_name_is_never_reprompted() {
    let mut env = Environment::new();
    let mut registry = ChoiceRegistry::new();
    let prompter = ScriptedPrompter::new(["y"]);

    resolve_declarations("flag:boolean", "a.txt", &mut env, &mut registry, &prompter)
        .unwrap();
    // Second file declares the same variable; no answer is consumed.
    resolve_declarations("flag:boolean", "b.txt", &mut env, &mut registry, &prompter)
        .unwrap();

    assert_eq!(env.get("flag"), Some(&Value::Bool(true)));
    assert!(prompter.is_exhausted());
}

#[test]
fn test_illegal_name_left_unbound() {
    let (env, _) = resolve("2cool:int|ok:int", &["7"]);
    assert!(!env.contains_key("2cool"));
    assert_eq!(env.get("ok"), Some(&Value::Int(7)));
}

#[test]
fn test_unknown_type_left_unbound() {
    let (env, _) = resolve("thing:widget", &[]);
    assert!(env.is_empty());
}

#[test]
fn test_choice_set_binding_and_registration() {
    let (env, registry) = resolve("color:[red|green|dark_blue]", &["2"]);

    let bound = env.get("color").unwrap();
    assert_eq!(
        bound,
        &Value::Symbol {
            type_name: "Color".to_string(),
            case_index: 2,
            case_label: "dark_blue".to_string(),
        }
    );
    // Every case of the set becomes substitutable.
    assert_eq!(
        registry.substitute("red green dark_blue"),
        "Color.red Color.green Color.dark_blue"
    );
}

#[test]
fn test_choice_out_of_range_reprompts_without_binding() {
    let (env, _) = resolve("color:[red|green]", &["5", "nope", "0"]);
    assert_eq!(
        env.get("color"),
        Some(&Value::Symbol {
            type_name: "Color".to_string(),
            case_index: 0,
            case_label: "red".to_string(),
        })
    );
}

#[test]
fn test_empty_declarations_prompt_nothing() {
    let (env, _) = resolve("", &[]);
    assert!(env.is_empty());
}
