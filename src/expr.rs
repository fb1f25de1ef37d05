//! The expression sub-language embedded in templates.
//!
//! Eval scripts and backtick spans share this language: literals, variable
//! references, qualified choice symbols, arithmetic, string concatenation,
//! comparisons, boolean operators and `if/then/else`. Expressions are parsed
//! by a hand-written recursive-descent parser and interpreted directly over
//! the typed [`Environment`](crate::value::Environment); no host-language
//! code is ever compiled or executed.
//!
//! Grammar, loosest-binding first:
//!
//! ```text
//! expr     := "if" expr "then" expr "else" expr | or_expr
//! or_expr  := and_expr { "||" and_expr }
//! and_expr := cmp_expr { "&&" cmp_expr }
//! cmp_expr := add_expr [ ("=="|"!="|"<"|"<="|">"|">=") add_expr ]
//! add_expr := mul_expr { ("+"|"-") mul_expr }
//! mul_expr := unary { ("*"|"/"|"%") unary }
//! unary    := ("!"|"-") unary | primary
//! primary  := int | float | string | "true" | "false" | "null"
//!           | ident [ "." ident ] | "(" expr ")"
//! ```

use crate::error::{Error, Result};
use crate::value::{ChoiceRegistry, Environment, Value};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    If,
    Then,
    Else,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    Dot,
    LParen,
    RParen,
}

fn eval_error(message: impl Into<String>) -> Error {
    Error::Eval { message: message.into() }
}

/// Splits expression source into tokens. Whitespace, including line breaks
/// inside multi-line eval scripts, is insignificant.
fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    i += 2;
                } else {
                    return Err(eval_error("unexpected '=', did you mean '=='?"));
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::NotEq);
                    i += 2;
                } else {
                    tokens.push(Token::Bang);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::AndAnd);
                    i += 2;
                } else {
                    return Err(eval_error("unexpected '&', did you mean '&&'?"));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::OrOr);
                    i += 2;
                } else {
                    return Err(eval_error("unexpected '|', did you mean '||'?"));
                }
            }
            '"' => {
                i += 1;
                let mut literal = String::new();
                loop {
                    match chars.get(i) {
                        None => return Err(eval_error("unterminated string literal")),
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = chars.get(i + 1).ok_or_else(|| {
                                eval_error("unterminated string literal")
                            })?;
                            literal.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                '"' => '"',
                                '\\' => '\\',
                                other => {
                                    return Err(eval_error(format!(
                                        "unknown escape '\\{}' in string literal",
                                        other
                                    )))
                                }
                            });
                            i += 2;
                        }
                        Some(other) => {
                            literal.push(*other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(literal));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                let mut is_float = false;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                // A dot is part of the number only when digits follow it;
                // otherwise it is a symbol qualifier.
                if chars.get(i) == Some(&'.')
                    && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
                {
                    is_float = true;
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                if is_float {
                    let n = text.parse::<f64>().map_err(|_| {
                        eval_error(format!("invalid number literal '{}'", text))
                    })?;
                    tokens.push(Token::Float(n));
                } else {
                    let n = text.parse::<i64>().map_err(|_| {
                        eval_error(format!("invalid number literal '{}'", text))
                    })?;
                    tokens.push(Token::Int(n));
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "if" => Token::If,
                    "then" => Token::Then,
                    "else" => Token::Else,
                    _ => Token::Ident(word),
                });
            }
            other => {
                return Err(eval_error(format!(
                    "unexpected character '{}' in expression",
                    other
                )))
            }
        }
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Null,
    Var(String),
    Symbol { type_name: String, case: String },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    If { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<()> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(eval_error(format!("expected {} {}", describe(&expected), context)))
        }
    }

    fn expression(&mut self) -> Result<Expr> {
        if self.eat(&Token::If) {
            let cond = self.expression()?;
            self.expect(Token::Then, "after 'if' condition")?;
            let then = self.expression()?;
            self.expect(Token::Else, "after 'then' branch")?;
            let otherwise = self.expression()?;
            return Ok(Expr::If {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let right = self.and_expr()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut left = self.cmp_expr()?;
        while self.eat(&Token::AndAnd) {
            let right = self.cmp_expr()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn cmp_expr(&mut self) -> Result<Expr> {
        let left = self.add_expr()?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinaryOp::Eq,
            Some(Token::NotEq) => BinaryOp::NotEq,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.add_expr()?;
        Ok(Expr::Binary { op, left: Box::new(left), right: Box::new(right) })
    }

    fn add_expr(&mut self) -> Result<Expr> {
        let mut left = self.mul_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.mul_expr()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn mul_expr(&mut self) -> Result<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Bang) {
            let operand = self.unary()?;
            return Ok(Expr::Unary { op: UnaryOp::Not, operand: Box::new(operand) });
        }
        if self.eat(&Token::Minus) {
            let operand = self.unary()?;
            return Ok(Expr::Unary { op: UnaryOp::Neg, operand: Box::new(operand) });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Int(n)) => Ok(Expr::Literal(Value::Int(n))),
            Some(Token::Float(n)) => Ok(Expr::Literal(Value::Float(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::True) => Ok(Expr::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Expr::Null),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::Dot) {
                    match self.advance() {
                        Some(Token::Ident(case)) => {
                            Ok(Expr::Symbol { type_name: name, case })
                        }
                        _ => Err(eval_error(format!(
                            "expected a case name after '{}.'",
                            name
                        ))),
                    }
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(Token::RParen, "to close '('")?;
                Ok(inner)
            }
            Some(other) => {
                Err(eval_error(format!("unexpected {} in expression", describe(&other))))
            }
            None => Err(eval_error("unexpected end of expression")),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(n) => format!("'{}'", n),
        Token::Float(n) => format!("'{}'", n),
        Token::Str(s) => format!("\"{}\"", s),
        Token::Ident(name) => format!("'{}'", name),
        Token::True => "'true'".to_string(),
        Token::False => "'false'".to_string(),
        Token::Null => "'null'".to_string(),
        Token::If => "'if'".to_string(),
        Token::Then => "'then'".to_string(),
        Token::Else => "'else'".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Percent => "'%'".to_string(),
        Token::EqEq => "'=='".to_string(),
        Token::NotEq => "'!='".to_string(),
        Token::Lt => "'<'".to_string(),
        Token::Le => "'<='".to_string(),
        Token::Gt => "'>'".to_string(),
        Token::Ge => "'>='".to_string(),
        Token::AndAnd => "'&&'".to_string(),
        Token::OrOr => "'||'".to_string(),
        Token::Bang => "'!'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
    }
}

fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(eval_error("empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(trailing) => Err(eval_error(format!(
            "unexpected {} after expression",
            describe(trailing)
        ))),
    }
}

/// Evaluates expression source against the shared environment.
///
/// Returns `None` when the expression yields `null`, which is only
/// meaningful as an eval-script result. The environment is never mutated.
///
/// # Errors
/// * [`Error::Eval`] on malformed syntax or operand type mismatches
/// * [`Error::UnboundVariable`] when a referenced name has no binding
pub fn evaluate(
    source: &str,
    env: &Environment,
    registry: &ChoiceRegistry,
) -> Result<Option<Value>> {
    let expr = parse(source)?;
    eval_expr(&expr, env, registry)
}

fn eval_expr(
    expr: &Expr,
    env: &Environment,
    registry: &ChoiceRegistry,
) -> Result<Option<Value>> {
    match expr {
        Expr::Literal(value) => Ok(Some(value.clone())),
        Expr::Null => Ok(None),
        Expr::Var(name) => match env.get(name) {
            Some(value) => Ok(Some(value.clone())),
            None => Err(Error::UnboundVariable { name: name.clone() }),
        },
        Expr::Symbol { type_name, case } => {
            registry.resolve(type_name, case).map(Some).ok_or_else(|| {
                eval_error(format!("unknown choice symbol '{}.{}'", type_name, case))
            })
        }
        Expr::Unary { op, operand } => {
            let value = expect_value(eval_expr(operand, env, registry)?)?;
            match (op, value) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Some(Value::Bool(!b))),
                (UnaryOp::Neg, Value::Int(n)) => Ok(Some(Value::Int(-n))),
                (UnaryOp::Neg, Value::Float(n)) => Ok(Some(Value::Float(-n))),
                (UnaryOp::Not, value) => {
                    Err(eval_error(format!("cannot apply '!' to {}", type_of(&value))))
                }
                (UnaryOp::Neg, value) => {
                    Err(eval_error(format!("cannot negate {}", type_of(&value))))
                }
            }
        }
        Expr::Binary { op: BinaryOp::And, left, right } => {
            match expect_bool(eval_expr(left, env, registry)?, "&&")? {
                false => Ok(Some(Value::Bool(false))),
                true => {
                    let right = expect_bool(eval_expr(right, env, registry)?, "&&")?;
                    Ok(Some(Value::Bool(right)))
                }
            }
        }
        Expr::Binary { op: BinaryOp::Or, left, right } => {
            match expect_bool(eval_expr(left, env, registry)?, "||")? {
                true => Ok(Some(Value::Bool(true))),
                false => {
                    let right = expect_bool(eval_expr(right, env, registry)?, "||")?;
                    Ok(Some(Value::Bool(right)))
                }
            }
        }
        Expr::Binary { op, left, right } => {
            let left = expect_value(eval_expr(left, env, registry)?)?;
            let right = expect_value(eval_expr(right, env, registry)?)?;
            eval_binary(*op, left, right).map(Some)
        }
        Expr::If { cond, then, otherwise } => {
            if expect_bool(eval_expr(cond, env, registry)?, "if")? {
                eval_expr(then, env, registry)
            } else {
                eval_expr(otherwise, env, registry)
            }
        }
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    use BinaryOp::*;
    match op {
        Add => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            (Value::Str(a), b) => Ok(Value::Str(format!("{}{}", a, b))),
            (a, Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (a, b) => numeric(a, b, "+", |a, b| a + b),
        },
        Sub => numeric_int(left, right, "-", |a, b| a - b, |a, b| a - b),
        Mul => numeric_int(left, right, "*", |a, b| a * b, |a, b| a * b),
        Div => match (&left, &right) {
            (Value::Int(_), Value::Int(0)) => Err(eval_error("division by zero")),
            _ => numeric_int(left, right, "/", |a, b| a / b, |a, b| a / b),
        },
        Rem => match (&left, &right) {
            (Value::Int(_), Value::Int(0)) => Err(eval_error("division by zero")),
            _ => numeric_int(left, right, "%", |a, b| a % b, |a, b| a % b),
        },
        Eq => compare_eq(left, right).map(Value::Bool),
        NotEq => compare_eq(left, right).map(|eq| Value::Bool(!eq)),
        Lt => compare_ord(left, right, "<", |o| o == std::cmp::Ordering::Less),
        Le => compare_ord(left, right, "<=", |o| o != std::cmp::Ordering::Greater),
        Gt => compare_ord(left, right, ">", |o| o == std::cmp::Ordering::Greater),
        Ge => compare_ord(left, right, ">=", |o| o != std::cmp::Ordering::Less),
        And | Or => unreachable!("short-circuit operators are handled in eval_expr"),
    }
}

fn numeric(a: Value, b: Value, op: &str, f: impl Fn(f64, f64) -> f64) -> Result<Value> {
    match (a, b) {
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(f(a as f64, b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(f(a, b as f64))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(f(a, b))),
        (a, b) => Err(eval_error(format!(
            "cannot apply '{}' to {} and {}",
            op,
            type_of(&a),
            type_of(&b)
        ))),
    }
}

fn numeric_int(
    a: Value,
    b: Value,
    op: &str,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(a, b))),
        (a, b) => numeric(a, b, op, float_op),
    }
}

fn compare_eq(left: Value, right: Value) -> Result<bool> {
    match (left, right) {
        (Value::Int(a), Value::Float(b)) => Ok(a as f64 == b),
        (Value::Float(a), Value::Int(b)) => Ok(a == b as f64),
        (a, b) => Ok(a == b),
    }
}

fn compare_ord(
    left: Value,
    right: Value,
    op: &str,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Value> {
    let ordering = match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        _ => None,
    };
    match ordering {
        Some(ordering) => Ok(Value::Bool(accept(ordering))),
        None => Err(eval_error(format!(
            "cannot apply '{}' to {} and {}",
            op,
            type_of(&left),
            type_of(&right)
        ))),
    }
}

fn expect_value(evaluated: Option<Value>) -> Result<Value> {
    evaluated.ok_or_else(|| eval_error("'null' used as an operand"))
}

fn expect_bool(evaluated: Option<Value>, op: &str) -> Result<bool> {
    match expect_value(evaluated)? {
        Value::Bool(b) => Ok(b),
        value => Err(eval_error(format!(
            "'{}' requires a boolean, got {}",
            op,
            type_of(&value)
        ))),
    }
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "a boolean",
        Value::Int(_) => "an int",
        Value::Float(_) => "a float",
        Value::Str(_) => "a string",
        Value::Symbol { .. } => "a choice symbol",
    }
}
