//! Cell expressions: the small language in a column's `dfcolumnname`.
//!
//! Forms, tried in this order against each row:
//!
//! 1. a field name (verbatim, then lowercased) returns that field;
//! 2. `left * right` multiplies; the right side may be a numeric constant;
//! 3. `[Category]`, optionally followed by one of `* / + -` and a number;
//! 4. a numeric literal;
//!
//! anything else evaluates to absent. Step 1 depends on the row, so every
//! node keeps its source text and checks it before its parsed form.

use std::sync::OnceLock;

use regex::Regex;

use crate::data::{ResultRow, Value, parse_number};

fn bracket_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\](?:\s*([*/+-])\s*([0-9.]+))?").expect("bracket pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Mul,
    Div,
    Add,
    Sub,
}

impl ArithOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "*" => Some(ArithOp::Mul),
            "/" => Some(ArithOp::Div),
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Sub),
            _ => None,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        let result = match self {
            ArithOp::Mul => lhs * rhs,
            ArithOp::Div if rhs == 0.0 => return None,
            ArithOp::Div => lhs / rhs,
            ArithOp::Add => lhs + rhs,
            ArithOp::Sub => lhs - rhs,
        };
        result.is_finite().then_some(result)
    }
}

/// Trailing `op number` of a bracket reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    None,
    Apply(ArithOp, f64),
    /// The operand matched `[0-9.]+` but is not a number (`1.2.3`).
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Factor {
    Constant(f64),
    Expr(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Product { left: Box<Expression>, right: Factor },
    Bracket { name: String, adjustment: Adjustment },
    Literal(f64),
    /// Only resolvable as a direct field reference.
    Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    form: Form,
}

impl Expression {
    pub fn parse(text: &str) -> Self {
        let source = text.trim().to_string();
        let form = if let Some((left, right)) = source.split_once('*') {
            let left = Box::new(Expression::parse(left));
            let right = match parse_number(right) {
                Some(constant) => Factor::Constant(constant),
                None => Factor::Expr(Box::new(Expression::parse(right))),
            };
            Form::Product { left, right }
        } else if let Some(captures) = bracket_pattern().captures(&source) {
            let name = captures[1].to_string();
            let adjustment = match (captures.get(2), captures.get(3)) {
                (Some(op), Some(operand)) => {
                    match (ArithOp::from_symbol(op.as_str()), parse_number(operand.as_str())) {
                        (Some(op), Some(operand)) => Adjustment::Apply(op, operand),
                        _ => Adjustment::Malformed,
                    }
                }
                _ => Adjustment::None,
            };
            Form::Bracket { name, adjustment }
        } else if let Some(literal) = parse_number(&source) {
            Form::Literal(literal)
        } else {
            Form::Name
        };
        Self { source, form }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Evaluates against one row; `None` is the absent outcome.
    pub fn evaluate(&self, row: &ResultRow) -> Option<Value> {
        if let Some(field) = direct_field(row, &self.source) {
            return row.get(&field).cloned();
        }
        match &self.form {
            Form::Product { left, right } => {
                let lhs = left.evaluate(row)?.as_number()?;
                let rhs = match right {
                    Factor::Constant(constant) => *constant,
                    Factor::Expr(expr) => expr.evaluate(row)?.as_number()?,
                };
                // Zero right factor reads as missing data.
                if rhs == 0.0 {
                    return None;
                }
                ArithOp::Mul.apply(lhs, rhs).map(Value::Number)
            }
            Form::Bracket { name, adjustment } => {
                let value = bracket_field(row, name).and_then(|field| row.get(&field))?;
                match adjustment {
                    Adjustment::None => Some(value.clone()),
                    Adjustment::Apply(op, operand) => {
                        op.apply(value.as_number()?, *operand).map(Value::Number)
                    }
                    Adjustment::Malformed => None,
                }
            }
            Form::Literal(literal) => Some(Value::Number(*literal)),
            Form::Name => None,
        }
    }
}

/// Parses and evaluates in one go.
pub fn evaluate(expression: &str, row: &ResultRow) -> Option<Value> {
    Expression::parse(expression).evaluate(row)
}

fn direct_field<'a>(row: &ResultRow, source: &'a str) -> Option<std::borrow::Cow<'a, str>> {
    if source.is_empty() {
        return None;
    }
    if row.contains(source) {
        return Some(source.into());
    }
    let lowered = source.to_lowercase();
    row.contains(&lowered).then_some(lowered.into())
}

fn bracket_field(row: &ResultRow, name: &str) -> Option<String> {
    [name.to_string(), name.to_lowercase(), name.to_uppercase()]
        .into_iter()
        .find(|candidate| row.contains(candidate))
}
