use std::collections::BTreeSet;

use super::ast::{BinOp, Expr};
use super::error::{CompileError, RuntimeError, MAX_EXPRESSION_LEN};
use super::lexer::lex;
use super::parser::parse;
use super::value::Value;

/// A compiled, reusable rule expression.
///
/// `CompiledProgram` is immutable after construction, side-effect free to
/// evaluate, and safe to share across threads and requests — it holds
/// nothing but the typed AST.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    root: Expr,
    source_len: usize,
}

/// Compiles `src` against the card schema. This is the single entry point
/// both rule evaluation and `validate_expression` route through.
pub fn compile(src: &str) -> Result<CompiledProgram, CompileError> {
    if src.is_empty() {
        return Err(CompileError::EmptyInput);
    }
    if src.len() > MAX_EXPRESSION_LEN {
        return Err(CompileError::TooLong(src.len()));
    }
    let tokens = lex(src)?;
    let (root, _ty) = parse(&tokens)?;
    Ok(CompiledProgram { root, source_len: src.len() })
}

/// Compiles `src` and discards the result — `ValidateExpression`.
/// Fails iff `compile` would fail; performs no evaluation.
pub fn validate_expression(src: &str) -> Result<(), CompileError> {
    compile(src).map(|_| ())
}

impl CompiledProgram {
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Evaluates this program against a projected card environment.
    /// Deterministic and side-effect free: the same `(program, env)`
    /// pair always yields the same result.
    pub fn evaluate(&self, env: &Value) -> Result<bool, RuntimeError> {
        match eval(&self.root, env)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::NonBooleanResult(other.type_name())),
        }
    }
}

fn eval(expr: &Expr, env: &Value) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Field(path) => eval_field(path, env),
        Expr::Not(inner) => match eval(inner, env)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(RuntimeError::TypeMismatch {
                op: "!",
                lhs: other.type_name(),
                rhs: "bool",
            }),
        },
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, env),
        Expr::Call(name, args) => eval_call(name, args, env),
    }
}

fn eval_field(path: &[String], env: &Value) -> Result<Value, RuntimeError> {
    let mut current = env;
    for (i, segment) in path.iter().enumerate() {
        match current.get(segment) {
            Some(v) => current = v,
            None => {
                if i == path.len() - 1 {
                    // Missing leaf (e.g. an absent price) is null, not an error.
                    return Ok(Value::Null);
                }
                return Err(RuntimeError::MissingField(path.join(".")));
            }
        }
    }
    Ok(current.clone())
}

fn eval_binary(op: BinOp, lhs: &Expr, rhs: &Expr, env: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::And => {
            let l = eval_bool(lhs, env)?;
            if !l {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_bool(rhs, env)?))
        }
        BinOp::Or => {
            let l = eval_bool(lhs, env)?;
            if l {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_bool(rhs, env)?))
        }
        BinOp::Eq => Ok(Value::Bool(values_equal(&eval(lhs, env)?, &eval(rhs, env)?))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&eval(lhs, env)?, &eval(rhs, env)?))),
        BinOp::Lt => ordering(eval(lhs, env)?, eval(rhs, env)?, |a, b| a < b),
        BinOp::Le => ordering(eval(lhs, env)?, eval(rhs, env)?, |a, b| a <= b),
        BinOp::Gt => ordering(eval(lhs, env)?, eval(rhs, env)?, |a, b| a > b),
        BinOp::Ge => ordering(eval(lhs, env)?, eval(rhs, env)?, |a, b| a >= b),
        BinOp::Contains => {
            let l = eval(lhs, env)?;
            let r = eval(rhs, env)?;
            match (&l, &r) {
                (Value::Str(haystack), Value::Str(needle)) => {
                    Ok(Value::Bool(haystack.contains(needle.as_str())))
                }
                _ => Err(RuntimeError::TypeMismatch {
                    op: "contains",
                    lhs: l.type_name(),
                    rhs: r.type_name(),
                }),
            }
        }
        BinOp::In => {
            let l = eval(lhs, env)?;
            let r = eval(rhs, env)?;
            match (&l, &r) {
                (Value::Str(needle), Value::StrArray(items)) => {
                    Ok(Value::Bool(items.iter().any(|item| item == needle)))
                }
                _ => Err(RuntimeError::TypeMismatch {
                    op: "in",
                    lhs: l.type_name(),
                    rhs: r.type_name(),
                }),
            }
        }
    }
}

fn eval_bool(expr: &Expr, env: &Value) -> Result<bool, RuntimeError> {
    match eval(expr, env)? {
        Value::Bool(b) => Ok(b),
        other => Err(RuntimeError::TypeMismatch {
            op: "&&/||",
            lhs: other.type_name(),
            rhs: "bool",
        }),
    }
}

/// `null == null` is true; `null` compared to anything else is false. Two
/// non-null values of the same variant compare structurally.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => lhs == rhs,
    }
}

/// Ordering comparisons never error: a `null` operand (a missing price)
/// makes the comparison `false` rather than raising — this is what lets
/// `prices.usd > 10` read as `false` over a missing price.
fn ordering(lhs: Value, rhs: Value, cmp: impl Fn(f64, f64) -> bool) -> Result<Value, RuntimeError> {
    match (lhs, rhs) {
        (Value::Num(a), Value::Num(b)) => Ok(Value::Bool(cmp(a, b))),
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Bool(false)),
        (a, b) => Err(RuntimeError::TypeMismatch {
            op: "comparison",
            lhs: a.type_name(),
            rhs: b.type_name(),
        }),
    }
}

fn eval_call(name: &str, args: &[Expr], env: &Value) -> Result<Value, RuntimeError> {
    let color_identity = str_array_field(env, "color_identity")?;
    match name {
        "hasColor" => {
            let c = eval_str(&args[0], env)?;
            Ok(Value::Bool(color_identity.contains(&c)))
        }
        "isMonoColor" => Ok(Value::Bool(color_identity.len() == 1)),
        "isMultiColor" => Ok(Value::Bool(color_identity.len() >= 2)),
        "isColorless" => Ok(Value::Bool(color_identity.is_empty())),
        "isColor" => {
            let mut wanted = BTreeSet::new();
            for arg in args {
                wanted.insert(eval_str(arg, env)?);
            }
            let colors = str_array_field(env, "colors")?;
            let identity_set: BTreeSet<String> = color_identity.iter().cloned().collect();
            let colors_set: BTreeSet<String> = colors.iter().cloned().collect();
            Ok(Value::Bool(identity_set == wanted || colors_set == wanted))
        }
        "len" => match eval(&args[0], env)? {
            Value::Str(s) => Ok(Value::Num(s.chars().count() as f64)),
            Value::StrArray(items) => Ok(Value::Num(items.len() as f64)),
            other => Err(RuntimeError::TypeMismatch {
                op: "len",
                lhs: other.type_name(),
                rhs: "string or string array",
            }),
        },
        other => Err(RuntimeError::MissingField(format!("unknown function `{other}`"))),
    }
}

fn eval_str(expr: &Expr, env: &Value) -> Result<String, RuntimeError> {
    match eval(expr, env)? {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::TypeMismatch {
            op: "helper argument",
            lhs: other.type_name(),
            rhs: "string",
        }),
    }
}

fn str_array_field(env: &Value, field: &str) -> Result<Vec<String>, RuntimeError> {
    match env.get(field) {
        Some(Value::StrArray(items)) => Ok(items.clone()),
        Some(other) => Err(RuntimeError::TypeMismatch {
            op: field,
            lhs: other.type_name(),
            rhs: "string array",
        }),
        None => Ok(Vec::new()),
    }
}
