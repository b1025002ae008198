use super::ast::{BinOp, Expr};
use super::error::{CompileError, MAX_NESTING_DEPTH};
use super::lexer::{Spanned, Token};
use super::schema::{self, FieldType, CARD_SCHEMA};
use super::value::Value;

/// Static type of an expression, inferred against [`CARD_SCHEMA`] so that
/// `ValidateExpression` rejects type errors before a rule is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprType {
    Bool,
    Num,
    Str,
    StrArray,
    /// The literal `null`; unifies with `Num` and `Str` for comparisons so a
    /// missing field can be compared without a type error.
    Null,
}

impl ExprType {
    fn name(self) -> &'static str {
        match self {
            ExprType::Bool => "bool",
            ExprType::Num => "number",
            ExprType::Str => "string",
            ExprType::StrArray => "string array",
            ExprType::Null => "null",
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

/// Parses and type-checks `tokens` against the card schema, returning the
/// typed AST root. This is the single gatekeeper both `ValidateExpression`
/// and the write path route through.
pub fn parse(tokens: &[Spanned]) -> Result<(Expr, ExprType), CompileError> {
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let (expr, ty) = parser.parse_or()?;
    parser.expect_eof()?;
    Ok((expr, ty))
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn position(&self) -> usize {
        self.tokens[self.pos].position
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn expect_eof(&self) -> Result<(), CompileError> {
        if *self.peek() == Token::Eof {
            Ok(())
        } else {
            Err(self.syntax("expected end of expression"))
        }
    }

    fn syntax(&self, message: &str) -> CompileError {
        CompileError::Syntax { position: self.position(), message: message.to_string() }
    }

    // or_expr := and_expr ( '||' and_expr )*
    fn parse_or(&mut self) -> Result<(Expr, ExprType), CompileError> {
        let (mut lhs, mut lhs_ty) = self.parse_and()?;
        while *self.peek() == Token::Or {
            self.advance();
            let (rhs, rhs_ty) = self.parse_and()?;
            expect_bool("||", lhs_ty)?;
            expect_bool("||", rhs_ty)?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
            lhs_ty = ExprType::Bool;
        }
        Ok((lhs, lhs_ty))
    }

    // and_expr := unary ( '&&' unary )*
    fn parse_and(&mut self) -> Result<(Expr, ExprType), CompileError> {
        let (mut lhs, mut lhs_ty) = self.parse_comparison()?;
        while *self.peek() == Token::And {
            self.advance();
            let (rhs, rhs_ty) = self.parse_comparison()?;
            expect_bool("&&", lhs_ty)?;
            expect_bool("&&", rhs_ty)?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
            lhs_ty = ExprType::Bool;
        }
        Ok((lhs, lhs_ty))
    }

    // comparison := unary ( cmp_op unary )?
    fn parse_comparison(&mut self) -> Result<(Expr, ExprType), CompileError> {
        let (lhs, lhs_ty) = self.parse_unary()?;
        let op = match self.peek() {
            Token::Eq => BinOp::Eq,
            Token::Ne => BinOp::Ne,
            Token::Lt => BinOp::Lt,
            Token::Le => BinOp::Le,
            Token::Gt => BinOp::Gt,
            Token::Ge => BinOp::Ge,
            Token::Contains => BinOp::Contains,
            Token::In => BinOp::In,
            _ => return Ok((lhs, lhs_ty)),
        };
        self.advance();
        let (rhs, rhs_ty) = self.parse_unary()?;
        check_comparison(op, lhs_ty, rhs_ty)?;
        Ok((Expr::Binary(op, Box::new(lhs), Box::new(rhs)), ExprType::Bool))
    }

    // unary := '!' unary | primary
    fn parse_unary(&mut self) -> Result<(Expr, ExprType), CompileError> {
        if *self.peek() == Token::Not {
            self.advance();
            let (inner, ty) = self.parse_unary()?;
            expect_bool("!", ty)?;
            return Ok((Expr::Not(Box::new(inner)), ExprType::Bool));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<(Expr, ExprType), CompileError> {
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok((Expr::Literal(Value::Num(n)), ExprType::Num))
            }
            Token::String(s) => {
                self.advance();
                Ok((Expr::Literal(Value::Str(s)), ExprType::Str))
            }
            Token::True => {
                self.advance();
                Ok((Expr::Literal(Value::Bool(true)), ExprType::Bool))
            }
            Token::False => {
                self.advance();
                Ok((Expr::Literal(Value::Bool(false)), ExprType::Bool))
            }
            Token::Null => {
                self.advance();
                Ok((Expr::Literal(Value::Null), ExprType::Null))
            }
            Token::LParen => {
                self.advance();
                self.depth += 1;
                if self.depth > MAX_NESTING_DEPTH {
                    return Err(CompileError::TooDeeplyNested);
                }
                let (expr, ty) = self.parse_or()?;
                if *self.peek() != Token::RParen {
                    return Err(self.syntax("expected `)`"));
                }
                self.advance();
                self.depth -= 1;
                Ok((expr, ty))
            }
            Token::Ident(name) => {
                self.advance();
                if *self.peek() == Token::LParen {
                    self.parse_call(name)
                } else {
                    self.parse_field_access(name)
                }
            }
            _ => Err(self.syntax("expected a value")),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<(Expr, ExprType), CompileError> {
        self.advance(); // '('
        let mut args = Vec::new();
        let mut arg_types = Vec::new();
        if *self.peek() != Token::RParen {
            loop {
                let (arg, ty) = self.parse_or()?;
                args.push(arg);
                arg_types.push(ty);
                if *self.peek() == Token::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        if *self.peek() != Token::RParen {
            return Err(self.syntax("expected `)` after call arguments"));
        }
        self.advance();
        let ret = check_call(&name, &arg_types)?;
        Ok((Expr::Call(name, args), ret))
    }

    fn parse_field_access(&mut self, first: String) -> Result<(Expr, ExprType), CompileError> {
        let mut path = vec![first];
        while *self.peek() == Token::Dot {
            self.advance();
            match self.peek().clone() {
                Token::Ident(seg) => {
                    self.advance();
                    path.push(seg);
                }
                _ => return Err(self.syntax("expected field name after `.`")),
            }
        }
        let field_type = schema::resolve(CARD_SCHEMA, &path)
            .ok_or_else(|| CompileError::UnknownField(path.join(".")))?;
        let ty = match field_type {
            FieldType::Str => ExprType::Str,
            FieldType::Num => ExprType::Num,
            FieldType::Bool => ExprType::Bool,
            FieldType::StrArray => ExprType::StrArray,
            FieldType::Map(_) => {
                return Err(CompileError::TypeMismatch {
                    context: format!("field `{}`", path.join(".")),
                    expected: "a concrete value".to_string(),
                    found: "a nested object".to_string(),
                })
            }
        };
        Ok((Expr::Field(path), ty))
    }
}

fn expect_bool(op: &str, ty: ExprType) -> Result<(), CompileError> {
    if ty == ExprType::Bool {
        Ok(())
    } else {
        Err(CompileError::TypeMismatch {
            context: format!("operator `{op}`"),
            expected: "bool".to_string(),
            found: ty.name().to_string(),
        })
    }
}

fn check_comparison(op: BinOp, lhs: ExprType, rhs: ExprType) -> Result<(), CompileError> {
    use ExprType::*;
    let ok = match op {
        BinOp::Eq | BinOp::Ne => {
            lhs == Null || rhs == Null || lhs == rhs
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            matches!((lhs, rhs), (Num, Num) | (Num, Null) | (Null, Num) | (Null, Null))
        }
        BinOp::Contains => matches!((lhs, rhs), (Str, Str)),
        BinOp::In => matches!((lhs, rhs), (Str, StrArray)),
        BinOp::And | BinOp::Or => unreachable!("handled by expect_bool"),
    };
    if ok {
        Ok(())
    } else {
        let op_name = op_name(op);
        Err(CompileError::TypeMismatch {
            context: format!("operator `{op_name}`"),
            expected: expected_desc(op),
            found: format!("{} and {}", lhs.name(), rhs.name()),
        })
    }
}

fn op_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::Contains => "contains",
        BinOp::In => "in",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn expected_desc(op: BinOp) -> String {
    match op {
        BinOp::Eq | BinOp::Ne => "two comparable values".to_string(),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => "two numbers".to_string(),
        BinOp::Contains => "a string and a string".to_string(),
        BinOp::In => "a string and a string array".to_string(),
        BinOp::And | BinOp::Or => "two booleans".to_string(),
    }
}

fn check_call(name: &str, args: &[ExprType]) -> Result<ExprType, CompileError> {
    use ExprType::*;
    match name {
        "hasColor" => {
            arity(name, args, 1)?;
            expect_arg_type(name, 0, args[0], Str)?;
            Ok(Bool)
        }
        "isMonoColor" | "isMultiColor" | "isColorless" => {
            arity(name, args, 0)?;
            Ok(Bool)
        }
        "isColor" => {
            if args.is_empty() {
                return Err(CompileError::ArityMismatch {
                    function: name.to_string(),
                    expected: 1,
                    got: 0,
                });
            }
            for (i, ty) in args.iter().enumerate() {
                expect_arg_type(name, i, *ty, Str)?;
            }
            Ok(Bool)
        }
        "len" => {
            arity(name, args, 1)?;
            match args[0] {
                Str | StrArray => Ok(Num),
                other => Err(CompileError::TypeMismatch {
                    context: "`len` argument".to_string(),
                    expected: "string or string array".to_string(),
                    found: other.name().to_string(),
                }),
            }
        }
        other => Err(CompileError::UnknownFunction(other.to_string())),
    }
}

fn arity(name: &str, args: &[ExprType], expected: usize) -> Result<(), CompileError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CompileError::ArityMismatch {
            function: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}

fn expect_arg_type(
    name: &str,
    index: usize,
    actual: ExprType,
    expected: ExprType,
) -> Result<(), CompileError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CompileError::TypeMismatch {
            context: format!("argument {index} of `{name}`"),
            expected: expected.name().to_string(),
            found: actual.name().to_string(),
        })
    }
}
