//! The boolean expression compiler/runtime rules are written in.
//!
//! Small, explicit value types with constructors that do the validation,
//! rather than a generic `serde_json::Value` escape hatch everywhere.

mod ast;
mod error;
mod lexer;
mod parser;
mod program;
mod schema;
mod value;

pub use error::{CompileError, RuntimeError, MAX_EXPRESSION_LEN, MAX_NESTING_DEPTH};
pub use program::{compile, validate_expression, CompiledProgram};
pub use schema::CARD_SCHEMA;
pub use value::Value;
