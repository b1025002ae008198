use thiserror::Error;

/// Maximum length (bytes) a rule expression source may have.
pub const MAX_EXPRESSION_LEN: usize = 1000;

/// Maximum parenthesis nesting depth a rule expression may have.
pub const MAX_NESTING_DEPTH: usize = 20;

/// Failure to compile an expression source string against the card schema.
///
/// Compile errors are the only gate: `ValidateExpression` must reject
/// exactly the inputs the write path would reject, so every variant here is
/// surfaced to callers rather than swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("expression must not be empty")]
    EmptyInput,
    #[error("expression length {0} exceeds the {MAX_EXPRESSION_LEN} character limit")]
    TooLong(usize),
    #[error("expression nests parentheses past the {MAX_NESTING_DEPTH} level limit")]
    TooDeeplyNested,
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("`{function}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },
    #[error("type mismatch: {context} expects {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },
}

/// Failure while evaluating an already-compiled program against a card
/// projection.
///
/// A runtime error is never propagated past the Evaluator: the offending
/// rule is treated as not matching and evaluation continues with the
/// next one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("expression evaluated to {0}, expected a boolean")]
    NonBooleanResult(&'static str),
    #[error("operator `{op}` cannot be applied to {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("missing field `{0}` in card projection")]
    MissingField(String),
}
