//! Error taxonomy for `sievegraph`.
//!
//! Every fallible operation in this crate returns one of the enums
//! below instead of a boxed `dyn Error`, so callers can match on the
//! error kind without parsing messages. [`EngineError`] is the single
//! top-level error returned by the embedding API; it wraps the others.

use crate::value::ValueType;

/// Errors raised while turning a source string into a token sequence.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum LexError {
    /// A token kind cannot legally follow the previous token kind, per
    /// the adjacency DFA in the lexer grammar.
    #[error("invalid predicate syntax: unexpected token at position {index}")]
    InvalidAdjacency {
        /// Byte offset of the offending token.
        index: usize,
    },
    /// A `"`-delimited run never found its closing quote.
    #[error("badly formatted string at position {index}")]
    UnterminatedString {
        /// Byte offset where the string literal began.
        index: usize,
    },
    /// A candidate lexeme did not classify as a bool, variable, number,
    /// or operator.
    #[error("unrecognized token '{lexeme}' at position {index}")]
    UnrecognizedToken {
        /// The offending lexeme.
        lexeme: String,
        /// Byte offset of the offending token.
        index: usize,
    },
}

/// Errors raised while converting a token sequence into an AST.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ParseError {
    /// A `)` was encountered with no matching `(` on the operator
    /// stack.
    #[error("no matching '(' for ')' at position {index}")]
    UnmatchedRightParen {
        /// Byte offset of the offending `)`.
        index: usize,
    },
    /// Tokens were exhausted with an unclosed `(` left on the operator
    /// stack.
    #[error("no matching ')' for '(' at position {index}")]
    UnmatchedLeftParen {
        /// Byte offset of the offending `(`.
        index: usize,
    },
    /// An operator was combined with fewer than two operands available.
    #[error("missing operands for operator '{op}' at position {index}")]
    MissingOperands {
        /// The operator lexeme.
        op: String,
        /// Byte offset of the operator.
        index: usize,
    },
    /// The token stream was empty.
    #[error("empty expression")]
    EmptyExpression,
}

/// Errors raised while compiling a source string (lex + parse).
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum CompileError {
    /// Lexing failed.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors raised while evaluating a compiled expression against a set
/// of variable bindings.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum EvalError {
    /// A variable referenced in the expression has no entry in the
    /// supplied bindings.
    #[error("value not provided for variable '{name}'")]
    MissingVariableValue {
        /// The unbound variable's name.
        name: String,
    },
    /// A variable was bound to a value of a shape this engine does not
    /// understand (anything other than bool, string, or a number-like
    /// type).
    #[error("invalid variable type for '{name}'")]
    InvalidVariableType {
        /// The offending variable's name.
        name: String,
    },
    /// An operator was applied to operand types it does not support.
    #[error("operation '{op}' is not compatible with operand types '{left}' and '{right}' at position {index}")]
    IncompatibleOperation {
        /// The operator lexeme.
        op: String,
        /// The left operand's type.
        left: ValueType,
        /// The right operand's type.
        right: ValueType,
        /// Byte offset of the operator in the source expression.
        index: usize,
    },
    /// The right-hand operand of `/` evaluated to zero.
    #[error("division by zero at position {index}")]
    DivisionByZero {
        /// Byte offset of the `/` operator.
        index: usize,
    },
    /// An operator lexeme has no registered implementation, built-in
    /// or user-defined.
    #[error("unsupported operator '{op}' at position {index}")]
    UnsupportedOperation {
        /// The unrecognized operator lexeme.
        op: String,
        /// Byte offset of the operator.
        index: usize,
    },
    /// The caller's cancellation token was observed set during
    /// evaluation.
    #[error("evaluation cancelled")]
    Cancelled,
    /// A rule's predicate evaluated to something other than a bool.
    #[error("rule {rule_id} does not have a boolean expression")]
    NonBooleanPredicate {
        /// The offending rule's id.
        rule_id: String,
        /// The type the predicate actually evaluated to.
        actual: ValueType,
    },
}

/// Errors raised while loading a rule-set document into a [`crate::ruleset::RuleGraph`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document could not be deserialized as JSON matching the
    /// rule-set shape.
    #[error("malformed rule-set document: {0}")]
    Json(#[from] serde_json::Error),
    /// Two rules in the document declared the same id.
    #[error("rule id '{id}' has been used already")]
    DuplicateRuleId {
        /// The duplicated id.
        id: String,
    },
    /// A `Predicate:NAME` reference named a predicate not present in
    /// the document's `predicates` map.
    #[error("reference to invalid predicate '{name}'")]
    UnknownPredicate {
        /// The missing predicate name.
        name: String,
    },
    /// A relation's `from` or `to` field named a rule id that was not
    /// declared in `rules`.
    #[error("invalid rule id '{id}' used for relation")]
    UnknownRelationEndpoint {
        /// The dangling rule id.
        id: String,
    },
    /// A post-eval's `type` field was neither `EXPR` nor `CONST`.
    #[error("invalid output type '{kind}' used for output '{output_id}' in rule '{rule_id}'")]
    InvalidPostEvalKind {
        /// The unrecognized `type` string.
        kind: String,
        /// The post-eval's own id.
        output_id: String,
        /// The owning rule's id.
        rule_id: String,
    },
    /// A rule's predicate failed to compile.
    #[error("rule '{rule_id}' has invalid predicate: {source}")]
    InvalidPredicate {
        /// The owning rule's id.
        rule_id: String,
        /// The underlying compile error.
        #[source]
        source: CompileError,
    },
    /// A post-eval's `EXPR` value failed to compile.
    #[error("rule '{rule_id}' has invalid predicate for output '{output_id}': {source}")]
    InvalidPostEvalExpression {
        /// The owning rule's id.
        rule_id: String,
        /// The post-eval's own id.
        output_id: String,
        /// The underlying compile error.
        #[source]
        source: CompileError,
    },
}

/// The top-level error returned by the embedding API.
///
/// Any evaluation failure aborts the whole traversal; there is no
/// partial response alongside an `EngineError`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Loading the rule-set document failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Evaluating the rule-graph failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}
