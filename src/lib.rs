//! `sievegraph` is an embeddable rule engine.
//!
//! It is built from two layers:
//!
//! - An expression compiler/evaluator ([`Expression`]): a small
//!   infix-notation language with booleans, numbers, strings, and
//!   user-definable binary operators, compiled once via a lexer and a
//!   shunting-yard parser and re-evaluated any number of times against
//!   different variable bindings.
//! - A rule-graph compiler/evaluator ([`RuleEngine`]): a JSON document
//!   describing rules (each with a predicate expression and a list of
//!   outputs), wired into a dependency graph and walked depth-first,
//!   short-circuiting on any predicate that evaluates `false`.
//!
//! # Example
//!
//! ```
//! use sievegraph::{Binding, Expression};
//!
//! let expr = Expression::compile("a + b * c").unwrap();
//! let mut vars = std::collections::HashMap::new();
//! vars.insert("a".to_string(), Binding::Int(1));
//! vars.insert("b".to_string(), Binding::Int(2));
//! vars.insert("c".to_string(), Binding::Int(3));
//! assert_eq!(expr.evaluate(&vars).unwrap().as_number(), Some(7.0));
//! ```

pub mod ast;
pub mod engine;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod ruleset;
pub mod token;
pub mod value;

pub use engine::{
    CancellationToken, EvaluationOutput, EvaluationRequest, RuleEngine, RuleEngineResponse, RuleOutput,
};
pub use error::{CompileError, EngineError, EvalError, LexError, LoadError, ParseError};
pub use expr::{Binding, Expression, Variables};
pub use operators::Udf;
pub use ruleset::RuleGraph;
pub use value::{Value, ValueType};
