//! Compiled, re-evaluable expressions.
//!
//! An [`Expression`] is constructed once (lex + parse) and may be
//! evaluated any number of times against different variable bindings
//! without re-parsing.

use std::collections::HashMap;

use crate::ast::AstNode;
use crate::error::{CompileError, EvalError};
use crate::lexer::Lexer;
use crate::operators::{OperatorTable, Udf};
use crate::token::TokenKind;
use crate::value::Value;

/// The variable bindings supplied for one evaluation.
///
/// A binding may be a bool, a string, or anything that converts to a
/// number (`f64` or an integer); anything else fails evaluation with
/// [`EvalError::InvalidVariableType`]. `Variables` is read-only for
/// the duration of a traversal.
pub type Variables = HashMap<String, Binding>;

/// A single variable's bound value, supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A boolean binding.
    Bool(bool),
    /// A floating point binding.
    Number(f64),
    /// An integer binding, promoted to a number losslessly when
    /// evaluated.
    Int(i64),
    /// A string binding.
    Str(String),
}

impl From<bool> for Binding {
    fn from(b: bool) -> Self {
        Binding::Bool(b)
    }
}

impl From<f64> for Binding {
    fn from(n: f64) -> Self {
        Binding::Number(n)
    }
}

impl From<i64> for Binding {
    fn from(n: i64) -> Self {
        Binding::Int(n)
    }
}

impl From<&str> for Binding {
    fn from(s: &str) -> Self {
        Binding::Str(s.to_string())
    }
}

impl From<String> for Binding {
    fn from(s: String) -> Self {
        Binding::Str(s)
    }
}

/// An immutable compiled expression: the original source text plus
/// its parsed AST and the operator table it was compiled with.
#[derive(Clone)]
pub struct Expression {
    source: String,
    root: AstNode,
    operators: OperatorTable,
}

impl std::fmt::Debug for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expression").field("source", &self.source).finish()
    }
}

impl Expression {
    /// Compiles `source` with only the built-in operators.
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        Self::compile_with_udfs(source, Vec::new())
    }

    /// Compiles `source` with the built-in operators plus `udfs`.
    pub fn compile_with_udfs(source: &str, udfs: Vec<Udf>) -> Result<Self, CompileError> {
        let operators = OperatorTable::with_udfs(udfs);
        let tokens = Lexer::new(&operators).lex(source)?;
        let root = crate::parser::Parser::new().parse(tokens)?;
        Ok(Self {
            source: source.to_string(),
            root,
            operators,
        })
    }

    /// The original source text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates this expression's AST against `variables`.
    ///
    /// A fresh [`Evaluator`] (and its intermediate-value pool) is
    /// created for each call; nothing about a call's pool is
    /// observable in the returned [`Value`] or leaks into a later
    /// call.
    pub fn evaluate(&self, variables: &Variables) -> Result<Value, EvalError> {
        let mut evaluator = Evaluator::new(&self.operators);
        evaluator.eval(&self.root, variables)
    }
}

/// A post-order tree-walking evaluator for a single [`Expression::evaluate`]
/// call.
///
/// Holds a small free-list of recycled [`Value`]s. The pool is purely
/// an internal performance device matching the source's design (spec
/// §4.4, §9); it never changes observable results.
struct Evaluator<'a> {
    operators: &'a OperatorTable,
    pool: Vec<Value>,
}

impl<'a> Evaluator<'a> {
    fn new(operators: &'a OperatorTable) -> Self {
        Self {
            operators,
            pool: Vec::new(),
        }
    }

    fn eval(&mut self, node: &AstNode, variables: &Variables) -> Result<Value, EvalError> {
        match node {
            AstNode::Leaf(token) => self.eval_leaf(token, variables),
            AstNode::Binary { op, left, right } => {
                let left_val = self.eval(left, variables)?;
                let right_val = self.eval(right, variables)?;
                let result = self.operators.apply(op.text(), &left_val, &right_val);
                self.recycle(left_val);
                self.recycle(right_val);
                result.map_err(|e| enrich(e, op.index))
            }
        }
    }

    fn eval_leaf(&mut self, token: &crate::token::Token, variables: &Variables) -> Result<Value, EvalError> {
        match token.kind {
            TokenKind::String => Ok(Value::Str(token.text().to_string())),
            TokenKind::Number => Ok(Value::Number(match token.payload {
                crate::token::TokenPayload::Number(n) => n,
                _ => unreachable!("Number token without a numeric payload"),
            })),
            TokenKind::Bool => Ok(Value::Bool(match token.payload {
                crate::token::TokenPayload::Bool(b) => b,
                _ => unreachable!("Bool token without a boolean payload"),
            })),
            TokenKind::Variable => {
                let name = token.text();
                let binding = variables
                    .get(name)
                    .ok_or_else(|| EvalError::MissingVariableValue { name: name.to_string() })?;
                Ok(self.resolve_binding(binding))
            }
            other => unreachable!("{other:?} is not a leaf token kind"),
        }
    }

    /// Resolves a binding into a `Value`, reusing a pooled `String`
    /// buffer for `Str` bindings when one is available.
    fn resolve_binding(&mut self, binding: &Binding) -> Value {
        match binding {
            Binding::Bool(b) => Value::Bool(*b),
            Binding::Number(n) => Value::Number(*n),
            Binding::Int(n) => Value::Number(*n as f64),
            Binding::Str(s) => {
                if let Some(slot) = self.pool.iter().position(|v| matches!(v, Value::Str(_))) {
                    let mut reused = self.pool.swap_remove(slot);
                    if let Value::Str(buf) = &mut reused {
                        buf.clear();
                        buf.push_str(s);
                    }
                    reused
                } else {
                    Value::Str(s.clone())
                }
            }
        }
    }

    /// Returns an intermediate result to the pool once its value has
    /// been consumed by the parent operator application.
    fn recycle(&mut self, value: Value) {
        const MAX_POOLED: usize = 16;
        if self.pool.len() < MAX_POOLED {
            self.pool.push(value);
        }
    }
}

fn enrich(err: EvalError, index: usize) -> EvalError {
    match err {
        EvalError::IncompatibleOperation { op, left, right, .. } => {
            EvalError::IncompatibleOperation { op, left, right, index }
        }
        EvalError::DivisionByZero { .. } => EvalError::DivisionByZero { index },
        EvalError::UnsupportedOperation { op, .. } => EvalError::UnsupportedOperation { op, index },
        other => other,
    }
}
