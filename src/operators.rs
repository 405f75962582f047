//! The operator dispatch table: built-in binary operators plus
//! caller-registered user-defined operators (UDFs).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::EvalError;
use crate::value::Value;

/// A binary operator function: takes the already-evaluated left and
/// right operands and produces a result or an [`EvalError`].
///
/// The `index` the error variants require is not known to the
/// function itself — callers (the evaluator) annotate
/// [`EvalError::IncompatibleOperation`] and friends with the
/// operator's source index after the fact, per spec §4.4's "error
/// enrichment."
pub type BinaryFn = Arc<dyn Fn(&Value, &Value) -> Result<Value, EvalError> + Send + Sync>;

/// A user-defined binary operator, registered under a caller-chosen
/// lexeme.
#[derive(Clone)]
pub struct Udf {
    /// The lexeme this operator is invoked under, e.g. `"MY_OP"`.
    pub token: String,
    /// The operator's implementation.
    pub op: BinaryFn,
}

impl fmt::Debug for Udf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Udf").field("token", &self.token).finish()
    }
}

/// Maps an operator lexeme to its implementation. User-defined
/// operators override built-ins by lexeme; lookups always check the
/// user table first.
#[derive(Clone, Default)]
pub struct OperatorTable {
    custom: HashMap<String, BinaryFn>,
}

impl fmt::Debug for OperatorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorTable")
            .field("custom_tokens", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The built-in operator lexemes, in no particular order. Used by the
/// lexer to classify a candidate lexeme as an `Operator` token.
pub const BUILTIN_OPERATORS: &[&str] =
    &["<", ">", "<=", ">=", "==", "+", "-", "*", "/", "^", "||", "&&"];

impl OperatorTable {
    /// Builds a table with only the built-in operators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table with the built-in operators plus the given UDFs.
    /// UDFs registered under the same lexeme as a built-in take
    /// precedence.
    pub fn with_udfs(udfs: Vec<Udf>) -> Self {
        let mut custom = HashMap::with_capacity(udfs.len());
        for udf in udfs {
            custom.insert(udf.token, udf.op);
        }
        Self { custom }
    }

    /// Returns every lexeme this table will recognize as an operator:
    /// the built-ins plus any registered UDF tokens.
    pub fn known_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = BUILTIN_OPERATORS.iter().map(|s| s.to_string()).collect();
        for token in self.custom.keys() {
            if !tokens.contains(token) {
                tokens.push(token.clone());
            }
        }
        tokens
    }

    /// Returns whether `token` is recognized as an operator lexeme,
    /// built-in or user-defined.
    pub fn is_operator_token(&self, token: &str) -> bool {
        self.custom.contains_key(token) || BUILTIN_OPERATORS.contains(&token)
    }

    /// Applies the operator named `op` to `left` and `right`.
    pub fn apply(&self, op: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
        if let Some(f) = self.custom.get(op) {
            return f(left, right);
        }
        builtin(op, left, right)
    }
}

fn type_mismatch(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::IncompatibleOperation {
        op: op.to_string(),
        left: left.value_type(),
        right: right.value_type(),
        index: 0,
    }
}

fn unsupported(op: &str) -> EvalError {
    EvalError::UnsupportedOperation {
        op: op.to_string(),
        index: 0,
    }
}

fn builtin(op: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        "+" => add(left, right),
        "-" => arith(op, left, right, |a, b| a - b),
        "*" => arith(op, left, right, |a, b| a * b),
        "/" => div(left, right),
        "<" => lt(left, right),
        ">" => gt(left, right),
        "<=" => lte(left, right),
        ">=" => gte(left, right),
        "==" => eq(left, right),
        "||" => logical(op, left, right, |a, b| a || b),
        "&&" => logical(op, left, right, |a, b| a && b),
        _ => Err(unsupported(op)),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        _ => Err(type_mismatch("+", left, right)),
    }
}

fn arith(op: &str, left: &Value, right: &Value, f: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        _ => Err(type_mismatch(op, left, right)),
    }
}

fn div(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(_), Value::Number(b)) if *b == 0.0 => Err(EvalError::DivisionByZero { index: 0 }),
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
        _ => Err(type_mismatch("/", left, right)),
    }
}

/// `<` for numbers and strings (lexicographic byte order).
fn lt(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(a < b)),
        _ => Err(type_mismatch("<", left, right)),
    }
}

/// `>` is implemented by delegating to `<` with swapped arguments,
/// then substituting the operator name in any resulting error.
fn gt(left: &Value, right: &Value) -> Result<Value, EvalError> {
    lt(right, left).map_err(|e| rename_mismatch(e, ">", left, right))
}

fn lte(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(a <= b)),
        _ => Err(type_mismatch("<=", left, right)),
    }
}

/// `>=` delegates to `<=` with swapped arguments, same mirror law as
/// `>`/`<`.
fn gte(left: &Value, right: &Value) -> Result<Value, EvalError> {
    lte(right, left).map_err(|e| rename_mismatch(e, ">=", left, right))
}

fn eq(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a == b)),
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a == b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(a == b)),
        _ => Err(type_mismatch("==", left, right)),
    }
}

fn logical(op: &str, left: &Value, right: &Value, f: impl Fn(bool, bool) -> bool) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(f(*a, *b))),
        _ => Err(type_mismatch(op, left, right)),
    }
}

fn rename_mismatch(err: EvalError, op: &str, left: &Value, right: &Value) -> EvalError {
    match err {
        EvalError::IncompatibleOperation { .. } => type_mismatch(op, left, right),
        other => other,
    }
}

/// Returns the shunting-yard precedence of an operator lexeme. Unknown
/// lexemes (including `&&`/`||`, per spec §4.2 and §9) fall into the
/// lowest default bucket.
pub fn precedence(op: &str) -> i32 {
    match op {
        "^" => 4,
        "*" | "/" => 3,
        "+" | "-" => 2,
        ">" | "<" | "==" | ">=" | "<=" => 1,
        _ => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn add_numbers() {
        let t = OperatorTable::new();
        assert_eq!(
            t.apply("+", &Value::Number(1.0), &Value::Number(2.0)).unwrap(),
            Value::Number(3.0)
        );
    }

    #[test]
    fn add_strings_concatenates() {
        let t = OperatorTable::new();
        assert_eq!(
            t.apply("+", &Value::Str("a".into()), &Value::Str("b".into())).unwrap(),
            Value::Str("ab".into())
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let t = OperatorTable::new();
        let err = t.apply("/", &Value::Number(1.0), &Value::Number(0.0)).unwrap_err();
        assert!(matches!(err, EvalError::DivisionByZero { .. }));
    }

    #[test]
    fn mismatched_types_are_incompatible() {
        let t = OperatorTable::new();
        let err = t
            .apply("+", &Value::Number(1.0), &Value::Str("x".into()))
            .unwrap_err();
        assert!(matches!(err, EvalError::IncompatibleOperation { .. }));
    }

    #[test]
    fn gt_mirrors_lt_with_swapped_args() {
        let t = OperatorTable::new();
        let a = Value::Number(3.0);
        let b = Value::Number(5.0);
        assert_eq!(t.apply(">", &b, &a).unwrap(), t.apply("<", &a, &b).unwrap());
    }

    #[test]
    fn gte_mirrors_lte_with_swapped_args() {
        let t = OperatorTable::new();
        let a = Value::Number(3.0);
        let b = Value::Number(3.0);
        assert_eq!(t.apply(">=", &b, &a).unwrap(), t.apply("<=", &a, &b).unwrap());
    }

    #[test]
    fn string_lt_is_lexicographic() {
        let t = OperatorTable::new();
        assert_eq!(
            t.apply("<", &Value::Str("abc".into()), &Value::Str("abd".into())).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn udf_overrides_builtin_by_lexeme() {
        let udf = Udf {
            token: "+".to_string(),
            op: Arc::new(|_a, _b| Ok(Value::Number(999.0))),
        };
        let t = OperatorTable::with_udfs(vec![udf]);
        assert_eq!(
            t.apply("+", &Value::Number(1.0), &Value::Number(1.0)).unwrap(),
            Value::Number(999.0)
        );
    }

    #[test]
    fn logical_operators_share_default_precedence() {
        assert_eq!(precedence("&&"), -1);
        assert_eq!(precedence("||"), -1);
        assert!(precedence(">") > precedence("&&"));
    }

    #[test]
    fn precedence_table_matches_spec() {
        assert_eq!(precedence("^"), 4);
        assert_eq!(precedence("*"), 3);
        assert_eq!(precedence("+"), 2);
        assert_eq!(precedence(">"), 1);
    }

    #[test]
    fn value_type_display_used_in_messages() {
        assert_eq!(ValueType::Number.to_string(), "number");
    }
}
