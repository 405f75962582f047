//! The tagged value model shared by the expression evaluator and the
//! rule-graph evaluator.
//!
//! A [`Value`] is a tagged union over exactly one of a boolean, a
//! 64-bit float, or a UTF-8 string. Every value carries its tag; there
//! is no implicit coercion between variants anywhere in this crate.

use serde::Serialize;

/// A runtime value produced by lexing a literal or evaluating an
/// expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// A 64-bit floating point number. Integer-typed bindings are
    /// promoted into this variant losslessly when representable.
    Number(f64),
    /// A UTF-8 string.
    Str(String),
}

/// The type tag carried alongside a [`Value`].
///
/// Kept as a separate enum (rather than matching on `Value` directly)
/// because the operator table and the rule-graph response both need
/// to talk about "the type of a value" without owning the value
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Tag for [`Value::Bool`].
    Bool,
    /// Tag for [`Value::Number`].
    Number,
    /// Tag for [`Value::Str`].
    Str,
}

impl Value {
    /// Returns the [`ValueType`] tag for this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Number(_) => ValueType::Number,
            Value::Str(_) => ValueType::Str,
        }
    }

    /// Returns the boolean payload, if this value is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this value is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if this value is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Number => "number",
            ValueType::Str => "string",
        };
        f.write_str(name)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for ValueType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_tags_match_variant() {
        assert_eq!(Value::Bool(true).value_type(), ValueType::Bool);
        assert_eq!(Value::Number(1.0).value_type(), ValueType::Number);
        assert_eq!(Value::Str("x".into()).value_type(), ValueType::Str);
    }

    #[test]
    fn display_names_match_spec_wire_names() {
        assert_eq!(ValueType::Bool.to_string(), "bool");
        assert_eq!(ValueType::Number.to_string(), "number");
        assert_eq!(ValueType::Str.to_string(), "string");
    }
}
