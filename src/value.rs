//! Runtime values produced by [crate::evaluator].
//!
//! A single closed [Value] sum type stands in for the dynamic typing of the
//! source language — no trait objects, no `Any`, so the evaluator's match
//! arms stay exhaustive and the compiler catches missing operator cases.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::Block;
use crate::scope::Scope;

/// A native function registered in the builtin table (see
/// [crate::builtins]). Carries its own name so `Inspect` can print it and
/// so arity/type errors can name it.
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub func: fn(&[Value]) -> Value,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A runtime value. `Return` and `Error` are transient control-flow
/// markers, not values a program can construct directly; see
/// [crate::evaluator] for how they're produced and unwrapped.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(Rc<str>),
    Null,
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashMap<HashKey, Value>>),
    Fn {
        params: Rc<Vec<String>>,
        body: Rc<Block>,
        scope: Scope,
    },
    Builtin(Builtin),
    Return(Box<Value>),
    Error(String),
}

/// The restricted set of value kinds that may key a [Value::Hash].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    Int(i64),
    Bool(bool),
    String(Rc<str>),
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKey::Int(n) => write!(f, "{n}"),
            HashKey::Bool(b) => write!(f, "{b}"),
            HashKey::String(s) => f.write_str(s),
        }
    }
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    /// The uppercase type tag used in error messages (`"INT"`, `"BOOL"`, …).
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Int(_) => "INT",
            Value::Bool(_) => "BOOL",
            Value::String(_) => "STRING",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Fn { .. } => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Return(_) => "RETURN",
            Value::Error(_) => "ERROR",
        }
    }

    /// Truthiness per the language's rules: `Int(0)` and the empty string
    /// are false; `Bool` is itself; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            _ => true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Converts this value into a [HashKey], if it's one of the kinds hash
    /// keys accept.
    pub fn as_hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(n) => Some(HashKey::Int(*n)),
            Value::Bool(b) => Some(HashKey::Bool(*b)),
            Value::String(s) => Some(HashKey::String(Rc::clone(s))),
            _ => None,
        }
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into())
    }
}

/// Surface/printable form used by `puts`, the REPL, and string
/// concatenation with non-string operands. See `spec.md` §6.2.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Null => f.write_str("null"),
            Value::Array(elements) => {
                f.write_str("[")?;
                for (i, el) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{el}")?;
                }
                f.write_str("]")
            }
            Value::Hash(map) => {
                f.write_str("#{ ")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str(" }")
            }
            Value::Fn { params, body, .. } => {
                write!(f, "fn ({}) {{", params.join(", "))?;
                for stmt in body.iter() {
                    write!(f, "{stmt}")?;
                }
                f.write_str("}")
            }
            Value::Builtin(b) => write!(f, "fn {}(...) {{ ...builtin... }}", b.name),
            Value::Return(inner) => write!(f, "{inner}"),
            Value::Error(msg) => f.write_str(msg),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_and_empty_string_are_falsy() {
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn nonzero_int_and_nonempty_string_are_truthy() {
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::string("x").is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }

    #[test]
    fn inspect_forms_match_surface_syntax() {
        assert_eq!("5", Value::Int(5).to_string());
        assert_eq!("true", Value::Bool(true).to_string());
        assert_eq!("null", Value::Null.to_string());
        let arr = Value::Array(Rc::new(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!("[1, 2]", arr.to_string());
    }
}
