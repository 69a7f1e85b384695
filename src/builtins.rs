//! The native function table: `len`, `first`, `last`, `rest`, `push`,
//! `puts`, `readFile`, `writeFile`.
//!
//! Builtins are resolved by [crate::evaluator] from the *surface text* of a
//! call's callee before the callee expression is evaluated at all, so a
//! user-defined rebinding of e.g. `len` never shadows the builtin.

use std::fs;
use std::rc::Rc;

use crate::value::{Builtin, Value};

/// Looks up a builtin by name. Returns `None` for anything not in the
/// table, letting the evaluator fall back to resolving the callee as an
/// ordinary bound value.
pub fn lookup(name: &str) -> Option<Builtin> {
    let func: fn(&[Value]) -> Value = match name {
        "len" => len,
        "first" => first,
        "last" => last,
        "rest" => rest,
        "push" => push,
        "puts" => puts,
        "readFile" => read_file,
        "writeFile" => write_file,
        _ => return None,
    };
    Some(Builtin {
        name: builtin_name(name),
        func,
    })
}

/// Recovers a `&'static str` for a known builtin name without allocating.
fn builtin_name(name: &str) -> &'static str {
    match name {
        "len" => "len",
        "first" => "first",
        "last" => "last",
        "rest" => "rest",
        "push" => "push",
        "puts" => "puts",
        "readFile" => "readFile",
        "writeFile" => "writeFile",
        _ => unreachable!("builtin_name called with unregistered name"),
    }
}

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "'len' requires at least one argument, but had {}",
            args.len()
        ));
    }
    match &args[0] {
        Value::String(s) => Value::Int(s.chars().count() as i64),
        Value::Array(items) => Value::Int(items.len() as i64),
        other => Value::error(format!(
            "'len' accepts only STRING or ARRAY arguments, but was {}",
            other.type_tag()
        )),
    }
}

fn first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "'first' requires exactly one argument, but had {}",
            args.len()
        ));
    }
    match &args[0] {
        Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "'first' accepts only ARRAY argument, but was {}",
            other.type_tag()
        )),
    }
}

fn last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "'last' requires exactly one argument, but had {}",
            args.len()
        ));
    }
    match &args[0] {
        Value::Array(items) => items.last().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "'last' accepts only ARRAY argument, but was {}",
            other.type_tag()
        )),
    }
}

fn rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!(
            "'rest' requires exactly one argument, but had {}",
            args.len()
        ));
    }
    match &args[0] {
        Value::Array(items) => {
            if items.is_empty() {
                Value::Array(Rc::new(Vec::new()))
            } else {
                Value::Array(Rc::new(items[1..].to_vec()))
            }
        }
        other => Value::error(format!(
            "'rest' accepts only ARRAY argument, but was {}",
            other.type_tag()
        )),
    }
}

/// Returns a fresh array; the original backing store is never mutated or
/// shared, so `let a=[1,2]; push(a,3); a` still yields `[1, 2]`.
fn push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return Value::error(format!(
            "'push' requires exactly two arguments, but had {}",
            args.len()
        ));
    }
    match &args[0] {
        Value::Array(items) => {
            let mut new_items = items.as_ref().clone();
            new_items.push(args[1].clone());
            Value::Array(Rc::new(new_items))
        }
        other => Value::error(format!(
            "'push' first argument must be ARRAY, but was {}",
            other.type_tag()
        )),
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        if matches!(arg, Value::Fn { .. } | Value::Builtin(_)) {
            return Value::error(format!("cannot call 'puts' on {}", arg.type_tag()));
        }
    }
    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    println!("{}", rendered.join(" "));
    Value::Null
}

fn read_file(args: &[Value]) -> Value {
    let path = match args {
        [Value::String(path)] => path,
        _ => {
            return Value::error(format!(
                "'readFile' accepts only single STRING argument, but was {}",
                arg_types(args)
            ))
        }
    };
    match fs::read_to_string(path.as_ref()) {
        Ok(contents) => Value::string(contents),
        Err(err) => Value::error(format!("'readFile': {err}")),
    }
}

fn write_file(args: &[Value]) -> Value {
    let (path, contents) = match args {
        [Value::String(path), Value::String(contents)] => (path, contents),
        _ => {
            return Value::error(format!(
                "'writeFile' accepts only path as STRING, and contents as STRING arguments, but was {}",
                arg_types(args)
            ))
        }
    };
    match fs::write(path.as_ref(), contents.as_bytes()) {
        Ok(()) => Value::Bool(true),
        Err(err) => Value::error(format!("'writeFile': {err}")),
    }
}

fn arg_types(args: &[Value]) -> String {
    args.iter()
        .map(Value::type_tag)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn len_counts_code_points_not_bytes() {
        let result = (lookup("len").unwrap().func)(&[Value::string("héllo")]);
        assert_eq!(Value::Int(5), result);
    }

    #[test]
    fn push_does_not_mutate_the_original_array() {
        let original = Value::Array(Rc::new(vec![Value::Int(1), Value::Int(2)]));
        let pushed = (lookup("push").unwrap().func)(&[original.clone(), Value::Int(3)]);
        assert_eq!(Value::Int(1), (lookup("first").unwrap().func)(&[original.clone()]));
        assert_eq!(Value::Int(2), (lookup("len").unwrap().func)(&[original]));
        match pushed {
            Value::Array(items) => assert_eq!(3, items.len()),
            other => panic!("expected an array, got {other:?}"),
        }
    }

    #[test]
    fn first_and_last_on_empty_array_are_null() {
        let empty = Value::Array(Rc::new(Vec::new()));
        assert_eq!(Value::Null, (lookup("first").unwrap().func)(&[empty.clone()]));
        assert_eq!(Value::Null, (lookup("last").unwrap().func)(&[empty]));
    }

    #[test]
    fn rest_on_empty_array_is_empty_array() {
        let empty = Value::Array(Rc::new(Vec::new()));
        match (lookup("rest").unwrap().func)(&[empty]) {
            Value::Array(items) => assert!(items.is_empty()),
            other => panic!("expected an array, got {other:?}"),
        }
    }

    #[test]
    fn len_on_non_string_non_array_errors() {
        assert!((lookup("len").unwrap().func)(&[Value::Int(1)]).is_error());
    }

    #[test]
    fn unknown_builtin_name_is_not_found() {
        assert!(lookup("nope").is_none());
    }
}
