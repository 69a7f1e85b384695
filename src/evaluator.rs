//! Tree-walking evaluation of a parsed [crate::ast::Program].
//!
//! Two kinds of values carry control flow rather than data: [Value::Error]
//! and [Value::Return]. Every statement/expression evaluator here checks
//! for both immediately after evaluating a sub-node and, if found, returns
//! it unchanged instead of continuing — this is the "error and return
//! short-circuit" that `eval_block` and `eval_program` rely on. `Return` is
//! unwrapped exactly once, at the boundary of a function call
//! ([eval_call]), so a `return` nested inside an `if` inside a function
//! body propagates all the way out of the body but no further.

use crate::ast::{Block, ElseIf, Expression, Program, Statement};
use crate::builtins;
use crate::scope::Scope;
use crate::value::Value;

/// Evaluates a whole program directly in `scope`, without spawning a child
/// — top-level `let` bindings land in the scope the caller supplied.
pub fn eval_program(program: &Program, scope: &Scope) -> Value {
    let mut result = Value::Null;
    for stmt in program {
        result = eval_statement(stmt, scope);
        if matches!(result, Value::Error(_) | Value::Return(_)) {
            return result;
        }
    }
    result
}

/// Evaluates a `{ ... }` block's statements in `scope`. Callers spawn the
/// child scope ([Scope::spawn]) before calling this — `If`/function bodies
/// each get their own frame, but the block evaluator itself is agnostic to
/// where that frame came from.
fn eval_block(block: &Block, scope: &Scope) -> Value {
    let mut result = Value::Null;
    for stmt in block {
        result = eval_statement(stmt, scope);
        if matches!(result, Value::Error(_) | Value::Return(_)) {
            return result;
        }
    }
    result
}

fn eval_statement(stmt: &Statement, scope: &Scope) -> Value {
    match stmt {
        Statement::Let { name, value } => {
            let value = eval_expression(value, scope);
            if value.is_error() {
                return value;
            }
            scope.define(name.clone(), value.clone());
            value
        }
        Statement::Return { value } => {
            let inner = match value {
                Some(expr) => eval_expression(expr, scope),
                None => Value::Null,
            };
            if inner.is_error() {
                return inner;
            }
            Value::Return(Box::new(inner))
        }
        Statement::Expr(expr) => eval_expression(expr, scope),
    }
}

fn eval_expression(expr: &Expression, scope: &Scope) -> Value {
    match expr {
        Expression::Identifier(name) => eval_identifier(name, scope),
        Expression::IntLiteral(n) => Value::Int(*n),
        Expression::BoolLiteral(b) => Value::Bool(*b),
        Expression::StringLiteral(s) => Value::string(s.as_str()),
        Expression::ArrayLiteral(elements) => eval_array_literal(elements, scope),
        Expression::HashLiteral(pairs) => eval_hash_literal(pairs, scope),
        Expression::Prefix { operator, operand } => {
            let value = eval_expression(operand, scope);
            if value.is_error() {
                return value;
            }
            eval_prefix_expression(operator, &value)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => eval_infix_expression(operator, left, right, scope),
        Expression::If {
            condition,
            consequence,
            else_ifs,
            alternative,
        } => eval_if_expression(condition, consequence, else_ifs, alternative, scope),
        Expression::Block(block) => eval_block(block, &scope.spawn()),
        Expression::Fn { params, body } => Value::Fn {
            params: params.clone(),
            body: body.clone(),
            scope: scope.clone(),
        },
        Expression::Call { callee, arguments } => eval_call(callee, arguments, scope),
        Expression::Index { target, index } => eval_index_expression(target, index, scope),
    }
}

fn eval_identifier(name: &str, scope: &Scope) -> Value {
    match scope.lookup(name) {
        Some(value) => value,
        None => Value::error(format!("identifier {name} not found")),
    }
}

fn eval_array_literal(elements: &[Expression], scope: &Scope) -> Value {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        let value = eval_expression(element, scope);
        if value.is_error() {
            return value;
        }
        values.push(value);
    }
    Value::Array(std::rc::Rc::new(values))
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], scope: &Scope) -> Value {
    let mut map = std::collections::HashMap::with_capacity(pairs.len());
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, scope);
        if key.is_error() {
            return key;
        }
        let value = eval_expression(value_expr, scope);
        if value.is_error() {
            return value;
        }
        let hash_key = match key.as_hash_key() {
            Some(hash_key) => hash_key,
            None => {
                return Value::error(format!(
                    "index must be [STRING, INT, BOOL], but was {}",
                    key.type_tag()
                ))
            }
        };
        map.insert(hash_key, value);
    }
    Value::Hash(std::rc::Rc::new(map))
}

fn eval_prefix_expression(operator: &str, operand: &Value) -> Value {
    match (operator, operand) {
        ("!", value @ (Value::Int(_) | Value::Bool(_) | Value::String(_))) => {
            Value::Bool(!value.is_truthy())
        }
        ("-", Value::Int(n)) => Value::Int(n.wrapping_neg()),
        ("+", Value::Int(n)) => Value::Int(*n),
        (op, value) => Value::error(format!(
            "cannot perform operation '{op}{}'",
            value.type_tag()
        )),
    }
}

/// Evaluates an infix expression. `=` is special-cased before either side
/// is evaluated: its left operand must remain an unevaluated identifier
/// name, not a resolved value, so it's matched directly against
/// `Expression::Identifier` rather than going through [eval_expression].
fn eval_infix_expression(
    operator: &str,
    left: &Expression,
    right: &Expression,
    scope: &Scope,
) -> Value {
    if operator == "=" {
        return eval_assign_expression(left, right, scope);
    }

    let left_value = eval_expression(left, scope);
    if left_value.is_error() {
        return left_value;
    }
    let right_value = eval_expression(right, scope);
    if right_value.is_error() {
        return right_value;
    }

    // `&&`/`||` evaluate both sides unconditionally — no short-circuit.
    match operator {
        "&&" => return Value::Bool(left_value.is_truthy() && right_value.is_truthy()),
        "||" => return Value::Bool(left_value.is_truthy() || right_value.is_truthy()),
        _ => {}
    }

    apply_infix_operator(operator, &left_value, &right_value)
}

fn apply_infix_operator(operator: &str, left: &Value, right: &Value) -> Value {
    use Value::*;
    match (operator, left, right) {
        ("+", Int(a), Int(b)) => Int(a.wrapping_add(*b)),
        ("+", String(_) | Int(_), String(_) | Int(_)) => {
            Value::string(format!("{left}{right}"))
        }
        ("-", Int(a), Int(b)) => Int(a.wrapping_sub(*b)),
        ("*", Int(a), Int(b)) => Int(a.wrapping_mul(*b)),
        ("*", String(s), Int(n)) | ("*", Int(n), String(s)) => {
            Value::string(s.repeat((*n).max(0) as usize))
        }
        ("/", Int(_), Int(0)) => Value::error("division by zero"),
        ("/", Int(a), Int(b)) => Int(a.wrapping_div(*b)),
        ("<", Int(a), Int(b)) => Bool(a < b),
        (">", Int(a), Int(b)) => Bool(a > b),
        ("<=", Int(a), Int(b)) => Bool(a <= b),
        (">=", Int(a), Int(b)) => Bool(a >= b),
        ("==", Int(a), Int(b)) => Bool(a == b),
        ("==", Bool(a), Bool(b)) => Bool(a == b),
        ("==", String(a), String(b)) => Bool(a == b),
        ("!=", Int(a), Int(b)) => Bool(a != b),
        ("!=", Bool(a), Bool(b)) => Bool(a != b),
        ("!=", String(a), String(b)) => Bool(a != b),
        (op, l, r) => Value::error(format!(
            "cannot perform operation '{} {op} {}'",
            l.type_tag(),
            r.type_tag()
        )),
    }
}

fn eval_assign_expression(left: &Expression, right: &Expression, scope: &Scope) -> Value {
    let name = match left {
        Expression::Identifier(name) => name,
        other => {
            return Value::error(format!(
                "cannot assign to non-identifier expression '{other}'"
            ))
        }
    };
    let value = eval_expression(right, scope);
    if value.is_error() {
        return value;
    }
    if !scope.assign(name, value.clone()) {
        return Value::error(format!("{name} is not defined"));
    }
    value
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &Block,
    else_ifs: &[ElseIf],
    alternative: &Option<std::rc::Rc<Block>>,
    scope: &Scope,
) -> Value {
    let condition_value = eval_expression(condition, scope);
    if condition_value.is_error() {
        return condition_value;
    }
    if condition_value.is_truthy() {
        return eval_block(consequence, &scope.spawn());
    }
    for else_if in else_ifs {
        let branch_condition = eval_expression(&else_if.condition, scope);
        if branch_condition.is_error() {
            return branch_condition;
        }
        if branch_condition.is_truthy() {
            return eval_block(&else_if.block, &scope.spawn());
        }
    }
    match alternative {
        Some(block) => eval_block(block, &scope.spawn()),
        None => Value::Null,
    }
}

/// Calls are resolved builtin-first: if the callee is a bare identifier
/// whose surface text names a builtin, that builtin wins even if the name
/// has also been bound to some other value in scope. Only once that check
/// fails does the callee get evaluated as an ordinary expression.
fn eval_call(callee: &Expression, arguments: &[Expression], scope: &Scope) -> Value {
    if let Expression::Identifier(name) = callee {
        if let Some(builtin) = builtins::lookup(name) {
            return eval_call_arguments(arguments, scope)
                .map_or_else(|err| err, |args| (builtin.func)(&args));
        }
    }

    let callee_value = eval_expression(callee, scope);
    if callee_value.is_error() {
        return callee_value;
    }

    let args = match eval_call_arguments(arguments, scope) {
        Ok(args) => args,
        Err(err) => return err,
    };

    match callee_value {
        Value::Fn {
            params,
            body,
            scope: captured,
        } => {
            if params.len() != args.len() {
                return Value::error(format!(
                    "wrong arity: expected {}, got {}",
                    params.len(),
                    args.len()
                ));
            }
            let call_scope = captured.spawn();
            for (param, arg) in params.iter().zip(args) {
                call_scope.define(param.clone(), arg);
            }
            match eval_block(&body, &call_scope) {
                Value::Return(value) => *value,
                other => other,
            }
        }
        Value::Builtin(builtin) => (builtin.func)(&args),
        other => Value::error(format!(
            "'{callee}' is not a function, got {}",
            other.type_tag()
        )),
    }
}

fn eval_call_arguments(arguments: &[Expression], scope: &Scope) -> Result<Vec<Value>, Value> {
    let mut values = Vec::with_capacity(arguments.len());
    for arg in arguments {
        let value = eval_expression(arg, scope);
        if value.is_error() {
            return Err(value);
        }
        values.push(value);
    }
    Ok(values)
}

fn eval_index_expression(target: &Expression, index: &Expression, scope: &Scope) -> Value {
    let target_value = eval_expression(target, scope);
    if target_value.is_error() {
        return target_value;
    }
    let index_value = eval_expression(index, scope);
    if index_value.is_error() {
        return index_value;
    }

    match &target_value {
        Value::Array(items) => index_array(items, &index_value),
        Value::String(s) => index_string(s, &index_value),
        Value::Hash(map) => index_hash(map, &index_value),
        other => Value::error(format!(
            "can index only [STRING, ARRAY, HASH], but was {}",
            other.type_tag()
        )),
    }
}

fn index_array(items: &[Value], index: &Value) -> Value {
    let i = match index {
        Value::Int(n) => *n,
        other => {
            return Value::error(format!(
                "index must be INT, but was {}",
                other.type_tag()
            ))
        }
    };
    match usize::try_from(i).ok().and_then(|i| items.get(i)) {
        Some(value) => value.clone(),
        None => Value::error(format!(
            "index {i} out of bounds for array of length {}",
            items.len()
        )),
    }
}

fn index_string(s: &str, index: &Value) -> Value {
    let i = match index {
        Value::Int(n) => *n,
        other => {
            return Value::error(format!(
                "index must be INT, but was {}",
                other.type_tag()
            ))
        }
    };
    let chars: Vec<char> = s.chars().collect();
    match usize::try_from(i).ok().and_then(|i| chars.get(i)) {
        Some(ch) => Value::string(ch.to_string()),
        None => Value::error(format!(
            "index {i} out of bounds for string of length {}",
            chars.len()
        )),
    }
}

fn index_hash(map: &std::collections::HashMap<crate::value::HashKey, Value>, index: &Value) -> Value {
    match index.as_hash_key() {
        Some(key) => map.get(&key).cloned().unwrap_or(Value::Null),
        None => Value::error(format!(
            "index must be [STRING, INT, BOOL], but was {}",
            index.type_tag()
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval_source(source: &str) -> Value {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(!parser.has_errors(), "parse errors: {:?}", parser.errors());
        eval_program(&program, &Scope::new())
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(Value::Int(14), eval_source("2 + 3 * 4;"));
    }

    #[test]
    fn string_int_concatenation_matches_inspect_forms() {
        assert_eq!(
            Value::string("ababab 5"),
            eval_source("\"ab\" * 3 + \" \" + 5;")
        );
    }

    #[test]
    fn division_by_zero_is_an_error_value() {
        assert_eq!(Value::error("division by zero"), eval_source("1 / 0;"));
    }

    #[test]
    fn bang_rejects_kinds_outside_int_bool_string() {
        assert_eq!(
            Value::error("cannot perform operation '!NULL'"),
            eval_source("!(if (false) { 1 });")
        );
        assert!(eval_source("!([1, 2]);").is_error());
        assert!(eval_source("!(#{1: 2});").is_error());
        assert!(eval_source("!(fn() {});").is_error());
    }

    #[test]
    fn logical_operators_do_not_short_circuit() {
        // Both sides evaluate; `x` ends up reassigned regardless of `&&`'s
        // left operand being false.
        let result = eval_source("let x = 0; false && (x = 1); x;");
        assert_eq!(Value::Int(1), result);
    }

    #[test]
    fn closures_capture_their_defining_scope_by_identity() {
        let result = eval_source(
            "let mkCtr = fn() { let count = 0; fn() { count = count + 1; count } };
             let counter = mkCtr();
             counter();
             counter();
             counter();",
        );
        assert_eq!(Value::Int(3), result);
    }

    #[test]
    fn recursive_map_over_an_array() {
        let result = eval_source(
            "let map = fn(arr, f) {
                 if (len(arr) == 0) { [] }
                 else { push(map(rest(arr), f), f(first(arr))) }
             };
             map([1, 2, 3], fn(x) { x * 2 });",
        );
        assert_eq!(
            Value::Array(std::rc::Rc::new(vec![
                Value::Int(6),
                Value::Int(4),
                Value::Int(2)
            ])),
            result
        );
    }

    #[test]
    fn return_unwraps_exactly_once_at_call_boundary() {
        let result = eval_source(
            "let f = fn() {
                 if (true) { return 1; }
                 2
             };
             f() + 10;",
        );
        assert_eq!(Value::Int(11), result);
    }

    #[test]
    fn if_and_block_expressions_spawn_a_child_scope() {
        let result = eval_source("let x = 1; if (true) { let x = 2; }; x;");
        assert_eq!(Value::Int(1), result);
    }

    #[test]
    fn array_index_out_of_bounds_is_an_error() {
        let result = eval_source("[1, 2][5];");
        assert_eq!(
            Value::error("index 5 out of bounds for array of length 2"),
            result
        );
    }

    #[test]
    fn hash_missing_key_is_null_not_an_error() {
        assert_eq!(Value::Null, eval_source("#{\"a\": 1}[\"b\"];"));
    }

    #[test]
    fn assigning_to_an_unbound_name_is_an_error() {
        assert_eq!(Value::error("ghost is not defined"), eval_source("ghost = 1;"));
    }

    #[test]
    fn calling_a_non_function_is_an_error() {
        assert_eq!(
            Value::error("'x' is not a function, got INT"),
            eval_source("let x = 5; x();")
        );
    }

    #[test]
    fn builtin_resolution_wins_over_shadowing_bindings() {
        // `len` keeps its builtin meaning by surface text even though the
        // name has no binding in scope at all here — this just exercises
        // that calling it doesn't require it to be a bound value first.
        assert_eq!(Value::Int(3), eval_source("len([1, 2, 3]);"));
    }
}
