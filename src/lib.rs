//! A tree-walking interpreter for a small, dynamically-typed,
//! expression-oriented scripting language in the Monkey family.
//!
//! Source text flows through four stages, one module each:
//! [lexer] → [parser] (a Pratt parser producing an [ast]) → [evaluator],
//! which walks the tree directly against a chain of [scope::Scope]
//! frames, calling into [builtins] for native functions.

pub mod ast;
pub mod builtins;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token;
pub mod value;

/// The type returned by the binary's top-level read/parse/run operations.
/// The error is always [error::InterpretationError].
///
/// ```
/// fn run() -> monkey_lang::Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, error::InterpretationError>;

/// Re-exports the items a caller typically needs to parse and evaluate a
/// program without reaching into every module individually.
pub mod prelude {
    pub use crate::ast::{Expression, Program, Statement};
    pub use crate::error::InterpretationError;
    pub use crate::evaluator::eval_program;
    pub use crate::lexer::Lexer;
    pub use crate::parser::Parser;
    pub use crate::scope::Scope;
    pub use crate::value::Value;
}

/// Parses and evaluates `source` in a fresh global scope. Returns the
/// final statement's value, or an [error::InterpretationError] if parsing
/// failed or the program evaluated to a runtime error.
pub fn run(source: &str) -> Result<value::Value> {
    run_in(source, &scope::Scope::new())
}

/// Parses and evaluates `source` in the given scope, so a caller (such as
/// the REPL) can thread bindings across successive calls.
pub fn run_in(source: &str, scope: &scope::Scope) -> Result<value::Value> {
    let mut parser = parser::Parser::new(lexer::Lexer::new(source));
    let program = parser.parse_program();
    if parser.has_errors() {
        return Err(error::InterpretationError::Parse(parser.errors().to_vec()));
    }
    match evaluator::eval_program(&program, scope) {
        value::Value::Error(message) => Err(error::InterpretationError::Runtime(message)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_reports_parse_errors() {
        assert!(run("let = 5;").is_err());
    }

    #[test]
    fn run_reports_runtime_errors() {
        assert!(matches!(
            run("1 + true;"),
            Err(error::InterpretationError::Runtime(_))
        ));
    }

    #[test]
    fn run_in_threads_bindings_across_calls() {
        let scope = scope::Scope::new();
        run_in("let x = 5;", &scope).unwrap();
        assert_eq!(value::Value::Int(5), run_in("x;", &scope).unwrap());
    }
}
