//! Abstract syntax tree produced by the [crate::parser].
//!
//! Every node that survives a successful parse is non-null; a parse error
//! produces no node at all and is recorded in the parser's error list
//! instead (see [crate::parser::Parser::errors]).
//!
//! [Expression]'s `Display` impl renders the canonical, fully-parenthesized
//! form used to assert parser precedence in tests, e.g. `5 + 3 * 2` prints
//! as `(5 + (3 * 2))`.

use std::fmt;
use std::rc::Rc;

/// An ordered sequence of statements. A program is a sequence of
/// statements evaluated without spawning a new scope (top-level `let`s
/// bind directly into the scope the caller provides).
pub type Program = Vec<Statement>;

/// A `{ ... }` block. Evaluates to the value of its last statement, or
/// `Null` if empty. Shared via `Rc` so that function bodies can be cloned
/// cheaply into `Value::Fn` without re-parsing.
pub type Block = Vec<Statement>;

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Let { name: String, value: Expression },
    Return { value: Option<Expression> },
    Expr(Expression),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value};"),
            Statement::Return { value: Some(v) } => write!(f, "return {v};"),
            Statement::Return { value: None } => write!(f, "return;"),
            Statement::Expr(e) => write!(f, "{e};"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElseIf {
    pub condition: Expression,
    pub block: Rc<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Identifier(String),
    IntLiteral(i64),
    BoolLiteral(bool),
    StringLiteral(String),
    ArrayLiteral(Vec<Expression>),
    HashLiteral(Vec<(Expression, Expression)>),
    Prefix {
        operator: String,
        operand: Box<Expression>,
    },
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: Rc<Block>,
        else_ifs: Vec<ElseIf>,
        alternative: Option<Rc<Block>>,
    },
    Block(Rc<Block>),
    Fn {
        params: Rc<Vec<String>>,
        body: Rc<Block>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
}

/// Returns true for the three expression kinds that end with `}` and are
/// therefore exempt from the cursor-advance/semicolon rule in
/// [crate::parser] (see `spec.md` §4.2, "Statement termination and cursor
/// discipline").
pub fn is_block_like(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::If { .. } | Expression::Block(_) | Expression::Fn { .. }
    )
}

fn fmt_block(block: &Block, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;
    for stmt in block {
        write!(f, "{stmt}")?;
    }
    f.write_str("}")
}

fn fmt_comma_separated<T: fmt::Display>(items: &[T], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => f.write_str(name),
            Expression::IntLiteral(n) => write!(f, "{n}"),
            Expression::BoolLiteral(b) => write!(f, "{b}"),
            Expression::StringLiteral(s) => f.write_str(s),
            Expression::ArrayLiteral(elements) => {
                f.write_str("[")?;
                fmt_comma_separated(elements, f)?;
                f.write_str("]")
            }
            Expression::HashLiteral(pairs) => {
                f.write_str("#{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("}")
            }
            Expression::Prefix { operator, operand } => write!(f, "({operator}{operand})"),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                else_ifs,
                alternative,
            } => {
                write!(f, "if ({condition}) ")?;
                fmt_block(consequence, f)?;
                for else_if in else_ifs {
                    write!(f, " else if ({}) ", else_if.condition)?;
                    fmt_block(&else_if.block, f)?;
                }
                if let Some(alt) = alternative {
                    f.write_str(" else ")?;
                    fmt_block(alt, f)?;
                }
                Ok(())
            }
            Expression::Block(block) => fmt_block(block, f),
            Expression::Fn { params, body } => {
                f.write_str("fn(")?;
                fmt_comma_separated(params, f)?;
                f.write_str(") ")?;
                fmt_block(body, f)
            }
            Expression::Call { callee, arguments } => {
                write!(f, "{callee}(")?;
                fmt_comma_separated(arguments, f)?;
                f.write_str(")")
            }
            Expression::Index { target, index } => write!(f, "{target}[{index}]"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn infix_display_is_fully_parenthesized() {
        let expr = Expression::Infix {
            operator: "+".into(),
            left: Box::new(Expression::IntLiteral(5)),
            right: Box::new(Expression::Infix {
                operator: "*".into(),
                left: Box::new(Expression::IntLiteral(3)),
                right: Box::new(Expression::IntLiteral(2)),
            }),
        };
        assert_eq!("(5 + (3 * 2))", expr.to_string());
    }

    #[test]
    fn prefix_display_has_no_space() {
        let expr = Expression::Prefix {
            operator: "!".into(),
            operand: Box::new(Expression::BoolLiteral(true)),
        };
        assert_eq!("(!true)", expr.to_string());
    }
}
