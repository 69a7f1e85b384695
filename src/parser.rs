//! Pratt parser: turns a [Lexer]'s token stream into a [Program].
//!
//! Follows the classic prefix/infix parselet table design: each [Kind] maps
//! to an optional prefix parselet and an optional infix parselet plus a
//! binding [Precedence]. [Parser::parse_expression] is the core loop.
//!
//! Cursor convention (shared by every parselet below): on entry, `current`
//! is the first token of the thing being parsed; on return, `current` is
//! the *last* token consumed by it — except block-bodied expressions
//! (`if`, `fn`, `{...}`), which land one token *past* their closing `}`,
//! since [Parser::parse_block] advances over it internally. That
//! asymmetry is what [crate::ast::is_block_like] exists to paper over at
//! the statement level.

use std::rc::Rc;

use log::trace;

use crate::ast::{is_block_like, Block, ElseIf, Expression, Program, Statement};
use crate::lexer::Lexer;
use crate::token::{Kind, Token};

/// Precedence rules, lowest to highest. Ordering drives
/// [Parser::parse_expression]'s decision to keep consuming infix operators.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord)]
pub enum Precedence {
    Lowest,
    /// `=`, right-associative — recurses at `Lowest`, one tier below itself.
    Assign,
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `==` `!=`
    Equals,
    /// `<` `>` `<=` `>=`
    LessGreater,
    /// `+` `-`
    Sum,
    /// `*` `/`
    Product,
    /// unary `-` `+` `!`
    Prefix,
    /// `(...)` call and `[...]` index
    Call,
}

fn precedence_of(kind: Kind) -> Precedence {
    match kind {
        Kind::Assign => Precedence::Assign,
        Kind::Or => Precedence::LogicalOr,
        Kind::And => Precedence::LogicalAnd,
        Kind::Eq | Kind::NotEq => Precedence::Equals,
        Kind::Lt | Kind::Gt | Kind::LtEq | Kind::GtEq => Precedence::LessGreater,
        Kind::Plus | Kind::Minus => Precedence::Sum,
        Kind::Asterisk | Kind::Slash => Precedence::Product,
        Kind::LParen | Kind::LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Parses a complete [Lexer] token stream, accumulating errors rather than
/// stopping at the first one.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    /// Errors accumulated over the whole parse, in source order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Parses every statement in the input, recovering from errors by
    /// skipping to the next statement boundary so one parse can report many
    /// mistakes.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();
        while !self.current_is(Kind::Eof) {
            match self.parse_statement() {
                Some(stmt) => program.push(stmt),
                None => self.synchronize(),
            }
        }
        program
    }

    fn next_token(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn current_is(&self, kind: Kind) -> bool {
        self.current.kind() == kind
    }

    fn peek_is(&self, kind: Kind) -> bool {
        self.peek.kind() == kind
    }

    /// Advances only if `peek` matches `kind`; otherwise records an error
    /// and leaves the cursor untouched.
    fn expect_peek(&mut self, kind: Kind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            self.errors
                .push(format!("expected {kind}, got {}", self.peek.kind()));
            false
        }
    }

    /// Skips tokens until the statement that caused an error is behind us:
    /// consumes up to and including the next `;`, or stops at `EOF`.
    fn synchronize(&mut self) {
        while !self.current_is(Kind::Eof) && !self.current_is(Kind::Semicolon) {
            self.next_token();
        }
        if self.current_is(Kind::Semicolon) {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind() {
            Kind::Let => self.parse_let_statement(),
            Kind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(Kind::Ident) {
            return None;
        }
        let name = self.current.literal().to_string();

        if !self.expect_peek(Kind::Assign) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.finish_statement(&value)?;
        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if self.peek_is(Kind::Semicolon) {
            self.next_token();
            if !self.finish_bare_statement() {
                return None;
            }
            return Some(Statement::Return { value: None });
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.finish_statement(&value)?;
        Some(Statement::Return { value: Some(value) })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.finish_statement(&expr)?;
        Some(Statement::Expr(expr))
    }

    /// Enforces the cursor discipline shared by every statement kind: a
    /// block-like expression (`if`, `fn`, `{...}`) is already positioned
    /// past its final `}` and needs no further advance, with `;` optional;
    /// anything else must advance once onto its (required) trailing `;`.
    fn finish_statement(&mut self, expr: &Expression) -> Option<()> {
        if is_block_like(expr) {
            self.skip_semicolons();
            return Some(());
        }
        self.next_token();
        if !self.current_is(Kind::Semicolon) {
            self.errors
                .push(format!("expected ;, got {}", self.current.kind()));
            return None;
        }
        self.skip_semicolons();
        Some(())
    }

    /// Same cursor discipline as [Self::finish_statement], for the
    /// expression-less `return;` form, whose cursor is still sitting on
    /// the token right before the `;` when called.
    fn finish_bare_statement(&mut self) -> bool {
        if !self.current_is(Kind::Semicolon) {
            self.errors
                .push(format!("expected ;, got {}", self.current.kind()));
            return false;
        }
        self.skip_semicolons();
        true
    }

    fn skip_semicolons(&mut self) {
        while self.current_is(Kind::Semicolon) {
            self.next_token();
        }
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind())
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(self.current.kind())
    }

    /// Core Pratt loop: parse one prefix expression, then keep absorbing
    /// infix operators whose precedence is still above `precedence`.
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        trace!(
            "parse_expression({precedence:?}), current = {:?}",
            self.current.kind()
        );

        let mut left = self.parse_prefix()?;

        while !self.peek_is(Kind::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind() {
            Kind::Ident => Some(Expression::Identifier(self.current.literal().to_string())),
            Kind::Int => self.parse_int_literal(),
            Kind::Str => Some(Expression::StringLiteral(self.current.literal().to_string())),
            Kind::True => Some(Expression::BoolLiteral(true)),
            Kind::False => Some(Expression::BoolLiteral(false)),
            Kind::Bang | Kind::Minus | Kind::Plus => self.parse_prefix_expression(),
            Kind::LParen => self.parse_grouped_expression(),
            Kind::LBrace => self.parse_block_expression(),
            Kind::If => self.parse_if_expression(),
            Kind::Function => self.parse_fn_expression(),
            Kind::LBracket => self.parse_array_literal(),
            Kind::Hash => self.parse_hash_literal(),
            other => {
                self.errors
                    .push(format!("no prefix parse function for '{other}' found"));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.current.kind() {
            Kind::LParen => self.parse_call_expression(left),
            Kind::LBracket => self.parse_index_expression(left),
            Kind::Assign => self.parse_assign_expression(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_int_literal(&mut self) -> Option<Expression> {
        let text: String = self
            .current
            .literal()
            .chars()
            .filter(|&c| c != '_')
            .collect();
        match text.parse::<i64>() {
            Ok(value) => Some(Expression::IntLiteral(value)),
            Err(_) => {
                self.errors
                    .push(format!("could not parse {text:?} as integer"));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = self.current.literal().to_string();
        self.next_token();
        let operand = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = self.current.literal().to_string();
        let precedence = self.current_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// `=` is right-associative: recursing at [Precedence::Lowest] — one
    /// tier below [Precedence::Assign] itself — lets a chain like
    /// `x = y = 5` absorb the second `=` on the right rather than stopping
    /// after `y`.
    fn parse_assign_expression(&mut self, left: Expression) -> Option<Expression> {
        if !matches!(left, Expression::Identifier(_)) {
            self.errors
                .push("left side of assignment must be an identifier".to_string());
            return None;
        }
        self.next_token();
        let right = self.parse_expression(Precedence::Lowest)?;
        Some(Expression::Infix {
            operator: "=".to_string(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(Kind::RParen) {
            return None;
        }
        Some(expr)
    }

    /// Parses a `{...}` block. Assumes `current` is the opening `{`; on
    /// success, leaves `current` one token *past* the closing `}`.
    fn parse_block(&mut self) -> Option<Block> {
        self.next_token();
        let mut statements = Block::new();
        while !self.current_is(Kind::RBrace) && !self.current_is(Kind::Eof) {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }
        if !self.current_is(Kind::RBrace) {
            self.errors
                .push("block expression is missing closing '}'".to_string());
            return None;
        }
        self.next_token();
        Some(statements)
    }

    fn parse_block_expression(&mut self) -> Option<Expression> {
        let block = self.parse_block()?;
        Some(Expression::Block(Rc::new(block)))
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(Kind::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(Kind::RParen) {
            return None;
        }
        if !self.expect_peek(Kind::LBrace) {
            return None;
        }
        let consequence = Rc::new(self.parse_block()?);

        let mut else_ifs = Vec::new();
        let mut alternative = None;
        while self.current_is(Kind::Else) && self.peek_is(Kind::If) {
            self.next_token(); // onto `if`
            if !self.expect_peek(Kind::LParen) {
                return None;
            }
            self.next_token();
            let cond = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(Kind::RParen) {
                return None;
            }
            if !self.expect_peek(Kind::LBrace) {
                return None;
            }
            let block = Rc::new(self.parse_block()?);
            else_ifs.push(ElseIf {
                condition: cond,
                block,
            });
        }

        if self.current_is(Kind::Else) {
            if !self.expect_peek(Kind::LBrace) {
                return None;
            }
            alternative = Some(Rc::new(self.parse_block()?));
        }

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            else_ifs,
            alternative,
        })
    }

    fn parse_fn_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(Kind::LParen) {
            return None;
        }
        let mut params = Vec::new();
        self.next_token();
        while !self.current_is(Kind::RParen) && !self.current_is(Kind::Eof) {
            if !self.current_is(Kind::Ident) {
                self.errors
                    .push(format!("expected IDENT, got {}", self.current.kind()));
                return None;
            }
            params.push(self.current.literal().to_string());

            if self.peek_is(Kind::Comma) {
                self.next_token();
            }
            self.next_token();
        }
        if self.current_is(Kind::Eof) {
            self.errors
                .push("fn expression is missing closing ')'".to_string());
            return None;
        }
        if !self.expect_peek(Kind::LBrace) {
            return None;
        }
        let body = self.parse_block()?;
        Some(Expression::Fn {
            params: Rc::new(params),
            body: Rc::new(body),
        })
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(Kind::RParen)?;
        Some(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, target: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(Kind::RBracket) {
            return None;
        }
        Some(Expression::Index {
            target: Box::new(target),
            index: Box::new(index),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(Kind::RBracket)?;
        Some(Expression::ArrayLiteral(elements))
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(Kind::LBrace) {
            return None;
        }
        let mut pairs = Vec::new();
        if self.peek_is(Kind::RBrace) {
            self.next_token();
            return Some(Expression::HashLiteral(pairs));
        }
        self.next_token();
        loop {
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(Kind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek_is(Kind::Comma) {
                self.next_token();
                self.next_token();
            } else {
                break;
            }
        }
        if !self.expect_peek(Kind::RBrace) {
            return None;
        }
        Some(Expression::HashLiteral(pairs))
    }

    /// Parses a comma-separated list of expressions. Assumes `current` is
    /// the opening delimiter; on success, leaves `current` on `closing`.
    fn parse_expression_list(&mut self, closing: Kind) -> Option<Vec<Expression>> {
        let mut items = Vec::new();
        if self.peek_is(closing) {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(Kind::Comma) {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(closing) {
            return None;
        }
        Some(items)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(
            !parser.has_errors(),
            "unexpected parse errors: {:?}",
            parser.errors()
        );
        program
    }

    fn parse_one_expr(source: &str) -> Expression {
        let program = parse(source);
        assert_eq!(1, program.len());
        match program.into_iter().next().unwrap() {
            Statement::Expr(e) => e,
            other => panic!("expected an expression statement, got {other}"),
        }
    }

    #[test]
    fn chained_assignment_is_right_associative() {
        assert_eq!("(x = (y = 5))", parse_one_expr("x = y = 5;").to_string());
    }

    #[test]
    fn product_binds_tighter_than_sum() {
        assert_eq!("(5 + (3 * 2))", parse_one_expr("5 + 3 * 2;").to_string());
    }

    #[test]
    fn equality_binds_looser_than_prefix() {
        assert_eq!(
            "((!true) == false)",
            parse_one_expr("!true == false;").to_string()
        );
    }

    #[test]
    fn logical_operators_bind_looser_than_comparison() {
        assert_eq!(
            "((a + b) && (c + d))",
            parse_one_expr("a + b && c + d;").to_string()
        );
    }

    #[test]
    fn logical_or_binds_looser_than_logical_and() {
        assert_eq!(
            "(a || (b && c))",
            parse_one_expr("a || b && c;").to_string()
        );
    }

    #[test]
    fn call_and_index_are_highest_precedence() {
        assert_eq!("(-foo(1)[0])", parse_one_expr("-foo(1)[0];").to_string());
    }

    #[test]
    fn less_equal_and_greater_equal_parse_as_infix() {
        assert_eq!("(a <= b)", parse_one_expr("a <= b;").to_string());
        assert_eq!("(a >= b)", parse_one_expr("a >= b;").to_string());
    }

    #[test]
    fn two_independent_errors_are_both_reported_and_produce_no_nodes() {
        let mut parser = Parser::new(Lexer::new("let = 5; let y + ;"));
        let program = parser.parse_program();
        assert_eq!(0, program.len());
        assert_eq!(2, parser.errors().len());
    }

    #[test]
    fn if_else_if_else_parses_every_branch() {
        let expr = parse_one_expr("if (false) {1} else if (true) {2} else {3};");
        match expr {
            Expression::If {
                else_ifs,
                alternative,
                ..
            } => {
                assert_eq!(1, else_ifs.len());
                assert!(alternative.is_some());
            }
            other => panic!("expected an if expression, got {other}"),
        }
    }

    #[test]
    fn function_literal_parses_params_and_body() {
        let expr = parse_one_expr("fn(x, y) { x + y; };");
        match expr {
            Expression::Fn { params, body } => {
                assert_eq!(vec!["x".to_string(), "y".to_string()], *params);
                assert_eq!(1, body.len());
            }
            other => panic!("expected a function literal, got {other}"),
        }
    }

    #[test]
    fn zero_parameter_empty_body_function_is_legal() {
        let expr = parse_one_expr("fn() {};");
        match expr {
            Expression::Fn { params, body } => {
                assert!(params.is_empty());
                assert!(body.is_empty());
            }
            other => panic!("expected a function literal, got {other}"),
        }
    }

    #[test]
    fn hash_literal_parses_pairs() {
        let expr = parse_one_expr("#{1: \"a\", 2: \"b\"};");
        match expr {
            Expression::HashLiteral(pairs) => assert_eq!(2, pairs.len()),
            other => panic!("expected a hash literal, got {other}"),
        }
    }

    #[test]
    fn array_literal_parses_arbitrary_expressions() {
        let expr = parse_one_expr("[1, 2 + 3, foo(4)];");
        match expr {
            Expression::ArrayLiteral(elements) => assert_eq!(3, elements.len()),
            other => panic!("expected an array literal, got {other}"),
        }
    }

    #[test]
    fn return_with_no_value_parses_as_none() {
        let program = parse("return;");
        match &program[0] {
            Statement::Return { value: None } => {}
            other => panic!("expected a bare return, got {other}"),
        }
    }

    #[test]
    fn block_like_expression_statement_does_not_require_semicolon() {
        let program = parse("if (true) { 1 } let x = 2;");
        assert_eq!(2, program.len());
    }

    #[test]
    fn call_expression_accepts_arbitrary_argument_expressions() {
        let expr = parse_one_expr("add(1 + 2, bar());");
        match expr {
            Expression::Call { arguments, .. } => assert_eq!(2, arguments.len()),
            other => panic!("expected a call expression, got {other}"),
        }
    }
}
