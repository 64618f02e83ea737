//! Recursive-descent parser for the Rill language.

use crate::ast::{BinaryOp, Expr, Function, Program, Stmt, UnaryOp};
use crate::error::{EngineError, EngineResult};
use crate::lexer::lex;
use crate::token::{Spanned, Token};

/// Parse a complete program.
pub fn parse(source: &str) -> EngineResult<Program> {
    let tokens = lex(source)?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn err(&self, message: impl Into<String>) -> EngineError {
        let spanned = &self.tokens[self.pos];
        EngineError::Parse(format!(
            "line {}:{}: {}",
            spanned.line,
            spanned.col,
            message.into()
        ))
    }

    fn expect(&mut self, expected: Token) -> EngineResult<()> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected '{}', found '{}'", expected, self.peek())))
        }
    }

    fn expect_ident(&mut self) -> EngineResult<String> {
        match self.peek().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.err(format!("expected identifier, found '{}'", other))),
        }
    }

    fn parse_program(&mut self) -> EngineResult<Program> {
        let mut program = Program::default();
        while self.peek() != &Token::Eof {
            if self.peek() == &Token::Function {
                program.functions.push(self.parse_function()?);
            } else {
                program.statements.push(self.parse_stmt()?);
            }
        }
        Ok(program)
    }

    fn parse_function(&mut self) -> EngineResult<Function> {
        self.expect(Token::Function)?;
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if self.peek() != &Token::RParen {
            loop {
                params.push(self.expect_ident()?);
                if !self.check(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        Ok(Function { name, params, body })
    }

    fn parse_block(&mut self) -> EngineResult<Vec<Stmt>> {
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while self.peek() != &Token::RBrace {
            if self.peek() == &Token::Eof {
                return Err(self.err("unterminated block, expected '}'"));
            }
            if self.peek() == &Token::Function {
                return Err(self.err("function declarations are only allowed at the top level"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> EngineResult<Stmt> {
        match self.peek() {
            Token::Let => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(Token::Assign)?;
                let value = self.parse_expr()?;
                self.expect(Token::Semi)?;
                Ok(Stmt::Let { name, value })
            }
            Token::If => self.parse_if(),
            Token::While => {
                self.advance();
                self.expect(Token::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(Token::RParen)?;
                let body = self.parse_block()?;
                Ok(Stmt::While { cond, body })
            }
            Token::Break => {
                self.advance();
                self.expect(Token::Semi)?;
                Ok(Stmt::Break)
            }
            Token::Continue => {
                self.advance();
                self.expect(Token::Semi)?;
                Ok(Stmt::Continue)
            }
            Token::Return => {
                self.advance();
                if self.check(&Token::Semi) {
                    Ok(Stmt::Return(None))
                } else {
                    let value = self.parse_expr()?;
                    self.expect(Token::Semi)?;
                    Ok(Stmt::Return(Some(value)))
                }
            }
            Token::Ident(_) if self.peek_at(1) == &Token::Assign => {
                let name = self.expect_ident()?;
                self.expect(Token::Assign)?;
                let value = self.parse_expr()?;
                self.expect(Token::Semi)?;
                Ok(Stmt::Assign { name, value })
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(Token::Semi)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_if(&mut self) -> EngineResult<Stmt> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.check(&Token::Else) {
            if self.peek() == &Token::If {
                // `else if` chains nest as a single-statement else block
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn parse_expr(&mut self) -> EngineResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(&Token::OrOr) {
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.check(&Token::AndAnd) {
            let right = self.parse_equality()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinaryOp::Lt,
                Token::LtEq => BinaryOp::LtEq,
                Token::Gt => BinaryOp::Gt,
                Token::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> EngineResult<Expr> {
        let op = match self.peek() {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Not => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> EngineResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let field = self.expect_ident()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        field,
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Token::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if self.peek() != &Token::RParen {
                        loop {
                            args.push(self.parse_expr()?);
                            if !self.check(&Token::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(Token::RParen)?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> EngineResult<Expr> {
        match self.peek().clone() {
            Token::Null => {
                self.advance();
                Ok(Expr::Null)
            }
            Token::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            Token::Int(v) => {
                self.advance();
                Ok(Expr::Int(v))
            }
            Token::Float(v) => {
                self.advance();
                Ok(Expr::Float(v))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                if self.peek() != &Token::RBracket {
                    loop {
                        elems.push(self.parse_expr()?);
                        if !self.check(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(Expr::Array(elems))
            }
            Token::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                if self.peek() != &Token::RBrace {
                    loop {
                        let key = match self.peek().clone() {
                            Token::Ident(name) => {
                                self.advance();
                                name
                            }
                            Token::Str(s) => {
                                self.advance();
                                s
                            }
                            other => {
                                return Err(
                                    self.err(format!("expected map key, found '{}'", other))
                                )
                            }
                        };
                        self.expect(Token::Colon)?;
                        let value = self.parse_expr()?;
                        entries.push((key, value));
                        if !self.check(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Token::RBrace)?;
                Ok(Expr::Map(entries))
            }
            other => Err(self.err(format!("expected expression, found '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_return() {
        let program = parse("return 1 + 1;").unwrap();
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Stmt::Return(Some(Expr::Binary { op, .. })) => assert_eq!(*op, BinaryOp::Add),
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let program = parse("return 1 + 2 * 3;").unwrap();
        match &program.statements[0] {
            Stmt::Return(Some(Expr::Binary { op, right, .. })) => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(
                    right.as_ref(),
                    Expr::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration() {
        let program = parse("function add(a, b) { return a + b; } return add(1, 2);").unwrap();
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "add");
        assert_eq!(program.functions[0].params, vec!["a", "b"]);
    }

    #[test]
    fn test_member_call() {
        let program = parse("json.encode(x);").unwrap();
        match &program.statements[0] {
            Stmt::Expr(Expr::Call { callee, args }) => {
                assert_eq!(args.len(), 1);
                assert!(matches!(callee.as_ref(), Expr::Member { field, .. } if field == "encode"));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_else_if_chain() {
        let program = parse(
            "if (a) { return 1; } else if (b) { return 2; } else { return 3; }",
        )
        .unwrap();
        match &program.statements[0] {
            Stmt::If { else_block, .. } => {
                let else_block = else_block.as_ref().unwrap();
                assert_eq!(else_block.len(), 1);
                assert!(matches!(else_block[0], Stmt::If { .. }));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_array_and_map_literals() {
        let program = parse(r#"let x = [1, 2, 3]; let y = {a: 1, "b c": 2};"#).unwrap();
        assert_eq!(program.statements.len(), 2);
        match &program.statements[1] {
            Stmt::Let { value: Expr::Map(entries), .. } => {
                assert_eq!(entries[0].0, "a");
                assert_eq!(entries[1].0, "b c");
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_missing_semicolon_is_an_error() {
        let err = parse("return 1").unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_nested_function_rejected() {
        let err = parse("while (true) { function f() { } }").unwrap_err();
        match err {
            EngineError::Parse(msg) => assert!(msg.contains("top level")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_while_with_empty_body() {
        let program = parse("while (true) { }").unwrap();
        match &program.statements[0] {
            Stmt::While { body, .. } => assert!(body.is_empty()),
            other => panic!("unexpected statement: {:?}", other),
        }
    }
}
