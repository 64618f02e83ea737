//! Lexer for the Rill language.
//!
//! Tokenization is done with a logos-derived token enum which is then
//! converted into the public [`Token`] stream with line/column positions.

use crate::error::{EngineError, EngineResult};
use crate::token::{Spanned, Token};
use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum LogosToken {
    // Keywords
    #[token("let")]
    Let,

    #[token("function")]
    Function,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("while")]
    While,

    #[token("return")]
    Return,

    #[token("break")]
    Break,

    #[token("continue")]
    Continue,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    // Literals
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok(), priority = 3)]
    Float(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""([^"\\\n]|\\.)*""#, lex_string)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, lex_string)]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Delimiters
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[token(";")]
    Semi,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    // Operators (multi-character first)
    #[token("==")]
    Eq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    #[token("=")]
    Assign,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("!")]
    Not,
}

/// Strip the surrounding quotes and resolve escape sequences.
fn lex_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '0' => out.push('\0'),
            _ => return None,
        }
    }
    Some(out)
}

/// Compute the 1-based line and column of a byte offset.
fn line_col(source: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn convert(token: LogosToken) -> Token {
    match token {
        LogosToken::Let => Token::Let,
        LogosToken::Function => Token::Function,
        LogosToken::If => Token::If,
        LogosToken::Else => Token::Else,
        LogosToken::While => Token::While,
        LogosToken::Return => Token::Return,
        LogosToken::Break => Token::Break,
        LogosToken::Continue => Token::Continue,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Null => Token::Null,
        LogosToken::Int(v) => Token::Int(v),
        LogosToken::Float(v) => Token::Float(v),
        LogosToken::Str(s) => Token::Str(s),
        LogosToken::Ident(name) => Token::Ident(name),
        LogosToken::LParen => Token::LParen,
        LogosToken::RParen => Token::RParen,
        LogosToken::LBrace => Token::LBrace,
        LogosToken::RBrace => Token::RBrace,
        LogosToken::LBracket => Token::LBracket,
        LogosToken::RBracket => Token::RBracket,
        LogosToken::Comma => Token::Comma,
        LogosToken::Semi => Token::Semi,
        LogosToken::Colon => Token::Colon,
        LogosToken::Dot => Token::Dot,
        LogosToken::Eq => Token::Eq,
        LogosToken::NotEq => Token::NotEq,
        LogosToken::LtEq => Token::LtEq,
        LogosToken::GtEq => Token::GtEq,
        LogosToken::AndAnd => Token::AndAnd,
        LogosToken::OrOr => Token::OrOr,
        LogosToken::Assign => Token::Assign,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Lt => Token::Lt,
        LogosToken::Gt => Token::Gt,
        LogosToken::Not => Token::Not,
    }
}

/// Tokenize `source` into a stream of positioned tokens, terminated by
/// [`Token::Eof`].
pub fn lex(source: &str) -> EngineResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    for (result, span) in LogosToken::lexer(source).spanned() {
        let (line, col) = line_col(source, span.start);
        match result {
            Ok(token) => tokens.push(Spanned::new(convert(token), line, col)),
            Err(()) => {
                let snippet: String = source[span.clone()].chars().take(16).collect();
                return Err(EngineError::Parse(format!(
                    "line {}:{}: unrecognized token near '{}'",
                    line, col, snippet
                )));
            }
        }
    }
    let (line, col) = line_col(source, source.len());
    tokens.push(Spanned::new(Token::Eof, line, col));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        assert_eq!(
            kinds("let letter while whiler"),
            vec![
                Token::Let,
                Token::Ident("letter".to_string()),
                Token::While,
                Token::Ident("whiler".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.25"),
            vec![Token::Int(42), Token::Float(3.25), Token::Eof]
        );
    }

    #[test]
    fn test_strings_both_quote_styles() {
        assert_eq!(
            kinds(r#""boom" 'pow'"#),
            vec![
                Token::Str("boom".to_string()),
                Token::Str("pow".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\t\"c\"""#),
            vec![Token::Str("a\nb\t\"c\"".to_string()), Token::Eof]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != <= >= && || = < > !"),
            vec![
                Token::Eq,
                Token::NotEq,
                Token::LtEq,
                Token::GtEq,
                Token::AndAnd,
                Token::OrOr,
                Token::Assign,
                Token::Lt,
                Token::Gt,
                Token::Not,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("let x // trailing\n// full line\n1"),
            vec![
                Token::Let,
                Token::Ident("x".to_string()),
                Token::Int(1),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unrecognized_token_reports_position() {
        let err = lex("let x = @").unwrap_err();
        match err {
            EngineError::Parse(msg) => {
                assert!(msg.contains("1:9"), "unexpected message: {}", msg);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_position_tracking_across_lines() {
        let tokens = lex("let a = 1;\nlet b = 2;").unwrap();
        let second_let = tokens
            .iter()
            .filter(|s| s.token == Token::Let)
            .nth(1)
            .unwrap();
        assert_eq!((second_let.line, second_let.col), (2, 1));
    }
}
