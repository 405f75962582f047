//! Lexical analysis of infix expressions.
//!
//! The lexer turns a source string into a sequence of [`Token`]s,
//! validating adjacency with a small finite-state machine as it goes
//! so the parser never has to reject structurally impossible
//! sequences itself.
//!
//! # Example
//!
//! ```rust
//! use sievegraph::lexer::Lexer;
//! use sievegraph::operators::OperatorTable;
//!
//! let table = OperatorTable::new();
//! let tokens = Lexer::new(&table).lex("a + b").unwrap();
//! assert_eq!(tokens.len(), 3);
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::error::LexError;
use crate::operators::OperatorTable;
use crate::token::{Stream, Token, TokenKind, TokenPayload, END_OF_STREAM};

fn variable_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z_0-9]*$").unwrap())
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap())
}

/// Tokenizes infix expression source text.
///
/// A `Lexer` is built against an [`OperatorTable`] so that any
/// registered user-defined operator lexemes are accepted as
/// `Operator` tokens alongside the built-ins.
pub struct Lexer<'a> {
    operators: &'a OperatorTable,
}

impl<'a> Lexer<'a> {
    /// Builds a lexer that recognizes the built-in operators plus
    /// whatever UDFs `operators` carries.
    pub fn new(operators: &'a OperatorTable) -> Self {
        Self { operators }
    }

    /// Tokenizes `source`, returning tokens in source order.
    pub fn lex(&self, source: &str) -> Result<Vec<Token>, LexError> {
        let mut stream = Stream::new(source);
        let mut tokens = Vec::new();
        let mut state = TokenKind::None;

        loop {
            let c = stream.get_next();
            if c == END_OF_STREAM {
                break;
            }
            if is_delimiter(c) {
                continue;
            }
            stream.rewind();

            let token = self.next_token(&mut stream)?;
            if !transition_allowed(state, token.kind) {
                return Err(LexError::InvalidAdjacency { index: token.index });
            }
            state = token.kind;
            tokens.push(token);
        }

        if !transition_allowed(state, TokenKind::Eol) {
            return Err(LexError::InvalidAdjacency {
                index: stream.position(),
            });
        }

        Ok(tokens)
    }

    fn next_token(&self, stream: &mut Stream) -> Result<Token, LexError> {
        let index = stream.position();
        let c = stream.get_next();
        stream.rewind();

        match c {
            '"' => scan_string(stream),
            '(' | ')' => Ok(scan_paren(stream)),
            _ => self.scan_other(stream, index),
        }
    }

    fn scan_other(&self, stream: &mut Stream, index: usize) -> Result<Token, LexError> {
        let lexeme = scan_candidate_lexeme(stream);

        if lexeme == "true" || lexeme == "false" {
            return Ok(Token::new(
                TokenKind::Bool,
                TokenPayload::Bool(lexeme == "true"),
                index,
            ));
        }
        if variable_regex().is_match(&lexeme) {
            return Ok(Token::new(TokenKind::Variable, TokenPayload::Str(lexeme), index));
        }
        if number_regex().is_match(&lexeme) {
            let n: f64 = lexeme
                .parse()
                .map_err(|_| LexError::UnrecognizedToken { lexeme: lexeme.clone(), index })?;
            return Ok(Token::new(TokenKind::Number, TokenPayload::Number(n), index));
        }
        if self.operators.is_operator_token(&lexeme) {
            return Ok(Token::new(TokenKind::Operator, TokenPayload::Str(lexeme), index));
        }

        Err(LexError::UnrecognizedToken { lexeme, index })
    }
}

/// Scans a maximal run of non-delimiter, non-`)` characters. `(` does
/// not terminate the run unless it is the first character scanned
/// (handled by the caller before this function is ever invoked) —
/// this preserves the existing behavior where `a+b` lexes as one
/// candidate lexeme.
fn scan_candidate_lexeme(stream: &mut Stream) -> String {
    let mut lexeme = String::new();
    loop {
        let c = stream.get_next();
        if is_delimiter(c) || c == END_OF_STREAM || c == ')' {
            if c != END_OF_STREAM {
                stream.rewind();
            }
            break;
        }
        lexeme.push(c);
    }
    lexeme
}

fn scan_string(stream: &mut Stream) -> Result<Token, LexError> {
    let index = stream.position();
    let start_quote = stream.get_next();
    let mut text = String::new();
    let mut end_quote = '\0';

    loop {
        let c = stream.get_next();
        if c == END_OF_STREAM {
            break;
        }
        end_quote = c;
        if end_quote == start_quote {
            break;
        }
        text.push(c);
    }

    if start_quote != end_quote {
        return Err(LexError::UnterminatedString { index });
    }

    Ok(Token::new(TokenKind::String, TokenPayload::Str(text), index))
}

fn scan_paren(stream: &mut Stream) -> Token {
    let index = stream.position();
    let c = stream.get_next();
    let kind = if c == '(' { TokenKind::LeftParen } else { TokenKind::RightParen };
    Token::new(kind, TokenPayload::Str(c.to_string()), index)
}

fn is_delimiter(c: char) -> bool {
    c == ' '
}

/// The adjacency DFA from spec §4.1: `from` may transition only to
/// one of the kinds listed for it.
fn transition_allowed(from: TokenKind, to: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        (from, to),
        (None, Variable)
            | (None, String)
            | (None, Number)
            | (None, Bool)
            | (None, LeftParen)
            | (None, Eol)
            | (Variable, Operator)
            | (Variable, Eol)
            | (Variable, RightParen)
            | (String, Operator)
            | (String, Eol)
            | (String, RightParen)
            | (Number, Operator)
            | (Number, Eol)
            | (Number, RightParen)
            | (Bool, Operator)
            | (Bool, Eol)
            | (Bool, RightParen)
            | (Operator, Variable)
            | (Operator, String)
            | (Operator, Number)
            | (Operator, Bool)
            | (Operator, LeftParen)
            | (LeftParen, Variable)
            | (LeftParen, String)
            | (LeftParen, Number)
            | (LeftParen, Bool)
            | (LeftParen, LeftParen)
            | (RightParen, Operator)
            | (RightParen, Eol)
            | (RightParen, RightParen)
    )
}
