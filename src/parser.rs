//! Shunting-yard parsing of a token sequence into a binary AST.
//!
//! # Example
//!
//! ```rust
//! use sievegraph::lexer::Lexer;
//! use sievegraph::operators::OperatorTable;
//! use sievegraph::parser::Parser;
//!
//! let table = OperatorTable::new();
//! let tokens = Lexer::new(&table).lex("a + b * c").unwrap();
//! let ast = Parser::new().parse(tokens).unwrap();
//! ```

use crate::ast::AstNode;
use crate::error::ParseError;
use crate::operators::precedence;
use crate::token::{Token, TokenKind};

/// Converts a token sequence into an [`AstNode`] tree.
#[derive(Debug, Default)]
pub struct Parser;

impl Parser {
    /// Builds a new parser. Stateless — a `Parser` can be reused
    /// across any number of [`Parser::parse`] calls.
    pub fn new() -> Self {
        Self
    }

    /// Parses `tokens` using shunting-yard: an operand stack of AST
    /// subtrees and an operator stack of tokens.
    pub fn parse(&self, tokens: Vec<Token>) -> Result<AstNode, ParseError> {
        let mut operands: Vec<AstNode> = Vec::new();
        let mut operators: Vec<Token> = Vec::new();

        for token in tokens {
            match token.kind {
                TokenKind::LeftParen => operators.push(token),
                TokenKind::Variable | TokenKind::String | TokenKind::Number | TokenKind::Bool => {
                    operands.push(AstNode::leaf(token));
                }
                TokenKind::Operator => {
                    while let Some(top) = operators.last() {
                        if top.kind == TokenKind::LeftParen {
                            break;
                        }
                        if precedence(top.text()) < precedence(token.text()) {
                            break;
                        }
                        let op = operators.pop().unwrap();
                        combine(&mut operands, op)?;
                    }
                    operators.push(token);
                }
                TokenKind::RightParen => {
                    loop {
                        let top = operators.pop().ok_or(ParseError::UnmatchedRightParen {
                            index: token.index,
                        })?;
                        if top.kind == TokenKind::LeftParen {
                            break;
                        }
                        combine(&mut operands, top)?;
                    }
                }
                _ => {}
            }
        }

        while let Some(top) = operators.pop() {
            if top.kind == TokenKind::LeftParen {
                return Err(ParseError::UnmatchedLeftParen { index: top.index });
            }
            combine(&mut operands, top)?;
        }

        operands.pop().ok_or(ParseError::EmptyExpression)
    }
}

/// Pops `op`'s two operands off `operands` and pushes the combined
/// operator node. The source builds the right-hand operand first
/// (last pushed) then the left-hand operand.
fn combine(operands: &mut Vec<AstNode>, op: Token) -> Result<(), ParseError> {
    let right = operands.pop();
    let left = operands.pop();
    match (left, right) {
        (Some(left), Some(right)) => {
            operands.push(AstNode::binary(op, left, right));
            Ok(())
        }
        _ => Err(ParseError::MissingOperands {
            op: op.text().to_string(),
            index: op.index,
        }),
    }
}
