use sievegraph::error::LexError;
use sievegraph::lexer::Lexer;
use sievegraph::operators::OperatorTable;
use sievegraph::token::TokenKind;

fn lex(src: &str) -> Result<Vec<sievegraph::token::Token>, LexError> {
    let table = OperatorTable::new();
    Lexer::new(&table).lex(src)
}

#[test]
fn full_expression_round_trips_every_token_kind() {
    let tokens = lex(r#"(a + "hi") == true"#).unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::LeftParen,
            TokenKind::Variable,
            TokenKind::Operator,
            TokenKind::String,
            TokenKind::RightParen,
            TokenKind::Operator,
            TokenKind::Bool,
        ]
    );
}

#[test]
fn two_operators_in_a_row_is_invalid_adjacency() {
    let err = lex("a + + b").unwrap_err();
    assert!(matches!(err, LexError::InvalidAdjacency { .. }));
}

#[test]
fn unrecognized_symbol_cites_its_position() {
    let err = lex("a @ b").unwrap_err();
    match err {
        LexError::UnrecognizedToken { lexeme, index } => {
            assert_eq!(lexeme, "@");
            assert_eq!(index, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn nested_parens_lex_without_adjacency_errors() {
    let tokens = lex("((a))").unwrap();
    assert_eq!(tokens.len(), 5);
}
