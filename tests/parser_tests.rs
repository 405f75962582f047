use sievegraph::ast::AstNode;
use sievegraph::error::ParseError;
use sievegraph::lexer::Lexer;
use sievegraph::operators::OperatorTable;
use sievegraph::parser::Parser;

fn parse(src: &str) -> Result<AstNode, Box<dyn std::error::Error>> {
    let table = OperatorTable::new();
    let tokens = Lexer::new(&table).lex(src)?;
    Ok(Parser::new().parse(tokens)?)
}

fn op_text(node: &AstNode) -> &str {
    match node {
        AstNode::Binary { op, .. } => op.text(),
        AstNode::Leaf(_) => panic!("expected a binary node"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    // "a + b * c" should parse as "a + (b * c)".
    let ast = parse("a + b * c").unwrap();
    assert_eq!(op_text(&ast), "+");
    match ast {
        AstNode::Binary { right, .. } => assert_eq!(op_text(&right), "*"),
        _ => unreachable!(),
    }
}

#[test]
fn subtraction_is_left_associative() {
    // "a - b - c" should parse as "(a - b) - c".
    let ast = parse("a - b - c").unwrap();
    assert_eq!(op_text(&ast), "-");
    match ast {
        AstNode::Binary { left, .. } => assert_eq!(op_text(&left), "-"),
        _ => unreachable!(),
    }
}

#[test]
fn parentheses_override_precedence() {
    // "(a + b) * c" should parse as "(a + b) * c", top op "*".
    let ast = parse("(a + b) * c").unwrap();
    assert_eq!(op_text(&ast), "*");
    match ast {
        AstNode::Binary { left, .. } => assert_eq!(op_text(&left), "+"),
        _ => unreachable!(),
    }
}

#[test]
fn unmatched_right_paren_cites_position() {
    let err = parse("a + b)").unwrap_err();
    let parse_err = err.downcast_ref::<ParseError>();
    assert!(matches!(parse_err, Some(ParseError::UnmatchedRightParen { index: 5 })));
}

#[test]
fn unmatched_left_paren_is_reported() {
    let err = parse("(a + b").unwrap_err();
    let parse_err = err.downcast_ref::<ParseError>();
    assert!(matches!(parse_err, Some(ParseError::UnmatchedLeftParen { .. })));
}

#[test]
fn single_literal_parses_to_a_leaf() {
    let ast = parse("42").unwrap();
    assert!(matches!(ast, AstNode::Leaf(_)));
}
