//! Rule-set document parsing and the compiled rule-graph it produces.

pub mod document;
pub mod graph;
pub mod loader;

pub use graph::{Edge, PostEval, PostEvalKind, Rule, RuleGraph, RuleNode, ROOT_ID};
pub use loader::load;
