//! The wire shape of a rule-set document (spec §6), deserialized with
//! `serde`/`serde_json` in isolation from the loader's graph-assembly
//! logic.

use std::collections::HashMap;

use serde::Deserialize;

/// The top-level rule-set document.
#[derive(Debug, Deserialize)]
pub struct RuleSetDocument {
    /// The rule-set's own id.
    pub id: String,
    /// Named predicates, resolvable from a rule or post-eval via a
    /// `Predicate:NAME` token.
    #[serde(default)]
    pub predicates: HashMap<String, String>,
    /// Rule id → rule definition.
    pub rules: HashMap<String, RuleDef>,
    /// Dependency edges between rules.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

/// One rule's definition in the document.
#[derive(Debug, Deserialize)]
pub struct RuleDef {
    /// The rule's predicate expression source, or a `Predicate:NAME`
    /// reference.
    pub predicate: String,
    /// The rule's post-evaluations, in document order.
    #[serde(default)]
    pub post_evals: Vec<PostEvalDef>,
}

/// One post-evaluation entry in a rule's `post_evals` list.
#[derive(Debug, Deserialize)]
pub struct PostEvalDef {
    /// The post-eval's own id, unique within its owning rule.
    pub id: String,
    /// `"EXPR"` or `"CONST"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The expression source (for `EXPR`) or the literal constant
    /// text (for `CONST`).
    pub value: String,
    /// Carried through but not consumed by evaluation.
    #[serde(default)]
    pub echo: bool,
}

/// One dependency edge in the document's `relations` list.
#[derive(Debug, Deserialize)]
pub struct RelationDef {
    /// The source rule id.
    pub from: String,
    /// The destination rule id.
    pub to: String,
    /// Carried through but not consumed by evaluation (spec §9).
    #[serde(default)]
    pub forward_output: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_predicates_and_relations_default_to_empty() {
        let json = r#"{
            "id": "r",
            "rules": { "R1": { "predicate": "a > b" } }
        }"#;
        let doc: RuleSetDocument = serde_json::from_str(json).unwrap();
        assert!(doc.predicates.is_empty());
        assert!(doc.relations.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{
            "id": "r",
            "rules": {},
            "something_else": 42
        }"#;
        let doc: RuleSetDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "r");
    }
}
