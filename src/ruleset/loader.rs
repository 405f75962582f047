//! Loads a rule-set document into a compiled [`RuleGraph`].
//!
//! Resolution order per spec §4.5: substitute every `Predicate:NAME`
//! reference with the named predicate's source text, *then* compile
//! the resulting string through the lexer/parser.

use std::collections::HashMap;

use crate::error::LoadError;
use crate::expr::Expression;
use crate::ruleset::document::{PostEvalDef, RuleSetDocument};
use crate::ruleset::graph::{Edge, PostEval, PostEvalKind, Rule, RuleGraph, RuleNode, ROOT_ID};

const PREDICATE_PREFIX: &str = "Predicate:";

/// Parses `input` as a rule-set document and assembles its dependency
/// graph.
pub fn load(input: &[u8]) -> Result<RuleGraph, LoadError> {
    let doc: RuleSetDocument = serde_json::from_slice(input)?;
    build(doc)
}

fn build(doc: RuleSetDocument) -> Result<RuleGraph, LoadError> {
    // Stable iteration order matters for edge/root insertion order
    // (spec's "order-preserved"), so rule ids are sorted rather than
    // iterated in the document's HashMap order.
    let mut rule_ids: Vec<&String> = doc.rules.keys().collect();
    rule_ids.sort();

    let mut nodes = Vec::with_capacity(doc.rules.len() + 1);
    let mut index_of: HashMap<String, usize> = HashMap::with_capacity(doc.rules.len());
    let mut seen = std::collections::HashSet::new();

    for rule_id in rule_ids {
        if !seen.insert(rule_id.clone()) {
            return Err(LoadError::DuplicateRuleId { id: rule_id.clone() });
        }
        let def = &doc.rules[rule_id];

        let predicate_src = resolve_predicate(&doc.predicates, &def.predicate)?;
        let predicate = Expression::compile(&predicate_src).map_err(|source| LoadError::InvalidPredicate {
            rule_id: rule_id.clone(),
            source,
        })?;

        let mut post_evals = Vec::with_capacity(def.post_evals.len());
        for post_eval_def in &def.post_evals {
            post_evals.push(build_post_eval(rule_id, post_eval_def, &doc.predicates)?);
        }

        index_of.insert(rule_id.clone(), nodes.len());
        nodes.push(RuleNode {
            rule: Rule {
                id: rule_id.clone(),
                predicate,
                post_evals,
            },
            edges: Vec::new(),
        });
    }

    let mut in_degree = vec![0usize; nodes.len()];
    for relation in &doc.relations {
        let from = *index_of
            .get(&relation.from)
            .ok_or_else(|| LoadError::UnknownRelationEndpoint { id: relation.from.clone() })?;
        let to = *index_of
            .get(&relation.to)
            .ok_or_else(|| LoadError::UnknownRelationEndpoint { id: relation.to.clone() })?;

        nodes[from].edges.push(Edge {
            destination: to,
            forward_output: relation.forward_output,
        });
        in_degree[to] += 1;
    }

    let root_predicate = Expression::compile("true").expect("'true' is always a valid predicate");
    let root_index = nodes.len();
    let mut root_edges = Vec::new();
    for (i, degree) in in_degree.iter().enumerate() {
        if *degree == 0 {
            root_edges.push(Edge {
                destination: i,
                forward_output: false,
            });
        }
    }
    nodes.push(RuleNode {
        rule: Rule {
            id: ROOT_ID.to_string(),
            predicate: root_predicate,
            post_evals: Vec::new(),
        },
        edges: root_edges,
    });

    Ok(RuleGraph {
        id: doc.id,
        root: root_index,
        nodes,
        constants: Vec::new(),
    })
}

fn build_post_eval(
    rule_id: &str,
    def: &PostEvalDef,
    predicates: &HashMap<String, String>,
) -> Result<PostEval, LoadError> {
    match def.kind.as_str() {
        "EXPR" => {
            let src = resolve_predicate(predicates, &def.value)?;
            let evaluable =
                Expression::compile(&src).map_err(|source| LoadError::InvalidPostEvalExpression {
                    rule_id: rule_id.to_string(),
                    output_id: def.id.clone(),
                    source,
                })?;
            Ok(PostEval {
                id: def.id.clone(),
                kind: PostEvalKind::Expr,
                const_value: None,
                evaluable: Some(evaluable),
                echo: def.echo,
            })
        }
        "CONST" => Ok(PostEval {
            id: def.id.clone(),
            kind: PostEvalKind::Const,
            const_value: Some(def.value.clone()),
            evaluable: None,
            echo: def.echo,
        }),
        other => Err(LoadError::InvalidPostEvalKind {
            kind: other.to_string(),
            output_id: def.id.clone(),
            rule_id: rule_id.to_string(),
        }),
    }
}

/// Replaces every whitespace-delimited `Predicate:NAME` token in
/// `expression` with the source text of `predicates[NAME]`.
fn resolve_predicate(predicates: &HashMap<String, String>, expression: &str) -> Result<String, LoadError> {
    let mut resolved_tokens = Vec::new();
    for token in expression.split(' ') {
        if let Some(name) = token.strip_prefix(PREDICATE_PREFIX) {
            let source = predicates
                .get(name)
                .ok_or_else(|| LoadError::UnknownPredicate { name: name.to_string() })?;
            resolved_tokens.push(source.as_str());
        } else {
            resolved_tokens.push(token);
        }
    }
    Ok(resolved_tokens.join(" "))
}
