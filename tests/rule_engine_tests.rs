use std::sync::Arc;

use pretty_assertions::assert_eq;
use sievegraph::error::{EngineError, EvalError, LoadError};
use sievegraph::{Binding, EvaluationRequest, Expression, RuleEngine, Udf, Value, Variables};

fn int_vars(pairs: &[(&str, i64)]) -> Variables {
    pairs.iter().map(|(k, v)| (k.to_string(), Binding::Int(*v))).collect()
}

#[test]
fn scenario_1_arithmetic() {
    let expr = Expression::compile("a + b + c").unwrap();
    let vars = int_vars(&[("a", 10), ("b", 100), ("c", 125)]);
    assert_eq!(expr.evaluate(&vars).unwrap(), Value::Number(235.0));
}

#[test]
fn scenario_2_bodmas() {
    let expr = Expression::compile("(a + b) * c / d").unwrap();
    let vars = int_vars(&[("a", 10), ("b", 100), ("c", 8), ("d", 4)]);
    assert_eq!(expr.evaluate(&vars).unwrap(), Value::Number(220.0));
}

#[test]
fn scenario_3_udf() {
    let udf = Udf {
        token: "MY_OP".to_string(),
        op: Arc::new(|a, b| match (a, b) {
            (Value::Number(x), Value::Number(y)) => Ok(Value::Number(10.0 * x + 2.0 * y)),
            _ => unreachable!(),
        }),
    };
    let expr = Expression::compile_with_udfs("a MY_OP b", vec![udf]).unwrap();
    let vars = int_vars(&[("a", 10), ("b", 20)]);
    assert_eq!(expr.evaluate(&vars).unwrap(), Value::Number(140.0));
}

const SIMPLE_RULESET: &str = r#"{
    "id": "some_ruleset",
    "predicates": { "P1": "a > b" },
    "rules": {
        "R1": {
            "predicate": "Predicate:P1",
            "post_evals": [
                { "id": "output_1", "type": "EXPR", "value": "a + b" },
                { "id": "output_2", "type": "CONST", "value": "action_1" }
            ]
        }
    }
}"#;

const DEPENDENCY_RULESET: &str = r#"{
    "id": "some_ruleset",
    "predicates": {
        "P1": "a > b",
        "P2": "a + b > c",
        "P3": "b > c"
    },
    "rules": {
        "R1": {
            "predicate": "Predicate:P1",
            "post_evals": [
                { "id": "output_1", "type": "EXPR", "value": "a + b" },
                { "id": "output_2", "type": "CONST", "value": "action_1" }
            ]
        },
        "R2": {
            "predicate": "Predicate:P2",
            "post_evals": [ { "id": "output_1", "type": "EXPR", "value": "a + b + c" } ]
        },
        "R3": {
            "predicate": "Predicate:P3",
            "post_evals": [ { "id": "output_1", "type": "EXPR", "value": "a" } ]
        }
    },
    "relations": [ { "from": "R1", "to": "R2" } ]
}"#;

#[test]
fn scenario_4_simple_ruleset() {
    let engine = RuleEngine::new(SIMPLE_RULESET.as_bytes()).unwrap();
    let request = EvaluationRequest::new(int_vars(&[("a", 10), ("b", 8)]));
    let response = engine.run(&request).unwrap();

    assert_eq!(response.outputs.len(), 1);
    let r1 = &response.outputs[0];
    assert_eq!(r1.id, "R1");
    assert_eq!(r1.post_evals[0].id, "output_1");
    assert_eq!(r1.post_evals[0].value, Value::Number(18.0));
    assert_eq!(r1.post_evals[1].id, "output_2");
    assert_eq!(r1.post_evals[1].value, Value::Str("action_1".to_string()));
}

#[test]
fn scenario_5_dependency_chain() {
    let engine = RuleEngine::new(DEPENDENCY_RULESET.as_bytes()).unwrap();
    let request = EvaluationRequest::new(int_vars(&[("a", 10), ("b", 8), ("c", 6)]));
    let response = engine.run(&request).unwrap();

    let ids: Vec<&str> = response.outputs.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["R1", "R2", "R3"]);
    assert_eq!(response.outputs[0].post_evals[0].value, Value::Number(18.0));
    assert_eq!(response.outputs[1].post_evals[0].value, Value::Number(24.0));
    assert_eq!(response.outputs[2].post_evals[0].value, Value::Number(10.0));
}

#[test]
fn scenario_6_short_circuit() {
    let engine = RuleEngine::new(DEPENDENCY_RULESET.as_bytes()).unwrap();
    let request = EvaluationRequest::new(int_vars(&[("a", 8), ("b", 10), ("c", 6)]));
    let response = engine.run(&request).unwrap();

    let ids: Vec<&str> = response.outputs.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["R3"]);
    assert_eq!(response.outputs[0].post_evals[0].value, Value::Number(8.0));
}

#[test]
fn malformed_document_is_rejected_before_any_evaluation() {
    let err = RuleEngine::new(b"{not json").unwrap_err();
    assert!(matches!(err, EngineError::Load(LoadError::Json(_))));
}

#[test]
fn unknown_predicate_reference_fails_at_load_time() {
    let json = r#"{ "id": "r", "rules": { "R1": { "predicate": "Predicate:NOPE" } } }"#;
    let err = RuleEngine::new(json.as_bytes()).unwrap_err();
    assert!(matches!(err, EngineError::Load(LoadError::InvalidPredicate { .. })));
}

#[test]
fn missing_variable_surfaces_as_eval_error() {
    let engine = RuleEngine::new(SIMPLE_RULESET.as_bytes()).unwrap();
    let request = EvaluationRequest::new(int_vars(&[("a", 10)]));
    let err = engine.run(&request).unwrap_err();
    assert!(matches!(err, EngineError::Eval(EvalError::MissingVariableValue { .. })));
}

#[test]
fn loading_same_document_twice_yields_independent_engines() {
    let first = RuleEngine::new(SIMPLE_RULESET.as_bytes()).unwrap();
    let second = RuleEngine::new(SIMPLE_RULESET.as_bytes()).unwrap();
    assert_eq!(first.id(), second.id());
}
