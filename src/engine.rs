//! The embedding API: [`RuleEngine`] compiles a rule-set document once
//! and runs it against any number of variable bindings.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{EngineError, EvalError};
use crate::expr::Variables;
use crate::ruleset::graph::{PostEvalKind, RuleGraph, RuleNode};
use crate::ruleset::ROOT_ID;
use crate::value::{Value, ValueType};

/// A cooperative cancellation handle.
///
/// The evaluator checks this once per DFS node entry (spec §5); it is
/// the only non-data-error exit path from an otherwise-successful
/// traversal.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Builds a fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether [`CancellationToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One evaluation request against a compiled [`RuleGraph`].
///
/// `evaluated_count`, `evaluated_true_count`, and `evaluated_rules`
/// are carried through from the original request shape but do not
/// gate anything: the response always reports full statistics (see
/// `RuleEngineResponse`), matching the response shape's documented
/// contract rather than the source's dead request flags.
#[derive(Debug, Default)]
pub struct EvaluationRequest {
    /// The variable bindings to evaluate predicates and post-evals
    /// against.
    pub variables: Variables,
    /// Carried through but not consumed; the response always reports
    /// `rules_evaluated`.
    pub evaluated_count: bool,
    /// Carried through but not consumed; the response always reports
    /// `rules_evaluated_true`.
    pub evaluated_true_count: bool,
    /// Carried through but not consumed; the response always reports
    /// `evaluated_rules`.
    pub evaluated_rules: bool,
    /// An optional cancellation handle, checked once per node.
    pub cancellation: Option<CancellationToken>,
}

impl EvaluationRequest {
    /// Builds a request with only `variables` set; all statistics
    /// flags default to `false` and no cancellation token is attached.
    pub fn new(variables: Variables) -> Self {
        Self {
            variables,
            ..Default::default()
        }
    }
}

/// One post-eval's emitted value.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EvaluationOutput {
    /// The post-eval's own id.
    #[serde(rename = "ID")]
    pub id: String,
    /// The emitted value.
    #[serde(rename = "Value")]
    pub value: Value,
    /// The emitted value's type tag.
    #[serde(rename = "Type")]
    pub value_type: ValueType,
}

/// One rule's emitted output: its id plus its post-eval results.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleOutput {
    /// The emitting rule's id.
    #[serde(rename = "ID")]
    pub id: String,
    /// The rule's post-eval outputs, in document order.
    #[serde(rename = "PostEvals")]
    pub post_evals: Vec<EvaluationOutput>,
}

/// The response of one [`RuleEngine::run`] call.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RuleEngineResponse {
    /// Total number of rules whose predicate was evaluated.
    #[serde(rename = "RulesEvaluated")]
    pub rules_evaluated: usize,
    /// Number of rules whose predicate evaluated `true`.
    #[serde(rename = "RulesEvaluatedTrue")]
    pub rules_evaluated_true: usize,
    /// Outputs, in DFS arrival order.
    #[serde(rename = "Outputs")]
    pub outputs: Vec<RuleOutput>,
    /// Every rule id whose predicate was evaluated, in arrival order.
    #[serde(rename = "EvaluatedRules")]
    pub evaluated_rules: Vec<String>,
}

/// A compiled rule engine: a [`RuleGraph`] ready to be run against any
/// number of [`EvaluationRequest`]s.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    graph: RuleGraph,
}

impl RuleEngine {
    /// Loads a rule-set document (see spec §6 for the JSON shape) and
    /// compiles it into a ready-to-run engine.
    pub fn new(document: &[u8]) -> Result<Self, EngineError> {
        let graph = crate::ruleset::load(document)?;
        Ok(Self { graph })
    }

    /// The id of the compiled rule-set, copied from the document.
    pub fn id(&self) -> &str {
        &self.graph.id
    }

    /// Runs the engine against `request`, returning the full response
    /// or the first error encountered. Evaluation aborts immediately
    /// on error; there is no partial response.
    pub fn run(&self, request: &EvaluationRequest) -> Result<RuleEngineResponse, EngineError> {
        let mut response = RuleEngineResponse::default();
        let evaluator = GraphEvaluator {
            graph: &self.graph,
            request,
        };
        evaluator.dfs(self.graph.root, &mut response)?;
        Ok(response)
    }
}

struct GraphEvaluator<'a> {
    graph: &'a RuleGraph,
    request: &'a EvaluationRequest,
}

impl<'a> GraphEvaluator<'a> {
    /// Depth-first traversal from `node_index`: evaluate the node's
    /// predicate, and only recurse into its children when the
    /// predicate is `true`. A rule reachable via more than one true
    /// path is evaluated (and its outputs emitted) once per arriving
    /// path — diamond re-evaluation is preserved per spec §9.
    fn dfs(&self, node_index: usize, response: &mut RuleEngineResponse) -> Result<(), EvalError> {
        if let Some(token) = &self.request.cancellation {
            if token.is_cancelled() {
                return Err(EvalError::Cancelled);
            }
        }

        let node = &self.graph.nodes[node_index];
        let result = node.rule.predicate.evaluate(&self.request.variables)?;

        response.rules_evaluated += 1;
        response.evaluated_rules.push(node.rule.id.clone());

        let is_true = match result {
            Value::Bool(b) => b,
            other => {
                return Err(EvalError::NonBooleanPredicate {
                    rule_id: node.rule.id.clone(),
                    actual: other.value_type(),
                })
            }
        };

        if !is_true {
            return Ok(());
        }

        response.rules_evaluated_true += 1;

        if node.rule.id != ROOT_ID {
            response.outputs.push(self.evaluate_post_evals(node)?);
        }

        for edge in &node.edges {
            self.dfs(edge.destination, response)?;
        }

        Ok(())
    }

    fn evaluate_post_evals(&self, node: &RuleNode) -> Result<RuleOutput, EvalError> {
        let mut post_evals = Vec::with_capacity(node.rule.post_evals.len());
        for post_eval in &node.rule.post_evals {
            let (value, value_type) = match post_eval.kind {
                PostEvalKind::Expr => {
                    let evaluable = post_eval
                        .evaluable
                        .as_ref()
                        .expect("EXPR post-eval always carries an evaluable expression");
                    let value = evaluable.evaluate(&self.request.variables)?;
                    let value_type = value.value_type();
                    (value, value_type)
                }
                PostEvalKind::Const => {
                    let text = post_eval
                        .const_value
                        .clone()
                        .expect("CONST post-eval always carries a const_value");
                    (Value::Str(text), ValueType::Str)
                }
            };
            post_evals.push(EvaluationOutput {
                id: post_eval.id.clone(),
                value,
                value_type,
            });
        }
        Ok(RuleOutput {
            id: node.rule.id.clone(),
            post_evals,
        })
    }
}
