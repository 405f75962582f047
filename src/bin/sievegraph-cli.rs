//! Thin CLI wiring around the `sievegraph` embedding API.
//!
//! This binary contains no engine logic of its own: it parses
//! arguments, reads files, and calls into [`sievegraph::RuleEngine`].

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use sievegraph::{Binding, EvaluationRequest, RuleEngine};

#[derive(Parser)]
#[command(name = "sievegraph-cli", version, about = "Run a sievegraph rule-set against a set of variables")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a rule-set and run it against variable bindings.
    Run {
        /// Path to the rule-set JSON document.
        #[arg(long)]
        ruleset: PathBuf,
        /// Path to a JSON object of variable bindings, or a
        /// comma-separated `name=value` list.
        #[arg(long)]
        vars: String,
        /// Request and print evaluation statistics.
        #[arg(long, default_value_t = false)]
        stats: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { ruleset, vars, stats } => run_command(&ruleset, &vars, stats),
    }
}

fn run_command(ruleset_path: &PathBuf, vars_arg: &str, stats: bool) -> Result<()> {
    let document = fs::read(ruleset_path)
        .with_context(|| format!("reading rule-set document {}", ruleset_path.display()))?;
    let engine = RuleEngine::new(&document).context("compiling rule-set")?;

    let variables = parse_variables(vars_arg)?;

    let mut request = EvaluationRequest::new(variables);
    request.evaluated_count = stats;
    request.evaluated_true_count = stats;
    request.evaluated_rules = stats;

    let response = engine.run(&request).context("evaluating rule-set")?;

    let json = serde_json::to_string_pretty(&response).context("formatting response")?;
    println!("{json}");

    if stats {
        eprintln!(
            "{} {} rules evaluated, {} true",
            "stats:".green().bold(),
            response.rules_evaluated,
            response.rules_evaluated_true,
        );
    }

    Ok(())
}

/// Parses `--vars` either as a path to a JSON object file, or as an
/// inline comma-separated `name=value` list.
fn parse_variables(arg: &str) -> Result<HashMap<String, Binding>> {
    let path = PathBuf::from(arg);
    if path.is_file() {
        let bytes = fs::read(&path).with_context(|| format!("reading variables file {}", path.display()))?;
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_slice(&bytes).context("parsing variables JSON")?;
        return raw
            .into_iter()
            .map(|(k, v)| Ok((k, json_to_binding(v)?)))
            .collect();
    }

    let mut variables = HashMap::new();
    for pair in arg.split(',').filter(|s| !s.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("expected 'name=value', got '{pair}'"))?;
        variables.insert(name.trim().to_string(), parse_scalar(value.trim()));
    }
    Ok(variables)
}

fn json_to_binding(value: serde_json::Value) -> Result<Binding> {
    match value {
        serde_json::Value::Bool(b) => Ok(Binding::Bool(b)),
        serde_json::Value::Number(n) => Ok(Binding::Number(
            n.as_f64().context("variable number is not representable as f64")?,
        )),
        serde_json::Value::String(s) => Ok(Binding::Str(s)),
        other => anyhow::bail!("unsupported variable value: {other}"),
    }
}

/// Classifies a bare token the same way the expression lexer would:
/// `true`/`false` as bools, a `"`-wrapped run as a string, anything
/// numeric-looking as a number, everything else as a string.
fn parse_scalar(raw: &str) -> Binding {
    match raw {
        "true" => return Binding::Bool(true),
        "false" => return Binding::Bool(false),
        _ => {}
    }
    if let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Binding::Str(inner.to_string());
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Binding::Number(n);
    }
    Binding::Str(raw.to_string())
}
