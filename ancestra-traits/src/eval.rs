//! Formula evaluation over a subject's genotype map.

use std::collections::HashMap;

use serde::Serialize;

use crate::formula::{CondRule, Formula, ScoreRule};

/// The computed value of a formula: a numeric score for SCORE trees, a
/// boolean for IF trees; combined forms produce whichever their selected
/// branch produces (score 0 for a false condition with no ELSE).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Score(f64),
    Flag(bool),
}

/// Evaluate a parsed formula against `rsid -> genotype`.
pub fn evaluate(formula: &Formula, genotypes: &HashMap<String, String>) -> Value {
    match formula {
        Formula::Score(rules) => Value::Score(evaluate_score(rules, genotypes)),
        Formula::If(rules) => Value::Flag(evaluate_if(rules, genotypes)),
        Formula::IfElse {
            cond,
            then,
            otherwise,
        } => {
            if evaluate_if(cond, genotypes) {
                evaluate(then, genotypes)
            } else if let Some(otherwise) = otherwise {
                evaluate(otherwise, genotypes)
            } else {
                Value::Score(0.0)
            }
        }
    }
}

/// Sum of first-matching coefficients; rsids absent from the subject are
/// skipped, not treated as zero-with-error.
fn evaluate_score(rules: &[ScoreRule], genotypes: &HashMap<String, String>) -> f64 {
    let mut total = 0.0;

    for rule in rules {
        let Some(genotype) = genotypes.get(&rule.rsid) else {
            continue;
        };
        for (candidate, score) in &rule.pairs {
            if candidate == genotype {
                total += score;
                break;
            }
        }
    }

    total
}

/// Logical AND across rules. A rule whose rsid is absent is skipped; a
/// rule whose rsid is present is true only when some pair matches the
/// subject's genotype and carries `true`.
fn evaluate_if(rules: &[CondRule], genotypes: &HashMap<String, String>) -> bool {
    for rule in rules {
        let Some(genotype) = genotypes.get(&rule.rsid) else {
            continue;
        };

        let mut rule_result = false;
        for (candidate, condition) in &rule.pairs {
            if candidate == genotype {
                rule_result = *condition;
                break;
            }
        }

        if !rule_result {
            return false;
        }
    }

    true
}
