//! Recursive-descent parsing of trait formulas into an expression tree.
//!
//! Malformed `genotype=value` pairs and rules without a `rsid:` head are
//! skipped silently; that lenience is part of the observable contract for
//! existing trait definitions. Structural problems (a bad formula head,
//! an unbalanced brace) are hard errors.

use crate::error::FormulaError;

/// A rule binding one rsid to ordered `genotype = coefficient` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRule {
    pub rsid: String,
    pub pairs: Vec<(String, f64)>,
}

/// A rule binding one rsid to ordered `genotype = true|false` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct CondRule {
    pub rsid: String,
    pub pairs: Vec<(String, bool)>,
}

/// Parsed formula tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Score(Vec<ScoreRule>),
    If(Vec<CondRule>),
    IfElse {
        cond: Vec<CondRule>,
        then: Box<Formula>,
        otherwise: Option<Box<Formula>>,
    },
}

/// Parse a formula string into its tree form.
pub fn parse_formula(text: &str) -> Result<Formula, FormulaError> {
    let text = text.trim();

    if text.starts_with("IF(") && text.contains('{') {
        return parse_combined(text);
    }
    if let Some(inner) = strip_call(text, "IF(") {
        return Ok(Formula::If(parse_cond_rules(inner)));
    }
    if let Some(inner) = strip_call(text, "SCORE(") {
        return Ok(Formula::Score(parse_score_rules(inner)));
    }

    Err(FormulaError::InvalidHead(text.to_string()))
}

/// Strip `HEAD(` and the trailing `)` from a simple-form formula.
fn strip_call<'a>(text: &'a str, head: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(head)?;
    rest.strip_suffix(')')
}

fn parse_combined(text: &str) -> Result<Formula, FormulaError> {
    let brace = text
        .find('{')
        .ok_or_else(|| FormulaError::MissingBrace(text.to_string()))?;

    let cond_text = text[..brace].trim();
    let cond_inner = strip_call(cond_text, "IF(")
        .ok_or_else(|| FormulaError::MissingParen(cond_text.to_string()))?;
    let cond = parse_cond_rules(cond_inner);

    let then_start = brace + 1;
    let then_end = find_matching_brace(text, then_start)
        .ok_or_else(|| FormulaError::UnterminatedBrace(text.to_string()))?;
    let then = parse_formula(&text[then_start..then_end])?;

    let mut otherwise = None;
    let tail = text[then_end + 1..].trim_start();
    if let Some(else_body) = tail.strip_prefix("ELSE{") {
        // offset of the ELSE body inside the original string
        let else_start = text.len() - else_body.len();
        let else_end = find_matching_brace(text, else_start)
            .ok_or_else(|| FormulaError::UnterminatedBrace(text.to_string()))?;
        otherwise = Some(Box::new(parse_formula(&text[else_start..else_end])?));
    }

    Ok(Formula::IfElse {
        cond,
        then: Box::new(then),
        otherwise,
    })
}

/// Index of the brace closing the one just before `start`, by counting
/// scan. Branch bodies nest arbitrarily, so a regular-expression shortcut
/// would miscount.
fn find_matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_score_rules(content: &str) -> Vec<ScoreRule> {
    let mut rules = Vec::new();

    for rule in content.split(';') {
        let rule = rule.trim();
        if rule.is_empty() {
            continue;
        }
        let parts: Vec<&str> = rule.split(':').collect();
        if parts.len() != 2 {
            continue;
        }

        let mut pairs = Vec::new();
        for pair in parts[1].split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let kv: Vec<&str> = pair.split('=').collect();
            if kv.len() != 2 {
                continue;
            }
            let value = match kv[1].trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => continue,
            };
            pairs.push((kv[0].trim().to_string(), value));
        }

        rules.push(ScoreRule {
            rsid: parts[0].trim().to_string(),
            pairs,
        });
    }

    rules
}

fn parse_cond_rules(content: &str) -> Vec<CondRule> {
    let mut rules = Vec::new();

    for rule in content.split(';') {
        let rule = rule.trim();
        if rule.is_empty() {
            continue;
        }
        let parts: Vec<&str> = rule.split(':').collect();
        if parts.len() != 2 {
            continue;
        }

        let mut pairs = Vec::new();
        for pair in parts[1].split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let kv: Vec<&str> = pair.split('=').collect();
            if kv.len() != 2 {
                continue;
            }
            let value = match kv[1].trim().to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => continue,
            };
            pairs.push((kv[0].trim().to_string(), value));
        }

        rules.push(CondRule {
            rsid: parts[0].trim().to_string(),
            pairs,
        });
    }

    rules
}
