//! Trait definition model and per-report outcome computation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FormulaError;
use crate::eval::{Value, evaluate};
use crate::formula::parse_formula;

/// Locale code -> text, with a `default` entry.
pub type LocalizedText = HashMap<String, String>;

/// A threshold cutoff: numeric for SCORE outputs, boolean for IF outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Flag(bool),
    Cutoff(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub label: String,
    pub value: ThresholdValue,
}

/// Ordered threshold tiers. Serialized as an array because insertion order
/// is the evaluation order: callers wanting "highest qualifying tier"
/// semantics supply numeric cutoffs in descending order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thresholds(pub Vec<ThresholdEntry>);

impl Thresholds {
    /// Label of the first tier the computed value satisfies: equality for
    /// booleans, `score >= cutoff` for numbers. No qualifying tier yields
    /// `None`, not an error.
    pub fn resolve(&self, value: &Value) -> Option<&str> {
        for entry in &self.0 {
            let hit = match (value, &entry.value) {
                (Value::Flag(flag), ThresholdValue::Flag(expected)) => flag == expected,
                (Value::Score(score), ThresholdValue::Cutoff(cutoff)) => score >= cutoff,
                _ => false,
            };
            if hit {
                return Some(&entry.label);
            }
        }
        None
    }
}

/// A named, formula-driven classification over a subset of a report's
/// genotypes. Builtin traits (`is_default = true`) ship with the database
/// and are not deletable; user traits carry generated `TRA_` identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitDefinition {
    pub id: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub icon: String,
    pub confidence: String,
    pub is_default: bool,
    pub created_at: String,
    pub category: String,
    /// Order determines the order genotypes are reported back.
    pub rsids: Vec<String>,
    pub formula: String,
    pub score_thresholds: Thresholds,
    /// Threshold label -> localized result text.
    pub result: HashMap<String, String>,
    pub reference: Vec<String>,
}

impl TraitDefinition {
    /// Generated identifier for a user-defined trait.
    pub fn new_user_id() -> String {
        format!("TRA_{}", ancestra_core::utils::random_id_suffix())
    }

    pub fn timestamp_now() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// The subject's state at one rsid, as read from a report table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenotypeRecord {
    /// Reference genotype at the site (`ref` doubled).
    pub reference: String,
    /// Genotype as reported by the vendor file.
    pub subject: String,
}

/// A trait evaluated against one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitOutcome {
    pub trait_id: String,
    pub value: Value,
    /// Result text for the first qualifying threshold tier, if any.
    pub result: Option<String>,
    /// The trait's rsids restricted to those present in the report, in
    /// rsid-list order.
    pub rsids: Vec<String>,
    pub reference_genotypes: Vec<String>,
    pub subject_genotypes: Vec<String>,
}

/// Parse and evaluate a trait's formula against the subject's genotypes
/// and resolve the threshold tiers into a result.
pub fn evaluate_trait(
    definition: &TraitDefinition,
    genotypes: &HashMap<String, GenotypeRecord>,
) -> Result<TraitOutcome, FormulaError> {
    let formula = parse_formula(&definition.formula)?;

    let subject_map: HashMap<String, String> = genotypes
        .iter()
        .map(|(rsid, record)| (rsid.clone(), record.subject.clone()))
        .collect();

    let value = evaluate(&formula, &subject_map);
    let result = definition
        .score_thresholds
        .resolve(&value)
        .and_then(|label| definition.result.get(label))
        .cloned();

    let rsids: Vec<String> = definition
        .rsids
        .iter()
        .filter(|rsid| genotypes.contains_key(*rsid))
        .cloned()
        .collect();
    let reference_genotypes = rsids
        .iter()
        .map(|rsid| genotypes[rsid].reference.clone())
        .collect();
    let subject_genotypes = rsids
        .iter()
        .map(|rsid| genotypes[rsid].subject.clone())
        .collect();

    Ok(TraitOutcome {
        trait_id: definition.id.clone(),
        value,
        result,
        rsids,
        reference_genotypes,
        subject_genotypes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn lactose_trait() -> TraitDefinition {
        TraitDefinition {
            id: "lactose_intolerance".to_string(),
            name: HashMap::from([
                ("default".to_string(), "Lactose intolerance".to_string()),
                ("en".to_string(), "Lactose intolerance".to_string()),
            ]),
            description: HashMap::new(),
            icon: "milk".to_string(),
            confidence: "high".to_string(),
            is_default: true,
            created_at: TraitDefinition::timestamp_now(),
            category: "nutrition".to_string(),
            rsids: vec!["rs4988235".to_string(), "rs182549".to_string()],
            formula: "SCORE(rs4988235:CT=5,CC=0,TT=10; rs182549:CT=5,CC=0,TT=10)".to_string(),
            score_thresholds: Thresholds(vec![
                ThresholdEntry {
                    label: "tolerant".to_string(),
                    value: ThresholdValue::Cutoff(10.0),
                },
                ThresholdEntry {
                    label: "partial".to_string(),
                    value: ThresholdValue::Cutoff(5.0),
                },
                ThresholdEntry {
                    label: "intolerant".to_string(),
                    value: ThresholdValue::Cutoff(0.0),
                },
            ]),
            result: HashMap::from([
                ("tolerant".to_string(), "Likely tolerant".to_string()),
                ("partial".to_string(), "Partially tolerant".to_string()),
                ("intolerant".to_string(), "Likely intolerant".to_string()),
            ]),
            reference: vec!["PMID:11788828".to_string()],
        }
    }

    fn subject(pairs: &[(&str, &str, &str)]) -> HashMap<String, GenotypeRecord> {
        pairs
            .iter()
            .map(|(rsid, reference, subject)| {
                (
                    rsid.to_string(),
                    GenotypeRecord {
                        reference: reference.to_string(),
                        subject: subject.to_string(),
                    },
                )
            })
            .collect()
    }

    #[rstest]
    fn test_outcome_picks_first_qualifying_tier() {
        let outcome = evaluate_trait(
            &lactose_trait(),
            &subject(&[("rs4988235", "CC", "CT"), ("rs182549", "CC", "CT")]),
        )
        .unwrap();

        assert_eq!(outcome.value, Value::Score(10.0));
        assert_eq!(outcome.result.as_deref(), Some("Likely tolerant"));
        assert_eq!(outcome.rsids, vec!["rs4988235", "rs182549"]);
        assert_eq!(outcome.subject_genotypes, vec!["CT", "CT"]);
        assert_eq!(outcome.reference_genotypes, vec!["CC", "CC"]);
    }

    #[rstest]
    fn test_missing_rsids_are_dropped_from_the_panel() {
        let outcome =
            evaluate_trait(&lactose_trait(), &subject(&[("rs182549", "CC", "CC")])).unwrap();

        assert_eq!(outcome.rsids, vec!["rs182549"]);
        assert_eq!(outcome.value, Value::Score(0.0));
        assert_eq!(outcome.result.as_deref(), Some("Likely intolerant"));
    }

    #[rstest]
    fn test_no_qualifying_tier_is_none() {
        let mut definition = lactose_trait();
        definition.score_thresholds = Thresholds(vec![ThresholdEntry {
            label: "high".to_string(),
            value: ThresholdValue::Cutoff(100.0),
        }]);

        let outcome =
            evaluate_trait(&definition, &subject(&[("rs4988235", "CC", "CT")])).unwrap();
        assert_eq!(outcome.result, None);
    }

    #[rstest]
    fn test_boolean_thresholds_match_by_equality() {
        let mut definition = lactose_trait();
        definition.formula = "IF(rs4988235:CT=true,CC=false)".to_string();
        definition.score_thresholds = Thresholds(vec![
            ThresholdEntry {
                label: "yes".to_string(),
                value: ThresholdValue::Flag(true),
            },
            ThresholdEntry {
                label: "no".to_string(),
                value: ThresholdValue::Flag(false),
            },
        ]);
        definition.result = HashMap::from([
            ("yes".to_string(), "Condition present".to_string()),
            ("no".to_string(), "Condition absent".to_string()),
        ]);

        let outcome =
            evaluate_trait(&definition, &subject(&[("rs4988235", "CC", "CC")])).unwrap();
        assert_eq!(outcome.value, Value::Flag(false));
        assert_eq!(outcome.result.as_deref(), Some("Condition absent"));
    }

    #[rstest]
    fn test_definition_json_round_trip() {
        let definition = lactose_trait();
        let json = serde_json::to_string_pretty(&definition).unwrap();
        assert!(json.contains("\"scoreThresholds\""));
        assert!(json.contains("\"isDefault\": true"));

        let back: TraitDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, definition);
    }

    #[rstest]
    fn test_new_user_id_shape() {
        let id = TraitDefinition::new_user_id();
        assert!(id.starts_with("TRA_"));
        assert_eq!(id.len(), 14);
    }
}
