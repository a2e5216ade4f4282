//! Trait definitions and the formula engine.
//!
//! A trait is a named classification computed from a subset of a report's
//! genotypes. Its formula is one of three forms: `SCORE(...)` summing
//! per-genotype coefficients, `IF(...)` ANDing per-genotype conditions, or
//! the combined `IF(...){...}ELSE{...}` whose branch bodies are full
//! formulas themselves. Formulas are parsed into a [`formula::Formula`]
//! tree once, then evaluated against a genotype map.

pub mod error;
pub mod eval;
pub mod formula;
pub mod model;

pub use error::FormulaError;
pub use eval::{Value, evaluate};
pub use formula::{Formula, parse_formula};
pub use model::{GenotypeRecord, Thresholds, TraitDefinition, TraitOutcome, evaluate_trait};
