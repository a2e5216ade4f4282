//! Ancestry-proportion stage: run the external estimator over the raw
//! vendor file and parse its free-text percentage report.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use ancestra_core::models::DataSource;
use ancestra_store::admixture::is_known_component;

use crate::config::AncestryConfig;
use crate::tools::ToolCommand;

/// Invoke the estimator and return the parsed component map. Component
/// names the store does not know are dropped here, with a notice, so a
/// model revision in the external tool cannot poison the database.
pub fn run_ancestry(
    config: &AncestryConfig,
    raw_file: &Path,
    source: DataSource,
    scratch: &Path,
    timeout: Duration,
) -> Result<HashMap<String, f64>> {
    let report_path = scratch.join("admixture.txt");

    ToolCommand::new(&config.program)
        .arg("-f")
        .arg_path(raw_file)
        .arg("-v")
        .arg(source.as_str())
        .arg("-m")
        .arg(&config.model)
        .stdout_to(&report_path)
        .expect_output(&report_path)
        .timeout(timeout)
        .run()
        .context("Ancestry estimator failed")?;

    let text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("Failed to read ancestry report: {:?}", report_path))?;

    let mut components = parse_ancestry_report(&text, &config.model);
    components.retain(|name, _| {
        let known = is_known_component(name);
        if !known {
            println!("Dropping unknown ancestry component: {}", name);
        }
        known
    });
    Ok(components)
}

/// Parse `Name: 12.34%` lines following the model marker. Hyphenated
/// component names are normalized to underscores; lines that do not fit
/// the shape (headers, progress chatter) are skipped.
pub fn parse_ancestry_report(text: &str, model: &str) -> HashMap<String, f64> {
    let mut components = HashMap::new();
    let mut in_results = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !in_results {
            if line.contains(model) {
                in_results = true;
            }
            continue;
        }

        let Some((name, percent)) = line.split_once(": ") else {
            continue;
        };
        let Ok(value) = percent.trim_end_matches('%').parse::<f64>() else {
            continue;
        };
        components.insert(name.replace('-', "_"), value);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    const REPORT: &str = "\
Calculation is started...
Model: K47

Kushitic: 0.32%
North-Sea-Germanic: 13.28%
East_Asian: 86.40%
";

    #[rstest]
    fn test_components_after_marker_are_parsed() {
        let components = parse_ancestry_report(REPORT, "K47");

        assert_eq!(components.len(), 3);
        assert_eq!(components["Kushitic"], 0.32);
        assert_eq!(components["North_Sea_Germanic"], 13.28);
        assert_eq!(components["East_Asian"], 86.40);
    }

    #[rstest]
    fn test_lines_before_marker_are_ignored() {
        let text = "Bogus: 99.9%\nModel: K47\nCeltic: 1.5%\n";
        let components = parse_ancestry_report(text, "K47");

        assert_eq!(components.len(), 1);
        assert_eq!(components["Celtic"], 1.5);
    }

    #[rstest]
    fn test_unparseable_lines_are_skipped() {
        let text = "Model: K47\nfinished in 3s\nBaltic: not-a-number%\nMalay: 2.0%\n";
        let components = parse_ancestry_report(text, "K47");

        assert_eq!(components.len(), 1);
        assert_eq!(components["Malay"], 2.0);
    }
}
