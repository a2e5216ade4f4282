//! Haplogroup stage: classify the Y and mitochondrial lineages from the
//! report's VCF, one classifier run per lineage tree.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::config::HaplogroupConfig;
use crate::tools::ToolCommand;

/// The two single-value lineage labels for a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaplogroupCall {
    pub y_hap: String,
    pub mt_hap: String,
}

pub fn run_haplogroup(
    config: &HaplogroupConfig,
    vcf_file: &Path,
    scratch: &Path,
    timeout: Duration,
) -> Result<HaplogroupCall> {
    let y_hap = classify_lineage(
        config,
        vcf_file,
        &config.y_tree,
        &config.y_loci,
        &scratch.join("YHap.txt"),
        timeout,
    )
    .context("Y-lineage classification failed")?;
    let mt_hap = classify_lineage(
        config,
        vcf_file,
        &config.mt_tree,
        &config.mt_loci,
        &scratch.join("MTHap.txt"),
        timeout,
    )
    .context("MT-lineage classification failed")?;

    Ok(HaplogroupCall { y_hap, mt_hap })
}

fn classify_lineage(
    config: &HaplogroupConfig,
    vcf_file: &Path,
    tree: &Path,
    loci: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<String> {
    ToolCommand::new(&config.program)
        .arg("-v")
        .arg_path(vcf_file)
        .arg("-t")
        .arg_path(tree)
        .arg("-l")
        .arg_path(loci)
        .arg("-o")
        .arg_path(output)
        .expect_output(output)
        .timeout(timeout)
        .run()?;

    let text = std::fs::read_to_string(output)
        .with_context(|| format!("Failed to read classifier output: {:?}", output))?;
    parse_haplogroup_table(&text)
}

/// Extract the first data row's `Haplogroup` column from the classifier's
/// TSV output.
pub fn parse_haplogroup_table(text: &str) -> Result<String> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or("");
    let Some(column) = header.split('\t').position(|name| name == "Haplogroup") else {
        bail!("Classifier output has no Haplogroup column");
    };

    let Some(first) = lines.next() else {
        bail!("Classifier output has no data rows");
    };
    let Some(label) = first.split('\t').nth(column) else {
        bail!("Classifier output row is missing the Haplogroup field");
    };
    Ok(label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_haplogroup_column_is_extracted() {
        let text = "Sample\tHaplogroup\tScore\nAncestra\tR1b1a2\t0.98\n";
        assert_eq!(parse_haplogroup_table(text).unwrap(), "R1b1a2");
    }

    #[rstest]
    fn test_missing_column_is_an_error() {
        let text = "Sample\tLineage\nAncestra\tR1b\n";
        assert!(parse_haplogroup_table(text).is_err());
    }

    #[rstest]
    fn test_empty_table_is_an_error() {
        assert!(parse_haplogroup_table("Sample\tHaplogroup\n").is_err());
    }
}
