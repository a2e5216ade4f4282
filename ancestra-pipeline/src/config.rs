//! Pipeline configuration, loadable from a TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 1800;

/// Everything the orchestrator needs to run: where the database, panel and
/// raw-data archive live, and how to invoke the external annotators. The
/// annotator sections are optional so a deployment without the tools can
/// still create reports (those stages are skipped with a notice).
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub db_path: PathBuf,
    pub panel_path: PathBuf,
    pub rawdata_dir: PathBuf,
    pub scratch_dir: PathBuf,
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    #[serde(default)]
    pub ancestry: Option<AncestryConfig>,
    #[serde(default)]
    pub haplogroup: Option<HaplogroupConfig>,
}

/// Invocation of the ancestry-proportion estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct AncestryConfig {
    pub program: String,
    #[serde(default = "default_admixture_model")]
    pub model: String,
}

/// Invocation of the haplogroup classifier, once per lineage tree.
#[derive(Debug, Clone, Deserialize)]
pub struct HaplogroupConfig {
    pub program: String,
    pub y_tree: PathBuf,
    pub y_loci: PathBuf,
    pub mt_tree: PathBuf,
    pub mt_loci: PathBuf,
}

fn default_tool_timeout_secs() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECS
}

fn default_admixture_model() -> String {
    "K47".to_string()
}

impl PipelineConfig {
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<PipelineConfig> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: PipelineConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    #[rstest]
    fn test_minimal_config_parses_with_defaults() {
        let text = r#"
            db_path = "/data/ancestra.db"
            panel_path = "/data/panel.txt.gz"
            rawdata_dir = "/data/rawdata"
            scratch_dir = "/data/temp"
        "#;
        let config: PipelineConfig = toml::from_str(text).unwrap();

        assert_eq!(config.tool_timeout_secs, 1800);
        assert!(config.ancestry.is_none());
        assert!(config.haplogroup.is_none());
    }

    #[rstest]
    fn test_full_config_round_trip_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ancestra.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            db_path = "/data/ancestra.db"
            panel_path = "/data/panel.txt.gz"
            rawdata_dir = "/data/rawdata"
            scratch_dir = "/data/temp"
            tool_timeout_secs = 60

            [ancestry]
            program = "admix"

            [haplogroup]
            program = "haplogrouper"
            y_tree = "/data/chrY_tree.txt"
            y_loci = "/data/chrY_loci.txt"
            mt_tree = "/data/chrMT_tree.txt"
            mt_loci = "/data/chrMT_loci.txt"
        "#
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.tool_timeout(), Duration::from_secs(60));
        assert_eq!(config.ancestry.unwrap().model, "K47");
        assert_eq!(
            config.haplogroup.unwrap().program,
            "haplogrouper".to_string()
        );
    }
}
