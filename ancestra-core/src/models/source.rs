use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Vendor format of an uploaded raw-data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// 23andMe tab format. Haploid X/Y/MT calls are reported as a single
    /// character and must be doubled before matching.
    #[serde(rename = "23andme")]
    TwentyThreeAndMe,
    /// AncestryDNA tab format with a header row and two allele columns.
    /// Chromosomes are numeric: 23=X, 24=Y, 25=PAR (excluded), 26=MT.
    Ancestry,
    /// Generic four-column tab format (also produced by WeGene).
    Generic,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::TwentyThreeAndMe => "23andme",
            DataSource::Ancestry => "ancestry",
            DataSource::Generic => "generic",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "23andme" => Ok(DataSource::TwentyThreeAndMe),
            "ancestry" => Ok(DataSource::Ancestry),
            "generic" | "wegene" => Ok(DataSource::Generic),
            _ => Err(format!("Unknown data source: {}", s)),
        }
    }
}
