use serde::{Deserialize, Serialize};

use super::Zygosity;

/// One record of the reference-variant panel after normalization.
///
/// Immutable for the lifetime of a reconciliation run. Indel alleles have
/// already been re-encoded to the single-character `I`/`D` tokens by the
/// panel loader, so `ref_allele`/`alt_allele` are always one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceVariant {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub gene: String,
    pub rsid: String,
    pub gnomad_af: Option<f64>,
    pub clnsig: Option<String>,
    pub clndn: Option<String>,
}

/// A single genotype call parsed from a vendor raw-data file.
///
/// Ephemeral: exists only between parsing and reconciliation. The genotype
/// string is one or two characters as reported by the chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCall {
    pub rsid: String,
    pub chrom: String,
    pub pos: u64,
    pub genotype: String,
}

/// A vendor call accepted against the panel, ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledVariant {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub gene: String,
    pub rsid: String,
    pub gnomad_af: Option<f64>,
    pub clnsig: Option<String>,
    pub clndn: Option<String>,
    /// Genotype exactly as reported by the vendor file.
    pub genotype: String,
    pub zygosity: Zygosity,
}

impl ReconciledVariant {
    /// The subject's reference genotype at this site (`ref` doubled),
    /// used when reporting trait genotype panels back to the caller.
    pub fn reference_genotype(&self) -> String {
        format!("{}{}", self.ref_allele, self.ref_allele)
    }
}
