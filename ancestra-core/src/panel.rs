//! Reference-variant panel loading and normalization.
//!
//! The panel is a gzip-compressed, tab-delimited file with a header row
//! naming at least `Chrom, Start, Ref, Alt, Gene, RSID, gnomAD_AF, CLNSIG,
//! CLNDN`. It is loaded fresh for every reconciliation run and never
//! mutated afterwards.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::errors::PanelError;
use crate::models::ReferenceVariant;
use crate::utils::get_dynamic_reader;

const REQUIRED_COLUMNS: [&str; 9] = [
    "Chrom", "Start", "Ref", "Alt", "Gene", "RSID", "gnomAD_AF", "CLNSIG", "CLNDN",
];

/// An immutable panel of known variants indexed by (chromosome, position).
///
/// Multi-allelic sites keep every record at their position; a vendor call
/// is tested against each of them in file order.
#[derive(Debug, Default)]
pub struct ReferencePanel {
    variants: HashMap<(String, u64), Vec<ReferenceVariant>>,
    len: usize,
}

impl ReferencePanel {
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<ReferencePanel, PanelError> {
        let path = path.as_ref();
        let reader = get_dynamic_reader(path)
            .map_err(|e| PanelError::FileReadError(format!("{:?}: {}", path, e)))?;

        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(PanelError::MissingHeader(format!("{:?}", path))),
        };

        let columns = column_index(&header)?;

        let mut panel = ReferencePanel::default();
        for line in lines {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < columns.width {
                return Err(PanelError::RecordParseError(line));
            }

            let chrom = normalize_chrom(fields[columns.chrom]);
            let pos = fields[columns.start]
                .parse::<u64>()
                .map_err(|_| PanelError::RecordParseError(line.clone()))?;

            // MNV records are unencodable for chip inputs and leave the run
            let (ref_allele, alt_allele) =
                match normalize_indel(fields[columns.ref_allele], fields[columns.alt_allele]) {
                    Some(alleles) => alleles,
                    None => continue,
                };

            let variant = ReferenceVariant {
                chrom: chrom.clone(),
                pos,
                ref_allele,
                alt_allele,
                gene: fields[columns.gene].to_string(),
                rsid: fields[columns.rsid].to_string(),
                gnomad_af: parse_optional_f64(fields[columns.gnomad_af]),
                clnsig: parse_optional_text(fields[columns.clnsig]),
                clndn: parse_optional_text(fields[columns.clndn]),
            };

            panel.variants.entry((chrom, pos)).or_default().push(variant);
            panel.len += 1;
        }

        if panel.len == 0 {
            return Err(PanelError::EmptyPanel(format!("{:?}", path)));
        }

        Ok(panel)
    }

    /// All panel records at a given site, in panel-file order.
    pub fn at(&self, chrom: &str, pos: u64) -> &[ReferenceVariant] {
        self.variants
            .get(&(chrom.to_string(), pos))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of usable (non-MNV) panel records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

struct ColumnIndex {
    chrom: usize,
    start: usize,
    ref_allele: usize,
    alt_allele: usize,
    gene: usize,
    rsid: usize,
    gnomad_af: usize,
    clnsig: usize,
    clndn: usize,
    width: usize,
}

fn column_index(header: &str) -> Result<ColumnIndex, PanelError> {
    let names: Vec<&str> = header.split('\t').collect();
    let find = |name: &str| -> Result<usize, PanelError> {
        names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| PanelError::MissingColumn(name.to_string()))
    };

    for required in REQUIRED_COLUMNS {
        find(required)?;
    }

    Ok(ColumnIndex {
        chrom: find("Chrom")?,
        start: find("Start")?,
        ref_allele: find("Ref")?,
        alt_allele: find("Alt")?,
        gene: find("Gene")?,
        rsid: find("RSID")?,
        gnomad_af: find("gnomAD_AF")?,
        clnsig: find("CLNSIG")?,
        clndn: find("CLNDN")?,
        width: names.len(),
    })
}

/// Strip the `chr` prefix and map the mitochondrial contig to `MT`.
pub fn normalize_chrom(chrom: &str) -> String {
    if chrom == "chrM" {
        return "MT".to_string();
    }
    chrom.strip_prefix("chr").unwrap_or(chrom).to_string()
}

/// Re-encode an indel allele pair to the single-character `I`/`D` tokens.
///
/// The longer allele of an unequal-length pair carries the insertion. A
/// dash placeholder on one side of an equal-length single-character pair
/// marks the deleted allele. Equal-length multi-character pairs (MNVs)
/// cannot be expressed in chip output and return `None`.
pub fn normalize_indel(ref_allele: &str, alt_allele: &str) -> Option<(String, String)> {
    let (r, a) = (ref_allele.len(), alt_allele.len());
    if r > a {
        Some(("I".to_string(), "D".to_string()))
    } else if r < a {
        Some(("D".to_string(), "I".to_string()))
    } else if r == 1 {
        if alt_allele == "-" {
            Some(("I".to_string(), "D".to_string()))
        } else if ref_allele == "-" {
            Some(("D".to_string(), "I".to_string()))
        } else {
            Some((ref_allele.to_string(), alt_allele.to_string()))
        }
    } else {
        None
    }
}

fn parse_optional_text(field: &str) -> Option<String> {
    match field {
        "" | "." => None,
        other => Some(other.to_string()),
    }
}

fn parse_optional_f64(field: &str) -> Option<f64> {
    match field {
        "" | "." => None,
        other => other.parse::<f64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    #[rstest]
    #[case("ACT", "A", "I", "D")]
    #[case("A", "ACT", "D", "I")]
    #[case("C", "-", "I", "D")]
    #[case("-", "G", "D", "I")]
    #[case("C", "T", "C", "T")]
    fn test_normalize_indel(
        #[case] ref_allele: &str,
        #[case] alt_allele: &str,
        #[case] expected_ref: &str,
        #[case] expected_alt: &str,
    ) {
        let (r, a) = normalize_indel(ref_allele, alt_allele).unwrap();
        assert_eq!(r, expected_ref);
        assert_eq!(a, expected_alt);
    }

    #[rstest]
    fn test_mnv_records_are_dropped() {
        assert_eq!(normalize_indel("AC", "GT"), None);
    }

    #[rstest]
    #[case("chr1", "1")]
    #[case("chrM", "MT")]
    #[case("chrX", "X")]
    #[case("7", "7")]
    fn test_normalize_chrom(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_chrom(raw), expected);
    }

    fn write_panel(lines: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.txt.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        writeln!(
            encoder,
            "Chrom\tStart\tRef\tAlt\tGene\tRSID\tgnomAD_AF\tCLNSIG\tCLNDN"
        )
        .unwrap();
        for line in lines {
            writeln!(encoder, "{}", line).unwrap();
        }
        encoder.finish().unwrap();
        (dir, path)
    }

    #[rstest]
    fn test_panel_loading_and_lookup() {
        let (_dir, path) = write_panel(&[
            "chr1\t100\tC\tT\tGENE1\trs123\t0.25\tBenign\tsome_disease",
            "chr1\t100\tC\tG\tGENE1\trs123\t.\t.\t.",
            "chrM\t200\tACT\tA\tGENE2\trs456\t0.5\t.\t.",
            "chr2\t300\tAC\tGT\tGENE3\trs789\t.\t.\t.",
        ]);

        let panel = ReferencePanel::from_file(&path).unwrap();
        // MNV at chr2:300 is excluded from the working set
        assert_eq!(panel.len(), 3);
        assert_eq!(panel.at("2", 300), &[]);

        let site = panel.at("1", 100);
        assert_eq!(site.len(), 2);
        assert_eq!(site[0].alt_allele, "T");
        assert_eq!(site[0].gnomad_af, Some(0.25));
        assert_eq!(site[1].clnsig, None);

        let indel = panel.at("MT", 200);
        assert_eq!(indel[0].ref_allele, "I");
        assert_eq!(indel[0].alt_allele, "D");
    }

    #[rstest]
    fn test_missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.txt.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        writeln!(encoder, "Chrom\tStart\tRef\tAlt").unwrap();
        encoder.finish().unwrap();

        let err = ReferencePanel::from_file(&path).unwrap_err();
        assert!(matches!(err, PanelError::MissingColumn(_)));
    }
}
