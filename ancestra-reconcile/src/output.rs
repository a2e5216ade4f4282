//! Reconciled CSV read/write.
//!
//! The reconciled shape round-trips: the pipeline writes it after a
//! reconciliation run and the store (and the VCF emitter) read it back.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use ancestra_core::models::{ReconciledVariant, Zygosity};

pub const CSV_HEADER: [&str; 11] = [
    "Chrom", "Start", "Ref", "Alt", "Gene", "RSID", "gnomAD_AF", "CLNSIG", "CLNDN", "Genotype",
    "Check",
];

///
/// Write reconciled rows as CSV.
///
/// # Arguments
/// - rows: reconciled variant rows in reconciliation order
/// - path: the path to the file to dump to
///
pub fn write_reconciled_csv<T: AsRef<Path>>(rows: &[ReconciledVariant], path: T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create reconciled CSV: {:?}", path))?;
    writer.write_record(CSV_HEADER)?;

    for row in rows {
        writer.write_record([
            row.chrom.as_str(),
            &row.pos.to_string(),
            row.ref_allele.as_str(),
            row.alt_allele.as_str(),
            row.gene.as_str(),
            row.rsid.as_str(),
            &row.gnomad_af.map(|af| af.to_string()).unwrap_or_default(),
            row.clnsig.as_deref().unwrap_or(""),
            row.clndn.as_deref().unwrap_or(""),
            row.genotype.as_str(),
            &row.zygosity.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

///
/// Read a reconciled CSV back into rows.
///
/// # Arguments
/// - path: the path to a CSV produced by [`write_reconciled_csv`]
///
pub fn read_reconciled_csv<T: AsRef<Path>>(path: T) -> Result<Vec<ReconciledVariant>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open reconciled CSV: {:?}", path))?;

    let headers = reader.headers()?.clone();
    for required in CSV_HEADER {
        if !headers.iter().any(|h| h == required) {
            bail!("Reconciled CSV {:?} is missing column {}", path, required);
        }
    }
    let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let (chrom, start, ref_allele, alt_allele, gene, rsid, gnomad_af, clnsig, clndn, genotype, check) = (
        col("Chrom"),
        col("Start"),
        col("Ref"),
        col("Alt"),
        col("Gene"),
        col("RSID"),
        col("gnomAD_AF"),
        col("CLNSIG"),
        col("CLNDN"),
        col("Genotype"),
        col("Check"),
    );

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("");

        rows.push(ReconciledVariant {
            chrom: field(chrom).to_string(),
            pos: field(start)
                .parse::<u64>()
                .with_context(|| format!("Bad Start field in {:?}: {:?}", path, record))?,
            ref_allele: field(ref_allele).to_string(),
            alt_allele: field(alt_allele).to_string(),
            gene: field(gene).to_string(),
            rsid: field(rsid).to_string(),
            gnomad_af: match field(gnomad_af) {
                "" => None,
                af => Some(
                    af.parse::<f64>()
                        .with_context(|| format!("Bad gnomAD_AF field in {:?}: {:?}", path, record))?,
                ),
            },
            clnsig: non_empty(field(clnsig)),
            clndn: non_empty(field(clndn)),
            genotype: field(genotype).to_string(),
            zygosity: Zygosity::from_str(field(check))
                .map_err(|e| anyhow::anyhow!("{} in {:?}", e, path))?,
        });
    }

    Ok(rows)
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn sample_rows() -> Vec<ReconciledVariant> {
        vec![
            ReconciledVariant {
                chrom: "1".to_string(),
                pos: 100,
                ref_allele: "C".to_string(),
                alt_allele: "T".to_string(),
                gene: "GENE1".to_string(),
                rsid: "rs123".to_string(),
                gnomad_af: Some(0.25),
                clnsig: Some("Benign".to_string()),
                clndn: Some("disease_a,disease_b".to_string()),
                genotype: "CT".to_string(),
                zygosity: Zygosity::Het,
            },
            ReconciledVariant {
                chrom: "X".to_string(),
                pos: 200,
                ref_allele: "I".to_string(),
                alt_allele: "D".to_string(),
                gene: "GENE2".to_string(),
                rsid: "rs456".to_string(),
                gnomad_af: None,
                clnsig: None,
                clndn: None,
                genotype: "II".to_string(),
                zygosity: Zygosity::Wt,
            },
        ]
    }

    #[rstest]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reconciled.csv");
        let rows = sample_rows();

        write_reconciled_csv(&rows, &path).unwrap();
        let back = read_reconciled_csv(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[rstest]
    fn test_rewrite_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        let rows = sample_rows();

        write_reconciled_csv(&rows, &first).unwrap();
        write_reconciled_csv(&rows, &second).unwrap();

        let a = std::fs::read(&first).unwrap();
        let b = std::fs::read(&second).unwrap();
        assert_eq!(a, b);
    }
}
