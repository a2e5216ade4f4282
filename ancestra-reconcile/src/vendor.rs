//! Vendor raw-data file parsing.
//!
//! All three supported shapes are tab-delimited with `#` comment lines.
//! The generic and 23andMe shapes carry `rsid, chromosome, position,
//! genotype` columns with no header; AncestryDNA carries a header row and
//! separate `allele1`/`allele2` columns with numerically coded chromosomes.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result, bail};

use ancestra_core::models::{DataSource, VendorCall};
use ancestra_core::utils::get_dynamic_reader;

/// Parse a vendor raw-data file into genotype calls.
pub fn read_vendor_calls<T: AsRef<Path>>(path: T, source: DataSource) -> Result<Vec<VendorCall>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path)
        .with_context(|| format!("Failed to open vendor raw-data file: {:?}", path))?;

    match source {
        DataSource::TwentyThreeAndMe => read_four_column(reader, true),
        DataSource::Generic => read_four_column(reader, false),
        DataSource::Ancestry => read_ancestry(reader),
    }
}

fn read_four_column<R: BufRead>(reader: R, double_haploid: bool) -> Result<Vec<VendorCall>> {
    let mut calls = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split('\t');
        let (rsid, chrom, pos, genotype) = match (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) {
            (Some(rsid), Some(chrom), Some(pos), Some(genotype)) => (rsid, chrom, pos, genotype),
            _ => bail!("Failed to parse raw-data file at line {}: {}", index + 1, line),
        };

        let pos = pos
            .parse::<u64>()
            .with_context(|| format!("Bad position at line {}: {}", index + 1, line))?;

        // 23andMe reports haploid X/Y/MT sites as a single character
        let genotype = if double_haploid && genotype.len() == 1 {
            format!("{0}{0}", genotype)
        } else {
            genotype.to_string()
        };

        calls.push(VendorCall {
            rsid: rsid.to_string(),
            chrom: chrom.to_string(),
            pos,
            genotype,
        });
    }

    Ok(calls)
}

fn read_ancestry<R: BufRead>(reader: R) -> Result<Vec<VendorCall>> {
    let mut calls = Vec::new();
    let mut header_seen = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !header_seen {
            // first non-comment line is the column header
            header_seen = true;
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            bail!("Failed to parse raw-data file at line {}: {}", index + 1, line);
        }

        let chrom_code = fields[1]
            .parse::<u8>()
            .with_context(|| format!("Bad chromosome code at line {}: {}", index + 1, line))?;

        let chrom = match chrom_code {
            23 => "X".to_string(),
            24 => "Y".to_string(),
            // pseudo-autosomal region, excluded from the run
            25 => continue,
            26 => "MT".to_string(),
            other => other.to_string(),
        };

        let pos = fields[2]
            .parse::<u64>()
            .with_context(|| format!("Bad position at line {}: {}", index + 1, line))?;

        calls.push(VendorCall {
            rsid: fields[0].to_string(),
            chrom,
            pos,
            genotype: format!("{}{}", fields[3], fields[4]),
        });
    }

    Ok(calls)
}
