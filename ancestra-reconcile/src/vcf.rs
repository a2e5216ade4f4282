//! VCF 4.2 emission for the external haplogroup classifier.
//!
//! Only SNP rows survive: WT sites carry no signal for lineage calling and
//! indel/no-call genotypes are excluded because the classifier trees are
//! SNP-based. A `.gz` target is written as bgzf with a tabix index beside
//! it, since the classifier opens the calls through htslib-style random
//! access.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use noodles::bgzf;
use noodles::core::Position;
use noodles::csi::binning_index::index::header::Builder as TabixHeaderBuilder;
use noodles::csi::binning_index::index::reference_sequence::bin::Chunk;
use noodles::tabix;

use ancestra_core::models::{ReconciledVariant, Zygosity};

const EXCLUDED_GENOTYPES: [&str; 5] = ["DD", "II", "DI", "ID", "--"];

/// Write reconciled rows as a coordinate-sorted VCF. A path ending in `.gz`
/// is bgzf-compressed and gets a `.tbi` index next to it; any other path is
/// written plain. One data line per non-WT, non-ambiguous row; GT is `0/1`
/// for HET and `1/1` for HOM.
pub fn write_vcf<T: AsRef<Path>>(rows: &[ReconciledVariant], path: T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut records: Vec<&ReconciledVariant> = rows
        .iter()
        .filter(|row| {
            row.zygosity != Zygosity::Wt && !EXCLUDED_GENOTYPES.contains(&row.genotype.as_str())
        })
        .collect();
    records.sort_by(|a, b| (a.chrom.as_str(), a.pos).cmp(&(b.chrom.as_str(), b.pos)));

    let file =
        File::create(path).with_context(|| format!("Failed to create VCF file: {:?}", path))?;
    let bgzip = path.extension().map(|e| e == "gz").unwrap_or(false);
    if bgzip {
        write_bgzf_indexed(&records, path, file)
    } else {
        let mut writer = BufWriter::new(file);
        write_header(&mut writer)?;
        for row in &records {
            write_record(&mut writer, row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Path of the tabix index written next to a bgzf VCF.
pub fn tabix_index_path(vcf_path: &Path) -> PathBuf {
    let mut index = vcf_path.as_os_str().to_owned();
    index.push(".tbi");
    PathBuf::from(index)
}

fn write_bgzf_indexed(records: &[&ReconciledVariant], path: &Path, file: File) -> Result<()> {
    let mut writer = bgzf::Writer::new(file);
    write_header(&mut writer)?;

    let mut indexer = tabix::index::Indexer::default();
    indexer.set_header(TabixHeaderBuilder::vcf().build());

    for row in records {
        let chunk_start = writer.virtual_position();
        write_record(&mut writer, row)?;
        let chunk_end = writer.virtual_position();

        let position = Position::try_from(row.pos as usize)
            .with_context(|| format!("Invalid VCF position for {}: {}", row.rsid, row.pos))?;
        indexer.add_record(
            &row.chrom,
            position,
            position,
            Chunk::new(chunk_start, chunk_end),
        )?;
    }

    writer.finish()?;

    let index = indexer.build();
    let index_path = tabix_index_path(path);
    let index_file = File::create(&index_path)
        .with_context(|| format!("Failed to create tabix index: {:?}", index_path))?;
    let mut index_writer = tabix::io::Writer::new(index_file);
    index_writer.write_index(&index)?;

    Ok(())
}

fn write_header<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "##fileformat=VCFv4.2")?;
    writeln!(writer, "##source=ancestra")?;
    writeln!(writer, "##reference=GRCh37")?;
    writeln!(
        writer,
        "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tAncestra"
    )?;
    Ok(())
}

fn write_record<W: Write>(writer: &mut W, row: &ReconciledVariant) -> Result<()> {
    let gt = match row.zygosity {
        Zygosity::Het => "0/1",
        Zygosity::Hom => "1/1",
        Zygosity::Wt => unreachable!(),
    };

    writeln!(
        writer,
        "{}\t{}\t.\t{}\t{}\t.\tPASS\t.\tGT\t{}",
        row.chrom, row.pos, row.ref_allele, row.alt_allele, gt
    )?;
    Ok(())
}
