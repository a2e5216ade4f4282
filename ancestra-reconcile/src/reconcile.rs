//! The genotype reconciliation algorithm.
//!
//! Every vendor call is matched against the panel records at its
//! (chromosome, position). A call is accepted only when its genotype is one
//! of the four two-allele strings the panel's ref/alt pair can produce;
//! everything else is filtered, never raised as an error. The
//! caller-visible transformation rate is a diagnostic, not a failure
//! signal.

use indicatif::{ProgressBar, ProgressStyle};

use ancestra_core::ReferencePanel;
use ancestra_core::models::{ReconciledVariant, VendorCall, Zygosity};

/// Counts for the transformation-rate diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub total_calls: usize,
    pub matched_rows: usize,
}

impl ReconcileStats {
    /// matched rows / total vendor calls, 0.0 for an empty input.
    pub fn rate(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }
        self.matched_rows as f64 / self.total_calls as f64
    }
}

/// Match vendor calls against the panel and classify zygosity.
///
/// Output order is deterministic: vendor-call order, then panel-record
/// order within a multi-allelic site. Re-running over the same inputs
/// yields an identical row sequence.
pub fn reconcile_calls(
    calls: &[VendorCall],
    panel: &ReferencePanel,
    progress: bool,
) -> (Vec<ReconciledVariant>, ReconcileStats) {
    let mut rows = Vec::new();
    let mut stats = ReconcileStats {
        total_calls: calls.len(),
        matched_rows: 0,
    };

    let pb = if progress {
        let pb = ProgressBar::new(calls.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} calls ({eta})")
                .unwrap()
                .progress_chars("##-"),
        );
        Some(pb)
    } else {
        None
    };

    for call in calls {
        for reference in panel.at(&call.chrom, call.pos) {
            if let Some(row) = reconcile_one(call, reference) {
                rows.push(row);
                stats.matched_rows += 1;
            }
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    (rows, stats)
}

fn reconcile_one(
    call: &VendorCall,
    reference: &ancestra_core::models::ReferenceVariant,
) -> Option<ReconciledVariant> {
    // dash placeholders are no-calls
    if call.genotype == "-" || call.genotype == "--" {
        return None;
    }

    if !genotype_is_consistent(&reference.ref_allele, &reference.alt_allele, &call.genotype) {
        return None;
    }

    // guaranteed 0..=2 by the membership test above; anything else is
    // dropped rather than stored with an undefined classification
    let zygosity = Zygosity::classify(&reference.ref_allele, &call.genotype)?;

    Some(ReconciledVariant {
        chrom: reference.chrom.clone(),
        pos: reference.pos,
        ref_allele: reference.ref_allele.clone(),
        alt_allele: reference.alt_allele.clone(),
        gene: reference.gene.clone(),
        rsid: reference.rsid.clone(),
        gnomad_af: reference.gnomad_af,
        clnsig: reference.clnsig.clone(),
        clndn: reference.clndn.clone(),
        genotype: call.genotype.clone(),
        zygosity,
    })
}

/// Membership in the four theoretically possible two-allele strings.
///
/// Both heterozygous orderings are tested explicitly instead of sorting the
/// genotype, so ambiguous encodings like `ID`/`DI` cannot miscompare.
fn genotype_is_consistent(ref_allele: &str, alt_allele: &str, genotype: &str) -> bool {
    genotype == format!("{}{}", ref_allele, ref_allele)
        || genotype == format!("{}{}", ref_allele, alt_allele)
        || genotype == format!("{}{}", alt_allele, alt_allele)
        || genotype == format!("{}{}", alt_allele, ref_allele)
}
