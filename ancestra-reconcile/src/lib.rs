//! Turn a vendor raw-data file into reconciled variant rows.
//!
//! The flow is: parse the vendor file into genotype calls
//! ([`vendor::read_vendor_calls`]), match the calls against a loaded
//! [`ancestra_core::ReferencePanel`] ([`reconcile::reconcile_calls`]), and
//! write the accepted rows out as the reconciled CSV ([`output`]) or as a
//! VCF for the downstream haplogroup classifier ([`vcf`]).

pub mod output;
pub mod reconcile;
pub mod vcf;
pub mod vendor;

pub use reconcile::{ReconcileStats, reconcile_calls};
pub use vendor::read_vendor_calls;
