//! SQLite-backed report store.
//!
//! Every uploaded sample owns one dynamically named variant table next to
//! shared `reports`, `traits`, `admixture` and `haplogroup` metadata
//! tables. Writers to the shared tables must serialize: the store is built
//! around a single owned connection, and the read-then-write sequences
//! (default-report reassignment, table-existence checks) run inside
//! transactions on it.

pub mod admixture;
pub mod error;
pub mod ids;
pub mod report;
pub mod store;

pub use admixture::ADMIXTURE_COMPONENTS;
pub use error::StoreError;
pub use ids::{ReportId, TEMPLATE_REPORT_ID};
pub use report::{ReportRecord, VariantPage, WriteMode};
pub use store::ReportStore;
