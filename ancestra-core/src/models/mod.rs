pub mod source;
pub mod variant;
pub mod zygosity;

pub use source::DataSource;
pub use variant::{ReconciledVariant, ReferenceVariant, VendorCall};
pub use zygosity::Zygosity;
