use serde::Serialize;

use crate::ids::ReportId;

/// How a write should treat an existing artifact: `CreateOnly` rejects a
/// conflict, `Overwrite` drops and recreates (tables) or deletes then
/// inserts (singleton rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    CreateOnly,
    Overwrite,
}

impl WriteMode {
    pub fn overwrite(&self) -> bool {
        matches!(self, WriteMode::Overwrite)
    }
}

/// Metadata row for one uploaded report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    #[serde(serialize_with = "serialize_report_id")]
    pub report_id: ReportId,
    pub user_id: String,
    pub file_format: String,
    pub data_source: String,
    pub name: String,
    pub is_default: bool,
    pub total_variants: u64,
    pub upload_date: String,
}

fn serialize_report_id<S: serde::Serializer>(
    id: &ReportId,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(id.as_str())
}

/// One page of a full variant-table scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPage {
    pub rows: Vec<ancestra_core::models::ReconciledVariant>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}
