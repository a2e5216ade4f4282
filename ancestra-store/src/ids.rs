//! Validated report identifiers.
//!
//! Report ids are spliced into table names, so they are validated up
//! front: either the fixed template id or `RPT_` followed by exactly ten
//! uppercase alphanumerics. Nothing else ever reaches the SQL layer.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

pub const TEMPLATE_REPORT_ID: &str = "RPT_TEMPLATE01";

const REPORT_PREFIX: &str = "RPT_";
const RAWDATA_PREFIX: &str = "RDT_";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportId(String);

impl ReportId {
    pub fn new(id: &str) -> Result<ReportId, StoreError> {
        if id == TEMPLATE_REPORT_ID {
            return Ok(ReportId(id.to_string()));
        }

        let suffix = id
            .strip_prefix(REPORT_PREFIX)
            .ok_or_else(|| StoreError::InvalidReportId(id.to_string()))?;
        if suffix.len() != 10
            || !suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(StoreError::InvalidReportId(id.to_string()));
        }

        Ok(ReportId(id.to_string()))
    }

    pub fn random() -> ReportId {
        ReportId(format!(
            "{}{}",
            REPORT_PREFIX,
            ancestra_core::utils::random_id_suffix()
        ))
    }

    pub fn template() -> ReportId {
        ReportId(TEMPLATE_REPORT_ID.to_string())
    }

    pub fn is_template(&self) -> bool {
        self.0 == TEMPLATE_REPORT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of the archived raw-data file behind this report.
    pub fn rawdata_id(&self) -> String {
        self.0.replacen(REPORT_PREFIX, RAWDATA_PREFIX, 1)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("RPT_TEMPLATE01", true)]
    #[case("RPT_ABC123XYZ0", true)]
    #[case("RPT_abc123xyz0", false)]
    #[case("RPT_SHORT", false)]
    #[case("RPT_TOOLONGBY1CH", false)]
    #[case("XPT_ABC123XYZ0", false)]
    #[case("RPT_ABC'; DROP", false)]
    fn test_validation(#[case] id: &str, #[case] ok: bool) {
        assert_eq!(ReportId::new(id).is_ok(), ok);
    }

    #[rstest]
    fn test_random_ids_validate() {
        let id = ReportId::random();
        assert!(ReportId::new(id.as_str()).is_ok());
        assert!(!id.is_template());
    }

    #[rstest]
    fn test_rawdata_id() {
        let id = ReportId::new("RPT_ABC123XYZ0").unwrap();
        assert_eq!(id.rawdata_id(), "RDT_ABC123XYZ0");
    }
}
