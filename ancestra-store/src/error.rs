use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid report identifier: {0}")]
    InvalidReportId(String),

    #[error("Variant table already exists for report {0}")]
    TableExists(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("The template report cannot be deleted")]
    TemplateProtected,

    #[error("Builtin trait {0} cannot be deleted")]
    TraitProtected(String),

    #[error("Trait not found: {0}")]
    TraitNotFound(String),

    #[error("Unknown ancestry component: {0}")]
    UnknownComponent(String),

    #[error("Record already exists for report {0}")]
    RecordExists(String),

    #[error(transparent)]
    Formula(#[from] ancestra_traits::FormulaError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
