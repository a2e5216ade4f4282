use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Can't read panel file: {0}")]
    FileReadError(String),

    #[error("Panel file has no header row: {0}")]
    MissingHeader(String),

    #[error("Panel header is missing required column: {0}")]
    MissingColumn(String),

    #[error("Error parsing panel record: {0}")]
    RecordParseError(String),

    #[error("Corrupted panel. 0 usable variants found in the file: {0}")]
    EmptyPanel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
