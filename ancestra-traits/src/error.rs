use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("Formula must start with SCORE( or IF(: {0}")]
    InvalidHead(String),

    #[error("Formula is missing its closing parenthesis: {0}")]
    MissingParen(String),

    #[error("Combined formula is missing a matching brace: {0}")]
    UnterminatedBrace(String),

    #[error("Combined formula is missing its opening brace: {0}")]
    MissingBrace(String),
}
