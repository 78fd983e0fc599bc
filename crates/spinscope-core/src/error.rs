use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("pattern compile error: {0}")]
    Pattern(#[from] regex::Error),
}
