use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpertError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Provider(String),

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("invalid input: {0}")]
    Validation(String),
}
