use symalg::AlgebraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FesemError {
    #[error(transparent)]
    Algebra(#[from] AlgebraError),

    #[error("invalid model specification: {0}")]
    InvalidSpec(String),

    #[error("model file line {line}: {message}")]
    ModelFile { line: usize, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FesemError>;
