use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),

    #[error("symbol {binding} already declared as {existing}, cannot redeclare as {requested}")]
    DuplicateSymbol {
        binding: String,
        existing: String,
        requested: String,
    },

    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("matrix must be square, got {0:?}")]
    NotSquare((usize, usize)),

    #[error("matrix is singular (zero determinant), cannot invert")]
    SingularMatrix,

    #[error("index ({row}, {col}) out of bounds for {shape:?} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        shape: (usize, usize),
    },

    #[error("entry ({row}, {col}) specified more than once")]
    DuplicateEntry { row: usize, col: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("polynomial division left a remainder during fraction-free elimination")]
    InexactDivision,

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, AlgebraError>;
