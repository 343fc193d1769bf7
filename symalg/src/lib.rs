//! Exact symbolic algebra: expressions over named symbols with rational
//! coefficients, canonical polynomial forms, and matrices with exact
//! inversion.

pub mod error;
pub mod expr;
pub mod matrix;
pub mod parser;
pub mod poly;
pub mod render;
pub mod types;

pub use error::{AlgebraError, Result};
pub use expr::Expr;
pub use matrix::SymMatrix;
pub use parser::parse_expr;
pub use poly::{Monomial, Poly, RatFunc};
pub use types::{Symbol, SymbolTable};
