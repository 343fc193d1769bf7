//! Symbolic double-check of the FE-SEM matrix formulas.
//!
//! Builds the model matrices for each variant, computes the implied mean
//! `Λy (I − B)⁻¹ ζ` and the implied covariance `yy'` exactly, and renders them
//! for comparison with the formulas in the article.

pub mod error;
pub mod logging;
pub mod types;

pub mod implied;
pub mod model_file;
pub mod models;
pub mod report;
pub mod spec;

pub use error::{FesemError, Result};
pub use implied::{ImpliedMoments, evaluate};
pub use models::{BasicModelSpec, ExtendedModelSpec};
pub use spec::ModelSpec;
