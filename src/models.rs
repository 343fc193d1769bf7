//! The two model variants checked in the article.
//!
//! Matrices are assembled from sparse entry lists and validated, rather than
//! transcribed as dense grids.

use symalg::{Expr, SymbolTable};
use tracing::debug;

use crate::error::Result;
use crate::spec::{MatrixBuilder, ModelSpec, column_vector};
use crate::types::Variant;

/// Bindings shared by both variants, mapped to their rendered names.
const COMMON_SYMBOLS: &[(&str, &str)] = &[
    ("x1", "x1"),
    ("x2", "x2"),
    ("x3", "x3"),
    ("y1", "y1"),
    ("y2", "y2"),
    ("y3", "y3"),
    ("d1", "delta1"),
    ("d2", "delta2"),
    ("d3", "delta3"),
    ("e1", "varepsilon1"),
    ("e2", "varepsilon2"),
    ("e3", "varepsilon3"),
    ("xi1", "xi1"),
    ("xi2", "xi2"),
    ("xi3", "xi3"),
    ("n1", "eta1"),
    ("n2", "eta2"),
    ("n3", "eta3"),
    ("a", "alpha"),
    ("z1", "zeta1"),
    ("z2", "zeta2"),
    ("z3", "zeta3"),
    ("b", "beta"),
];

const LATENT_SYMBOLS: &[(&str, &str)] = &[
    ("x11", "x11"),
    ("x21", "x21"),
    ("x31", "x31"),
    ("x12", "x12"),
    ("x22", "x22"),
    ("x32", "x32"),
    ("x13", "x13"),
    ("x23", "x23"),
    ("x33", "x33"),
    ("d11", "delta11"),
    ("d21", "delta21"),
    ("d31", "delta31"),
    ("d12", "delta12"),
    ("d22", "delta22"),
    ("d32", "delta32"),
    ("d13", "delta13"),
    ("d23", "delta23"),
    ("d33", "delta33"),
    ("l21", "lambda21"),
    ("l31", "lambda31"),
    ("l22", "lambda22"),
    ("l32", "lambda32"),
    ("l23", "lambda23"),
    ("l33", "lambda33"),
];

/// FE-SEM with observed covariates: `y_t = β x_t + α + ε_t`.
pub struct BasicModelSpec;

impl BasicModelSpec {
    pub const NAME: &'static str = "FE-SEM";
    pub const OBSERVED: &'static [&'static str] = &["y1", "y2", "y3", "x1", "x2", "x3"];
    pub const ETA: &'static [&'static str] = &["y1", "y2", "y3", "x1", "x2", "x3", "a"];
    pub const ZETA: &'static [&'static str] = &["e1", "e2", "e3", "x1", "x2", "x3", "a"];

    pub fn symbols() -> Result<SymbolTable> {
        let mut symbols = SymbolTable::new();
        symbols.declare_all(COMMON_SYMBOLS)?;
        Ok(symbols)
    }

    pub fn build() -> Result<ModelSpec> {
        let symbols = Self::symbols()?;

        let mut lambda_y = MatrixBuilder::new("Lambda_y", Self::OBSERVED, Self::ETA);
        for var in Self::OBSERVED {
            lambda_y.set(var, var, Expr::one())?;
        }

        let b = symbols.expr("b")?;
        let mut beta = MatrixBuilder::new("B", Self::ETA, Self::ETA);
        for t in 1..=3 {
            let y = format!("y{t}");
            beta.set(&y, &format!("x{t}"), b.clone())?
                .set(&y, "a", Expr::one())?;
        }

        let spec = ModelSpec {
            name: Self::NAME.to_string(),
            y: column_vector(&symbols, Self::OBSERVED)?,
            lambda_y: lambda_y.build()?,
            eta: column_vector(&symbols, Self::ETA)?,
            beta: beta.build()?,
            zeta: column_vector(&symbols, Self::ZETA)?,
            symbols,
        };
        spec.validate()?;
        debug!(
            observed = spec.n_observed(),
            variables = spec.n_variables(),
            "built basic model"
        );
        Ok(spec)
    }
}

/// FE-SEM where each covariate `ξ_t` is latent and measured by three
/// indicators `x_{1t}, x_{2t}, x_{3t}` (first loading fixed to 1).
pub struct ExtendedModelSpec;

impl ExtendedModelSpec {
    pub const NAME: &'static str = "FE-SEM with latent variables";
    pub const OBSERVED: &'static [&'static str] = &[
        "y1", "y2", "y3", "x11", "x21", "x31", "x12", "x22", "x32", "x13", "x23", "x33",
    ];
    pub const ETA: &'static [&'static str] = &[
        "y1", "y2", "y3", "x11", "x21", "x31", "x12", "x22", "x32", "x13", "x23", "x33", "a",
        "xi1", "xi2", "xi3",
    ];
    pub const ZETA: &'static [&'static str] = &[
        "e1", "e2", "e3", "d11", "d21", "d31", "d12", "d22", "d32", "d13", "d23", "d33", "a",
        "xi1", "xi2", "xi3",
    ];

    pub fn symbols() -> Result<SymbolTable> {
        let mut symbols = SymbolTable::new();
        symbols.declare_all(COMMON_SYMBOLS)?;
        symbols.declare_all(LATENT_SYMBOLS)?;
        Ok(symbols)
    }

    pub fn build() -> Result<ModelSpec> {
        let symbols = Self::symbols()?;

        let mut lambda_y = MatrixBuilder::new("Lambda_y", Self::OBSERVED, Self::ETA);
        for var in Self::OBSERVED {
            lambda_y.set(var, var, Expr::one())?;
        }

        let b = symbols.expr("b")?;
        let mut beta = MatrixBuilder::new("B", Self::ETA, Self::ETA);
        for t in 1..=3 {
            let y = format!("y{t}");
            let xi = format!("xi{t}");
            beta.set(&y, "a", Expr::one())?.set(&y, &xi, b.clone())?;
            for i in 1..=3 {
                let loading = if i == 1 {
                    Expr::one()
                } else {
                    symbols.expr(&format!("l{i}{t}"))?
                };
                beta.set(&format!("x{i}{t}"), &xi, loading)?;
            }
        }

        let spec = ModelSpec {
            name: Self::NAME.to_string(),
            y: column_vector(&symbols, Self::OBSERVED)?,
            lambda_y: lambda_y.build()?,
            eta: column_vector(&symbols, Self::ETA)?,
            beta: beta.build()?,
            zeta: column_vector(&symbols, Self::ZETA)?,
            symbols,
        };
        spec.validate()?;
        debug!(
            observed = spec.n_observed(),
            variables = spec.n_variables(),
            "built extended model"
        );
        Ok(spec)
    }
}

pub fn build_variant(variant: Variant) -> Result<ModelSpec> {
    match variant {
        Variant::Basic => BasicModelSpec::build(),
        Variant::Extended => ExtendedModelSpec::build(),
    }
}
