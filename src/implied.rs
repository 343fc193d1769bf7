use symalg::{Expr, SymMatrix};
use tracing::{debug, info};

use crate::error::Result;
use crate::spec::ModelSpec;
use crate::types::CellIndex;

/// Model-implied moments of the observed indicators.
#[derive(Debug, Clone)]
pub struct ImpliedMoments {
    total_effects: SymMatrix,
    mean: SymMatrix,
    covariance: SymMatrix,
}

/// Computes `Λy (I − B)⁻¹ ζ` and its outer product.
///
/// A singular `I − B` (e.g. a self-loop with coefficient 1) is returned as
/// an error; there is no fallback.
pub fn evaluate(spec: &ModelSpec) -> Result<ImpliedMoments> {
    spec.validate()?;
    info!(model = %spec.name, observed = spec.n_observed(), "evaluating implied moments");

    let system = spec.identity().sub(&spec.beta)?;
    let total_effects = system.inverse()?;
    debug!("inverted I - B");

    let mean = spec.lambda_y.matmul(&total_effects)?.matmul(&spec.zeta)?;
    let covariance = mean.matmul(&mean.transpose())?;
    Ok(ImpliedMoments {
        total_effects,
        mean,
        covariance,
    })
}

impl ImpliedMoments {
    /// `(I − B)⁻¹`.
    pub fn total_effects(&self) -> &SymMatrix {
        &self.total_effects
    }

    pub fn mean(&self) -> &SymMatrix {
        &self.mean
    }

    /// Unexpanded `mean · meanᵗ`.
    pub fn covariance(&self) -> &SymMatrix {
        &self.covariance
    }

    pub fn dimension(&self) -> usize {
        self.mean.nrows()
    }

    pub fn cell(&self, (row, col): CellIndex) -> Result<&Expr> {
        Ok(self.covariance.get(row, col)?)
    }

    pub fn expanded_cell(&self, index: CellIndex) -> Result<Expr> {
        Ok(self.cell(index)?.expand()?)
    }

    pub fn expanded_mean(&self) -> Result<SymMatrix> {
        Ok(self.mean.expand()?)
    }

    /// Checks `Cov[i][j] == Cov[j][i]` for every pair after expansion.
    pub fn is_symmetric(&self) -> Result<bool> {
        let n = self.dimension();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.expanded_cell((i, j))? != self.expanded_cell((j, i))? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}
