use symalg::{AlgebraError, Expr, SymMatrix};
use tracing::warn;

use crate::error::Result;
use crate::implied::ImpliedMoments;
use crate::spec::ModelSpec;
use crate::types::{CellIndex, OutputFormat, Variant};

/// Above this many indicators the full `yy'` matrix is unreadable.
const READABLE_DIMENSION: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    pub format: OutputFormat,
    /// Expand the printed mean vector (and full covariance, if shown).
    pub expand: bool,
    pub full_covariance: bool,
    /// Covariance cells to print, always expanded.
    pub cells: Vec<CellIndex>,
}

impl ReportConfig {
    /// The basic model prints the whole `yy'`; the extended one prints
    /// `Var(y1)` and `Cov(y1, y3)` only.
    pub fn for_variant(variant: Variant, format: OutputFormat) -> Self {
        match variant {
            Variant::Basic => ReportConfig {
                format,
                full_covariance: true,
                ..Default::default()
            },
            Variant::Extended => ReportConfig {
                format,
                cells: vec![(0, 0), (0, 2)],
                ..Default::default()
            },
        }
    }
}

pub fn render_expr(expr: &Expr, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => expr.to_string(),
        OutputFormat::Latex => format!("${}$", expr.latex()),
    }
}

pub fn render_matrix(matrix: &SymMatrix, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => matrix.to_string(),
        OutputFormat::Latex => format!("${}$", matrix.latex()),
    }
}

/// `Var(y1)` for diagonal cells, `Cov(y1, y3)` otherwise.
pub fn cell_label(spec: &ModelSpec, (row, col): CellIndex) -> Result<String> {
    let labels = spec.observed_labels();
    let name = |i: usize| {
        labels.get(i).cloned().ok_or(AlgebraError::IndexOutOfBounds {
            row,
            col,
            shape: (labels.len(), labels.len()),
        })
    };
    Ok(if row == col {
        format!("Var({})", name(row)?)
    } else {
        format!("Cov({}, {})", name(row)?, name(col)?)
    })
}

pub fn render_report(
    spec: &ModelSpec,
    moments: &ImpliedMoments,
    config: &ReportConfig,
) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("# {}: equations for y\n", spec.name));
    let mean = if config.expand {
        moments.expanded_mean()?
    } else {
        moments.mean().clone()
    };
    out.push_str(&render_matrix(&mean, config.format));
    out.push('\n');

    if config.full_covariance {
        if moments.dimension() > READABLE_DIMENSION {
            warn!(
                dimension = moments.dimension(),
                "printing the full implied covariance matrix; consider selecting cells"
            );
        }
        let covariance = if config.expand {
            moments.covariance().expand()?
        } else {
            moments.covariance().clone()
        };
        out.push_str(&format!("\n# {}: equations for yy'\n", spec.name));
        out.push_str(&render_matrix(&covariance, config.format));
        out.push('\n');
    }

    for &cell in &config.cells {
        let label = cell_label(spec, cell)?;
        let value = moments.expanded_cell(cell)?;
        out.push_str(&format!("\n# {label}\n"));
        out.push_str(&render_expr(&value, config.format));
        out.push('\n');
    }

    Ok(out)
}
