use symalg::{Expr, SymMatrix, SymbolTable};

use crate::error::{FesemError, Result};

/// Declarative description of one structural model.
///
/// Each specification owns its symbol table, so two variants never share
/// bindings even when they reuse the same short names.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: String,
    pub symbols: SymbolTable,
    /// Observed indicators.
    pub y: SymMatrix,
    pub lambda_y: SymMatrix,
    /// All variables of the structural system.
    pub eta: SymMatrix,
    pub beta: SymMatrix,
    /// Disturbances and exogenous terms, aligned with `eta`.
    pub zeta: SymMatrix,
}

impl ModelSpec {
    pub fn validate(&self) -> Result<()> {
        ensure_column(&self.y, "y")?;
        ensure_column(&self.eta, "eta")?;
        ensure_column(&self.zeta, "zeta")?;

        let n = self.eta.nrows();
        if n == 0 {
            return Err(FesemError::InvalidSpec("eta must not be empty".to_string()));
        }
        if self.zeta.nrows() != n {
            return Err(FesemError::InvalidSpec(format!(
                "zeta has {} entries but eta has {n}",
                self.zeta.nrows()
            )));
        }
        if self.beta.shape() != (n, n) {
            return Err(FesemError::InvalidSpec(format!(
                "B must be {n}x{n} to match eta, got {:?}",
                self.beta.shape()
            )));
        }
        let expected = (self.y.nrows(), n);
        if self.lambda_y.shape() != expected {
            return Err(FesemError::InvalidSpec(format!(
                "Lambda_y must be {}x{} (y by eta), got {:?}",
                expected.0,
                expected.1,
                self.lambda_y.shape()
            )));
        }
        Ok(())
    }

    /// `I` sized to `eta`.
    pub fn identity(&self) -> SymMatrix {
        SymMatrix::identity(self.eta.nrows())
    }

    pub fn n_observed(&self) -> usize {
        self.y.nrows()
    }

    pub fn n_variables(&self) -> usize {
        self.eta.nrows()
    }

    pub fn observed_labels(&self) -> Vec<String> {
        self.y.iter().map(|e| e.to_string()).collect()
    }

    /// Non-zero loadings per observed indicator.
    pub fn loading_counts(&self) -> Vec<usize> {
        self.lambda_y.row_nonzero_counts()
    }

    /// Incoming structural paths per variable.
    pub fn path_counts(&self) -> Vec<usize> {
        self.beta.row_nonzero_counts()
    }
}

fn ensure_column(matrix: &SymMatrix, name: &str) -> Result<()> {
    if !matrix.is_column() {
        return Err(FesemError::InvalidSpec(format!(
            "{name} must be a column vector, got {:?}",
            matrix.shape()
        )));
    }
    Ok(())
}

pub fn column_vector(symbols: &SymbolTable, bindings: &[&str]) -> Result<SymMatrix> {
    let entries = bindings
        .iter()
        .map(|b| symbols.expr(b))
        .collect::<symalg::Result<Vec<_>>>()?;
    Ok(SymMatrix::column(entries))
}

/// Sparse matrix construction addressed by variable name.
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    name: String,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    entries: Vec<(usize, usize, Expr)>,
}

impl MatrixBuilder {
    pub fn new<R: AsRef<str>, C: AsRef<str>>(name: &str, rows: &[R], cols: &[C]) -> Self {
        MatrixBuilder {
            name: name.to_string(),
            row_labels: rows.iter().map(|r| r.as_ref().to_string()).collect(),
            col_labels: cols.iter().map(|c| c.as_ref().to_string()).collect(),
            entries: Vec::new(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    fn position(&self, labels: &[String], label: &str, axis: &str) -> Result<usize> {
        labels.iter().position(|l| l == label).ok_or_else(|| {
            FesemError::InvalidSpec(format!("{}: unknown {axis} variable {label}", self.name))
        })
    }

    pub fn set(&mut self, row: &str, col: &str, value: Expr) -> Result<&mut Self> {
        let r = self.position(&self.row_labels, row, "row")?;
        let c = self.position(&self.col_labels, col, "column")?;
        if self.entries.iter().any(|(er, ec, _)| (*er, *ec) == (r, c)) {
            return Err(FesemError::InvalidSpec(format!(
                "{}: entry ({row}, {col}) set more than once",
                self.name
            )));
        }
        self.entries.push((r, c, value));
        Ok(self)
    }

    pub fn build(&self) -> Result<SymMatrix> {
        let (rows, cols) = self.shape();
        SymMatrix::from_entries(rows, cols, &self.entries)
            .map_err(|e| FesemError::InvalidSpec(format!("{}: {e}", self.name)))
    }
}
