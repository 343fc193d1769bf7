use std::collections::HashSet;
use std::fmt;

use ndarray::Array2;
use tracing::debug;

use crate::error::{AlgebraError, Result};
use crate::expr::Expr;
use crate::poly::{Poly, RatFunc};

/// Immutable rectangular matrix of expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct SymMatrix {
    data: Array2<Expr>,
}

impl SymMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        SymMatrix {
            data: Array2::from_elem((rows, cols), Expr::zero()),
        }
    }

    pub fn identity(n: usize) -> Self {
        SymMatrix {
            data: Array2::from_shape_fn((n, n), |(i, j)| {
                if i == j { Expr::one() } else { Expr::zero() }
            }),
        }
    }

    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self> {
        let n = rows.len();
        let m = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n * m);
        for row in rows {
            if row.len() != m {
                return Err(AlgebraError::DimensionMismatch {
                    op: "from_rows",
                    left: (n, m),
                    right: (1, row.len()),
                });
            }
            data.extend(row);
        }
        Self::from_vec(n, m, data)
    }

    pub fn column(entries: Vec<Expr>) -> Self {
        let n = entries.len();
        SymMatrix {
            data: Array2::from_shape_fn((n, 1), |(i, _)| entries[i].clone()),
        }
    }

    /// Builds a matrix from a sparse `(row, col, value)` list; unspecified
    /// cells are zero. Each coordinate may appear at most once.
    pub fn from_entries(
        rows: usize,
        cols: usize,
        entries: &[(usize, usize, Expr)],
    ) -> Result<Self> {
        let mut data = Array2::from_elem((rows, cols), Expr::zero());
        let mut seen = HashSet::new();
        for (row, col, value) in entries {
            let (row, col) = (*row, *col);
            if row >= rows || col >= cols {
                return Err(AlgebraError::IndexOutOfBounds {
                    row,
                    col,
                    shape: (rows, cols),
                });
            }
            if !seen.insert((row, col)) {
                return Err(AlgebraError::DuplicateEntry { row, col });
            }
            data[[row, col]] = value.clone();
        }
        Ok(SymMatrix { data })
    }

    fn from_vec(rows: usize, cols: usize, data: Vec<Expr>) -> Result<Self> {
        let len = data.len();
        Array2::from_shape_vec((rows, cols), data)
            .map(|data| SymMatrix { data })
            .map_err(|_| AlgebraError::DimensionMismatch {
                op: "from_vec",
                left: (rows, cols),
                right: (len, 1),
            })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    pub fn is_column(&self) -> bool {
        self.ncols() == 1
    }

    pub fn get(&self, row: usize, col: usize) -> Result<&Expr> {
        self.data
            .get((row, col))
            .ok_or(AlgebraError::IndexOutOfBounds {
                row,
                col,
                shape: self.shape(),
            })
    }

    pub fn row_exprs(&self) -> impl Iterator<Item = Vec<&Expr>> + '_ {
        self.data.rows().into_iter().map(|row| row.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expr> {
        self.data.iter()
    }

    /// Count of non-zero cells in each row.
    pub fn row_nonzero_counts(&self) -> Vec<usize> {
        self.data
            .outer_iter()
            .map(|row| row.iter().filter(|e| !e.is_zero()).count())
            .collect()
    }

    /// Count of non-zero cells in each column.
    pub fn col_nonzero_counts(&self) -> Vec<usize> {
        self.data
            .columns()
            .into_iter()
            .map(|col| col.iter().filter(|e| !e.is_zero()).count())
            .collect()
    }

    pub fn add(&self, other: &SymMatrix) -> Result<SymMatrix> {
        self.zip_with(other, "add", |a, b| a.clone() + b.clone())
    }

    pub fn sub(&self, other: &SymMatrix) -> Result<SymMatrix> {
        self.zip_with(other, "sub", |a, b| a.clone() - b.clone())
    }

    fn zip_with(
        &self,
        other: &SymMatrix,
        op: &'static str,
        f: impl Fn(&Expr, &Expr) -> Expr,
    ) -> Result<SymMatrix> {
        if self.shape() != other.shape() {
            return Err(AlgebraError::DimensionMismatch {
                op,
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(SymMatrix {
            data: Array2::from_shape_fn(self.shape(), |(i, j)| {
                f(&self.data[[i, j]], &other.data[[i, j]])
            }),
        })
    }

    pub fn matmul(&self, other: &SymMatrix) -> Result<SymMatrix> {
        let (rows, inner) = self.shape();
        let (inner_other, cols) = other.shape();
        if inner != inner_other {
            return Err(AlgebraError::DimensionMismatch {
                op: "matmul",
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(SymMatrix {
            data: Array2::from_shape_fn((rows, cols), |(i, j)| {
                Expr::add((0..inner).filter_map(|k| {
                    let a = &self.data[[i, k]];
                    let b = &other.data[[k, j]];
                    if a.is_zero() || b.is_zero() {
                        None
                    } else {
                        Some(Expr::mul([a.clone(), b.clone()]))
                    }
                }))
            }),
        })
    }

    pub fn transpose(&self) -> SymMatrix {
        SymMatrix {
            data: self.data.t().to_owned(),
        }
    }

    /// Expands every cell. Only sensible for small matrices.
    pub fn expand(&self) -> Result<SymMatrix> {
        let (rows, cols) = self.shape();
        let cells = self.data.iter().map(Expr::expand).collect::<Result<Vec<_>>>()?;
        Self::from_vec(rows, cols, cells)
    }

    fn require_square(&self) -> Result<usize> {
        if !self.is_square() {
            return Err(AlgebraError::NotSquare(self.shape()));
        }
        Ok(self.nrows())
    }

    /// Multiplies each row through by the product of its distinct
    /// denominators. Returns the polynomial rows and the per-row factors.
    fn polynomial_rows(&self) -> Result<(Vec<Vec<Poly>>, Vec<Poly>)> {
        let mut rows = Vec::with_capacity(self.nrows());
        let mut scales = Vec::with_capacity(self.nrows());
        for row in self.data.outer_iter() {
            let fracs = row
                .iter()
                .map(Expr::to_ratfunc)
                .collect::<Result<Vec<RatFunc>>>()?;
            let mut denominators: Vec<&Poly> = Vec::new();
            for f in &fracs {
                if !f.is_polynomial() && !denominators.contains(&f.den()) {
                    denominators.push(f.den());
                }
            }
            let scale = denominators
                .iter()
                .fold(Poly::one(), |acc, d| acc.mul(d));
            let mut out = Vec::with_capacity(fracs.len());
            for f in &fracs {
                let factor = scale
                    .div_exact(f.den())
                    .ok_or(AlgebraError::InexactDivision)?;
                out.push(f.num().mul(&factor));
            }
            rows.push(out);
            scales.push(scale);
        }
        Ok((rows, scales))
    }

    /// Exact inverse via fraction-free Gauss-Jordan elimination.
    ///
    /// `[M | I]` is reduced to `[d·I | adj]` with `d = ±det(M)`, so
    /// `M⁻¹ = adj / d` without any intermediate fractions.
    pub fn inverse(&self) -> Result<SymMatrix> {
        let n = self.require_square()?;
        debug!(n, "inverting symbolic matrix");
        let (rows, scales) = self.polynomial_rows()?;

        let mut augmented = rows;
        for (i, row) in augmented.iter_mut().enumerate() {
            row.extend((0..n).map(|j| if i == j { Poly::one() } else { Poly::zero() }));
        }
        let elimination =
            eliminate(augmented, n, 2 * n)?.ok_or(AlgebraError::SingularMatrix)?;
        debug!(
            determinant_terms = elimination.pivot.len(),
            "fraction-free elimination finished"
        );

        let mut cells = Vec::with_capacity(n * n);
        for row in &elimination.rows {
            for (j, adj) in row[n..].iter().enumerate() {
                let value = RatFunc::new(adj.mul(&scales[j]), elimination.pivot.clone())?;
                cells.push(value.to_expr());
            }
        }
        Self::from_vec(n, n, cells)
    }

    /// Exact determinant; zero for singular matrices.
    pub fn determinant(&self) -> Result<Expr> {
        let n = self.require_square()?;
        let (rows, scales) = self.polynomial_rows()?;
        let Some(elimination) = eliminate(rows, n, n)? else {
            return Ok(Expr::zero());
        };
        let pivot = if elimination.swaps % 2 == 1 {
            elimination.pivot.neg()
        } else {
            elimination.pivot
        };
        let scale = scales.iter().fold(Poly::one(), |acc, d| acc.mul(d));
        Ok(RatFunc::new(pivot, scale)?.to_expr())
    }

    pub fn latex(&self) -> String {
        crate::render::latex_matrix(self)
    }
}

struct Elimination {
    rows: Vec<Vec<Poly>>,
    pivot: Poly,
    swaps: usize,
}

/// Bareiss elimination over the first `n` columns of `rows`, clearing both
/// below and above each pivot. Returns `None` when the leading `n×n` block is
/// singular. Every division by the previous pivot is exact.
fn eliminate(mut rows: Vec<Vec<Poly>>, n: usize, width: usize) -> Result<Option<Elimination>> {
    let mut previous = Poly::one();
    let mut swaps = 0;
    for k in 0..n {
        let Some(pivot_row) = select_pivot(&rows, k, n) else {
            return Ok(None);
        };
        if pivot_row != k {
            rows.swap(k, pivot_row);
            swaps += 1;
        }
        let pivot = rows[k][k].clone();
        for i in 0..n {
            if i == k {
                continue;
            }
            let factor = rows[i][k].clone();
            if factor.is_zero() && pivot == previous {
                continue;
            }
            for j in 0..width {
                let value = pivot.mul(&rows[i][j]).sub(&factor.mul(&rows[k][j]));
                rows[i][j] = value
                    .div_exact(&previous)
                    .ok_or(AlgebraError::InexactDivision)?;
            }
        }
        previous = pivot;
    }
    Ok(Some(Elimination {
        rows,
        pivot: previous,
        swaps,
    }))
}

/// Prefers constant pivots, then the pivot with the fewest terms.
fn select_pivot(rows: &[Vec<Poly>], k: usize, n: usize) -> Option<usize> {
    (k..n)
        .filter(|&r| !rows[r][k].is_zero())
        .min_by_key(|&r| {
            let entry = &rows[r][k];
            (entry.as_constant().is_none(), entry.len())
        })
}

impl fmt::Display for SymMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::plain_matrix(self))
    }
}
