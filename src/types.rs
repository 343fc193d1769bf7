/// Zero-based `(row, col)` coordinate into the implied covariance matrix.
pub type CellIndex = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Latex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Basic,
    Extended,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Basic => "FE-SEM",
            Variant::Extended => "FE-SEM with latent variables",
        }
    }
}
