//! Plain-text and LaTeX printers for expressions and matrices.

use num_rational::BigRational;
use num_traits::{One, Signed};

use crate::expr::Expr;
use crate::matrix::SymMatrix;

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau",
    "upsilon", "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda",
    "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
];

/// `varepsilon1` -> `\varepsilon_{1}`, `x11` -> `x_{11}`, `alpha` -> `\alpha`.
pub fn latex_symbol_name(name: &str) -> String {
    let split = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (head, digits) = name.split_at(split);
    if head.is_empty() {
        return name.to_string();
    }
    let head = if GREEK.contains(&head) {
        format!("\\{head}")
    } else {
        head.to_string()
    };
    if digits.is_empty() {
        head
    } else {
        format!("{head}_{{{digits}}}")
    }
}

struct Fraction {
    negative: bool,
    numer: Vec<Expr>,
    denom: Vec<Expr>,
}

fn split_fraction(expr: &Expr) -> Fraction {
    let (coefficient, rest) = expr.split_coefficient();
    let negative = coefficient.is_negative();
    let coefficient = coefficient.abs();
    let factors = match rest {
        Expr::Mul(factors) => factors,
        Expr::Number(_) => Vec::new(),
        other => vec![other],
    };

    let mut numer = Vec::new();
    let mut denom = Vec::new();
    if !coefficient.numer().is_one() {
        numer.push(Expr::Number(BigRational::from_integer(
            coefficient.numer().clone(),
        )));
    }
    if !coefficient.denom().is_one() {
        denom.push(Expr::Number(BigRational::from_integer(
            coefficient.denom().clone(),
        )));
    }
    for factor in factors {
        match factor {
            Expr::Pow(base, exp) if exp < 0 => {
                denom.push(Expr::pow(*base, exp.saturating_neg()))
            }
            other => numer.push(other),
        }
    }
    Fraction {
        negative,
        numer,
        denom,
    }
}

fn join_terms(terms: &[Expr], render: fn(&Expr) -> String) -> String {
    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        if term.is_negative_term() {
            out.push_str(if i == 0 { "-" } else { " - " });
            out.push_str(&render(&-term.clone()));
        } else {
            if i > 0 {
                out.push_str(" + ");
            }
            out.push_str(&render(term));
        }
    }
    out
}

fn plain_number(n: &BigRational) -> String {
    if n.is_integer() {
        n.numer().to_string()
    } else {
        format!("{}/{}", n.numer(), n.denom())
    }
}

pub fn plain_expr(expr: &Expr) -> String {
    match expr {
        Expr::Number(n) => plain_number(n),
        Expr::Symbol(s) => s.name().to_string(),
        Expr::Add(terms) => join_terms(terms, plain_expr),
        Expr::Mul(_) => plain_fraction(expr),
        Expr::Pow(_, exp) if *exp < 0 => plain_fraction(expr),
        Expr::Pow(base, exp) => format!("{}**{exp}", plain_base(base)),
    }
}

fn plain_base(base: &Expr) -> String {
    match base {
        Expr::Add(_) | Expr::Mul(_) | Expr::Pow(..) => format!("({})", plain_expr(base)),
        Expr::Number(n) if n.is_negative() || !n.is_integer() => {
            format!("({})", plain_number(n))
        }
        _ => plain_expr(base),
    }
}

fn plain_factor(factor: &Expr) -> String {
    match factor {
        Expr::Add(_) => format!("({})", plain_expr(factor)),
        _ => plain_expr(factor),
    }
}

fn plain_fraction(expr: &Expr) -> String {
    let fraction = split_fraction(expr);
    let sign = if fraction.negative { "-" } else { "" };
    let numer = if fraction.numer.is_empty() {
        "1".to_string()
    } else {
        fraction
            .numer
            .iter()
            .map(plain_factor)
            .collect::<Vec<_>>()
            .join("*")
    };
    match fraction.denom.as_slice() {
        [] => format!("{sign}{numer}"),
        [single] => format!("{sign}{numer}/{}", plain_base_or_power(single)),
        many => {
            let denom = many.iter().map(plain_factor).collect::<Vec<_>>().join("*");
            format!("{sign}{numer}/({denom})")
        }
    }
}

fn plain_base_or_power(expr: &Expr) -> String {
    match expr {
        Expr::Add(_) | Expr::Mul(_) => format!("({})", plain_expr(expr)),
        _ => plain_expr(expr),
    }
}

fn latex_number(n: &BigRational) -> String {
    let sign = if n.is_negative() { "-" } else { "" };
    let n = n.abs();
    if n.is_integer() {
        format!("{sign}{}", n.numer())
    } else {
        format!("{sign}\\frac{{{}}}{{{}}}", n.numer(), n.denom())
    }
}

pub fn latex_expr(expr: &Expr) -> String {
    match expr {
        Expr::Number(n) => latex_number(n),
        Expr::Symbol(s) => latex_symbol_name(s.name()),
        Expr::Add(terms) => join_terms(terms, latex_expr),
        Expr::Mul(_) => latex_fraction(expr),
        Expr::Pow(_, exp) if *exp < 0 => latex_fraction(expr),
        Expr::Pow(base, exp) => format!("{}^{{{exp}}}", latex_base(base)),
    }
}

fn latex_base(base: &Expr) -> String {
    match base {
        Expr::Add(_) | Expr::Mul(_) | Expr::Pow(..) => {
            format!("\\left({}\\right)", latex_expr(base))
        }
        Expr::Number(n) if n.is_negative() || !n.is_integer() => {
            format!("\\left({}\\right)", latex_number(n))
        }
        _ => latex_expr(base),
    }
}

fn latex_factors(factors: &[Expr]) -> String {
    match factors {
        [] => "1".to_string(),
        [single] => latex_expr(single),
        many => many
            .iter()
            .map(|f| match f {
                Expr::Add(_) => format!("\\left({}\\right)", latex_expr(f)),
                _ => latex_expr(f),
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn latex_fraction(expr: &Expr) -> String {
    let fraction = split_fraction(expr);
    let sign = if fraction.negative { "-" } else { "" };
    let numer = latex_factors(&fraction.numer);
    if fraction.denom.is_empty() {
        return format!("{sign}{numer}");
    }
    let denom = latex_factors(&fraction.denom);
    format!("{sign}\\frac{{{numer}}}{{{denom}}}")
}

pub fn plain_matrix(matrix: &SymMatrix) -> String {
    let rows = matrix
        .row_exprs()
        .map(|row| {
            let cells = row
                .iter()
                .map(|e| plain_expr(e))
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{cells}]")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("Matrix([{rows}])")
}

pub fn latex_matrix(matrix: &SymMatrix) -> String {
    let rows = matrix
        .row_exprs()
        .map(|row| {
            row.iter()
                .map(|e| latex_expr(e))
                .collect::<Vec<_>>()
                .join(" & ")
        })
        .collect::<Vec<_>>()
        .join("\\\\");
    format!("\\left[\\begin{{matrix}}{rows}\\end{{matrix}}\\right]")
}
