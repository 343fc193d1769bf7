//! Canonical polynomial and rational-function arithmetic.
//!
//! `Expr` trees are converted into this representation whenever a value has
//! to be compared, expanded or inverted. Coefficients are exact rationals.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::error::{AlgebraError, Result};
use crate::expr::Expr;
use crate::types::Symbol;

pub fn rational(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Product of symbols with positive exponents, sorted by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Monomial(Vec<(Symbol, u32)>);

impl Monomial {
    pub fn one() -> Self {
        Monomial(Vec::new())
    }

    pub fn var(symbol: Symbol) -> Self {
        Monomial(vec![(symbol, 1)])
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree(&self) -> u32 {
        self.0.iter().map(|(_, e)| *e).sum()
    }

    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut out = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (sa, ea) = &self.0[i];
            let (sb, eb) = &other.0[j];
            match sa.cmp(sb) {
                Ordering::Less => {
                    out.push((sa.clone(), *ea));
                    i += 1;
                }
                Ordering::Greater => {
                    out.push((sb.clone(), *eb));
                    j += 1;
                }
                Ordering::Equal => {
                    out.push((sa.clone(), ea + eb));
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&self.0[i..]);
        out.extend_from_slice(&other.0[j..]);
        Monomial(out)
    }

    /// `self / other`, or `None` when `other` does not divide `self`.
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        let mut out = Vec::with_capacity(self.0.len());
        let mut j = 0;
        for (symbol, exp) in &self.0 {
            match other.0.get(j) {
                Some((s, e)) if s == symbol => {
                    if e > exp {
                        return None;
                    }
                    if exp > e {
                        out.push((symbol.clone(), exp - e));
                    }
                    j += 1;
                }
                Some((s, _)) if s < symbol => return None,
                _ => out.push((symbol.clone(), *exp)),
            }
        }
        if j < other.0.len() {
            return None;
        }
        Some(Monomial(out))
    }

    pub fn to_expr(&self) -> Expr {
        Expr::mul(
            self.0
                .iter()
                .map(|(s, e)| Expr::pow(Expr::Symbol(s.clone()), *e as i32)),
        )
    }
}

// Graded lexicographic order. Division in `Poly::div_exact` relies on this
// being a monomial order.
impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree()
            .cmp(&other.degree())
            .then_with(|| lex_cmp(&self.0, &other.0))
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn lex_cmp(a: &[(Symbol, u32)], b: &[(Symbol, u32)]) -> Ordering {
    let (mut i, mut j) = (0, 0);
    loop {
        match (a.get(i), b.get(j)) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some((sa, ea)), Some((sb, eb))) => match sa.cmp(sb) {
                Ordering::Less => return Ordering::Greater,
                Ordering::Greater => return Ordering::Less,
                Ordering::Equal => match ea.cmp(eb) {
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                    other => return other,
                },
            },
        }
    }
}

/// Multivariate polynomial with rational coefficients. Zero coefficients are
/// never stored, so structural equality is mathematical equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Poly {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        let mut p = Self::zero();
        p.add_term(Monomial::one(), value);
        p
    }

    pub fn symbol(symbol: Symbol) -> Self {
        let mut p = Self::zero();
        p.add_term(Monomial::var(symbol), BigRational::one());
        p
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.as_constant().is_some_and(|c| c.is_one())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value of a constant polynomial (zero included).
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&Monomial::one()).cloned(),
            _ => None,
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn leading_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().next_back()
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.get_mut(&monomial) {
            Some(existing) => {
                *existing += coefficient;
                if existing.is_zero() {
                    self.terms.remove(&monomial);
                }
            }
            None => {
                self.terms.insert(monomial, coefficient);
            }
        }
    }

    pub fn add(&self, other: &Poly) -> Poly {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), c.clone());
        }
        out
    }

    pub fn sub(&self, other: &Poly) -> Poly {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), -c.clone());
        }
        out
    }

    pub fn neg(&self) -> Poly {
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), -c.clone()))
                .collect(),
        }
    }

    pub fn scale(&self, factor: &BigRational) -> Poly {
        if factor.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    fn mul_term(&self, monomial: &Monomial, coefficient: &BigRational) -> Poly {
        let mut out = Poly::zero();
        for (m, c) in &self.terms {
            out.add_term(m.mul(monomial), c * coefficient);
        }
        out
    }

    pub fn mul(&self, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Poly::zero();
        }
        if self.is_one() {
            return other.clone();
        }
        if other.is_one() {
            return self.clone();
        }
        let mut out = Poly::zero();
        for (m, c) in &other.terms {
            for (m2, c2) in &self.terms {
                out.add_term(m2.mul(m), c2 * c);
            }
        }
        out
    }

    pub fn pow(&self, exp: u32) -> Poly {
        let mut result = Poly::one();
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Exact quotient `self / divisor`, or `None` if the division leaves a
    /// remainder (or the divisor is zero).
    pub fn div_exact(&self, divisor: &Poly) -> Option<Poly> {
        if divisor.is_zero() {
            return None;
        }
        if let Some(c) = divisor.as_constant() {
            return Some(self.scale(&c.recip()));
        }
        let (lead_m, lead_c) = divisor.leading_term()?;
        let mut remainder = self.clone();
        let mut quotient = Poly::zero();
        while let Some((m, c)) = remainder.leading_term() {
            let qm = m.div(lead_m)?;
            let qc = c / lead_c;
            remainder = remainder.sub(&divisor.mul_term(&qm, &qc));
            quotient.add_term(qm, qc);
        }
        Some(quotient)
    }

    pub fn to_expr(&self) -> Expr {
        Expr::add(self.terms.iter().map(|(m, c)| {
            if m.is_one() {
                Expr::Number(c.clone())
            } else {
                Expr::mul([Expr::Number(c.clone()), m.to_expr()])
            }
        }))
    }
}

/// Quotient of two polynomials with a non-zero denominator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatFunc {
    num: Poly,
    den: Poly,
}

impl RatFunc {
    pub fn new(num: Poly, den: Poly) -> Result<Self> {
        if den.is_zero() {
            return Err(AlgebraError::DivisionByZero);
        }
        Ok(RatFunc { num, den }.normalize())
    }

    pub fn from_poly(num: Poly) -> Self {
        RatFunc {
            num,
            den: Poly::one(),
        }
    }

    pub fn constant(value: BigRational) -> Self {
        Self::from_poly(Poly::constant(value))
    }

    pub fn num(&self) -> &Poly {
        &self.num
    }

    pub fn den(&self) -> &Poly {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_polynomial(&self) -> bool {
        self.den.is_one()
    }

    fn normalize(self) -> Self {
        if self.num.is_zero() {
            return RatFunc::from_poly(Poly::zero());
        }
        if let Some(c) = self.den.as_constant() {
            return RatFunc::from_poly(self.num.scale(&c.recip()));
        }
        if let Some(q) = self.num.div_exact(&self.den) {
            return RatFunc::from_poly(q);
        }
        self
    }

    pub fn add(&self, other: &RatFunc) -> RatFunc {
        if self.den == other.den {
            return RatFunc {
                num: self.num.add(&other.num),
                den: self.den.clone(),
            }
            .normalize();
        }
        RatFunc {
            num: self.num.mul(&other.den).add(&other.num.mul(&self.den)),
            den: self.den.mul(&other.den),
        }
        .normalize()
    }

    pub fn neg(&self) -> RatFunc {
        RatFunc {
            num: self.num.neg(),
            den: self.den.clone(),
        }
    }

    pub fn sub(&self, other: &RatFunc) -> RatFunc {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &RatFunc) -> RatFunc {
        RatFunc {
            num: self.num.mul(&other.num),
            den: self.den.mul(&other.den),
        }
        .normalize()
    }

    pub fn inv(&self) -> Result<RatFunc> {
        RatFunc::new(self.den.clone(), self.num.clone())
    }

    pub fn pow(&self, exp: u32) -> RatFunc {
        RatFunc {
            num: self.num.pow(exp),
            den: self.den.pow(exp),
        }
        .normalize()
    }

    pub fn to_expr(&self) -> Expr {
        if self.den.is_one() {
            return self.num.to_expr();
        }
        Expr::mul([self.num.to_expr(), Expr::pow(self.den.to_expr(), -1)])
    }
}
