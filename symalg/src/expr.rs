use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::{AlgebraError, Result};
use crate::poly::{Poly, RatFunc, rational};
use crate::types::Symbol;

/// Symbolic expression tree.
///
/// Values built through [`Expr::add`], [`Expr::mul`] and [`Expr::pow`] (and
/// the operator impls) are kept in a light canonical form: nested sums and
/// products are flattened, numbers folded, identical terms and factors
/// collected and arguments sorted. Products of sums are never distributed;
/// that is what [`Expr::expand`] is for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr {
    Number(BigRational),
    Symbol(Symbol),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, i32),
}

impl Expr {
    pub fn zero() -> Self {
        Expr::Number(BigRational::zero())
    }

    pub fn one() -> Self {
        Expr::Number(BigRational::one())
    }

    pub fn int(value: i64) -> Self {
        Expr::Number(rational(value))
    }

    pub fn rational(numer: i64, denom: i64) -> Result<Self> {
        if denom == 0 {
            return Err(AlgebraError::DivisionByZero);
        }
        Ok(Expr::Number(BigRational::new(
            BigInt::from(numer),
            BigInt::from(denom),
        )))
    }

    pub fn symbol(symbol: &Symbol) -> Self {
        Expr::Symbol(symbol.clone())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_one())
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn add<I: IntoIterator<Item = Expr>>(terms: I) -> Expr {
        let mut flat = Vec::new();
        for term in terms {
            flatten_into(term, &mut flat, true);
        }

        let mut constant = BigRational::zero();
        let mut collected: BTreeMap<Expr, BigRational> = BTreeMap::new();
        for term in flat {
            match term {
                Expr::Number(n) => constant += n,
                other => {
                    let (coefficient, rest) = other.split_coefficient();
                    *collected.entry(rest).or_insert_with(BigRational::zero) += coefficient;
                }
            }
        }

        let mut out = Vec::with_capacity(collected.len() + 1);
        if !constant.is_zero() {
            out.push(Expr::Number(constant));
        }
        for (rest, coefficient) in collected {
            if coefficient.is_zero() {
                continue;
            }
            out.push(Expr::scaled(coefficient, rest));
        }
        match out.len() {
            0 => Expr::zero(),
            1 => out.pop().unwrap_or_else(Expr::zero),
            _ => Expr::Add(out),
        }
    }

    pub fn mul<I: IntoIterator<Item = Expr>>(factors: I) -> Expr {
        let mut flat = Vec::new();
        for factor in factors {
            flatten_into(factor, &mut flat, false);
        }

        let mut coefficient = BigRational::one();
        let mut powers: BTreeMap<Expr, i32> = BTreeMap::new();
        for factor in flat {
            match factor {
                Expr::Number(n) => {
                    if n.is_zero() {
                        return Expr::zero();
                    }
                    coefficient *= n;
                }
                Expr::Pow(base, exp) => {
                    let slot = powers.entry(*base).or_insert(0);
                    *slot = slot.saturating_add(exp);
                }
                other => {
                    let slot = powers.entry(other).or_insert(0);
                    *slot = slot.saturating_add(1);
                }
            }
        }

        let mut out = Vec::with_capacity(powers.len() + 1);
        for (base, exp) in powers {
            match exp {
                0 => {}
                1 => out.push(base),
                _ => out.push(Expr::Pow(Box::new(base), exp)),
            }
        }
        if out.is_empty() {
            return Expr::Number(coefficient);
        }
        if !coefficient.is_one() {
            out.insert(0, Expr::Number(coefficient));
        }
        if out.len() == 1 {
            return out.pop().unwrap_or_else(Expr::one);
        }
        Expr::Mul(out)
    }

    pub fn pow(base: Expr, exp: i32) -> Expr {
        match exp {
            0 => return Expr::one(),
            1 => return base,
            _ => {}
        }
        match base {
            Expr::Number(n) if n.is_zero() => {
                if exp > 0 {
                    Expr::zero()
                } else {
                    Expr::Pow(Box::new(Expr::Number(n)), exp)
                }
            }
            Expr::Number(n) => Expr::Number(rational_pow(&n, exp)),
            Expr::Pow(inner, e) => Expr::pow(*inner, e.saturating_mul(exp)),
            Expr::Mul(factors) => Expr::mul(factors.into_iter().map(|f| Expr::pow(f, exp))),
            other => Expr::Pow(Box::new(other), exp),
        }
    }

    fn scaled(coefficient: BigRational, rest: Expr) -> Expr {
        if coefficient.is_one() {
            rest
        } else {
            Expr::mul([Expr::Number(coefficient), rest])
        }
    }

    /// Splits off the numeric coefficient of a product term.
    pub fn split_coefficient(&self) -> (BigRational, Expr) {
        match self {
            Expr::Number(n) => (n.clone(), Expr::one()),
            Expr::Mul(factors) => match factors.split_first() {
                Some((Expr::Number(n), rest)) => {
                    let rest = if rest.len() == 1 {
                        rest[0].clone()
                    } else {
                        Expr::Mul(rest.to_vec())
                    };
                    (n.clone(), rest)
                }
                _ => (BigRational::one(), self.clone()),
            },
            _ => (BigRational::one(), self.clone()),
        }
    }

    /// True when the term would print with a leading minus sign.
    pub fn is_negative_term(&self) -> bool {
        match self {
            Expr::Number(n) => n.is_negative(),
            Expr::Mul(factors) => {
                matches!(factors.first(), Some(Expr::Number(n)) if n.is_negative())
            }
            _ => false,
        }
    }

    pub fn to_ratfunc(&self) -> Result<RatFunc> {
        Ok(match self {
            Expr::Number(n) => RatFunc::constant(n.clone()),
            Expr::Symbol(s) => RatFunc::from_poly(Poly::symbol(s.clone())),
            Expr::Add(terms) => {
                let mut acc = RatFunc::from_poly(Poly::zero());
                for term in terms {
                    acc = acc.add(&term.to_ratfunc()?);
                }
                acc
            }
            Expr::Mul(factors) => {
                let mut acc = RatFunc::from_poly(Poly::one());
                for factor in factors {
                    acc = acc.mul(&factor.to_ratfunc()?);
                }
                acc
            }
            Expr::Pow(base, exp) => {
                let base = base.to_ratfunc()?;
                if *exp >= 0 {
                    base.pow(exp.unsigned_abs())
                } else {
                    base.inv()?.pow(exp.unsigned_abs())
                }
            }
        })
    }

    /// Expanded sum-of-products form. Value preserving and idempotent.
    pub fn expand(&self) -> Result<Expr> {
        Ok(self.to_ratfunc()?.to_expr())
    }

    /// Mathematical equality, independent of how either side is written.
    pub fn equals(&self, other: &Expr) -> Result<bool> {
        let difference = self.to_ratfunc()?.sub(&other.to_ratfunc()?);
        Ok(difference.is_zero())
    }

    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Number(_) => {}
            Expr::Symbol(s) => {
                out.insert(s.clone());
            }
            Expr::Add(args) | Expr::Mul(args) => {
                for arg in args {
                    arg.collect_symbols(out);
                }
            }
            Expr::Pow(base, _) => base.collect_symbols(out),
        }
    }

    pub fn subs(&self, symbol: &Symbol, replacement: &Expr) -> Expr {
        match self {
            Expr::Number(_) => self.clone(),
            Expr::Symbol(s) if s == symbol => replacement.clone(),
            Expr::Symbol(_) => self.clone(),
            Expr::Add(terms) => Expr::add(terms.iter().map(|t| t.subs(symbol, replacement))),
            Expr::Mul(factors) => Expr::mul(factors.iter().map(|f| f.subs(symbol, replacement))),
            Expr::Pow(base, exp) => Expr::pow(base.subs(symbol, replacement), *exp),
        }
    }

    /// Exact evaluation at concrete rational values.
    pub fn evaluate(&self, values: &HashMap<Symbol, BigRational>) -> Result<BigRational> {
        Ok(match self {
            Expr::Number(n) => n.clone(),
            Expr::Symbol(s) => values
                .get(s)
                .cloned()
                .ok_or_else(|| AlgebraError::UndefinedSymbol(s.name().to_string()))?,
            Expr::Add(terms) => {
                let mut acc = BigRational::zero();
                for term in terms {
                    acc += term.evaluate(values)?;
                }
                acc
            }
            Expr::Mul(factors) => {
                let mut acc = BigRational::one();
                for factor in factors {
                    acc *= factor.evaluate(values)?;
                }
                acc
            }
            Expr::Pow(base, exp) => {
                let base = base.evaluate(values)?;
                if base.is_zero() && *exp < 0 {
                    return Err(AlgebraError::DivisionByZero);
                }
                rational_pow(&base, *exp)
            }
        })
    }

    pub fn latex(&self) -> String {
        crate::render::latex_expr(self)
    }
}

fn flatten_into(expr: Expr, out: &mut Vec<Expr>, sum: bool) {
    match expr {
        Expr::Add(terms) if sum => {
            for t in terms {
                flatten_into(t, out, sum);
            }
        }
        Expr::Mul(factors) if !sum => {
            for f in factors {
                flatten_into(f, out, sum);
            }
        }
        Expr::Pow(base, exp) if !sum => match *base {
            base @ (Expr::Number(_) | Expr::Mul(_) | Expr::Pow(..)) => {
                let folded = Expr::pow(base, exp);
                match folded {
                    Expr::Pow(b, e) => out.push(Expr::Pow(b, e)),
                    other => flatten_into(other, out, sum),
                }
            }
            base => out.push(Expr::Pow(Box::new(base), exp)),
        },
        other => out.push(other),
    }
}

fn rational_pow(base: &BigRational, exp: i32) -> BigRational {
    let mut result = BigRational::one();
    for _ in 0..exp.unsigned_abs() {
        result = &result * base;
    }
    if exp < 0 { result.recip() } else { result }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Symbol(symbol)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<BigRational> for Expr {
    fn from(value: BigRational) -> Self {
        Expr::Number(value)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::add([self, rhs])
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::add([self, -rhs])
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul([self, rhs])
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::mul([self, Expr::pow(rhs, -1)])
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::mul([Expr::int(-1), self])
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::plain_expr(self))
    }
}
