use chumsky::prelude::*;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::error::{AlgebraError, Result};
use crate::expr::Expr;
use crate::types::SymbolTable;

/// Largest power accepted in parsed input.
pub const MAX_EXPONENT: u32 = 256;

pub type Extra<'a> = chumsky::extra::Err<chumsky::error::Simple<'a, char>>;

/// Unresolved expression syntax; identifiers are still plain names.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(BigRational),
    Ident(String),
    Neg(Box<Ast>),
    Add(Box<Ast>, Box<Ast>),
    Sub(Box<Ast>, Box<Ast>),
    Mul(Box<Ast>, Box<Ast>),
    Div(Box<Ast>, Box<Ast>),
    Pow(Box<Ast>, BigInt),
}

#[derive(Debug, Clone, Copy)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

fn binary(op: BinOp, lhs: Ast, rhs: Ast) -> Ast {
    let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
    match op {
        BinOp::Add => Ast::Add(lhs, rhs),
        BinOp::Sub => Ast::Sub(lhs, rhs),
        BinOp::Mul => Ast::Mul(lhs, rhs),
        BinOp::Div => Ast::Div(lhs, rhs),
    }
}

fn any_char<'a>() -> impl Parser<'a, &'a str, char, Extra<'a>> + Copy {
    any()
}

pub fn ident_parser<'a>() -> impl Parser<'a, &'a str, String, Extra<'a>> + Clone {
    let ident_start = any_char().filter(|c: &char| c.is_ascii_alphabetic() || *c == '_');
    let ident_rest = any_char()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .collect::<String>();
    ident_start
        .then(ident_rest)
        .map(|(first, rest)| {
            let mut s = String::new();
            s.push(first);
            s.push_str(&rest);
            s
        })
        .padded()
}

fn digits_parser<'a>() -> impl Parser<'a, &'a str, String, Extra<'a>> + Clone {
    any_char()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
}

/// Unsigned integer or decimal literal, read exactly (`0.25` is `1/4`).
pub fn number_parser<'a>() -> impl Parser<'a, &'a str, BigRational, Extra<'a>> + Clone {
    digits_parser()
        .then(just('.').ignore_then(digits_parser()).or_not())
        .map(|(int, frac)| decimal_to_rational(&int, frac.as_deref()))
        .padded()
}

fn decimal_to_rational(int: &str, frac: Option<&str>) -> BigRational {
    let frac = frac.unwrap_or("");
    let numer = digits_to_bigint(&format!("{int}{frac}"));
    let denom = (0..frac.len()).fold(BigInt::from(1u32), |acc, _| acc * 10u32);
    BigRational::new(numer, denom)
}

fn digits_to_bigint(digits: &str) -> BigInt {
    digits
        .bytes()
        .fold(BigInt::zero(), |acc, b| acc * 10u32 + u32::from(b - b'0'))
}

pub fn expr_parser<'a>() -> impl Parser<'a, &'a str, Ast, Extra<'a>> + Clone {
    recursive(|expr| {
        let atom = choice((
            number_parser().map(Ast::Number),
            ident_parser().map(Ast::Ident),
            expr.delimited_by(just('(').padded(), just(')').padded()),
        ))
        .padded();

        let exponent = just('-')
            .or_not()
            .then(digits_parser())
            .padded()
            .map(|(neg, digits)| {
                let value = digits_to_bigint(&digits);
                if neg.is_some() { -value } else { value }
            });

        let power = atom
            .then(
                just("**")
                    .or(just("^"))
                    .padded()
                    .ignore_then(exponent)
                    .or_not(),
            )
            .map(|(base, exp)| match exp {
                Some(exp) => Ast::Pow(Box::new(base), exp),
                None => base,
            });

        let unary = just('-')
            .padded()
            .repeated()
            .foldr(power, |_, rhs| Ast::Neg(Box::new(rhs)));

        let product = unary.clone().foldl(
            choice((just('*').to(BinOp::Mul), just('/').to(BinOp::Div)))
                .padded()
                .then(unary)
                .repeated(),
            |lhs, (op, rhs)| binary(op, lhs, rhs),
        );

        product.clone().foldl(
            choice((just('+').to(BinOp::Add), just('-').to(BinOp::Sub)))
                .padded()
                .then(product)
                .repeated(),
            |lhs, (op, rhs)| binary(op, lhs, rhs),
        )
    })
}

pub fn parse_ast(text: &str) -> Result<Ast> {
    expr_parser()
        .then_ignore(end())
        .parse(text)
        .into_result()
        .map_err(|errs| {
            let msg = errs
                .into_iter()
                .map(|e: chumsky::error::Simple<char>| {
                    format!("parse error at {:?}: found {:?}", e.span(), e.found())
                })
                .collect::<Vec<_>>()
                .join("; ");
            AlgebraError::Parse(format!("failed to parse expression `{text}`. {msg}"))
        })
}

/// Parses `text` and resolves identifiers against `symbols`.
pub fn parse_expr(text: &str, symbols: &SymbolTable) -> Result<Expr> {
    resolve(&parse_ast(text)?, symbols)
}

pub fn resolve(ast: &Ast, symbols: &SymbolTable) -> Result<Expr> {
    Ok(match ast {
        Ast::Number(n) => Expr::Number(n.clone()),
        Ast::Ident(name) => symbols.expr(name)?,
        Ast::Neg(inner) => -resolve(inner, symbols)?,
        Ast::Add(a, b) => resolve(a, symbols)? + resolve(b, symbols)?,
        Ast::Sub(a, b) => resolve(a, symbols)? - resolve(b, symbols)?,
        Ast::Mul(a, b) => resolve(a, symbols)? * resolve(b, symbols)?,
        Ast::Div(a, b) => {
            let divisor = resolve(b, symbols)?;
            if divisor.is_zero() {
                return Err(AlgebraError::DivisionByZero);
            }
            resolve(a, symbols)? / divisor
        }
        Ast::Pow(base, exp) => {
            let exp = exp
                .to_i32()
                .filter(|e| e.unsigned_abs() <= MAX_EXPONENT)
                .ok_or_else(|| {
                    AlgebraError::Parse(format!(
                        "exponent {exp} outside -{MAX_EXPONENT}..={MAX_EXPONENT}"
                    ))
                })?;
            let base = resolve(base, symbols)?;
            if base.is_zero() && exp < 0 {
                return Err(AlgebraError::DivisionByZero);
            }
            Expr::pow(base, exp)
        }
    })
}
