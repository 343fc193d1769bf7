//! Reader for declarative model files.
//!
//! ```text
//! # FE-SEM, one wave
//! symbols: y1, x1, e1 = varepsilon1, a = alpha, b = beta
//! observed: y1, x1
//! eta: y1, x1, a
//! zeta: e1, x1, a
//! y1 =~ y1          # Lambda_y[y1][y1] = 1
//! x1 =~ x1
//! y1 ~ b*x1 + a     # B[y1][x1] = b, B[y1][a] = 1
//! ```
//!
//! `=~` fills `Lambda_y` (`eta =~ coef*observed`), `~` fills `B`
//! (`lhs ~ coef*rhs`). A missing coefficient means 1.

use std::fs;
use std::path::Path;

use chumsky::prelude::*;
use symalg::parser::{Ast, Extra, expr_parser, ident_parser, number_parser, resolve};
use symalg::{Expr, SymbolTable};
use tracing::debug;

use crate::error::{FesemError, Result};
use crate::spec::{MatrixBuilder, ModelSpec, column_vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOp {
    Measure,
    Regress,
}

#[derive(Debug, Clone)]
pub struct Term {
    pub coef: Option<Ast>,
    pub var: String,
}

#[derive(Debug, Clone)]
pub struct Relation {
    pub lhs: String,
    pub op: RelationOp,
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, Default)]
struct Section {
    line: usize,
    names: Vec<String>,
}

/// Parsed but unresolved model file.
#[derive(Debug, Clone, Default)]
pub struct ModelFile {
    pub name: Option<String>,
    symbols: Vec<(usize, String, String)>,
    observed: Option<Section>,
    eta: Option<Section>,
    zeta: Option<Section>,
    relations: Vec<(usize, Relation)>,
}

fn at(line: usize, err: impl std::fmt::Display) -> FesemError {
    FesemError::ModelFile {
        line,
        message: err.to_string(),
    }
}

fn strip_comments(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_names(line: usize, list: &str) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !is_identifier(name) {
            return Err(at(line, format!("invalid name `{name}`")));
        }
        if out.iter().any(|n| n == name) {
            return Err(at(line, format!("`{name}` listed twice")));
        }
        out.push(name.to_string());
    }
    if out.is_empty() {
        return Err(at(line, "empty name list"));
    }
    Ok(out)
}

fn relation_parser<'a>() -> impl Parser<'a, &'a str, Relation, Extra<'a>> {
    let coef = choice((
        number_parser().map(Ast::Number),
        ident_parser().map(Ast::Ident),
        expr_parser().delimited_by(just('(').padded(), just(')').padded()),
    ));

    let term = coef
        .then_ignore(just('*').padded())
        .then(ident_parser())
        .map(|(coef, var)| Term {
            coef: Some(coef),
            var,
        })
        .or(ident_parser().map(|var| Term { coef: None, var }));

    let terms = term
        .separated_by(just('+').padded())
        .at_least(1)
        .collect::<Vec<_>>();

    let op = choice((
        just("=~").to(RelationOp::Measure),
        just('~').to(RelationOp::Regress),
    ))
    .padded();

    ident_parser()
        .then(op)
        .then(terms)
        .then_ignore(end())
        .map(|((lhs, op), terms)| Relation { lhs, op, terms })
}

fn parse_relation(line: &str) -> std::result::Result<Relation, String> {
    relation_parser().parse(line).into_result().map_err(|errs| {
        errs.into_iter()
            .map(|e: chumsky::error::Simple<char>| {
                format!("parse error at {:?}: found {:?}", e.span(), e.found())
            })
            .collect::<Vec<_>>()
            .join("; ")
    })
}

impl ModelFile {
    pub fn parse(text: &str) -> Result<ModelFile> {
        let mut file = ModelFile::default();
        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            for segment in strip_comments(raw_line).split(';') {
                let statement = segment.trim();
                if statement.is_empty() {
                    continue;
                }
                if let Some((key, rest)) = statement.split_once(':')
                    && is_identifier(key.trim())
                {
                    file.section(line_no, key.trim(), rest.trim())?;
                    continue;
                }
                let relation = parse_relation(statement).map_err(|msg| {
                    at(line_no, format!("failed to parse `{statement}`: {msg}"))
                })?;
                file.relations.push((line_no, relation));
            }
        }
        Ok(file)
    }

    fn section(&mut self, line: usize, key: &str, rest: &str) -> Result<()> {
        let slot = match key {
            "name" => {
                self.name = Some(rest.to_string());
                return Ok(());
            }
            "symbols" => {
                for entry in rest.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let (binding, name) = match entry.split_once('=') {
                        Some((b, n)) => (b.trim(), n.trim()),
                        None => (entry, entry),
                    };
                    if !is_identifier(binding) || !is_identifier(name) {
                        return Err(at(line, format!("invalid symbol declaration `{entry}`")));
                    }
                    self.symbols
                        .push((line, binding.to_string(), name.to_string()));
                }
                return Ok(());
            }
            "observed" => &mut self.observed,
            "eta" => &mut self.eta,
            "zeta" => &mut self.zeta,
            other => return Err(at(line, format!("unknown section `{other}`"))),
        };
        if slot.is_some() {
            return Err(at(line, format!("section `{key}` declared twice")));
        }
        *slot = Some(Section {
            line,
            names: split_names(line, rest)?,
        });
        Ok(())
    }

    /// Resolves names and builds the matrices.
    pub fn into_spec(self, default_name: &str) -> Result<ModelSpec> {
        let mut symbols = SymbolTable::new();
        for (line, binding, name) in &self.symbols {
            symbols.declare(binding, name).map_err(|e| at(*line, e))?;
        }

        let observed = require(self.observed, "observed")?;
        let eta = require(self.eta, "eta")?;
        let zeta = require(self.zeta, "zeta")?;

        let vector = |section: &Section| {
            let names: Vec<&str> = section.names.iter().map(String::as_str).collect();
            column_vector(&symbols, &names).map_err(|e| at(section.line, e))
        };
        let y = vector(&observed)?;
        let eta_vec = vector(&eta)?;
        let zeta_vec = vector(&zeta)?;

        let mut lambda_y = MatrixBuilder::new("Lambda_y", &observed.names, &eta.names);
        let mut beta = MatrixBuilder::new("B", &eta.names, &eta.names);
        for (line, relation) in &self.relations {
            for term in &relation.terms {
                let value = match &term.coef {
                    Some(ast) => resolve(ast, &symbols).map_err(|e| at(*line, e))?,
                    None => Expr::one(),
                };
                let placed = match relation.op {
                    RelationOp::Measure => lambda_y.set(&term.var, &relation.lhs, value),
                    RelationOp::Regress => beta.set(&relation.lhs, &term.var, value),
                };
                placed.map_err(|e| at(*line, e))?;
            }
        }

        let spec = ModelSpec {
            name: self.name.unwrap_or_else(|| default_name.to_string()),
            y,
            lambda_y: lambda_y.build()?,
            eta: eta_vec,
            beta: beta.build()?,
            zeta: zeta_vec,
            symbols,
        };
        spec.validate()?;
        debug!(
            model = %spec.name,
            relations = self.relations.len(),
            "resolved model file"
        );
        Ok(spec)
    }
}

fn require(section: Option<Section>, key: &str) -> Result<Section> {
    section.ok_or_else(|| FesemError::InvalidSpec(format!("missing `{key}:` section")))
}

pub fn parse_model_file(default_name: &str, text: &str) -> Result<ModelSpec> {
    ModelFile::parse(text)?.into_spec(default_name)
}

pub fn read_model_file(path: &Path) -> Result<ModelSpec> {
    let text = fs::read_to_string(path)?;
    let default_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    parse_model_file(default_name, &text)
}
