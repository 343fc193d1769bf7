use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{AlgebraError, Result};
use crate::expr::Expr;

/// Named scalar placeholder. Symbols compare and order by name only, so two
/// symbols created from the same name are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn latex(&self) -> String {
        crate::render::latex_symbol_name(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binding scope for one model pass.
///
/// A binding is the short identifier used while building matrices (`e1`),
/// the symbol name is what gets rendered (`varepsilon1`). Lookups of names
/// that were never declared fail instead of silently creating a symbol.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    order: Vec<String>,
    bindings: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, binding: &str, name: &str) -> Result<Symbol> {
        let binding = binding.trim();
        let name = name.trim();
        if binding.is_empty() || name.is_empty() {
            return Err(AlgebraError::Parse(
                "symbol binding and name must not be empty".to_string(),
            ));
        }
        if let Some(existing) = self.bindings.get(binding) {
            if existing.name() == name {
                return Ok(existing.clone());
            }
            return Err(AlgebraError::DuplicateSymbol {
                binding: binding.to_string(),
                existing: existing.name().to_string(),
                requested: name.to_string(),
            });
        }
        let symbol = Symbol::new(name);
        self.order.push(binding.to_string());
        self.bindings.insert(binding.to_string(), symbol.clone());
        Ok(symbol)
    }

    pub fn declare_all(&mut self, pairs: &[(&str, &str)]) -> Result<Vec<Symbol>> {
        pairs
            .iter()
            .map(|(binding, name)| self.declare(binding, name))
            .collect()
    }

    /// Declares symbols whose binding and name coincide.
    pub fn declare_plain(&mut self, names: &[&str]) -> Result<Vec<Symbol>> {
        names.iter().map(|name| self.declare(name, name)).collect()
    }

    pub fn get(&self, binding: &str) -> Result<Symbol> {
        self.bindings
            .get(binding.trim())
            .cloned()
            .ok_or_else(|| AlgebraError::UndefinedSymbol(binding.trim().to_string()))
    }

    pub fn expr(&self, binding: &str) -> Result<Expr> {
        self.get(binding).map(Expr::Symbol)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Declared symbols in declaration order.
    pub fn symbols(&self) -> Vec<(&str, &Symbol)> {
        self.order
            .iter()
            .filter_map(|b| self.bindings.get(b).map(|s| (b.as_str(), s)))
            .collect()
    }
}
