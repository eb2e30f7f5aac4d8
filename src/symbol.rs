//! The symbol table built during the first pass and consulted during the second.

use std::collections::HashMap;

/// What a symbol refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Code,
    Data,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub address: i32,
    pub kind: SymbolKind,
    pub is_entry: bool,
}

/// Outcome of an operation that can fail without aborting the pass:
/// a duplicate definition, a label colliding with a macro name, and
/// similar per-line problems all come back as `Rejected`.
pub enum InsertOutcome {
    Inserted,
    Rejected(String),
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Inserts or overwrites the symbol bound to `name`. Callers that
    /// care whether a name is already taken (a label definition, for
    /// instance) check `contains` first — this always succeeds, the
    /// way the table itself is agnostic about redefinition policy.
    pub fn insert(&mut self, name: &str, address: i32, kind: SymbolKind) -> InsertOutcome {
        self.symbols.insert(
            name.to_string(),
            Symbol { address, kind, is_entry: false },
        );
        InsertOutcome::Inserted
    }

    /// Registers `name` as external. Idempotent: re-declaring the same
    /// name as external is fine, but a name already bound to code/data
    /// is rejected since `.extern` and a label definition can't agree.
    pub fn declare_extern(&mut self, name: &str) -> InsertOutcome {
        match self.symbols.get(name) {
            Some(sym) if sym.kind == SymbolKind::External => InsertOutcome::Inserted,
            Some(_) => InsertOutcome::Rejected(format!(
                "'{name}' is already defined as a label and cannot also be external"
            )),
            None => {
                self.symbols.insert(
                    name.to_string(),
                    Symbol { address: 0, kind: SymbolKind::External, is_entry: false },
                );
                InsertOutcome::Inserted
            }
        }
    }

    /// Marks `name` as an entry point. Fails if the symbol is unknown or
    /// is itself external — an external symbol can't be entered, since
    /// this translation unit doesn't define it.
    pub fn mark_entry(&mut self, name: &str) -> Result<(), String> {
        match self.symbols.get_mut(name) {
            None => Err(format!("entry symbol '{name}' is not defined in this file")),
            Some(sym) if sym.kind == SymbolKind::External => {
                Err(format!("'{name}' is declared both external and entry"))
            }
            Some(sym) => {
                sym.is_entry = true;
                Ok(())
            }
        }
    }

    /// Adds `offset` to the address of every data symbol. Called once
    /// at the end of the first pass, after the final instruction count
    /// is known, so data addresses follow directly after the code image.
    pub fn relocate_data_symbols(&mut self, offset: i32) {
        for sym in self.symbols.values_mut() {
            if sym.kind == SymbolKind::Data {
                sym.address += offset;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter().filter(|(_, sym)| sym.is_entry)
    }
}
