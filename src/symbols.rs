use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::game::GameBuild;

/// Symbols beginning with this prefix are internal to a table and never enumerated.
pub const INTERNAL_SYMBOL_PREFIX: &str = "__";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SymbolError {
    #[error("No symbol table loaded for {0}")]
    UnknownBuild(GameBuild),
    #[error("Symbol not found: {name} ({game})")]
    NotFound { game: GameBuild, name: String },
    #[error("Symbol already defined: {0}")]
    AlreadyDefined(String),
    #[error("Malformed symbol on line {line}: '{text}'")]
    Malformed { line: usize, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumString)]
pub enum SymbolKind {
    #[strum(serialize = "F", serialize = "function", ascii_case_insensitive)]
    Function,
    #[strum(serialize = "D", serialize = "data", ascii_case_insensitive)]
    Data,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "F"),
            SymbolKind::Data => write!(f, "D"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub game: GameBuild,
    pub address: u32,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn is_internal(&self) -> bool {
        self.name.starts_with(INTERNAL_SYMBOL_PREFIX)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X} {} {}", self.address, self.kind, self.name)
    }
}

/// Read-only lookup of `(game build, name) -> address`.
///
/// Tables are loaded once per build with [`SymbolTable::load`] and never change afterwards,
/// so a table can be shared freely between generation calls.
#[derive(Debug, Default)]
pub struct SymbolTable {
    tables: HashMap<GameBuild, Vec<Symbol>>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Load the symbols of one build from a symbol file.
    ///
    /// Each non-empty line is `ADDRESS KIND NAME`, e.g. `800ECB24 F GetRandomByte`. Lines
    /// starting with `#` or `;` are comments.
    #[tracing::instrument(skip(self, text))]
    pub fn load(&mut self, game: GameBuild, text: &str) -> Result<usize, SymbolError> {
        let mut symbols: Vec<Symbol> = Vec::new();

        for (ix, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let symbol = parse_symbol_line(game, line).ok_or_else(|| SymbolError::Malformed {
                line: ix + 1,
                text: line.to_owned(),
            })?;
            if symbols.iter().any(|s| s.name == symbol.name) {
                return Err(SymbolError::AlreadyDefined(symbol.name));
            }
            symbols.push(symbol);
        }

        let count = symbols.len();
        tracing::debug!(%game, count, "loaded symbol table");
        self.tables.insert(game, symbols);
        Ok(count)
    }

    pub fn has_build(&self, game: GameBuild) -> bool {
        self.tables.contains_key(&game)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_symbol(&self, game: GameBuild, name: &str) -> Result<u32, SymbolError> {
        let symbols = self
            .tables
            .get(&game)
            .ok_or(SymbolError::UnknownBuild(game))?;
        symbols
            .iter()
            .find(|symbol| symbol.name == name)
            .map(|symbol| symbol.address)
            .ok_or_else(|| SymbolError::NotFound {
                game,
                name: name.to_owned(),
            })
    }

    /// All public symbols of a build in load order, optionally restricted to one kind.
    #[tracing::instrument(skip(self))]
    pub fn get_symbols(&self, game: GameBuild, kind: Option<SymbolKind>) -> Vec<&Symbol> {
        self.tables
            .get(&game)
            .map(|symbols| {
                symbols
                    .iter()
                    .filter(|symbol| !symbol.is_internal())
                    .filter(|symbol| kind.map_or(true, |kind| symbol.kind == kind))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_symbol_line(game: GameBuild, line: &str) -> Option<Symbol> {
    let mut parts = line.split_whitespace();
    let address = parts.next()?;
    let kind = parts.next()?;
    let name = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let address = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);

    Some(Symbol {
        name: name.to_owned(),
        game,
        address: u32::from_str_radix(address, 16).ok()?,
        kind: kind.parse().ok()?,
    })
}
