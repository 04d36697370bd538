//! Name table for context variables and grammar constants.
//!
//! Context tables are keyed by [`Symbol`], so comparing two grammar states
//! compares integers for the keys, never names.

use indexmap::IndexSet;

/// Index of an interned name. Symbols order by first interning.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// Insertion-ordered set of names. A grammar builds one and owns it
/// afterwards; parses only read it.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    names: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        let index = match self.names.get_index_of(name) {
            Some(index) => index,
            None => self.names.insert_full(name.into()).0,
        };
        Symbol(index as u32)
    }

    /// Symbol of an already interned name.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.names.get_index_of(name).map(|index| Symbol(index as u32))
    }

    /// Name behind `symbol`, `None` for a symbol from another interner.
    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.names.get_index(symbol.0 as usize).map(|name| &**name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (Symbol(index as u32), &**name))
    }
}
