//! Symbol interning for the encoder.
//!
//! Every distinct symbol text that appears in an encoded tree gets one
//! slot, numbered from zero in order of first use. The resulting list is
//! written as the local symbol table of the Ion stream, so the numbering
//! is part of the output: the same program always produces the same table.
//!
//! # Example
//!
//! ```
//! use laurel_ion::intern::SymbolTable;
//!
//! let mut table = SymbolTable::new();
//! let a = table.intern("seq");
//! let b = table.intern("seq");
//! assert_eq!(a, b);
//! assert_eq!(table.symbols(), ["seq"]);
//! ```

use ahash::AHashMap;

// ============================================================================
// Symbol Index
// ============================================================================

/// Position of a symbol within a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Create from a raw slot number.
    #[inline]
    pub fn from_raw(idx: u32) -> Self {
        SymbolId(idx)
    }

    /// Get the raw slot number.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the slot as a `usize` index into [`SymbolTable::symbols`].
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Symbol Table
// ============================================================================

/// Insertion-ordered set of symbol texts.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    /// Text to slot
    map: AHashMap<String, SymbolId>,
    /// Slot to text, in first-use order
    symbols: Vec<String>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `capacity` symbols.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: AHashMap::with_capacity(capacity),
            symbols: Vec::with_capacity(capacity),
        }
    }

    /// Intern `s`, returning its slot. Existing texts keep their slot.
    pub fn intern(&mut self, s: &str) -> SymbolId {
        if let Some(&id) = self.map.get(s) {
            return id;
        }

        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(s.to_string());
        self.map.insert(s.to_string(), id);
        id
    }

    /// Slot of `s` if it has been interned.
    pub fn lookup(&self, s: &str) -> Option<SymbolId> {
        self.map.get(s).copied()
    }

    /// Text of a slot, or `None` if out of range.
    pub fn get(&self, id: SymbolId) -> Option<&str> {
        self.symbols.get(id.index()).map(String::as_str)
    }

    /// All texts in slot order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Consume the table, returning its texts in slot order.
    pub fn into_symbols(self) -> Vec<String> {
        self.symbols
    }

    /// Number of distinct texts.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
