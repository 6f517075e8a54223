//! Ion 1.0 binary container.
//!
//! The byte-level format is handled by `ion-rs`. This module only moves
//! between its values and [`crate::wire::Node`]: the writer streams a wire
//! tree through an Ion binary writer, and the reader materializes the
//! stream with `Element::read_all` and converts the single root value.
//!
//! # Stream Layout
//!
//! ```text
//! E0 01 00 EA                      binary version marker
//! $ion_symbol_table::{             local symbol table
//!     symbols: ["Laurel.Program", ...]
//! }
//! (Laurel.Program null ...)        exactly one root value
//! ```
//!
//! The Ion writer assigns local SIDs in first-use order. The encoder
//! interns in the same pre-order walk, so the local symbol table equals
//! the encoder's symbol list, starting at [`FIRST_LOCAL_SID`].
//!
//! # Module Structure
//!
//! - [`writer`] - document emission
//! - [`reader`] - depth scan, symbol table capture, value conversion

use ion_rs::{IonError, IonType};
use thiserror::Error;

pub mod reader;
pub mod writer;

pub use reader::{parse_document, read_document, read_symbol_table, Document};
pub use writer::write_document;

/// Binary version marker for Ion 1.0.
pub const VERSION_MARKER: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

/// First SID available to local symbols. SIDs 1 through 9 are the Ion
/// system symbols.
pub const FIRST_LOCAL_SID: usize = 10;

/// Failure to produce or parse the Ion container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The Ion library rejected the stream or failed to write it.
    #[error("Ion error: {0}")]
    Ion(#[from] IonError),

    /// The input does not start with the Ion 1.0 binary version marker.
    #[error("missing or unsupported Ion binary version marker")]
    BadVersionMarker,

    /// An integer outside the signed 64-bit range.
    #[error("integer does not fit in 64 bits")]
    IntOverflow,

    /// A symbol, field name or annotation whose text is unknown.
    #[error("symbol has no known text")]
    UnknownSymbol,

    /// A value type the wire tree cannot represent.
    #[error("unsupported Ion type `{ion_type:?}`")]
    UnsupportedType {
        /// Type of the rejected value.
        ion_type: IonType,
    },

    /// The stream holds only system values.
    #[error("stream contains no value")]
    NoValue,

    /// The stream holds more than one top-level user value.
    #[error("stream contains more than one top-level value")]
    TrailingValues,

    /// The symbol list handed to the writer is not the tree's symbols in
    /// first-use order.
    #[error("symbol table does not match the tree: {0}")]
    SymbolTableMismatch(String),

    /// Containers nest deeper than the configured limit.
    #[error("values nested deeper than {limit} levels")]
    TooDeep {
        /// The configured depth limit.
        limit: usize,
    },

    /// The input is longer than the configured limit.
    #[error("input of {len} bytes exceeds the limit of {limit}")]
    InputTooLarge {
        /// Bytes seen.
        len: usize,
        /// The configured limit.
        limit: usize,
    },
}
