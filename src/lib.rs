//! Laurel AST interchange over Ion binary.
//!
//! This crate moves a Laurel verification AST between independently
//! written implementations. Each node travels as a tagged Ion
//! s-expression; the tag vocabulary and field order are the file format.
//!
//! # Architecture
//!
//! ```text
//! Program --encode--> wire::Node + symbols --ion::writer (ion-rs)--> bytes
//! bytes --ion::reader (ion-rs)--> wire::Node --decode--> Program
//! ```
//!
//! - [`ast`] - the AST data model and builders
//! - [`wire`] - node shapes, keywords and the variant tag table
//! - [`intern`] - per-encode symbol table
//! - [`encode`] / [`decode`] - AST to wire tree and back
//! - [`ion`] - the Ion 1.0 binary container, on top of `ion-rs`
//! - [`pretty`] - human-readable rendering
//!
//! # Concurrency
//!
//! There is no global state. Every encode owns its symbol table and every
//! decode owns its depth counter, so independent calls can run on any
//! number of threads. Reading and decoding recurse once per nesting
//! level, so both run on a scoped thread whose stack is sized from
//! [`CodecConfig::max_depth`].
//!
//! ```rust
//! use laurel_ion::ast::{HighType, Procedure, Program, StmtExpr};
//!
//! let program = Program::builder()
//!     .procedure(
//!         Procedure::builder("answer")
//!             .output(HighType::TInt)
//!             .transparent_body(StmtExpr::int(42))
//!             .build()
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let bytes = laurel_ion::encode(&program).unwrap();
//! assert_eq!(laurel_ion::decode(&bytes).unwrap(), program);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::uninlined_format_args)] // Style preference, not a correctness issue

pub mod ast;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod file;
pub mod intern;
pub mod ion;
pub mod pretty;
mod stack;
pub mod wire;

// Re-exports for convenience
pub use ast::Program;
pub use config::CodecConfig;
pub use decode::{decode_program, Decode, DecodeError, Decoder};
pub use encode::{encode_program, Encode, Encoded, Encoder};
pub use error::{Error, Result};
pub use file::{read_program_file, write_program_file, FileError};
pub use ion::ContainerError;
pub use wire::{Node, Tag};

/// Encode `program` as a complete Ion binary stream.
pub fn encode(program: &Program) -> Result<Vec<u8>> {
    let encoded = encode_program(program);
    let bytes = ion::write_document(&encoded.root, &encoded.symbols)?;
    log::debug!(
        "encoded program: {} procedures, {} symbols, {} bytes",
        program.static_procedures.len(),
        encoded.symbols.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decode a program from an Ion binary stream with default limits.
pub fn decode(bytes: &[u8]) -> Result<Program> {
    decode_with_config(bytes, &CodecConfig::default())
}

/// Decode a program from an Ion binary stream.
pub fn decode_with_config(bytes: &[u8], config: &CodecConfig) -> Result<Program> {
    check_input_len(bytes, config)?;
    let program = on_decode_stack(config, || {
        let root = ion::read_document(bytes, config.max_depth)?;
        let mut decoder = Decoder::with_config(config);
        Ok(decoder.decode::<Program>(&root)?)
    })?;
    log::debug!(
        "decoded program: {} procedures, {} fields, {} types",
        program.static_procedures.len(),
        program.static_fields.len(),
        program.types.len()
    );
    Ok(program)
}

/// Parse an Ion binary stream into its wire tree without decoding it.
pub fn read_wire(bytes: &[u8], config: &CodecConfig) -> Result<Node> {
    check_input_len(bytes, config)?;
    on_decode_stack(config, || Ok(ion::read_document(bytes, config.max_depth)?))
}

/// Local symbol table of an encoded stream, in SID order.
pub fn read_symbols(bytes: &[u8], config: &CodecConfig) -> Result<Vec<Option<String>>> {
    check_input_len(bytes, config)?;
    Ok(ion::read_symbol_table(bytes, config.max_depth)?)
}

fn check_input_len(bytes: &[u8], config: &CodecConfig) -> Result<()> {
    match config.max_input_len {
        Some(limit) if bytes.len() > limit => Err(ContainerError::InputTooLarge {
            len: bytes.len(),
            limit,
        }
        .into()),
        _ => Ok(()),
    }
}

fn on_decode_stack<T, F>(config: &CodecConfig, f: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    stack::with_stack(config.max_depth, f)
        .map_err(|err| Error::Decode(DecodeError::Spawn(err.to_string())))?
}
