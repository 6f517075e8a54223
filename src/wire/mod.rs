//! Wire convention shared by the encoder and decoder.
//!
//! Every AST node travels as an Ion s-expression whose head is a symbol.
//! The head is either a protocol keyword or a variant tag:
//!
//! ```text
//! (ident  null Laurel.TInt)            bare tag reference
//! (op     (Init.true null))            boolean by reference
//! (strlit null "name")                 string leaf
//! (num    null 42)                     integer leaf
//! (option null)                        absent
//! (option null <payload>)              present
//! (seq    null <item> <item> ...)      ordered list
//! (Laurel.Assign null <field> ...)     composite variant
//! ```
//!
//! The second slot is the annotation slot. It is always `null` on the way
//! out and is never inspected on the way in.
//!
//! # Module Structure
//!
//! - [`tag`] - closed set of variant tags and their wire spellings
//! - [`sexp`] - text rendering of wire trees for debugging

pub mod sexp;
pub mod tag;

pub use tag::{Category, Tag};

/// Number of leading slots (head + annotation) before any payload.
pub const HEADER_LEN: usize = 2;

/// A wire tree with every symbol resolved to text.
///
/// The encoder only produces `Null`, `Int`, `String`, `Symbol` and `SExp`.
/// The remaining shapes exist because the reader accepts any well-formed
/// Ion value; the decoder rejects them wherever they do not belong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `null` (including typed nulls on the read side).
    Null,
    /// Ion bool. Never part of the protocol.
    Bool(bool),
    /// Ion int.
    Int(i64),
    /// Ion string.
    String(String),
    /// Ion symbol, by text.
    Symbol(String),
    /// Ion list. Never part of the protocol.
    List(Vec<Node>),
    /// Ion s-expression.
    SExp(Vec<Node>),
    /// Ion struct. Never part of the protocol.
    Struct(Vec<(String, Node)>),
}

impl Node {
    /// Short name of the node's shape for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::String(_) => "string",
            Node::Symbol(_) => "symbol",
            Node::List(_) => "list",
            Node::SExp(_) => "sexp",
            Node::Struct(_) => "struct",
        }
    }

    /// The symbol text, if this is a symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Node::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is an s-expression.
    pub fn as_sexp(&self) -> Option<&[Node]> {
        match self {
            Node::SExp(items) => Some(items),
            _ => None,
        }
    }

    /// Head symbol of an s-expression, if it has one.
    pub fn head(&self) -> Option<&str> {
        self.as_sexp()
            .and_then(|items| items.first())
            .and_then(Node::as_symbol)
    }

    /// Short human description: the head symbol for s-expressions,
    /// otherwise the shape name.
    pub fn describe(&self) -> String {
        match self {
            Node::SExp(items) => match self.head() {
                Some(head) => format!("({} ...) with {} element(s)", head, items.len()),
                None => format!("sexp with {} element(s) and no head symbol", items.len()),
            },
            Node::Symbol(s) => format!("symbol `{}`", s),
            other => other.kind().to_string(),
        }
    }
}

/// Protocol keywords. Interned alongside tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Head of bare tag references and `ident`-shaped types.
    Ident,
    /// Head of boolean references.
    Op,
    /// Head of string leaves.
    StrLit,
    /// Head of integer leaves.
    Num,
    /// Head of optional wrappers.
    Option,
    /// Head of sequences.
    Seq,
    /// The `true` boolean tag.
    True,
    /// The `false` boolean tag.
    False,
}

impl Keyword {
    /// Every keyword.
    pub const ALL: [Keyword; 8] = [
        Keyword::Ident,
        Keyword::Op,
        Keyword::StrLit,
        Keyword::Num,
        Keyword::Option,
        Keyword::Seq,
        Keyword::True,
        Keyword::False,
    ];

    /// The wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Ident => "ident",
            Keyword::Op => "op",
            Keyword::StrLit => "strlit",
            Keyword::Num => "num",
            Keyword::Option => "option",
            Keyword::Seq => "seq",
            Keyword::True => "Init.true",
            Keyword::False => "Init.false",
        }
    }

    /// The boolean keyword for `value`.
    pub fn for_bool(value: bool) -> Keyword {
        if value { Keyword::True } else { Keyword::False }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
