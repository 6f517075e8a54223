//! Text rendering of wire trees.
//!
//! Produces the notation used throughout the docs, e.g.
//! `(Laurel.Program null (seq null) (seq null) (seq null))`. Symbols made
//! of identifier characters and dots are printed bare, anything else is
//! single-quoted. The output is for humans and debugging; it is not meant
//! to be fed back to an Ion text parser.
//!
//! `{}` renders on one line. `{:#}` breaks any s-expression wider than
//! [`WIDTH`] columns, one child per line, indented by two spaces.

use std::fmt::{self, Write};

use super::Node;

/// Column budget for the alternate (multi-line) rendering.
pub const WIDTH: usize = 80;

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let mut out = String::new();
            write_broken(&mut out, self, 0)?;
            f.write_str(&out)
        } else {
            write_flat(f, self)
        }
    }
}

fn write_flat<W: Write>(out: &mut W, node: &Node) -> fmt::Result {
    match node {
        Node::Null => out.write_str("null"),
        Node::Bool(b) => write!(out, "{}", b),
        Node::Int(n) => write!(out, "{}", n),
        Node::String(s) => write_quoted(out, s, '"'),
        Node::Symbol(s) => write_symbol(out, s),
        Node::List(items) => write_seq(out, "[", ", ", "]", items),
        Node::SExp(items) => write_seq(out, "(", " ", ")", items),
        Node::Struct(fields) => {
            out.write_char('{')?;
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_symbol(out, name)?;
                out.write_str(": ")?;
                write_flat(out, value)?;
            }
            out.write_char('}')
        }
    }
}

fn write_seq<W: Write>(out: &mut W, open: &str, sep: &str, close: &str, items: &[Node]) -> fmt::Result {
    out.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_str(sep)?;
        }
        write_flat(out, item)?;
    }
    out.write_str(close)
}

fn write_broken(out: &mut String, node: &Node, indent: usize) -> fmt::Result {
    let mut flat = String::new();
    write_flat(&mut flat, node)?;
    let items = match node {
        Node::SExp(items) if indent + flat.len() > WIDTH && items.len() > 1 => items,
        _ => {
            out.push_str(&flat);
            return Ok(());
        }
    };

    // Head and annotation slot stay on the opening line.
    let inline = items.len().min(super::HEADER_LEN);
    out.push('(');
    for (i, item) in items[..inline].iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_flat(out, item)?;
    }
    for item in &items[inline..] {
        out.push('\n');
        push_indent(out, indent + 2);
        write_broken(out, item, indent + 2)?;
    }
    out.push(')');
    Ok(())
}

fn push_indent(out: &mut String, width: usize) {
    out.extend(std::iter::repeat_n(' ', width));
}

fn is_bare_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
        && s != "null"
        && s != "true"
        && s != "false"
}

fn write_symbol<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    if is_bare_symbol(s) {
        out.write_str(s)
    } else {
        write_quoted(out, s, '\'')
    }
}

fn write_quoted<W: Write>(out: &mut W, s: &str, quote: char) -> fmt::Result {
    out.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c == quote => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            c if c.is_control() => write!(out, "\\x{:02x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char(quote)
}
