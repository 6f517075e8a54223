//! Ion binary to wire tree.
//!
//! Reading takes two passes over the bytes. The first walks the stream
//! with the streaming reader, which steps through containers without
//! recursion: it enforces the depth limit, counts top-level values and
//! captures the local symbol table in force at the root. Only input that
//! passes is materialized with `Element::read_all`, whose recursion is
//! then bounded by the same limit.

use ion_rs::element::Element;
use ion_rs::types::IntAccess;
use ion_rs::{IonReader, IonType, ReaderBuilder, StreamItem};

use super::{ContainerError, FIRST_LOCAL_SID, VERSION_MARKER};
use crate::wire::Node;

type Result<T> = std::result::Result<T, ContainerError>;

/// A parsed stream: its single root value and the local symbols in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The root value, symbols resolved to text.
    pub root: Node,
    /// Local symbols in SID order, starting at [`FIRST_LOCAL_SID`].
    /// `None` for a slot without text.
    pub symbols: Vec<Option<String>>,
}

/// Parse a complete stream holding exactly one value.
pub fn parse_document(data: &[u8], max_depth: usize) -> Result<Document> {
    let symbols = scan(data, max_depth)?;

    let values = Element::read_all(data)?;
    let root = values.first().ok_or(ContainerError::NoValue)?;
    let root = to_node(root)?;

    log::trace!(
        "read Ion document: {} local symbols, {} bytes",
        symbols.len(),
        data.len()
    );
    Ok(Document { root, symbols })
}

/// Parse a stream and return just its root value.
pub fn read_document(data: &[u8], max_depth: usize) -> Result<Node> {
    parse_document(data, max_depth).map(|document| document.root)
}

/// Local symbol table in force at the root value, without materializing
/// the value.
pub fn read_symbol_table(data: &[u8], max_depth: usize) -> Result<Vec<Option<String>>> {
    scan(data, max_depth)
}

/// Validate the stream's framing and nesting.
fn scan(data: &[u8], max_depth: usize) -> Result<Vec<Option<String>>> {
    if !data.starts_with(&VERSION_MARKER) {
        return Err(ContainerError::BadVersionMarker);
    }

    let mut reader = ReaderBuilder::new().build(data)?;
    let mut values = 0usize;
    let mut symbols = Vec::new();
    loop {
        let item = reader.next()?;
        let depth = reader.depth();

        if depth == 0 {
            if let StreamItem::Nothing = item {
                break;
            }
            values += 1;
            if values > 1 {
                return Err(ContainerError::TrailingValues);
            }
            symbols = reader
                .symbol_table()
                .symbols()
                .iter()
                .skip(FIRST_LOCAL_SID)
                .map(|symbol| symbol.text().map(str::to_string))
                .collect();
        }

        match item {
            StreamItem::Value(IonType::List | IonType::SExp | IonType::Struct) => {
                if depth >= max_depth {
                    return Err(ContainerError::TooDeep { limit: max_depth });
                }
                reader.step_in()?;
            }
            StreamItem::Nothing => reader.step_out()?,
            StreamItem::Value(_) | StreamItem::Null(_) => {}
        }
    }

    if values == 0 {
        return Err(ContainerError::NoValue);
    }
    Ok(symbols)
}

fn to_node(element: &Element) -> Result<Node> {
    if element.is_null() {
        return Ok(Node::Null);
    }

    let ion_type = element.ion_type();
    let unsupported = || ContainerError::UnsupportedType { ion_type };
    let node = match ion_type {
        IonType::Bool => Node::Bool(element.as_bool().ok_or_else(unsupported)?),
        IonType::Int => Node::Int(element.as_i64().ok_or(ContainerError::IntOverflow)?),
        IonType::String => Node::String(element.as_string().ok_or_else(unsupported)?.to_string()),
        IonType::Symbol => {
            let symbol = element.as_symbol().ok_or_else(unsupported)?;
            Node::Symbol(symbol.text().ok_or(ContainerError::UnknownSymbol)?.to_string())
        }
        IonType::List | IonType::SExp => {
            let items = element
                .as_sequence()
                .ok_or_else(unsupported)?
                .elements()
                .map(to_node)
                .collect::<Result<Vec<_>>>()?;
            if ion_type == IonType::List {
                Node::List(items)
            } else {
                Node::SExp(items)
            }
        }
        IonType::Struct => {
            let fields = element
                .as_struct()
                .ok_or_else(unsupported)?
                .fields()
                .map(|(name, value)| {
                    let name = name.text().ok_or(ContainerError::UnknownSymbol)?;
                    Ok((name.to_string(), to_node(value)?))
                })
                .collect::<Result<Vec<_>>>()?;
            Node::Struct(fields)
        }
        _ => return Err(unsupported()),
    };
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(body: &[u8]) -> Vec<u8> {
        let mut bytes = VERSION_MARKER.to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    /// `$ion_symbol_table::{symbols:["a","b"]}`
    const LST_AB: [u8; 10] = [0xE9, 0x81, 0x83, 0xD6, 0x87, 0xB4, 0x81, b'a', 0x81, b'b'];

    fn with_lst(body: &[u8]) -> Vec<u8> {
        let mut bytes = stream(&LST_AB);
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn test_requires_version_marker() {
        assert!(matches!(
            read_document(&[0x21, 0x01], 8),
            Err(ContainerError::BadVersionMarker)
        ));
        assert!(matches!(read_document(&[], 8), Err(ContainerError::BadVersionMarker)));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(read_document(&stream(&[0x0F]), 8).unwrap(), Node::Null);
        assert_eq!(read_document(&stream(&[0x11]), 8).unwrap(), Node::Bool(true));
        assert_eq!(read_document(&stream(&[0x21, 0x2A]), 8).unwrap(), Node::Int(42));
        assert_eq!(read_document(&stream(&[0x31, 0x01]), 8).unwrap(), Node::Int(-1));
        assert_eq!(
            read_document(&stream(&[0x82, b'h', b'i']), 8).unwrap(),
            Node::String("hi".to_string())
        );
    }

    #[test]
    fn test_typed_null_reads_as_null() {
        // null.int
        assert_eq!(read_document(&stream(&[0x2F]), 8).unwrap(), Node::Null);
    }

    #[test]
    fn test_symbols_resolve_through_local_table() {
        // (a b)
        let document = parse_document(&with_lst(&[0xC4, 0x71, 0x0A, 0x71, 0x0B]), 8).unwrap();
        assert_eq!(
            document.root,
            Node::SExp(vec![
                Node::Symbol("a".to_string()),
                Node::Symbol("b".to_string())
            ])
        );
        assert_eq!(
            document.symbols,
            vec![Some("a".to_string()), Some("b".to_string())]
        );
        assert_eq!(
            read_symbol_table(&with_lst(&[0x71, 0x0A]), 8).unwrap(),
            document.symbols
        );
    }

    #[test]
    fn test_value_count() {
        assert!(matches!(
            read_document(&VERSION_MARKER, 8),
            Err(ContainerError::NoValue)
        ));
        assert!(matches!(
            read_document(&stream(&[0x21, 0x01, 0x21, 0x02]), 8),
            Err(ContainerError::TrailingValues)
        ));
    }

    #[test]
    fn test_annotations_are_dropped() {
        // name::1
        assert_eq!(
            read_document(&stream(&[0xE4, 0x81, 0x84, 0x21, 0x01]), 8).unwrap(),
            Node::Int(1)
        );
    }

    #[test]
    fn test_unsupported_type() {
        // 0e0
        assert!(matches!(
            read_document(&stream(&[0x40]), 8),
            Err(ContainerError::UnsupportedType {
                ion_type: IonType::Float
            })
        ));
    }

    #[test]
    fn test_int_beyond_i64() {
        // 2^63, one past i64::MAX
        let body = [0x28, 0x80, 0, 0, 0, 0, 0, 0, 0];
        assert!(read_document(&stream(&body), 8).is_err());
    }

    #[test]
    fn test_depth_limit() {
        // ((()))
        let nested = stream(&[0xC2, 0xC1, 0xC0]);
        assert!(read_document(&nested, 3).is_ok());
        assert!(matches!(
            read_document(&nested, 2),
            Err(ContainerError::TooDeep { limit: 2 })
        ));
        assert!(matches!(
            read_symbol_table(&nested, 2),
            Err(ContainerError::TooDeep { limit: 2 })
        ));
    }

    #[test]
    fn test_truncated_stream_is_an_error() {
        // (a b) with its last byte missing
        assert!(read_document(&with_lst(&[0xC4, 0x71, 0x0A, 0x71]), 8).is_err());
    }
}
