//! Wire tree to Ion binary.

use ion_rs::{BinaryWriterBuilder, IonResult, IonType, IonWriter};

use super::ContainerError;
use crate::intern::SymbolTable;
use crate::wire::Node;

/// Emit `root` as a complete Ion 1.0 binary stream.
///
/// `table` must list the tree's symbols in first-use order, which is what
/// the encoder produces. The Ion writer numbers local symbols the same
/// way, so the stream's symbol table is exactly `table`.
pub fn write_document(root: &Node, table: &SymbolTable) -> Result<Vec<u8>, ContainerError> {
    let mut used = SymbolTable::with_capacity(table.len());
    collect_symbols(root, &mut used);
    if used.symbols() != table.symbols() {
        return Err(ContainerError::SymbolTableMismatch(format!(
            "tree uses {} symbol(s), table lists {}",
            used.len(),
            table.len()
        )));
    }

    let mut buffer = Vec::new();
    {
        let mut writer = BinaryWriterBuilder::new().build(&mut buffer)?;
        write_node(&mut writer, root)?;
        writer.flush()?;
    }
    log::trace!(
        "wrote Ion document: {} local symbols, {} bytes",
        table.len(),
        buffer.len()
    );
    Ok(buffer)
}

/// Intern every symbol of `node` in pre-order.
fn collect_symbols(node: &Node, table: &mut SymbolTable) {
    match node {
        Node::Symbol(text) => {
            table.intern(text);
        }
        Node::List(items) | Node::SExp(items) => {
            for item in items {
                collect_symbols(item, table);
            }
        }
        Node::Struct(fields) => {
            for (name, value) in fields {
                table.intern(name);
                collect_symbols(value, table);
            }
        }
        Node::Null | Node::Bool(_) | Node::Int(_) | Node::String(_) => {}
    }
}

fn write_node<W: IonWriter>(writer: &mut W, node: &Node) -> IonResult<()> {
    match node {
        Node::Null => writer.write_null(IonType::Null),
        Node::Bool(value) => writer.write_bool(*value),
        Node::Int(value) => writer.write_i64(*value),
        Node::String(text) => writer.write_string(text.as_str()),
        Node::Symbol(text) => writer.write_symbol(text.as_str()),
        Node::List(items) => write_sequence(writer, IonType::List, items),
        Node::SExp(items) => write_sequence(writer, IonType::SExp, items),
        Node::Struct(fields) => {
            writer.step_in(IonType::Struct)?;
            for (name, value) in fields {
                writer.set_field_name(name.as_str());
                write_node(writer, value)?;
            }
            writer.step_out()
        }
    }
}

fn write_sequence<W: IonWriter>(writer: &mut W, ion_type: IonType, items: &[Node]) -> IonResult<()> {
    writer.step_in(ion_type)?;
    for item in items {
        write_node(writer, item)?;
    }
    writer.step_out()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_value;
    use crate::ion::VERSION_MARKER;
    use ion_rs::element::Element;

    fn sym(s: &str) -> Node {
        Node::Symbol(s.to_string())
    }

    fn table_of(texts: &[&str]) -> SymbolTable {
        let mut table = SymbolTable::new();
        for text in texts {
            table.intern(text);
        }
        table
    }

    #[test]
    fn test_starts_with_version_marker() {
        let root = Node::SExp(vec![sym("seq"), Node::Null]);
        let bytes = write_document(&root, &table_of(&["seq"])).unwrap();
        assert_eq!(&bytes[..4], &VERSION_MARKER);
    }

    #[test]
    fn test_every_node_kind_survives() {
        let root = Node::List(vec![
            Node::Null,
            Node::Bool(true),
            Node::Int(i64::MIN),
            Node::String("λ".to_string()),
            sym("a"),
            Node::SExp(vec![sym("b"), Node::Int(7)]),
            Node::Struct(vec![("c".to_string(), sym("a"))]),
        ]);
        let bytes = write_document(&root, &table_of(&["a", "b", "c"])).unwrap();
        let document = crate::ion::parse_document(&bytes, 8).unwrap();
        assert_eq!(document.root, root);
        assert_eq!(
            document.symbols,
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                Some("c".to_string())
            ]
        );
    }

    #[test]
    fn test_rejects_table_out_of_order() {
        let root = Node::SExp(vec![sym("a"), sym("b")]);
        assert!(matches!(
            write_document(&root, &table_of(&["b", "a"])),
            Err(ContainerError::SymbolTableMismatch(_))
        ));
        assert!(matches!(
            write_document(&root, &table_of(&["a"])),
            Err(ContainerError::SymbolTableMismatch(_))
        ));
    }

    #[test]
    fn test_library_reads_encoded_program() {
        let encoded = encode_value(&crate::ast::Program::empty());
        let bytes = write_document(&encoded.root, &encoded.symbols).unwrap();

        let values = Element::read_all(&bytes).unwrap();
        assert_eq!(values.len(), 1);
        let root = values.first().unwrap();
        assert_eq!(root.ion_type(), IonType::SExp);
        let head = root.as_sequence().unwrap().elements().next().unwrap();
        assert_eq!(head.as_symbol().unwrap().text(), Some("Laurel.Program"));
    }
}
