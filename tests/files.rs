use std::fs;

use laurel_ion::ast::{CompositeType, Field, HighType, Operation, Procedure, Program, StmtExpr};
use laurel_ion::{read_program_file, write_program_file, CodecConfig, Error, FileError};

fn linked_list() -> Program {
    let length = Procedure::builder("length")
        .input("this", HighType::user_defined("Node"))
        .output(HighType::TInt)
        .deterministic(true)
        .reads(StmtExpr::ident("this"))
        .opaque_body(
            StmtExpr::binary(
                Operation::Geq,
                StmtExpr::ident("result"),
                StmtExpr::int(1),
            ),
            None,
        )
        .build()
        .unwrap();

    Program::builder()
        .composite_type(CompositeType {
            name: "Node".to_string(),
            extending: vec![],
            fields: vec![
                Field::mutable("value", HighType::TInt),
                Field::mutable("next", HighType::user_defined("Node")),
            ],
            instance_procedures: vec![length],
        })
        .build()
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.ion");
    let program = linked_list();

    write_program_file(&path, &program).unwrap();
    assert_eq!(fs::read(&path).unwrap(), laurel_ion::encode(&program).unwrap());
    assert_eq!(read_program_file(&path).unwrap(), program);
}

#[test]
fn test_symbols_of_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.ion");
    write_program_file(&path, &linked_list()).unwrap();

    let bytes = fs::read(&path).unwrap();
    let symbols = laurel_ion::read_symbols(&bytes, &CodecConfig::default()).unwrap();
    assert_eq!(symbols[0].as_deref(), Some("Laurel.Program"));
    assert!(symbols.iter().any(|s| s.as_deref() == Some("Laurel.Composite")));
    assert!(symbols.iter().all(Option::is_some));
}

#[test]
fn test_truncated_file_is_container_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.ion");
    let bytes = laurel_ion::encode(&linked_list()).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    match read_program_file(&path) {
        Err(FileError::Codec(err @ Error::Container(_))) => assert!(err.is_container()),
        other => panic!("expected a container error, got {:?}", other),
    }
}
