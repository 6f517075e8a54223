//! Every tag in the table is produced by the encoder and read back by the
//! decoder.

use std::collections::HashSet;
use std::fmt::Debug;

use laurel_ion::ast::{
    Body, CompositeType, ConstrainedType, ContractType, Field, HighType, Operation, Parameter,
    Procedure, Program, StmtExpr, TypeDefinition,
};
use laurel_ion::decode::composite;
use laurel_ion::encode::encode_value;
use laurel_ion::wire::Category;
use laurel_ion::{Decode, Decoder, Encode, Tag};

#[derive(Default)]
struct Coverage {
    seen: HashSet<Tag>,
}

impl Coverage {
    /// Encode `value`, record the tag at its root, and decode it back.
    fn check<T>(&mut self, category: Category, value: T)
    where
        T: Encode + Decode + PartialEq + Debug,
    {
        let root = encode_value(&value).root;
        let (tag, _) = composite(&root, category)
            .unwrap_or_else(|err| panic!("{:?} does not encode as a {:?}: {}", value, category, err));
        assert_eq!(tag.category(), category);
        assert!(self.seen.insert(tag), "two samples encode as {}", tag.as_str());

        let decoded: T = Decoder::default()
            .decode(&root)
            .unwrap_or_else(|err| panic!("{} does not decode: {}", tag.as_str(), err));
        assert_eq!(decoded, value, "{}", tag.as_str());
    }
}

fn b(stmt: StmtExpr) -> Box<StmtExpr> {
    Box::new(stmt)
}

fn high_types() -> Vec<HighType> {
    vec![
        HighType::TVoid,
        HighType::TBool,
        HighType::TInt,
        HighType::TFloat64,
        HighType::user_defined("Node"),
        HighType::applied(HighType::user_defined("List"), vec![HighType::TInt]),
        HighType::pure(HighType::user_defined("Node")),
        HighType::Intersection(vec![HighType::TInt, HighType::TBool]),
    ]
}

fn stmt_exprs() -> Vec<StmtExpr> {
    use StmtExpr as S;
    let x = || S::ident("x");
    vec![
        S::if_then_else(S::bool(true), S::int(1), Some(S::int(2))),
        S::block(vec![S::int(1)]),
        S::local("x", HighType::TInt, Some(S::int(0))),
        S::While {
            cond: b(S::bool(true)),
            invariant: Some(b(S::bool(true))),
            decreases: None,
            body: b(S::block(vec![])),
        },
        S::Exit("loop".to_string()),
        S::return_value(None),
        S::int(-7),
        S::bool(false),
        x(),
        S::assign(x(), S::int(1)),
        S::field(x(), "next"),
        S::PureFieldUpdate {
            target: b(x()),
            field: "value".to_string(),
            value: b(S::int(3)),
        },
        S::call("f", vec![S::int(1)]),
        S::binary(Operation::Add, S::int(1), S::int(2)),
        S::This,
        S::ReferenceEquals {
            lhs: b(x()),
            rhs: b(S::This),
        },
        S::AsType {
            target: b(x()),
            ty: HighType::user_defined("Node"),
        },
        S::IsType {
            target: b(x()),
            ty: HighType::user_defined("Node"),
        },
        S::InstanceCall {
            target: b(x()),
            callee: "length".to_string(),
            args: vec![S::int(0)],
        },
        S::forall("i", HighType::TInt, S::bool(true)),
        S::exists("i", HighType::TInt, S::bool(false)),
        S::Assigned(b(x())),
        S::Old(b(x())),
        S::Fresh(b(x())),
        S::assert(S::bool(true)),
        S::assume(S::bool(true)),
        S::ProveBy {
            value: b(x()),
            proof: b(S::Hole),
        },
        S::ContractOf {
            kind: ContractType::Reads,
            function: b(S::ident("f")),
        },
        S::Abstract,
        S::All,
        S::Hole,
    ]
}

fn bodies() -> Vec<Body> {
    vec![
        Body::Transparent(StmtExpr::int(1)),
        Body::Opaque {
            postcondition: StmtExpr::bool(true),
            implementation: Some(StmtExpr::int(1)),
        },
        Body::Abstract(StmtExpr::bool(true)),
    ]
}

fn procedure() -> Procedure {
    Procedure::builder("f")
        .input("x", HighType::TInt)
        .output(HighType::TInt)
        .transparent_body(StmtExpr::ident("x"))
        .build()
        .unwrap()
}

fn composite_type() -> CompositeType {
    CompositeType {
        name: "Node".to_string(),
        extending: vec!["Object".to_string()],
        fields: vec![Field::mutable("next", HighType::user_defined("Node"))],
        instance_procedures: vec![procedure()],
    }
}

fn constrained_type() -> ConstrainedType {
    ConstrainedType {
        name: "Pos".to_string(),
        base: HighType::TInt,
        value_name: "v".to_string(),
        constraint: StmtExpr::binary(Operation::Gt, StmtExpr::ident("v"), StmtExpr::int(0)),
        witness: StmtExpr::int(1),
    }
}

#[test]
fn test_every_tag_is_encoded_and_decoded() {
    let mut coverage = Coverage::default();

    for ty in high_types() {
        coverage.check(Category::HighType, ty);
    }
    for stmt in stmt_exprs() {
        coverage.check(Category::StmtExpr, stmt);
    }
    for op in Operation::ALL {
        coverage.check(Category::Operation, op);
    }
    for kind in ContractType::ALL {
        coverage.check(Category::ContractType, kind);
    }
    coverage.check(Category::Parameter, Parameter::new("x", HighType::TInt));
    coverage.check(Category::Field, Field::immutable("origin", HighType::user_defined("Point")));
    coverage.check(Category::Procedure, procedure());
    for body in bodies() {
        coverage.check(Category::Body, body);
    }
    coverage.check(Category::CompositeType, composite_type());
    coverage.check(Category::ConstrainedType, constrained_type());
    coverage.check(Category::TypeDefinition, TypeDefinition::Composite(composite_type()));
    coverage.check(Category::TypeDefinition, TypeDefinition::Constrained(constrained_type()));
    coverage.check(
        Category::Program,
        Program::builder()
            .procedure(procedure())
            .composite_type(composite_type())
            .build(),
    );

    let all: HashSet<Tag> = Tag::ALL.iter().copied().collect();
    let missing: Vec<_> = all.difference(&coverage.seen).map(|tag| tag.as_str()).collect();
    assert!(missing.is_empty(), "tags never encoded: {:?}", missing);
    assert_eq!(coverage.seen, all);
}

#[test]
fn test_every_tag_survives_the_container() {
    // The same values, through bytes, inside one program.
    let program = Program::builder()
        .procedure(
            Procedure::builder("everything")
                .output(HighType::Intersection(high_types()))
                .transparent_body(StmtExpr::block(stmt_exprs()))
                .build()
                .unwrap(),
        )
        .composite_type(composite_type())
        .build();
    let bytes = laurel_ion::encode(&program).unwrap();
    assert_eq!(laurel_ion::decode(&bytes).unwrap(), program);
}
