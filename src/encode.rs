//! AST to wire tree.
//!
//! Encoding is total: every AST value has exactly one wire form, so
//! nothing here can fail. Each composite is emitted as its head symbols,
//! the annotation slot, then its fields in declaration order. Symbols are
//! interned as they are emitted, which makes the symbol table order a
//! pre-order, left-to-right walk of the tree.

use crate::ast::{
    Body, CompositeType, ConstrainedType, ContractType, Field, HighType, Operation, Parameter,
    Procedure, Program, StmtExpr, TypeDefinition,
};
use crate::intern::SymbolTable;
use crate::wire::{Keyword, Node, Tag};

/// Types with a wire form.
pub trait Encode {
    /// Emit this value, interning every symbol it uses.
    fn encode(&self, enc: &mut Encoder) -> Node;
}

/// Result of encoding one root value.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// The wire tree.
    pub root: Node,
    /// Every symbol used by `root`, in first-use order.
    pub symbols: SymbolTable,
}

/// One encode session. Owns the symbol table for a single tree.
#[derive(Debug, Default)]
pub struct Encoder {
    symbols: SymbolTable,
}

impl Encoder {
    /// Start a session with an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbols interned so far.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// End the session, keeping its symbol table.
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    /// Intern `text` and return it as a symbol node.
    pub fn symbol(&mut self, text: &str) -> Node {
        self.symbols.intern(text);
        Node::Symbol(text.to_string())
    }

    /// Intern a protocol keyword and return it as a symbol node.
    pub fn keyword(&mut self, keyword: Keyword) -> Node {
        self.symbol(keyword.as_str())
    }

    /// `(head null items...)` for a keyword head.
    fn wrapper(&mut self, keyword: Keyword, items: impl FnOnce(&mut Self) -> Vec<Node>) -> Node {
        let mut nodes = vec![self.keyword(keyword), Node::Null];
        nodes.extend(items(self));
        Node::SExp(nodes)
    }

    /// Emit a composite for `tag`, with `fields` produced after the head.
    pub fn composite(&mut self, tag: Tag, fields: impl FnOnce(&mut Self) -> Vec<Node>) -> Node {
        let mut nodes = Vec::with_capacity(tag.arity().min());
        if tag.category().is_ident_headed() {
            nodes.push(self.keyword(Keyword::Ident));
            nodes.push(Node::Null);
            nodes.push(self.symbol(tag.as_str()));
        } else {
            nodes.push(self.symbol(tag.as_str()));
            nodes.push(Node::Null);
        }
        nodes.extend(fields(self));
        Node::SExp(nodes)
    }

    /// A composite with no fields.
    pub fn bare(&mut self, tag: Tag) -> Node {
        self.composite(tag, |_| Vec::new())
    }

    /// `(strlit null "s")`
    pub fn string(&mut self, s: &str) -> Node {
        self.wrapper(Keyword::StrLit, |_| vec![Node::String(s.to_string())])
    }

    /// `(num null n)`
    pub fn num(&mut self, n: i64) -> Node {
        self.wrapper(Keyword::Num, |_| vec![Node::Int(n)])
    }

    /// `(op (Init.true null))` or `(op (Init.false null))`
    pub fn bool(&mut self, b: bool) -> Node {
        let op = self.keyword(Keyword::Op);
        let value = self.keyword(Keyword::for_bool(b));
        Node::SExp(vec![op, Node::SExp(vec![value, Node::Null])])
    }

    /// `(option null)` when absent, `(option null payload)` when present.
    pub fn option<T: Encode + ?Sized>(&mut self, value: Option<&T>) -> Node {
        self.wrapper(Keyword::Option, |enc| match value {
            Some(v) => vec![v.encode(enc)],
            None => Vec::new(),
        })
    }

    /// `(seq null items...)`
    pub fn seq<T: Encode>(&mut self, items: &[T]) -> Node {
        self.wrapper(Keyword::Seq, |enc| {
            items.iter().map(|item| item.encode(enc)).collect()
        })
    }

    /// Encode a child value in this session.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Node {
        value.encode(self)
    }
}

/// Encode any value in a fresh session.
pub fn encode_value<T: Encode + ?Sized>(value: &T) -> Encoded {
    let mut enc = Encoder::new();
    let root = value.encode(&mut enc);
    Encoded {
        root,
        symbols: enc.into_symbols(),
    }
}

/// Encode a program in a fresh session.
pub fn encode_program(program: &Program) -> Encoded {
    encode_value(program)
}

// ========== Primitive implementations ==========

impl Encode for str {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.string(self)
    }
}

impl Encode for String {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.string(self)
    }
}

impl Encode for i64 {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.num(*self)
    }
}

impl Encode for bool {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.bool(*self)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, enc: &mut Encoder) -> Node {
        (**self).encode(enc)
    }
}

// ========== Types ==========

impl Encode for HighType {
    fn encode(&self, enc: &mut Encoder) -> Node {
        match self {
            HighType::TVoid => enc.bare(Tag::TVoid),
            HighType::TBool => enc.bare(Tag::TBool),
            HighType::TInt => enc.bare(Tag::TInt),
            HighType::TFloat64 => enc.bare(Tag::TFloat64),
            HighType::UserDefined(name) => enc.composite(Tag::UserDefined, |enc| vec![enc.string(name)]),
            HighType::Applied { base, args } => enc.composite(Tag::Applied, |enc| {
                let mut fields = vec![base.encode(enc)];
                fields.extend(args.iter().map(|arg| arg.encode(enc)));
                fields
            }),
            HighType::Pure(base) => enc.composite(Tag::Pure, |enc| vec![base.encode(enc)]),
            HighType::Intersection(types) => enc.composite(Tag::Intersection, |enc| {
                types.iter().map(|ty| ty.encode(enc)).collect()
            }),
        }
    }
}

impl Operation {
    /// Wire tag of the operator.
    pub fn tag(self) -> Tag {
        match self {
            Operation::Eq => Tag::Eq,
            Operation::Neq => Tag::Neq,
            Operation::And => Tag::And,
            Operation::Or => Tag::Or,
            Operation::Not => Tag::Not,
            Operation::Neg => Tag::Neg,
            Operation::Add => Tag::Add,
            Operation::Sub => Tag::Sub,
            Operation::Mul => Tag::Mul,
            Operation::Div => Tag::Div,
            Operation::Mod => Tag::Mod,
            Operation::Lt => Tag::Lt,
            Operation::Leq => Tag::Leq,
            Operation::Gt => Tag::Gt,
            Operation::Geq => Tag::Geq,
        }
    }
}

impl Encode for Operation {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.bare(self.tag())
    }
}

impl ContractType {
    /// Wire tag of the contract kind.
    pub fn tag(self) -> Tag {
        match self {
            ContractType::Reads => Tag::Reads,
            ContractType::Modifies => Tag::Modifies,
            ContractType::Precondition => Tag::Precondition,
            ContractType::Postcondition => Tag::PostCondition,
        }
    }
}

impl Encode for ContractType {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.bare(self.tag())
    }
}

// ========== Statements and expressions ==========

impl Encode for StmtExpr {
    fn encode(&self, enc: &mut Encoder) -> Node {
        match self {
            StmtExpr::IfThenElse {
                cond,
                then_branch,
                else_branch,
            } => enc.composite(Tag::IfThenElse, |enc| {
                vec![
                    cond.encode(enc),
                    then_branch.encode(enc),
                    enc.option(else_branch.as_deref()),
                ]
            }),
            StmtExpr::Block { statements, label } => enc.composite(Tag::Block, |enc| {
                vec![enc.seq(statements), enc.option(label.as_deref())]
            }),
            StmtExpr::LocalVariable {
                name,
                ty,
                initializer,
            } => enc.composite(Tag::LocalVariable, |enc| {
                vec![
                    enc.string(name),
                    ty.encode(enc),
                    enc.option(initializer.as_deref()),
                ]
            }),
            StmtExpr::While {
                cond,
                invariant,
                decreases,
                body,
            } => enc.composite(Tag::While, |enc| {
                vec![
                    cond.encode(enc),
                    enc.option(invariant.as_deref()),
                    enc.option(decreases.as_deref()),
                    body.encode(enc),
                ]
            }),
            StmtExpr::Exit(target) => enc.composite(Tag::Exit, |enc| vec![enc.string(target)]),
            StmtExpr::Return(value) => {
                enc.composite(Tag::Return, |enc| vec![enc.option(value.as_deref())])
            }
            StmtExpr::LiteralInt(n) => enc.composite(Tag::LiteralInt, |enc| vec![enc.num(*n)]),
            StmtExpr::LiteralBool(b) => enc.composite(Tag::LiteralBool, |enc| vec![enc.bool(*b)]),
            StmtExpr::Identifier(name) => {
                enc.composite(Tag::Identifier, |enc| vec![enc.string(name)])
            }
            StmtExpr::Assign { target, value } => enc.composite(Tag::Assign, |enc| {
                vec![target.encode(enc), value.encode(enc)]
            }),
            StmtExpr::FieldSelect { target, field } => enc.composite(Tag::FieldSelect, |enc| {
                vec![target.encode(enc), enc.string(field)]
            }),
            StmtExpr::PureFieldUpdate {
                target,
                field,
                value,
            } => enc.composite(Tag::PureFieldUpdate, |enc| {
                vec![target.encode(enc), enc.string(field), value.encode(enc)]
            }),
            StmtExpr::StaticCall { callee, args } => enc.composite(Tag::StaticCall, |enc| {
                vec![enc.string(callee), enc.seq(args)]
            }),
            StmtExpr::PrimitiveOp { op, args } => enc.composite(Tag::PrimitiveOp, |enc| {
                vec![op.encode(enc), enc.seq(args)]
            }),
            StmtExpr::This => enc.bare(Tag::This),
            StmtExpr::ReferenceEquals { lhs, rhs } => enc.composite(Tag::ReferenceEquals, |enc| {
                vec![lhs.encode(enc), rhs.encode(enc)]
            }),
            StmtExpr::AsType { target, ty } => enc.composite(Tag::AsType, |enc| {
                vec![target.encode(enc), ty.encode(enc)]
            }),
            StmtExpr::IsType { target, ty } => enc.composite(Tag::IsType, |enc| {
                vec![target.encode(enc), ty.encode(enc)]
            }),
            StmtExpr::InstanceCall {
                target,
                callee,
                args,
            } => enc.composite(Tag::InstanceCall, |enc| {
                vec![target.encode(enc), enc.string(callee), enc.seq(args)]
            }),
            StmtExpr::Forall { name, ty, body } => enc.composite(Tag::Forall, |enc| {
                vec![enc.string(name), ty.encode(enc), body.encode(enc)]
            }),
            StmtExpr::Exists { name, ty, body } => enc.composite(Tag::Exists, |enc| {
                vec![enc.string(name), ty.encode(enc), body.encode(enc)]
            }),
            StmtExpr::Assigned(e) => enc.composite(Tag::Assigned, |enc| vec![e.encode(enc)]),
            StmtExpr::Old(e) => enc.composite(Tag::Old, |enc| vec![e.encode(enc)]),
            StmtExpr::Fresh(e) => enc.composite(Tag::Fresh, |enc| vec![e.encode(enc)]),
            StmtExpr::Assert(e) => enc.composite(Tag::Assert, |enc| vec![e.encode(enc)]),
            StmtExpr::Assume(e) => enc.composite(Tag::Assume, |enc| vec![e.encode(enc)]),
            StmtExpr::ProveBy { value, proof } => enc.composite(Tag::ProveBy, |enc| {
                vec![value.encode(enc), proof.encode(enc)]
            }),
            StmtExpr::ContractOf { kind, function } => enc.composite(Tag::ContractOf, |enc| {
                vec![kind.encode(enc), function.encode(enc)]
            }),
            StmtExpr::Abstract => enc.bare(Tag::StmtAbstract),
            StmtExpr::All => enc.bare(Tag::All),
            StmtExpr::Hole => enc.bare(Tag::Hole),
        }
    }
}

// ========== Declarations ==========

impl Encode for Parameter {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.composite(Tag::Parameter, |enc| {
            vec![enc.string(&self.name), self.ty.encode(enc)]
        })
    }
}

impl Encode for Field {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.composite(Tag::Field, |enc| {
            vec![
                enc.string(&self.name),
                enc.bool(self.is_mutable),
                self.ty.encode(enc),
            ]
        })
    }
}

impl Encode for Body {
    fn encode(&self, enc: &mut Encoder) -> Node {
        match self {
            Body::Transparent(body) => enc.composite(Tag::Transparent, |enc| vec![body.encode(enc)]),
            Body::Opaque {
                postcondition,
                implementation,
            } => enc.composite(Tag::Opaque, |enc| {
                vec![
                    postcondition.encode(enc),
                    enc.option(implementation.as_ref()),
                ]
            }),
            Body::Abstract(postcondition) => {
                enc.composite(Tag::AbstractBody, |enc| vec![postcondition.encode(enc)])
            }
        }
    }
}

impl Encode for Procedure {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.composite(Tag::Procedure, |enc| {
            vec![
                enc.string(&self.name),
                enc.seq(&self.inputs),
                self.output.encode(enc),
                self.precondition.encode(enc),
                self.decreases.encode(enc),
                enc.bool(self.deterministic),
                enc.option(self.reads.as_ref()),
                self.modifies.encode(enc),
                self.body.encode(enc),
            ]
        })
    }
}

impl Encode for CompositeType {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.composite(Tag::CompositeType, |enc| {
            vec![
                enc.string(&self.name),
                enc.seq(&self.extending),
                enc.seq(&self.fields),
                enc.seq(&self.instance_procedures),
            ]
        })
    }
}

impl Encode for ConstrainedType {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.composite(Tag::ConstrainedType, |enc| {
            vec![
                enc.string(&self.name),
                self.base.encode(enc),
                enc.string(&self.value_name),
                self.constraint.encode(enc),
                self.witness.encode(enc),
            ]
        })
    }
}

impl Encode for TypeDefinition {
    fn encode(&self, enc: &mut Encoder) -> Node {
        match self {
            TypeDefinition::Composite(ty) => enc.composite(Tag::Composite, |enc| vec![ty.encode(enc)]),
            TypeDefinition::Constrained(ty) => {
                enc.composite(Tag::Constrainted, |enc| vec![ty.encode(enc)])
            }
        }
    }
}

impl Encode for Program {
    fn encode(&self, enc: &mut Encoder) -> Node {
        enc.composite(Tag::Program, |enc| {
            vec![
                enc.seq(&self.static_procedures),
                enc.seq(&self.static_fields),
                enc.seq(&self.types),
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Node {
        Node::Symbol(s.to_string())
    }

    fn sexp(items: Vec<Node>) -> Node {
        Node::SExp(items)
    }

    fn empty_seq() -> Node {
        sexp(vec![sym("seq"), Node::Null])
    }

    #[test]
    fn test_empty_program() {
        let encoded = encode_program(&Program::empty());
        assert_eq!(
            encoded.root,
            sexp(vec![
                sym("Laurel.Program"),
                Node::Null,
                empty_seq(),
                empty_seq(),
                empty_seq(),
            ])
        );
        assert_eq!(encoded.symbols.symbols(), ["Laurel.Program", "seq"]);
    }

    #[test]
    fn test_bool_literal_uses_op_keyword() {
        let encoded = encode_value(&StmtExpr::bool(true));
        let op_true = sexp(vec![sym("op"), sexp(vec![sym("Init.true"), Node::Null])]);
        assert_eq!(
            encoded.root,
            sexp(vec![sym("Laurel.LiteralBool"), Node::Null, op_true])
        );

        let encoded = encode_value(&StmtExpr::bool(false));
        assert_eq!(
            encoded.symbols.symbols(),
            ["Laurel.LiteralBool", "op", "Init.false"]
        );
    }

    #[test]
    fn test_option_absent_and_present() {
        let absent = encode_value(&StmtExpr::return_value(None)).root;
        let option = &absent.as_sexp().unwrap()[2];
        assert_eq!(option, &sexp(vec![sym("option"), Node::Null]));

        let present = encode_value(&StmtExpr::return_value(Some(StmtExpr::int(7)))).root;
        let option = present.as_sexp().unwrap()[2].as_sexp().unwrap();
        assert_eq!(option.len(), 3);
        assert_eq!(
            option[2],
            sexp(vec![
                sym("Laurel.LiteralInt"),
                Node::Null,
                sexp(vec![sym("num"), Node::Null, Node::Int(7)]),
            ])
        );
    }

    #[test]
    fn test_ident_headed_types() {
        let root = encode_value(&HighType::TInt).root;
        assert_eq!(root, sexp(vec![sym("ident"), Node::Null, sym("Laurel.TInt")]));

        let root = encode_value(&HighType::user_defined("Box")).root;
        assert_eq!(
            root,
            sexp(vec![
                sym("ident"),
                Node::Null,
                sym("Laurel.UserDefined"),
                sexp(vec![sym("strlit"), Node::Null, Node::String("Box".to_string())]),
            ])
        );
    }

    #[test]
    fn test_applied_args_are_inline() {
        let ty = HighType::applied(HighType::user_defined("Map"), vec![HighType::TInt, HighType::TBool]);
        let root = encode_value(&ty).root;
        assert_eq!(root.as_sexp().unwrap().len(), 6);
    }

    #[test]
    fn test_names_are_strings_not_symbols() {
        let encoded = encode_value(&StmtExpr::ident("Laurel.Program"));
        assert_eq!(encoded.symbols.symbols(), ["Laurel.Identifier", "strlit"]);
    }

    #[test]
    fn test_symbol_order_is_pre_order() {
        let stmt = StmtExpr::assign(StmtExpr::ident("x"), StmtExpr::int(1));
        let encoded = encode_value(&stmt);
        assert_eq!(
            encoded.symbols.symbols(),
            [
                "Laurel.Assign",
                "Laurel.Identifier",
                "strlit",
                "Laurel.LiteralInt",
                "num"
            ]
        );
    }

    #[test]
    fn test_abstract_tags_share_spelling() {
        let stmt = encode_value(&StmtExpr::Abstract).root;
        let body = encode_value(&Body::Abstract(StmtExpr::bool(true))).root;
        assert_eq!(stmt.head(), Some("Laurel.Abstract"));
        assert_eq!(body.head(), Some("Laurel.Abstract"));
        assert_eq!(stmt.as_sexp().unwrap().len(), 2);
        assert_eq!(body.as_sexp().unwrap().len(), 3);
    }

    #[test]
    fn test_constrained_definition_tag() {
        let def = TypeDefinition::Constrained(ConstrainedType {
            name: "Pos".to_string(),
            base: HighType::TInt,
            value_name: "v".to_string(),
            constraint: StmtExpr::binary(Operation::Gt, StmtExpr::ident("v"), StmtExpr::int(0)),
            witness: StmtExpr::int(1),
        });
        assert_eq!(encode_value(&def).root.head(), Some("Laurel.Constrainted"));
    }

    #[test]
    fn test_procedure_arity() {
        let procedure = Procedure::builder("f")
            .output(HighType::TVoid)
            .transparent_body(StmtExpr::block(vec![]))
            .build()
            .unwrap();
        let root = encode_value(&procedure).root;
        assert_eq!(root.as_sexp().unwrap().len(), Tag::Procedure.arity().min());
    }

    #[test]
    fn test_every_tag_arity_matches_encoding() {
        let samples: Vec<Node> = vec![
            encode_value(&HighType::pure(HighType::TBool)).root,
            encode_value(&HighType::Intersection(vec![])).root,
            encode_value(&Operation::Leq).root,
            encode_value(&ContractType::Postcondition).root,
            encode_value(&Field::mutable("f", HighType::TInt)).root,
            encode_value(&Parameter::new("p", HighType::TInt)).root,
        ];
        for node in samples {
            let items = node.as_sexp().unwrap();
            let category_tag = items
                .iter()
                .filter_map(Node::as_symbol)
                .find(|s| s.starts_with("Laurel."))
                .unwrap();
            let tag = Tag::ALL.iter().find(|t| t.as_str() == category_tag).unwrap();
            assert!(tag.arity().accepts(items.len()), "{}", node);
        }
    }
}
