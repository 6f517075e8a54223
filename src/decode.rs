//! Wire tree to AST.
//!
//! Decoding is a recursive descent over the wire tree, parameterized by
//! the category expected at each position. Every composite goes through
//! the same three checks before any field is read:
//!
//! 1. it is an s-expression with at least the smallest arity of any
//!    variant of the expected category;
//! 2. its tag symbol names a variant of that category;
//! 3. its length is exactly the arity of that variant (or at least, for
//!    the variadic type constructors).
//!
//! The first violation aborts the whole decode. There is no recovery and
//! no partial result.

use thiserror::Error;

use crate::ast::{
    Body, CompositeType, ConstrainedType, ContractType, Field, HighType, Operation, Parameter,
    Procedure, Program, StmtExpr, TypeDefinition,
};
use crate::config::{CodecConfig, DEFAULT_MAX_DEPTH};
use crate::stack;
use crate::wire::tag::Arity;
use crate::wire::{Category, Keyword, Node, Tag, HEADER_LEN};

/// Structural mismatch between a wire tree and the AST schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Element count does not fit the construct.
    #[error("{construct}: expected {expected} element(s), found {found}")]
    Arity {
        /// Tag or category being decoded.
        construct: String,
        /// Element count the construct requires.
        expected: Arity,
        /// Element count present.
        found: usize,
    },

    /// Tag does not name a variant of the expected category.
    #[error("{expected}: unrecognized tag `{found}`")]
    UnknownTag {
        /// Category that was expected.
        expected: &'static str,
        /// Tag text found.
        found: String,
    },

    /// A leaf or composite was expected and something else was found.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// What the position requires.
        expected: &'static str,
        /// Short description of the node found.
        found: String,
    },

    /// An `option` or `seq` wrapper is malformed.
    #[error("malformed `{wrapper}`: {detail}")]
    Shape {
        /// `option` or `seq`.
        wrapper: &'static str,
        /// What is wrong with it.
        detail: String,
    },

    /// The tree nests deeper than the configured limit.
    #[error("nesting exceeds the depth limit of {limit}")]
    DepthLimit {
        /// The configured depth limit.
        limit: usize,
    },

    /// The thread that runs the decode could not be started.
    #[error("cannot start decoder thread: {0}")]
    Spawn(String),
}

type Result<T> = std::result::Result<T, DecodeError>;

/// Types that can be rebuilt from a wire tree.
pub trait Decode: Sized {
    /// Decode `node`, descending through `dec` for children.
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self>;
}

/// One decode session. Tracks recursion depth against the limit.
#[derive(Debug)]
pub struct Decoder {
    depth: usize,
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Decoder {
    /// A session that descends at most `max_depth` levels.
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// A session bounded by `config.max_depth`.
    pub fn with_config(config: &CodecConfig) -> Self {
        Self::new(config.max_depth)
    }

    /// Decode a child node one level deeper.
    pub fn decode<T: Decode>(&mut self, node: &Node) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(DecodeError::DepthLimit {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = T::decode(self, node);
        self.depth -= 1;
        result
    }

    /// [`Decoder::decode`] into a box.
    pub fn boxed<T: Decode>(&mut self, node: &Node) -> Result<Box<T>> {
        self.decode(node).map(Box::new)
    }

    /// `(option null)` or `(option null payload)`.
    pub fn option<T: Decode>(&mut self, node: &Node) -> Result<Option<T>> {
        let items = wrapper(node, Keyword::Option)?;
        match items.len() {
            2 => Ok(None),
            3 => self.decode(&items[2]).map(Some),
            n => Err(DecodeError::Shape {
                wrapper: Keyword::Option.as_str(),
                detail: format!("expected 2 or 3 elements, found {}", n),
            }),
        }
    }

    /// [`Decoder::option`] with the payload boxed.
    pub fn option_boxed<T: Decode>(&mut self, node: &Node) -> Result<Option<Box<T>>> {
        self.option(node).map(|value| value.map(Box::new))
    }

    /// `(seq null items...)`.
    pub fn seq<T: Decode>(&mut self, node: &Node) -> Result<Vec<T>> {
        let items = wrapper(node, Keyword::Seq)?;
        items[HEADER_LEN..]
            .iter()
            .map(|item| self.decode(item))
            .collect()
    }

    /// Decode the tail of a variadic composite.
    fn all<T: Decode>(&mut self, nodes: &[Node]) -> Result<Vec<T>> {
        nodes.iter().map(|node| self.decode(node)).collect()
    }
}

// ========== Shape checks ==========

/// Check a keyword-headed wrapper and return its elements.
fn wrapper(node: &Node, keyword: Keyword) -> Result<&[Node]> {
    let shape = |detail: String| DecodeError::Shape {
        wrapper: keyword.as_str(),
        detail,
    };
    let items = node
        .as_sexp()
        .ok_or_else(|| shape(format!("expected an s-expression, found {}", node.describe())))?;
    if items.first().and_then(Node::as_symbol) != Some(keyword.as_str()) {
        return Err(shape(format!("wrong head, found {}", node.describe())));
    }
    if items.len() < HEADER_LEN {
        return Err(shape("missing annotation slot".to_string()));
    }
    Ok(items)
}

/// `(keyword null value)` with the value pulled out by `extract`.
fn leaf<'n, T>(
    node: &'n Node,
    keyword: Keyword,
    expected: &'static str,
    extract: impl FnOnce(&'n Node) -> Option<T>,
) -> Result<T> {
    let mismatch = || DecodeError::TypeMismatch {
        expected,
        found: node.describe(),
    };
    match node.as_sexp() {
        Some([head, _, value]) if head.as_symbol() == Some(keyword.as_str()) => {
            extract(value).ok_or_else(mismatch)
        }
        _ => Err(mismatch()),
    }
}

/// Run the category checks and return the tag with its field nodes.
pub fn composite(node: &Node, category: Category) -> Result<(Tag, &[Node])> {
    let items = node.as_sexp().ok_or_else(|| DecodeError::TypeMismatch {
        expected: category.name(),
        found: node.describe(),
    })?;

    let min = category.min_arity();
    if items.len() < min {
        return Err(DecodeError::Arity {
            construct: category.name().to_string(),
            expected: Arity::AtLeast(min),
            found: items.len(),
        });
    }

    if category.is_ident_headed() && items[0].as_symbol() != Some(Keyword::Ident.as_str()) {
        return Err(DecodeError::UnknownTag {
            expected: category.name(),
            found: items[0].describe(),
        });
    }

    let text = items[category.tag_index()]
        .as_symbol()
        .ok_or_else(|| DecodeError::TypeMismatch {
            expected: "tag symbol",
            found: items[category.tag_index()].describe(),
        })?;
    let tag = Tag::lookup(category, text).ok_or_else(|| DecodeError::UnknownTag {
        expected: category.name(),
        found: text.to_string(),
    })?;

    if !tag.arity().accepts(items.len()) {
        return Err(DecodeError::Arity {
            construct: tag.as_str().to_string(),
            expected: tag.arity(),
            found: items.len(),
        });
    }
    log::trace!("decoding {}", tag);
    Ok((tag, &items[category.first_field()..]))
}

/// Reached only if the tag table and a match below disagree.
fn unhandled(tag: Tag) -> DecodeError {
    DecodeError::UnknownTag {
        expected: tag.category().name(),
        found: tag.as_str().to_string(),
    }
}

// ========== Leaves ==========

impl Decode for String {
    fn decode(_: &mut Decoder, node: &Node) -> Result<Self> {
        leaf(node, Keyword::StrLit, "strlit", |value| match value {
            Node::String(s) => Some(s.clone()),
            _ => None,
        })
    }
}

impl Decode for i64 {
    fn decode(_: &mut Decoder, node: &Node) -> Result<Self> {
        leaf(node, Keyword::Num, "num", |value| match value {
            Node::Int(n) => Some(*n),
            _ => None,
        })
    }
}

impl Decode for bool {
    fn decode(_: &mut Decoder, node: &Node) -> Result<Self> {
        let inner = match node.as_sexp() {
            Some([head, inner]) if head.as_symbol() == Some(Keyword::Op.as_str()) => inner,
            _ => {
                return Err(DecodeError::TypeMismatch {
                    expected: "op",
                    found: node.describe(),
                })
            }
        };
        match inner.as_sexp() {
            Some([value, _]) => match value.as_symbol() {
                Some(s) if s == Keyword::True.as_str() => Ok(true),
                Some(s) if s == Keyword::False.as_str() => Ok(false),
                Some(s) => Err(DecodeError::UnknownTag {
                    expected: "boolean",
                    found: s.to_string(),
                }),
                None => Err(DecodeError::TypeMismatch {
                    expected: "boolean tag symbol",
                    found: value.describe(),
                }),
            },
            _ => Err(DecodeError::TypeMismatch {
                expected: "(Init.true null) or (Init.false null)",
                found: inner.describe(),
            }),
        }
    }
}

// ========== Types ==========

impl Decode for HighType {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (tag, f) = composite(node, Category::HighType)?;
        Ok(match tag {
            Tag::TVoid => HighType::TVoid,
            Tag::TBool => HighType::TBool,
            Tag::TInt => HighType::TInt,
            Tag::TFloat64 => HighType::TFloat64,
            Tag::UserDefined => HighType::UserDefined(dec.decode(&f[0])?),
            Tag::Applied => HighType::Applied {
                base: dec.boxed(&f[0])?,
                args: dec.all(&f[1..])?,
            },
            Tag::Pure => HighType::Pure(dec.boxed(&f[0])?),
            Tag::Intersection => HighType::Intersection(dec.all(f)?),
            other => return Err(unhandled(other)),
        })
    }
}

impl Decode for Operation {
    fn decode(_: &mut Decoder, node: &Node) -> Result<Self> {
        let (tag, _) = composite(node, Category::Operation)?;
        Operation::ALL
            .into_iter()
            .find(|op| op.tag() == tag)
            .ok_or_else(|| unhandled(tag))
    }
}

impl Decode for ContractType {
    fn decode(_: &mut Decoder, node: &Node) -> Result<Self> {
        let (tag, _) = composite(node, Category::ContractType)?;
        ContractType::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| unhandled(tag))
    }
}

// ========== Statements and expressions ==========

impl Decode for StmtExpr {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (tag, f) = composite(node, Category::StmtExpr)?;
        Ok(match tag {
            Tag::IfThenElse => StmtExpr::IfThenElse {
                cond: dec.boxed(&f[0])?,
                then_branch: dec.boxed(&f[1])?,
                else_branch: dec.option_boxed(&f[2])?,
            },
            Tag::Block => StmtExpr::Block {
                statements: dec.seq(&f[0])?,
                label: dec.option(&f[1])?,
            },
            Tag::LocalVariable => StmtExpr::LocalVariable {
                name: dec.decode(&f[0])?,
                ty: dec.decode(&f[1])?,
                initializer: dec.option_boxed(&f[2])?,
            },
            Tag::While => StmtExpr::While {
                cond: dec.boxed(&f[0])?,
                invariant: dec.option_boxed(&f[1])?,
                decreases: dec.option_boxed(&f[2])?,
                body: dec.boxed(&f[3])?,
            },
            Tag::Exit => StmtExpr::Exit(dec.decode(&f[0])?),
            Tag::Return => StmtExpr::Return(dec.option_boxed(&f[0])?),
            Tag::LiteralInt => StmtExpr::LiteralInt(dec.decode(&f[0])?),
            Tag::LiteralBool => StmtExpr::LiteralBool(dec.decode(&f[0])?),
            Tag::Identifier => StmtExpr::Identifier(dec.decode(&f[0])?),
            Tag::Assign => StmtExpr::Assign {
                target: dec.boxed(&f[0])?,
                value: dec.boxed(&f[1])?,
            },
            Tag::FieldSelect => StmtExpr::FieldSelect {
                target: dec.boxed(&f[0])?,
                field: dec.decode(&f[1])?,
            },
            Tag::PureFieldUpdate => StmtExpr::PureFieldUpdate {
                target: dec.boxed(&f[0])?,
                field: dec.decode(&f[1])?,
                value: dec.boxed(&f[2])?,
            },
            Tag::StaticCall => StmtExpr::StaticCall {
                callee: dec.decode(&f[0])?,
                args: dec.seq(&f[1])?,
            },
            Tag::PrimitiveOp => StmtExpr::PrimitiveOp {
                op: dec.decode(&f[0])?,
                args: dec.seq(&f[1])?,
            },
            Tag::This => StmtExpr::This,
            Tag::ReferenceEquals => StmtExpr::ReferenceEquals {
                lhs: dec.boxed(&f[0])?,
                rhs: dec.boxed(&f[1])?,
            },
            Tag::AsType => StmtExpr::AsType {
                target: dec.boxed(&f[0])?,
                ty: dec.decode(&f[1])?,
            },
            Tag::IsType => StmtExpr::IsType {
                target: dec.boxed(&f[0])?,
                ty: dec.decode(&f[1])?,
            },
            Tag::InstanceCall => StmtExpr::InstanceCall {
                target: dec.boxed(&f[0])?,
                callee: dec.decode(&f[1])?,
                args: dec.seq(&f[2])?,
            },
            Tag::Forall => StmtExpr::Forall {
                name: dec.decode(&f[0])?,
                ty: dec.decode(&f[1])?,
                body: dec.boxed(&f[2])?,
            },
            Tag::Exists => StmtExpr::Exists {
                name: dec.decode(&f[0])?,
                ty: dec.decode(&f[1])?,
                body: dec.boxed(&f[2])?,
            },
            Tag::Assigned => StmtExpr::Assigned(dec.boxed(&f[0])?),
            Tag::Old => StmtExpr::Old(dec.boxed(&f[0])?),
            Tag::Fresh => StmtExpr::Fresh(dec.boxed(&f[0])?),
            Tag::Assert => StmtExpr::Assert(dec.boxed(&f[0])?),
            Tag::Assume => StmtExpr::Assume(dec.boxed(&f[0])?),
            Tag::ProveBy => StmtExpr::ProveBy {
                value: dec.boxed(&f[0])?,
                proof: dec.boxed(&f[1])?,
            },
            Tag::ContractOf => StmtExpr::ContractOf {
                kind: dec.decode(&f[0])?,
                function: dec.boxed(&f[1])?,
            },
            Tag::StmtAbstract => StmtExpr::Abstract,
            Tag::All => StmtExpr::All,
            Tag::Hole => StmtExpr::Hole,
            other => return Err(unhandled(other)),
        })
    }
}

// ========== Declarations ==========

impl Decode for Parameter {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (_, f) = composite(node, Category::Parameter)?;
        Ok(Parameter {
            name: dec.decode(&f[0])?,
            ty: dec.decode(&f[1])?,
        })
    }
}

impl Decode for Field {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (_, f) = composite(node, Category::Field)?;
        Ok(Field {
            name: dec.decode(&f[0])?,
            is_mutable: dec.decode(&f[1])?,
            ty: dec.decode(&f[2])?,
        })
    }
}

impl Decode for Body {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (tag, f) = composite(node, Category::Body)?;
        Ok(match tag {
            Tag::Transparent => Body::Transparent(dec.decode(&f[0])?),
            Tag::Opaque => Body::Opaque {
                postcondition: dec.decode(&f[0])?,
                implementation: dec.option(&f[1])?,
            },
            Tag::AbstractBody => Body::Abstract(dec.decode(&f[0])?),
            other => return Err(unhandled(other)),
        })
    }
}

impl Decode for Procedure {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (_, f) = composite(node, Category::Procedure)?;
        Ok(Procedure {
            name: dec.decode(&f[0])?,
            inputs: dec.seq(&f[1])?,
            output: dec.decode(&f[2])?,
            precondition: dec.decode(&f[3])?,
            decreases: dec.decode(&f[4])?,
            deterministic: dec.decode(&f[5])?,
            reads: dec.option(&f[6])?,
            modifies: dec.decode(&f[7])?,
            body: dec.decode(&f[8])?,
        })
    }
}

impl Decode for CompositeType {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (_, f) = composite(node, Category::CompositeType)?;
        Ok(CompositeType {
            name: dec.decode(&f[0])?,
            extending: dec.seq(&f[1])?,
            fields: dec.seq(&f[2])?,
            instance_procedures: dec.seq(&f[3])?,
        })
    }
}

impl Decode for ConstrainedType {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (_, f) = composite(node, Category::ConstrainedType)?;
        Ok(ConstrainedType {
            name: dec.decode(&f[0])?,
            base: dec.decode(&f[1])?,
            value_name: dec.decode(&f[2])?,
            constraint: dec.decode(&f[3])?,
            witness: dec.decode(&f[4])?,
        })
    }
}

impl Decode for TypeDefinition {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (tag, f) = composite(node, Category::TypeDefinition)?;
        Ok(match tag {
            Tag::Composite => TypeDefinition::Composite(dec.decode(&f[0])?),
            Tag::Constrainted => TypeDefinition::Constrained(dec.decode(&f[0])?),
            other => return Err(unhandled(other)),
        })
    }
}

impl Decode for Program {
    fn decode(dec: &mut Decoder, node: &Node) -> Result<Self> {
        let (_, f) = composite(node, Category::Program)?;
        Ok(Program {
            static_procedures: dec.seq(&f[0])?,
            static_fields: dec.seq(&f[1])?,
            types: dec.seq(&f[2])?,
        })
    }
}

/// Decode a program from a symbol-resolved wire tree with default limits.
pub fn decode_program(node: &Node) -> Result<Program> {
    decode_program_with_config(node, &CodecConfig::default())
}

/// Decode a program from a symbol-resolved wire tree.
///
/// Runs on a thread whose stack holds `config.max_depth` levels, so any
/// tree is either decoded or rejected with [`DecodeError::DepthLimit`].
pub fn decode_program_with_config(node: &Node, config: &CodecConfig) -> Result<Program> {
    stack::with_stack(config.max_depth, || Decoder::with_config(config).decode(node))
        .map_err(|err| DecodeError::Spawn(err.to_string()))?
}
