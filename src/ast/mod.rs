//! Abstract Syntax Tree types for Laurel.
//!
//! The AST is a closed family of immutable values. Two hierarchies are
//! mutually recursive: [`HighType`] describes types and [`StmtExpr`] covers
//! statements and expressions alike (Laurel does not separate the two).
//! Declarations ([`Procedure`], [`Field`], [`TypeDefinition`], ...) sit on top
//! and [`Program`] is the root handed to the codec.
//!
//! Recursive positions are boxed so every node has a finite size; trees are
//! acyclic by construction, which is what lets encode and decode recurse by
//! structural descent.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

pub mod builder;

pub use builder::{BuildError, CompositeTypeBuilder, ProcedureBuilder, ProgramBuilder};

// ============================================================================
// Types
// ============================================================================

/// A Laurel type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighType {
    /// The unit type.
    TVoid,
    /// Booleans.
    TBool,
    /// Mathematical integers.
    TInt,
    /// IEEE 754 binary64.
    TFloat64,
    /// A reference to a named, user-declared type.
    UserDefined(String),
    /// A generic type applied to type arguments.
    Applied {
        /// The generic type being applied.
        base: Box<HighType>,
        /// Arguments, in declaration order.
        args: Vec<HighType>,
    },
    /// A type whose values carry no heap identity.
    Pure(Box<HighType>),
    /// Values inhabiting every member type. Empty means top.
    Intersection(Vec<HighType>),
}

impl HighType {
    /// Reference a user-defined type by name.
    pub fn user_defined(name: impl Into<String>) -> Self {
        HighType::UserDefined(name.into())
    }

    /// Apply `base` to `args`.
    pub fn applied(base: HighType, args: Vec<HighType>) -> Self {
        HighType::Applied {
            base: Box::new(base),
            args,
        }
    }

    /// Wrap `base` in `pure`.
    pub fn pure(base: HighType) -> Self {
        HighType::Pure(Box::new(base))
    }
}

// ============================================================================
// Operators and contract kinds
// ============================================================================

/// Built-in primitive operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Eq,
    Neq,
    And,
    Or,
    Not,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl Operation {
    /// Every operator, in declaration order.
    pub const ALL: [Operation; 15] = [
        Operation::Eq,
        Operation::Neq,
        Operation::And,
        Operation::Or,
        Operation::Not,
        Operation::Neg,
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Div,
        Operation::Mod,
        Operation::Lt,
        Operation::Leq,
        Operation::Gt,
        Operation::Geq,
    ];

    /// Whether the operator takes a single operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Operation::Not | Operation::Neg)
    }
}

/// Which contract of a procedure a `ContractOf` expression refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    Reads,
    Modifies,
    Precondition,
    Postcondition,
}

impl ContractType {
    /// Every contract kind, in declaration order.
    pub const ALL: [ContractType; 4] = [
        ContractType::Reads,
        ContractType::Modifies,
        ContractType::Precondition,
        ContractType::Postcondition,
    ];
}

// ============================================================================
// Statements and expressions
// ============================================================================

/// A statement or expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StmtExpr {
    // Statement-like
    IfThenElse {
        cond: Box<StmtExpr>,
        then_branch: Box<StmtExpr>,
        else_branch: Option<Box<StmtExpr>>,
    },
    Block {
        statements: Vec<StmtExpr>,
        label: Option<String>,
    },
    LocalVariable {
        name: String,
        ty: HighType,
        initializer: Option<Box<StmtExpr>>,
    },
    While {
        cond: Box<StmtExpr>,
        invariant: Option<Box<StmtExpr>>,
        decreases: Option<Box<StmtExpr>>,
        body: Box<StmtExpr>,
    },
    /// Leave the enclosing block with the given label.
    Exit(String),
    Return(Option<Box<StmtExpr>>),

    // Expression-like
    LiteralInt(i64),
    LiteralBool(bool),
    Identifier(String),
    Assign {
        target: Box<StmtExpr>,
        value: Box<StmtExpr>,
    },
    FieldSelect {
        target: Box<StmtExpr>,
        field: String,
    },
    /// Functional update: a copy of `target` with `field` replaced.
    PureFieldUpdate {
        target: Box<StmtExpr>,
        field: String,
        value: Box<StmtExpr>,
    },
    StaticCall {
        callee: String,
        args: Vec<StmtExpr>,
    },
    PrimitiveOp {
        op: Operation,
        args: Vec<StmtExpr>,
    },

    // Instance-related
    This,
    ReferenceEquals {
        lhs: Box<StmtExpr>,
        rhs: Box<StmtExpr>,
    },
    AsType {
        target: Box<StmtExpr>,
        ty: HighType,
    },
    IsType {
        target: Box<StmtExpr>,
        ty: HighType,
    },
    InstanceCall {
        target: Box<StmtExpr>,
        callee: String,
        args: Vec<StmtExpr>,
    },

    // Verification-specific
    Forall {
        name: String,
        ty: HighType,
        body: Box<StmtExpr>,
    },
    Exists {
        name: String,
        ty: HighType,
        body: Box<StmtExpr>,
    },
    Assigned(Box<StmtExpr>),
    Old(Box<StmtExpr>),
    Fresh(Box<StmtExpr>),

    // Proof-related
    Assert(Box<StmtExpr>),
    Assume(Box<StmtExpr>),
    ProveBy {
        value: Box<StmtExpr>,
        proof: Box<StmtExpr>,
    },
    ContractOf {
        kind: ContractType,
        function: Box<StmtExpr>,
    },
    Abstract,
    All,
    Hole,
}

impl StmtExpr {
    /// Integer literal.
    pub fn int(value: i64) -> Self {
        StmtExpr::LiteralInt(value)
    }

    /// Boolean literal.
    pub fn bool(value: bool) -> Self {
        StmtExpr::LiteralBool(value)
    }

    /// Variable reference.
    pub fn ident(name: impl Into<String>) -> Self {
        StmtExpr::Identifier(name.into())
    }

    /// Unlabeled block.
    pub fn block(statements: Vec<StmtExpr>) -> Self {
        StmtExpr::Block {
            statements,
            label: None,
        }
    }

    /// Block that `Exit` can target by name.
    pub fn labeled_block(label: impl Into<String>, statements: Vec<StmtExpr>) -> Self {
        StmtExpr::Block {
            statements,
            label: Some(label.into()),
        }
    }

    pub fn if_then_else(cond: StmtExpr, then_branch: StmtExpr, else_branch: Option<StmtExpr>) -> Self {
        StmtExpr::IfThenElse {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn local(name: impl Into<String>, ty: HighType, initializer: Option<StmtExpr>) -> Self {
        StmtExpr::LocalVariable {
            name: name.into(),
            ty,
            initializer: initializer.map(Box::new),
        }
    }

    pub fn assign(target: StmtExpr, value: StmtExpr) -> Self {
        StmtExpr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn field(target: StmtExpr, field: impl Into<String>) -> Self {
        StmtExpr::FieldSelect {
            target: Box::new(target),
            field: field.into(),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<StmtExpr>) -> Self {
        StmtExpr::StaticCall {
            callee: callee.into(),
            args,
        }
    }

    pub fn return_value(value: Option<StmtExpr>) -> Self {
        StmtExpr::Return(value.map(Box::new))
    }

    /// Apply a primitive operator.
    pub fn prim(op: Operation, args: Vec<StmtExpr>) -> Self {
        StmtExpr::PrimitiveOp { op, args }
    }

    /// Apply a binary primitive operator.
    pub fn binary(op: Operation, lhs: StmtExpr, rhs: StmtExpr) -> Self {
        StmtExpr::prim(op, vec![lhs, rhs])
    }

    pub fn not(operand: StmtExpr) -> Self {
        StmtExpr::prim(Operation::Not, vec![operand])
    }

    pub fn forall(name: impl Into<String>, ty: HighType, body: StmtExpr) -> Self {
        StmtExpr::Forall {
            name: name.into(),
            ty,
            body: Box::new(body),
        }
    }

    pub fn exists(name: impl Into<String>, ty: HighType, body: StmtExpr) -> Self {
        StmtExpr::Exists {
            name: name.into(),
            ty,
            body: Box::new(body),
        }
    }

    pub fn assert(cond: StmtExpr) -> Self {
        StmtExpr::Assert(Box::new(cond))
    }

    pub fn assume(cond: StmtExpr) -> Self {
        StmtExpr::Assume(Box::new(cond))
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// A procedure input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: HighType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: HighType) -> Self {
        Parameter {
            name: name.into(),
            ty,
        }
    }
}

/// A static or instance field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub is_mutable: bool,
    pub ty: HighType,
}

impl Field {
    pub fn new(name: impl Into<String>, is_mutable: bool, ty: HighType) -> Self {
        Field {
            name: name.into(),
            is_mutable,
            ty,
        }
    }

    pub fn mutable(name: impl Into<String>, ty: HighType) -> Self {
        Field::new(name, true, ty)
    }

    pub fn immutable(name: impl Into<String>, ty: HighType) -> Self {
        Field::new(name, false, ty)
    }
}

/// How much of a procedure's implementation callers may see.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    /// The implementation is visible to callers.
    Transparent(StmtExpr),
    /// Callers only see the postcondition; the implementation is optional.
    Opaque {
        postcondition: StmtExpr,
        implementation: Option<StmtExpr>,
    },
    /// No implementation, only a postcondition.
    Abstract(StmtExpr),
}

/// A procedure declaration with its contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub output: HighType,
    pub precondition: StmtExpr,
    pub decreases: StmtExpr,
    pub deterministic: bool,
    pub reads: Option<StmtExpr>,
    pub modifies: StmtExpr,
    pub body: Body,
}

impl Procedure {
    /// Start building a procedure with contract defaults filled in.
    pub fn builder(name: impl Into<String>) -> ProcedureBuilder {
        ProcedureBuilder::new().name(name)
    }
}

/// A class-like type with fields and instance procedures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeType {
    pub name: String,
    /// Names of the supertypes.
    pub extending: Vec<String>,
    pub fields: Vec<Field>,
    pub instance_procedures: Vec<Procedure>,
}

/// A refinement of `base` to the values satisfying `constraint`.
///
/// `value_name` binds the candidate value inside `constraint`; `witness`
/// is an inhabitant proving the type non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstrainedType {
    pub name: String,
    pub base: HighType,
    pub value_name: String,
    pub constraint: StmtExpr,
    pub witness: StmtExpr,
}

/// A top-level type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDefinition {
    Composite(CompositeType),
    Constrained(ConstrainedType),
}

impl TypeDefinition {
    /// The declared type name.
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Composite(c) => &c.name,
            TypeDefinition::Constrained(c) => &c.name,
        }
    }
}

/// The root of a Laurel AST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    pub static_procedures: Vec<Procedure>,
    pub static_fields: Vec<Field>,
    pub types: Vec<TypeDefinition>,
}

impl Program {
    /// A program with no declarations.
    pub fn empty() -> Self {
        Program::default()
    }

    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    /// Whether the program declares nothing.
    pub fn is_empty(&self) -> bool {
        self.static_procedures.is_empty() && self.static_fields.is_empty() && self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_definition_name() {
        let composite = TypeDefinition::Composite(CompositeType {
            name: "Node".to_string(),
            extending: vec![],
            fields: vec![],
            instance_procedures: vec![],
        });
        assert_eq!(composite.name(), "Node");

        let constrained = TypeDefinition::Constrained(ConstrainedType {
            name: "Nat".to_string(),
            base: HighType::TInt,
            value_name: "n".to_string(),
            constraint: StmtExpr::binary(Operation::Geq, StmtExpr::ident("n"), StmtExpr::int(0)),
            witness: StmtExpr::int(0),
        });
        assert_eq!(constrained.name(), "Nat");
    }

    #[test]
    fn test_unary_operations() {
        let unary: Vec<_> = Operation::ALL.iter().filter(|op| op.is_unary()).collect();
        assert_eq!(unary, vec![&Operation::Not, &Operation::Neg]);
    }

    #[test]
    fn test_empty_program() {
        assert!(Program::empty().is_empty());
    }
}
