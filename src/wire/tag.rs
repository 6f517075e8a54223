//! Variant tags.
//!
//! One table below is the single source for the tag enum, its wire
//! spelling, its category and its arity. Encoder and decoder both go
//! through it, so a variant cannot be spelled one way on the way out and
//! another way on the way in.
//!
//! Arity counts every element of the s-expression, head and annotation
//! slot included. For `ident`-headed categories the tag sits in the third
//! slot, so `(ident null Laurel.TInt)` has arity 3.
//!
//! `Laurel.Constrainted` is the spelling the sibling implementation
//! decodes for constrained type definitions. It is kept verbatim:
//! `Laurel.Constrained` is an unknown tag.

use std::fmt;

/// Dialect prefix shared by every variant tag.
pub const DIALECT: &str = "Laurel";

/// Expected node category at a decode call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Category {
    HighType,
    StmtExpr,
    Operation,
    ContractType,
    Parameter,
    Field,
    Procedure,
    Body,
    CompositeType,
    ConstrainedType,
    TypeDefinition,
    Program,
}

impl Category {
    /// Human-readable name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            Category::HighType => "type",
            Category::StmtExpr => "statement/expression",
            Category::Operation => "operator",
            Category::ContractType => "contract kind",
            Category::Parameter => "parameter",
            Category::Field => "field",
            Category::Procedure => "procedure",
            Category::Body => "procedure body",
            Category::CompositeType => "composite type",
            Category::ConstrainedType => "constrained type",
            Category::TypeDefinition => "type definition",
            Category::Program => "program",
        }
    }

    /// Whether nodes of this category are `(ident null <tag> ...)`.
    pub fn is_ident_headed(self) -> bool {
        matches!(
            self,
            Category::HighType | Category::Operation | Category::ContractType
        )
    }

    /// Index of the tag symbol within the s-expression.
    pub fn tag_index(self) -> usize {
        if self.is_ident_headed() { 2 } else { 0 }
    }

    /// Index of the first field after the tag.
    pub fn first_field(self) -> usize {
        if self.is_ident_headed() { 3 } else { 2 }
    }

    /// Smallest arity accepted by any variant of the category.
    pub fn min_arity(self) -> usize {
        self.tags()
            .map(|tag| tag.arity().min())
            .min()
            .unwrap_or(self.first_field())
    }

    /// Tags belonging to this category, in table order.
    pub fn tags(self) -> impl Iterator<Item = Tag> {
        Tag::ALL.iter().copied().filter(move |tag| tag.category() == self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element count accepted for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Fixed number of elements.
    Exactly(usize),
    /// Trailing variadic payload after a fixed prefix.
    AtLeast(usize),
}

impl Arity {
    /// Lower bound.
    pub fn min(self) -> usize {
        match self {
            Arity::Exactly(n) | Arity::AtLeast(n) => n,
        }
    }

    /// Whether `len` elements satisfy this arity.
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Arity::Exactly(n) => len == n,
            Arity::AtLeast(n) => len >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

macro_rules! tags {
    ($($category:ident { $($tag:ident => $text:literal, $arity:expr;)* })*) => {
        /// Every variant tag of the protocol.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        pub enum Tag {
            $($($tag,)*)*
        }

        impl Tag {
            /// All tags, grouped by category.
            pub const ALL: &'static [Tag] = &[$($(Tag::$tag,)*)*];

            /// Fully qualified wire spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($(Tag::$tag => $text,)*)*
                }
            }

            /// Category the tag belongs to.
            pub fn category(self) -> Category {
                match self {
                    $($(Tag::$tag => Category::$category,)*)*
                }
            }

            /// Element count of a node carrying this tag.
            pub fn arity(self) -> Arity {
                match self {
                    $($(Tag::$tag => $arity,)*)*
                }
            }
        }
    };
}

use Arity::{AtLeast, Exactly};

tags! {
    HighType {
        TVoid => "Laurel.TVoid", Exactly(3);
        TBool => "Laurel.TBool", Exactly(3);
        TInt => "Laurel.TInt", Exactly(3);
        TFloat64 => "Laurel.TFloat64", Exactly(3);
        UserDefined => "Laurel.UserDefined", Exactly(4);
        Applied => "Laurel.Applied", AtLeast(4);
        Pure => "Laurel.Pure", Exactly(4);
        Intersection => "Laurel.Intersection", AtLeast(3);
    }
    StmtExpr {
        IfThenElse => "Laurel.IfThenElse", Exactly(5);
        Block => "Laurel.Block", Exactly(4);
        LocalVariable => "Laurel.LocalVariable", Exactly(5);
        While => "Laurel.While", Exactly(6);
        Exit => "Laurel.Exit", Exactly(3);
        Return => "Laurel.Return", Exactly(3);
        LiteralInt => "Laurel.LiteralInt", Exactly(3);
        LiteralBool => "Laurel.LiteralBool", Exactly(3);
        Identifier => "Laurel.Identifier", Exactly(3);
        Assign => "Laurel.Assign", Exactly(4);
        FieldSelect => "Laurel.FieldSelect", Exactly(4);
        PureFieldUpdate => "Laurel.PureFieldUpdate", Exactly(5);
        StaticCall => "Laurel.StaticCall", Exactly(4);
        PrimitiveOp => "Laurel.PrimitiveOp", Exactly(4);
        This => "Laurel.This", Exactly(2);
        ReferenceEquals => "Laurel.ReferenceEquals", Exactly(4);
        AsType => "Laurel.AsType", Exactly(4);
        IsType => "Laurel.IsType", Exactly(4);
        InstanceCall => "Laurel.InstanceCall", Exactly(5);
        Forall => "Laurel.Forall", Exactly(5);
        Exists => "Laurel.Exists", Exactly(5);
        Assigned => "Laurel.Assigned", Exactly(3);
        Old => "Laurel.Old", Exactly(3);
        Fresh => "Laurel.Fresh", Exactly(3);
        Assert => "Laurel.Assert", Exactly(3);
        Assume => "Laurel.Assume", Exactly(3);
        ProveBy => "Laurel.ProveBy", Exactly(4);
        ContractOf => "Laurel.ContractOf", Exactly(4);
        StmtAbstract => "Laurel.Abstract", Exactly(2);
        All => "Laurel.All", Exactly(2);
        Hole => "Laurel.Hole", Exactly(2);
    }
    Operation {
        Eq => "Laurel.Eq", Exactly(3);
        Neq => "Laurel.Neq", Exactly(3);
        And => "Laurel.And", Exactly(3);
        Or => "Laurel.Or", Exactly(3);
        Not => "Laurel.Not", Exactly(3);
        Neg => "Laurel.Neg", Exactly(3);
        Add => "Laurel.Add", Exactly(3);
        Sub => "Laurel.Sub", Exactly(3);
        Mul => "Laurel.Mul", Exactly(3);
        Div => "Laurel.Div", Exactly(3);
        Mod => "Laurel.Mod", Exactly(3);
        Lt => "Laurel.Lt", Exactly(3);
        Leq => "Laurel.Leq", Exactly(3);
        Gt => "Laurel.Gt", Exactly(3);
        Geq => "Laurel.Geq", Exactly(3);
    }
    ContractType {
        Reads => "Laurel.Reads", Exactly(3);
        Modifies => "Laurel.Modifies", Exactly(3);
        Precondition => "Laurel.Precondition", Exactly(3);
        PostCondition => "Laurel.PostCondition", Exactly(3);
    }
    Parameter {
        Parameter => "Laurel.Parameter", Exactly(4);
    }
    Field {
        Field => "Laurel.Field", Exactly(5);
    }
    Procedure {
        Procedure => "Laurel.Procedure", Exactly(11);
    }
    Body {
        Transparent => "Laurel.Transparent", Exactly(3);
        Opaque => "Laurel.Opaque", Exactly(4);
        AbstractBody => "Laurel.Abstract", Exactly(3);
    }
    CompositeType {
        CompositeType => "Laurel.CompositeType", Exactly(6);
    }
    ConstrainedType {
        ConstrainedType => "Laurel.ConstrainedType", Exactly(7);
    }
    TypeDefinition {
        Composite => "Laurel.Composite", Exactly(3);
        Constrainted => "Laurel.Constrainted", Exactly(3);
    }
    Program {
        Program => "Laurel.Program", Exactly(5);
    }
}

impl Tag {
    /// Resolve `text` to a tag of `category`. Tags of other categories
    /// and unqualified spellings are not found.
    pub fn lookup(category: Category, text: &str) -> Option<Tag> {
        category.tags().find(|tag| tag.as_str() == text)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
