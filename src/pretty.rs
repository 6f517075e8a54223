//! Source-like rendering of Laurel ASTs.
//!
//! The output reads like Laurel surface syntax but is meant for people:
//! there is no parser for it. Contract clauses that hold their builder
//! default (precondition `true`, decreases `0`, modifies `*`) are left out.
//!
//! ```text
//! procedure max(a: int, b: int): int
//!   ensures (result >= a)
//! {
//!   if ((a > b)) return a else return b
//! }
//! ```

use std::fmt::{self, Write};

use crate::ast::{
    Body, CompositeType, ConstrainedType, ContractType, Field, HighType, Operation, Parameter,
    Procedure, Program, StmtExpr, TypeDefinition,
};

const INDENT: &str = "  ";

/// Render a whole program.
pub fn print_program(program: &Program) -> String {
    let mut p = Printer::default();
    p.program(program);
    p.out
}

/// Render a single procedure.
pub fn print_procedure(procedure: &Procedure) -> String {
    let mut p = Printer::default();
    p.procedure(procedure);
    p.out
}

impl fmt::Display for HighType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighType::TVoid => f.write_str("void"),
            HighType::TBool => f.write_str("bool"),
            HighType::TInt => f.write_str("int"),
            HighType::TFloat64 => f.write_str("float64"),
            HighType::UserDefined(name) => f.write_str(name),
            HighType::Applied { base, args } => {
                write!(f, "{}<", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_char('>')
            }
            HighType::Pure(base) => write!(f, "pure {}", base),
            HighType::Intersection(types) if types.is_empty() => f.write_str("⊤"),
            HighType::Intersection(types) => {
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                Ok(())
            }
        }
    }
}

impl Operation {
    /// Surface symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Eq => "==",
            Operation::Neq => "!=",
            Operation::And => "&&",
            Operation::Or => "||",
            Operation::Not => "!",
            Operation::Neg => "-",
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
            Operation::Mod => "%",
            Operation::Lt => "<",
            Operation::Leq => "<=",
            Operation::Gt => ">",
            Operation::Geq => ">=",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContractType::Reads => "reads",
            ContractType::Modifies => "modifies",
            ContractType::Precondition => "requires",
            ContractType::Postcondition => "ensures",
        })
    }
}

impl fmt::Display for StmtExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut p = Printer::default();
        p.stmt(self);
        f.write_str(&p.out)
    }
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn display(&mut self, value: &impl fmt::Display) {
        // Writing into a String cannot fail.
        let _ = write!(self.out, "{}", value);
    }

    fn comma_list<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            each(self, item);
        }
    }

    // ========== Declarations ==========

    fn program(&mut self, program: &Program) {
        let mut first = true;
        let mut separate = |p: &mut Self| {
            if !first {
                p.push("\n\n");
            }
            first = false;
        };
        for ty in &program.types {
            separate(self);
            self.type_definition(ty);
        }
        for field in &program.static_fields {
            separate(self);
            self.push("static ");
            self.field(field);
        }
        for procedure in &program.static_procedures {
            separate(self);
            self.procedure(procedure);
        }
        if !first {
            self.out.push('\n');
        }
    }

    fn type_definition(&mut self, ty: &TypeDefinition) {
        match ty {
            TypeDefinition::Composite(c) => self.composite_type(c),
            TypeDefinition::Constrained(c) => self.constrained_type(c),
        }
    }

    fn composite_type(&mut self, ty: &CompositeType) {
        self.push("composite ");
        self.push(&ty.name);
        if !ty.extending.is_empty() {
            self.push(" extends ");
            self.push(&ty.extending.join(", "));
        }
        self.push(" {");
        self.indent += 1;
        for field in &ty.fields {
            self.newline();
            self.field(field);
        }
        for procedure in &ty.instance_procedures {
            self.newline();
            self.procedure(procedure);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn constrained_type(&mut self, ty: &ConstrainedType) {
        self.push("constrained ");
        self.push(&ty.name);
        self.push(" = ");
        self.push(&ty.value_name);
        self.push(": ");
        self.display(&ty.base);
        self.push(" where ");
        self.stmt(&ty.constraint);
        self.push(" witness ");
        self.stmt(&ty.witness);
    }

    fn field(&mut self, field: &Field) {
        self.push(if field.is_mutable { "var " } else { "val " });
        self.push(&field.name);
        self.push(": ");
        self.display(&field.ty);
    }

    fn parameter(&mut self, parameter: &Parameter) {
        self.push(&parameter.name);
        self.push(": ");
        self.display(&parameter.ty);
    }

    fn clause(&mut self, keyword: &str, expr: &StmtExpr) {
        self.indent += 1;
        self.newline();
        self.push(keyword);
        self.push(" ");
        self.stmt(expr);
        self.indent -= 1;
    }

    fn procedure(&mut self, procedure: &Procedure) {
        if !procedure.deterministic {
            self.push("nondet ");
        }
        self.push("procedure ");
        self.push(&procedure.name);
        self.push("(");
        self.comma_list(&procedure.inputs, Self::parameter);
        self.push("): ");
        self.display(&procedure.output);

        if procedure.precondition != StmtExpr::LiteralBool(true) {
            self.clause("requires", &procedure.precondition);
        }
        if let Some(reads) = &procedure.reads {
            self.clause("reads", reads);
        }
        if procedure.modifies != StmtExpr::All {
            self.clause("modifies", &procedure.modifies);
        }
        if procedure.decreases != StmtExpr::LiteralInt(0) {
            self.clause("decreases", &procedure.decreases);
        }

        match &procedure.body {
            Body::Transparent(body) => {
                self.newline();
                self.body_block(body);
            }
            Body::Opaque {
                postcondition,
                implementation,
            } => {
                self.clause("ensures", postcondition);
                if let Some(implementation) = implementation {
                    self.newline();
                    self.body_block(implementation);
                }
            }
            Body::Abstract(postcondition) => {
                self.clause("ensures", postcondition);
                self.indent += 1;
                self.newline();
                self.push("abstract");
                self.indent -= 1;
            }
        }
    }

    /// A procedure body always renders with braces.
    fn body_block(&mut self, body: &StmtExpr) {
        match body {
            StmtExpr::Block { .. } => self.stmt(body),
            other => self.block(std::slice::from_ref(other), None),
        }
    }

    // ========== Statements and expressions ==========

    fn block(&mut self, statements: &[StmtExpr], label: Option<&str>) {
        if let Some(label) = label {
            self.push(label);
            self.push(": ");
        }
        if statements.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for statement in statements {
            self.newline();
            self.stmt(statement);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn args(&mut self, args: &[StmtExpr]) {
        self.push("(");
        self.comma_list(args, Self::stmt);
        self.push(")");
    }

    fn quantifier(&mut self, keyword: &str, name: &str, ty: &HighType, body: &StmtExpr) {
        self.push(keyword);
        self.push(" ");
        self.push(name);
        self.push(": ");
        self.display(ty);
        self.push(" :: ");
        self.stmt(body);
    }

    fn call_like(&mut self, name: &str, arg: &StmtExpr) {
        self.push(name);
        self.push("(");
        self.stmt(arg);
        self.push(")");
    }

    fn stmt(&mut self, stmt: &StmtExpr) {
        match stmt {
            StmtExpr::IfThenElse {
                cond,
                then_branch,
                else_branch,
            } => {
                self.push("if (");
                self.stmt(cond);
                self.push(") ");
                self.stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.push(" else ");
                    self.stmt(else_branch);
                }
            }
            StmtExpr::Block { statements, label } => self.block(statements, label.as_deref()),
            StmtExpr::LocalVariable {
                name,
                ty,
                initializer,
            } => {
                self.push("var ");
                self.push(name);
                self.push(": ");
                self.display(ty);
                if let Some(initializer) = initializer {
                    self.push(" := ");
                    self.stmt(initializer);
                }
            }
            StmtExpr::While {
                cond,
                invariant,
                decreases,
                body,
            } => {
                self.push("while (");
                self.stmt(cond);
                self.push(")");
                if let Some(invariant) = invariant {
                    self.clause("invariant", invariant);
                }
                if let Some(decreases) = decreases {
                    self.clause("decreases", decreases);
                }
                self.newline();
                self.stmt(body);
            }
            StmtExpr::Exit(target) => {
                self.push("exit ");
                self.push(target);
            }
            StmtExpr::Return(value) => {
                self.push("return");
                if let Some(value) = value {
                    self.push(" ");
                    self.stmt(value);
                }
            }
            StmtExpr::LiteralInt(n) => self.display(n),
            StmtExpr::LiteralBool(b) => self.display(b),
            StmtExpr::Identifier(name) => self.push(name),
            StmtExpr::Assign { target, value } => {
                self.stmt(target);
                self.push(" := ");
                self.stmt(value);
            }
            StmtExpr::FieldSelect { target, field } => {
                self.stmt(target);
                self.push(".");
                self.push(field);
            }
            StmtExpr::PureFieldUpdate {
                target,
                field,
                value,
            } => {
                self.stmt(target);
                self.push(" with { ");
                self.push(field);
                self.push(" := ");
                self.stmt(value);
                self.push(" }");
            }
            StmtExpr::StaticCall { callee, args } => {
                self.push(callee);
                self.args(args);
            }
            StmtExpr::PrimitiveOp { op, args } => match args.as_slice() {
                [operand] => {
                    self.push(op.symbol());
                    self.stmt(operand);
                }
                [lhs, rhs] => {
                    self.push("(");
                    self.stmt(lhs);
                    self.push(" ");
                    self.push(op.symbol());
                    self.push(" ");
                    self.stmt(rhs);
                    self.push(")");
                }
                _ => {
                    self.push(op.symbol());
                    self.args(args);
                }
            },
            StmtExpr::This => self.push("this"),
            StmtExpr::ReferenceEquals { lhs, rhs } => {
                self.stmt(lhs);
                self.push(" === ");
                self.stmt(rhs);
            }
            StmtExpr::AsType { target, ty } => {
                self.stmt(target);
                self.push(" as ");
                self.display(ty);
            }
            StmtExpr::IsType { target, ty } => {
                self.stmt(target);
                self.push(" is ");
                self.display(ty);
            }
            StmtExpr::InstanceCall {
                target,
                callee,
                args,
            } => {
                self.stmt(target);
                self.push(".");
                self.push(callee);
                self.args(args);
            }
            StmtExpr::Forall { name, ty, body } => self.quantifier("forall", name, ty, body),
            StmtExpr::Exists { name, ty, body } => self.quantifier("exists", name, ty, body),
            StmtExpr::Assigned(e) => self.call_like("assigned", e),
            StmtExpr::Old(e) => self.call_like("old", e),
            StmtExpr::Fresh(e) => self.call_like("fresh", e),
            StmtExpr::Assert(e) => {
                self.push("assert ");
                self.stmt(e);
            }
            StmtExpr::Assume(e) => {
                self.push("assume ");
                self.stmt(e);
            }
            StmtExpr::ProveBy { value, proof } => {
                self.stmt(value);
                self.push(" by ");
                self.stmt(proof);
            }
            StmtExpr::ContractOf { kind, function } => {
                self.display(kind);
                self.push("(");
                self.stmt(function);
                self.push(")");
            }
            StmtExpr::Abstract => self.push("abstract"),
            StmtExpr::All => self.push("*"),
            StmtExpr::Hole => self.push("<?>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types() {
        assert_eq!(HighType::TFloat64.to_string(), "float64");
        assert_eq!(
            HighType::applied(HighType::user_defined("Map"), vec![HighType::TInt, HighType::TBool])
                .to_string(),
            "Map<int, bool>"
        );
        assert_eq!(HighType::pure(HighType::user_defined("Cell")).to_string(), "pure Cell");
        assert_eq!(HighType::Intersection(vec![]).to_string(), "⊤");
        assert_eq!(
            HighType::Intersection(vec![HighType::user_defined("A"), HighType::user_defined("B")])
                .to_string(),
            "A & B"
        );
    }

    #[test]
    fn test_expressions() {
        let e = StmtExpr::binary(Operation::Add, StmtExpr::ident("x"), StmtExpr::int(1));
        assert_eq!(e.to_string(), "(x + 1)");
        assert_eq!(StmtExpr::not(StmtExpr::bool(false)).to_string(), "!false");
        assert_eq!(
            StmtExpr::forall("i", HighType::TInt, StmtExpr::bool(true)).to_string(),
            "forall i: int :: true"
        );
        let contract = StmtExpr::ContractOf {
            kind: ContractType::Precondition,
            function: Box::new(StmtExpr::ident("f")),
        };
        assert_eq!(contract.to_string(), "requires(f)");
        assert_eq!(StmtExpr::All.to_string(), "*");
    }

    #[test]
    fn test_blocks() {
        let block = StmtExpr::labeled_block(
            "outer",
            vec![
                StmtExpr::local("x", HighType::TInt, Some(StmtExpr::int(0))),
                StmtExpr::Exit("outer".to_string()),
            ],
        );
        assert_eq!(block.to_string(), "outer: {\n  var x: int := 0\n  exit outer\n}");
        assert_eq!(StmtExpr::block(vec![]).to_string(), "{}");
    }

    #[test]
    fn test_procedure_omits_default_clauses() {
        let proc = Procedure::builder("id")
            .input("x", HighType::TInt)
            .output(HighType::TInt)
            .transparent_body(StmtExpr::return_value(Some(StmtExpr::ident("x"))))
            .build()
            .unwrap();
        assert_eq!(
            print_procedure(&proc),
            "procedure id(x: int): int\n{\n  return x\n}"
        );
    }

    #[test]
    fn test_procedure_clauses() {
        let proc = Procedure::builder("tick")
            .output(HighType::TVoid)
            .deterministic(false)
            .precondition(StmtExpr::binary(Operation::Gt, StmtExpr::ident("n"), StmtExpr::int(0)))
            .reads(StmtExpr::This)
            .abstract_body(StmtExpr::bool(true))
            .build()
            .unwrap();
        assert_eq!(
            print_procedure(&proc),
            "nondet procedure tick(): void\n  requires (n > 0)\n  reads this\n  ensures true\n  abstract"
        );
    }

    #[test]
    fn test_program_layout() {
        let program = Program::builder()
            .static_field(Field::immutable("limit", HighType::TInt))
            .composite_type(CompositeType {
                name: "Cell".to_string(),
                extending: vec!["Object".to_string()],
                fields: vec![Field::mutable("value", HighType::TInt)],
                instance_procedures: vec![],
            })
            .build();
        assert_eq!(
            print_program(&program),
            "composite Cell extends Object {\n  var value: int\n}\n\nstatic val limit: int\n"
        );
        assert_eq!(print_program(&Program::empty()), "");
    }
}
