//! Fluent builders for the larger declarations.
//!
//! The builders fill in the contract defaults a hand-written procedure
//! usually omits:
//!
//! | Component | Default |
//! |---|---|
//! | precondition | `true` |
//! | decreases | `0` |
//! | deterministic | `true` |
//! | reads | absent |
//! | modifies | `All` |

use thiserror::Error;

use super::{
    Body, CompositeType, ConstrainedType, Field, HighType, Parameter, Procedure, Program, StmtExpr,
    TypeDefinition,
};

/// A required component was never supplied to a builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// `name` was not set.
    #[error("{builder}: name is required")]
    MissingName {
        /// Which builder reported the error.
        builder: &'static str,
    },
    /// `output` was not set on a procedure.
    #[error("procedure `{0}`: output type is required")]
    MissingOutput(String),
    /// `body` was not set on a procedure.
    #[error("procedure `{0}`: body is required")]
    MissingBody(String),
}

/// Builder for [`Procedure`].
#[derive(Debug, Clone, Default)]
pub struct ProcedureBuilder {
    name: Option<String>,
    inputs: Vec<Parameter>,
    output: Option<HighType>,
    precondition: Option<StmtExpr>,
    decreases: Option<StmtExpr>,
    deterministic: Option<bool>,
    reads: Option<StmtExpr>,
    modifies: Option<StmtExpr>,
    body: Option<Body>,
}

impl ProcedureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder with every component of an existing procedure.
    pub fn from_procedure(procedure: &Procedure) -> Self {
        ProcedureBuilder {
            name: Some(procedure.name.clone()),
            inputs: procedure.inputs.clone(),
            output: Some(procedure.output.clone()),
            precondition: Some(procedure.precondition.clone()),
            decreases: Some(procedure.decreases.clone()),
            deterministic: Some(procedure.deterministic),
            reads: procedure.reads.clone(),
            modifies: Some(procedure.modifies.clone()),
            body: Some(procedure.body.clone()),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append one input parameter.
    pub fn input(mut self, name: impl Into<String>, ty: HighType) -> Self {
        self.inputs.push(Parameter::new(name, ty));
        self
    }

    /// Replace all input parameters.
    pub fn inputs(mut self, inputs: Vec<Parameter>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn output(mut self, output: HighType) -> Self {
        self.output = Some(output);
        self
    }

    pub fn precondition(mut self, precondition: StmtExpr) -> Self {
        self.precondition = Some(precondition);
        self
    }

    pub fn decreases(mut self, decreases: StmtExpr) -> Self {
        self.decreases = Some(decreases);
        self
    }

    pub fn deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = Some(deterministic);
        self
    }

    pub fn reads(mut self, reads: StmtExpr) -> Self {
        self.reads = Some(reads);
        self
    }

    pub fn modifies(mut self, modifies: StmtExpr) -> Self {
        self.modifies = Some(modifies);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn transparent_body(self, implementation: StmtExpr) -> Self {
        self.body(Body::Transparent(implementation))
    }

    pub fn opaque_body(self, postcondition: StmtExpr, implementation: Option<StmtExpr>) -> Self {
        self.body(Body::Opaque {
            postcondition,
            implementation,
        })
    }

    pub fn abstract_body(self, postcondition: StmtExpr) -> Self {
        self.body(Body::Abstract(postcondition))
    }

    /// Finish the procedure, applying defaults to unset contract clauses.
    pub fn build(self) -> Result<Procedure, BuildError> {
        let name = self.name.ok_or(BuildError::MissingName {
            builder: "procedure",
        })?;
        let Some(output) = self.output else {
            return Err(BuildError::MissingOutput(name));
        };
        let Some(body) = self.body else {
            return Err(BuildError::MissingBody(name));
        };

        Ok(Procedure {
            name,
            inputs: self.inputs,
            output,
            precondition: self.precondition.unwrap_or(StmtExpr::LiteralBool(true)),
            decreases: self.decreases.unwrap_or(StmtExpr::LiteralInt(0)),
            deterministic: self.deterministic.unwrap_or(true),
            reads: self.reads,
            modifies: self.modifies.unwrap_or(StmtExpr::All),
            body,
        })
    }
}

/// Builder for [`CompositeType`].
#[derive(Debug, Clone, Default)]
pub struct CompositeTypeBuilder {
    name: Option<String>,
    extending: Vec<String>,
    fields: Vec<Field>,
    procedures: Vec<Procedure>,
}

impl CompositeTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_type(ty: &CompositeType) -> Self {
        CompositeTypeBuilder {
            name: Some(ty.name.clone()),
            extending: ty.extending.clone(),
            fields: ty.fields.clone(),
            procedures: ty.instance_procedures.clone(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a supertype.
    pub fn extending(mut self, type_name: impl Into<String>) -> Self {
        self.extending.push(type_name.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn mutable_field(self, name: impl Into<String>, ty: HighType) -> Self {
        self.field(Field::mutable(name, ty))
    }

    pub fn immutable_field(self, name: impl Into<String>, ty: HighType) -> Self {
        self.field(Field::immutable(name, ty))
    }

    pub fn procedure(mut self, procedure: Procedure) -> Self {
        self.procedures.push(procedure);
        self
    }

    pub fn build(self) -> Result<CompositeType, BuildError> {
        let name = self.name.ok_or(BuildError::MissingName {
            builder: "composite type",
        })?;
        Ok(CompositeType {
            name,
            extending: self.extending,
            fields: self.fields,
            instance_procedures: self.procedures,
        })
    }
}

/// Builder for [`Program`]. Never fails: every list may be empty.
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_program(program: &Program) -> Self {
        ProgramBuilder {
            program: program.clone(),
        }
    }

    pub fn procedure(mut self, procedure: Procedure) -> Self {
        self.program.static_procedures.push(procedure);
        self
    }

    pub fn static_field(mut self, field: Field) -> Self {
        self.program.static_fields.push(field);
        self
    }

    pub fn type_definition(mut self, ty: TypeDefinition) -> Self {
        self.program.types.push(ty);
        self
    }

    pub fn composite_type(self, ty: CompositeType) -> Self {
        self.type_definition(TypeDefinition::Composite(ty))
    }

    pub fn constrained_type(self, ty: ConstrainedType) -> Self {
        self.type_definition(TypeDefinition::Constrained(ty))
    }

    pub fn build(self) -> Program {
        self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_defaults() {
        let proc = Procedure::builder("id")
            .input("x", HighType::TInt)
            .output(HighType::TInt)
            .transparent_body(StmtExpr::ident("x"))
            .build()
            .unwrap();

        assert_eq!(proc.precondition, StmtExpr::LiteralBool(true));
        assert_eq!(proc.decreases, StmtExpr::LiteralInt(0));
        assert!(proc.deterministic);
        assert_eq!(proc.reads, None);
        assert_eq!(proc.modifies, StmtExpr::All);
        assert_eq!(proc.inputs, vec![Parameter::new("x", HighType::TInt)]);
    }

    #[test]
    fn test_procedure_requires_output_and_body() {
        let err = ProcedureBuilder::new().output(HighType::TVoid).build().unwrap_err();
        assert!(matches!(err, BuildError::MissingName { .. }));

        let err = Procedure::builder("f").build().unwrap_err();
        assert_eq!(err, BuildError::MissingOutput("f".to_string()));

        let err = Procedure::builder("f").output(HighType::TVoid).build().unwrap_err();
        assert_eq!(err, BuildError::MissingBody("f".to_string()));
        assert_eq!(err.to_string(), "procedure `f`: body is required");
    }

    #[test]
    fn test_procedure_builder_round_trips_existing() {
        let proc = Procedure::builder("f")
            .output(HighType::TBool)
            .deterministic(false)
            .reads(StmtExpr::ident("heap"))
            .abstract_body(StmtExpr::bool(true))
            .build()
            .unwrap();
        let rebuilt = ProcedureBuilder::from_procedure(&proc).build().unwrap();
        assert_eq!(proc, rebuilt);
    }

    #[test]
    fn test_composite_type_builder() {
        let ty = CompositeTypeBuilder::new()
            .name("Point")
            .extending("Object")
            .mutable_field("x", HighType::TInt)
            .immutable_field("y", HighType::TInt)
            .build()
            .unwrap();
        assert_eq!(ty.extending, vec!["Object".to_string()]);
        assert!(ty.fields[0].is_mutable);
        assert!(!ty.fields[1].is_mutable);

        assert!(CompositeTypeBuilder::new().build().is_err());
    }

    #[test]
    fn test_program_builder() {
        let point = CompositeTypeBuilder::new().name("Point").build().unwrap();
        let program = ProgramBuilder::new()
            .static_field(Field::immutable("origin", HighType::user_defined("Point")))
            .composite_type(point)
            .build();
        assert_eq!(program.static_fields.len(), 1);
        assert_eq!(program.types[0].name(), "Point");
        assert!(program.static_procedures.is_empty());
    }
}
