//! esparse_ast: Abstract Syntax Tree definitions for the esparse parser.
//!
//! Defines every node type for both dialect families the grammar engine can
//! produce: the base shapes (typed literals, `ObjectProperty`/`ObjectMethod`/
//! `ClassMethod` members, a separate directives list) and the standardized
//! ESTree shapes (`Literal`, `Property`, `MethodDefinition`, directives
//! folded into the statement list). The serialized JSON form of these nodes
//! is the output contract downstream tooling relies on.

pub mod node;

pub use node::*;
