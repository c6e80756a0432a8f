//! The dialect hook table.
//!
//! The grammar engine never hardcodes one AST shape: at every
//! node-construction or validation juncture it dispatches through the
//! [`Dialect`] trait. The trait's default method bodies ARE the base
//! behavior — they delegate to the engine's `default_*` implementations — so
//! a dialect overrides exactly the subset of hooks it cares about and falls
//! through to base behavior everywhere else. Composition is static: the
//! parser is generic over its dialect, there is no subclassing and no
//! dynamic dispatch chain.

use crate::parser::{NodeStart, Parser};
use esparse_ast::{
    BlockStatement, Directive, Expression, MethodKind, ObjectMember, ClassMember, Statement,
    TypeParameterDeclaration,
};
use esparse_diagnostics::ParseResult;
use rustc_hash::FxHashMap;

/// The value payload of a literal token, as handed to the literal hooks.
#[derive(Debug, Clone)]
pub enum LiteralToken {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// The grammar-engine output of parsing a method's parameter list and body.
/// Dialects shape this into their member node of choice.
pub struct MethodParts {
    /// Marker opened just before the parameter list; an ESTree dialect
    /// closes it into the inner function-expression value's span.
    pub value_start: NodeStart,
    pub params: Vec<Expression>,
    pub body: BlockStatement,
}

/// Everything known about an object member before its value is shaped.
pub struct ObjectMemberShape {
    pub start: NodeStart,
    pub key: Expression,
    pub computed: bool,
    pub shorthand: bool,
    pub kind: MethodKind,
    pub generator: bool,
    pub is_async: bool,
}

/// Everything known about a class method before its value is shaped.
pub struct ClassMethodShape {
    pub start: NodeStart,
    pub key: Expression,
    pub computed: bool,
    pub is_static: bool,
    pub kind: MethodKind,
    pub generator: bool,
    pub is_async: bool,
    /// Generic parameters the base grammar attaches to the outer method.
    pub type_parameters: Option<TypeParameterDeclaration>,
}

/// The named extension points of the grammar engine.
///
/// Every hook receives the parser so it can read the state record, consume
/// tokens, and raise positioned errors. A hook that wants base behavior for
/// an input it does not handle calls the matching `default_*` method.
pub trait Dialect: Sized {
    /// Produce an atomic expression for the current token.
    fn parse_expr_atom(p: &mut Parser<Self>) -> ParseResult<Expression> {
        p.default_parse_expr_atom()
    }

    /// Build a literal node from the current literal token.
    fn parse_literal(p: &mut Parser<Self>, token: LiteralToken) -> ParseResult<Expression> {
        p.default_parse_literal(token)
    }

    /// Build a regular-expression literal node from the current token.
    fn parse_regexp_literal(
        p: &mut Parser<Self>,
        pattern: String,
        flags: String,
    ) -> ParseResult<Expression> {
        p.default_parse_regexp_literal(pattern, flags)
    }

    /// Shape a plain `key: value` (or shorthand) object member.
    fn parse_object_property(
        p: &mut Parser<Self>,
        shape: ObjectMemberShape,
        value: Expression,
    ) -> ParseResult<ObjectMember> {
        p.default_parse_object_property(shape, value)
    }

    /// Shape a method or accessor object member from its parsed parts.
    fn parse_object_method(
        p: &mut Parser<Self>,
        shape: ObjectMemberShape,
        parts: MethodParts,
    ) -> ParseResult<ObjectMember> {
        p.default_parse_object_method(shape, parts)
    }

    /// Shape a class method member from its parsed parts.
    fn parse_class_method(
        p: &mut Parser<Self>,
        shape: ClassMethodShape,
        parts: MethodParts,
    ) -> ParseResult<ClassMember> {
        p.default_parse_class_method(shape, parts)
    }

    /// Validate accessor arity: getters take no parameters, setters exactly
    /// one. Runs unconditionally for every accessor member.
    fn check_getter_setter_param_count(
        p: &mut Parser<Self>,
        kind: MethodKind,
        member_start: usize,
        params: &[Expression],
    ) -> ParseResult<()> {
        p.default_check_getter_setter_param_count(kind, member_start, params)
    }

    /// Detect a duplicate `__proto__` key within one object literal.
    fn check_prop_clash(
        p: &mut Parser<Self>,
        member: &ObjectMember,
        seen: &mut FxHashMap<String, bool>,
    ) -> ParseResult<()> {
        p.default_check_prop_clash(member, seen)
    }

    /// Validate an expression as an assignment (or binding) target.
    fn check_lval(
        p: &mut Parser<Self>,
        expr: &Expression,
        is_binding: bool,
        clashes: Option<&mut FxHashMap<String, bool>>,
        context: &'static str,
    ) -> ParseResult<()> {
        p.default_check_lval(expr, is_binding, clashes, context)
    }

    /// Validate a declaration target, feeding exported-name bookkeeping.
    fn check_declaration(p: &mut Parser<Self>, expr: &Expression) -> ParseResult<()> {
        p.default_check_declaration(expr)
    }

    /// Decide whether a just-parsed function or program body is strict. An
    /// expression body (`body` is `None`) is never strict.
    fn is_strict_body(
        p: &mut Parser<Self>,
        body: Option<&BlockStatement>,
        is_expression: bool,
    ) -> bool {
        p.default_is_strict_body(body, is_expression)
    }

    /// Decide whether a leading statement qualifies as a directive.
    fn is_valid_directive(p: &mut Parser<Self>, stmt: &Statement) -> bool {
        p.default_is_valid_directive(stmt)
    }

    /// Convert a qualifying statement into a directive record.
    fn stmt_to_directive(p: &mut Parser<Self>, stmt: Statement) -> ParseResult<Directive> {
        p.default_stmt_to_directive(stmt)
    }

    /// Post-process a block body's statement and directive lists into their
    /// final shape on the node.
    fn finish_block_body(
        p: &mut Parser<Self>,
        body: Vec<Statement>,
        directives: Vec<Directive>,
    ) -> (Vec<Statement>, Option<Vec<Directive>>) {
        p.default_finish_block_body(body, directives)
    }

    /// Convert an expression into an assignable pattern.
    fn to_assignable(
        p: &mut Parser<Self>,
        expr: Expression,
        is_binding: bool,
        context: &'static str,
    ) -> ParseResult<Expression> {
        p.default_to_assignable(expr, is_binding, context)
    }
}

/// The base dialect: every hook falls through to the engine's default
/// behavior, producing the base AST shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base;

impl Dialect for Base {}
