//! The ESTree dialect.
//!
//! Overrides the subset of hooks needed to emit the standardized ESTree
//! schema instead of the base shapes, reusing all unmodified grammar logic:
//! one `Literal` node for every literal kind, one `Property` shape for
//! object members, `MethodDefinition` wrappers for class methods, directives
//! folded back into the statement list, and pattern conversion/validation
//! that understands the normalized member shape.

use crate::hooks::{ClassMethodShape, Dialect, LiteralToken, MethodParts, ObjectMemberShape};
use crate::parser::Parser;
use esparse_ast::*;
use esparse_diagnostics::{messages, ParseResult};
use rustc_hash::FxHashMap;

/// The ESTree dialect marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct Estree;

/// Attempt to compile a regex literal's pattern/flags pair on the host
/// engine. JavaScript's `i`/`m`/`s` flags translate to inline flags; `g` and
/// `y` only affect match iteration and `u` is the host default, so all three
/// are dropped; anything else is unsupported. `None` means the literal's
/// `value` degrades to null while the source pair stays on the node.
fn compile_regex(pattern: &str, flags: &str) -> Option<CompiledRegex> {
    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' => inline.push(flag),
            'u' | 'g' | 'y' => {}
            _ => return None,
        }
    }
    let translated = if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", inline, pattern)
    };
    regex::Regex::new(&translated).ok().map(CompiledRegex)
}

/// Build the inner function-expression value wrapping a method's params and
/// body.
fn method_value(p: &mut Parser<Estree>, parts: MethodParts, generator: bool, is_async: bool) -> FunctionNode {
    FunctionNode {
        span: p.finish_node(parts.value_start),
        id: None,
        params: parts.params,
        body: parts.body,
        generator,
        is_async,
        type_parameters: None,
    }
}

impl Dialect for Estree {
    fn parse_literal(p: &mut Parser<Self>, token: LiteralToken) -> ParseResult<Expression> {
        let start = p.start_node();
        let raw = p.cur_token_raw();
        p.lexer.next()?;
        let value = match token {
            LiteralToken::Number(n) => LiteralValue::Number(n),
            LiteralToken::String(s) => LiteralValue::String(s),
            LiteralToken::Boolean(b) => LiteralValue::Boolean(b),
            LiteralToken::Null => LiteralValue::Null,
        };
        Ok(Expression::Literal(Literal {
            span: p.finish_node(start),
            value,
            raw,
            regex: None,
            extra: None,
        }))
    }

    fn parse_regexp_literal(
        p: &mut Parser<Self>,
        pattern: String,
        flags: String,
    ) -> ParseResult<Expression> {
        let start = p.start_node();
        let raw = p.cur_token_raw();
        p.lexer.next()?;
        // Compilation failure must never raise: the value degrades to null
        // and the pattern/flags pair is recorded unconditionally.
        let value = match compile_regex(&pattern, &flags) {
            Some(compiled) => LiteralValue::Regex(compiled),
            None => LiteralValue::Null,
        };
        Ok(Expression::Literal(Literal {
            span: p.finish_node(start),
            value,
            raw,
            regex: Some(RegexSource { pattern, flags }),
            extra: None,
        }))
    }

    fn parse_object_property(
        p: &mut Parser<Self>,
        shape: ObjectMemberShape,
        value: Expression,
    ) -> ParseResult<ObjectMember> {
        Ok(ObjectMember::Property(Property {
            span: p.finish_node(shape.start),
            key: Box::new(shape.key),
            value: Box::new(value),
            kind: PropertyKind::Init,
            method: false,
            shorthand: shape.shorthand,
            computed: shape.computed,
        }))
    }

    fn parse_object_method(
        p: &mut Parser<Self>,
        shape: ObjectMemberShape,
        parts: MethodParts,
    ) -> ParseResult<ObjectMember> {
        let value = method_value(p, parts, shape.generator, shape.is_async);
        let kind = match shape.kind {
            MethodKind::Get => PropertyKind::Get,
            MethodKind::Set => PropertyKind::Set,
            _ => PropertyKind::Init,
        };
        Ok(ObjectMember::Property(Property {
            span: p.finish_node(shape.start),
            key: Box::new(shape.key),
            value: Box::new(Expression::FunctionExpression(value)),
            kind,
            method: shape.kind == MethodKind::Method,
            shorthand: false,
            computed: shape.computed,
        }))
    }

    fn parse_class_method(
        p: &mut Parser<Self>,
        shape: ClassMethodShape,
        parts: MethodParts,
    ) -> ParseResult<ClassMember> {
        let mut value = method_value(p, parts, shape.generator, shape.is_async);
        // Generic parameters move from the outer method onto the inner
        // function value; the wrapper has no slot for them at all.
        value.type_parameters = shape.type_parameters;
        Ok(ClassMember::MethodDefinition(MethodDefinition {
            span: p.finish_node(shape.start),
            key: Box::new(shape.key),
            kind: shape.kind,
            value: Box::new(Expression::FunctionExpression(value)),
            computed: shape.computed,
            is_static: shape.is_static,
        }))
    }

    fn check_prop_clash(
        p: &mut Parser<Self>,
        member: &ObjectMember,
        seen: &mut FxHashMap<String, bool>,
    ) -> ParseResult<()> {
        let ObjectMember::Property(prop) = member else {
            return Ok(());
        };
        if prop.computed || prop.kind != PropertyKind::Init || prop.method {
            return Ok(());
        }
        p.check_proto_key(&prop.key, seen)
    }

    fn check_lval(
        p: &mut Parser<Self>,
        expr: &Expression,
        is_binding: bool,
        mut clashes: Option<&mut FxHashMap<String, bool>>,
        context: &'static str,
    ) -> ParseResult<()> {
        match expr {
            Expression::ObjectPattern(obj) => {
                for member in &obj.properties {
                    // A property wrapper is validated through its value; a
                    // bare pattern element is validated directly.
                    let target: &Expression = match member {
                        ObjectMember::Property(prop) => &prop.value,
                        ObjectMember::ObjectProperty(prop) => &prop.value,
                        ObjectMember::RestElement(rest) => &rest.argument,
                        ObjectMember::SpreadElement(spread) => &spread.argument,
                        ObjectMember::ObjectMethod(_) => continue,
                    };
                    Self::check_lval(
                        p,
                        target,
                        is_binding,
                        clashes.as_mut().map(|c| &mut **c),
                        "object destructuring pattern",
                    )?;
                }
                Ok(())
            }
            _ => p.default_check_lval(expr, is_binding, clashes, context),
        }
    }

    fn check_declaration(p: &mut Parser<Self>, expr: &Expression) -> ParseResult<()> {
        match expr {
            Expression::ObjectPattern(obj) => {
                for member in &obj.properties {
                    match member {
                        // A simple property is unwrapped to its value before
                        // the base check applies.
                        ObjectMember::Property(prop) if prop.is_simple() => {
                            Self::check_declaration(p, &prop.value)?;
                        }
                        ObjectMember::RestElement(rest) => {
                            Self::check_declaration(p, &rest.argument)?;
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            _ => p.default_check_declaration(expr),
        }
    }

    fn is_strict_body(
        _p: &mut Parser<Self>,
        body: Option<&BlockStatement>,
        is_expression: bool,
    ) -> bool {
        if is_expression {
            return false;
        }
        let Some(block) = body else {
            return false;
        };
        for stmt in &block.body {
            // Scanning stops at the first statement that is not a
            // literal-expression statement.
            let Statement::ExpressionStatement(es) = stmt else {
                break;
            };
            let Expression::Literal(lit) = es.expression.as_ref() else {
                break;
            };
            if matches!(&lit.value, LiteralValue::String(s) if s == "use strict") {
                return true;
            }
        }
        false
    }

    fn is_valid_directive(_p: &mut Parser<Self>, stmt: &Statement) -> bool {
        let Statement::ExpressionStatement(es) = stmt else {
            return false;
        };
        if es.directive.is_some() {
            return false;
        }
        match es.expression.as_ref() {
            Expression::Literal(lit) => {
                matches!(lit.value, LiteralValue::String(_))
                    && !lit
                        .extra
                        .as_ref()
                        .and_then(|e| e.parenthesized)
                        .unwrap_or(false)
            }
            _ => false,
        }
    }

    fn stmt_to_directive(p: &mut Parser<Self>, stmt: Statement) -> ParseResult<Directive> {
        // The directive should carry the literal's real (cooked) value, not
        // the raw text the base conversion records.
        let cooked = match &stmt {
            Statement::ExpressionStatement(es) => match es.expression.as_ref() {
                Expression::Literal(lit) => match &lit.value {
                    LiteralValue::String(s) => Some(s.clone()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        };
        let mut directive = p.default_stmt_to_directive(stmt)?;
        if let Some(value) = cooked {
            directive.value.value = value;
        }
        Ok(directive)
    }

    fn finish_block_body(
        _p: &mut Parser<Self>,
        body: Vec<Statement>,
        directives: Vec<Directive>,
    ) -> (Vec<Statement>, Option<Vec<Directive>>) {
        if directives.is_empty() {
            return (body, None);
        }
        // Convert each accumulated directive back into an ordinary
        // expression statement and prepend them in original order; the
        // separate directive list is gone from the finished node.
        let mut statements: Vec<Statement> =
            directives.into_iter().map(directive_to_stmt).collect();
        statements.extend(body);
        (statements, None)
    }

    fn to_assignable(
        p: &mut Parser<Self>,
        expr: Expression,
        is_binding: bool,
        context: &'static str,
    ) -> ParseResult<Expression> {
        match expr {
            Expression::ObjectExpression(obj) => {
                let mut properties = Vec::with_capacity(obj.properties.len());
                for member in obj.properties {
                    properties.push(match member {
                        ObjectMember::Property(mut prop) => {
                            if matches!(prop.kind, PropertyKind::Get | PropertyKind::Set) {
                                return Err(p.raise(
                                    prop.key.start() as usize,
                                    messages::PATTERN_NO_ACCESSOR,
                                ));
                            }
                            if prop.method {
                                return Err(p.raise(
                                    prop.key.start() as usize,
                                    messages::PATTERN_NO_METHODS,
                                ));
                            }
                            let value = Self::to_assignable(
                                p,
                                *prop.value,
                                is_binding,
                                "object destructuring pattern",
                            )?;
                            prop.value = Box::new(value);
                            ObjectMember::Property(prop)
                        }
                        ObjectMember::SpreadElement(spread) => {
                            let argument = Self::to_assignable(
                                p,
                                *spread.argument,
                                is_binding,
                                "object destructuring pattern",
                            )?;
                            ObjectMember::RestElement(RestElement {
                                span: spread.span,
                                argument: Box::new(argument),
                            })
                        }
                        ObjectMember::RestElement(rest) => ObjectMember::RestElement(rest),
                        other => p.object_member_to_assignable(other, is_binding)?,
                    });
                }
                Ok(Expression::ObjectPattern(ObjectPattern {
                    span: obj.span,
                    properties,
                }))
            }
            _ => p.default_to_assignable(expr, is_binding, context),
        }
    }
}

/// Convert an accumulated directive back into an ordinary expression
/// statement: a literal rebuilt at the directive's original span carrying
/// the string value, and a `directive` field holding the unquoted raw text.
fn directive_to_stmt(directive: Directive) -> Statement {
    let literal = directive.value;
    let raw = literal
        .extra
        .as_ref()
        .and_then(|e| e.raw.clone())
        .unwrap_or_default();
    let unquoted = if raw.len() >= 2 {
        raw[1..raw.len() - 1].to_string()
    } else {
        String::new()
    };
    let expression = Expression::Literal(Literal {
        span: literal.span,
        value: LiteralValue::String(literal.value),
        raw,
        regex: None,
        extra: None,
    });
    Statement::ExpressionStatement(ExpressionStatement {
        span: directive.span,
        expression: Box::new(expression),
        directive: Some(unquoted),
    })
}
