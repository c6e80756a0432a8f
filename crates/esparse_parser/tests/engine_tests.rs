//! Grammar engine behavior shared by both dialects: speculative arrow
//! disambiguation, labels, modules, strict-mode validation, trivia capture.

use esparse_parser::ast::*;
use esparse_parser::{parse_estree, Options, SyntaxError};

fn parse_ok(source: &str) -> File {
    parse_estree(Options::default(), source).unwrap()
}

fn parse_module_ok(source: &str) -> File {
    parse_estree(Options::module(), source).unwrap()
}

fn parse_err(source: &str) -> SyntaxError {
    parse_estree(Options::default(), source).unwrap_err()
}

fn parse_module_err(source: &str) -> SyntaxError {
    parse_estree(Options::module(), source).unwrap_err()
}

fn first_expression(file: &File) -> &Expression {
    match &file.program.body[0] {
        Statement::ExpressionStatement(es) => &es.expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

// ============================================================================
// Speculative parsing
// ============================================================================

#[test]
fn test_paren_arrow_takes_the_arrow_branch() {
    let file = parse_ok("var f = (a, b) => a;");
    let Statement::VariableDeclaration(decl) = &file.program.body[0] else {
        panic!("expected variable declaration");
    };
    let Expression::ArrowFunctionExpression(arrow) =
        decl.declarations[0].init.as_ref().unwrap().as_ref()
    else {
        panic!("expected arrow function");
    };
    assert_eq!(arrow.params.len(), 2);
    assert!(arrow.expression);
    assert!(matches!(arrow.body, ArrowFunctionBody::Expression(_)));
}

#[test]
fn test_failed_arrow_attempt_falls_back_to_sequence() {
    let file = parse_ok("var s = (a, b);");
    let Statement::VariableDeclaration(decl) = &file.program.body[0] else {
        panic!("expected variable declaration");
    };
    assert!(matches!(
        decl.declarations[0].init.as_ref().unwrap().as_ref(),
        Expression::SequenceExpression(_)
    ));
}

#[test]
fn test_failed_arrow_attempt_leaves_no_comment_residue() {
    // The failed speculative attempt scans the comment once; the restored
    // state must not keep a duplicate.
    let file = parse_ok("var s = (/* args */ a, b);");
    assert_eq!(file.comments.len(), 1);
    assert_eq!(file.comments[0].value, " args ");
}

#[test]
fn test_single_identifier_arrow() {
    let file = parse_ok("var f = x => x;");
    let Statement::VariableDeclaration(decl) = &file.program.body[0] else {
        panic!("expected variable declaration");
    };
    assert!(matches!(
        decl.declarations[0].init.as_ref().unwrap().as_ref(),
        Expression::ArrowFunctionExpression(_)
    ));
}

#[test]
fn test_arrow_with_destructured_params() {
    let file = parse_ok("var f = ({ a }, [b]) => a;");
    let Statement::VariableDeclaration(decl) = &file.program.body[0] else {
        panic!("expected variable declaration");
    };
    let Expression::ArrowFunctionExpression(arrow) =
        decl.declarations[0].init.as_ref().unwrap().as_ref()
    else {
        panic!("expected arrow function");
    };
    assert!(matches!(arrow.params[0], Expression::ObjectPattern(_)));
    assert!(matches!(arrow.params[1], Expression::ArrayPattern(_)));
}

#[test]
fn test_arrow_duplicate_params_rejected() {
    let err = parse_err("var f = (a, a) => a;");
    assert_eq!(err.message, "Argument name clash in strict mode");
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_binary_precedence() {
    let file = parse_ok("x = 1 + 2 * 3;");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::BinaryExpression(add) = assign.right.as_ref() else {
        panic!("expected binary expression");
    };
    assert_eq!(add.operator, "+");
    assert!(matches!(add.right.as_ref(), Expression::BinaryExpression(m) if m.operator == "*"));
}

#[test]
fn test_exponent_right_associative() {
    let file = parse_ok("x = 2 ** 3 ** 2;");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::BinaryExpression(outer) = assign.right.as_ref() else {
        panic!("expected binary expression");
    };
    assert_eq!(outer.operator, "**");
    assert!(matches!(outer.right.as_ref(), Expression::BinaryExpression(_)));
    assert!(matches!(outer.left.as_ref(), Expression::Literal(_)));
}

#[test]
fn test_logical_expression_node() {
    let file = parse_ok("x = a && b || c;");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::LogicalExpression(or) = assign.right.as_ref() else {
        panic!("expected logical expression");
    };
    assert_eq!(or.operator, "||");
}

#[test]
fn test_template_literal() {
    let file = parse_ok("x = `a${b}c`;");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::TemplateLiteral(template) = assign.right.as_ref() else {
        panic!("expected template literal");
    };
    assert_eq!(template.quasis.len(), 2);
    assert_eq!(template.expressions.len(), 1);
    assert_eq!(template.quasis[0].value.raw, "a");
    assert!(!template.quasis[0].tail);
    assert!(template.quasis[1].tail);
}

#[test]
fn test_assigning_to_rvalue() {
    let err = parse_err("1 = 2;");
    assert_eq!(err.message, "Assigning to rvalue");
    assert_eq!(err.pos, 0);
}

#[test]
fn test_shorthand_default_outside_pattern_rejected() {
    let err = parse_err("({ x = 1 });");
    assert_eq!(
        err.message,
        "Shorthand property assignments are valid only in destructuring patterns"
    );
}

#[test]
fn test_shorthand_default_inside_pattern_allowed() {
    let file = parse_ok("({ x = 1 } = y);");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::ObjectPattern(pattern) = assign.left.as_ref() else {
        panic!("expected object pattern");
    };
    let ObjectMember::Property(prop) = &pattern.properties[0] else {
        panic!("expected Property member");
    };
    assert!(matches!(
        prop.value.as_ref(),
        Expression::AssignmentPattern(_)
    ));
}

// ============================================================================
// Statements and labels
// ============================================================================

#[test]
fn test_unsyntactic_break() {
    let err = parse_err("break;");
    assert_eq!(err.message, "Unsyntactic break");
}

#[test]
fn test_labeled_loop_with_continue() {
    parse_ok("outer: while (x) { continue outer; }");
}

#[test]
fn test_duplicate_label() {
    let err = parse_err("a: a: while (x) {}");
    assert_eq!(err.message, "Label 'a' is already declared");
}

#[test]
fn test_return_outside_function() {
    let err = parse_err("return 1;");
    assert_eq!(err.message, "'return' outside of function");
}

#[test]
fn test_const_requires_initializer() {
    assert!(parse_estree(Options::default(), "const x;").is_err());
}

#[test]
fn test_destructuring_declaration_requires_initializer() {
    let err = parse_err("var { a };");
    assert_eq!(
        err.message,
        "Complex binding patterns require an initialization value"
    );
}

#[test]
fn test_delete_identifier_in_strict_mode() {
    let err = parse_err("\"use strict\"; delete x;");
    assert_eq!(err.message, "Deleting local variable in strict mode");
}

#[test]
fn test_octal_escape_before_use_strict_directive() {
    let err = parse_err("function f() { \"a\\07b\"; \"use strict\"; }");
    assert_eq!(err.message, "Octal literal in strict mode");
    assert_eq!(err.pos, 17);
}

#[test]
fn test_non_simple_params_with_use_strict_directive() {
    let err = parse_err("function f({ a }) { \"use strict\"; }");
    assert_eq!(
        err.message,
        "Illegal 'use strict' directive in function with non-simple parameter list"
    );
}

#[test]
fn test_decorated_class() {
    let file = parse_ok("@dec class A {}");
    let Statement::ClassDeclaration(class) = &file.program.body[0] else {
        panic!("expected class declaration");
    };
    let decorators = class.decorators.as_ref().unwrap();
    assert_eq!(decorators.len(), 1);
    assert!(matches!(
        decorators[0].expression.as_ref(),
        Expression::Identifier(id) if id.name == "dec"
    ));
}

#[test]
fn test_decorator_without_class() {
    let err = parse_err("@dec foo();");
    assert_eq!(
        err.message,
        "Leading decorators must be attached to a class declaration"
    );
}

#[test]
fn test_super_outside_method() {
    let err = parse_err("function f() { super.x; }");
    assert_eq!(err.message, "'super' outside of function or class");
}

#[test]
fn test_super_call_outside_constructor() {
    let err = parse_err("class A { m() { super(); } }");
    assert_eq!(err.message, "super() outside of class constructor");
}

#[test]
fn test_super_in_constructor() {
    parse_ok("class A extends B { constructor() { super(); super.x(); } }");
}

#[test]
fn test_yield_in_generator() {
    let file = parse_ok("function* g() { yield 1; yield* h(); }");
    let Statement::FunctionDeclaration(func) = &file.program.body[0] else {
        panic!("expected function declaration");
    };
    assert!(func.generator);
    let Statement::ExpressionStatement(first) = &func.body.body[0] else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        first.expression.as_ref(),
        Expression::YieldExpression(y) if !y.delegate
    ));
    let Statement::ExpressionStatement(second) = &func.body.body[1] else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        second.expression.as_ref(),
        Expression::YieldExpression(y) if y.delegate
    ));
}

#[test]
fn test_await_in_async_function() {
    let file = parse_ok("async function f() { await g(); }");
    let Statement::FunctionDeclaration(func) = &file.program.body[0] else {
        panic!("expected function declaration");
    };
    assert!(func.is_async);
    let Statement::ExpressionStatement(stmt) = &func.body.body[0] else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        stmt.expression.as_ref(),
        Expression::AwaitExpression(_)
    ));
}

// ============================================================================
// Modules
// ============================================================================

#[test]
fn test_import_shapes() {
    let file = parse_module_ok("import a, { b as c } from \"m\";");
    let Statement::ImportDeclaration(import) = &file.program.body[0] else {
        panic!("expected import declaration");
    };
    assert_eq!(import.specifiers.len(), 2);
    assert!(matches!(
        &import.specifiers[0],
        ImportSpecifierNode::ImportDefaultSpecifier(s) if s.local.name == "a"
    ));
    assert!(matches!(
        &import.specifiers[1],
        ImportSpecifierNode::ImportSpecifier(s) if s.imported.name == "b" && s.local.name == "c"
    ));
}

#[test]
fn test_duplicate_export() {
    let err = parse_module_err("export var x = 1;\nexport { x };");
    assert_eq!(
        err.message,
        "`x` has already been exported. Exported identifiers must be unique."
    );
}

#[test]
fn test_duplicate_export_through_destructuring() {
    let err = parse_module_err("export var { x } = a;\nexport var x = 1;");
    assert_eq!(
        err.message,
        "`x` has already been exported. Exported identifiers must be unique."
    );
}

#[test]
fn test_only_one_default_export() {
    let err = parse_module_err("export default 1;\nexport default 2;");
    assert_eq!(err.message, "Only one default export allowed per module.");
}

#[test]
fn test_export_outside_module() {
    let err = parse_err("export var x = 1;");
    assert_eq!(
        err.message,
        "'import' and 'export' may appear only with 'sourceType: \"module\"'"
    );
}

#[test]
fn test_module_is_strict_by_default() {
    let err = parse_module_err("eval = 1;");
    assert_eq!(err.message, "Assigning to eval in strict mode");
}

#[test]
fn test_explicit_strict_override_disables_module_strictness() {
    let options = Options {
        strict_mode: Some(false),
        ..Options::module()
    };
    parse_estree(options, "eval = 1;").unwrap();
}

// ============================================================================
// Trivia
// ============================================================================

#[test]
fn test_comments_are_collected_and_attached() {
    let file = parse_ok("// lead\nfoo(); // trail");
    assert_eq!(file.comments.len(), 2);
    let stmt_span = file.program.body[0].span();
    let leading = stmt_span.leading_comments.as_ref().unwrap();
    assert_eq!(leading[0].value, " lead");
    let trailing = stmt_span.trailing_comments.as_ref().unwrap();
    assert_eq!(trailing[0].value, " trail");
}

#[test]
fn test_token_stream_recording() {
    let options = Options {
        tokens: true,
        ..Options::default()
    };
    let file = parse_estree(options, "var x = 1;").unwrap();
    let tokens = file.tokens.as_ref().unwrap();
    let labels: Vec<&str> = tokens.iter().map(|t| t.label).collect();
    assert_eq!(labels, vec!["var", "name", "=", "num", ";"]);
}

#[test]
fn test_node_locations() {
    let file = parse_ok("foo;\nbar;");
    let second = file.program.body[1].span();
    assert_eq!(second.start, 5);
    assert_eq!(second.loc.start.line, 2);
    assert_eq!(second.loc.start.column, 0);
}
