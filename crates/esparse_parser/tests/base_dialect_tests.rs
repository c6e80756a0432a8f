//! Base dialect behavior: typed literal shapes with raw metadata, base
//! member shapes, and the separate directives list.

use esparse_parser::ast::*;
use esparse_parser::{parse, Options, SyntaxError};

fn parse_ok(source: &str) -> File {
    parse(Options::default(), source).unwrap()
}

fn parse_err(source: &str) -> SyntaxError {
    parse(Options::default(), source).unwrap_err()
}

#[test]
fn test_base_literals_keep_their_own_types() {
    let file = parse_ok("x = [1, 'a', true, null, /b/g];");
    let Statement::ExpressionStatement(es) = &file.program.body[0] else {
        panic!("expected expression statement");
    };
    let Expression::AssignmentExpression(assign) = es.expression.as_ref() else {
        panic!("expected assignment");
    };
    let Expression::ArrayExpression(arr) = assign.right.as_ref() else {
        panic!("expected array");
    };
    match arr.elements[0].as_ref().unwrap() {
        Expression::NumericLiteral(lit) => {
            assert_eq!(lit.value, 1.0);
            assert_eq!(lit.extra.as_ref().unwrap().raw.as_deref(), Some("1"));
        }
        other => panic!("expected NumericLiteral, got {:?}", other),
    }
    match arr.elements[1].as_ref().unwrap() {
        Expression::StringLiteral(lit) => {
            assert_eq!(lit.value, "a");
            assert_eq!(lit.extra.as_ref().unwrap().raw.as_deref(), Some("'a'"));
        }
        other => panic!("expected StringLiteral, got {:?}", other),
    }
    assert!(matches!(
        arr.elements[2].as_ref().unwrap(),
        Expression::BooleanLiteral(b) if b.value
    ));
    assert!(matches!(
        arr.elements[3].as_ref().unwrap(),
        Expression::NullLiteral(_)
    ));
    match arr.elements[4].as_ref().unwrap() {
        Expression::RegExpLiteral(lit) => {
            assert_eq!(lit.pattern, "b");
            assert_eq!(lit.flags, "g");
        }
        other => panic!("expected RegExpLiteral, got {:?}", other),
    }
}

#[test]
fn test_base_directives_stay_in_their_own_list() {
    let file = parse_ok("\"use strict\";\nfoo();");
    let directives = file.program.directives.as_ref().unwrap();
    assert_eq!(directives.len(), 1);
    // The base directive literal's value is the quote-stripped raw text.
    assert_eq!(directives[0].value.value, "use strict");
    assert_eq!(
        directives[0].value.extra.as_ref().unwrap().raw.as_deref(),
        Some("\"use strict\"")
    );
    // The directive is not duplicated into the statement list.
    assert_eq!(file.program.body.len(), 1);
    let json = serde_json::to_value(&file.program).unwrap();
    assert_eq!(json["directives"][0]["value"]["value"], "use strict");
    assert_eq!(json["directives"][0]["value"]["extra"]["raw"], "\"use strict\"");
}

#[test]
fn test_blocks_without_directive_position_keep_empty_list() {
    let file = parse_ok("{ foo(); }");
    let Statement::BlockStatement(block) = &file.program.body[0] else {
        panic!("expected block statement");
    };
    assert!(block.directives.as_ref().is_some_and(|d| d.is_empty()));
}

#[test]
fn test_base_object_members() {
    let file = parse_ok("x = { a: 1, b, m() {}, get g() {} };");
    let Statement::ExpressionStatement(es) = &file.program.body[0] else {
        panic!("expected expression statement");
    };
    let Expression::AssignmentExpression(assign) = es.expression.as_ref() else {
        panic!("expected assignment");
    };
    let Expression::ObjectExpression(obj) = assign.right.as_ref() else {
        panic!("expected object");
    };
    assert!(matches!(&obj.properties[0], ObjectMember::ObjectProperty(p) if !p.shorthand));
    assert!(matches!(&obj.properties[1], ObjectMember::ObjectProperty(p) if p.shorthand));
    assert!(
        matches!(&obj.properties[2], ObjectMember::ObjectMethod(m) if m.kind == MethodKind::Method)
    );
    assert!(
        matches!(&obj.properties[3], ObjectMember::ObjectMethod(m) if m.kind == MethodKind::Get)
    );
}

#[test]
fn test_base_class_methods_are_flat() {
    let file = parse_ok("class A { foo<T>(x) {} }");
    let Statement::ClassDeclaration(class) = &file.program.body[0] else {
        panic!("expected class declaration");
    };
    let ClassMember::ClassMethod(method) = &class.body.body[0] else {
        panic!("expected ClassMethod");
    };
    // The base shape keeps params, body, and type parameters on the member.
    assert_eq!(method.kind, MethodKind::Method);
    assert_eq!(method.params.len(), 1);
    let type_params = method.type_parameters.as_ref().unwrap();
    assert_eq!(type_params.params[0].name, "T");
}

#[test]
fn test_base_accessor_arity_check_also_applies() {
    let err = parse_err("x = { get g(a) {} };");
    assert_eq!(err.message, "getter should have no params");
}

#[test]
fn test_base_duplicate_proto() {
    let err = parse_err("x = { __proto__: 1, __proto__: 2 };");
    assert_eq!(err.message, "Redefinition of __proto__ property");
}

#[test]
fn test_base_pattern_conversion_produces_object_pattern() {
    let file = parse_ok("({ a, b: c } = obj);");
    let Statement::ExpressionStatement(es) = &file.program.body[0] else {
        panic!("expected expression statement");
    };
    let Expression::AssignmentExpression(assign) = es.expression.as_ref() else {
        panic!("expected assignment");
    };
    let Expression::ObjectPattern(pattern) = assign.left.as_ref() else {
        panic!("expected object pattern");
    };
    assert!(matches!(
        &pattern.properties[0],
        ObjectMember::ObjectProperty(_)
    ));
}

#[test]
fn test_base_pattern_rejects_methods() {
    let err = parse_err("({ m() {} } = y);");
    assert_eq!(err.message, "Object pattern can't contain methods");
}

#[test]
fn test_base_strict_body_reads_directive_list() {
    let err = parse_err("function f(eval) { \"use strict\"; }");
    assert_eq!(err.message, "Binding eval in strict mode");
    parse(
        Options::default(),
        "function f(eval) { 1+1; \"use strict\"; }",
    )
    .unwrap();
}

#[test]
fn test_base_directive_value_is_raw_not_cooked() {
    // In the base dialect the directive value keeps escapes as written, so
    // an escaped spelling of "use strict" does not enable strict mode.
    let file = parse_ok("\"use\\x20strict\";\n010;");
    let directives = file.program.directives.as_ref().unwrap();
    assert_eq!(directives[0].value.value, "use\\x20strict");
}
