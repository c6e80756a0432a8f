//! ESTree dialect behavior: literal normalization, directive conversion,
//! member normalization, and the validation hooks.

use esparse_parser::ast::*;
use esparse_parser::{parse_estree, Options, SyntaxError};

fn parse_ok(source: &str) -> File {
    parse_estree(Options::default(), source).unwrap()
}

fn parse_err(source: &str) -> SyntaxError {
    parse_estree(Options::default(), source).unwrap_err()
}

fn first_expression(file: &File) -> &Expression {
    match &file.program.body[0] {
        Statement::ExpressionStatement(es) => &es.expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_numeric_literal_round_trip() {
    let file = parse_ok("123");
    match first_expression(&file) {
        Expression::Literal(lit) => {
            assert!(matches!(lit.value, LiteralValue::Number(n) if n == 123.0));
            assert_eq!(lit.raw, "123");
            assert!(lit.regex.is_none());
        }
        other => panic!("expected Literal, got {:?}", other),
    }
}

#[test]
fn test_all_literal_kinds_normalize_to_one_shape() {
    let file = parse_ok("x = [1.5, 'hi', true, false, null];");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::ArrayExpression(arr) = assign.right.as_ref() else {
        panic!("expected array");
    };
    let values: Vec<&Literal> = arr
        .elements
        .iter()
        .map(|el| match el.as_ref().unwrap() {
            Expression::Literal(lit) => lit,
            other => panic!("expected Literal, got {:?}", other),
        })
        .collect();
    assert!(matches!(values[0].value, LiteralValue::Number(n) if n == 1.5));
    assert_eq!(values[0].raw, "1.5");
    assert!(matches!(&values[1].value, LiteralValue::String(s) if s == "hi"));
    assert_eq!(values[1].raw, "'hi'");
    assert!(matches!(values[2].value, LiteralValue::Boolean(true)));
    assert!(matches!(values[3].value, LiteralValue::Boolean(false)));
    assert!(matches!(values[4].value, LiteralValue::Null));
    assert_eq!(values[4].raw, "null");
}

#[test]
fn test_regex_literal_compiles_on_the_host() {
    let file = parse_ok("x = /ab+c/i;");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::Literal(lit) = assign.right.as_ref() else {
        panic!("expected Literal");
    };
    assert!(matches!(lit.value, LiteralValue::Regex(_)));
    let regex = lit.regex.as_ref().unwrap();
    assert_eq!(regex.pattern, "ab+c");
    assert_eq!(regex.flags, "i");
    assert_eq!(lit.raw, "/ab+c/i");
}

#[test]
fn test_regex_resilience_unsupported_pattern_degrades_value() {
    // Look-behind is not supported by the host engine; the value degrades
    // to null but the source pair is still recorded. This must not raise.
    let file = parse_ok("x = /(?<=a)b/;");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::Literal(lit) = assign.right.as_ref() else {
        panic!("expected Literal");
    };
    assert!(matches!(lit.value, LiteralValue::Null));
    let regex = lit.regex.as_ref().unwrap();
    assert_eq!(regex.pattern, "(?<=a)b");
    assert_eq!(regex.flags, "");
}

#[test]
fn test_regex_resilience_backreference() {
    let file = parse_ok("x = /(a)\\1/;");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::Literal(lit) = assign.right.as_ref() else {
        panic!("expected Literal");
    };
    assert!(matches!(lit.value, LiteralValue::Null));
    assert_eq!(lit.regex.as_ref().unwrap().pattern, "(a)\\1");
}

#[test]
fn test_directive_extraction() {
    let file = parse_ok("\"use strict\";\nfoo();");
    assert!(file.program.directives.is_none());
    assert_eq!(file.program.body.len(), 2);
    match &file.program.body[0] {
        Statement::ExpressionStatement(es) => {
            assert_eq!(es.directive.as_deref(), Some("use strict"));
            match es.expression.as_ref() {
                Expression::Literal(lit) => {
                    assert!(matches!(&lit.value, LiteralValue::String(s) if s == "use strict"));
                    assert_eq!(lit.raw, "\"use strict\"");
                }
                other => panic!("expected Literal, got {:?}", other),
            }
        }
        other => panic!("expected expression statement, got {:?}", other),
    }
    match &file.program.body[1] {
        Statement::ExpressionStatement(es) => {
            assert!(matches!(es.expression.as_ref(), Expression::CallExpression(_)));
            assert!(es.directive.is_none());
        }
        other => panic!("expected call statement, got {:?}", other),
    }
}

#[test]
fn test_directive_list_absent_from_serialized_output() {
    let file = parse_ok("\"use strict\";\nfoo();");
    let json = serde_json::to_value(&file.program).unwrap();
    assert!(json.get("directives").is_none());
    assert_eq!(json["body"][0]["directive"], "use strict");
    assert_eq!(json["body"][0]["type"], "ExpressionStatement");
    assert_eq!(json["body"][0]["expression"]["type"], "Literal");
}

#[test]
fn test_parenthesized_string_is_not_a_directive() {
    let file = parse_ok("(\"use strict\");\nfoo();");
    assert_eq!(file.program.body.len(), 2);
    match &file.program.body[0] {
        Statement::ExpressionStatement(es) => assert!(es.directive.is_none()),
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_strict_body_detection_first_candidate_matches() {
    // The first directive candidate matches, so binding `eval` errors.
    let err = parse_err("function f(eval) { \"use strict\"; 1+1; \"also a string\"; }");
    assert_eq!(err.message, "Binding eval in strict mode");
}

#[test]
fn test_strict_body_detection_stops_at_first_non_literal() {
    // Scanning stops at `1+1`, so the later "use strict" does not count.
    parse_ok("function f(eval) { 1+1; \"use strict\"; }");
}

#[test]
fn test_getter_arity_error() {
    let err = parse_err("var x = { get x(a) {} };");
    assert_eq!(err.message, "getter should have no params");
    assert_eq!(err.pos, 10);
}

#[test]
fn test_setter_arity_error() {
    let err = parse_err("var x = { set y() {} };");
    assert_eq!(err.message, "setter should have exactly one param");
    assert_eq!(err.pos, 10);
}

#[test]
fn test_class_accessor_arity_error() {
    let err = parse_err("class A { get x(a) {} }");
    assert_eq!(err.message, "getter should have no params");
    assert_eq!(err.pos, 10);
}

#[test]
fn test_duplicate_proto_raises() {
    let err = parse_err("({ __proto__: 1, __proto__: 2 });");
    assert_eq!(err.message, "Redefinition of __proto__ property");
    assert_eq!(err.pos, 17);
}

#[test]
fn test_proto_string_key_also_counts() {
    let err = parse_err("({ \"__proto__\": 1, __proto__: 2 });");
    assert_eq!(err.message, "Redefinition of __proto__ property");
}

#[test]
fn test_proto_map_is_scoped_per_object_literal() {
    parse_ok("x = [{ __proto__: 1 }, { __proto__: 2 }];");
}

#[test]
fn test_computed_proto_does_not_count() {
    parse_ok("x = { [\"__proto__\"]: 1, __proto__: 2 };");
}

#[test]
fn test_pattern_rejects_getter() {
    let err = parse_err("({ get x() {} } = y);");
    assert_eq!(err.message, "Object pattern can't contain getter or setter");
    assert_eq!(err.pos, 7);
}

#[test]
fn test_pattern_rejects_setter() {
    let err = parse_err("({ set x(v) {} } = y);");
    assert_eq!(err.message, "Object pattern can't contain getter or setter");
}

#[test]
fn test_pattern_rejects_methods() {
    let err = parse_err("({ m() {} } = y);");
    assert_eq!(err.message, "Object pattern can't contain methods");
    assert_eq!(err.pos, 3);
}

#[test]
fn test_object_members_normalize_to_property() {
    let file = parse_ok("x = { a: 1, b, m() {}, get g() {}, set s(v) {} };");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::ObjectExpression(obj) = assign.right.as_ref() else {
        panic!("expected object");
    };
    let props: Vec<&Property> = obj
        .properties
        .iter()
        .map(|member| match member {
            ObjectMember::Property(p) => p,
            other => panic!("expected normalized Property, got {:?}", other),
        })
        .collect();
    assert_eq!(props.len(), 5);
    assert_eq!(props[0].kind, PropertyKind::Init);
    assert!(!props[0].method);
    assert!(!props[0].shorthand);
    assert!(props[1].shorthand);
    // Methods fold into kind "init" with the method flag.
    assert_eq!(props[2].kind, PropertyKind::Init);
    assert!(props[2].method);
    assert!(matches!(
        props[2].value.as_ref(),
        Expression::FunctionExpression(_)
    ));
    assert_eq!(props[3].kind, PropertyKind::Get);
    assert!(!props[3].method);
    assert_eq!(props[4].kind, PropertyKind::Set);
}

#[test]
fn test_class_method_becomes_method_definition() {
    let file = parse_ok("class A { constructor() {} foo(x) { return x; } }");
    let Statement::ClassDeclaration(class) = &file.program.body[0] else {
        panic!("expected class declaration");
    };
    assert_eq!(class.body.body.len(), 2);
    let ClassMember::MethodDefinition(ctor) = &class.body.body[0] else {
        panic!("expected MethodDefinition");
    };
    assert_eq!(ctor.kind, MethodKind::Constructor);
    let ClassMember::MethodDefinition(method) = &class.body.body[1] else {
        panic!("expected MethodDefinition");
    };
    assert_eq!(method.kind, MethodKind::Method);
    assert!(!method.is_static);
    let Expression::FunctionExpression(value) = method.value.as_ref() else {
        panic!("expected FunctionExpression value");
    };
    assert_eq!(value.params.len(), 1);
    assert_eq!(value.body.body.len(), 1);
}

#[test]
fn test_class_method_type_parameters_move_to_function_value() {
    let file = parse_ok("class A { map<T, U>(x) { return x; } }");
    let Statement::ClassDeclaration(class) = &file.program.body[0] else {
        panic!("expected class declaration");
    };
    let ClassMember::MethodDefinition(method) = &class.body.body[0] else {
        panic!("expected MethodDefinition");
    };
    // The wrapper has no slot for type parameters; they live on the inner
    // function value.
    let Expression::FunctionExpression(value) = method.value.as_ref() else {
        panic!("expected FunctionExpression value");
    };
    let type_params = value.type_parameters.as_ref().unwrap();
    assert_eq!(type_params.params.len(), 2);
    assert_eq!(type_params.params[0].name, "T");
    assert_eq!(type_params.params[1].name, "U");
}

#[test]
fn test_destructuring_declaration_members_are_properties() {
    let file = parse_ok("var { a, b: [c] } = obj;");
    let Statement::VariableDeclaration(decl) = &file.program.body[0] else {
        panic!("expected variable declaration");
    };
    let Expression::ObjectPattern(pattern) = decl.declarations[0].id.as_ref() else {
        panic!("expected object pattern");
    };
    let ObjectMember::Property(shorthand) = &pattern.properties[0] else {
        panic!("expected Property member");
    };
    assert!(shorthand.shorthand);
    assert_eq!(shorthand.kind, PropertyKind::Init);
    let ObjectMember::Property(nested) = &pattern.properties[1] else {
        panic!("expected Property member");
    };
    assert!(matches!(nested.value.as_ref(), Expression::ArrayPattern(_)));
}

#[test]
fn test_assignment_converts_object_literal_to_pattern() {
    let file = parse_ok("({ a, b: c.d } = obj);");
    let Expression::AssignmentExpression(assign) = first_expression(&file) else {
        panic!("expected assignment");
    };
    let Expression::ObjectPattern(pattern) = assign.left.as_ref() else {
        panic!("expected left side converted to ObjectPattern");
    };
    assert_eq!(pattern.properties.len(), 2);
    let ObjectMember::Property(second) = &pattern.properties[1] else {
        panic!("expected Property member");
    };
    assert!(matches!(
        second.value.as_ref(),
        Expression::MemberExpression(_)
    ));
}

#[test]
fn test_serialized_type_tags() {
    let file = parse_ok("x = { get g() {} };");
    let json = serde_json::to_value(&file.program).unwrap();
    let prop = &json["body"][0]["expression"]["right"]["properties"][0];
    assert_eq!(prop["type"], "Property");
    assert_eq!(prop["kind"], "get");
    assert_eq!(prop["method"], false);
    assert_eq!(prop["value"]["type"], "FunctionExpression");
}

#[test]
fn test_directive_with_escape_keeps_raw_in_directive_field() {
    let file = parse_ok("\"use\\x20strict\";");
    match &file.program.body[0] {
        Statement::ExpressionStatement(es) => {
            // The directive field holds the unquoted raw text; the literal
            // value holds the cooked string.
            assert_eq!(es.directive.as_deref(), Some("use\\x20strict"));
            match es.expression.as_ref() {
                Expression::Literal(lit) => {
                    assert!(matches!(&lit.value, LiteralValue::String(s) if s == "use strict"));
                }
                other => panic!("expected Literal, got {:?}", other),
            }
        }
        other => panic!("expected expression statement, got {:?}", other),
    }
}
