use jsgoto::ast::*;
use jsgoto::parser;

fn parse(source: &str) -> Program {
    parser::parse(source).expect("parse failed")
}

fn parse_err(source: &str) -> parser::SyntaxError {
    parser::parse(source).expect_err("expected a syntax error")
}

fn only_expression(program: &Program) -> &Expression {
    assert_eq!(program.body.len(), 1, "expected a single statement");
    match &program.body[0].inner {
        StatementKind::Expression(expression) => expression,
        other => panic!("expected expression statement, got {}", other.name()),
    }
}

#[test]
fn test_binary_precedence() {
    let program = parse("x = 1 + 2 * 3;");
    let ExpressionKind::Assignment { value, .. } = &only_expression(&program).inner else {
        panic!("expected assignment");
    };
    let ExpressionKind::Binary {
        op: BinaryOp::Addition,
        rhs,
        ..
    } = &value.inner
    else {
        panic!("expected addition at the top");
    };
    assert!(matches!(
        rhs.inner,
        ExpressionKind::Binary {
            op: BinaryOp::Multiplication,
            ..
        }
    ));
}

#[test]
fn test_comparison_of_additions() {
    let program = parse("a + 1 < b + 2;");
    assert!(matches!(
        only_expression(&program).inner,
        ExpressionKind::Binary {
            op: BinaryOp::LessThan,
            ..
        }
    ));
}

#[test]
fn test_member_and_call_chain() {
    let program = parse("a.b.c(1)[d];");
    let ExpressionKind::Member {
        object, computed, ..
    } = &only_expression(&program).inner
    else {
        panic!("expected outer member access");
    };
    assert!(*computed);
    let ExpressionKind::Call { callee, arguments } = &object.inner else {
        panic!("expected call under the computed access");
    };
    assert_eq!(arguments.len(), 1);
    assert!(matches!(
        callee.inner,
        ExpressionKind::Member { computed: false, .. }
    ));
}

#[test]
fn test_keyword_property_names() {
    let program = parse("a.delete;");
    let ExpressionKind::Member { property, .. } = &only_expression(&program).inner else {
        panic!("expected member access");
    };
    assert!(
        matches!(&property.inner, ExpressionKind::Identifier(name) if name == "delete"),
        "keywords are valid property names"
    );
}

#[test]
fn test_asi_after_return() {
    let program = parse("function f() { return\nx; }");
    let StatementKind::FunctionDeclaration { function, .. } = &program.body[0].inner else {
        panic!("expected function declaration");
    };
    assert!(matches!(function.body[0].inner, StatementKind::Return(None)));
    assert!(matches!(
        function.body[1].inner,
        StatementKind::Expression(_)
    ));
}

#[test]
fn test_asi_at_line_ends() {
    let program = parse("x = 1\ny = 2\n");
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_missing_semicolon_without_newline_is_an_error() {
    let error = parse_err("x = 1 y = 2");
    assert!(error.message.contains("';'"), "got: {}", error.message);
}

#[test]
fn test_throw_requires_expression_on_same_line() {
    let error = parse_err("throw\nx;");
    assert_eq!(error.line, 2);
}

#[test]
fn test_postfix_update_is_restricted() {
    // The line terminator splits this into `x` and `++y`.
    let program = parse("x\n++y;");
    assert_eq!(program.body.len(), 2);
    assert!(matches!(
        &program.body[1].inner,
        StatementKind::Expression(e) if matches!(e.inner, ExpressionKind::Update { prefixed: true, .. })
    ));
}

#[test]
fn test_labelled_statement() {
    let program = parse("loop: while (a) { break loop; }");
    let StatementKind::Labelled { label, body } = &program.body[0].inner else {
        panic!("expected labeled statement");
    };
    assert_eq!(label, "loop");
    assert!(matches!(body.inner, StatementKind::While { .. }));
}

#[test]
fn test_for_in_and_classic_for() {
    let program = parse("for (var k in o) {}");
    assert!(matches!(
        program.body[0].inner,
        StatementKind::ForIn {
            declaration: true,
            ..
        }
    ));

    let program = parse("for (var i = 0, j = 1; ; i = i + 1) {}");
    let StatementKind::For { init, test, update, .. } = &program.body[0].inner else {
        panic!("expected for statement");
    };
    assert!(matches!(init, Some(ForInit::Declaration(_))));
    assert!(test.is_none());
    assert!(update.is_some());
}

#[test]
fn test_string_escapes() {
    let program = parse(r#"x = "a\n\t\"A";"#);
    let ExpressionKind::Assignment { value, .. } = &only_expression(&program).inner else {
        panic!("expected assignment");
    };
    assert!(matches!(
        &value.inner,
        ExpressionKind::Literal(LiteralValue::String(s)) if s == "a\n\t\"A"
    ));
}

#[test]
fn test_numeric_literals() {
    let program = parse("x = 0x10 + 1.5e2 + .25;");
    // 16 + 150 + 0.25 across two additions; just check it parses into
    // literals with the right values.
    let mut values = Vec::new();
    fn collect(expression: &Expression, out: &mut Vec<f64>) {
        match &expression.inner {
            ExpressionKind::Literal(LiteralValue::Number(n)) => out.push(*n),
            ExpressionKind::Binary { lhs, rhs, .. } => {
                collect(lhs, out);
                collect(rhs, out);
            }
            ExpressionKind::Assignment { value, .. } => collect(value, out),
            _ => {}
        }
    }
    collect(only_expression(&program), &mut values);
    assert_eq!(values, vec![16.0, 150.0, 0.25]);
}

#[test]
fn test_invalid_assignment_target() {
    let error = parse_err("1 = 2;");
    assert!(error.message.contains("left-hand side"));
}

#[test]
fn test_switch_rejects_two_defaults() {
    let error = parse_err("switch (x) { default: default: }");
    assert!(error.message.contains("default"));
}

#[test]
fn test_try_requires_catch_or_finally() {
    let error = parse_err("try { f(); }");
    assert!(error.message.contains("catch"));
}

#[test]
fn test_unterminated_string() {
    let error = parse_err("x = \"abc");
    assert!(error.message.contains("unterminated"));
}

#[test]
fn test_goto_output_forms_reparse() {
    // The lowered output's shapes must round-trip through the parser.
    let program = parse("B0: {\n  $0 = x === 1;\n  GOTO($0 ? \"B1\" : \"B2\");\n}\n");
    let StatementKind::Labelled { label, body } = &program.body[0].inner else {
        panic!("expected labeled block");
    };
    assert_eq!(label, "B0");
    let StatementKind::Block(children) = &body.inner else {
        panic!("expected block");
    };
    assert_eq!(children.len(), 2);
    let StatementKind::Expression(goto) = &children[1].inner else {
        panic!("expected GOTO statement");
    };
    let ExpressionKind::Call { callee, arguments } = &goto.inner else {
        panic!("expected GOTO call");
    };
    assert!(matches!(&callee.inner, ExpressionKind::Identifier(n) if n == "GOTO"));
    assert!(matches!(
        arguments[0].inner,
        ExpressionKind::Conditional { .. }
    ));
}
