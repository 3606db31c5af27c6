use jsgoto::ast::*;
use jsgoto::lowering::{self, LoweringError};
use jsgoto::{lower_source, parser, printer};

// =============================================================================
// Helpers
// =============================================================================

fn lower(source: &str) -> Program {
    let program = parser::parse(source).expect("parse failed");
    lowering::lower_program(&program).expect("lowering failed")
}

fn lower_err(source: &str) -> LoweringError {
    let program = parser::parse(source).expect("parse failed");
    lowering::lower_program(&program).expect_err("expected lowering to fail")
}

/// The labeled blocks of a lowered program, in order.
fn blocks(program: &Program) -> Vec<(String, &[Statement])> {
    let mut out = Vec::new();
    for statement in program.body.iter().skip(1) {
        let StatementKind::Labelled { label, body } = &statement.inner else {
            panic!("expected labeled block, got {}", statement.inner.name());
        };
        let StatementKind::Block(children) = &body.inner else {
            panic!("expected block body under label {}", label);
        };
        out.push((label.clone(), children.as_slice()));
    }
    out
}

/// Names declared by the `var` prologue.
fn prologue(program: &Program) -> Vec<String> {
    let StatementKind::VariableDeclaration { declarations } = &program.body[0].inner else {
        panic!("expected var prologue, got {}", program.body[0].inner.name());
    };
    declarations.iter().map(|d| d.name.clone()).collect()
}

#[derive(Debug, PartialEq)]
enum Goto {
    To(String),
    Branch(String, String),
}

fn goto_of(statement: &Statement) -> Option<Goto> {
    let StatementKind::Expression(expression) = &statement.inner else {
        return None;
    };
    let ExpressionKind::Call { callee, arguments } = &expression.inner else {
        return None;
    };
    let ExpressionKind::Identifier(name) = &callee.inner else {
        return None;
    };
    if name != "GOTO" || arguments.len() != 1 {
        return None;
    }
    match &arguments[0].inner {
        ExpressionKind::Literal(LiteralValue::String(target)) => Some(Goto::To(target.clone())),
        ExpressionKind::Conditional {
            consequent,
            alternate,
            ..
        } => {
            let ExpressionKind::Literal(LiteralValue::String(a)) = &consequent.inner else {
                return None;
            };
            let ExpressionKind::Literal(LiteralValue::String(b)) = &alternate.inner else {
                return None;
            };
            Some(Goto::Branch(a.clone(), b.clone()))
        }
        _ => None,
    }
}

/// `(helper, argument count)` of a bare helper-call statement.
fn helper_call(statement: &Statement) -> Option<(String, usize)> {
    let StatementKind::Expression(expression) = &statement.inner else {
        return None;
    };
    let ExpressionKind::Call { callee, arguments } = &expression.inner else {
        return None;
    };
    let ExpressionKind::Identifier(name) = &callee.inner else {
        return None;
    };
    if matches!(name.as_str(), "CALL" | "GET_PROPERTY" | "SET_PROPERTY") {
        Some((name.clone(), arguments.len()))
    } else {
        None
    }
}

/// `(target, value)` of an assignment statement.
fn assignment(statement: &Statement) -> Option<(String, &Expression)> {
    let StatementKind::Expression(expression) = &statement.inner else {
        return None;
    };
    let ExpressionKind::Assignment { target, value, .. } = &expression.inner else {
        return None;
    };
    let ExpressionKind::Identifier(name) = &target.inner else {
        return None;
    };
    Some((name.clone(), value))
}

fn identifier_of(expression: &Expression) -> Option<&str> {
    match &expression.inner {
        ExpressionKind::Identifier(name) => Some(name),
        _ => None,
    }
}

fn collect_identifiers(expression: &Expression, out: &mut Vec<String>) {
    match &expression.inner {
        ExpressionKind::Identifier(name) => out.push(name.clone()),
        ExpressionKind::Literal(_) | ExpressionKind::This => {}
        // Nested functions have their own scope and prologue.
        ExpressionKind::Function(_) => {}
        ExpressionKind::Member {
            object,
            property,
            computed,
        } => {
            collect_identifiers(object, out);
            if *computed {
                collect_identifiers(property, out);
            }
        }
        ExpressionKind::Assignment { target, value, .. } => {
            collect_identifiers(target, out);
            collect_identifiers(value, out);
        }
        ExpressionKind::Call { callee, arguments } | ExpressionKind::New { callee, arguments } => {
            collect_identifiers(callee, out);
            for argument in arguments {
                collect_identifiers(argument, out);
            }
        }
        ExpressionKind::Unary { operand, .. } => collect_identifiers(operand, out),
        ExpressionKind::Update { argument, .. } => collect_identifiers(argument, out),
        ExpressionKind::Binary { lhs, rhs, .. } | ExpressionKind::Logical { lhs, rhs, .. } => {
            collect_identifiers(lhs, out);
            collect_identifiers(rhs, out);
        }
        ExpressionKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            collect_identifiers(test, out);
            collect_identifiers(consequent, out);
            collect_identifiers(alternate, out);
        }
        ExpressionKind::Sequence(expressions) | ExpressionKind::Array(expressions) => {
            for e in expressions {
                collect_identifiers(e, out);
            }
        }
        ExpressionKind::Object(properties) => {
            for property in properties {
                collect_identifiers(&property.value, out);
            }
        }
    }
}

// =============================================================================
// Universal properties
// =============================================================================

fn assert_wellformed(program: &Program) {
    let blocks = blocks(program);

    // Label uniqueness: labels are the contiguous range B0..Bn-1.
    for (index, (label, _)) in blocks.iter().enumerate() {
        assert_eq!(label, &format!("B{}", index));
    }

    // Single exit: a GOTO is always the last entry of its block.
    for (label, statements) in &blocks {
        for (index, statement) in statements.iter().enumerate() {
            if goto_of(statement).is_some() {
                assert_eq!(
                    index,
                    statements.len() - 1,
                    "GOTO is not the terminator of {}",
                    label
                );
            }
        }
    }

    // No dangling jumps.
    let labels: Vec<&String> = blocks.iter().map(|(label, _)| label).collect();
    for (label, statements) in &blocks {
        for statement in statements.iter() {
            match goto_of(statement) {
                Some(Goto::To(target)) => {
                    assert!(labels.contains(&&target), "dangling {} in {}", target, label)
                }
                Some(Goto::Branch(a, b)) => {
                    assert!(labels.contains(&&a), "dangling {} in {}", a, label);
                    assert!(labels.contains(&&b), "dangling {} in {}", b, label);
                }
                None => {}
            }
        }
    }

    // Scope closure: every referenced identifier is declared in the
    // prologue or is one of the known sentinels.
    let declared = prologue(program);
    let sentinels = ["undefined", "GOTO", "GET_PROPERTY", "SET_PROPERTY", "CALL"];
    for (label, statements) in &blocks {
        for statement in statements.iter() {
            if let StatementKind::Expression(expression) = &statement.inner {
                let mut used = Vec::new();
                collect_identifiers(expression, &mut used);
                for name in used {
                    assert!(
                        declared.contains(&name) || sentinels.contains(&name.as_str()),
                        "undeclared identifier {} in {}",
                        name,
                        label
                    );
                }
            }
        }
    }
}

// Samples declare their variables so the scope-closure property is
// checkable; free references to implicit globals would trivially
// escape the prologue.
const SAMPLES: &[&str] = &[
    "var a, b, c; if (a) { b(); } else { c(); }",
    "var a, b, c; while (a) { if (b) break; c(); }",
    "var f, g; try { f(); } catch (e) { g(e); }",
    "var x, a, b, c; switch (x) { case 1: a(); break; case 2: b(); default: c(); }",
    "for (var i = 0; i < 10; i = i + 1) { if (i === 5) continue; }",
    "var g; function h(n) { return h(g(n)); } h(1);",
    "var a, b; do { a(); } while (b);",
    "var a, b; outer: while (a) { while (b) { continue outer; } }",
    "var o, f; o.x = f(o.y, 2); throw o.x;",
];

#[test]
fn test_wellformed_output() {
    for source in SAMPLES {
        assert_wellformed(&lower(source));
    }
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn test_if_else_splits_into_conditional_arms() {
    let program = lower("if (a) { b(); } else { c(); }");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 5);

    // Entry: conditional jump on `a`.
    assert_eq!(blocks[0].1.len(), 1);
    let Some(Goto::Branch(then_label, else_label)) = goto_of(&blocks[0].1[0]) else {
        panic!("entry block must end in a conditional GOTO");
    };
    assert_eq!(then_label, "B1");
    assert_eq!(else_label, "B3");

    // Then arm: CALL(b, undefined) plus throw-check.
    assert_eq!(helper_call(&blocks[1].1[0]), Some(("CALL".to_string(), 2)));
    assert!(matches!(goto_of(&blocks[1].1[1]), Some(Goto::Branch(_, _))));

    // Then arm jumps over the else arm to the join point.
    assert_eq!(goto_of(&blocks[2].1[0]), Some(Goto::To("B4".to_string())));

    // Else arm: CALL(c, undefined) plus throw-check, falling through.
    assert_eq!(helper_call(&blocks[3].1[0]), Some(("CALL".to_string(), 2)));
}

#[test]
fn test_while_with_break() {
    let program = lower("while (a) { if (b) break; c(); }");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 6);

    // Loop head tests `a` and leaves on false.
    assert_eq!(
        goto_of(&blocks[0].1[0]),
        Some(Goto::Branch("B1".to_string(), "B5".to_string()))
    );
    // `break` jumps straight to the loop exit.
    assert_eq!(goto_of(&blocks[2].1[0]), Some(Goto::To("B5".to_string())));
    // Back-edge to the loop head.
    assert_eq!(goto_of(&blocks[4].1[0]), Some(Goto::To("B0".to_string())));
}

#[test]
fn test_try_catch_shadows_parameter() {
    let program = lower("try { f(); } catch (e) { g(e); }");
    let blocks = blocks(&program);

    // Try body: CALL(f) and throw-check routing into the handler.
    assert_eq!(helper_call(&blocks[0].1[0]), Some(("CALL".to_string(), 2)));
    let Some(Goto::Branch(handler_label, success_label)) = goto_of(&blocks[0].1[1]) else {
        panic!("try body must end in a throw-check");
    };
    assert_eq!(handler_label, "B2");
    assert_eq!(success_label, "B1");

    // Success path skips the handler.
    assert_eq!(goto_of(&blocks[1].1[0]), Some(Goto::To("B4".to_string())));

    // Handler: save e, move __ERROR into it, clear __ERROR, call g(e).
    let handler = blocks[2].1;
    let (saved, original) = assignment(&handler[0]).expect("shadow save");
    assert_eq!(saved, "$0");
    assert_eq!(identifier_of(original), Some("e"));
    let (param, error) = assignment(&handler[1]).expect("shadow load");
    assert_eq!(param, "e");
    assert_eq!(identifier_of(error), Some("__ERROR"));
    let (error, cleared) = assignment(&handler[2]).expect("error clear");
    assert_eq!(error, "__ERROR");
    assert_eq!(identifier_of(cleared), Some("undefined"));
    assert_eq!(helper_call(&handler[3]), Some(("CALL".to_string(), 3)));

    // Unshadow after the handler body.
    let (param, saved) = assignment(&blocks[3].1[0]).expect("shadow restore");
    assert_eq!(param, "e");
    assert_eq!(identifier_of(saved), Some("$0"));
}

#[test]
fn test_switch_fall_through_and_default() {
    let program = lower("switch (x) { case 1: a(); break; case 2: b(); default: c(); }");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 10);

    // First test: $0 = x === 1, branch to the case body or the next test.
    let (temp, comparison) = assignment(&blocks[0].1[0]).expect("case test binding");
    assert_eq!(temp, "$0");
    assert!(matches!(
        comparison.inner,
        ExpressionKind::Binary {
            op: BinaryOp::StrictlyEquals,
            ..
        }
    ));
    assert_eq!(
        goto_of(&blocks[0].1[1]),
        Some(Goto::Branch("B1".to_string(), "B4".to_string()))
    );

    // case 1 breaks past the whole switch.
    assert_eq!(goto_of(&blocks[2].1[0]), Some(Goto::To("B9".to_string())));

    // Failed second test enters the default body.
    assert_eq!(
        goto_of(&blocks[4].1[1]),
        Some(Goto::Branch("B5".to_string(), "B7".to_string()))
    );
    // case 2 falls through into the default body.
    assert_eq!(goto_of(&blocks[6].1[0]), Some(Goto::To("B7".to_string())));
    // The default body is where the no-match chain lands.
    assert_eq!(helper_call(&blocks[7].1[0]), Some(("CALL".to_string(), 2)));
}

#[test]
fn test_for_loop_continue_targets_update() {
    let program = lower("for (var i = 0; i < 10; i = i + 1) { if (i === 5) continue; }");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 6);

    // Initializer.
    let (name, value) = assignment(&blocks[0].1[0]).expect("initializer");
    assert_eq!(name, "i");
    assert!(matches!(
        value.inner,
        ExpressionKind::Literal(LiteralValue::Number(_))
    ));

    // Head: $0 = i < 10; GOTO($0 ? body : exit).
    assert_eq!(
        goto_of(&blocks[1].1[1]),
        Some(Goto::Branch("B2".to_string(), "B5".to_string()))
    );

    // continue jumps to the update's entry.
    assert_eq!(goto_of(&blocks[3].1[0]), Some(Goto::To("B4".to_string())));

    // Update block: i = i + 1 and the back-edge to the head.
    let (name, _) = assignment(&blocks[4].1[0]).expect("update");
    assert_eq!(name, "i");
    assert_eq!(goto_of(&blocks[4].1[1]), Some(Goto::To("B1".to_string())));
}

#[test]
fn test_return_threads_nested_calls() {
    let program = lower("return f(g());");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 4);

    // g() first, with its throw-check.
    assert_eq!(helper_call(&blocks[0].1[0]), Some(("CALL".to_string(), 2)));
    assert_eq!(
        goto_of(&blocks[0].1[1]),
        Some(Goto::Branch("B3".to_string(), "B1".to_string()))
    );

    // Its result is pinned before the outer call consumes it.
    let (temp, result) = assignment(&blocks[1].1[0]).expect("result binding");
    assert_eq!(temp, "$0");
    assert_eq!(identifier_of(result), Some("__RESULT"));
    assert_eq!(helper_call(&blocks[1].1[1]), Some(("CALL".to_string(), 3)));

    // The return jumps to the epilogue.
    assert_eq!(goto_of(&blocks[2].1[0]), Some(Goto::To("B3".to_string())));
    assert!(blocks[3].1.is_empty());
}

#[test]
fn test_do_while_tests_after_body() {
    let program = lower("do { a(); } while (b);");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 3);

    assert_eq!(helper_call(&blocks[0].1[0]), Some(("CALL".to_string(), 2)));
    assert_eq!(
        goto_of(&blocks[1].1[0]),
        Some(Goto::Branch("B0".to_string(), "B2".to_string()))
    );
}

#[test]
fn test_method_call_pins_receiver() {
    let program = lower("o.m(x);");
    let blocks = blocks(&program);

    // GET_PROPERTY(o, "m") resolves the method.
    assert_eq!(
        helper_call(&blocks[0].1[0]),
        Some(("GET_PROPERTY".to_string(), 2))
    );
    // The resolved callee is pinned, then CALL(callee, o, x).
    let (temp, result) = assignment(&blocks[1].1[0]).expect("callee binding");
    assert_eq!(temp, "$0");
    assert_eq!(identifier_of(result), Some("__RESULT"));

    let StatementKind::Expression(call) = &blocks[1].1[1].inner else {
        panic!("expected CALL statement");
    };
    let ExpressionKind::Call { arguments, .. } = &call.inner else {
        panic!("expected CALL statement");
    };
    assert_eq!(arguments.len(), 3);
    assert_eq!(identifier_of(&arguments[0]), Some("$0"));
    assert_eq!(identifier_of(&arguments[1]), Some("o"));
    assert_eq!(identifier_of(&arguments[2]), Some("x"));
}

#[test]
fn test_member_read_and_write_use_helpers() {
    let program = lower("x = a.b; a[k] = y;");
    let blocks = blocks(&program);

    assert_eq!(
        helper_call(&blocks[0].1[0]),
        Some(("GET_PROPERTY".to_string(), 2))
    );
    let (name, value) = assignment(&blocks[1].1[0]).expect("property read result");
    assert_eq!(name, "x");
    assert_eq!(identifier_of(value), Some("__RESULT"));
    assert_eq!(
        helper_call(&blocks[1].1[1]),
        Some(("SET_PROPERTY".to_string(), 3))
    );
}

#[test]
fn test_labelled_continue_reaches_outer_loop() {
    let program = lower("outer: while (a) { while (b) { continue outer; } }");
    let blocks = blocks(&program);

    // The outer back-edge target is B0; the labeled continue inside the
    // inner loop jumps there directly.
    let back_edges: Vec<&str> = blocks
        .iter()
        .flat_map(|(_, statements)| statements.iter())
        .filter_map(|statement| match goto_of(statement) {
            Some(Goto::To(target)) if target == "B0" => Some("B0"),
            _ => None,
        })
        .collect();
    assert!(
        back_edges.len() >= 2,
        "expected both the labeled continue and the outer back-edge to target B0"
    );
}

#[test]
fn test_labelled_break_lands_after_block() {
    let program = lower("a: { b(); break a; c(); }");
    assert_wellformed(&program);
    let blocks = blocks(&program);
    let last_label = format!("B{}", blocks.len() - 1);

    // The labeled break jumps to the block after the labeled statement,
    // which here coincides with the epilogue landing pad.
    assert!(blocks
        .iter()
        .flat_map(|(_, statements)| statements.iter())
        .any(|statement| goto_of(statement) == Some(Goto::To(last_label.clone()))));
}

#[test]
fn test_throw_lands_in_epilogue() {
    let program = lower("throw x;");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 2);

    let (error, value) = assignment(&blocks[0].1[0]).expect("error assignment");
    assert_eq!(error, "__ERROR");
    assert_eq!(identifier_of(value), Some("x"));
    assert_eq!(goto_of(&blocks[0].1[1]), Some(Goto::To("B1".to_string())));
    assert!(blocks[1].1.is_empty());
}

#[test]
fn test_catch_without_throwing_try_is_dead() {
    let program = lower("try { x = 1; } catch (e) { y = 2; }");
    let blocks = blocks(&program);
    assert_eq!(blocks.len(), 1);
    let printed = printer::print_program(&program);
    assert!(!printed.contains("y = 2"));
}

#[test]
fn test_function_declaration_hoists_to_first_block() {
    let program = lower("f(); function f() { return 1; }");
    let blocks = blocks(&program);

    // The deferred initializer is prepended to the first block.
    let (name, value) = assignment(&blocks[0].1[0]).expect("hoisted initializer");
    assert_eq!(name, "f");
    let ExpressionKind::Function(function) = &value.inner else {
        panic!("initializer must be the function value");
    };

    // The nested body is itself lowered: prologue plus labeled blocks.
    assert!(matches!(
        function.body[0].inner,
        StatementKind::VariableDeclaration { .. }
    ));
    for statement in &function.body[1..] {
        assert!(matches!(statement.inner, StatementKind::Labelled { .. }));
    }

    // The call site follows the initializer.
    assert_eq!(helper_call(&blocks[0].1[1]), Some(("CALL".to_string(), 2)));
    assert!(prologue(&program).contains(&"f".to_string()));
}

#[test]
fn test_temporaries_are_recycled() {
    // Back-to-back branch tests reuse the same released temporary.
    let program = lower("if (a < b) { } if (c < d) { }");
    let names = prologue(&program);
    assert!(names.contains(&"$0".to_string()));
    assert!(!names.contains(&"$1".to_string()));

    // Binding both operands concurrently needs two temporaries.
    let program = lower("x = f() < g();");
    let names = prologue(&program);
    assert!(names.contains(&"$0".to_string()));
    assert!(names.contains(&"$1".to_string()));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unsupported_nodes_are_rejected() {
    let cases: &[(&str, &str)] = &[
        ("x++;", "UpdateExpression"),
        ("a && b;", "LogicalExpression"),
        ("x = new F();", "NewExpression"),
        ("with (o) { x = 1; }", "WithStatement"),
        ("for (k in o) {}", "ForInStatement"),
        ("x = [1];", "ArrayExpression"),
        ("x = (1, 2);", "SequenceExpression"),
        ("x = a ? b : c;", "ConditionalExpression"),
        ("x = this;", "ThisExpression"),
    ];
    for (source, kind) in cases {
        match lower_err(source) {
            LoweringError::UnsupportedNode { kind: found, .. } => {
                assert_eq!(&found, kind, "for source {:?}", source)
            }
            other => panic!("expected UnsupportedNode for {:?}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_compound_assignment_is_rejected() {
    match lower_err("x += 1;") {
        LoweringError::UnsupportedNode { kind, .. } => assert!(kind.contains("+=")),
        other => panic!("expected UnsupportedNode, got {:?}", other),
    }
}

#[test]
fn test_invalid_continue_label() {
    assert!(matches!(
        lower_err("while (a) { x: { continue x; } }"),
        LoweringError::InvalidContinueLabel { .. }
    ));
    assert!(matches!(
        lower_err("continue;"),
        LoweringError::InvalidContinueLabel { .. }
    ));
}

#[test]
fn test_object_literal_is_rejected() {
    assert!(matches!(
        lower_err("var o = {};"),
        LoweringError::UnsupportedNode { .. }
    ));
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_lowering_is_idempotent_on_its_output() {
    let sources = [
        "if (a) { b(); } else { c(); }",
        "while (a) { if (b) break; c(); }",
        "try { f(); } catch (e) { g(e); }",
        "switch (x) { case 1: a(); break; case 2: b(); default: c(); }",
        "for (var i = 0; i < 10; i = i + 1) { if (i === 5) continue; }",
        "f(); function f() { return f(g(1)); }",
    ];
    for source in sources {
        let once = lower_source(source).expect("first lowering failed");
        let twice = lower_source(&once).expect("second lowering failed");
        assert_eq!(once, twice, "relowering changed the program for {:?}", source);
    }
}
