//! Expression parser tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use form_ir::{BinaryOp, ExprArena, ExprId, ExprKind, InterpPart, Path, Span, UnaryOp};
use pretty_assertions::assert_eq;

use crate::parse_expression;

fn parse(source: &str) -> (ExprArena, ExprId) {
    let mut arena = ExprArena::new();
    let id = parse_expression(source, &mut arena).unwrap();
    (arena, id)
}

fn path(segments: &[&str]) -> ExprKind {
    ExprKind::Path(Path::from_segments(segments.iter().copied()))
}

#[test]
fn test_parse_literals() {
    for (source, expected) in [
        ("null", ExprKind::Null),
        ("true", ExprKind::Bool(true)),
        ("42", ExprKind::Int(42)),
        ("2.5", ExprKind::Float(2.5)),
        ("'hi'", ExprKind::Str("hi".into())),
    ] {
        let (arena, id) = parse(source);
        assert_eq!(arena.get_expr(id).kind, expected, "source: {source}");
    }
}

#[test]
fn test_parse_path() {
    let (arena, id) = parse("app.name.required");
    let expr = arena.get_expr(id);
    assert_eq!(expr.kind, path(&["app", "name", "required"]));
    assert_eq!(expr.span, Span::new(0, 17));
}

#[test]
fn test_parse_index_path() {
    let (arena, id) = parse("result.items.0.label");
    assert_eq!(
        arena.get_expr(id).kind,
        path(&["result", "items", "0", "label"])
    );
}

#[test]
fn test_multiplication_binds_tighter() {
    let (arena, id) = parse("1 + 2 * 3");
    let ExprKind::Binary {
        op: BinaryOp::Add,
        left,
        right,
    } = arena.get_expr(id).kind
    else {
        panic!("expected Add at the root");
    };
    assert_eq!(arena.get_expr(left).kind, ExprKind::Int(1));
    assert!(matches!(
        arena.get_expr(right).kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_and_binds_tighter_than_or() {
    let (arena, id) = parse("a or b and c");
    let ExprKind::Binary {
        op: BinaryOp::Or,
        right,
        ..
    } = arena.get_expr(id).kind
    else {
        panic!("expected Or at the root");
    };
    assert!(matches!(
        arena.get_expr(right).kind,
        ExprKind::Binary {
            op: BinaryOp::And,
            ..
        }
    ));
}

#[test]
fn test_symbolic_boolean_operators() {
    let (arena, id) = parse("a && !b || c");
    assert!(matches!(
        arena.get_expr(id).kind,
        ExprKind::Binary {
            op: BinaryOp::Or,
            ..
        }
    ));
}

#[test]
fn test_not_wraps_comparison() {
    let (arena, id) = parse("not region.value == 'x'");
    let ExprKind::Unary {
        op: UnaryOp::Not,
        operand,
    } = arena.get_expr(id).kind
    else {
        panic!("expected Not at the root");
    };
    assert!(matches!(
        arena.get_expr(operand).kind,
        ExprKind::Binary {
            op: BinaryOp::Eq,
            ..
        }
    ));
}

#[test]
fn test_not_in() {
    let (arena, id) = parse("region not in ['a', 'b']");
    let ExprKind::Binary {
        op: BinaryOp::NotIn,
        right,
        ..
    } = arena.get_expr(id).kind
    else {
        panic!("expected NotIn");
    };
    let ExprKind::List(items) = &arena.get_expr(right).kind else {
        panic!("expected list");
    };
    assert_eq!(items.len(), 2);
}

#[test]
fn test_negation() {
    let (arena, id) = parse("-count.value");
    assert!(matches!(
        arena.get_expr(id).kind,
        ExprKind::Unary {
            op: UnaryOp::Neg,
            ..
        }
    ));
}

#[test]
fn test_parenthesized() {
    let (arena, id) = parse("(1 + 2) * 3");
    let ExprKind::Binary {
        op: BinaryOp::Mul,
        left,
        ..
    } = arena.get_expr(id).kind
    else {
        panic!("expected Mul at the root");
    };
    assert!(matches!(
        arena.get_expr(left).kind,
        ExprKind::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn test_call_with_named_args() {
    let (arena, id) = parse("lookup(region.value, strict=true)");
    let ExprKind::Call { name, args } = &arena.get_expr(id).kind else {
        panic!("expected call");
    };
    assert_eq!(name, "lookup");
    assert_eq!(args.len(), 2);
    assert_eq!(args[0].name, None);
    assert_eq!(args[1].name.as_deref(), Some("strict"));
    assert_eq!(arena.get_expr(args[1].value).kind, ExprKind::Bool(true));
}

#[test]
fn test_empty_call() {
    let (arena, id) = parse("now()");
    assert!(matches!(
        &arena.get_expr(id).kind,
        ExprKind::Call { args, .. } if args.is_empty()
    ));
}

#[test]
fn test_interpolation_parts() {
    let (arena, id) = parse(r#"f"{app.name}-{region} {{x}}""#);
    let ExprKind::Interpolated(parts) = &arena.get_expr(id).kind else {
        panic!("expected interpolation");
    };
    assert_eq!(parts.len(), 4);
    let InterpPart::Expr(first) = parts[0] else {
        panic!("expected expression part");
    };
    assert_eq!(arena.get_expr(first).kind, path(&["app", "name"]));
    // `{` opens at byte 2 of the literal, so `app.name` starts at byte 3.
    assert_eq!(arena.get_expr(first).span, Span::new(3, 11));
    assert_eq!(parts[1], InterpPart::Text("-".into()));
    assert_eq!(parts[3], InterpPart::Text(" {x}".into()));
}

#[test]
fn test_interpolation_braces_in_quotes() {
    let (arena, id) = parse(r#"f"{'}' + a}""#);
    let ExprKind::Interpolated(parts) = &arena.get_expr(id).kind else {
        panic!("expected interpolation");
    };
    assert_eq!(parts.len(), 1);
}

#[test]
fn test_interpolation_errors() {
    let mut arena = ExprArena::new();
    assert!(parse_expression(r#"f"{a""#, &mut arena).is_err());
    assert!(parse_expression(r#"f"a}""#, &mut arena).is_err());
    assert!(parse_expression(r#"f"{}""#, &mut arena).is_err());
}

#[test]
fn test_error_span_inside_interpolation() {
    let mut arena = ExprArena::new();
    let err = parse_expression(r#"f"ab{1 +}""#, &mut arena).unwrap_err();
    // `}` would be at byte 8; the embedded source ends at 8, so Eof sits there.
    assert_eq!(err.span, Span::new(8, 8));
}

#[test]
fn test_trailing_tokens_rejected() {
    let mut arena = ExprArena::new();
    let err = parse_expression("a.value b", &mut arena).unwrap_err();
    assert!(err.message.contains("end of input"), "{}", err.message);
    assert_eq!(err.span, Span::new(8, 9));
}

#[test]
fn test_missing_operand() {
    let mut arena = ExprArena::new();
    let err = parse_expression("1 +", &mut arena).unwrap_err();
    assert!(err.message.starts_with("expected expression"));
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let source = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
    let (arena, id) = parse(&source);
    assert_eq!(arena.get_expr(id).kind, ExprKind::Int(1));
}
