#![allow(clippy::unwrap_used, clippy::expect_used)]

use form_ir::ExprArena;
use form_parse::{parse_expression, parse_instruction};
use pretty_assertions::assert_eq;

use crate::References;

fn path_strings(refs: &References) -> Vec<String> {
    refs.paths.iter().map(ToString::to_string).collect()
}

#[test]
fn test_scan_expression_in_source_order() {
    let mut arena = ExprArena::new();
    let id = parse_expression("a.value == 1 and f'{b.visible}' in [c, lookup(d)]", &mut arena)
        .unwrap();
    let mut refs = References::new();
    refs.scan_expr(&arena, id);
    assert_eq!(path_strings(&refs), vec!["a.value", "b.visible", "c", "d"]);
    assert_eq!(refs.calls, vec!["lookup"]);
}

#[test]
fn test_scan_conditional_instruction() {
    let mut arena = ExprArena::new();
    let instruction = parse_instruction(
        "if x.value then set y.value = z elif w then call_method_to_temp t = get(v) \
         else call_method load(u) -> out",
        &mut arena,
    )
    .unwrap();
    let mut refs = References::new();
    refs.scan_instruction(&arena, &instruction);
    assert_eq!(path_strings(&refs), vec!["x.value", "z", "w", "v", "u"]);
    assert_eq!(refs.calls, vec!["get", "load"]);
}

#[test]
fn test_scan_ignores_write_targets() {
    let mut arena = ExprArena::new();
    let instruction = parse_instruction("clear target.value", &mut arena).unwrap();
    let mut refs = References::new();
    refs.scan_instruction(&arena, &instruction);
    assert!(refs.paths.is_empty());
}
