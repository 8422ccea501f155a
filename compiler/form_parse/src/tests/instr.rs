//! Instruction parser tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use form_ir::{ExprArena, ExprKind, Instruction, Path, ResultBinding};
use pretty_assertions::assert_eq;

use crate::parse_instruction;

fn parse(source: &str) -> (ExprArena, Instruction) {
    let mut arena = ExprArena::new();
    let instruction = parse_instruction(source, &mut arena).unwrap();
    (arena, instruction)
}

fn segments(path: &Path) -> Vec<&str> {
    path.segments().iter().map(String::as_str).collect()
}

#[test]
fn test_parse_set() {
    let (arena, instruction) = parse("set app.name.required = true");
    let Instruction::Set { target, value } = instruction else {
        panic!("expected set");
    };
    assert_eq!(segments(&target.path), vec!["app", "name", "required"]);
    assert_eq!(arena.get_expr(value).kind, ExprKind::Bool(true));
}

#[test]
fn test_parse_set_without_spaces() {
    let (_, instruction) = parse("set app.name.required=true");
    assert_eq!(instruction.keyword(), "set");
}

#[test]
fn test_parse_clear() {
    let (_, instruction) = parse("clear app.code.value");
    let Instruction::Clear { target } = instruction else {
        panic!("expected clear");
    };
    assert_eq!(segments(&target.path), vec!["app", "code", "value"]);
}

#[test]
fn test_parse_call_method_discarded() {
    let (_, instruction) = parse("call_method notify(region.value, level='info')");
    let Instruction::CallMethod { call, bind } = instruction else {
        panic!("expected call_method");
    };
    assert_eq!(call.method, "notify");
    assert_eq!(call.args.len(), 2);
    assert_eq!(bind, None);
}

#[test]
fn test_parse_call_method_with_projection() {
    let (_, instruction) = parse("call_method zones(region).data.items -> zone.options");
    let Instruction::CallMethod {
        bind: Some(ResultBinding::Field { projection, target }),
        ..
    } = instruction
    else {
        panic!("expected field binding");
    };
    assert_eq!(segments(&projection), vec!["data", "items"]);
    assert_eq!(segments(&target.path), vec!["zone", "options"]);
}

#[test]
fn test_parse_call_method_multi_binding() {
    let (_, instruction) =
        parse("call_method info(region).data -> { a.value: x, b.required: flags.b, }");
    let Instruction::CallMethod {
        bind: Some(ResultBinding::Multi(entries)),
        ..
    } = instruction
    else {
        panic!("expected multi binding");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(segments(&entries[0].0.path), vec!["a", "value"]);
    assert_eq!(segments(&entries[0].1), vec!["data", "x"]);
    assert_eq!(segments(&entries[1].1), vec!["data", "flags", "b"]);
}

#[test]
fn test_projection_requires_binding() {
    let mut arena = ExprArena::new();
    assert!(parse_instruction("call_method f(x).data", &mut arena).is_err());
}

#[test]
fn test_parse_call_method_to_temp() {
    let (_, instruction) = parse("call_method_to_temp result = lookupCode(region)");
    let Instruction::CallMethodToTemp { temp, call } = instruction else {
        panic!("expected call_method_to_temp");
    };
    assert_eq!(temp, "result");
    assert_eq!(call.method, "lookupCode");
}

#[test]
fn test_parse_conditional_action() {
    let (_, instruction) = parse(
        "conditional_action if region.value == 'a' then set x.value = 1 \
         elif region.value == 'b' then set x.value = 2 else clear x.value",
    );
    let Instruction::Conditional(action) = instruction else {
        panic!("expected conditional");
    };
    assert_eq!(action.branches.len(), 2);
    assert_eq!(action.branches[1].action.keyword(), "set");
    assert_eq!(
        action.otherwise.as_ref().map(|a| a.keyword()),
        Some("clear")
    );
}

#[test]
fn test_bare_if_is_conditional() {
    let (_, instruction) = parse("if a.visible then set b.visible = true");
    assert_eq!(instruction.keyword(), "conditional_action");
}

#[test]
fn test_nested_conditional_else_binds_inner() {
    let (_, instruction) = parse("if a then if b then clear c.value else clear d.value");
    let Instruction::Conditional(outer) = instruction else {
        panic!("expected conditional");
    };
    assert!(outer.otherwise.is_none());
    let Instruction::Conditional(inner) = outer.branches[0].action.as_ref() else {
        panic!("expected nested conditional");
    };
    assert!(inner.otherwise.is_some());
}

#[test]
fn test_unknown_instruction() {
    let mut arena = ExprArena::new();
    let err = parse_instruction("assign a.value = 1", &mut arena).unwrap_err();
    assert!(err.message.contains("unknown instruction `assign`"));
}

#[test]
fn test_missing_then() {
    let mut arena = ExprArena::new();
    let err = parse_instruction("if a set b.value = 1", &mut arena).unwrap_err();
    assert!(err.message.contains("`then`"), "{}", err.message);
}

#[test]
fn test_instruction_words_usable_as_keys() {
    let (_, instruction) = parse("set set.value = clear.value");
    let Instruction::Set { target, .. } = instruction else {
        panic!("expected set");
    };
    assert_eq!(segments(&target.path), vec!["set", "value"]);
}
