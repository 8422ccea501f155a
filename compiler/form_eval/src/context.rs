//! The state an expression reads, and how paths resolve against it.

use form_ir::{FieldAttr, Path};
use serde_json::Value;

use crate::value::project;
use crate::{CallArgs, EvalError};

/// Prefixes that explicitly address field state: `f.region`, `fields.region`.
const FIELD_PREFIXES: [&str; 2] = ["f", "fields"];

/// Read access to form state plus the method registry.
///
/// Implemented by the engine over its field store and the active temp
/// scope, and by test doubles over plain maps.
pub trait EvalContext {
    /// Separator joining path segments into field keys (`"."` by default).
    fn key_separator(&self) -> &str;

    /// Value of a temp variable in the active cascade.
    fn temp(&self, name: &str) -> Option<&Value>;

    fn has_field(&self, key: &str) -> bool;

    /// Current value of one attribute, or `None` for an undeclared key.
    fn field_attr(&self, key: &str, attr: FieldAttr) -> Option<Value>;

    fn has_method(&self, name: &str) -> bool;

    /// Invoke a registered method. Only called when `has_method(name)`.
    fn call_method(&mut self, name: &str, args: CallArgs) -> Result<Value, EvalError>;
}

/// A path prefix matched to a declared field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRef {
    pub key: String,
    /// Attribute named right after the key, if any.
    pub attr: Option<FieldAttr>,
    /// Index of the first segment after the key (and attribute).
    pub rest: usize,
}

/// Match the longest prefix of `segments` that is a declared field key.
///
/// A leading `f` / `fields` segment is skipped when the unprefixed path
/// matches no field otherwise.
pub fn match_field<F>(segments: &[String], sep: &str, has_field: F) -> Option<FieldRef>
where
    F: Fn(&str) -> bool,
{
    if let Some(found) = match_from(segments, 0, sep, &has_field) {
        return Some(found);
    }
    match segments.first() {
        Some(first) if FIELD_PREFIXES.contains(&first.as_str()) => {
            match_from(segments, 1, sep, &has_field)
        }
        _ => None,
    }
}

fn match_from<F>(segments: &[String], start: usize, sep: &str, has_field: &F) -> Option<FieldRef>
where
    F: Fn(&str) -> bool,
{
    let tail = segments.get(start..)?;
    (1..=tail.len()).rev().find_map(|n| {
        let key = tail[..n].join(sep);
        if !has_field(&key) {
            return None;
        }
        let attr = tail.get(n).and_then(|segment| FieldAttr::from_name(segment));
        let rest = start + n + usize::from(attr.is_some());
        Some(FieldRef { key, attr, rest })
    })
}

/// Resolve a path expression to a value.
///
/// Order: a temp variable named by the first segment, then the longest
/// matching field key. A field with no attribute segment reads `.value`;
/// remaining segments index into the result.
pub fn resolve_path<C>(ctx: &C, path: &Path) -> Result<Value, EvalError>
where
    C: EvalContext + ?Sized,
{
    let segments = path.segments();
    let unresolved = || EvalError::UnresolvedReference(path.to_string());

    let first = segments.first().ok_or_else(unresolved)?;
    if let Some(value) = ctx.temp(first) {
        return Ok(project(value, &segments[1..]));
    }

    let found = match_field(segments, ctx.key_separator(), |key| ctx.has_field(key))
        .ok_or_else(unresolved)?;
    let attr = found.attr.unwrap_or(FieldAttr::Value);
    let value = ctx.field_attr(&found.key, attr).ok_or_else(unresolved)?;
    Ok(project(&value, &segments[found.rest..]))
}
