//! Field attributes addressable from rules.

use std::fmt;

/// An attribute of a field that an expression can read.
///
/// `Errors` is read-only: actions that target it are rejected at
/// execution time with an invalid-attribute error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FieldAttr {
    Value,
    Visible,
    Disabled,
    Required,
    Options,
    Errors,
}

impl FieldAttr {
    /// All attributes, in the order they appear in field views.
    pub const ALL: [FieldAttr; 6] = [
        FieldAttr::Value,
        FieldAttr::Visible,
        FieldAttr::Disabled,
        FieldAttr::Required,
        FieldAttr::Options,
        FieldAttr::Errors,
    ];

    /// Look up an attribute by its source name.
    pub fn from_name(name: &str) -> Option<FieldAttr> {
        match name {
            "value" => Some(FieldAttr::Value),
            "visible" => Some(FieldAttr::Visible),
            "disabled" => Some(FieldAttr::Disabled),
            "required" => Some(FieldAttr::Required),
            "options" => Some(FieldAttr::Options),
            "errors" => Some(FieldAttr::Errors),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldAttr::Value => "value",
            FieldAttr::Visible => "visible",
            FieldAttr::Disabled => "disabled",
            FieldAttr::Required => "required",
            FieldAttr::Options => "options",
            FieldAttr::Errors => "errors",
        }
    }

    /// Whether `set`, `clear`, and method result bindings may write it.
    pub const fn is_writable(self) -> bool {
        !matches!(self, FieldAttr::Errors)
    }
}

impl fmt::Display for FieldAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
