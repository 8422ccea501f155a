//! Engine error taxonomy.

use form_eval::EvalError;
use form_parse::ParseError;

/// Errors reported by the form engine.
///
/// `Schema` and `SchemaConflict` come out of loading and projection. The
/// rest are raised while rules run; those are normally recorded on the
/// owning field's `errors` list and logged rather than returned.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),

    #[error("invalid attribute `{attr}` on field `{key}`")]
    InvalidAttribute { key: String, attr: String },

    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("syntax error: {0}")]
    ExpressionSyntax(#[from] ParseError),

    #[error("cascade exceeded {max_passes} passes; stopped with {} field(s) pending", .pending.len())]
    CascadeOverflow {
        max_passes: usize,
        /// Keys still queued when propagation stopped.
        pending: Vec<String>,
    },

    #[error("schema conflict: `{0}` is both a value and a parent of other keys")]
    SchemaConflict(String),

    #[error(transparent)]
    Evaluation(EvalError),
}

impl From<EvalError> for FormError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::UnresolvedReference(path) => FormError::UnresolvedReference(path),
            EvalError::UnknownMethod(name) => FormError::UnknownMethod(name),
            other => FormError::Evaluation(other),
        }
    }
}

pub type FormResult<T> = Result<T, FormError>;
