//! Generator error taxonomy.
//!
//! Fatal problems (consistency violations, I/O failures, strict-mode
//! template failures) travel as [`GenError`] and abort the batch.
//! Best-effort problems (dangling references, lenient-mode unresolved
//! placeholders) never become errors; they go through the progress log and
//! generation continues.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenError {
    /// A uniqueness invariant is violated and no deterministic choice
    /// exists (e.g. two enabled motor controllers sharing one name in one
    /// robot's view of a mechanism).
    #[error("consistency error: {0}")]
    Consistency(String),

    /// A template failed to parse or, in strict mode, to render.
    #[error("template error: {0}")]
    Template(String),

    /// A mechanism instance refers to a template id that is not registered.
    #[error("unknown mechanism template {0} referenced by instance `{1}`")]
    UnknownTemplate(crate::model::MechanismId, String),

    /// Deletion was requested outside the guarded generated-output tree.
    #[error("refusing to delete `{path}`: not inside a generated output tree")]
    UnsafeDelete { path: PathBuf },

    /// Any file write/read/delete failure. Fatal, no retry.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the generator.
pub type GenResult<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MechanismId;

    #[test]
    fn display_formats() {
        let err = GenError::Consistency("two enabled controllers named `left`".into());
        assert_eq!(
            err.to_string(),
            "consistency error: two enabled controllers named `left`"
        );

        let err = GenError::UnknownTemplate(MechanismId(7), "frontArm".into());
        assert!(err.to_string().contains("M7"));
        assert!(err.to_string().contains("frontArm"));

        let err = GenError::UnsafeDelete {
            path: PathBuf::from("/tmp/somewhere"),
        };
        assert!(err.to_string().contains("refusing to delete"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: GenError = io.into();
        assert!(matches!(err, GenError::Io(_)));
    }
}
