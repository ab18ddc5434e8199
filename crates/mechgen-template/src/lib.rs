//! Marker-based conditional text templating.
//!
//! Template text carries two marker kinds:
//!
//! - **Placeholders** — `$$_NAME_$$`, replaced wholesale with generated text.
//! - **Paired regions** — `_NAME_START_` … `_NAME_END_`. When the guarding
//!   feature is absent, the markers and everything between them are deleted;
//!   when present, only the marker sentinels are deleted and the content is
//!   kept. Regions nest.
//!
//! Text is parsed in a single pass into a literal/placeholder/region IR and
//! rendered against a value map plus a feature set. Parsing up front removes
//! any dependence on the order substitutions are applied in.

mod parse;
mod render;

pub use parse::{Segment, Template};
pub use render::{RenderContext, Rendered, Strictness};

use thiserror::Error;

/// Errors from template parsing and strict-mode rendering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `$$_` opener with no matching `_$$` closer.
    #[error("unterminated placeholder starting at byte {0}")]
    UnterminatedPlaceholder(usize),

    /// A region end marker with no matching start, naming the flag.
    #[error("region `{0}` ended without a matching start marker")]
    UnmatchedRegionEnd(String),

    /// A region start marker never closed, naming the flag.
    #[error("region `{0}` is never closed")]
    UnclosedRegion(String),

    /// Regions must close innermost-first.
    #[error("region `{found}` closed while `{expected}` is still open")]
    CrossedRegions { expected: String, found: String },

    /// Strict mode only: a placeholder the render context has no value for.
    #[error("unresolved placeholder `{0}`")]
    UnresolvedPlaceholder(String),
}

impl From<TemplateError> for mechgen_types::GenError {
    fn from(err: TemplateError) -> Self {
        mechgen_types::GenError::Template(err.to_string())
    }
}
