//! mechgen code emission engine.
//!
//! Renders merged mechanism instances into per-robot generated source
//! files. Rendering is a pure function of the robot variant set: the same
//! model always yields the same bytes, in the same order. Persistence is
//! the caller's job — this crate returns [`GeneratedFile`]s, it never
//! touches the filesystem.
//!
//! # Pipeline position
//!
//! ```text
//! model tree → merge → [codegen: placeholders + branch synthesis + render] → output writer
//! ```

pub mod context;
pub mod instance;
pub mod paths;
pub mod robots;
pub mod states;
pub mod templates;
pub mod tunable;

pub use context::{Emitter, GeneratedFile};
pub use templates::{TemplateKind, TemplateSet};
