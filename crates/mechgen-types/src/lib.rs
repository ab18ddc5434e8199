//! Shared types for the mechgen generator.
//!
//! This crate defines the robot/mechanism model tree, the id-indexed
//! template registry, the field mutability schema, the error taxonomy, and
//! the progress log used across all generator stages.

mod error;
mod log;
pub mod model;
pub mod registry;
pub mod schema;

pub use error::{GenError, GenResult};
pub use log::{ProgressCallback, ProgressLog};
pub use registry::TemplateRegistry;
pub use schema::{policy_of, FieldPolicy, FieldSpec, FIELD_SPECS};
