//! Output persistence and the deletion safety guard.
//!
//! Every write goes through [`write_if_changed`] (convergent: rewriting an
//! unchanged file is a no-op, so re-running generation against an unchanged
//! model never touches the tree) or [`write_once`] (decorator semantics:
//! user edits are never overwritten). Deletion goes through
//! [`delete_generated`], which refuses to operate on any path outside a
//! recognized generated-output tree — the guard lives here in the core, not
//! in the caller.

mod guard;
mod writer;

pub use guard::{delete_generated, GENERATED_TREE_MARKER};
pub use writer::{write_if_changed, write_once, WriteOutcome};
