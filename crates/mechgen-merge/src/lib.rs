//! Template merge engine.
//!
//! Keeps every mechanism instance structurally consistent with its template.
//! `merge` takes a fresh deep clone of the current template and the existing
//! (possibly stale, possibly overridden) instance mechanism, and produces a
//! mechanism with the template's current *shape* while preserving the
//! instance's values for every field the schema marks overridable.
//!
//! Rules, applied lock-step over both trees:
//! - Children correlate by stable name within each collection (controllers
//!   by name + concrete family, motor targets by their reference pair).
//! - Fields marked constant-in-instance always take the template's value.
//! - Elements the template dropped are dropped from the instance, local
//!   overrides included; elements the template added arrive with template
//!   defaults.
//! - A same-named controller whose concrete family changed in the template
//!   keeps the template's version wholesale; the discarded instance override
//!   is reported as data loss.

mod event;
mod merge;
mod sync;

pub use event::{MergeEvent, MergeEventKind, MergeReport};
pub use merge::{merge, merge_with_report};
pub use sync::sync_instances;
