//! Structured merge change records.
//!
//! Every element-level difference a merge resolves is recorded as a
//! [`MergeEvent`]. The report serializes to JSON so callers can show a
//! structural diff instead of parsing log strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one element during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeEventKind {
    /// Present in the template, absent from the instance: copied in with
    /// template defaults.
    Added,
    /// Absent from the template, present in the instance: dropped, local
    /// overrides included.
    Removed,
    /// Same name, different concrete subtype: template version kept,
    /// instance override discarded. Data loss.
    Replaced,
}

/// One element-level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeEvent {
    /// Dot-separated path of the element (e.g. `motor_controllers.left`).
    pub path: String,
    pub kind: MergeEventKind,
}

impl fmt::Display for MergeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MergeEventKind::Added => write!(f, "{}: added from template", self.path),
            MergeEventKind::Removed => write!(f, "{}: removed (dropped from template)", self.path),
            MergeEventKind::Replaced => write!(
                f,
                "{}: concrete type changed in template, instance overrides discarded",
                self.path
            ),
        }
    }
}

/// All changes one merge resolved, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub events: Vec<MergeEvent>,
}

impl MergeReport {
    pub fn push(&mut self, path: impl Into<String>, kind: MergeEventKind) {
        self.events.push(MergeEvent {
            path: path.into(),
            kind,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"events\":[]}".to_string())
    }
}
