//! Progress / diagnostic log.
//!
//! The single channel for non-fatal problems and progress reporting. Every
//! entry is a human-readable string; callers get the full ordered list back
//! from `generate`/`clean`, and an optional callback sees each entry as it
//! is produced. Entries are mirrored to `tracing` so library embedders get
//! structured logs without wiring the callback.

/// Callback invoked for every progress entry, in order.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(&str);

/// Ordered collection of progress/diagnostic messages.
pub struct ProgressLog<'a> {
    entries: Vec<String>,
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressLog<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            callback: None,
        }
    }

    /// A log that forwards every entry to `callback` as it is recorded.
    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            entries: Vec::new(),
            callback: Some(callback),
        }
    }

    /// Record a progress message.
    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "mechgen", "{message}");
        if let Some(cb) = self.callback.as_mut() {
            cb(&message);
        }
        self.entries.push(message);
    }

    /// Record a non-fatal problem. Same channel as [`note`](Self::note),
    /// logged at warn level.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "mechgen", "{message}");
        if let Some(cb) = self.callback.as_mut() {
            cb(&message);
        }
        self.entries.push(message);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log, returning the ordered entries.
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

impl Default for ProgressLog<'_> {
    fn default() -> Self {
        Self::new()
    }
}
