//! Write-if-changed and write-once persistence.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use mechgen_types::GenResult;

/// What a write call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist and was created.
    Created,
    /// The file existed with different content and was rewritten.
    Rewritten,
    /// The file already held semantically identical content; not touched.
    Unchanged,
    /// Write-once target already exists; left alone.
    Skipped,
}

/// Normalize CRLF and lone CR to LF so semantically identical content is
/// not rewritten because of line-ending representation.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Write `content` to `path` only if the existing content differs after
/// line-ending normalization. Parent directories are created as needed.
pub fn write_if_changed(path: &Path, content: &str) -> GenResult<WriteOutcome> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::read_to_string(path) {
        Ok(existing) => {
            if normalize_line_endings(&existing) == normalize_line_endings(content) {
                tracing::debug!(target: "mechgen", ?path, "unchanged, skipping write");
                return Ok(WriteOutcome::Unchanged);
            }
            fs::write(path, content)?;
            tracing::debug!(
                target: "mechgen",
                ?path,
                hash = fingerprint(content),
                "rewritten"
            );
            Ok(WriteOutcome::Rewritten)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fs::write(path, content)?;
            tracing::debug!(
                target: "mechgen",
                ?path,
                hash = fingerprint(content),
                "created"
            );
            Ok(WriteOutcome::Created)
        }
        Err(err) => Err(err.into()),
    }
}

/// Write `content` to `path` only if the file does not exist yet. Existing
/// files are never overwritten, whatever they contain.
pub fn write_once(path: &Path, content: &str) -> GenResult<WriteOutcome> {
    if path.exists() {
        tracing::debug!(target: "mechgen", ?path, "exists, write-once skipped");
        return Ok(WriteOutcome::Skipped);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(WriteOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/file.txt");

        assert_eq!(write_if_changed(&path, "hello\n").unwrap(), WriteOutcome::Created);
        assert_eq!(write_if_changed(&path, "hello\n").unwrap(), WriteOutcome::Unchanged);
        assert_eq!(write_if_changed(&path, "other\n").unwrap(), WriteOutcome::Rewritten);
    }

    #[test]
    fn crlf_content_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");

        fs::write(&path, "line one\r\nline two\r\n").unwrap();
        assert_eq!(
            write_if_changed(&path, "line one\nline two\n").unwrap(),
            WriteOutcome::Unchanged
        );
    }

    #[test]
    fn write_once_preserves_user_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decorator.cpp");

        assert_eq!(write_once(&path, "generated").unwrap(), WriteOutcome::Created);
        fs::write(&path, "user edit").unwrap();
        assert_eq!(write_once(&path, "regenerated").unwrap(), WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "user edit");
    }
}
