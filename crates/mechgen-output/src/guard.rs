//! Guarded deletion.
//!
//! `delete_generated` only ever deletes inside a tree containing the
//! `mechanisms` path segment — the sub-root every generated file is placed
//! under. A path without the marker is an error, not a silent no-op, so a
//! misconfigured output root cannot erase unrelated directories and cannot
//! fail invisibly either.

use std::fs;
use std::path::Path;

use mechgen_types::{GenError, GenResult};

/// Path segment that marks a generated-output tree.
pub const GENERATED_TREE_MARKER: &str = "mechanisms";

/// Recursively delete `path`, refusing when no component equals
/// [`GENERATED_TREE_MARKER`]. Deleting a path that does not exist is fine;
/// deleting outside the marker never is.
pub fn delete_generated(path: &Path) -> GenResult<()> {
    let guarded = path
        .components()
        .any(|c| c.as_os_str() == GENERATED_TREE_MARKER);
    if !guarded {
        return Err(GenError::UnsafeDelete {
            path: path.to_path_buf(),
        });
    }

    if path.exists() {
        tracing::info!(target: "mechgen", ?path, "deleting generated subtree");
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_paths_without_marker() {
        let dir = tempfile::tempdir().unwrap();
        let victim = dir.path().join("not_generated");
        fs::create_dir_all(&victim).unwrap();
        fs::write(victim.join("precious.txt"), "data").unwrap();

        let err = delete_generated(&victim).unwrap_err();
        assert!(matches!(err, GenError::UnsafeDelete { .. }));
        // Nothing was deleted.
        assert!(victim.join("precious.txt").exists());
    }

    #[test]
    fn deletes_inside_marker_tree() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mechanisms/arm/generated");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("arm.cpp"), "generated").unwrap();

        delete_generated(&target).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn missing_guarded_path_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mechanisms/ghost");
        delete_generated(&target).unwrap();
    }

    #[test]
    fn partial_segment_match_does_not_satisfy_guard() {
        let dir = tempfile::tempdir().unwrap();
        // "mechanisms_backup" contains the marker as a substring but is not
        // the marker segment.
        let victim = dir.path().join("mechanisms_backup");
        fs::create_dir_all(&victim).unwrap();

        let err = delete_generated(&victim).unwrap_err();
        assert!(matches!(err, GenError::UnsafeDelete { .. }));
        assert!(victim.exists());
    }
}
