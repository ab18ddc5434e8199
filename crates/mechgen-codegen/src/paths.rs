//! Output path derivation.
//!
//! Every generated file lives under the fixed `mechanisms` sub-root:
//!
//! ```text
//! <output root>/mechanisms/<instance>/generated/      — overwritten files
//! <output root>/mechanisms/<instance>/decoratormods/  — write-once files
//! ```
//!
//! Paths are a pure function of the mechanism-instance name; the
//! `mechanisms` segment doubles as the safety-guard marker for deletion.

use std::path::PathBuf;

/// Fixed sub-root all generated output lives under. Also the marker segment
/// the deletion guard requires.
pub const MECHANISMS_SUBROOT: &str = "mechanisms";

/// Directory for regenerated (machine-owned) files.
pub const GENERATED_DIR: &str = "generated";

/// Directory for write-once (user-owned) decorator files.
pub const DECORATOR_DIR: &str = "decoratormods";

/// `mechanisms/<instance>/<generated|decoratormods>`, relative to the
/// output root.
pub fn mechanism_dir(instance_name: &str, generated: bool) -> PathBuf {
    let sub = if generated { GENERATED_DIR } else { DECORATOR_DIR };
    PathBuf::from(MECHANISMS_SUBROOT)
        .join(instance_name)
        .join(sub)
}

/// Full relative path for one output file.
pub fn mechanism_file(instance_name: &str, generated: bool, file_name: &str) -> PathBuf {
    mechanism_dir(instance_name, generated).join(file_name)
}

/// Substitute the file-name pattern tokens. `STATE_NAME` is only replaced
/// when a state is in scope.
pub fn resolve_pattern(
    pattern: &str,
    instance_name: &str,
    mechanism_name: &str,
    state_name: Option<&str>,
) -> String {
    // MECHANISM_INSTANCE_NAME must be replaced before MECHANISM_NAME: the
    // former contains the latter as a substring.
    let mut name = pattern.replace("MECHANISM_INSTANCE_NAME", instance_name);
    name = name.replace("MECHANISM_NAME", mechanism_name);
    if let Some(state) = state_name {
        name = name.replace("STATE_NAME", state);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_and_decorator_dirs_differ() {
        assert_eq!(
            mechanism_dir("noteManager", true),
            PathBuf::from("mechanisms/noteManager/generated")
        );
        assert_eq!(
            mechanism_dir("noteManager", false),
            PathBuf::from("mechanisms/noteManager/decoratormods")
        );
    }

    #[test]
    fn pattern_tokens_resolve() {
        assert_eq!(
            resolve_pattern("MECHANISM_INSTANCE_NAME.cpp", "noteManager", "note", None),
            "noteManager.cpp"
        );
        assert_eq!(
            resolve_pattern("STATE_NAMEState.h", "noteManager", "note", Some("Intake")),
            "IntakeState.h"
        );
    }

    #[test]
    fn instance_token_resolves_before_mechanism_token() {
        assert_eq!(
            resolve_pattern("MECHANISM_INSTANCE_NAME_MECHANISM_NAME.h", "inst", "mech", None),
            "inst_mech.h"
        );
    }
}
