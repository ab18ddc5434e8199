//! The clean pass.

use std::fs;
use std::path::Path;

use mechgen_codegen::paths::{DECORATOR_DIR, GENERATED_DIR, MECHANISMS_SUBROOT};
use mechgen_output::delete_generated;
use mechgen_types::{GenResult, ProgressLog};

/// Delete every generated subtree under `output_root/mechanisms`; decorator
/// subtrees too when `include_decorator_folders` is set. Every deletion
/// goes through the safety guard.
pub fn run(
    output_root: &Path,
    include_decorator_folders: bool,
    log: &mut ProgressLog<'_>,
) -> GenResult<()> {
    log.note("Erasing mechanism instance files...");

    let mechanisms_root = output_root.join(MECHANISMS_SUBROOT);
    if !mechanisms_root.exists() {
        log.note("No generated output found; nothing to erase");
        return Ok(());
    }

    let mut entries: Vec<_> = fs::read_dir(&mechanisms_root)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|e| e.path().is_dir())
        .collect();
    // Directory iteration order is platform-dependent; sort for stable logs.
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let generated = entry.path().join(GENERATED_DIR);
        delete_generated(&generated)?;
        log.note(format!("Erased {}", generated.display()));

        if include_decorator_folders {
            let decorators = entry.path().join(DECORATOR_DIR);
            delete_generated(&decorators)?;
            log.note(format!("Erased {}", decorators.display()));
        }
    }

    Ok(())
}
