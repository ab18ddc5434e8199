//! The generation pass.

use std::path::Path;

use mechgen_codegen::Emitter;
use mechgen_merge::sync_instances;
use mechgen_output::{write_if_changed, write_once, WriteOutcome};
use mechgen_types::model::RobotVariantSet;
use mechgen_types::{GenResult, ProgressLog};

use crate::checker;
use crate::config::GeneratorConfig;

/// Merge, validate, render and persist every mechanism instance.
///
/// The caller's tree is not mutated: merging happens on a working copy.
/// Every file write is independently convergent, so a crash mid-run leaves
/// a partially-updated but repairable tree — the next full run converges.
pub fn run(
    config: &GeneratorConfig,
    tool_version: &str,
    set: &RobotVariantSet,
    output_root: &Path,
    log: &mut ProgressLog<'_>,
) -> GenResult<()> {
    log.note("Writing mechanism instance files...");

    let mut synced = set.clone();
    sync_instances(&mut synced, log)?;
    checker::validate(&synced, log)?;

    let emitter = Emitter::new(
        &synced,
        &config.templates,
        &config.units,
        config.strictness,
        tool_version,
    );

    for instance_name in synced.distinct_instance_names() {
        let files = emitter.emit_instance(&instance_name, log)?;
        for file in files {
            let path = output_root.join(&file.relative_path);
            let outcome = if file.write_once {
                write_once(&path, &file.content)?
            } else {
                write_if_changed(&path, &file.content)?
            };
            match outcome {
                WriteOutcome::Created => {
                    log.note(format!("Wrote {}", file.relative_path.display()));
                }
                WriteOutcome::Rewritten => {
                    log.note(format!("Updated {}", file.relative_path.display()));
                }
                WriteOutcome::Unchanged | WriteOutcome::Skipped => {}
            }
        }
        log.note(format!("Finished mechanism instance {instance_name}"));
    }

    Ok(())
}
