//! Tunable parameter file pass.

use std::path::{Path, PathBuf};

use mechgen_codegen::paths::MECHANISMS_SUBROOT;
use mechgen_codegen::tunable::{tunable_file_content, tunable_file_name};
use mechgen_merge::sync_instances;
use mechgen_output::write_if_changed;
use mechgen_types::model::RobotVariantSet;
use mechgen_types::{GenResult, ProgressLog};

/// Write `<deploy_root>/<robot id>/mechanisms/<instance>.json` for every
/// mechanism instance of every robot. Returns every emitted path, robots
/// in declared order.
pub fn run(
    set: &RobotVariantSet,
    deploy_root: &Path,
    log: &mut ProgressLog<'_>,
) -> GenResult<Vec<PathBuf>> {
    let mut synced = set.clone();
    sync_instances(&mut synced, log)?;

    let mut written = Vec::new();
    for robot in &synced.robots {
        for instance in &robot.mechanism_instances {
            let path = deploy_root
                .join(robot.id.to_string())
                .join(MECHANISMS_SUBROOT)
                .join(tunable_file_name(&instance.name));
            write_if_changed(&path, &tunable_file_content(&instance.mechanism))?;
            log.note(format!("Wrote tunable parameters {}", path.display()));
            written.push(path);
        }
    }
    Ok(written)
}
