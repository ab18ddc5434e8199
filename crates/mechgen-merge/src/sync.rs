//! Whole-set synchronization.
//!
//! The "template edited" entry point: re-applies the current template to
//! every live instance sharing its id, across every robot variant, in
//! declared order.

use mechgen_types::model::RobotVariantSet;
use mechgen_types::{GenError, GenResult, ProgressLog};

use crate::merge::merge;

/// Bring every mechanism instance in the set up to date with its template.
///
/// Instances referencing an unregistered template id are an error: the
/// configuration tree is malformed, not merely stale.
pub fn sync_instances(set: &mut RobotVariantSet, log: &mut ProgressLog<'_>) -> GenResult<()> {
    let RobotVariantSet { robots, templates } = set;

    for robot in robots.iter_mut() {
        for instance in robot.mechanism_instances.iter_mut() {
            let template = templates
                .get(instance.mechanism.id)
                .ok_or_else(|| {
                    GenError::UnknownTemplate(instance.mechanism.id, instance.name.clone())
                })?
                .clone();
            instance.mechanism = merge(template, &instance.mechanism, log)?;
        }
    }
    Ok(())
}
