//! Model validation before emission.
//!
//! Two tiers, matching the error policy:
//!
//! - **Fatal** (returns `GenError::Consistency`): sibling-name collisions
//!   among robots or instances, and more than one *enabled* motor
//!   controller sharing a name within one robot's view of a mechanism —
//!   no deterministic choice of "the" controller exists.
//! - **Best-effort** (progress log only): motor/solenoid targets naming a
//!   control data, controller or solenoid absent from the owning
//!   mechanism, and transitions naming unknown states. Generation
//!   continues and the affected statement is omitted downstream.
//!
//! Mechanism-internal sibling uniqueness (states, control data, hardware)
//! is enforced by the merge engine while instances are synchronized; it is
//! not re-checked here.

use mechgen_types::model::{MechanismInstance, RobotVariantSet};
use mechgen_types::{GenError, GenResult, ProgressLog};

/// Run all checks. Fatal problems return an error; reference problems are
/// logged and generation continues.
pub fn validate(set: &RobotVariantSet, log: &mut ProgressLog<'_>) -> GenResult<()> {
    check_robot_identities(set)?;
    for robot in &set.robots {
        check_instance_names(robot)?;
        for instance in &robot.mechanism_instances {
            check_enabled_controller_uniqueness(robot.id, instance)?;
            report_dangling_references(instance, log);
        }
    }
    Ok(())
}

fn check_robot_identities(set: &RobotVariantSet) -> GenResult<()> {
    for (i, robot) in set.robots.iter().enumerate() {
        for other in set.robots.iter().skip(i + 1) {
            if robot.id == other.id {
                return Err(GenError::Consistency(format!(
                    "two robot variants share id {}",
                    robot.id
                )));
            }
            if robot.name == other.name {
                return Err(GenError::Consistency(format!(
                    "two robot variants share the name `{}`",
                    robot.name
                )));
            }
        }
    }
    Ok(())
}

fn check_instance_names(robot: &mechgen_types::model::RobotConfig) -> GenResult<()> {
    for (i, instance) in robot.mechanism_instances.iter().enumerate() {
        if robot.mechanism_instances[i + 1..]
            .iter()
            .any(|other| other.name == instance.name)
        {
            return Err(GenError::Consistency(format!(
                "robot `{}` carries two mechanism instances named `{}`",
                robot.name, instance.name
            )));
        }
    }
    Ok(())
}

/// Invariant: at most one enabled motor controller per name per robot view
/// of a mechanism instance.
fn check_enabled_controller_uniqueness(
    robot_id: u32,
    instance: &MechanismInstance,
) -> GenResult<()> {
    let enabled: Vec<&str> = instance
        .mechanism
        .motor_controllers
        .iter()
        .filter(|m| m.enabled)
        .map(|m| m.name.as_str())
        .collect();
    for (i, name) in enabled.iter().enumerate() {
        if enabled[i + 1..].contains(name) {
            return Err(GenError::Consistency(format!(
                "in robot id {robot_id}, found more than one enabled motor controller \
                 named `{name}` in mechanism instance `{}`",
                instance.name
            )));
        }
    }
    Ok(())
}

/// Best-effort reference validation: every problem is surfaced in one
/// pass, none of them stops the batch.
fn report_dangling_references(instance: &MechanismInstance, log: &mut ProgressLog<'_>) {
    let mech = &instance.mechanism;
    for state in &mech.states {
        for target in &state.motor_targets {
            if mech.control_data(&target.control_data).is_none() {
                log.warn(format!(
                    "In mechanism {}, cannot find a motor control data called {}, \
                     referenced in state {}",
                    instance.name, target.control_data, state.name
                ));
            }
            if mech.controller(&target.controller).is_none() {
                log.warn(format!(
                    "In mechanism {}, cannot find a motor controller called {}, \
                     referenced in state {}",
                    instance.name, target.controller, state.name
                ));
            }
        }
        for target in &state.solenoid_targets {
            if mech.solenoids.iter().all(|s| s.name != target.solenoid) {
                log.warn(format!(
                    "In mechanism {}, cannot find a solenoid called {}, referenced in state {}",
                    instance.name, target.solenoid, state.name
                ));
            }
        }
        for transition in &state.transitions_to {
            if mech.state(transition).is_none() {
                log.warn(format!(
                    "In mechanism {}, state {} transitions to unknown state {}",
                    instance.name, state.name, transition
                ));
            }
        }
    }
}
