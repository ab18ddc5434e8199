//! Per-state decorator synthesis.
//!
//! Decorator files are the hand-editable seams of the generated tree: one
//! header/body pair per state, written on first generation only. The body
//! carries per-robot target-initialization functions synthesized with the
//! same sharing rule as the mechanism-level functions, dispatched on the
//! active robot identifier.

use mechgen_naming::{underscore_upper, upper_camel};
use mechgen_template::RenderContext;
use mechgen_types::model::{ControllerFamily, MechanismInstance, RobotConfig, State};
use mechgen_types::{GenResult, ProgressLog};

use crate::context::{robot_identifier_token, Emitter};
use mechgen_naming::controller_usage;

/// Fill `ctx` for one state's decorator header/body.
pub fn fill_state_context(
    emitter: &Emitter<'_>,
    mi: &MechanismInstance,
    state_name: &str,
    ctx: &mut RenderContext,
    log: &mut ProgressLog<'_>,
) -> GenResult<()> {
    ctx.set("STATE_NAME", upper_camel(state_name));

    // Robots sharing this mechanism template, declared order.
    let robots: Vec<&RobotConfig> = emitter
        .set
        .robots
        .iter()
        .filter(|r| {
            r.mechanism_instances
                .iter()
                .any(|other| other.mechanism.id == mi.mechanism.id)
        })
        .collect();

    // Target statements per robot, from that robot's own instance copy.
    let mut bodies: Vec<(&RobotConfig, Vec<String>)> = Vec::new();
    for robot in &robots {
        let instance = robot
            .mechanism_instances
            .iter()
            .find(|other| other.mechanism.id == mi.mechanism.id);
        let Some(instance) = instance else { continue };
        let Some(state) = instance.mechanism.state(state_name) else {
            continue;
        };
        bodies.push((
            *robot,
            target_statements(emitter, instance, state, log),
        ));
    }

    let state_token = upper_camel(state_name);
    let uniform = match bodies.first() {
        None => true,
        Some((_, first)) => bodies.iter().all(|(_, b)| b == first),
    };

    if uniform {
        let statements = bodies
            .first()
            .map(|(_, b)| b.clone())
            .unwrap_or_default();
        ctx.set("STATE_INIT_FUNCTION_DECLS", "void InitTargets();");
        ctx.set("STATE_INIT_FUNCTION_CALLS", "InitTargets();");
        ctx.set(
            "STATE_INIT_FUNCTIONS",
            init_function(&state_token, "InitTargets", &statements),
        );
        return Ok(());
    }

    let mut declarations = Vec::new();
    let mut definitions = Vec::new();
    let mut calls = String::new();
    for (i, (robot, statements)) in bodies.iter().enumerate() {
        let function = format!("Init{}", robot.full_name());
        declarations.push(format!("void {function}();"));
        definitions.push(init_function(&state_token, &function, statements));

        let keyword = if i == 0 { "if" } else { "    else if" };
        calls.push_str(&format!(
            "{keyword} (m_mechanism->GetActiveRobotId() == RobotConfigMgr::RobotIdentifier::{})\n",
            robot_identifier_token(robot)
        ));
        calls.push_str(&format!("    {{\n        {function}();\n    }}\n"));
    }

    ctx.set("STATE_INIT_FUNCTION_DECLS", declarations.join("\n        "));
    ctx.set("STATE_INIT_FUNCTION_CALLS", calls.trim_end().to_string());
    ctx.set("STATE_INIT_FUNCTIONS", definitions.join("\n"));
    Ok(())
}

/// One init-function definition. The synthesized target statements land in
/// a comment block: the decorator body belongs to the user, the generator
/// only seeds it.
fn init_function(state_token: &str, function: &str, statements: &[String]) -> String {
    let mut out = format!("void {state_token}State::{function}()\n{{\n");
    out.push_str("    // Targets captured from the robot configuration:\n");
    out.push_str("    /*\n");
    for statement in statements {
        out.push_str(&format!("    {statement}\n"));
    }
    out.push_str("    */\n}\n");
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Target statements
// ══════════════════════════════════════════════════════════════════════════════

/// Statements applying one state's targets, resolved against the owning
/// mechanism. Dangling references are reported and their statements
/// omitted; generation continues.
fn target_statements(
    emitter: &Emitter<'_>,
    mi: &MechanismInstance,
    state: &State,
    log: &mut ProgressLog<'_>,
) -> Vec<String> {
    let mech = &mi.mechanism;
    let mut statements = Vec::new();

    for target in state.motor_targets.iter().filter(|t| t.enabled) {
        let Some(cd) = mech.control_data(&target.control_data) else {
            log.warn(format!(
                "In mechanism {}, cannot find a motor control data called {}, \
                 referenced in state {}",
                mi.name, target.control_data, state.name
            ));
            continue;
        };
        let Some(controller) = mech.controller(&target.controller) else {
            log.warn(format!(
                "In mechanism {}, cannot find a motor controller called {}, \
                 referenced in state {}",
                mi.name, target.controller, state.name
            ));
            continue;
        };

        let usage = controller_usage(&mi.name, controller, &mech.motor_controllers);

        // Brushless controllers push their control constants to the
        // hardware slot before the target is applied.
        if matches!(
            controller.family,
            ControllerFamily::SparkMax(_) | ControllerFamily::SparkFlex(_)
        ) {
            statements.push(format!(
                "m_mechanism->Get{}()->SetControlConstants(0, *m_mechanism->Get{}())",
                mechgen_naming::controller_accessor(controller, &mech.motor_controllers),
                upper_camel(&cd.name)
            ));
        }

        statements.push(target_statement(emitter, mi, &usage, cd, target, log));
    }

    for target in state.solenoid_targets.iter().filter(|t| t.enabled) {
        if mech.solenoids.iter().all(|s| s.name != target.solenoid) {
            log.warn(format!(
                "In mechanism {}, cannot find a solenoid called {}, referenced in state {}",
                mi.name, target.solenoid, state.name
            ));
            continue;
        }
        statements.push(format!(
            "m_mechanism->UpdateTarget(RobotElementNames::SOLENOID_USAGE::{}_{}, {})",
            underscore_upper(&mi.name),
            underscore_upper(&target.solenoid),
            target.extended
        ));
    }

    statements
}

fn target_statement(
    emitter: &Emitter<'_>,
    mi: &MechanismInstance,
    usage: &str,
    cd: &mechgen_types::model::MotorControlData,
    target: &mechgen_types::model::MotorTarget,
    log: &mut ProgressLog<'_>,
) -> String {
    match cd.control_type.target_units_type() {
        None => format!(
            "SetTargetControl(RobotElementNames::MOTOR_CONTROLLER_USAGE::{usage}, {})",
            target.target.value
        ),
        Some(outer) => {
            let wrapped = match emitter.units.type_name(&target.target.units) {
                Some(inner) => format!("{outer}({inner}({}))", target.target.value),
                None => {
                    log.warn(format!(
                        "In mechanism {}, unknown physical unit tag `{}` on a target in \
                         control data {}; emitting the raw value",
                        mi.name, target.target.units, cd.name
                    ));
                    format!("{outer}({})", target.target.value)
                }
            };
            format!(
                "SetTargetControl(RobotElementNames::MOTOR_CONTROLLER_USAGE::{usage}, \
                 m_mechanism->Get{}(), {wrapped})",
                upper_camel(&cd.name)
            )
        }
    }
}
