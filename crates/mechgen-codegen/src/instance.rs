//! Instance-level placeholder synthesis.
//!
//! Fills the render context for the mechanism body and header templates:
//! feature flags derived from the model, element definitions and getters,
//! state enum/map/creation/transition text, target plumbing, and the
//! per-robot create/initialize functions from [`crate::robots`].

use mechgen_naming::{
    controller_accessor, controller_member, controller_suffix, member_variable, underscore_upper,
    upper_camel,
};
use mechgen_template::RenderContext;
use mechgen_types::model::{
    ControlType, ControllerFamily, Mechanism, MechanismInstance, MotorControlData,
    MotorController, PidGains,
};
use mechgen_types::{GenResult, ProgressLog};

use crate::context::Emitter;
use crate::robots;

/// Fill `ctx` with everything the instance-level templates reference.
pub fn fill_instance_context(
    emitter: &Emitter<'_>,
    mi: &MechanismInstance,
    ctx: &mut RenderContext,
    log: &mut ProgressLog<'_>,
) -> GenResult<()> {
    let mech = &mi.mechanism;

    // ── Feature flags ────────────────────────────────────────────────────
    ctx.set_feature("STATE_MANAGER", !mech.states.is_empty());
    ctx.set_feature("MECHANISM_HAS_MOTORS", !mech.motor_controllers.is_empty());
    ctx.set_feature("MECHANISM_HAS_SOLENOIDS", !mech.solenoids.is_empty());
    ctx.set_feature("MECHANISM_HAS_SERVOS", !mech.servos.is_empty());
    for control_type in mech.control_types_in_use() {
        ctx.enable(format!("UPDATE_TARGET_{}", control_type.as_str()));
    }

    // ── Includes ─────────────────────────────────────────────────────────
    ctx.set("INCLUDE_FILES", include_files(mech));
    ctx.set("STATE_CLASSES_INCLUDES", state_class_includes(mi));

    // ── States ───────────────────────────────────────────────────────────
    ctx.set("STATE_NAMES", state_enum_list(mech));
    ctx.set("STATE_MAP", state_map_entries(mi));
    ctx.set("OBJECT_CREATION", state_object_creation(mi));
    ctx.set(
        "STATE_TRANSITION_REGISTRATION",
        transition_registration(mi, log),
    );

    // ── Elements ─────────────────────────────────────────────────────────
    ctx.set("MECHANISM_ELEMENTS", element_definitions(mech));
    ctx.set("MECHANISM_ELEMENTS_GETTERS", element_getters(mech));

    // ── Targets ──────────────────────────────────────────────────────────
    ctx.set("TARGET_MEMBER_VARIABLES", target_member_variables(mech));
    let (update_defs, update_decls) = target_update_functions(mi);
    ctx.set("TARGET_UPDATE_FUNCTIONS", update_defs);
    ctx.set("TARGET_UPDATE_FUNCTION_DECLS", update_decls);
    ctx.set("CYCLIC_TARGET_REFRESH", cyclic_target_refresh(mech));

    // ── Tuning ───────────────────────────────────────────────────────────
    ctx.set("READ_TUNABLE_PARAMETERS", read_tunable_parameters(mech));
    ctx.set("PUSH_TUNABLE_PARAMETERS", push_tunable_parameters(mech));

    // ── Per-robot branch synthesis ───────────────────────────────────────
    let create = robots::create_functions(emitter, &mi.name);
    ctx.set("CREATE_FUNCTIONS", create.definitions);
    ctx.set("CREATE_FUNCTION_DECLS", create.declarations);
    let init = robots::initialization_functions(emitter, &mi.name);
    ctx.set("INITIALIZATION_FUNCTIONS", init.definitions);
    ctx.set("INITIALIZATION_FUNCTION_DECLS", init.declarations);

    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// Includes
// ══════════════════════════════════════════════════════════════════════════════

fn include_files(mech: &Mechanism) -> String {
    let mut includes: Vec<&str> = Vec::new();
    for controller in &mech.motor_controllers {
        let file = controller.family.include_file();
        if !includes.contains(&file) {
            includes.push(file);
        }
    }
    if !mech.solenoids.is_empty() {
        includes.push("hw/DragonSolenoid.h");
    }
    if !mech.servos.is_empty() {
        includes.push("hw/DragonServo.h");
    }
    if !mech.digital_inputs.is_empty() {
        includes.push("hw/DragonDigitalInput.h");
    }
    includes
        .iter()
        .map(|f| format!("#include \"{f}\""))
        .collect::<Vec<_>>()
        .join("\n")
}

fn state_class_includes(mi: &MechanismInstance) -> String {
    mi.mechanism
        .states
        .iter()
        .map(|s| {
            format!(
                "#include \"mechanisms/{}/decoratormods/{}State.h\"",
                mi.name, s.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ══════════════════════════════════════════════════════════════════════════════
// States
// ══════════════════════════════════════════════════════════════════════════════

fn state_enum_list(mech: &Mechanism) -> String {
    mech.states
        .iter()
        .map(|s| format!("STATE_{}", underscore_upper(&s.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn state_map_entries(mi: &MechanismInstance) -> String {
    mi.mechanism
        .states
        .iter()
        .map(|s| {
            let token = underscore_upper(&s.name);
            format!(
                "{{\"STATE_{token}\", {}::STATE_NAMES::STATE_{token}}}",
                mi.name
            )
        })
        .collect::<Vec<_>>()
        .join(",\n    ")
}

fn state_object_creation(mi: &MechanismInstance) -> String {
    mi.mechanism
        .states
        .iter()
        .enumerate()
        .map(|(index, s)| {
            format!(
                "auto {}StateInst = new {}States::{}State(\"{}\", {}, this)",
                state_var(&s.name),
                mi.name,
                upper_camel(&s.name),
                s.name,
                index
            )
        })
        .collect::<Vec<_>>()
        .join(";\n    ")
}

/// A state with an empty transition list registers itself as its only
/// transition target.
fn transition_registration(mi: &MechanismInstance, log: &mut ProgressLog<'_>) -> String {
    let mech = &mi.mechanism;
    let mut registrations = Vec::new();
    for state in &mech.states {
        if state.transitions_to.is_empty() {
            registrations.push(format!(
                "{0}StateInst->RegisterTransitionState({0}StateInst)",
                state_var(&state.name)
            ));
            continue;
        }
        for transition in &state.transitions_to {
            if mech.state(transition).is_none() {
                log.warn(format!(
                    "In mechanism {}, state {} transitions to unknown state {}; \
                     the registration was omitted",
                    mi.name, state.name, transition
                ));
                continue;
            }
            registrations.push(format!(
                "{}StateInst->RegisterTransitionState({}StateInst)",
                state_var(&state.name),
                state_var(transition)
            ));
        }
    }
    registrations.join(";\n    ")
}

fn state_var(state_name: &str) -> String {
    mechgen_naming::lower_camel(state_name)
}

// ══════════════════════════════════════════════════════════════════════════════
// Elements
// ══════════════════════════════════════════════════════════════════════════════

fn element_definitions(mech: &Mechanism) -> String {
    let mut lines = Vec::new();
    for controller in &mech.motor_controllers {
        lines.push(format!(
            "{} *{};",
            controller.family.implementation_name(),
            controller_member(controller, &mech.motor_controllers)
        ));
    }
    for cd in &mech.control_data {
        lines.push(format!("ControlData *{};", member_variable(&cd.name)));
    }
    for sol in &mech.solenoids {
        lines.push(format!("DragonSolenoid *{};", member_variable(&sol.name)));
    }
    for servo in &mech.servos {
        lines.push(format!("DragonServo *{};", member_variable(&servo.name)));
    }
    for di in &mech.digital_inputs {
        lines.push(format!("DragonDigitalInput *{};", member_variable(&di.name)));
    }
    lines.join("\n    ")
}

fn element_getters(mech: &Mechanism) -> String {
    let mut lines = Vec::new();
    for controller in &mech.motor_controllers {
        lines.push(format!(
            "{} *Get{}() const {{ return {}; }}",
            controller.family.implementation_name(),
            controller_accessor(controller, &mech.motor_controllers),
            controller_member(controller, &mech.motor_controllers)
        ));
    }
    for cd in &mech.control_data {
        lines.push(format!(
            "ControlData *Get{}() const {{ return {}; }}",
            upper_camel(&cd.name),
            member_variable(&cd.name)
        ));
    }
    for sol in &mech.solenoids {
        lines.push(format!(
            "DragonSolenoid *Get{}() const {{ return {}; }}",
            upper_camel(&sol.name),
            member_variable(&sol.name)
        ));
    }
    for servo in &mech.servos {
        lines.push(format!(
            "DragonServo *Get{}() const {{ return {}; }}",
            upper_camel(&servo.name),
            member_variable(&servo.name)
        ));
    }
    lines.join("\n    ")
}

// ══════════════════════════════════════════════════════════════════════════════
// Target plumbing
// ══════════════════════════════════════════════════════════════════════════════

/// Member for one (controller, control data) request object.
fn target_member(
    controller: &MotorController,
    cd: &MotorControlData,
    all: &[MotorController],
) -> String {
    let suffix = controller_suffix(controller, all);
    member_variable(&format!(
        "{}{}{}",
        controller.name,
        suffix,
        upper_camel(&cd.name)
    ))
}

/// Phoenix control-request type for a control mode.
fn phoenix_request(cd: &MotorControlData) -> Option<(&'static str, &'static str)> {
    let foc = cd.enable_foc;
    match cd.control_type {
        ControlType::PercentOutput => Some(("ctre::phoenix6::controls::DutyCycleOut", "0.0")),
        ControlType::VoltageOutput => Some((
            "ctre::phoenix6::controls::VoltageOut",
            "units::voltage::volt_t(0.0)",
        )),
        ControlType::PositionDegrees | ControlType::PositionInch => Some((
            if foc {
                "ctre::phoenix6::controls::PositionTorqueCurrentFOC"
            } else {
                "ctre::phoenix6::controls::PositionVoltage"
            },
            "units::angle::turn_t(0.0)",
        )),
        ControlType::VelocityDegreesPerSec
        | ControlType::VelocityFeetPerSec
        | ControlType::VelocityRevPerSec => Some((
            if foc {
                "ctre::phoenix6::controls::VelocityTorqueCurrentFOC"
            } else {
                "ctre::phoenix6::controls::VelocityVoltage"
            },
            "units::angular_velocity::turns_per_second_t(0.0)",
        )),
    }
}

fn target_member_variables(mech: &Mechanism) -> String {
    let mut lines = Vec::new();
    for controller in &mech.motor_controllers {
        if controller.follower.is_some() {
            continue;
        }
        match &controller.family {
            ControllerFamily::TalonFx(_) | ControllerFamily::TalonFxs(_) => {
                for cd in &mech.control_data {
                    if let Some((request_type, initial)) = phoenix_request(cd) {
                        lines.push(format!(
                            "{request_type} {}{{{initial}}};",
                            target_member(controller, cd, &mech.motor_controllers)
                        ));
                    }
                }
                lines.push(format!(
                    "ctre::phoenix6::controls::ControlRequest *{}ActiveTarget;",
                    controller_member(controller, &mech.motor_controllers)
                ));
            }
            ControllerFamily::TalonSrx(_) => {
                lines.push(format!(
                    "double {}ActiveTarget = 0.0;",
                    controller_member(controller, &mech.motor_controllers)
                ));
            }
            ControllerFamily::SparkMax(_) | ControllerFamily::SparkFlex(_) => {}
        }
    }
    lines.join("\n    ")
}

/// Signature argument plus assignment text per control mode.
fn update_signature(cd: &MotorControlData) -> (&'static str, String) {
    match cd.control_type {
        ControlType::PercentOutput => ("double percentOut", "Output = percentOut".to_string()),
        ControlType::VoltageOutput => (
            "units::voltage::volt_t voltageOut",
            "Output = voltageOut".to_string(),
        ),
        ControlType::PositionDegrees => (
            "units::angle::turn_t position",
            "Position = position".to_string(),
        ),
        ControlType::PositionInch => (
            "units::length::inch_t position",
            "Position = units::angle::turn_t(position.value())".to_string(),
        ),
        ControlType::VelocityDegreesPerSec | ControlType::VelocityRevPerSec => (
            "units::angular_velocity::turns_per_second_t velocity",
            "Velocity = velocity".to_string(),
        ),
        ControlType::VelocityFeetPerSec => (
            "units::velocity::feet_per_second_t velocity",
            "Velocity = units::angular_velocity::turns_per_second_t(velocity.value())".to_string(),
        ),
    }
}

fn target_update_functions(mi: &MechanismInstance) -> (String, String) {
    let mech = &mi.mechanism;
    let mut definitions = Vec::new();
    let mut declarations = Vec::new();

    for controller in &mech.motor_controllers {
        if controller.follower.is_some() {
            continue;
        }
        let accessor = controller_accessor(controller, &mech.motor_controllers);
        let member = controller_member(controller, &mech.motor_controllers);
        match &controller.family {
            ControllerFamily::TalonFx(_) | ControllerFamily::TalonFxs(_) => {
                for cd in &mech.control_data {
                    let (arg, assignment) = update_signature(cd);
                    let request = target_member(controller, cd, &mech.motor_controllers);
                    let cd_token = upper_camel(&cd.name);
                    declarations.push(format!(
                        "void UpdateTarget{accessor}{cd_token}({arg});"
                    ));
                    definitions.push(format!(
                        "void {}::UpdateTarget{accessor}{cd_token}({arg})\n{{\n    \
                         {request}.{assignment};\n    {member}ActiveTarget = &{request};\n}}\n",
                        mi.name
                    ));
                }
            }
            ControllerFamily::TalonSrx(_) => {
                for cd in &mech.control_data {
                    if cd.control_type != ControlType::PercentOutput {
                        continue;
                    }
                    let cd_token = upper_camel(&cd.name);
                    declarations.push(format!(
                        "void UpdateTarget{accessor}{cd_token}(double percentOut);"
                    ));
                    definitions.push(format!(
                        "void {}::UpdateTarget{accessor}{cd_token}(double percentOut)\n{{\n    \
                         {member}ActiveTarget = percentOut;\n}}\n",
                        mi.name
                    ));
                }
            }
            ControllerFamily::SparkMax(_) | ControllerFamily::SparkFlex(_) => {}
        }
    }

    (definitions.join("\n"), declarations.join("\n    "))
}

fn cyclic_target_refresh(mech: &Mechanism) -> String {
    let mut lines = Vec::new();
    for controller in &mech.motor_controllers {
        if controller.follower.is_some() {
            continue;
        }
        let member = controller_member(controller, &mech.motor_controllers);
        match &controller.family {
            ControllerFamily::TalonFx(_) | ControllerFamily::TalonFxs(_) => {
                lines.push(format!("{member}->SetControl(*{member}ActiveTarget);"));
            }
            ControllerFamily::TalonSrx(_) => {
                lines.push(format!(
                    "{member}->Set(ctre::phoenix::motorcontrol::TalonSRXControlMode::PercentOutput, \
                     {member}ActiveTarget);"
                ));
            }
            ControllerFamily::SparkMax(_) | ControllerFamily::SparkFlex(_) => {}
        }
    }
    lines.join("\n    ")
}

// ══════════════════════════════════════════════════════════════════════════════
// Tunable parameter plumbing
// ══════════════════════════════════════════════════════════════════════════════

/// (key suffix, accessor suffix, value) per gain, driven by the tunable
/// rows of the field schema so the exported set cannot drift from it.
pub(crate) fn gain_rows(gains: &PidGains) -> Vec<(&'static str, &'static str, f64)> {
    mechgen_types::schema::tunable_gain_fields()
        .filter_map(|path| {
            let key = path.rsplit('.').next()?;
            let (accessor, value) = match key {
                "p" => ("P", gains.p),
                "i" => ("I", gains.i),
                "d" => ("D", gains.d),
                "f" => ("F", gains.f),
                "izone" => ("IZone", gains.izone),
                _ => return None,
            };
            Some((key, accessor, value))
        })
        .collect()
}

fn read_tunable_parameters(mech: &Mechanism) -> String {
    let mut lines = Vec::new();
    for cd in &mech.control_data {
        if !cd.control_type.is_closed_loop() {
            continue;
        }
        let member = member_variable(&cd.name);
        for (key, accessor, value) in gain_rows(&cd.gains) {
            lines.push(format!(
                "{member}->Set{accessor}(m_table.get()->GetNumber(\"{}_{key}\", {value}));",
                cd.name
            ));
        }
    }
    lines.join("\n    ")
}

fn push_tunable_parameters(mech: &Mechanism) -> String {
    let mut lines = Vec::new();
    for cd in &mech.control_data {
        if !cd.control_type.is_closed_loop() {
            continue;
        }
        let member = member_variable(&cd.name);
        for (key, accessor, _) in gain_rows(&cd.gains) {
            lines.push(format!(
                "m_table.get()->PutNumber(\"{}_{key}\", {member}->Get{accessor}());",
                cd.name
            ));
        }
    }
    lines.join("\n    ")
}
