//! The merge walk.
//!
//! `merge_with_report` does the work; `merge` is the convenience wrapper
//! that routes the report into the progress log. The walk starts from the
//! template clone (which fixes the shape) and pulls overridable values in
//! from the instance wherever a counterpart element exists.

use mechgen_types::model::{
    ControllerFamily, Mechanism, MotorControlData, MotorController, MotorTarget,
    SolenoidTarget, State,
};
use mechgen_types::schema::is_overridable;
use mechgen_types::{GenError, GenResult, ProgressLog};

use crate::event::{MergeEventKind, MergeReport};

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Merge the existing instance's overrides into a fresh template clone.
///
/// Returns the merged mechanism; element-level changes and data-loss cases
/// are reported through `log`.
pub fn merge(
    template_clone: Mechanism,
    existing: &Mechanism,
    log: &mut ProgressLog<'_>,
) -> GenResult<Mechanism> {
    let (merged, report) = merge_with_report(template_clone, existing)?;
    for event in &report.events {
        match event.kind {
            MergeEventKind::Replaced => log.warn(format!("{}: {}", merged.name, event)),
            _ => log.note(format!("{}: {}", merged.name, event)),
        }
    }
    Ok(merged)
}

/// Merge, returning the structured change report alongside the result.
pub fn merge_with_report(
    template_clone: Mechanism,
    existing: &Mechanism,
) -> GenResult<(Mechanism, MergeReport)> {
    check_correlation_keys(&template_clone)?;
    check_correlation_keys(existing)?;

    let mut merged = template_clone;
    let mut report = MergeReport::default();

    merge_states(&mut merged.states, &existing.states, &mut report);
    merge_controllers(
        &mut merged.motor_controllers,
        &existing.motor_controllers,
        &mut report,
    );
    merge_control_data(&mut merged.control_data, &existing.control_data, &mut report);
    merge_solenoids(&mut merged, existing, &mut report);
    merge_servos(&mut merged, existing, &mut report);
    merge_digital_inputs(&mut merged, existing, &mut report);

    Ok((merged, report))
}

// ══════════════════════════════════════════════════════════════════════════════
// Correlation-key validation
// ══════════════════════════════════════════════════════════════════════════════

/// Name-keyed correlation is only well-defined when sibling names are
/// unique. Controllers are keyed by (name, concrete family) instead, since
/// same-named controllers of different families are legal.
fn check_correlation_keys(mechanism: &Mechanism) -> GenResult<()> {
    check_unique(
        mechanism,
        "states",
        mechanism.states.iter().map(|s| s.name.clone()),
    )?;
    check_unique(
        mechanism,
        "control data",
        mechanism.control_data.iter().map(|cd| cd.name.clone()),
    )?;
    check_unique(
        mechanism,
        "solenoids",
        mechanism.solenoids.iter().map(|s| s.name.clone()),
    )?;
    check_unique(
        mechanism,
        "servos",
        mechanism.servos.iter().map(|s| s.name.clone()),
    )?;
    check_unique(
        mechanism,
        "digital inputs",
        mechanism.digital_inputs.iter().map(|d| d.name.clone()),
    )?;
    check_unique(
        mechanism,
        "motor controllers",
        mechanism
            .motor_controllers
            .iter()
            .map(|m| format!("{}/{}", m.name, m.family_name())),
    )?;
    Ok(())
}

fn check_unique(
    mechanism: &Mechanism,
    collection: &str,
    keys: impl Iterator<Item = String>,
) -> GenResult<()> {
    let mut seen: Vec<String> = Vec::new();
    for key in keys {
        if seen.contains(&key) {
            return Err(GenError::Consistency(format!(
                "mechanism `{}`: duplicate name `{}` among {}",
                mechanism.name, key, collection
            )));
        }
        seen.push(key);
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// States
// ══════════════════════════════════════════════════════════════════════════════

fn merge_states(merged: &mut [State], existing: &[State], report: &mut MergeReport) {
    for state in merged.iter_mut() {
        match existing.iter().find(|s| s.name == state.name) {
            Some(inst) => apply_state_overrides(state, inst),
            None => report.push(format!("states.{}", state.name), MergeEventKind::Added),
        }
    }
    for inst in existing {
        if !merged.iter().any(|s| s.name == inst.name) {
            report.push(format!("states.{}", inst.name), MergeEventKind::Removed);
        }
    }
}

fn apply_state_overrides(merged: &mut State, inst: &State) {
    // transitions_to is constant-in-instance: the template's list stands.
    for target in merged.motor_targets.iter_mut() {
        let counterpart = inst
            .motor_targets
            .iter()
            .find(|t| t.controller == target.controller && t.control_data == target.control_data);
        if let Some(existing) = counterpart {
            apply_motor_target_overrides(target, existing);
        }
    }
    for target in merged.solenoid_targets.iter_mut() {
        let counterpart = inst
            .solenoid_targets
            .iter()
            .find(|t| t.solenoid == target.solenoid);
        if let Some(existing) = counterpart {
            apply_solenoid_target_overrides(target, existing);
        }
    }
}

fn apply_motor_target_overrides(merged: &mut MotorTarget, inst: &MotorTarget) {
    if is_overridable("state.motor_target.enabled") {
        merged.enabled = inst.enabled;
    }
    if is_overridable("state.motor_target.target") {
        merged.target = inst.target.clone();
    }
}

fn apply_solenoid_target_overrides(merged: &mut SolenoidTarget, inst: &SolenoidTarget) {
    if is_overridable("state.solenoid_target.enabled") {
        merged.enabled = inst.enabled;
    }
    if is_overridable("state.solenoid_target.extended") {
        merged.extended = inst.extended;
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Motor controllers
// ══════════════════════════════════════════════════════════════════════════════

fn merge_controllers(
    merged: &mut [MotorController],
    existing: &[MotorController],
    report: &mut MergeReport,
) {
    // (name, family) keys the template offers; computed up front because the
    // family-change check below needs the full template view while iterating.
    let template_keys: Vec<(String, &'static str)> = merged
        .iter()
        .map(|m| (m.name.clone(), m.family_name()))
        .collect();
    let in_template =
        |name: &str, family: &str| template_keys.iter().any(|(n, f)| n == name && *f == family);

    for controller in merged.iter_mut() {
        let exact = existing
            .iter()
            .find(|m| m.name == controller.name && m.family_name() == controller.family_name());
        if let Some(inst) = exact {
            apply_controller_overrides(controller, inst);
            continue;
        }
        // No (name, family) match. If the instance holds a same-named
        // controller that no template slot accounts for, the template
        // changed this controller's concrete family: the template wins and
        // the instance override is lost.
        let family_changed = existing
            .iter()
            .any(|m| m.name == controller.name && !in_template(&m.name, m.family_name()));
        report.push(
            format!("motor_controllers.{}", controller.name),
            if family_changed {
                MergeEventKind::Replaced
            } else {
                MergeEventKind::Added
            },
        );
    }

    for inst in existing {
        if in_template(&inst.name, inst.family_name()) {
            continue;
        }
        // A surviving name means the family-change case above already
        // reported this controller as Replaced.
        let name_survives = template_keys.iter().any(|(n, _)| n == &inst.name);
        if !name_survives {
            report.push(
                format!("motor_controllers.{}", inst.name),
                MergeEventKind::Removed,
            );
        }
    }
}

fn apply_controller_overrides(merged: &mut MotorController, inst: &MotorController) {
    if is_overridable("motor_controller.enabled") {
        merged.enabled = inst.enabled;
    }
    if is_overridable("motor_controller.can_id") {
        merged.can_id = inst.can_id;
    }
    if is_overridable("motor_controller.can_bus") {
        merged.can_bus = inst.can_bus;
    }
    if is_overridable("motor_controller.pdp_id") {
        merged.pdp_id = inst.pdp_id;
    }
    if is_overridable("motor_controller.follower") {
        merged.follower = inst.follower;
    }
    if is_overridable("motor_controller.voltage_ramping.open_loop_ramp_time") {
        merged.voltage_ramping.open_loop_ramp_time = inst.voltage_ramping.open_loop_ramp_time;
    }
    if is_overridable("motor_controller.voltage_ramping.closed_loop_ramp_time") {
        merged.voltage_ramping.closed_loop_ramp_time = inst.voltage_ramping.closed_loop_ramp_time;
    }
    if is_overridable("motor_controller.voltage_ramping.enable_closed_loop") {
        merged.voltage_ramping.enable_closed_loop = inst.voltage_ramping.enable_closed_loop;
    }
    apply_family_overrides(&mut merged.family, &inst.family);
}

/// Recurse into the family payload. The correlation key guarantees both
/// sides carry the same concrete family here.
fn apply_family_overrides(merged: &mut ControllerFamily, inst: &ControllerFamily) {
    match (merged, inst) {
        (ControllerFamily::TalonFx(m), ControllerFamily::TalonFx(i))
        | (ControllerFamily::TalonFxs(m), ControllerFamily::TalonFxs(i)) => {
            if is_overridable("motor_controller.current_limits") {
                m.current_limits = i.current_limits.clone();
            }
            apply_motor_settings_overrides(&mut m.motor_settings, &i.motor_settings);
            if is_overridable("motor_controller.remote_sensor.can_id") {
                m.remote_sensor.can_id = i.remote_sensor.can_id;
            }
            if is_overridable("motor_controller.remote_sensor.source") {
                m.remote_sensor.source = i.remote_sensor.source;
            }
            if is_overridable("motor_controller.remote_sensor.sensor_to_mechanism_ratio") {
                m.remote_sensor.sensor_to_mechanism_ratio = i.remote_sensor.sensor_to_mechanism_ratio;
            }
        }
        (ControllerFamily::TalonSrx(m), ControllerFamily::TalonSrx(i)) => {
            if is_overridable("motor_controller.current_limits") {
                m.current_limits = i.current_limits.clone();
            }
            apply_motor_settings_overrides(&mut m.motor_settings, &i.motor_settings);
        }
        (ControllerFamily::SparkMax(m), ControllerFamily::SparkMax(i))
        | (ControllerFamily::SparkFlex(m), ControllerFamily::SparkFlex(i)) => {
            if is_overridable("motor_controller.current_limits") {
                m.primary_current_limit = i.primary_current_limit;
                m.secondary_current_limit = i.secondary_current_limit;
                m.secondary_limit_cycles = i.secondary_limit_cycles;
            }
            apply_motor_settings_overrides(&mut m.motor_settings, &i.motor_settings);
            if let (Some(m_mon), Some(i_mon)) = (m.monitored.as_mut(), i.monitored.as_ref()) {
                if is_overridable("motor_controller.monitored.filter_length") {
                    m_mon.filter_length = i_mon.filter_length;
                }
            }
        }
        _ => {
            // Mismatched families never reach here; the correlation key in
            // merge_controllers filters them out.
            debug_assert!(false, "family mismatch slipped past correlation");
        }
    }
}

fn apply_motor_settings_overrides(
    merged: &mut mechgen_types::model::MotorOutputSettings,
    inst: &mechgen_types::model::MotorOutputSettings,
) {
    if is_overridable("motor_controller.motor_settings.inverted") {
        merged.inverted = inst.inverted;
    }
    if is_overridable("motor_controller.motor_settings.mode") {
        merged.mode = inst.mode;
    }
    if is_overridable("motor_controller.motor_settings.deadband_percent") {
        merged.deadband_percent = inst.deadband_percent;
    }
    if is_overridable("motor_controller.motor_settings.peak_forward_duty_cycle") {
        merged.peak_forward_duty_cycle = inst.peak_forward_duty_cycle;
    }
    if is_overridable("motor_controller.motor_settings.peak_reverse_duty_cycle") {
        merged.peak_reverse_duty_cycle = inst.peak_reverse_duty_cycle;
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Control data
// ══════════════════════════════════════════════════════════════════════════════

fn merge_control_data(
    merged: &mut [MotorControlData],
    existing: &[MotorControlData],
    report: &mut MergeReport,
) {
    for cd in merged.iter_mut() {
        match existing.iter().find(|e| e.name == cd.name) {
            Some(inst) => {
                // control_type and enable_foc are constant-in-instance.
                if is_overridable("control_data.gains.p") {
                    cd.gains.p = inst.gains.p;
                }
                if is_overridable("control_data.gains.i") {
                    cd.gains.i = inst.gains.i;
                }
                if is_overridable("control_data.gains.d") {
                    cd.gains.d = inst.gains.d;
                }
                if is_overridable("control_data.gains.f") {
                    cd.gains.f = inst.gains.f;
                }
                if is_overridable("control_data.gains.izone") {
                    cd.gains.izone = inst.gains.izone;
                }
            }
            None => report.push(format!("control_data.{}", cd.name), MergeEventKind::Added),
        }
    }
    for inst in existing {
        if !merged.iter().any(|cd| cd.name == inst.name) {
            report.push(format!("control_data.{}", inst.name), MergeEventKind::Removed);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Auxiliary hardware
// ══════════════════════════════════════════════════════════════════════════════

fn merge_solenoids(merged: &mut Mechanism, existing: &Mechanism, report: &mut MergeReport) {
    for sol in merged.solenoids.iter_mut() {
        match existing.solenoids.iter().find(|s| s.name == sol.name) {
            Some(inst) => {
                sol.enabled = inst.enabled;
                if is_overridable("solenoid.channel") {
                    sol.channel = inst.channel;
                }
                if is_overridable("solenoid.reversed") {
                    sol.reversed = inst.reversed;
                }
            }
            None => report.push(format!("solenoids.{}", sol.name), MergeEventKind::Added),
        }
    }
    for inst in &existing.solenoids {
        if !merged.solenoids.iter().any(|s| s.name == inst.name) {
            report.push(format!("solenoids.{}", inst.name), MergeEventKind::Removed);
        }
    }
}

fn merge_servos(merged: &mut Mechanism, existing: &Mechanism, report: &mut MergeReport) {
    for servo in merged.servos.iter_mut() {
        match existing.servos.iter().find(|s| s.name == servo.name) {
            Some(inst) => {
                servo.enabled = inst.enabled;
                if is_overridable("servo.channel") {
                    servo.channel = inst.channel;
                }
            }
            None => report.push(format!("servos.{}", servo.name), MergeEventKind::Added),
        }
    }
    for inst in &existing.servos {
        if !merged.servos.iter().any(|s| s.name == inst.name) {
            report.push(format!("servos.{}", inst.name), MergeEventKind::Removed);
        }
    }
}

fn merge_digital_inputs(merged: &mut Mechanism, existing: &Mechanism, report: &mut MergeReport) {
    for di in merged.digital_inputs.iter_mut() {
        match existing.digital_inputs.iter().find(|d| d.name == di.name) {
            Some(inst) => {
                if is_overridable("digital_input.channel") {
                    di.channel = inst.channel;
                }
                if is_overridable("digital_input.reversed") {
                    di.reversed = inst.reversed;
                }
                if is_overridable("digital_input.debounce_time") {
                    di.debounce_time = inst.debounce_time;
                }
            }
            None => report.push(format!("digital_inputs.{}", di.name), MergeEventKind::Added),
        }
    }
    for inst in &existing.digital_inputs {
        if !merged.digital_inputs.iter().any(|d| d.name == inst.name) {
            report.push(
                format!("digital_inputs.{}", inst.name),
                MergeEventKind::Removed,
            );
        }
    }
}
