//! Field mutability schema.
//!
//! Every model field that the merge engine treats specially is listed here
//! by dotted path, with its [`FieldPolicy`]. The table is static data, not
//! runtime discovery; the merge engine and the tunable parameter writer are
//! the two consumers and must agree on it.
//!
//! Paths are rooted at the element type, not the mechanism:
//! `"motor_controller.can_bus"`, `"control_data.gains.p"`, …
//! Unlisted fields default to [`FieldPolicy::Overridable`].

/// How a field behaves in a mechanism instance relative to its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The instance's value survives a merge while the owning element exists
    /// in the template.
    Overridable,
    /// The template's value always wins; instance edits are discarded.
    Constant,
    /// Overridable, and additionally exported to per-robot parameter files.
    Tunable,
}

/// One schema row.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub path: &'static str,
    pub policy: FieldPolicy,
}

const fn spec(path: &'static str, policy: FieldPolicy) -> FieldSpec {
    FieldSpec { path, policy }
}

/// The full mutability table.
///
/// Constant entries pin structure-like scalars to the template: which bus a
/// controller is wired to, whether it follows another controller, the
/// neutral/deadband shaping, the control mode of a control-data entry.
/// Per-robot hardware wiring (CAN ids, channels) and tuning values stay
/// overridable.
pub const FIELD_SPECS: &[FieldSpec] = &[
    // ── Motor controller ──
    spec("motor_controller.enabled", FieldPolicy::Overridable),
    spec("motor_controller.can_id", FieldPolicy::Overridable),
    spec("motor_controller.can_bus", FieldPolicy::Constant),
    spec("motor_controller.pdp_id", FieldPolicy::Overridable),
    spec("motor_controller.follower", FieldPolicy::Constant),
    spec(
        "motor_controller.voltage_ramping.open_loop_ramp_time",
        FieldPolicy::Overridable,
    ),
    spec(
        "motor_controller.voltage_ramping.closed_loop_ramp_time",
        FieldPolicy::Overridable,
    ),
    spec(
        "motor_controller.voltage_ramping.enable_closed_loop",
        FieldPolicy::Constant,
    ),
    spec(
        "motor_controller.motor_settings.inverted",
        FieldPolicy::Overridable,
    ),
    spec("motor_controller.motor_settings.mode", FieldPolicy::Constant),
    spec(
        "motor_controller.motor_settings.deadband_percent",
        FieldPolicy::Constant,
    ),
    spec(
        "motor_controller.motor_settings.peak_forward_duty_cycle",
        FieldPolicy::Constant,
    ),
    spec(
        "motor_controller.motor_settings.peak_reverse_duty_cycle",
        FieldPolicy::Constant,
    ),
    spec(
        "motor_controller.remote_sensor.source",
        FieldPolicy::Constant,
    ),
    spec(
        "motor_controller.remote_sensor.can_id",
        FieldPolicy::Overridable,
    ),
    spec(
        "motor_controller.remote_sensor.sensor_to_mechanism_ratio",
        FieldPolicy::Constant,
    ),
    spec("motor_controller.current_limits", FieldPolicy::Overridable),
    spec("motor_controller.monitored.filter_length", FieldPolicy::Overridable),
    // ── Control data ──
    spec("control_data.control_type", FieldPolicy::Constant),
    spec("control_data.enable_foc", FieldPolicy::Constant),
    spec("control_data.gains.p", FieldPolicy::Tunable),
    spec("control_data.gains.i", FieldPolicy::Tunable),
    spec("control_data.gains.d", FieldPolicy::Tunable),
    spec("control_data.gains.f", FieldPolicy::Tunable),
    spec("control_data.gains.izone", FieldPolicy::Tunable),
    // ── States ──
    spec("state.transitions_to", FieldPolicy::Constant),
    spec("state.motor_target.enabled", FieldPolicy::Overridable),
    spec("state.motor_target.target", FieldPolicy::Overridable),
    spec("state.solenoid_target.enabled", FieldPolicy::Overridable),
    spec("state.solenoid_target.extended", FieldPolicy::Overridable),
    // ── Auxiliary hardware ──
    spec("solenoid.channel", FieldPolicy::Overridable),
    spec("solenoid.reversed", FieldPolicy::Constant),
    spec("servo.channel", FieldPolicy::Overridable),
    spec("digital_input.channel", FieldPolicy::Overridable),
    spec("digital_input.reversed", FieldPolicy::Constant),
    spec("digital_input.debounce_time", FieldPolicy::Overridable),
];

/// Look up the policy for a dotted field path.
pub fn policy_of(path: &str) -> FieldPolicy {
    FIELD_SPECS
        .iter()
        .find(|s| s.path == path)
        .map(|s| s.policy)
        .unwrap_or(FieldPolicy::Overridable)
}

/// True when the instance value must be preserved across a merge.
pub fn is_overridable(path: &str) -> bool {
    !matches!(policy_of(path), FieldPolicy::Constant)
}

/// Gain field paths exported to tunable parameter files, in export order.
pub fn tunable_gain_fields() -> impl Iterator<Item = &'static str> {
    FIELD_SPECS
        .iter()
        .filter(|s| s.policy == FieldPolicy::Tunable)
        .map(|s| s.path)
}
