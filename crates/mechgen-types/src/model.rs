//! Model types for the robot variant tree.
//!
//! The tree is owned data all the way down: a [`RobotVariantSet`] owns its
//! [`RobotConfig`]s, each robot owns its [`MechanismInstance`]s, and every
//! instance owns a deep clone of a [`Mechanism`] template. Instances refer
//! back to their template only through a [`MechanismId`] — never through a
//! live reference.
//!
//! Collection order is meaningful everywhere: generated enum ordinals and
//! per-robot dispatch chains are derived from declaration order and must be
//! stable across regenerations. `Vec` is used throughout; nothing here may
//! be reordered behind the model's back.

use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Identity
// ══════════════════════════════════════════════════════════════════════════════

/// Opaque identity of a mechanism template.
///
/// Survives renames: two mechanisms with the same id are "the same" logical
/// mechanism regardless of their current names. Allocated by
/// [`crate::registry::TemplateRegistry`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MechanismId(pub u64);

impl fmt::Display for MechanismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Robot variants
// ══════════════════════════════════════════════════════════════════════════════

/// The full configuration supplied by the caller: every robot variant plus
/// the canonical mechanism templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotVariantSet {
    /// Robot variants in declared order.
    pub robots: Vec<RobotConfig>,
    /// Canonical templates, id-indexed.
    pub templates: crate::registry::TemplateRegistry,
}

impl RobotVariantSet {
    pub fn new() -> Self {
        Self {
            robots: Vec::new(),
            templates: crate::registry::TemplateRegistry::new(),
        }
    }

    /// All robots that carry a mechanism instance with the given name,
    /// in declared order.
    pub fn robots_with_instance(&self, instance_name: &str) -> Vec<&RobotConfig> {
        self.robots
            .iter()
            .filter(|r| r.instance(instance_name).is_some())
            .collect()
    }

    /// Distinct mechanism instance names across all robots, first-seen order.
    pub fn distinct_instance_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for robot in &self.robots {
            for mi in &robot.mechanism_instances {
                if !names.iter().any(|n| n == &mi.name) {
                    names.push(mi.name.clone());
                }
            }
        }
        names
    }
}

impl Default for RobotVariantSet {
    fn default() -> Self {
        Self::new()
    }
}

/// One physical robot variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Numeric identity (e.g. a team or chassis number).
    pub id: u32,
    pub name: String,
    /// Mechanism instances in declared order.
    pub mechanism_instances: Vec<MechanismInstance>,
}

impl RobotConfig {
    /// The full robot name used in generated function names and the robot
    /// identifier enum, e.g. `Practicebot9999`.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.name, self.id)
    }

    pub fn instance(&self, name: &str) -> Option<&MechanismInstance> {
        self.mechanism_instances.iter().find(|mi| mi.name == name)
    }

    pub fn instance_mut(&mut self, name: &str) -> Option<&mut MechanismInstance> {
        self.mechanism_instances
            .iter_mut()
            .find(|mi| mi.name == name)
    }
}

/// A per-robot clone of a mechanism template.
///
/// The owned [`Mechanism`] is the unit the merge engine keeps synchronized
/// with the template; scalar overrides live here, structure belongs to the
/// template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismInstance {
    pub name: String,
    pub mechanism: Mechanism,
}

// ══════════════════════════════════════════════════════════════════════════════
// Mechanism
// ══════════════════════════════════════════════════════════════════════════════

/// A mechanism: named collection of states, motor controllers, control data
/// and auxiliary hardware.
///
/// Serves both as the canonical template (held by the registry) and as the
/// per-instance clone (held by a [`MechanismInstance`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mechanism {
    pub id: MechanismId,
    pub name: String,
    /// Finite states in declared order; ordinals are generated from position.
    pub states: Vec<State>,
    pub motor_controllers: Vec<MotorController>,
    pub control_data: Vec<MotorControlData>,
    pub solenoids: Vec<Solenoid>,
    pub servos: Vec<Servo>,
    pub digital_inputs: Vec<DigitalInput>,
}

impl Mechanism {
    pub fn new(id: MechanismId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            states: Vec::new(),
            motor_controllers: Vec::new(),
            control_data: Vec::new(),
            solenoids: Vec::new(),
            servos: Vec::new(),
            digital_inputs: Vec::new(),
        }
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name == name)
    }

    /// First controller with the given name, regardless of family.
    pub fn controller(&self, name: &str) -> Option<&MotorController> {
        self.motor_controllers.iter().find(|m| m.name == name)
    }

    /// All controllers sharing a base name (disambiguation input).
    pub fn controllers_named(&self, name: &str) -> Vec<&MotorController> {
        self.motor_controllers
            .iter()
            .filter(|m| m.name == name)
            .collect()
    }

    pub fn control_data(&self, name: &str) -> Option<&MotorControlData> {
        self.control_data.iter().find(|cd| cd.name == name)
    }

    /// Control types actually referenced by this mechanism's control data,
    /// deduplicated, declaration order.
    pub fn control_types_in_use(&self) -> Vec<ControlType> {
        let mut used = Vec::new();
        for cd in &self.control_data {
            if !used.contains(&cd.control_type) {
                used.push(cd.control_type);
            }
        }
        used
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// States & targets
// ══════════════════════════════════════════════════════════════════════════════

/// One state of a mechanism's finite-state behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    /// Names of states this state may transition to. An empty list means the
    /// state transitions to itself.
    pub transitions_to: Vec<String>,
    pub motor_targets: Vec<MotorTarget>,
    pub solenoid_targets: Vec<SolenoidTarget>,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions_to: Vec::new(),
            motor_targets: Vec::new(),
            solenoid_targets: Vec::new(),
        }
    }
}

/// A numeric value tagged with a physical unit.
///
/// The tag is resolved to a generated-code type name through the caller's
/// [`UnitCatalog`]; the core never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measured {
    pub value: f64,
    pub units: String,
}

impl Measured {
    pub fn new(value: f64, units: impl Into<String>) -> Self {
        Self {
            value,
            units: units.into(),
        }
    }
}

/// A motor command a state applies while active.
///
/// `control_data` and `controller` are name references resolved within the
/// owning mechanism; a dangling reference is a non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorTarget {
    pub enabled: bool,
    pub target: Measured,
    pub control_data: String,
    pub controller: String,
}

/// A solenoid command a state applies while active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolenoidTarget {
    pub enabled: bool,
    pub solenoid: String,
    pub extended: bool,
}

// ══════════════════════════════════════════════════════════════════════════════
// Motor controllers
// ══════════════════════════════════════════════════════════════════════════════

/// CAN bus a controller lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanBus {
    Rio,
    Canivore,
}

impl CanBus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanBus::Rio => "rio",
            CanBus::Canivore => "canivore",
        }
    }
}

/// Rotation sense that counts as positive output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvertedValue {
    CounterClockwisePositive,
    ClockwisePositive,
}

impl InvertedValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvertedValue::CounterClockwisePositive => "CounterClockwise_Positive",
            InvertedValue::ClockwisePositive => "Clockwise_Positive",
        }
    }
}

/// Behavior when no output is commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeutralMode {
    Coast,
    Brake,
}

impl NeutralMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeutralMode::Coast => "Coast",
            NeutralMode::Brake => "Brake",
        }
    }
}

/// A motor controller on a mechanism.
///
/// Family-independent configuration lives here; everything specific to a
/// concrete hardware family is carried by the [`ControllerFamily`] payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorController {
    pub name: String,
    pub enabled: bool,
    pub can_id: u32,
    pub can_bus: CanBus,
    pub pdp_id: u32,
    /// CAN id of the controller this one strictly follows, if any.
    pub follower: Option<u32>,
    pub voltage_ramping: VoltageRamping,
    pub family: ControllerFamily,
}

impl MotorController {
    /// Concrete family name, used for member-name disambiguation and
    /// merge tie-breaking.
    pub fn family_name(&self) -> &'static str {
        self.family.name()
    }
}

/// Concrete controller family with its family-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControllerFamily {
    /// Current-loop-capable CAN controller.
    TalonFx(PhoenixConfig),
    /// Current-loop-capable CAN controller, extended I/O variant.
    TalonFxs(PhoenixConfig),
    /// Legacy CAN controller.
    TalonSrx(LegacyConfig),
    /// Brushless controller.
    SparkMax(SparkConfig),
    /// Brushless controller, high-power variant.
    SparkFlex(SparkConfig),
}

impl ControllerFamily {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerFamily::TalonFx(_) => "TalonFX",
            ControllerFamily::TalonFxs(_) => "TalonFXS",
            ControllerFamily::TalonSrx(_) => "TalonSRX",
            ControllerFamily::SparkMax(cfg) => {
                if cfg.monitored.is_some() {
                    "SparkMaxMonitored"
                } else {
                    "SparkMax"
                }
            }
            ControllerFamily::SparkFlex(cfg) => {
                if cfg.monitored.is_some() {
                    "SparkFlexMonitored"
                } else {
                    "SparkFlex"
                }
            }
        }
    }

    /// The generated implementation type for this family.
    pub fn implementation_name(&self) -> &'static str {
        match self {
            ControllerFamily::TalonFx(_) => "ctre::phoenix6::hardware::TalonFX",
            ControllerFamily::TalonFxs(_) => "ctre::phoenix6::hardware::TalonFXS",
            ControllerFamily::TalonSrx(_) => "ctre::phoenix::motorcontrol::can::TalonSRX",
            ControllerFamily::SparkMax(cfg) => {
                if cfg.monitored.is_some() {
                    "DragonSparkMaxMonitored"
                } else {
                    "DragonSparkMax"
                }
            }
            ControllerFamily::SparkFlex(cfg) => {
                if cfg.monitored.is_some() {
                    "DragonSparkFlexMonitored"
                } else {
                    "DragonSparkFlex"
                }
            }
        }
    }

    /// Header the implementation type comes from.
    pub fn include_file(&self) -> &'static str {
        match self {
            ControllerFamily::TalonFx(_) => "ctre/phoenix6/TalonFX.hpp",
            ControllerFamily::TalonFxs(_) => "ctre/phoenix6/TalonFXS.hpp",
            ControllerFamily::TalonSrx(_) => "ctre/phoenix/motorcontrol/can/TalonSRX.h",
            ControllerFamily::SparkMax(cfg) => {
                if cfg.monitored.is_some() {
                    "hw/DragonSparkMaxMonitored.h"
                } else {
                    "hw/DragonSparkMax.h"
                }
            }
            ControllerFamily::SparkFlex(cfg) => {
                if cfg.monitored.is_some() {
                    "hw/DragonSparkFlexMonitored.h"
                } else {
                    "hw/DragonSparkFlex.h"
                }
            }
        }
    }
}

/// Configuration payload for the current-loop-capable families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixConfig {
    pub current_limits: CurrentLimits,
    pub motor_settings: MotorOutputSettings,
    /// Feedback-sensor sub-block; merged recursively with the same
    /// overridable/constant rules as top-level fields.
    pub remote_sensor: RemoteSensor,
}

/// Configuration payload for the legacy family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyConfig {
    pub current_limits: LegacyCurrentLimits,
    pub motor_settings: MotorOutputSettings,
    pub voltage_compensation_saturation: f64,
}

/// Configuration payload for the brushless families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkConfig {
    pub primary_current_limit: u32,
    pub secondary_current_limit: u32,
    pub secondary_limit_cycles: u32,
    pub motor_settings: MotorOutputSettings,
    /// Present on the "monitored" sub-variants only.
    pub monitored: Option<CurrentMonitor>,
}

/// Current filtering on monitored brushless controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMonitor {
    pub filter_length: u32,
}

/// Stator/supply current limit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentLimits {
    pub enable_stator_limit: bool,
    /// Amps.
    pub stator_limit: f64,
    pub enable_supply_limit: bool,
    /// Amps.
    pub supply_limit: f64,
    /// Amps.
    pub supply_lower_limit: f64,
    /// Seconds.
    pub supply_lower_time: f64,
}

impl Default for CurrentLimits {
    fn default() -> Self {
        Self {
            enable_stator_limit: false,
            stator_limit: 0.0,
            enable_supply_limit: false,
            supply_limit: 0.0,
            supply_lower_limit: 0.0,
            supply_lower_time: 0.0,
        }
    }
}

/// Current limit configuration for the legacy family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyCurrentLimits {
    pub enabled: bool,
    pub current_limit: u32,
    pub trigger_threshold_current: u32,
    pub trigger_threshold_time: u32,
}

impl Default for LegacyCurrentLimits {
    fn default() -> Self {
        Self {
            enabled: false,
            current_limit: 0,
            trigger_threshold_current: 0,
            trigger_threshold_time: 0,
        }
    }
}

/// Open/closed-loop voltage ramp configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageRamping {
    /// Seconds from neutral to full output in open loop.
    pub open_loop_ramp_time: f64,
    /// Seconds from neutral to full output in closed loop.
    pub closed_loop_ramp_time: f64,
    pub enable_closed_loop: bool,
}

impl Default for VoltageRamping {
    fn default() -> Self {
        Self {
            open_loop_ramp_time: 0.0,
            closed_loop_ramp_time: 0.0,
            enable_closed_loop: false,
        }
    }
}

/// Output shaping shared by every family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorOutputSettings {
    pub inverted: InvertedValue,
    pub mode: NeutralMode,
    /// Percent, 0..=100.
    pub deadband_percent: f64,
    pub peak_forward_duty_cycle: f64,
    pub peak_reverse_duty_cycle: f64,
}

impl Default for MotorOutputSettings {
    fn default() -> Self {
        Self {
            inverted: InvertedValue::CounterClockwisePositive,
            mode: NeutralMode::Coast,
            deadband_percent: 0.0,
            peak_forward_duty_cycle: 1.0,
            peak_reverse_duty_cycle: -1.0,
        }
    }
}

/// Source of a remotely-attached feedback sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteSensorSource {
    Off,
    Cancoder,
    PigeonYaw,
    PigeonPitch,
    PigeonRoll,
}

impl RemoteSensorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteSensorSource::Off => "Off",
            RemoteSensorSource::Cancoder => "CANCoder",
            RemoteSensorSource::PigeonYaw => "Pigeon_Yaw",
            RemoteSensorSource::PigeonPitch => "Pigeon_Pitch",
            RemoteSensorSource::PigeonRoll => "Pigeon_Roll",
        }
    }
}

/// Remote feedback sensor sub-block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSensor {
    pub source: RemoteSensorSource,
    pub can_id: u32,
    pub sensor_to_mechanism_ratio: f64,
}

impl Default for RemoteSensor {
    fn default() -> Self {
        Self {
            source: RemoteSensorSource::Off,
            can_id: 0,
            sensor_to_mechanism_ratio: 1.0,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Motor control data
// ══════════════════════════════════════════════════════════════════════════════

/// Closed- or open-loop control mode for a [`MotorControlData`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlType {
    PercentOutput,
    VoltageOutput,
    PositionDegrees,
    PositionInch,
    VelocityDegreesPerSec,
    VelocityFeetPerSec,
    VelocityRevPerSec,
}

impl ControlType {
    /// Every control type, in a fixed order (used to enumerate the
    /// per-control-type template regions).
    pub const ALL: [ControlType; 7] = [
        ControlType::PercentOutput,
        ControlType::VoltageOutput,
        ControlType::PositionDegrees,
        ControlType::PositionInch,
        ControlType::VelocityDegreesPerSec,
        ControlType::VelocityFeetPerSec,
        ControlType::VelocityRevPerSec,
    ];

    /// Upper-underscore token used in template region flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlType::PercentOutput => "PERCENT_OUTPUT",
            ControlType::VoltageOutput => "VOLTAGE_OUTPUT",
            ControlType::PositionDegrees => "POSITION_DEGREES",
            ControlType::PositionInch => "POSITION_INCH",
            ControlType::VelocityDegreesPerSec => "VELOCITY_DEGREES_PER_SEC",
            ControlType::VelocityFeetPerSec => "VELOCITY_FEET_PER_SEC",
            ControlType::VelocityRevPerSec => "VELOCITY_REV_PER_SEC",
        }
    }

    /// Generated unit wrapper type for the target argument, or `None` for
    /// raw (unitless) control.
    pub fn target_units_type(&self) -> Option<&'static str> {
        match self {
            ControlType::PercentOutput => None,
            ControlType::VoltageOutput => Some("units::voltage::volt_t"),
            ControlType::PositionDegrees => Some("units::angle::degree_t"),
            ControlType::PositionInch => Some("units::length::inch_t"),
            ControlType::VelocityDegreesPerSec => {
                Some("units::angular_velocity::degrees_per_second_t")
            }
            ControlType::VelocityFeetPerSec => Some("units::velocity::feet_per_second_t"),
            ControlType::VelocityRevPerSec => {
                Some("units::angular_velocity::turns_per_second_t")
            }
        }
    }

    /// True for modes whose gains are applied to an onboard control loop.
    pub fn is_closed_loop(&self) -> bool {
        !matches!(
            self,
            ControlType::PercentOutput | ControlType::VoltageOutput
        )
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gain set for closed-loop control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub f: f64,
    pub izone: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            p: 0.0,
            i: 0.0,
            d: 0.0,
            f: 0.0,
            izone: 0.0,
        }
    }
}

/// Named control mode + gain set referenced by motor targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorControlData {
    pub name: String,
    pub control_type: ControlType,
    pub gains: PidGains,
    pub enable_foc: bool,
}

// ══════════════════════════════════════════════════════════════════════════════
// Auxiliary hardware
// ══════════════════════════════════════════════════════════════════════════════

/// A single-acting solenoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solenoid {
    pub name: String,
    pub enabled: bool,
    pub channel: u32,
    pub reversed: bool,
}

/// A PWM servo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Servo {
    pub name: String,
    pub enabled: bool,
    pub channel: u32,
}

/// A digital input channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalInput {
    pub name: String,
    pub channel: u32,
    pub reversed: bool,
    /// Seconds.
    pub debounce_time: f64,
}

// ══════════════════════════════════════════════════════════════════════════════
// Unit catalog
// ══════════════════════════════════════════════════════════════════════════════

/// Caller-supplied physical-unit table: unit tag → generated type name.
///
/// Unit *semantics* live outside the core; the emission engine only needs
/// the wrapper type name for a tag. Missing tags are reported through the
/// diagnostic channel and the wrapper is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCatalog {
    pub entries: Vec<UnitSpec>,
}

/// One unit tag mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub tag: String,
    pub type_name: String,
}

impl UnitCatalog {
    /// A catalog covering the tags the default templates use.
    pub fn default_catalog() -> Self {
        let entry = |tag: &str, ty: &str| UnitSpec {
            tag: tag.to_string(),
            type_name: ty.to_string(),
        };
        Self {
            entries: vec![
                entry("deg", "units::angle::degree_t"),
                entry("in", "units::length::inch_t"),
                entry("ft/s", "units::velocity::feet_per_second_t"),
                entry("deg/s", "units::angular_velocity::degrees_per_second_t"),
                entry("rev/s", "units::angular_velocity::turns_per_second_t"),
                entry("V", "units::voltage::volt_t"),
                entry("A", "units::current::ampere_t"),
                entry("s", "units::time::second_t"),
                entry("%", ""),
            ],
        }
    }

    pub fn type_name(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.tag == tag)
            .map(|e| e.type_name.as_str())
            .filter(|t| !t.is_empty())
    }
}
