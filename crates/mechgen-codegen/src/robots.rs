//! Per-robot branch synthesis for mechanism-level functions.
//!
//! A mechanism instance shared across robot variants needs per-robot
//! creation/initialization exactly when the variants configure it
//! differently:
//!
//! - one participating robot → one unconditional function;
//! - several robots, identical configuration → still one unconditional
//!   function;
//! - several robots, any difference → one function per robot plus a
//!   dispatcher keyed on the active robot identifier, chained in
//!   robot-declaration order.

use mechgen_naming::{controller_accessor, controller_member, controller_usage, member_variable};
use mechgen_types::model::{
    ControllerFamily, Mechanism, MechanismInstance, MotorController, RobotConfig,
};

use crate::context::{robot_identifier_token, Emitter};

/// Rendered function definitions plus the matching declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedFunctions {
    pub definitions: String,
    pub declarations: String,
}

/// `Create…` functions: element construction per robot variant. The whole
/// mechanism is constructed in one function, so synthesis is per-mechanism:
/// uniform construction collapses to a single `Create()`.
pub fn create_functions(emitter: &Emitter<'_>, instance_name: &str) -> SynthesizedFunctions {
    synthesize(emitter, instance_name, "Create", creation_statements)
}

/// `Initialize…` functions, synthesized per named component.
///
/// Each controller gets its own initialization entry point:
/// - enabled on exactly one robot (or identically configured everywhere) →
///   one unconditional `Initialize<Controller>()`;
/// - enabled on several robots with differing configuration → one
///   `Initialize<Controller><Robot>()` per robot plus a dispatcher chained
///   in robot-declaration order.
///
/// A top-level `Initialize()` runs every controller's entry point.
pub fn initialization_functions(
    emitter: &Emitter<'_>,
    instance_name: &str,
) -> SynthesizedFunctions {
    let robots = emitter.participating_robots(instance_name);
    let Some(representative) = robots.first().and_then(|r| r.instance(instance_name)) else {
        return SynthesizedFunctions {
            definitions: String::new(),
            declarations: String::new(),
        };
    };

    let mut definitions = Vec::new();
    let mut declarations = vec!["void Initialize();".to_string()];
    let mut top_calls = Vec::new();

    for controller in &representative.mechanism.motor_controllers {
        let accessor = controller_accessor(controller, &representative.mechanism.motor_controllers);

        // Robots on which this controller is enabled, declared order.
        let bodies: Vec<(&RobotConfig, Vec<String>)> = robots
            .iter()
            .filter_map(|r| {
                let mi = r.instance(instance_name)?;
                let enabled = mi.mechanism.motor_controllers.iter().find(|m| {
                    m.name == controller.name
                        && m.family_name() == controller.family_name()
                        && m.enabled
                })?;
                Some((*r, controller_initialization(enabled, &mi.mechanism)))
            })
            .collect();

        let Some((_, first_body)) = bodies.first() else {
            continue;
        };

        let uniform = bodies.iter().all(|(_, b)| b == first_body);
        if uniform {
            definitions.push(function_definition(
                instance_name,
                &format!("Initialize{accessor}"),
                "",
                first_body,
            ));
            declarations.push(format!("void Initialize{accessor}();"));
        } else {
            for (robot, body) in &bodies {
                let tag = robot.full_name();
                definitions.push(function_definition(
                    instance_name,
                    &format!("Initialize{accessor}"),
                    &tag,
                    body,
                ));
                declarations.push(format!("void Initialize{accessor}{tag}();"));
            }
            definitions.push(dispatcher_definition(
                instance_name,
                &format!("Initialize{accessor}"),
                &bodies,
            ));
            declarations.push(format!("void Initialize{accessor}();"));
        }
        top_calls.push(format!("Initialize{accessor}();"));
    }

    definitions.push(function_definition(
        instance_name,
        "Initialize",
        "",
        &top_calls,
    ));

    SynthesizedFunctions {
        definitions: definitions.join("\n"),
        declarations: declarations.join("\n    "),
    }
}

/// Family-specific configuration statements for one enabled controller.
fn controller_initialization(controller: &MotorController, mech: &Mechanism) -> Vec<String> {
    match &controller.family {
        ControllerFamily::TalonFx(cfg) | ControllerFamily::TalonFxs(cfg) => {
            phoenix_initialization(controller, cfg, mech)
        }
        ControllerFamily::TalonSrx(cfg) => legacy_initialization(controller, cfg, mech),
        ControllerFamily::SparkMax(cfg) | ControllerFamily::SparkFlex(cfg) => {
            spark_initialization(controller, cfg, mech)
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Synthesis core
// ══════════════════════════════════════════════════════════════════════════════

fn synthesize(
    emitter: &Emitter<'_>,
    instance_name: &str,
    verb: &str,
    statements_for: fn(&MechanismInstance) -> Vec<String>,
) -> SynthesizedFunctions {
    let robots = emitter.participating_robots(instance_name);
    let bodies: Vec<(&RobotConfig, Vec<String>)> = robots
        .iter()
        .filter_map(|r| r.instance(instance_name).map(|mi| (*r, statements_for(mi))))
        .collect();

    let Some((_, first_body)) = bodies.first() else {
        return SynthesizedFunctions {
            definitions: String::new(),
            declarations: String::new(),
        };
    };

    let uniform = bodies.iter().all(|(_, b)| b == first_body);
    if uniform {
        return SynthesizedFunctions {
            definitions: function_definition(instance_name, verb, "", first_body),
            declarations: format!("void {verb}();"),
        };
    }

    let mut definitions = Vec::new();
    let mut declarations = vec![format!("void {verb}();")];
    for (robot, body) in &bodies {
        let tag = robot.full_name();
        definitions.push(function_definition(instance_name, verb, &tag, body));
        declarations.push(format!("void {verb}{tag}();"));
    }
    definitions.push(dispatcher_definition(instance_name, verb, &bodies));

    SynthesizedFunctions {
        definitions: definitions.join("\n"),
        declarations: declarations.join("\n    "),
    }
}

fn function_definition(
    instance_name: &str,
    verb: &str,
    tag: &str,
    statements: &[String],
) -> String {
    let body = statements
        .iter()
        .map(|s| format!("    {s}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("void {instance_name}::{verb}{tag}()\n{{\n{body}\n}}\n")
}

/// The dispatcher chain, in robot-declaration order.
fn dispatcher_definition(
    instance_name: &str,
    verb: &str,
    bodies: &[(&RobotConfig, Vec<String>)],
) -> String {
    let mut out = format!("void {instance_name}::{verb}()\n{{\n");
    for (i, (robot, _)) in bodies.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "    else if" };
        out.push_str(&format!(
            "    {keyword} (m_activeRobotId == RobotConfigMgr::RobotIdentifier::{})\n",
            robot_identifier_token(robot)
        ));
        out.push_str(&format!(
            "    {{\n        {verb}{}();\n    }}\n",
            robot.full_name()
        ));
    }
    out.push_str("}\n");
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Creation statements
// ══════════════════════════════════════════════════════════════════════════════

fn creation_statements(mi: &MechanismInstance) -> Vec<String> {
    let mech = &mi.mechanism;
    let mut statements = vec![format!("m_ntName = \"{}\";", mi.name)];

    for controller in mech.motor_controllers.iter().filter(|m| m.enabled) {
        statements.push(controller_creation(mi, controller, mech));
    }
    for sol in mech.solenoids.iter().filter(|s| s.enabled) {
        statements.push(format!(
            "{} = new DragonSolenoid(\"{}\", {}, {});",
            member_variable(&sol.name),
            sol.name,
            sol.channel,
            sol.reversed
        ));
    }
    for servo in mech.servos.iter().filter(|s| s.enabled) {
        statements.push(format!(
            "{} = new DragonServo(\"{}\", {});",
            member_variable(&servo.name),
            servo.name,
            servo.channel
        ));
    }
    for di in &mech.digital_inputs {
        statements.push(format!(
            "{} = new DragonDigitalInput(\"{}\", {}, {}, units::time::second_t({}));",
            member_variable(&di.name),
            di.name,
            di.channel,
            di.reversed,
            di.debounce_time
        ));
    }

    statements.push("m_table = nt::NetworkTableInstance::GetDefault().GetTable(m_ntName);".to_string());
    statements
}

fn controller_creation(
    mi: &MechanismInstance,
    controller: &MotorController,
    mech: &Mechanism,
) -> String {
    let member = controller_member(controller, &mech.motor_controllers);
    let implementation = controller.family.implementation_name();
    match &controller.family {
        ControllerFamily::TalonFx(_) | ControllerFamily::TalonFxs(_) => format!(
            "{member} = new {implementation}({}, \"{}\");",
            controller.can_id,
            controller.can_bus.as_str()
        ),
        ControllerFamily::TalonSrx(_) => {
            format!("{member} = new {implementation}({});", controller.can_id)
        }
        ControllerFamily::SparkMax(_) | ControllerFamily::SparkFlex(_) => format!(
            "{member} = new {implementation}({}, RobotElementNames::MOTOR_CONTROLLER_USAGE::{});",
            controller.can_id,
            controller_usage(&mi.name, controller, &mech.motor_controllers)
        ),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Initialization statements
// ══════════════════════════════════════════════════════════════════════════════

fn phoenix_initialization(
    controller: &MotorController,
    cfg: &mechgen_types::model::PhoenixConfig,
    mech: &Mechanism,
) -> Vec<String> {
    let member = controller_member(controller, &mech.motor_controllers);
    let family = controller.family_name();
    let settings = &cfg.motor_settings;
    let limits = &cfg.current_limits;

    let mut out = vec![
        "{".to_string(),
        format!("    {family}Configuration configs{{}};"),
        format!(
            "    configs.CurrentLimits.StatorCurrentLimit = units::current::ampere_t({});",
            limits.stator_limit
        ),
        format!(
            "    configs.CurrentLimits.StatorCurrentLimitEnable = {};",
            limits.enable_stator_limit
        ),
        format!(
            "    configs.CurrentLimits.SupplyCurrentLimit = units::current::ampere_t({});",
            limits.supply_limit
        ),
        format!(
            "    configs.CurrentLimits.SupplyCurrentLimitEnable = {};",
            limits.enable_supply_limit
        ),
        format!(
            "    configs.CurrentLimits.SupplyCurrentLowerLimit = units::current::ampere_t({});",
            limits.supply_lower_limit
        ),
        format!(
            "    configs.CurrentLimits.SupplyCurrentLowerTime = units::time::second_t({});",
            limits.supply_lower_time
        ),
        format!(
            "    configs.MotorOutput.Inverted = InvertedValue::{};",
            settings.inverted.as_str()
        ),
        format!(
            "    configs.MotorOutput.NeutralMode = NeutralModeValue::{};",
            settings.mode.as_str()
        ),
        format!(
            "    configs.MotorOutput.PeakForwardDutyCycle = {};",
            settings.peak_forward_duty_cycle
        ),
        format!(
            "    configs.MotorOutput.PeakReverseDutyCycle = {};",
            settings.peak_reverse_duty_cycle
        ),
        format!(
            "    configs.MotorOutput.DutyCycleNeutralDeadband = {};",
            settings.deadband_percent / 100.0
        ),
    ];

    if controller.voltage_ramping.enable_closed_loop {
        out.push(format!(
            "    configs.ClosedLoopRamps.VoltageClosedLoopRampPeriod = units::time::second_t({});",
            controller.voltage_ramping.closed_loop_ramp_time
        ));
    } else {
        out.push(format!(
            "    configs.OpenLoopRamps.VoltageOpenLoopRampPeriod = units::time::second_t({});",
            controller.voltage_ramping.open_loop_ramp_time
        ));
    }

    if cfg.remote_sensor.source != mechgen_types::model::RemoteSensorSource::Off {
        out.push(format!(
            "    configs.Feedback.FeedbackRemoteSensorID = {};",
            cfg.remote_sensor.can_id
        ));
        out.push(
            "    configs.Feedback.FeedbackSensorSource = FeedbackSensorSourceValue::RemoteCANcoder;"
                .to_string(),
        );
        out.push(format!(
            "    configs.Feedback.SensorToMechanismRatio = {};",
            cfg.remote_sensor.sensor_to_mechanism_ratio
        ));
    }

    out.push(format!("    {member}->GetConfigurator().Apply(configs);"));

    if let Some(follow_id) = controller.follower {
        out.push(format!(
            "    {member}->SetControl(ctre::phoenix6::controls::StrictFollower{{{follow_id}}});"
        ));
    }
    out.push("}".to_string());
    out
}

fn legacy_initialization(
    controller: &MotorController,
    cfg: &mechgen_types::model::LegacyConfig,
    mech: &Mechanism,
) -> Vec<String> {
    let member = controller_member(controller, &mech.motor_controllers);
    let settings = &cfg.motor_settings;

    let mut out = vec![
        format!(
            "{member}->SetInverted({});",
            settings.inverted == mechgen_types::model::InvertedValue::ClockwisePositive
        ),
        format!("{member}->EnableVoltageCompensation(true);"),
        format!(
            "{member}->ConfigVoltageCompSaturation({}, 0);",
            cfg.voltage_compensation_saturation
        ),
        format!(
            "{member}->SetNeutralMode(ctre::phoenix::motorcontrol::NeutralMode::{});",
            settings.mode.as_str()
        ),
        format!(
            "{member}->ConfigOpenloopRamp({});",
            controller.voltage_ramping.open_loop_ramp_time
        ),
    ];

    if cfg.current_limits.enabled {
        out.push(format!(
            "{{\n        ctre::phoenix::motorcontrol::SupplyCurrentLimitConfiguration climit;\n        \
             climit.enable = true;\n        climit.currentLimit = {};\n        \
             climit.triggerThresholdCurrent = {};\n        climit.triggerThresholdTime = {};\n        \
             {member}->ConfigSupplyCurrentLimit(climit, 0);\n    }}",
            cfg.current_limits.current_limit,
            cfg.current_limits.trigger_threshold_current,
            cfg.current_limits.trigger_threshold_time
        ));
    }
    out
}

fn spark_initialization(
    controller: &MotorController,
    cfg: &mechgen_types::model::SparkConfig,
    mech: &Mechanism,
) -> Vec<String> {
    let member = controller_member(controller, &mech.motor_controllers);
    let settings = &cfg.motor_settings;

    let mut out = vec![
        format!(
            "{member}->Invert({});",
            settings.inverted == mechgen_types::model::InvertedValue::ClockwisePositive
        ),
        format!(
            "{member}->EnableBrakeMode({});",
            settings.mode == mechgen_types::model::NeutralMode::Brake
        ),
        format!(
            "{member}->SetSmartCurrentLimiting({});",
            cfg.primary_current_limit
        ),
        format!(
            "{member}->SetSecondaryCurrentLimiting({}, {});",
            cfg.secondary_current_limit, cfg.secondary_limit_cycles
        ),
        format!(
            "{member}->SetVoltageRamping({}, {});",
            controller.voltage_ramping.open_loop_ramp_time,
            if controller.voltage_ramping.enable_closed_loop {
                controller.voltage_ramping.closed_loop_ramp_time
            } else {
                0.0
            }
        ),
    ];

    if let Some(monitor) = &cfg.monitored {
        out.push(format!(
            "{member}->ConfigureCurrentFiltering({});",
            monitor.filter_length
        ));
    }
    if let Some(follow_id) = controller.follower {
        out.push(format!("{member}->SetAsFollowerMotor({follow_id});"));
    }
    out
}
