//! Integration tests for the code emission engine.
//!
//! Covers the per-robot sharing rule (dispatcher synthesis), the implicit
//! self-transition, controller-name disambiguation in emitted text, region
//! stripping driven by the model, reference-error tolerance, and
//! deterministic output.

use mechgen_codegen::{Emitter, TemplateSet};
use mechgen_template::Strictness;
use mechgen_types::model::*;
use mechgen_types::ProgressLog;

// ══════════════════════════════════════════════════════════════════════════════
// Model helpers
// ══════════════════════════════════════════════════════════════════════════════

fn talon_fx(name: &str, can_id: u32) -> MotorController {
    MotorController {
        name: name.to_string(),
        enabled: true,
        can_id,
        can_bus: CanBus::Rio,
        pdp_id: 0,
        follower: None,
        voltage_ramping: VoltageRamping::default(),
        family: ControllerFamily::TalonFx(PhoenixConfig {
            current_limits: CurrentLimits::default(),
            motor_settings: MotorOutputSettings::default(),
            remote_sensor: RemoteSensor::default(),
        }),
    }
}

fn spark_max(name: &str, can_id: u32) -> MotorController {
    MotorController {
        name: name.to_string(),
        enabled: true,
        can_id,
        can_bus: CanBus::Rio,
        pdp_id: 0,
        follower: None,
        voltage_ramping: VoltageRamping::default(),
        family: ControllerFamily::SparkMax(SparkConfig {
            primary_current_limit: 50,
            secondary_current_limit: 50,
            secondary_limit_cycles: 0,
            motor_settings: MotorOutputSettings::default(),
            monitored: None,
        }),
    }
}

fn control_data(name: &str, control_type: ControlType) -> MotorControlData {
    MotorControlData {
        name: name.to_string(),
        control_type,
        gains: PidGains::default(),
        enable_foc: false,
    }
}

fn base_mechanism() -> Mechanism {
    let mut mech = Mechanism::new(MechanismId(1), "noteManager");
    mech.motor_controllers.push(talon_fx("winch", 10));
    mech.control_data
        .push(control_data("anglePid", ControlType::PositionDegrees));
    mech.control_data
        .push(control_data("raw", ControlType::PercentOutput));

    let mut off = State::new("Off");
    off.motor_targets.push(MotorTarget {
        enabled: true,
        target: Measured::new(0.0, "%"),
        control_data: "raw".to_string(),
        controller: "winch".to_string(),
    });
    mech.states.push(off);

    let mut hold = State::new("Hold");
    hold.transitions_to.push("Off".to_string());
    hold.motor_targets.push(MotorTarget {
        enabled: true,
        target: Measured::new(42.5, "deg"),
        control_data: "anglePid".to_string(),
        controller: "winch".to_string(),
    });
    mech.states.push(hold);
    mech
}

fn robot(id: u32, name: &str, mech: Mechanism) -> RobotConfig {
    RobotConfig {
        id,
        name: name.to_string(),
        mechanism_instances: vec![MechanismInstance {
            name: "noteManager".to_string(),
            mechanism: mech,
        }],
    }
}

fn two_robot_set(mech_a: Mechanism, mech_b: Mechanism) -> RobotVariantSet {
    let mut set = RobotVariantSet::new();
    set.robots.push(robot(302, "CompBot", mech_a));
    set.robots.push(robot(9999, "PracticeBot", mech_b));
    set
}

struct Fixture {
    set: RobotVariantSet,
    templates: TemplateSet,
    units: UnitCatalog,
}

impl Fixture {
    fn new(set: RobotVariantSet) -> Self {
        Self {
            set,
            templates: TemplateSet::default_set().unwrap(),
            units: UnitCatalog::default_catalog(),
        }
    }

    fn emit(&self) -> (Vec<mechgen_codegen::GeneratedFile>, Vec<String>) {
        let emitter = Emitter::new(
            &self.set,
            &self.templates,
            &self.units,
            Strictness::Lenient,
            "1.0.0-test",
        );
        let mut log = ProgressLog::new();
        let files = emitter.emit_instance("noteManager", &mut log).unwrap();
        (files, log.into_entries())
    }

    fn file_containing<'a>(
        &self,
        files: &'a [mechgen_codegen::GeneratedFile],
        suffix: &str,
    ) -> &'a mechgen_codegen::GeneratedFile {
        files
            .iter()
            .find(|f| f.relative_path.to_string_lossy().ends_with(suffix))
            .unwrap_or_else(|| panic!("no file ending in {suffix}"))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Sharing rule
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn differing_config_emits_two_init_functions_and_dispatcher() {
    let mut mech_b = base_mechanism();
    mech_b.motor_controllers[0].can_id = 20; // differs from CompBot's 10
    if let ControllerFamily::TalonFx(cfg) = &mut mech_b.motor_controllers[0].family {
        cfg.current_limits.stator_limit = 60.0;
    }
    let fixture = Fixture::new(two_robot_set(base_mechanism(), mech_b));
    let (files, _) = fixture.emit();
    let body = &fixture.file_containing(&files, "generated/noteManager.cpp").content;

    assert!(body.contains("void noteManager::InitializeWinchCompBot302()"));
    assert!(body.contains("void noteManager::InitializeWinchPracticeBot9999()"));
    // Dispatcher keyed on the active robot identifier, declaration order.
    assert!(body.contains("void noteManager::InitializeWinch()"));
    let comp = body.find("RobotConfigMgr::RobotIdentifier::COMP_BOT302").unwrap();
    let practice = body
        .find("RobotConfigMgr::RobotIdentifier::PRACTICE_BOT9999")
        .unwrap();
    assert!(comp < practice, "dispatch chain must follow declaration order");
}

#[test]
fn identical_config_collapses_to_one_unconditional_function() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();
    let body = &fixture.file_containing(&files, "generated/noteManager.cpp").content;

    assert!(body.contains("void noteManager::InitializeWinch()"));
    assert!(!body.contains("InitializeWinchCompBot302"));
    assert!(!body.contains("RobotConfigMgr::RobotIdentifier::COMP_BOT302"));
}

#[test]
fn controller_enabled_on_one_robot_is_unconditional() {
    let mut mech_b = base_mechanism();
    mech_b.motor_controllers[0].enabled = false;
    let fixture = Fixture::new(two_robot_set(base_mechanism(), mech_b));
    let (files, _) = fixture.emit();
    let body = &fixture.file_containing(&files, "generated/noteManager.cpp").content;

    // One init body, no per-robot variants: the controller's only enabled
    // configuration is emitted unconditionally.
    assert!(body.contains("void noteManager::InitializeWinch()"));
    assert!(!body.contains("InitializeWinchCompBot302"));
    assert!(!body.contains("InitializeWinchPracticeBot9999"));
    assert_eq!(body.matches("void noteManager::InitializeWinch()").count(), 1);
}

// ══════════════════════════════════════════════════════════════════════════════
// States
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn empty_transition_list_registers_self_transition() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();
    let body = &fixture.file_containing(&files, "generated/noteManager.cpp").content;

    // "Off" has no transitions: it must point at itself.
    assert!(body.contains("offStateInst->RegisterTransitionState(offStateInst)"));
    // "Hold" names Off explicitly.
    assert!(body.contains("holdStateInst->RegisterTransitionState(offStateInst)"));
}

#[test]
fn state_enum_and_map_follow_declaration_order() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();
    let header = &fixture.file_containing(&files, "generated/noteManager.h").content;

    assert!(header.contains("STATE_OFF, STATE_HOLD"));
}

#[test]
fn decorator_files_are_write_once_per_state() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();

    let decorators: Vec<_> = files.iter().filter(|f| f.write_once).collect();
    // Two states × header/body.
    assert_eq!(decorators.len(), 4);
    for file in &decorators {
        let path = file.relative_path.to_string_lossy().to_string();
        assert!(path.contains("decoratormods"), "decorator path: {path}");
    }
    let generated: Vec<_> = files.iter().filter(|f| !f.write_once).collect();
    assert_eq!(generated.len(), 2);
}

#[test]
fn state_decorator_carries_target_statements_in_comment_seed() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();
    let body = &fixture.file_containing(&files, "decoratormods/HoldState.cpp").content;

    assert!(body.contains("void HoldState::InitTargets()"));
    assert!(body.contains(
        "SetTargetControl(RobotElementNames::MOTOR_CONTROLLER_USAGE::NOTE_MANAGER_WINCH"
    ));
    assert!(body.contains("units::angle::degree_t(units::angle::degree_t(42.5))"));
}

#[test]
fn differing_targets_dispatch_per_robot_in_decorator() {
    let mut mech_b = base_mechanism();
    mech_b.states[1].motor_targets[0].target.value = 10.0;
    let fixture = Fixture::new(two_robot_set(base_mechanism(), mech_b));
    let (files, _) = fixture.emit();
    let body = &fixture.file_containing(&files, "decoratormods/HoldState.cpp").content;

    assert!(body.contains("void HoldState::InitCompBot302()"));
    assert!(body.contains("void HoldState::InitPracticeBot9999()"));
    assert!(body.contains("m_mechanism->GetActiveRobotId()"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Disambiguation in emitted text
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn same_named_controllers_emit_distinct_members() {
    let mut mech = base_mechanism();
    // Second family under the same name, disabled in this variant; the
    // member names must still disambiguate off the full controller list.
    let mut second = spark_max("winch", 11);
    second.enabled = false;
    mech.motor_controllers.push(second);
    let fixture = Fixture::new(two_robot_set(mech.clone(), mech));
    let (files, _) = fixture.emit();
    let header = &fixture.file_containing(&files, "generated/noteManager.h").content;

    assert!(header.contains("m_winchTalonFX"));
    assert!(header.contains("m_winchSparkMax"));
    assert!(!header.contains("*m_winch;"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Region behavior driven by the model
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn solenoid_free_mechanism_loses_solenoid_section() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();
    let header = &fixture.file_containing(&files, "generated/noteManager.h").content;

    assert!(!header.contains("SOLENOID_USAGE"));
    assert!(!header.contains("_MECHANISM_HAS_SOLENOIDS_START_"));
}

#[test]
fn solenoid_mechanism_keeps_solenoid_section() {
    let mut mech = base_mechanism();
    mech.solenoids.push(Solenoid {
        name: "clamp".to_string(),
        enabled: true,
        channel: 3,
        reversed: false,
    });
    let fixture = Fixture::new(two_robot_set(mech.clone(), mech));
    let (files, _) = fixture.emit();
    let header = &fixture.file_containing(&files, "generated/noteManager.h").content;

    assert!(header.contains("SOLENOID_USAGE"));
    assert!(!header.contains("_MECHANISM_HAS_SOLENOIDS_START_"));
}

#[test]
fn only_used_control_type_regions_survive() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();
    let header = &fixture.file_containing(&files, "generated/noteManager.h").content;

    // PositionDegrees and PercentOutput are in use; VoltageOutput is not,
    // so its UPDATE_TARGET region is stripped.
    assert!(header.contains("UpdateTargetWinchAnglePid"));
    assert!(header.contains("UpdateTargetWinchRaw"));
    assert!(header.contains("double percentOutput"));
    assert!(header.contains("units::angle::degree_t angle"));
    assert!(!header.contains("units::voltage::volt_t voltage"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Reference errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn dangling_control_data_reference_logs_and_omits() {
    let mut mech = base_mechanism();
    mech.states[1].motor_targets[0].control_data = "missingPid".to_string();
    let fixture = Fixture::new(two_robot_set(mech.clone(), mech));
    let (files, log) = fixture.emit();
    let body = &fixture.file_containing(&files, "decoratormods/HoldState.cpp").content;

    assert!(!body.contains("missingPid"));
    assert!(log
        .iter()
        .any(|entry| entry.contains("cannot find a motor control data called missingPid")));
}

#[test]
fn dangling_controller_reference_logs_and_omits() {
    let mut mech = base_mechanism();
    mech.states[1].motor_targets[0].controller = "ghost".to_string();
    let fixture = Fixture::new(two_robot_set(mech.clone(), mech));
    let (_, log) = fixture.emit();

    assert!(log
        .iter()
        .any(|entry| entry.contains("cannot find a motor controller called ghost")));
}

// ══════════════════════════════════════════════════════════════════════════════
// Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn emission_is_byte_deterministic() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (first, _) = fixture.emit();
    for _ in 0..10 {
        let (again, _) = fixture.emit();
        assert_eq!(first, again);
    }
}

#[test]
fn gen_notice_distinguishes_decorators() {
    let fixture = Fixture::new(two_robot_set(base_mechanism(), base_mechanism()));
    let (files, _) = fixture.emit();

    let generated = fixture.file_containing(&files, "generated/noteManager.cpp");
    assert!(generated.content.contains("Do not edit"));

    let decorator = fixture.file_containing(&files, "decoratormods/OffState.h");
    assert!(decorator.content.contains("yours to edit"));
}
