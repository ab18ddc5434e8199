//! Integration tests for the merge engine.
//!
//! Covers the contract-level merge properties: override preservation, constant
//! field reset, shape sync (add/remove/rename), family-change data loss,
//! nested config block recursion, and whole-set synchronization.

use mechgen_merge::{merge, merge_with_report, sync_instances, MergeEventKind};
use mechgen_types::model::*;
use mechgen_types::{GenError, ProgressLog};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn phoenix_config() -> PhoenixConfig {
    PhoenixConfig {
        current_limits: CurrentLimits::default(),
        motor_settings: MotorOutputSettings::default(),
        remote_sensor: RemoteSensor::default(),
    }
}

fn talon_fx(name: &str, can_id: u32) -> MotorController {
    MotorController {
        name: name.to_string(),
        enabled: true,
        can_id,
        can_bus: CanBus::Rio,
        pdp_id: 0,
        follower: None,
        voltage_ramping: VoltageRamping::default(),
        family: ControllerFamily::TalonFx(phoenix_config()),
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

fn template() -> Mechanism {
    let mut mech = Mechanism::new(MechanismId(1), "noteManager");
    mech.motor_controllers.push(talon_fx("feed", 10));
    mech.control_data
        .push(control_data("anglePid", ControlType::PositionDegrees));
    let mut off = State::new("Off");
    off.motor_targets.push(MotorTarget {
        enabled: true,
        target: Measured::new(5.0, "deg"),
        control_data: "anglePid".to_string(),
        controller: "feed".to_string(),
    });
    mech.states.push(off);
    mech.states.push(State::new("Intake"));
    mech
}

fn quiet_merge(template: Mechanism, instance: &Mechanism) -> Mechanism {
    let mut log = ProgressLog::new();
    merge(template, instance, &mut log).unwrap()
}

// ══════════════════════════════════════════════════════════════════════════════
// Override preservation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn overridable_field_keeps_instance_value() {
    // Template target value is 5.0; the instance overrode it to 9.0.
    let mut instance = template();
    instance.states[0].motor_targets[0].target.value = 9.0;

    let merged = quiet_merge(template(), &instance);
    assert_eq!(merged.states[0].motor_targets[0].target.value, 9.0);
}

#[test]
fn constant_field_takes_template_value() {
    // can_bus is constant-in-instance: a local edit must be discarded.
    let mut instance = template();
    instance.motor_controllers[0].can_bus = CanBus::Canivore;

    let merged = quiet_merge(template(), &instance);
    assert_eq!(merged.motor_controllers[0].can_bus, CanBus::Rio);
}

#[test]
fn can_id_override_survives() {
    let mut instance = template();
    instance.motor_controllers[0].can_id = 42;

    let merged = quiet_merge(template(), &instance);
    assert_eq!(merged.motor_controllers[0].can_id, 42);
}

#[test]
fn gains_survive_while_control_type_resets() {
    let mut instance = template();
    instance.control_data[0].gains.p = 3.25;

    let mut fresh = template();
    fresh.control_data[0].control_type = ControlType::PositionInch;

    let merged = quiet_merge(fresh, &instance);
    // Tunable gain kept, constant control type follows the template.
    assert_eq!(merged.control_data[0].gains.p, 3.25);
    assert_eq!(merged.control_data[0].control_type, ControlType::PositionInch);
}

#[test]
fn nested_config_block_merges_two_tier() {
    let mut instance = template();
    if let ControllerFamily::TalonFx(cfg) = &mut instance.motor_controllers[0].family {
        cfg.current_limits.stator_limit = 80.0; // overridable block
        cfg.remote_sensor.can_id = 17; // overridable leaf
        cfg.remote_sensor.source = RemoteSensorSource::Cancoder; // constant leaf
        cfg.motor_settings.mode = NeutralMode::Brake; // constant leaf
    }

    let merged = quiet_merge(template(), &instance);
    let ControllerFamily::TalonFx(cfg) = &merged.motor_controllers[0].family else {
        panic!("family changed unexpectedly");
    };
    assert_eq!(cfg.current_limits.stator_limit, 80.0);
    assert_eq!(cfg.remote_sensor.can_id, 17);
    assert_eq!(cfg.remote_sensor.source, RemoteSensorSource::Off);
    assert_eq!(cfg.motor_settings.mode, NeutralMode::Coast);
}

// ══════════════════════════════════════════════════════════════════════════════
// Shape sync
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn state_added_to_template_arrives_with_defaults() {
    let instance = template();

    let mut fresh = template();
    fresh.states.push(State::new("Expel"));

    let (merged, report) = merge_with_report(fresh, &instance).unwrap();
    assert!(merged.state("Expel").is_some());
    assert!(report
        .events
        .iter()
        .any(|e| e.path == "states.Expel" && e.kind == MergeEventKind::Added));
}

#[test]
fn state_removed_from_template_is_dropped_with_overrides() {
    let mut instance = template();
    // Local override on the state about to disappear.
    instance.states[0].motor_targets[0].target.value = 99.0;

    let mut fresh = template();
    fresh.states.remove(0);

    let (merged, report) = merge_with_report(fresh, &instance).unwrap();
    assert!(merged.state("Off").is_none());
    assert!(report
        .events
        .iter()
        .any(|e| e.path == "states.Off" && e.kind == MergeEventKind::Removed));
}

#[test]
fn renamed_state_is_remove_plus_add() {
    let instance = template();

    let mut fresh = template();
    fresh.states[1].name = "Eject".to_string();

    let (merged, report) = merge_with_report(fresh, &instance).unwrap();
    assert!(merged.state("Eject").is_some());
    assert!(merged.state("Intake").is_none());
    assert!(report
        .events
        .iter()
        .any(|e| e.path == "states.Eject" && e.kind == MergeEventKind::Added));
    assert!(report
        .events
        .iter()
        .any(|e| e.path == "states.Intake" && e.kind == MergeEventKind::Removed));
}

#[test]
fn merged_shape_always_matches_template() {
    let mut instance = template();
    instance.states.push(State::new("LocalOnly"));

    let merged = quiet_merge(template(), &instance);
    let names: Vec<&str> = merged.states.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Off", "Intake"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Family changes
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn family_change_discards_override_and_reports_data_loss() {
    let mut instance = template();
    instance.motor_controllers[0].can_id = 42; // local override

    let mut fresh = template();
    fresh.motor_controllers[0] = spark_max("feed", 10); // family changed

    let (merged, report) = merge_with_report(fresh, &instance).unwrap();
    // Template wins wholesale: the can_id override is gone.
    assert_eq!(merged.motor_controllers[0].can_id, 10);
    assert_eq!(merged.motor_controllers[0].family_name(), "SparkMax");
    assert!(report
        .events
        .iter()
        .any(|e| e.path == "motor_controllers.feed" && e.kind == MergeEventKind::Replaced));
}

#[test]
fn coexisting_families_with_same_name_both_merge() {
    let mut fresh = template();
    fresh.motor_controllers.push(spark_max("feed", 20));

    let mut instance = template();
    instance.motor_controllers.push(spark_max("feed", 20));
    instance.motor_controllers[0].can_id = 11; // TalonFX slot
    instance.motor_controllers[1].can_id = 21; // SparkMax slot

    let (merged, report) = merge_with_report(fresh, &instance).unwrap();
    assert_eq!(merged.motor_controllers[0].can_id, 11);
    assert_eq!(merged.motor_controllers[1].can_id, 21);
    assert!(report.is_empty());
}

// ══════════════════════════════════════════════════════════════════════════════
// Consistency
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn duplicate_state_names_are_a_consistency_error() {
    let mut bad = template();
    bad.states.push(State::new("Off"));

    let err = merge_with_report(bad, &template()).unwrap_err();
    assert!(matches!(err, GenError::Consistency(_)));
}

#[test]
fn duplicate_controller_name_and_family_is_a_consistency_error() {
    let mut bad = template();
    bad.motor_controllers.push(talon_fx("feed", 11));

    let err = merge_with_report(bad, &template()).unwrap_err();
    assert!(matches!(err, GenError::Consistency(_)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Whole-set sync
// ══════════════════════════════════════════════════════════════════════════════

fn variant_set() -> RobotVariantSet {
    let mut set = RobotVariantSet::new();
    let id = set.templates.register(template());
    let instance = set.templates.instantiate(id, "noteManager").unwrap();
    set.robots.push(RobotConfig {
        id: 302,
        name: "CompBot".to_string(),
        mechanism_instances: vec![instance.clone()],
    });
    set.robots.push(RobotConfig {
        id: 9999,
        name: "PracticeBot".to_string(),
        mechanism_instances: vec![instance],
    });
    set
}

#[test]
fn sync_applies_template_edits_to_every_instance() {
    let mut set = variant_set();
    // Per-robot override that must survive the sync.
    set.robots[1].mechanism_instances[0].mechanism.motor_controllers[0].can_id = 55;

    // Template gains a state after the instances were created.
    let id = set.robots[0].mechanism_instances[0].mechanism.id;
    set.templates.get_mut(id).unwrap().states.push(State::new("Hold"));

    let mut log = ProgressLog::new();
    sync_instances(&mut set, &mut log).unwrap();

    for robot in &set.robots {
        assert!(robot.mechanism_instances[0].mechanism.state("Hold").is_some());
    }
    assert_eq!(
        set.robots[1].mechanism_instances[0].mechanism.motor_controllers[0].can_id,
        55
    );
    assert!(!log.is_empty());
}

#[test]
fn sync_rejects_unregistered_template_id() {
    let mut set = variant_set();
    set.robots[0].mechanism_instances[0].mechanism.id = MechanismId(999);

    let mut log = ProgressLog::new();
    let err = sync_instances(&mut set, &mut log).unwrap_err();
    assert!(matches!(err, GenError::UnknownTemplate(_, _)));
}
