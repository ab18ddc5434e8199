//! Integration tests for the naming engine.
//!
//! Covers case conversion, leading-digit escaping, and member-name
//! disambiguation between same-named controllers of different families.

use mechgen_naming::{
    controller_accessor, controller_member, controller_suffix, controller_usage,
    lower_camel, member_variable, underscore_upper, upper_camel,
};
use mechgen_types::model::{
    CanBus, ControllerFamily, CurrentLimits, LegacyConfig, LegacyCurrentLimits,
    MotorController, MotorOutputSettings, PhoenixConfig, RemoteSensor, SparkConfig,
    VoltageRamping,
};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn phoenix_family() -> ControllerFamily {
    ControllerFamily::TalonFx(PhoenixConfig {
        current_limits: CurrentLimits::default(),
        motor_settings: MotorOutputSettings::default(),
        remote_sensor: RemoteSensor::default(),
    })
}

fn spark_family() -> ControllerFamily {
    ControllerFamily::SparkMax(SparkConfig {
        primary_current_limit: 50,
        secondary_current_limit: 50,
        secondary_limit_cycles: 0,
        motor_settings: MotorOutputSettings::default(),
        monitored: None,
    })
}

fn legacy_family() -> ControllerFamily {
    ControllerFamily::TalonSrx(LegacyConfig {
        current_limits: LegacyCurrentLimits::default(),
        motor_settings: MotorOutputSettings::default(),
        voltage_compensation_saturation: 10.0,
    })
}

fn controller(name: &str, family: ControllerFamily) -> MotorController {
    MotorController {
        name: name.to_string(),
        enabled: true,
        can_id: 1,
        can_bus: CanBus::Rio,
        pdp_id: 0,
        follower: None,
        voltage_ramping: VoltageRamping::default(),
        family,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Case conversion
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn underscore_upper_from_camel() {
    assert_eq!(underscore_upper("noteManager"), "NOTE_MANAGER");
    assert_eq!(underscore_upper("frontArm"), "FRONT_ARM");
}

#[test]
fn underscore_upper_from_spaces() {
    assert_eq!(underscore_upper("front intake arm"), "FRONT_INTAKE_ARM");
}

#[test]
fn underscore_upper_idempotent_on_converted_input() {
    assert_eq!(underscore_upper("NOTE_MANAGER"), "NOTE_MANAGER");
}

#[test]
fn leading_digit_is_escaped() {
    assert_eq!(underscore_upper("9999club"), "_9999CLUB");
    assert_eq!(upper_camel("9999club"), "_9999club");
}

#[test]
fn upper_camel_joins_words() {
    assert_eq!(upper_camel("note manager"), "NoteManager");
    assert_eq!(upper_camel("note_manager"), "NoteManager");
    assert_eq!(upper_camel("noteManager"), "NoteManager");
}

#[test]
fn member_variable_prefixes() {
    assert_eq!(member_variable("leftWinch"), "m_leftWinch");
    assert_eq!(member_variable("Left Winch"), "m_leftWinch");
    assert_eq!(lower_camel("Left Winch"), "leftWinch");
}

// ══════════════════════════════════════════════════════════════════════════════
// Disambiguation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn single_controller_gets_unadorned_name() {
    let left = controller("left", phoenix_family());
    let all = vec![left.clone()];
    assert_eq!(controller_suffix(&left, &all), "");
    assert_eq!(controller_member(&left, &all), "m_left");
    assert_eq!(controller_accessor(&left, &all), "Left");
}

#[test]
fn same_name_different_family_disambiguates_both() {
    let a = controller("left", phoenix_family());
    let b = controller("left", spark_family());
    let all = vec![a.clone(), b.clone()];

    let member_a = controller_member(&a, &all);
    let member_b = controller_member(&b, &all);
    assert_eq!(member_a, "m_leftTalonFX");
    assert_eq!(member_b, "m_leftSparkMax");
    assert_ne!(member_a, member_b);
}

#[test]
fn disambiguation_ignores_enabled_state() {
    // The collision is computed on the full list, so disabling a sibling
    // must not change the surviving controller's generated name.
    let a = controller("left", phoenix_family());
    let mut b = controller("left", legacy_family());
    b.enabled = false;
    let all = vec![a.clone(), b];
    assert_eq!(controller_member(&a, &all), "m_leftTalonFX");
}

#[test]
fn usage_token_scopes_to_instance() {
    let winch = controller("winch", phoenix_family());
    let all = vec![winch.clone()];
    assert_eq!(controller_usage("noteManager", &winch, &all), "NOTE_MANAGER_WINCH");
}

#[test]
fn usage_token_carries_family_on_collision() {
    let a = controller("left", phoenix_family());
    let b = controller("left", spark_family());
    let all = vec![a.clone(), b.clone()];
    assert_eq!(
        controller_usage("intake", &a, &all),
        "INTAKE_LEFT_TALON_FX"
    );
    assert_eq!(
        controller_usage("intake", &b, &all),
        "INTAKE_LEFT_SPARK_MAX"
    );
}

#[test]
fn names_are_stable_across_repeated_calls() {
    let a = controller("left", phoenix_family());
    let b = controller("left", spark_family());
    let all = vec![a.clone(), b];
    let first = controller_member(&a, &all);
    for _ in 0..100 {
        assert_eq!(controller_member(&a, &all), first);
    }
}
