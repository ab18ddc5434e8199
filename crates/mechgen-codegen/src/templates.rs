//! Output-file kinds and the template set.
//!
//! One named template exists per output kind. Callers normally start from
//! [`TemplateSet::default_set`] (the built-in templates below) and may
//! replace any kind with their own text; the output file-name pattern
//! travels with the template.

use mechgen_template::{Template, TemplateError};

/// The output kinds this generator produces per mechanism instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Generated implementation file, overwritten on every run.
    MechanismBody,
    /// Generated header file, overwritten on every run.
    MechanismHeader,
    /// Hand-editable per-state implementation, written once.
    StateDecoratorBody,
    /// Hand-editable per-state header, written once.
    StateDecoratorHeader,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::MechanismBody,
        TemplateKind::MechanismHeader,
        TemplateKind::StateDecoratorBody,
        TemplateKind::StateDecoratorHeader,
    ];

    /// Decorator kinds are generated once and never overwritten.
    pub fn is_decorator(&self) -> bool {
        matches!(
            self,
            TemplateKind::StateDecoratorBody | TemplateKind::StateDecoratorHeader
        )
    }

    /// Kinds rendered once per state rather than once per instance.
    pub fn is_per_state(&self) -> bool {
        self.is_decorator()
    }
}

/// A parsed template plus its output file-name pattern.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub kind: TemplateKind,
    pub template: Template,
    /// File name with `MECHANISM_INSTANCE_NAME` / `MECHANISM_NAME` /
    /// `STATE_NAME` tokens, substituted before path resolution.
    pub output_pattern: String,
}

/// One template per output kind.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    files: Vec<TemplateFile>,
}

impl TemplateSet {
    /// The built-in templates.
    pub fn default_set() -> Result<Self, TemplateError> {
        let mut set = Self { files: Vec::new() };
        set.insert(
            TemplateKind::MechanismBody,
            MECHANISM_BODY_TEMPLATE,
            "MECHANISM_INSTANCE_NAME.cpp",
        )?;
        set.insert(
            TemplateKind::MechanismHeader,
            MECHANISM_HEADER_TEMPLATE,
            "MECHANISM_INSTANCE_NAME.h",
        )?;
        set.insert(
            TemplateKind::StateDecoratorBody,
            STATE_DECORATOR_BODY_TEMPLATE,
            "STATE_NAMEState.cpp",
        )?;
        set.insert(
            TemplateKind::StateDecoratorHeader,
            STATE_DECORATOR_HEADER_TEMPLATE,
            "STATE_NAMEState.h",
        )?;
        Ok(set)
    }

    /// Replace (or add) the template for a kind.
    pub fn insert(
        &mut self,
        kind: TemplateKind,
        text: &str,
        output_pattern: &str,
    ) -> Result<(), TemplateError> {
        let template = Template::parse(text)?;
        self.files.retain(|f| f.kind != kind);
        self.files.push(TemplateFile {
            kind,
            template,
            output_pattern: output_pattern.to_string(),
        });
        Ok(())
    }

    pub fn get(&self, kind: TemplateKind) -> Option<&TemplateFile> {
        self.files.iter().find(|f| f.kind == kind)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Built-in templates
// ══════════════════════════════════════════════════════════════════════════════

/// Generated mechanism implementation.
pub const MECHANISM_BODY_TEMPLATE: &str = r#"$$_GEN_NOTICE_$$
#include <string>

$$_INCLUDE_FILES_$$
#include "mechanisms/$$_MECHANISM_INSTANCE_NAME_$$/generated/$$_MECHANISM_INSTANCE_NAME_$$.h"
_STATE_MANAGER_START_
$$_STATE_CLASSES_INCLUDES_$$
_STATE_MANAGER_END_

using std::string;

$$_MECHANISM_INSTANCE_NAME_$$::$$_MECHANISM_INSTANCE_NAME_$$(RobotConfigMgr::RobotIdentifier activeRobotId)
    : BaseMech(MechanismTypes::MECHANISM_TYPE::$$_MECHANISM_TYPE_NAME_$$, "$$_MECHANISM_INSTANCE_NAME_$$"),
      m_activeRobotId(activeRobotId)
{
}

$$_CREATE_FUNCTIONS_$$

$$_INITIALIZATION_FUNCTIONS_$$

_STATE_MANAGER_START_
void $$_MECHANISM_INSTANCE_NAME_$$::CreateAndRegisterStates()
{
    $$_OBJECT_CREATION_$$;
    $$_STATE_TRANSITION_REGISTRATION_$$;
}

std::map<std::string, $$_MECHANISM_INSTANCE_NAME_$$::STATE_NAMES> $$_MECHANISM_INSTANCE_NAME_$$::stringToSTATE_NAMESEnumMap
{
    $$_STATE_MAP_$$
};
_STATE_MANAGER_END_

_MECHANISM_HAS_MOTORS_START_
void $$_MECHANISM_INSTANCE_NAME_$$::Update()
{
    $$_CYCLIC_TARGET_REFRESH_$$
}

$$_TARGET_UPDATE_FUNCTIONS_$$
_MECHANISM_HAS_MOTORS_END_

void $$_MECHANISM_INSTANCE_NAME_$$::ReadTuningParamsFromNT()
{
    $$_READ_TUNABLE_PARAMETERS_$$
}

void $$_MECHANISM_INSTANCE_NAME_$$::PushTuningParamsToNT()
{
    $$_PUSH_TUNABLE_PARAMETERS_$$
}
"#;

/// Generated mechanism header.
pub const MECHANISM_HEADER_TEMPLATE: &str = r#"$$_GEN_NOTICE_$$
#pragma once

#include <map>
#include <string>
#include <networktables/NetworkTable.h>

$$_INCLUDE_FILES_$$

#include "mechanisms/base/BaseMech.h"
_STATE_MANAGER_START_
#include "mechanisms/base/StateMgr.h"
_STATE_MANAGER_END_
#include "configs/RobotElementNames.h"
#include "configs/RobotConfigMgr.h"

class $$_MECHANISM_INSTANCE_NAME_$$ : public BaseMech _STATE_MANAGER_START_, public StateMgr _STATE_MANAGER_END_
{
public:
    _STATE_MANAGER_START_
    enum STATE_NAMES
    {
        $$_STATE_NAMES_$$
    };
    _STATE_MANAGER_END_

    $$_MECHANISM_INSTANCE_NAME_$$(RobotConfigMgr::RobotIdentifier activeRobotId);
    $$_MECHANISM_INSTANCE_NAME_$$() = delete;
    ~$$_MECHANISM_INSTANCE_NAME_$$() = default;

    $$_CREATE_FUNCTION_DECLS_$$
    $$_INITIALIZATION_FUNCTION_DECLS_$$

    _STATE_MANAGER_START_
    void CreateAndRegisterStates();
    void SetCurrentState(int state, bool run) override;
    _STATE_MANAGER_END_

    _MECHANISM_HAS_MOTORS_START_
    void Update();
    $$_TARGET_UPDATE_FUNCTION_DECLS_$$

    _UPDATE_TARGET_PERCENT_OUTPUT_START_
    void UpdateTarget(RobotElementNames::MOTOR_CONTROLLER_USAGE identifier, double percentOutput);
    _UPDATE_TARGET_PERCENT_OUTPUT_END_
    _UPDATE_TARGET_VOLTAGE_OUTPUT_START_
    void UpdateTarget(RobotElementNames::MOTOR_CONTROLLER_USAGE identifier, units::voltage::volt_t voltage);
    _UPDATE_TARGET_VOLTAGE_OUTPUT_END_
    _UPDATE_TARGET_POSITION_DEGREES_START_
    void UpdateTarget(RobotElementNames::MOTOR_CONTROLLER_USAGE identifier, ControlData *controlConst, units::angle::degree_t angle);
    _UPDATE_TARGET_POSITION_DEGREES_END_
    _UPDATE_TARGET_POSITION_INCH_START_
    void UpdateTarget(RobotElementNames::MOTOR_CONTROLLER_USAGE identifier, ControlData *controlConst, units::length::inch_t position);
    _UPDATE_TARGET_POSITION_INCH_END_
    _UPDATE_TARGET_VELOCITY_DEGREES_PER_SEC_START_
    void UpdateTarget(RobotElementNames::MOTOR_CONTROLLER_USAGE identifier, ControlData *controlConst, units::angular_velocity::degrees_per_second_t angVel);
    _UPDATE_TARGET_VELOCITY_DEGREES_PER_SEC_END_
    _UPDATE_TARGET_VELOCITY_FEET_PER_SEC_START_
    void UpdateTarget(RobotElementNames::MOTOR_CONTROLLER_USAGE identifier, ControlData *controlConst, units::velocity::feet_per_second_t velocity);
    _UPDATE_TARGET_VELOCITY_FEET_PER_SEC_END_
    _UPDATE_TARGET_VELOCITY_REV_PER_SEC_START_
    void UpdateTarget(RobotElementNames::MOTOR_CONTROLLER_USAGE identifier, ControlData *controlConst, units::angular_velocity::turns_per_second_t angVel);
    _UPDATE_TARGET_VELOCITY_REV_PER_SEC_END_
    _MECHANISM_HAS_MOTORS_END_

    _MECHANISM_HAS_SOLENOIDS_START_
    void UpdateTarget(RobotElementNames::SOLENOID_USAGE identifier, bool extend);
    bool IsAtMinPosition(RobotElementNames::SOLENOID_USAGE identifier) const;
    bool IsAtMaxPosition(RobotElementNames::SOLENOID_USAGE identifier) const;
    _MECHANISM_HAS_SOLENOIDS_END_

    _MECHANISM_HAS_SERVOS_START_
    void SetServoAngle(RobotElementNames::SERVO_USAGE identifier, units::angle::degree_t angle);
    _MECHANISM_HAS_SERVOS_END_

    RobotConfigMgr::RobotIdentifier GetActiveRobotId() const { return m_activeRobotId; }

    $$_MECHANISM_ELEMENTS_GETTERS_$$

    _STATE_MANAGER_START_
    static std::map<std::string, STATE_NAMES> stringToSTATE_NAMESEnumMap;
    _STATE_MANAGER_END_

protected:
    RobotConfigMgr::RobotIdentifier m_activeRobotId;
    std::string m_ntName;
    bool m_tuning = false;
    std::shared_ptr<nt::NetworkTable> m_table;

private:
    $$_MECHANISM_ELEMENTS_$$

    $$_TARGET_MEMBER_VARIABLES_$$

    void CheckForTuningEnabled();
    void ReadTuningParamsFromNT();
    void PushTuningParamsToNT();
};
"#;

/// Hand-editable per-state header; written on first generation only.
pub const STATE_DECORATOR_HEADER_TEMPLATE: &str = r#"$$_GEN_NOTICE_$$
#pragma once

#include <string>

#include "State.h"
#include "mechanisms/$$_MECHANISM_INSTANCE_NAME_$$/generated/$$_MECHANISM_INSTANCE_NAME_$$.h"

namespace $$_MECHANISM_INSTANCE_NAME_$$States
{
    class $$_STATE_NAME_$$State : public State
    {
    public:
        $$_STATE_NAME_$$State() = delete;
        $$_STATE_NAME_$$State(std::string stateName,
                              int stateId,
                              $$_MECHANISM_INSTANCE_NAME_$$ *mech);
        ~$$_STATE_NAME_$$State() = default;
        void Init() override;
        void Run() override;
        void Exit() override;
        bool AtTarget() override;
        bool IsTransitionCondition(bool considerGamepadTransitions) override;

    private:
        $$_MECHANISM_INSTANCE_NAME_$$ *m_mechanism;
        $$_STATE_INIT_FUNCTION_DECLS_$$
    };
}
"#;

/// Hand-editable per-state implementation; written on first generation only.
pub const STATE_DECORATOR_BODY_TEMPLATE: &str = r#"$$_GEN_NOTICE_$$
#include "mechanisms/$$_MECHANISM_INSTANCE_NAME_$$/decoratormods/$$_STATE_NAME_$$State.h"
#include "utils/logging/Logger.h"

using namespace $$_MECHANISM_INSTANCE_NAME_$$States;

$$_STATE_NAME_$$State::$$_STATE_NAME_$$State(std::string stateName,
                                             int stateId,
                                             $$_MECHANISM_INSTANCE_NAME_$$ *mech)
    : State(stateName, stateId), m_mechanism(mech)
{
}

void $$_STATE_NAME_$$State::Init()
{
    $$_STATE_INIT_FUNCTION_CALLS_$$
}

$$_STATE_INIT_FUNCTIONS_$$

void $$_STATE_NAME_$$State::Run()
{
}

void $$_STATE_NAME_$$State::Exit()
{
}

bool $$_STATE_NAME_$$State::AtTarget()
{
    return true;
}

bool $$_STATE_NAME_$$State::IsTransitionCondition(bool considerGamepadTransitions)
{
    return false;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_parses_every_kind() {
        let set = TemplateSet::default_set().unwrap();
        for kind in TemplateKind::ALL {
            assert!(set.get(kind).is_some(), "missing template for {kind:?}");
        }
    }

    #[test]
    fn insert_replaces_existing_kind() {
        let mut set = TemplateSet::default_set().unwrap();
        set.insert(TemplateKind::MechanismBody, "$$_X_$$", "out.cpp")
            .unwrap();
        let file = set.get(TemplateKind::MechanismBody).unwrap();
        assert_eq!(file.output_pattern, "out.cpp");
        assert_eq!(file.template.placeholder_names(), vec!["X"]);
    }

    #[test]
    fn decorator_kinds_are_per_state() {
        assert!(TemplateKind::StateDecoratorBody.is_decorator());
        assert!(TemplateKind::StateDecoratorHeader.is_per_state());
        assert!(!TemplateKind::MechanismBody.is_decorator());
    }
}
