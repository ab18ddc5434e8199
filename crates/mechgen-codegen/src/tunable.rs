//! Tunable parameter file content.
//!
//! One small JSON file per mechanism instance per robot, carrying only the
//! fields the schema marks tunable (closed-loop gains). Deployed next to
//! the robot code so gains can be adjusted in the field without a rebuild.

use mechgen_types::model::Mechanism;
use serde_json::{Map, Value};

use crate::instance::gain_rows;

/// Flat key → value map of every tunable field in the mechanism,
/// keyed `<controlData>_<gain>`.
pub fn tunable_parameters(mech: &Mechanism) -> Value {
    let mut map = Map::new();
    for cd in &mech.control_data {
        if !cd.control_type.is_closed_loop() {
            continue;
        }
        for (key, _, value) in gain_rows(&cd.gains) {
            map.insert(
                format!("{}_{key}", cd.name),
                Value::from(value),
            );
        }
    }
    Value::Object(map)
}

/// Serialized parameter file content. Pretty-printed with a trailing
/// newline so repeated runs are byte-identical.
pub fn tunable_file_content(mech: &Mechanism) -> String {
    let value = tunable_parameters(mech);
    let mut text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    text.push('\n');
    text
}

/// File name for one instance's parameter file.
pub fn tunable_file_name(instance_name: &str) -> String {
    format!("{instance_name}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mechgen_types::model::{
        ControlType, Mechanism, MechanismId, MotorControlData, PidGains,
    };

    fn mech_with_gains() -> Mechanism {
        let mut mech = Mechanism::new(MechanismId(1), "arm");
        mech.control_data.push(MotorControlData {
            name: "anglePid".to_string(),
            control_type: ControlType::PositionDegrees,
            gains: PidGains {
                p: 1.5,
                i: 0.0,
                d: 0.2,
                f: 0.0,
                izone: 0.0,
            },
            enable_foc: false,
        });
        mech.control_data.push(MotorControlData {
            name: "raw".to_string(),
            control_type: ControlType::PercentOutput,
            gains: PidGains::default(),
            enable_foc: false,
        });
        mech
    }

    #[test]
    fn only_closed_loop_gains_are_exported() {
        let params = tunable_parameters(&mech_with_gains());
        let obj = params.as_object().unwrap();
        assert_eq!(obj.get("anglePid_p"), Some(&Value::from(1.5)));
        assert_eq!(obj.get("anglePid_d"), Some(&Value::from(0.2)));
        assert!(obj.keys().all(|k| !k.starts_with("raw_")));
        assert_eq!(obj.len(), 5);
    }

    #[test]
    fn content_is_stable_and_newline_terminated() {
        let mech = mech_with_gains();
        let first = tunable_file_content(&mech);
        assert!(first.ends_with('\n'));
        for _ in 0..10 {
            assert_eq!(tunable_file_content(&mech), first);
        }
    }

    #[test]
    fn file_name_uses_instance_name() {
        assert_eq!(tunable_file_name("noteManager"), "noteManager.json");
    }
}
