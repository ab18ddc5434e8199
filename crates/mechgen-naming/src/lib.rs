//! Identifier derivation for generated code.
//!
//! All names in generated output come through here so that identical model
//! state always yields identical identifiers. Nothing in this crate looks at
//! anything but its arguments — no incidental ordering dependence.
//!
//! Two case conventions are produced:
//! - `UNDERSCORE_UPPER` for enum-like tokens (`NOTE_MANAGER`)
//! - `UpperCamel` for accessor tokens (`NoteManager`)
//!
//! Human-entered names may start with a digit; raw numeric-first tokens are
//! not valid identifiers in the generated language, so a leading digit is
//! escaped with an underscore prefix.

use mechgen_types::model::MotorController;

// ══════════════════════════════════════════════════════════════════════════════
// Case conversion
// ══════════════════════════════════════════════════════════════════════════════

/// Split a human-entered name into words at spaces, separators, and
/// lower→upper camel boundaries.
fn words(name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for ch in name.chars() {
        if ch == ' ' || ch == '_' || ch == '-' {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            let camel_boundary = ch.is_ascii_uppercase() && (p.is_ascii_lowercase() || p.is_ascii_digit());
            if camel_boundary && !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
        prev = Some(ch);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Escape a token whose first character is a digit.
fn escape_leading_digit(token: String) -> String {
    match token.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{token}"),
        _ => token,
    }
}

/// `noteManager` / `note manager` → `NOTE_MANAGER`; `9999club` → `_9999CLUB`.
pub fn underscore_upper(name: &str) -> String {
    let joined = words(name)
        .iter()
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("_");
    escape_leading_digit(joined)
}

/// `note manager` / `note_manager` → `NoteManager`; `9999club` → `_9999club`.
pub fn upper_camel(name: &str) -> String {
    let joined = words(name)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + chars.as_str()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("");
    escape_leading_digit(joined)
}

/// `Note Manager` → `noteManager`.
pub fn lower_camel(name: &str) -> String {
    let camel = upper_camel(name);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            first.to_ascii_lowercase().to_string() + chars.as_str()
        }
        Some(first) => first.to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Member-variable form: `m_` + lowerCamel.
pub fn member_variable(name: &str) -> String {
    format!("m_{}", lower_camel(name))
}

// ══════════════════════════════════════════════════════════════════════════════
// Controller disambiguation
// ══════════════════════════════════════════════════════════════════════════════

/// Family suffix appended to a controller's generated names when another
/// controller in the same mechanism shares its base name.
///
/// The collision check runs against the full controller list — never a list
/// already filtered to enabled controllers — so the generated name of an
/// unambiguous controller cannot drift when a sibling is toggled.
pub fn controller_suffix(
    controller: &MotorController,
    all_controllers: &[MotorController],
) -> &'static str {
    let collisions = all_controllers
        .iter()
        .filter(|m| m.name == controller.name)
        .count();
    if collisions > 1 {
        controller.family_name()
    } else {
        ""
    }
}

/// Member-variable name for a controller, disambiguated by family on
/// collision: `m_left` or `m_leftSparkMax`.
pub fn controller_member(
    controller: &MotorController,
    all_controllers: &[MotorController],
) -> String {
    let suffix = controller_suffix(controller, all_controllers);
    member_variable(&format!("{}{}", controller.name, suffix))
}

/// Accessor name for a controller: `LeftWinch` or `LeftWinchSparkMax`.
pub fn controller_accessor(
    controller: &MotorController,
    all_controllers: &[MotorController],
) -> String {
    let suffix = controller_suffix(controller, all_controllers);
    upper_camel(&format!("{}{}", controller.name, suffix))
}

/// Element-usage enum token for a controller, scoped to its mechanism
/// instance: `NOTE_MANAGER_LEFT` or `NOTE_MANAGER_LEFT_SPARK_MAX`.
pub fn controller_usage(
    instance_name: &str,
    controller: &MotorController,
    all_controllers: &[MotorController],
) -> String {
    let base = format!(
        "{}_{}",
        underscore_upper(instance_name),
        underscore_upper(&controller.name)
    );
    let suffix = controller_suffix(controller, all_controllers);
    if suffix.is_empty() {
        base
    } else {
        format!("{}_{}", base, underscore_upper(suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_camel_and_spaces() {
        assert_eq!(words("noteManager"), ["note", "Manager"]);
        assert_eq!(words("note manager"), ["note", "manager"]);
        assert_eq!(words("note_manager"), ["note", "manager"]);
        assert_eq!(words("CompBot302"), ["Comp", "Bot302"]);
    }

    #[test]
    fn case_conversion_is_deterministic() {
        for _ in 0..50 {
            assert_eq!(underscore_upper("noteManager"), "NOTE_MANAGER");
            assert_eq!(upper_camel("note manager"), "NoteManager");
            assert_eq!(lower_camel("Note Manager"), "noteManager");
        }
    }
}
