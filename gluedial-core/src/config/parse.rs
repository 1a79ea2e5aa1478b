//! Simple TOML parser for machine configuration
//!
//! This is a minimal TOML parser that handles only the subset used by
//! `machine.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - `[section]` headers (`stepper`, `input`, `ui`)
//! - Key = value pairs (integer, boolean)
//! - Underscore digit separators (`8_000`)
//! - Comments (# ...), full-line or trailing
//!
//! Keys that are not recognised are an error rather than silently ignored,
//! so typos in the config file show up at boot.

use super::types::MachineConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header (1-based line)
    InvalidSection(usize),
    /// Line is neither a header nor `key = value`
    InvalidLine(usize),
    /// Key not valid in the current section
    UnknownKey(usize),
    /// Value has the wrong type or is out of range
    InvalidValue(usize),
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Stepper,
    Input,
    Ui,
}

/// Parse TOML configuration into a [`MachineConfig`]
///
/// Keys that are absent keep their default values.
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ParseError::InvalidSection(line_no))?
                .trim();
            section = match name {
                "stepper" => Section::Stepper,
                "input" => Section::Input,
                "ui" => Section::Ui,
                _ => return Err(ParseError::InvalidSection(line_no)),
            };
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidLine(line_no))?;
        let key = key.trim();
        let value = value.trim();

        apply(&mut config, section, key, value).map_err(|e| match e {
            FieldError::UnknownKey => ParseError::UnknownKey(line_no),
            FieldError::InvalidValue => ParseError::InvalidValue(line_no),
        })?;
    }

    Ok(config)
}

enum FieldError {
    UnknownKey,
    InvalidValue,
}

fn apply(
    config: &mut MachineConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), FieldError> {
    match section {
        Section::Root => Err(FieldError::UnknownKey),
        Section::Stepper => {
            let s = &mut config.stepper;
            match key {
                "full_steps_per_rotation" => s.full_steps_per_rotation = parse_int(value)?,
                "microsteps" => s.microsteps = parse_int(value)?,
                "gear_ratio_num" => s.gear_ratio_num = parse_int(value)?,
                "gear_ratio_den" => s.gear_ratio_den = parse_int(value)?,
                "rotation_distance_um" => s.rotation_distance_um = parse_int(value)?,
                "max_speed_steps_s" => s.max_speed_steps_s = parse_int(value)?,
                "accel_steps_s2" => s.accel_steps_s2 = parse_int(value)?,
                "enable_inverted" => s.enable_inverted = parse_bool(value)?,
                _ => return Err(FieldError::UnknownKey),
            }
            Ok(())
        }
        Section::Input => {
            let i = &mut config.input;
            match key {
                "fast_turn_ms" => i.fast_turn_ms = parse_int(value)?,
                "long_press_ms" => i.long_press_ms = parse_int(value)?,
                "button_active_low" => i.button_active_low = parse_bool(value)?,
                "button_debounce_ms" => i.button_debounce_ms = parse_int(value)?,
                "encoder_reverse" => i.encoder_reverse = parse_bool(value)?,
                _ => return Err(FieldError::UnknownKey),
            }
            Ok(())
        }
        Section::Ui => {
            let u = &mut config.ui;
            match key {
                "active_redraw_ms" => u.active_redraw_ms = parse_int(value)?,
                "idle_tick_ms" => u.idle_tick_ms = parse_int(value)?,
                _ => return Err(FieldError::UnknownKey),
            }
            Ok(())
        }
    }
}

/// Drop a trailing `# comment`
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Parse a non-negative integer, allowing `_` separators
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, FieldError> {
    let mut acc: u64 = 0;
    let mut digits = 0;
    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(10).ok_or(FieldError::InvalidValue)?;
        acc = acc
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(d)))
            .ok_or(FieldError::InvalidValue)?;
        digits += 1;
    }
    if digits == 0 {
        return Err(FieldError::InvalidValue);
    }
    T::try_from(acc).map_err(|_| FieldError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, FieldError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(FieldError::InvalidValue),
    }
}
