//! Build script for gluedial-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key kinds accepted in machine.toml
enum Kind {
    /// Integer in the inclusive range
    Int(i64, i64),
    Bool,
}

/// Every section and key the firmware parser understands
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    (
        "stepper",
        &[
            ("full_steps_per_rotation", Kind::Int(1, 65_535)),
            ("microsteps", Kind::Int(1, 256)),
            ("gear_ratio_num", Kind::Int(1, 65_535)),
            ("gear_ratio_den", Kind::Int(1, 65_535)),
            ("rotation_distance_um", Kind::Int(1, 1_000_000)),
            ("max_speed_steps_s", Kind::Int(1, 50_000)),
            ("accel_steps_s2", Kind::Int(1, 1_000_000)),
            ("enable_inverted", Kind::Bool),
        ],
    ),
    (
        "input",
        &[
            ("fast_turn_ms", Kind::Int(1, 10_000)),
            ("long_press_ms", Kind::Int(1, 10_000)),
            ("button_active_low", Kind::Bool),
            ("button_debounce_ms", Kind::Int(0, 1_000)),
            ("encoder_reverse", Kind::Bool),
        ],
    ),
    (
        "ui",
        &[
            ("active_redraw_ms", Kind::Int(1, 10_000)),
            ("idle_tick_ms", Kind::Int(1, 10_000)),
        ],
    ),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a machine.toml configuration file.        ║\n\
            ║  Please create one in the gluedial-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = check_schema(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid machine.toml                                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=machine.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check sections, keys and value ranges
///
/// Sections and keys may be omitted (the firmware falls back to defaults)
/// but anything present must be known and in range.
fn check_schema(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return vec!["top level must be a table".to_string()],
    };

    for (section, value) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| name == section) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in table {
            let Some((_, kind)) = keys.iter().find(|(name, _)| name == key) else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
                continue;
            };
            match (kind, value) {
                (Kind::Int(min, max), toml::Value::Integer(v)) => {
                    if v < min || v > max {
                        errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
                    }
                }
                (Kind::Bool, toml::Value::Boolean(_)) => {}
                (Kind::Int(..), _) => {
                    errors.push(format!("[{}] {} must be an integer", section, key));
                }
                (Kind::Bool, _) => {
                    errors.push(format!("[{}] {} must be true or false", section, key));
                }
            }
        }
    }

    errors
}
