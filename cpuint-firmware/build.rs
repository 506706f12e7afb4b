//! Build script for cpuint-firmware
//!
//! - Sets up linker search paths and scripts
//! - Validates timing.toml at compile time
//! - Generates the timing constants the firmware starts from

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    let timing = validate_timing();
    generate_timing(&timing);
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated contents of timing.toml
struct Timing {
    unit_us: i64,
    a_top: i64,
    b_top: i64,
    pulse_units: i64,
    baudrate: i64,
    data_bits: &'static str,
    parity: &'static str,
    stop_bits: &'static str,
    elevated: &'static str,
    round_robin: bool,
    led_active_low: bool,
}

/// Validate timing.toml at compile time
fn validate_timing() -> Timing {
    // Re-run if timing.toml changes
    println!("cargo:rerun-if-changed=timing.toml");

    let config_path = Path::new("timing.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: timing.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a timing.toml file in the                 ║\n\
            ║  cpuint-firmware directory.                                      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read timing.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in timing.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let unit_us = int_field(&config, None, "unit_us", 1, 1_000_000, &mut errors);
    let a_top = int_field(&config, Some("timers"), "a_top", 1, 65_535, &mut errors);
    let b_top = int_field(&config, Some("timers"), "b_top", 1, 65_535, &mut errors);
    let pulse_units = int_field(&config, Some("pulse"), "units", 0, u32::MAX as i64, &mut errors);
    let baudrate = int_field(&config, Some("serial"), "baudrate", 1, 921_600, &mut errors);

    let data_bits = match int_field(&config, Some("serial"), "data_bits", 7, 8, &mut errors) {
        7 => "Seven",
        _ => "Eight",
    };
    let stop_bits = match int_field(&config, Some("serial"), "stop_bits", 1, 2, &mut errors) {
        2 => "Two",
        _ => "One",
    };
    let parity = match str_field(&config, "serial", "parity", &mut errors).as_deref() {
        Some("none") | None => "None",
        Some("even") => "Even",
        Some("odd") => "Odd",
        Some(other) => {
            errors.push(format!("[serial] parity '{}' must be 'none', 'even' or 'odd'", other));
            "None"
        }
    };
    let elevated = match str_field(&config, "priority", "elevated", &mut errors).as_deref() {
        Some("serial") | None => "Some(SourceId::Serial)",
        Some("timer_a") => "Some(SourceId::TimerA)",
        Some("timer_b") => "Some(SourceId::TimerB)",
        Some("none") => "None",
        Some(other) => {
            errors.push(format!("[priority] unknown elevated source '{}'", other));
            "None"
        }
    };
    let round_robin = bool_field(&config, "priority", "round_robin", true, &mut errors);
    let led_active_low = bool_field(&config, "led", "active_low", false, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid timing.toml                                      ║\n\
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

    if pulse_units > 0 && pulse_units <= a_top.max(b_top) {
        println!("cargo:warning=pulse shorter than a timer period, the handlers will not run back to back");
    }
    println!("cargo:warning=timing.toml validated successfully");

    Timing {
        unit_us,
        a_top,
        b_top,
        pulse_units,
        baudrate,
        data_bits,
        parity,
        stop_bits,
        elevated,
        round_robin,
        led_active_low,
    }
}

/// Look up a key at the top level or inside a section
fn lookup<'a>(config: &'a toml::Value, section: Option<&str>, key: &str) -> Option<&'a toml::Value> {
    match section {
        Some(section) => config.get(section)?.get(key),
        None => config.get(key),
    }
}

fn field_name(section: Option<&str>, key: &str) -> String {
    match section {
        Some(section) => format!("[{}] {}", section, key),
        None => key.to_string(),
    }
}

/// Required integer within `min..=max`
fn int_field(
    config: &toml::Value,
    section: Option<&str>,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> i64 {
    match lookup(config, section, key) {
        Some(toml::Value::Integer(value)) if (min..=max).contains(value) => *value,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("{} must be {}-{}", field_name(section, key), min, max));
            min
        }
        Some(_) => {
            errors.push(format!("{} must be an integer", field_name(section, key)));
            min
        }
        None => {
            errors.push(format!("Missing {}", field_name(section, key)));
            min
        }
    }
}

/// Optional string
fn str_field(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match lookup(config, Some(section), key) {
        Some(toml::Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.push(format!("{} must be a string", field_name(Some(section), key)));
            None
        }
        None => None,
    }
}

/// Optional boolean
fn bool_field(config: &toml::Value, section: &str, key: &str, default: bool, errors: &mut Vec<String>) -> bool {
    match lookup(config, Some(section), key) {
        Some(toml::Value::Boolean(value)) => *value,
        Some(_) => {
            errors.push(format!("{} must be true or false", field_name(Some(section), key)));
            default
        }
        None => default,
    }
}

/// Write timing.rs for `include!` from src/config.rs
fn generate_timing(timing: &Timing) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let code = format!(
        "// Generated by build.rs from timing.toml\n\
         pub const UNIT_US: u32 = {};\n\
         pub const TIMER_A_TOP: u16 = {};\n\
         pub const TIMER_B_TOP: u16 = {};\n\
         pub const PULSE_UNITS: u32 = {};\n\
         pub const BAUDRATE: u32 = {};\n\
         pub const DATA_BITS: DataBits = DataBits::{};\n\
         pub const PARITY: Parity = Parity::{};\n\
         pub const STOP_BITS: StopBits = StopBits::{};\n\
         pub const ELEVATED: Option<SourceId> = {};\n\
         pub const ROUND_ROBIN: bool = {};\n\
         pub const LED_ACTIVE_LOW: bool = {};\n",
        timing.unit_us,
        timing.a_top,
        timing.b_top,
        timing.pulse_units,
        timing.baudrate,
        timing.data_bits,
        timing.parity,
        timing.stop_bits,
        timing.elevated,
        timing.round_robin,
        timing.led_active_low,
    );

    fs::write(out_dir.join("timing.rs"), code).unwrap();
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
