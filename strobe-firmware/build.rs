//! Build script for strobe-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates strobe.toml and compiles it into constants

use std::env;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use strobe_core::{CpuSpeed, StrobeConfig};

fn main() {
    setup_linker();
    let config = load_config();
    check_cpu_feature(&config);
    generate_constants(&config);
}

/// Set up linker search paths and scripts
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
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate strobe.toml
fn load_config() -> StrobeConfig {
    println!("cargo:rerun-if-changed=strobe.toml");

    let config_path = Path::new("strobe.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: strobe.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a strobe.toml configuration file.         ║\n\
            ║  Please create one in the strobe-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read strobe.toml", e),
    };

    let config: StrobeConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail("Invalid strobe.toml", e),
    };

    if let Err(e) = config.validate() {
        fail("Invalid value in strobe.toml", e);
    }

    println!("cargo:warning=strobe.toml validated successfully");
    config
}

/// The delay loop is sized by cargo feature, the config only restates it
fn check_cpu_feature(config: &StrobeConfig) {
    let built_for = if env::var_os("CARGO_FEATURE_CPU_48MHZ").is_some() {
        CpuSpeed::Mhz48
    } else {
        CpuSpeed::Mhz120
    };

    if config.cpu.frequency_hz != built_for {
        fail(
            "CPU speed mismatch",
            format!(
                "strobe.toml says {} Hz but the firmware is built for {} Hz;\n\
                 select the matching `cpu-48mhz` / `cpu-120mhz` feature",
                config.cpu.frequency_hz.hz(),
                built_for.hz()
            ),
        );
    }
}

/// Write OUT_DIR/strobe_config.rs
fn generate_constants(config: &StrobeConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    // validate() already accepted the cycle section
    let cycle = config.cycle.settings().unwrap();
    let clock_source = if config.clock.crystalless {
        "UltraLowPower"
    } else {
        "Crystal"
    };

    let code = format!(
        "// Generated from strobe.toml by build.rs\n\
         \n\
         pub const CLOCK_SOURCE: strobe_hal_samd51::clock::LowPowerClock =\n    \
             strobe_hal_samd51::clock::LowPowerClock::{clock_source};\n\
         \n\
         pub const CYCLE: strobe_hal::CycleSettings = strobe_hal::CycleSettings {{\n    \
             clock_hz: {clock_hz},\n    \
             prescaler: strobe_hal::Prescaler::{prescaler:?},\n    \
             period_ticks: {period},\n    \
             short_ticks: {short},\n\
         }};\n\
         \n\
         pub const LED_GROUP: u8 = {group};\n\
         pub const LED_PIN: u8 = {pin};\n\
         pub const LED_NAME: &str = \"{name}\";\n\
         \n\
         pub const IDLE_COLOR: strobe_core::Grb = strobe_core::Grb::from_u32({idle:#08x});\n",
        clock_hz = cycle.clock_hz,
        prescaler = cycle.prescaler,
        period = cycle.period_ticks,
        short = cycle.short_ticks,
        group = config.led.pin.group,
        pin = config.led.pin.pin,
        name = config.led.pin,
        idle = config.led.idle_color.into_u32(),
    );

    fs::write(out_dir.join("strobe_config.rs"), code).unwrap();
}

/// Abort the build with a boxed message
fn fail(title: &str, detail: impl Display) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(&detail.to_string())
    );
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
