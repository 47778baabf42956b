// Prevents console window in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
#![cfg_attr(not(windows), allow(dead_code))]

#[cfg(windows)]
mod app;
#[cfg(windows)]
mod autostart;
#[cfg(windows)]
mod power;
#[cfg(windows)]
mod tray;

use std::process::ExitCode;

use coffee_shared::CoffeeError;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("coffee: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn run() -> Result<(), CoffeeError> {
    // Single-instance check
    if app::is_already_running() {
        return Ok(());
    }
    app::run()
}

#[cfg(not(windows))]
fn run() -> Result<(), CoffeeError> {
    Err(CoffeeError::UnsupportedPlatform(std::env::consts::OS.to_string()))
}
