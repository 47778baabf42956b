// Coffee: keep the display awake from the macOS menu bar.
// Uses Cocoa/AppKit via objc2 and IOKit power assertions.

#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

#[cfg(target_os = "macos")]
mod app;
mod autostart;
#[cfg(target_os = "macos")]
mod power;
#[cfg(target_os = "macos")]
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

#[cfg(target_os = "macos")]
fn run() -> Result<(), CoffeeError> {
    app::run()
}

#[cfg(not(target_os = "macos"))]
fn run() -> Result<(), CoffeeError> {
    Err(CoffeeError::UnsupportedPlatform(std::env::consts::OS.to_string()))
}
