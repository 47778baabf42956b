// Coffee: shared core for the keep-display-awake tray utility.
//
// Everything that does not touch a native API lives here:
//   • ToggleController and the inhibition state it owns
//   • the presentation and menu model the tray shells render
//   • platform / icon resource lookup
//   • configuration, logging setup and the error type
//
// The native front ends (macos/, windows/) implement the collaborator
// traits and forward menu clicks into the controller.

pub mod config;
pub mod controller;
pub mod error;
pub mod login;
pub mod logging;
pub mod platform;
pub mod power;
pub mod tray;

pub use config::AppConfig;
pub use controller::{ActionOutcome, InhibitionState, Presentation, ToggleController};
pub use error::CoffeeError;
pub use login::LoginItems;
pub use platform::{IconKind, Platform, ResourceBundle};
pub use power::PowerInhibitor;
pub use tray::{MenuAction, MenuItem, TrayShell};

/// Product name shown in the tooltip and used for config paths.
pub const PRODUCT_NAME: &str = "Coffee";
