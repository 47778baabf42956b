// Error type shared by the core and the native front ends.

/// Errors produced by Coffee.
#[derive(Debug, thiserror::Error)]
pub enum CoffeeError {
    #[error("unsupported platform \"{0}\"")]
    UnsupportedPlatform(String),

    #[error("display-sleep inhibitor error: {0}")]
    Inhibitor(String),

    #[error("login item error: {0}")]
    LoginItem(String),

    #[error("tray error: {0}")]
    Tray(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
