// Supported platforms and the icon resources each one ships.
//
// Assets live under `<resource root>/<alias>/`. The set of platforms is
// closed: anything else fails when the bundle is built, before a tray
// exists.

use std::path::{Path, PathBuf};

use crate::error::CoffeeError;

/// Which tray icon to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

/// File names of the icons shipped for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconFiles {
    pub dock: &'static str,
    pub enabled: &'static str,
    pub disabled: &'static str,
}

impl Platform {
    /// Maps an OS name as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Result<Self, CoffeeError> {
        match os {
            "macos" => Ok(Platform::MacOs),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            other => Err(CoffeeError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn current() -> Result<Self, CoffeeError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Directory name the platform's assets are namespaced under.
    pub fn alias(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "win",
            Platform::Linux => "linux",
        }
    }

    pub fn icon_files(self) -> IconFiles {
        match self {
            // Template images so AppKit tints them for light/dark menu bars
            Platform::MacOs => IconFiles {
                dock: "Coffee-Icon.png",
                enabled: "Coffee-Enabled-Template.png",
                disabled: "Coffee-Disabled-Template.png",
            },
            Platform::Windows => IconFiles {
                dock: "Coffee-Icon.ico",
                enabled: "Coffee-Enabled.ico",
                disabled: "Coffee-Disabled.ico",
            },
            Platform::Linux => IconFiles {
                dock: "Coffee-Icon.png",
                enabled: "Coffee-Enabled.png",
                disabled: "Coffee-Disabled.png",
            },
        }
    }
}

/// Resolved icon paths for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBundle {
    platform: Platform,
    dock: PathBuf,
    enabled: PathBuf,
    disabled: PathBuf,
}

impl ResourceBundle {
    pub fn new(platform: Platform, root: &Path) -> Self {
        let dir = root.join(platform.alias());
        let files = platform.icon_files();
        Self {
            platform,
            dock: dir.join(files.dock),
            enabled: dir.join(files.enabled),
            disabled: dir.join(files.disabled),
        }
    }

    /// Bundle for the running OS, rooted at `root` or the default location.
    pub fn for_current(root: Option<&Path>) -> Result<Self, CoffeeError> {
        let platform = Platform::current()?;
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => default_resource_root()?,
        };
        Ok(Self::new(platform, &root))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn icon(&self, kind: IconKind) -> &Path {
        match kind {
            IconKind::Enabled => &self.enabled,
            IconKind::Disabled => &self.disabled,
        }
    }

    pub fn dock_icon(&self) -> &Path {
        &self.dock
    }
}

/// `Contents/Resources` inside a `.app` bundle, else `resources/` beside the
/// executable.
pub fn default_resource_root() -> Result<PathBuf, CoffeeError> {
    let exe = std::env::current_exe()?;
    let exe_dir = exe
        .parent()
        .ok_or_else(|| CoffeeError::Io(std::io::Error::other("executable has no parent dir")))?;
    Ok(resource_root_for(exe_dir))
}

fn resource_root_for(exe_dir: &Path) -> PathBuf {
    // .app/Contents/MacOS/coffee -> .app/Contents/Resources
    if exe_dir.file_name().is_some_and(|name| name == "MacOS") {
        if let Some(contents) = exe_dir.parent() {
            return contents.join("Resources");
        }
    }
    exe_dir.join("resources")
}
