// macOS "Open at Login" using a per-user LaunchAgent.
//
// Strategy: a plist in ~/Library/LaunchAgents/ with RunAtLoad starts the
// app on login. Its presence is the registration state.

use std::fs;
use std::path::{Path, PathBuf};

use coffee_shared::{CoffeeError, LoginItems};
use tracing::info;

const AGENT_LABEL: &str = "com.nathanbuchar.coffee";

fn plist_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join("Library")
        .join("LaunchAgents")
        .join(format!("{AGENT_LABEL}.plist"))
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn plist_contents(exe: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{AGENT_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <false/>
</dict>
</plist>"#,
        xml_escape(&exe.to_string_lossy())
    )
}

pub struct LaunchAgent {
    plist: PathBuf,
}

impl LaunchAgent {
    pub fn new() -> Self {
        Self::at(plist_path())
    }

    pub fn at(plist: PathBuf) -> Self {
        Self { plist }
    }
}

impl LoginItems for LaunchAgent {
    fn is_enabled(&self) -> bool {
        self.plist.exists()
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), CoffeeError> {
        if enabled {
            let exe = std::env::current_exe()?;
            if let Some(parent) = self.plist.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.plist, plist_contents(&exe))?;
            info!(path = %self.plist.display(), "launch agent installed");
        } else if self.plist.exists() {
            fs::remove_file(&self.plist)?;
            info!(path = %self.plist.display(), "launch agent removed");
        }
        Ok(())
    }
}
