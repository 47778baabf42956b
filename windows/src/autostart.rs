// Registry-based "Open at Login" for Windows
// Uses HKCU\Software\Microsoft\Windows\CurrentVersion\Run

use coffee_shared::{CoffeeError, LoginItems};
use tracing::info;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, WIN32_ERROR};
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SAM_FLAGS, REG_SZ,
};

const RUN_KEY: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Run";
const VALUE_NAME: &str = "Coffee";

fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn registry_error(op: &str, code: WIN32_ERROR) -> CoffeeError {
    CoffeeError::LoginItem(format!("{op} failed with code {}", code.0))
}

/// Open Run key, closed on drop.
struct RunKeyHandle(HKEY);

impl RunKeyHandle {
    fn open(access: REG_SAM_FLAGS) -> Result<Self, CoffeeError> {
        let key_path = wide_string(RUN_KEY);
        let mut hkey = HKEY::default();
        let result = unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR(key_path.as_ptr()),
                Some(0),
                access,
                &mut hkey,
            )
        };
        if result.is_err() {
            return Err(registry_error("RegOpenKeyExW", result));
        }
        Ok(Self(hkey))
    }
}

impl Drop for RunKeyHandle {
    fn drop(&mut self) {
        let _ = unsafe { RegCloseKey(self.0) };
    }
}

#[derive(Debug, Default)]
pub struct RunKey;

impl RunKey {
    fn enable(&self) -> Result<(), CoffeeError> {
        let key = RunKeyHandle::open(KEY_WRITE)?;
        let exe_path = std::env::current_exe()?;
        let command = format!("\"{}\"", exe_path.display());
        let value_name = wide_string(VALUE_NAME);
        let data = wide_string(&command);
        let data_bytes =
            unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, data.len() * 2) };

        let result = unsafe {
            RegSetValueExW(
                key.0,
                PCWSTR(value_name.as_ptr()),
                Some(0),
                REG_SZ,
                Some(data_bytes),
            )
        };
        if result.is_err() {
            return Err(registry_error("RegSetValueExW", result));
        }
        info!(%command, "login item registered");
        Ok(())
    }

    fn disable(&self) -> Result<(), CoffeeError> {
        let key = RunKeyHandle::open(KEY_WRITE)?;
        let value_name = wide_string(VALUE_NAME);
        let result = unsafe { RegDeleteValueW(key.0, PCWSTR(value_name.as_ptr())) };
        if result.is_err() && result != ERROR_FILE_NOT_FOUND {
            return Err(registry_error("RegDeleteValueW", result));
        }
        info!("login item removed");
        Ok(())
    }
}

impl LoginItems for RunKey {
    fn is_enabled(&self) -> bool {
        let Ok(key) = RunKeyHandle::open(KEY_READ) else {
            return false;
        };
        let value_name = wide_string(VALUE_NAME);
        let result = unsafe {
            RegQueryValueExW(key.0, PCWSTR(value_name.as_ptr()), None, None, None, None)
        };
        result.is_ok()
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), CoffeeError> {
        if enabled {
            self.enable()
        } else {
            self.disable()
        }
    }
}
