// Notification-area icon with context menu

use std::collections::HashMap;

use coffee_shared::{CoffeeError, IconKind, MenuAction, MenuItem, ResourceBundle, TrayShell};
use tracing::warn;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY,
    NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, DestroyIcon, DestroyMenu, GetCursorPos, LoadIconW, LoadImageW,
    SetForegroundWindow, TrackPopupMenu, HICON, HMENU, IDI_APPLICATION, IMAGE_ICON, LR_DEFAULTSIZE,
    LR_LOADFROMFILE, MENU_ITEM_FLAGS, MF_CHECKED, MF_SEPARATOR, MF_STRING, TPM_BOTTOMALIGN,
    TPM_LEFTALIGN, TPM_NONOTIFY, TPM_RETURNCMD, WM_APP,
};

/// Custom message ID for tray icon callbacks
pub const WM_TRAY_ICON: u32 = WM_APP + 1;

const TRAY_UID: u32 = 1;

/// Menu item IDs
const IDM_TOGGLE: u32 = 1001;
const IDM_OPEN_AT_LOGIN: u32 = 1002;
const IDM_QUIT: u32 = 1003;

fn wide_str(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn command_id(action: MenuAction) -> u32 {
    match action {
        MenuAction::Toggle => IDM_TOGGLE,
        MenuAction::OpenAtLogin => IDM_OPEN_AT_LOGIN,
        MenuAction::Quit => IDM_QUIT,
    }
}

fn action_for_command(id: u32) -> Option<MenuAction> {
    match id {
        IDM_TOGGLE => Some(MenuAction::Toggle),
        IDM_OPEN_AT_LOGIN => Some(MenuAction::OpenAtLogin),
        IDM_QUIT => Some(MenuAction::Quit),
        _ => None,
    }
}

pub struct NotifyTray {
    hwnd: HWND,
    resources: ResourceBundle,
    icons: HashMap<IconKind, HICON>,
    menu: Vec<MenuItem>,
}

impl NotifyTray {
    /// Adds the icon to the notification area.
    pub fn new(hwnd: HWND, resources: ResourceBundle) -> Result<Self, CoffeeError> {
        let nid = NOTIFYICONDATAW {
            uFlags: NIF_MESSAGE,
            uCallbackMessage: WM_TRAY_ICON,
            ..base_data(hwnd)
        };
        if !unsafe { Shell_NotifyIconW(NIM_ADD, &nid) }.as_bool() {
            return Err(CoffeeError::Tray("Shell_NotifyIconW(NIM_ADD) failed".into()));
        }
        Ok(Self {
            hwnd,
            resources,
            icons: HashMap::new(),
            menu: Vec::new(),
        })
    }

    fn icon_handle(&mut self, kind: IconKind) -> HICON {
        if let Some(icon) = self.icons.get(&kind) {
            return *icon;
        }

        let path = self.resources.icon(kind);
        let wide_path = wide_str(&path.to_string_lossy());
        let loaded = unsafe {
            LoadImageW(
                None,
                PCWSTR(wide_path.as_ptr()),
                IMAGE_ICON,
                0,
                0,
                LR_LOADFROMFILE | LR_DEFAULTSIZE,
            )
        };
        match loaded {
            Ok(handle) => {
                let icon = HICON(handle.0);
                self.icons.insert(kind, icon);
                icon
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "tray icon missing, using default");
                unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default()
            }
        }
    }

    fn modify(&self, nid: &NOTIFYICONDATAW) {
        if !unsafe { Shell_NotifyIconW(NIM_MODIFY, nid) }.as_bool() {
            warn!("Shell_NotifyIconW(NIM_MODIFY) failed");
        }
    }

    /// Shows the context menu at the cursor and returns the chosen action.
    pub fn show_context_menu(&self) -> Option<MenuAction> {
        unsafe {
            let menu = CreatePopupMenu().ok()?;
            for item in &self.menu {
                let (flags, id, text) = match item {
                    MenuItem::Separator => (MF_SEPARATOR, 0, None),
                    MenuItem::Action { label, action } => {
                        (MF_STRING, command_id(*action), Some(wide_str(label)))
                    }
                    MenuItem::Checkbox {
                        label,
                        checked,
                        action,
                    } => {
                        let flags = if *checked {
                            MF_STRING | MF_CHECKED
                        } else {
                            MF_STRING
                        };
                        (flags, command_id(*action), Some(wide_str(label)))
                    }
                };
                append(menu, flags, id, text.as_deref());
            }

            let mut pt = POINT::default();
            let _ = GetCursorPos(&mut pt);

            // Required for TrackPopupMenu to work correctly with tray icons
            let _ = SetForegroundWindow(self.hwnd);

            let chosen = TrackPopupMenu(
                menu,
                TPM_LEFTALIGN | TPM_BOTTOMALIGN | TPM_RETURNCMD | TPM_NONOTIFY,
                pt.x,
                pt.y,
                Some(0),
                self.hwnd,
                None,
            );

            let _ = DestroyMenu(menu);
            action_for_command(chosen.0 as u32)
        }
    }
}

unsafe fn append(
    menu: HMENU,
    flags: MENU_ITEM_FLAGS,
    id: u32,
    text: Option<&[u16]>,
) {
    let text = text.map_or(PCWSTR::null(), |t| PCWSTR(t.as_ptr()));
    if let Err(e) = AppendMenuW(menu, flags, id as usize, text) {
        warn!(error = %e, id, "AppendMenuW failed");
    }
}

fn base_data(hwnd: HWND) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_UID,
        ..Default::default()
    }
}

impl TrayShell for NotifyTray {
    fn set_icon(&mut self, icon: IconKind) {
        let nid = NOTIFYICONDATAW {
            uFlags: NIF_ICON,
            hIcon: self.icon_handle(icon),
            ..base_data(self.hwnd)
        };
        self.modify(&nid);
    }

    fn set_menu(&mut self, items: &[MenuItem]) {
        self.menu = items.to_vec();
    }

    fn set_tooltip(&mut self, text: &str) {
        let mut nid = NOTIFYICONDATAW {
            uFlags: NIF_TIP,
            ..base_data(self.hwnd)
        };
        // szTip holds 128 UTF-16 units including the terminator
        let tip: Vec<u16> = text.encode_utf16().take(nid.szTip.len() - 1).collect();
        nid.szTip[..tip.len()].copy_from_slice(&tip);
        self.modify(&nid);
    }
}

impl Drop for NotifyTray {
    fn drop(&mut self) {
        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &base_data(self.hwnd));
            for icon in self.icons.values() {
                let _ = DestroyIcon(*icon);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_ids_round_trip() {
        for action in [MenuAction::Toggle, MenuAction::OpenAtLogin, MenuAction::Quit] {
            assert_eq!(action_for_command(command_id(action)), Some(action));
        }
    }

    #[test]
    fn dismissed_menu_maps_to_no_action() {
        assert_eq!(action_for_command(0), None);
    }
}
