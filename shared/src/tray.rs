// Tray menu model and the presentation sink each native tray implements.

use crate::platform::IconKind;

/// What a menu item does when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    /// Start or stop keeping the display awake.
    Toggle,
    /// Flip the "Open at Login" registration.
    OpenAtLogin,
    Quit,
}

/// A single entry of the tray context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Action {
        label: String,
        action: MenuAction,
    },
    Checkbox {
        label: String,
        checked: bool,
        action: MenuAction,
    },
    Separator,
}

impl MenuItem {
    pub fn label(&self) -> Option<&str> {
        match self {
            MenuItem::Action { label, .. } | MenuItem::Checkbox { label, .. } => Some(label),
            MenuItem::Separator => None,
        }
    }

    pub fn action(&self) -> Option<MenuAction> {
        match self {
            MenuItem::Action { action, .. } | MenuItem::Checkbox { action, .. } => Some(*action),
            MenuItem::Separator => None,
        }
    }
}

/// Status bar icon plus native context menu, owned by the host UI.
pub trait TrayShell {
    fn set_icon(&mut self, icon: IconKind);
    fn set_menu(&mut self, items: &[MenuItem]);
    fn set_tooltip(&mut self, text: &str);
}
