// macOS menu bar status item using NSStatusBar.
//
// The menu is rebuilt from the shared model on every render. Items have no
// explicit target; their actions travel the responder chain to the app
// delegate (see app.rs).

use std::path::Path;

use coffee_shared::{IconKind, MenuAction, MenuItem, ResourceBundle, TrayShell};
use objc2::rc::Retained;
use objc2::runtime::Sel;
use objc2::{sel, AllocAnyThread, MainThreadMarker};
use objc2_app_kit::{
    NSControlStateValueOff, NSControlStateValueOn, NSImage, NSMenu, NSMenuItem, NSStatusBar,
    NSStatusItem, NSVariableStatusItemLength,
};
use objc2_foundation::NSString;
use tracing::warn;

pub struct StatusTray {
    mtm: MainThreadMarker,
    item: Retained<NSStatusItem>,
    resources: ResourceBundle,
}

impl StatusTray {
    pub fn new(mtm: MainThreadMarker, resources: ResourceBundle) -> Self {
        let status_bar = NSStatusBar::systemStatusBar(mtm);
        let item = status_bar.statusItemWithLength(NSVariableStatusItemLength);
        Self {
            mtm,
            item,
            resources,
        }
    }
}

impl Drop for StatusTray {
    fn drop(&mut self) {
        NSStatusBar::systemStatusBar(self.mtm).removeStatusItem(&self.item);
    }
}

impl TrayShell for StatusTray {
    fn set_icon(&mut self, icon: IconKind) {
        let Some(button) = self.item.button(self.mtm) else {
            return;
        };

        let path = self.resources.icon(icon);
        match load_image(path) {
            Some(image) => {
                unsafe {
                    image.setTemplate(true);
                    button.setImage(Some(&image));
                }
                button.setTitle(&NSString::from_str(""));
            }
            None => {
                // Keep the menu reachable even without assets
                warn!(path = %path.display(), "tray icon missing, falling back to text");
                unsafe { button.setImage(None) };
                button.setTitle(&NSString::from_str(fallback_title(icon)));
            }
        }
    }

    fn set_menu(&mut self, items: &[MenuItem]) {
        let menu = NSMenu::new(self.mtm);
        for item in items {
            menu.addItem(&native_item(self.mtm, item));
        }
        self.item.setMenu(Some(&menu));
    }

    fn set_tooltip(&mut self, text: &str) {
        if let Some(button) = self.item.button(self.mtm) {
            unsafe { button.setToolTip(Some(&NSString::from_str(text))) };
        }
    }
}

pub(crate) fn load_image(path: &Path) -> Option<Retained<NSImage>> {
    let path = NSString::from_str(&path.to_string_lossy());
    unsafe { NSImage::initWithContentsOfFile(NSImage::alloc(), &path) }
}

fn fallback_title(icon: IconKind) -> &'static str {
    match icon {
        IconKind::Enabled => "☕ On",
        IconKind::Disabled => "☕ Off",
    }
}

fn selector(action: MenuAction) -> Sel {
    match action {
        MenuAction::Toggle => sel!(toggleKeepAwake:),
        MenuAction::OpenAtLogin => sel!(toggleOpenAtLogin:),
        MenuAction::Quit => sel!(quitCoffee:),
    }
}

fn key_equivalent(action: MenuAction) -> &'static str {
    match action {
        MenuAction::Quit => "q",
        MenuAction::Toggle | MenuAction::OpenAtLogin => "",
    }
}

fn native_item(mtm: MainThreadMarker, item: &MenuItem) -> Retained<NSMenuItem> {
    match item {
        MenuItem::Separator => NSMenuItem::separatorItem(mtm),
        MenuItem::Action { label, action } => action_item(mtm, label, *action),
        MenuItem::Checkbox {
            label,
            checked,
            action,
        } => {
            let native = action_item(mtm, label, *action);
            let state = if *checked {
                NSControlStateValueOn
            } else {
                NSControlStateValueOff
            };
            unsafe { native.setState(state) };
            native
        }
    }
}

fn action_item(mtm: MainThreadMarker, label: &str, action: MenuAction) -> Retained<NSMenuItem> {
    let title = NSString::from_str(label);
    let key = NSString::from_str(key_equivalent(action));
    unsafe {
        NSMenuItem::initWithTitle_action_keyEquivalent(
            mtm.alloc(),
            &title,
            Some(selector(action)),
            &key,
        )
    }
}
