use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use coffee_shared::{
    CoffeeError, IconKind, InhibitionState, LoginItems, MenuAction, MenuItem, PowerInhibitor,
    ToggleController, TrayShell,
};

/// Inhibitor whose stops can be made to fail from the outside.
struct ScriptedInhibitor {
    next: u64,
    live: HashSet<u64>,
    ignore_stop: Rc<Cell<bool>>,
}

impl PowerInhibitor for ScriptedInhibitor {
    type Handle = u64;

    fn start(&mut self, _reason: &str) -> Result<u64, CoffeeError> {
        self.next += 1;
        self.live.insert(self.next);
        Ok(self.next)
    }

    fn stop(&mut self, handle: &u64) {
        if !self.ignore_stop.get() {
            self.live.remove(handle);
        }
    }

    fn is_active(&self, handle: &u64) -> bool {
        self.live.contains(handle)
    }
}

struct NoLogin;

impl LoginItems for NoLogin {
    fn is_enabled(&self) -> bool {
        false
    }

    fn set_enabled(&mut self, _enabled: bool) -> Result<(), CoffeeError> {
        Ok(())
    }
}

#[derive(Default)]
struct Shell {
    icon: Option<IconKind>,
    toggle_label: Option<String>,
}

impl TrayShell for Shell {
    fn set_icon(&mut self, icon: IconKind) {
        self.icon = Some(icon);
    }

    fn set_menu(&mut self, items: &[MenuItem]) {
        self.toggle_label = items.first().and_then(|i| i.label()).map(str::to_string);
    }

    fn set_tooltip(&mut self, _text: &str) {}
}

fn setup() -> (ToggleController<ScriptedInhibitor, NoLogin>, Rc<Cell<bool>>) {
    let ignore_stop = Rc::new(Cell::new(false));
    let inhibitor = ScriptedInhibitor {
        next: 0,
        live: HashSet::new(),
        ignore_stop: ignore_stop.clone(),
    };
    (ToggleController::new(inhibitor, NoLogin, "1.0.0"), ignore_stop)
}

#[test]
fn toggles_alternate_starting_inactive() {
    let (mut controller, _) = setup();
    assert!(!controller.is_active());

    for i in 0..20 {
        let expect_active = i % 2 == 0;
        assert_eq!(controller.toggle().is_active(), expect_active);
        let label = controller.presentation().toggle_label;
        assert_eq!(label == "Activate", !controller.is_active());
    }
}

#[test]
fn each_activation_gets_a_fresh_handle() {
    let (mut controller, _) = setup();
    controller.toggle();
    assert_eq!(*controller.state(), InhibitionState::Active(1));
    controller.toggle();
    controller.toggle();
    assert_eq!(*controller.state(), InhibitionState::Active(2));
}

#[test]
fn stuck_stop_never_desyncs() {
    let (mut controller, ignore_stop) = setup();
    controller.toggle();

    ignore_stop.set(true);
    for _ in 0..5 {
        controller.toggle();
        assert!(controller.is_active());
        assert_eq!(controller.state().handle(), Some(&1));
    }

    ignore_stop.set(false);
    controller.toggle();
    assert!(!controller.is_active());
}

#[test]
fn tray_follows_menu_clicks() {
    let (mut controller, _) = setup();
    let mut shell = Shell::default();
    controller.render(&mut shell);
    assert_eq!(shell.icon, Some(IconKind::Disabled));
    assert_eq!(shell.toggle_label.as_deref(), Some("Activate"));

    controller.handle_action(MenuAction::Toggle, &mut shell);
    assert_eq!(shell.icon, Some(IconKind::Enabled));
    assert_eq!(shell.toggle_label.as_deref(), Some("Deactivate"));

    controller.handle_action(MenuAction::Toggle, &mut shell);
    assert_eq!(shell.icon, Some(IconKind::Disabled));
    assert_eq!(shell.toggle_label.as_deref(), Some("Activate"));
}
