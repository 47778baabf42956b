// Toggle controller: the single owner of inhibition state.
//
// Native front ends deliver menu clicks here and re-render whatever
// `presentation()` / `menu()` say afterwards. All calls happen on the host
// UI thread, one event at a time.

use tracing::{debug, info, warn};

use crate::error::CoffeeError;
use crate::login::LoginItems;
use crate::platform::IconKind;
use crate::power::PowerInhibitor;
use crate::tray::{MenuAction, MenuItem, TrayShell};
use crate::PRODUCT_NAME;

/// Reason string handed to the OS when inhibition starts.
pub const INHIBIT_REASON: &str = "Coffee is keeping the display awake";

const AUTHOR: &str = "Nathan Buchar";
const LABEL_ACTIVATE: &str = "Activate";
const LABEL_DEACTIVATE: &str = "Deactivate";
const LABEL_OPEN_AT_LOGIN: &str = "Open at Login";
const LABEL_QUIT: &str = "Quit";

/// Whether display sleep is being prevented. The handle exists exactly
/// while active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InhibitionState<H> {
    Inactive,
    Active(H),
}

impl<H> Default for InhibitionState<H> {
    fn default() -> Self {
        InhibitionState::Inactive
    }
}

impl<H> InhibitionState<H> {
    pub fn is_active(&self) -> bool {
        matches!(self, InhibitionState::Active(_))
    }

    pub fn handle(&self) -> Option<&H> {
        match self {
            InhibitionState::Active(handle) => Some(handle),
            InhibitionState::Inactive => None,
        }
    }
}

/// Everything a tray needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub icon: IconKind,
    /// Name of the action a click performs, i.e. the opposite of the
    /// current state.
    pub toggle_label: &'static str,
    pub tooltip: String,
}

impl Presentation {
    pub fn for_state(active: bool, version: &str) -> Self {
        let (icon, toggle_label) = if active {
            (IconKind::Enabled, LABEL_DEACTIVATE)
        } else {
            (IconKind::Disabled, LABEL_ACTIVATE)
        };
        Self {
            icon,
            toggle_label,
            tooltip: tooltip(version),
        }
    }
}

pub fn tooltip(version: &str) -> String {
    format!("{PRODUCT_NAME} v{version}\nBy {AUTHOR}")
}

/// What the front end should do after a menu action was handled.
#[derive(Debug)]
pub enum ActionOutcome {
    Continue,
    /// The login item could not be changed; show it to the user.
    LoginItemFailed(CoffeeError),
    /// Inhibition has been released; the host should exit.
    Quit,
}

pub struct ToggleController<P: PowerInhibitor, L: LoginItems> {
    inhibitor: P,
    login: L,
    state: InhibitionState<P::Handle>,
    version: String,
}

impl<P: PowerInhibitor, L: LoginItems> ToggleController<P, L> {
    /// Starts inactive. `version` is the host application's version, shown in
    /// the tooltip.
    pub fn new(inhibitor: P, login: L, version: impl Into<String>) -> Self {
        Self {
            inhibitor,
            login,
            state: InhibitionState::Inactive,
            version: version.into(),
        }
    }

    pub fn state(&self) -> &InhibitionState<P::Handle> {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Flips between inactive and active. Failures are logged and leave the
    /// previous state in place, so the user can simply click again.
    pub fn toggle(&mut self) -> &InhibitionState<P::Handle> {
        if self.state.is_active() {
            self.deactivate();
        } else {
            self.activate();
        }
        &self.state
    }

    fn activate(&mut self) {
        debug!("activating");
        match self.inhibitor.start(INHIBIT_REASON) {
            Ok(handle) => {
                info!(?handle, "display sleep inhibited");
                self.state = InhibitionState::Active(handle);
            }
            Err(e) => warn!(error = %e, "could not start display-sleep inhibition"),
        }
    }

    /// Stops inhibition if active. Local state is only cleared once the host
    /// confirms the handle is gone; returns whether the controller ended up
    /// inactive.
    pub fn deactivate(&mut self) -> bool {
        let InhibitionState::Active(handle) = &self.state else {
            return true;
        };

        debug!(?handle, "deactivating");
        self.inhibitor.stop(handle);
        if self.inhibitor.is_active(handle) {
            warn!(?handle, "inhibitor still active after stop request, keeping state");
            return false;
        }

        info!(?handle, "display sleep allowed again");
        self.state = InhibitionState::Inactive;
        true
    }

    pub fn presentation(&self) -> Presentation {
        Presentation::for_state(self.state.is_active(), &self.version)
    }

    /// Live registration value from the host.
    pub fn open_at_login(&self) -> bool {
        self.login.is_enabled()
    }

    pub fn open_at_login_changed(&mut self, checked: bool) -> Result<(), CoffeeError> {
        debug!(checked, "updating login item");
        self.login.set_enabled(checked).inspect_err(|e| {
            warn!(error = %e, checked, "login item update failed");
        })
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        let presentation = self.presentation();
        vec![
            MenuItem::Action {
                label: presentation.toggle_label.to_string(),
                action: MenuAction::Toggle,
            },
            MenuItem::Separator,
            MenuItem::Checkbox {
                label: LABEL_OPEN_AT_LOGIN.to_string(),
                checked: self.open_at_login(),
                action: MenuAction::OpenAtLogin,
            },
            MenuItem::Action {
                label: LABEL_QUIT.to_string(),
                action: MenuAction::Quit,
            },
        ]
    }

    /// Pushes icon, menu and tooltip to the tray.
    pub fn render<S: TrayShell>(&self, shell: &mut S) {
        let presentation = self.presentation();
        shell.set_icon(presentation.icon);
        shell.set_menu(&self.menu());
        shell.set_tooltip(&presentation.tooltip);
    }

    /// Runs a menu action and re-renders the tray.
    pub fn handle_action<S: TrayShell>(&mut self, action: MenuAction, shell: &mut S) -> ActionOutcome {
        match action {
            MenuAction::Toggle => {
                self.toggle();
                self.render(shell);
                ActionOutcome::Continue
            }
            MenuAction::OpenAtLogin => {
                let checked = !self.open_at_login();
                let result = self.open_at_login_changed(checked);
                self.render(shell);
                match result {
                    Ok(()) => ActionOutcome::Continue,
                    Err(e) => ActionOutcome::LoginItemFailed(e),
                }
            }
            MenuAction::Quit => {
                info!("quitting");
                self.deactivate();
                ActionOutcome::Quit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inhibitor whose stop can be told to not take effect.
    #[derive(Default)]
    struct FakeInhibitor {
        next_id: u32,
        active: Vec<u32>,
        stop_is_ignored: bool,
        start_fails: bool,
        reasons: Vec<String>,
    }

    impl PowerInhibitor for FakeInhibitor {
        type Handle = u32;

        fn start(&mut self, reason: &str) -> Result<u32, CoffeeError> {
            if self.start_fails {
                return Err(CoffeeError::Inhibitor("denied".into()));
            }
            self.next_id += 1;
            self.active.push(self.next_id);
            self.reasons.push(reason.to_string());
            Ok(self.next_id)
        }

        fn stop(&mut self, handle: &u32) {
            if !self.stop_is_ignored {
                self.active.retain(|id| id != handle);
            }
        }

        fn is_active(&self, handle: &u32) -> bool {
            self.active.contains(handle)
        }
    }

    #[derive(Default)]
    struct FakeLogin {
        enabled: bool,
        fails: bool,
    }

    impl LoginItems for FakeLogin {
        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn set_enabled(&mut self, enabled: bool) -> Result<(), CoffeeError> {
            if self.fails {
                return Err(CoffeeError::LoginItem("not permitted".into()));
            }
            self.enabled = enabled;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingShell {
        icon: Option<IconKind>,
        menu: Vec<MenuItem>,
        tooltip: String,
        renders: usize,
    }

    impl TrayShell for RecordingShell {
        fn set_icon(&mut self, icon: IconKind) {
            self.icon = Some(icon);
            self.renders += 1;
        }

        fn set_menu(&mut self, items: &[MenuItem]) {
            self.menu = items.to_vec();
        }

        fn set_tooltip(&mut self, text: &str) {
            self.tooltip = text.to_string();
        }
    }

    fn controller() -> ToggleController<FakeInhibitor, FakeLogin> {
        ToggleController::new(FakeInhibitor::default(), FakeLogin::default(), "2.1.0")
    }

    #[test]
    fn starts_inactive() {
        let c = controller();
        assert_eq!(*c.state(), InhibitionState::Inactive);
        assert!(c.state().handle().is_none());
        let p = c.presentation();
        assert_eq!(p.icon, IconKind::Disabled);
        assert_eq!(p.toggle_label, "Activate");
    }

    #[test]
    fn toggle_from_inactive_activates() {
        let mut c = controller();
        c.toggle();
        assert!(c.is_active());
        assert_eq!(c.state().handle(), Some(&1));
        let p = c.presentation();
        assert_eq!(p.icon, IconKind::Enabled);
        assert_eq!(p.toggle_label, "Deactivate");
        assert_eq!(c.inhibitor.reasons, vec![INHIBIT_REASON.to_string()]);
    }

    #[test]
    fn confirmed_stop_deactivates() {
        let mut c = controller();
        c.toggle();
        c.toggle();
        assert!(!c.is_active());
        assert!(c.inhibitor.active.is_empty());
        let p = c.presentation();
        assert_eq!(p.icon, IconKind::Disabled);
        assert_eq!(p.toggle_label, "Activate");
    }

    #[test]
    fn unconfirmed_stop_keeps_state_active() {
        let mut c = controller();
        c.toggle();
        let before = c.presentation();

        c.inhibitor.stop_is_ignored = true;
        c.toggle();

        assert!(c.is_active());
        assert_eq!(c.state().handle(), Some(&1));
        assert_eq!(c.presentation(), before);
    }

    #[test]
    fn retry_after_unconfirmed_stop_succeeds() {
        let mut c = controller();
        c.toggle();
        c.inhibitor.stop_is_ignored = true;
        c.toggle();
        c.inhibitor.stop_is_ignored = false;
        c.toggle();
        assert!(!c.is_active());
    }

    #[test]
    fn failed_start_leaves_state_inactive() {
        let mut c = controller();
        c.inhibitor.start_fails = true;
        c.toggle();
        assert!(!c.is_active());
        assert_eq!(c.presentation().toggle_label, "Activate");
    }

    #[test]
    fn presentation_is_stable_between_toggles() {
        let mut c = controller();
        assert_eq!(c.presentation(), c.presentation());
        c.toggle();
        assert_eq!(c.presentation(), c.presentation());
    }

    #[test]
    fn tooltip_embeds_version() {
        let c = controller();
        assert_eq!(c.presentation().tooltip, "Coffee v2.1.0\nBy Nathan Buchar");
    }

    #[test]
    fn menu_has_toggle_separator_login_quit() {
        let c = controller();
        let menu = c.menu();
        assert_eq!(menu.len(), 4);
        assert_eq!(
            menu[0],
            MenuItem::Action {
                label: "Activate".into(),
                action: MenuAction::Toggle
            }
        );
        assert_eq!(menu[1], MenuItem::Separator);
        assert_eq!(
            menu[2],
            MenuItem::Checkbox {
                label: "Open at Login".into(),
                checked: false,
                action: MenuAction::OpenAtLogin
            }
        );
        assert_eq!(menu[3].action(), Some(MenuAction::Quit));
    }

    #[test]
    fn menu_reads_login_state_live() {
        let mut c = controller();
        c.login.enabled = true;
        assert!(matches!(c.menu()[2], MenuItem::Checkbox { checked: true, .. }));
        c.login.enabled = false;
        assert!(matches!(c.menu()[2], MenuItem::Checkbox { checked: false, .. }));
    }

    #[test]
    fn open_at_login_changed_delegates() {
        let mut c = controller();
        c.open_at_login_changed(true).unwrap();
        assert!(c.open_at_login());
        c.open_at_login_changed(true).unwrap();
        assert!(c.open_at_login());
        c.open_at_login_changed(false).unwrap();
        assert!(!c.open_at_login());
    }

    #[test]
    fn render_pushes_everything() {
        let mut c = controller();
        let mut shell = RecordingShell::default();
        c.toggle();
        c.render(&mut shell);
        assert_eq!(shell.icon, Some(IconKind::Enabled));
        assert_eq!(shell.menu[0].label(), Some("Deactivate"));
        assert!(shell.tooltip.starts_with("Coffee v2.1.0"));
    }

    #[test]
    fn toggle_action_rerenders() {
        let mut c = controller();
        let mut shell = RecordingShell::default();
        let outcome = c.handle_action(MenuAction::Toggle, &mut shell);
        assert!(matches!(outcome, ActionOutcome::Continue));
        assert_eq!(shell.renders, 1);
        assert_eq!(shell.icon, Some(IconKind::Enabled));
    }

    #[test]
    fn login_action_flips_registration() {
        let mut c = controller();
        let mut shell = RecordingShell::default();
        c.handle_action(MenuAction::OpenAtLogin, &mut shell);
        assert!(c.open_at_login());
        assert!(matches!(shell.menu[2], MenuItem::Checkbox { checked: true, .. }));
    }

    #[test]
    fn failed_login_action_reports_and_shows_host_value() {
        let mut c = controller();
        c.login.fails = true;
        let mut shell = RecordingShell::default();
        let outcome = c.handle_action(MenuAction::OpenAtLogin, &mut shell);
        assert!(matches!(outcome, ActionOutcome::LoginItemFailed(CoffeeError::LoginItem(_))));
        assert!(matches!(shell.menu[2], MenuItem::Checkbox { checked: false, .. }));
    }

    #[test]
    fn quit_releases_inhibition() {
        let mut c = controller();
        let mut shell = RecordingShell::default();
        c.toggle();
        let outcome = c.handle_action(MenuAction::Quit, &mut shell);
        assert!(matches!(outcome, ActionOutcome::Quit));
        assert!(!c.is_active());
        assert!(c.inhibitor.active.is_empty());
    }

    #[test]
    fn deactivate_when_inactive_is_a_no_op() {
        let mut c = controller();
        assert!(c.deactivate());
        assert!(!c.is_active());
    }
}
