// macOS application lifecycle: NSApplication setup and the app delegate.
//
// This is the entry point for the Cocoa application. It:
//   • Loads the config and installs logging
//   • Locates icon resources (fails on unsupported platforms)
//   • Picks the activation policy (Dock icon only in debug mode)
//   • Hands the toggle controller to the delegate and runs the loop
//
// The delegate owns the controller and the status item. Menu actions reach
// it through the responder chain.

use std::cell::RefCell;

use objc2::rc::Retained;
use objc2::runtime::{AnyObject, ProtocolObject};
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{
    NSAlert, NSAlertStyle, NSApplication, NSApplicationActivationPolicy, NSApplicationDelegate,
};
use objc2_foundation::{NSNotification, NSObject, NSObjectProtocol, NSString};
use tracing::{debug, info, warn};

use coffee_shared::config::{self, config_path};
use coffee_shared::{
    logging, ActionOutcome, AppConfig, CoffeeError, MenuAction, ResourceBundle, ToggleController,
};

use crate::autostart::LaunchAgent;
use crate::power::AssertionInhibitor;
use crate::tray::{self, StatusTray};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

type Controller = ToggleController<AssertionInhibitor, LaunchAgent>;

struct Coffee {
    controller: Controller,
    tray: StatusTray,
}

pub struct AppIvars {
    config: AppConfig,
    resources: ResourceBundle,
    coffee: RefCell<Option<Coffee>>,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "CoffeeAppDelegate"]
    #[ivars = AppIvars]
    struct AppDelegate;

    unsafe impl NSObjectProtocol for AppDelegate {}

    unsafe impl NSApplicationDelegate for AppDelegate {
        #[unsafe(method(applicationDidFinishLaunching:))]
        fn did_finish_launching(&self, _notification: &NSNotification) {
            self.launch();
        }

        #[unsafe(method(applicationWillTerminate:))]
        fn will_terminate(&self, _notification: &NSNotification) {
            if let Some(coffee) = self.ivars().coffee.borrow_mut().as_mut() {
                coffee.controller.deactivate();
            }
        }
    }

    impl AppDelegate {
        #[unsafe(method(toggleKeepAwake:))]
        fn toggle_keep_awake(&self, _sender: Option<&AnyObject>) {
            self.dispatch(MenuAction::Toggle);
        }

        #[unsafe(method(toggleOpenAtLogin:))]
        fn toggle_open_at_login(&self, _sender: Option<&AnyObject>) {
            self.dispatch(MenuAction::OpenAtLogin);
        }

        #[unsafe(method(quitCoffee:))]
        fn quit_coffee(&self, _sender: Option<&AnyObject>) {
            self.dispatch(MenuAction::Quit);
        }
    }
);

impl AppDelegate {
    fn new(mtm: MainThreadMarker, ivars: AppIvars) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(ivars);
        unsafe { msg_send![super(this), init] }
    }

    fn launch(&self) {
        let mtm = self.mtm();
        let ivars = self.ivars();

        if ivars.config.debug {
            let app = NSApplication::sharedApplication(mtm);
            match tray::load_image(ivars.resources.dock_icon()) {
                Some(icon) => unsafe { app.setApplicationIconImage(Some(&icon)) },
                None => warn!(path = %ivars.resources.dock_icon().display(), "dock icon missing"),
            }
        }

        let mut tray = StatusTray::new(mtm, ivars.resources.clone());
        let controller = Controller::new(AssertionInhibitor, LaunchAgent::new(), APP_VERSION);
        controller.render(&mut tray);
        *ivars.coffee.borrow_mut() = Some(Coffee { controller, tray });

        info!(version = APP_VERSION, "tray ready");
    }

    fn dispatch(&self, action: MenuAction) {
        debug!(?action, "menu action");
        let outcome = {
            let mut slot = self.ivars().coffee.borrow_mut();
            let Some(coffee) = slot.as_mut() else {
                return;
            };
            coffee.controller.handle_action(action, &mut coffee.tray)
        };

        match outcome {
            ActionOutcome::Continue => {}
            ActionOutcome::LoginItemFailed(e) => {
                show_alert(self.mtm(), "Could not change Open at Login", &e.to_string());
            }
            ActionOutcome::Quit => {
                let app = NSApplication::sharedApplication(self.mtm());
                unsafe { app.terminate(None) };
            }
        }
    }
}

fn show_alert(mtm: MainThreadMarker, title: &str, message: &str) {
    let alert = NSAlert::new(mtm);
    alert.setAlertStyle(NSAlertStyle::Warning);
    alert.setMessageText(&NSString::from_str(title));
    alert.setInformativeText(&NSString::from_str(message));
    alert.addButtonWithTitle(&NSString::from_str("OK"));
    alert.runModal();
}

pub fn run() -> Result<(), CoffeeError> {
    let (config, config_error) = match config::load_config() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    logging::init(&config);
    if let Some(e) = config_error {
        warn!(error = %e, path = %config_path().display(), "ignoring unreadable config");
    }

    let resources = ResourceBundle::for_current(config.resources_dir.as_deref())?;
    debug!(?resources, debug_mode = config.debug, "starting");

    let mtm = MainThreadMarker::new()
        .ok_or_else(|| CoffeeError::Tray("Coffee must be run on the main thread".into()))?;

    let app = NSApplication::sharedApplication(mtm);
    let policy = if config.debug {
        NSApplicationActivationPolicy::Regular
    } else {
        NSApplicationActivationPolicy::Accessory
    };
    app.setActivationPolicy(policy);

    let delegate = AppDelegate::new(
        mtm,
        AppIvars {
            config,
            resources,
            coffee: RefCell::new(None),
        },
    );
    let delegate_proto = ProtocolObject::from_ref(&*delegate);
    app.setDelegate(Some(delegate_proto));

    unsafe { app.run() };
    Ok(())
}
