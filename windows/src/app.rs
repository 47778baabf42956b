// Windows application lifecycle: hidden host window, tray and message loop.
//
// The host window is never shown; it only receives tray callbacks. App
// state is boxed and stored in GWLP_USERDATA, reclaimed on WM_DESTROY.

use coffee_shared::config::{self, config_path};
use coffee_shared::{
    logging, ActionOutcome, AppConfig, CoffeeError, MenuAction, ResourceBundle, ToggleController,
};
use tracing::{debug, info, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Console::AllocConsole;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::{CreateMutexW, OpenMutexW, SYNCHRONIZATION_ACCESS_RIGHTS};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DispatchMessageW, GetMessageW, GetWindowLongPtrW,
    MessageBoxW, PostMessageW, PostQuitMessage, RegisterClassW, SetWindowLongPtrW,
    TranslateMessage, GWLP_USERDATA, MB_ICONWARNING, MB_OK, MSG, WINDOW_EX_STYLE, WM_CLOSE,
    WM_DESTROY, WM_LBUTTONUP, WM_RBUTTONUP, WNDCLASSW, WS_OVERLAPPED,
};

use crate::autostart::RunKey;
use crate::power::ExecutionStateInhibitor;
use crate::tray::{self, NotifyTray};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const CLASS_NAME: &str = "CoffeeTrayHost\0";
const SINGLE_INSTANCE_MUTEX: &str = "CoffeeKeepAwakeMutex\0";

type Controller = ToggleController<ExecutionStateInhibitor, RunKey>;

struct WinApp {
    controller: Controller,
    tray: NotifyTray,
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Check if another instance is already running
pub fn is_already_running() -> bool {
    let name: Vec<u16> = SINGLE_INSTANCE_MUTEX.encode_utf16().collect();

    unsafe {
        let existing = OpenMutexW(
            SYNCHRONIZATION_ACCESS_RIGHTS(0x001F0001), // MUTEX_ALL_ACCESS
            false,
            PCWSTR(name.as_ptr()),
        );
        if existing.is_ok() {
            return true;
        }

        // This instance owns the mutex for the rest of the process
        let _ = CreateMutexW(None, true, PCWSTR(name.as_ptr()));
        false
    }
}

pub fn run() -> Result<(), CoffeeError> {
    let (config, config_error) = match config::load_config() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if config.debug {
        let _ = unsafe { AllocConsole() };
    }
    logging::init(&config);
    if let Some(e) = config_error {
        warn!(error = %e, path = %config_path().display(), "ignoring unreadable config");
    }

    let resources = ResourceBundle::for_current(config.resources_dir.as_deref())?;
    debug!(?resources, debug_mode = config.debug, "starting");

    let hwnd = create_host_window()?;
    let mut tray = NotifyTray::new(hwnd, resources)?;
    let controller = Controller::new(ExecutionStateInhibitor::default(), RunKey, APP_VERSION);
    controller.render(&mut tray);

    let app = Box::new(WinApp { controller, tray });
    unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(app) as isize) };
    info!(version = APP_VERSION, "tray ready");

    message_loop();
    Ok(())
}

fn create_host_window() -> Result<HWND, CoffeeError> {
    let class_name = wide(CLASS_NAME);
    let title = wide("Coffee");

    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null())
            .map_err(|e| CoffeeError::Tray(format!("GetModuleHandleW failed: {e}")))?;

        let wc = WNDCLASSW {
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        RegisterClassW(&wc);

        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPED,
            0,
            0,
            0,
            0,
            None,
            None,
            Some(hinstance.into()),
            None,
        )
        .map_err(|e| CoffeeError::Tray(format!("CreateWindowExW failed: {e}")))
    }
}

fn message_loop() {
    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

unsafe fn app_state<'a>(hwnd: HWND) -> Option<&'a mut WinApp> {
    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WinApp;
    ptr.as_mut()
}

unsafe fn dispatch(hwnd: HWND, action: MenuAction) {
    debug!(?action, "menu action");
    let outcome = match app_state(hwnd) {
        Some(app) => app.controller.handle_action(action, &mut app.tray),
        None => return,
    };

    match outcome {
        ActionOutcome::Continue => {}
        ActionOutcome::LoginItemFailed(e) => {
            let text = wide(&e.to_string());
            let caption = wide("Could not change Open at Login");
            MessageBoxW(
                Some(hwnd),
                PCWSTR(text.as_ptr()),
                PCWSTR(caption.as_ptr()),
                MB_ICONWARNING | MB_OK,
            );
        }
        ActionOutcome::Quit => {
            let _ = PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0));
        }
    }
}

/// Window procedure
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        tray::WM_TRAY_ICON => {
            let event = (lparam.0 & 0xFFFF) as u32;
            if event == WM_LBUTTONUP || event == WM_RBUTTONUP {
                let chosen = app_state(hwnd).and_then(|app| app.tray.show_context_menu());
                if let Some(action) = chosen {
                    dispatch(hwnd, action);
                }
            }
            LRESULT(0)
        }

        WM_DESTROY => {
            let ptr = SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) as *mut WinApp;
            if !ptr.is_null() {
                let mut app = Box::from_raw(ptr);
                app.controller.deactivate();
            }
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
