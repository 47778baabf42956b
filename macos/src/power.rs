// Display-sleep inhibition through IOKit power assertions.
//
//   • start:     IOPMAssertionCreateWithName(PreventUserIdleDisplaySleep)
//   • stop:      IOPMAssertionRelease
//   • is_active: IOPMAssertionCopyProperties returns NULL once the
//                assertion no longer exists

use std::ffi::c_void;

use coffee_shared::{CoffeeError, PowerInhibitor};
use objc2_foundation::NSString;
use tracing::warn;

// ── IOKit FFI ───────────────────────────────────────────────────────────────

type IOPMAssertionID = u32;
type IOPMAssertionLevel = u32;
type IOReturn = i32;
type CFTypeRef = *const c_void;

const K_IO_RETURN_SUCCESS: IOReturn = 0;
const K_IOPM_ASSERTION_LEVEL_ON: IOPMAssertionLevel = 255;
const K_IOPM_ASSERTION_TYPE_PREVENT_USER_IDLE_DISPLAY_SLEEP: &str = "PreventUserIdleDisplaySleep";

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOPMAssertionCreateWithName(
        assertion_type: CFTypeRef,
        level: IOPMAssertionLevel,
        name: CFTypeRef,
        assertion_id: *mut IOPMAssertionID,
    ) -> IOReturn;
    fn IOPMAssertionRelease(assertion_id: IOPMAssertionID) -> IOReturn;
    fn IOPMAssertionCopyProperties(assertion_id: IOPMAssertionID) -> CFTypeRef;
}

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    fn CFRelease(cf: CFTypeRef);
}

/// NSString is toll-free bridged with CFString.
fn cf_string(s: &NSString) -> CFTypeRef {
    (s as *const NSString).cast()
}

// ── Inhibitor ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionId(IOPMAssertionID);

#[derive(Debug, Default)]
pub struct AssertionInhibitor;

impl PowerInhibitor for AssertionInhibitor {
    type Handle = AssertionId;

    fn start(&mut self, reason: &str) -> Result<AssertionId, CoffeeError> {
        let kind = NSString::from_str(K_IOPM_ASSERTION_TYPE_PREVENT_USER_IDLE_DISPLAY_SLEEP);
        let name = NSString::from_str(reason);
        let mut id: IOPMAssertionID = 0;

        let status = unsafe {
            IOPMAssertionCreateWithName(
                cf_string(&kind),
                K_IOPM_ASSERTION_LEVEL_ON,
                cf_string(&name),
                &mut id,
            )
        };
        if status != K_IO_RETURN_SUCCESS {
            return Err(CoffeeError::Inhibitor(format!(
                "IOPMAssertionCreateWithName returned {status:#x}"
            )));
        }
        Ok(AssertionId(id))
    }

    fn stop(&mut self, handle: &AssertionId) {
        let status = unsafe { IOPMAssertionRelease(handle.0) };
        if status != K_IO_RETURN_SUCCESS {
            warn!(?handle, status, "IOPMAssertionRelease failed");
        }
    }

    fn is_active(&self, handle: &AssertionId) -> bool {
        let properties = unsafe { IOPMAssertionCopyProperties(handle.0) };
        if properties.is_null() {
            return false;
        }
        unsafe { CFRelease(properties) };
        true
    }
}
