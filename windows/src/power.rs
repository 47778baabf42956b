// Display-sleep inhibition via SetThreadExecutionState.
//
// The execution state belongs to the UI thread, so there is at most one
// live request. Reading it back (a call with no flags changes nothing and
// returns the current state) is the "still active" check.

use coffee_shared::{CoffeeError, PowerInhibitor};
use tracing::warn;
use windows::Win32::System::Power::{
    SetThreadExecutionState, ES_CONTINUOUS, ES_DISPLAY_REQUIRED, EXECUTION_STATE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

#[derive(Debug, Default)]
pub struct ExecutionStateInhibitor {
    next: u64,
    current: Option<u64>,
}

fn display_required() -> bool {
    let state = unsafe { SetThreadExecutionState(EXECUTION_STATE(0)) };
    state.0 & ES_DISPLAY_REQUIRED.0 != 0
}

impl PowerInhibitor for ExecutionStateInhibitor {
    type Handle = RequestId;

    fn start(&mut self, _reason: &str) -> Result<RequestId, CoffeeError> {
        let previous = unsafe { SetThreadExecutionState(ES_CONTINUOUS | ES_DISPLAY_REQUIRED) };
        if previous.0 == 0 {
            return Err(CoffeeError::Inhibitor(
                "SetThreadExecutionState rejected ES_DISPLAY_REQUIRED".into(),
            ));
        }
        self.next += 1;
        self.current = Some(self.next);
        Ok(RequestId(self.next))
    }

    fn stop(&mut self, handle: &RequestId) {
        if self.current != Some(handle.0) {
            return;
        }
        let previous = unsafe { SetThreadExecutionState(ES_CONTINUOUS) };
        if previous.0 == 0 {
            warn!(?handle, "SetThreadExecutionState failed to clear display request");
            return;
        }
        if !display_required() {
            self.current = None;
        }
    }

    fn is_active(&self, handle: &RequestId) -> bool {
        self.current == Some(handle.0) && display_required()
    }
}
