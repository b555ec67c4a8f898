//! Panic interception and handler chaining.
//!
//! Installation captures whatever panic hook was previously registered
//! and substitutes a hook that first drives the capture pipeline, then
//! unconditionally invokes the captured previous hook with the original
//! `PanicHookInfo`. The pre-existing chain observes every panic exactly
//! as it would without the agent: the agent is purely additive.
//!
//! Install-once is guarded by `Once`: installed is terminal for the
//! process, and repeated installs cannot create a hook cycle.

use std::panic::{self, PanicHookInfo};
use std::sync::Once;

use tracing::debug;

use crate::agent;
use crate::compose::{CaptureInput, FailureInfo};

static INSTALL: Once = Once::new();

/// Installs the panic interceptor once per process.
pub(crate) fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            report(info);
            previous(info);
        }));
        debug!("panic interceptor installed");
    });
}

/// Captures one panic through the agent, synchronously on the panicking
/// thread.
///
/// Capture-internal failures (unresolvable source, failed delivery,
/// hook suppression) are outcomes, not panics, so the previous hook
/// always runs next. A panicking before-send hook is the one exception:
/// that is a fatal bug in the hook and escapes (see DESIGN.md).
fn report(info: &PanicHookInfo<'_>) {
    if let Some(agent) = agent::global() {
        agent.capture(CaptureInput::Failure(FailureInfo::from_panic(info)));
    }
}
