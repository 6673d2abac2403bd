/*!
 * System Halt
 *
 * Fatal, unrecoverable stop for contract violations. A halt is never turned
 * into a recoverable result; the optional hook runs first, then the process
 * aborts.
 */

use parking_lot::{const_rwlock, RwLock};
use tracing::error;

/// Callback invoked with the halt reason before the process aborts
pub type HaltHook = fn(&'static str);

static HALT_HOOK: RwLock<Option<HaltHook>> = const_rwlock(None);

/// Install a hook that runs on every halt, replacing any previous one
///
/// A hook that diverges (panics, exits) prevents the abort; this is how test
/// harnesses observe halts.
pub fn set_halt_hook(hook: HaltHook) {
    *HALT_HOOK.write() = Some(hook);
}

/// Stop the system because of a programming-contract violation
#[cold]
pub fn halt(reason: &'static str) -> ! {
    error!(reason, "System halted");
    let hook = *HALT_HOOK.read();
    if let Some(hook) = hook {
        hook(reason);
    }
    std::process::abort()
}
