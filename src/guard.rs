//! Process-wide FPU precision guard.
//!
//! Pair arithmetic is only correct when every intermediate rounds to the
//! native component width. On x87 hardware that means pinning the FPU
//! precision-control field to double for the duration of any quad
//! computation. The guard is reference counted: the first live guard
//! pins, the last drop restores. Acquisition and release are
//! mutex-protected, so guards may be created and dropped from any
//! thread.

use std::sync::{Mutex, MutexGuard, Once};

use tracing::warn;

use crate::arch;
use crate::float::Float;

struct GuardState {
    depth: u32,
    saved: Option<arch::SavedMode>,
}

static STATE: Mutex<GuardState> = Mutex::new(GuardState {
    depth: 0,
    saved: None,
});

static DEGRADED: Once = Once::new();

fn lock_state() -> MutexGuard<'static, GuardState> {
    // The critical sections are tiny and free of panics, but a poisoned
    // lock must not take the whole process down with it.
    STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// Scoped FPU precision pin.
///
/// Hold one of these across any sequence of quad operations. Guards nest
/// freely; the control word is captured on the outermost acquisition and
/// restored when the last guard drops, regardless of drop order or which
/// thread performs it. On targets whose f64 arithmetic never touches the
/// x87 stack this is pure bookkeeping.
///
/// Note that the x87 control word is per-thread hardware state while the
/// counter is process-wide; on x87 targets, callers are expected to do
/// their quad work on the thread that holds the guard, like the C
/// libraries this design descends from.
#[must_use = "the precision pin ends when the guard is dropped"]
#[derive(Debug)]
pub struct PrecisionGuard(());

impl PrecisionGuard {
    /// Acquires the guard, pinning FPU precision on the 0 → 1 transition.
    pub fn new() -> Self {
        let mut state = lock_state();
        state.depth += 1;
        if state.depth == 1 {
            state.saved = Some(arch::pin_precision());
            if !functional::<f64>() {
                DEGRADED.call_once(|| {
                    warn!("this platform cannot round to double precision; quad accuracy is degraded");
                });
            }
        }
        PrecisionGuard(())
    }

    /// Current nesting depth. Diagnostic; racy by nature under threads.
    pub fn depth() -> u32 {
        lock_state().depth
    }
}

impl Default for PrecisionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PrecisionGuard {
    fn drop(&mut self) {
        let mut state = lock_state();
        debug_assert!(state.depth > 0, "unbalanced precision guard");
        state.depth -= 1;
        if state.depth == 0 {
            if let Some(saved) = state.saved.take() {
                arch::restore_precision(saved);
            }
        }
    }
}

/// Whether the runtime can deliver pair-precision results for width `F`:
/// the format must be radix 2 and, where f64 arithmetic flows through the
/// x87 stack, the precision-control field must be writable.
///
/// Both conditions hold on every target this crate currently builds for,
/// so the one-time degraded-accuracy warning in [`PrecisionGuard::new`]
/// fires only on a future port whose backend cannot pin precision.
pub fn functional<F: Float>() -> bool {
    F::RADIX == 2 && arch::SUPPORTED
}
