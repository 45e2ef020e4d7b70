//! Platform precision-control hooks.
//!
//! Only 32-bit x86 without SSE2 routes f64 arithmetic through the x87
//! stack, whose registers compute in 80-bit extended precision by
//! default. Pair arithmetic requires every intermediate to round to the
//! component width, so on those targets the guard pins the x87
//! precision-control field for its lifetime. Every other target already
//! evaluates f64 in f64 and gets the no-op backend.

#[cfg(all(target_arch = "x86", not(target_feature = "sse2")))]
mod x86;
#[cfg(all(target_arch = "x86", not(target_feature = "sse2")))]
pub(crate) use x86::{pin_precision, restore_precision, SavedMode, SUPPORTED};

#[cfg(not(all(target_arch = "x86", not(target_feature = "sse2"))))]
mod noop;
#[cfg(not(all(target_arch = "x86", not(target_feature = "sse2"))))]
pub(crate) use noop::{pin_precision, restore_precision, SavedMode, SUPPORTED};
