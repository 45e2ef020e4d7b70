//! Backend for targets whose f64 arithmetic already rounds every
//! intermediate to f64 (SSE2 x86, x86-64, aarch64, ...). The guard is
//! pure bookkeeping here.

pub(crate) type SavedMode = ();

/// Intermediates already round to the component width; a port that
/// cannot guarantee that reports `false` here to trigger the degraded
/// advisory.
pub(crate) const SUPPORTED: bool = true;

#[inline]
pub(crate) fn pin_precision() -> SavedMode {}

#[inline]
pub(crate) fn restore_precision(_saved: SavedMode) {}
