//! x87 control-word access for targets whose f64 math runs on the FPU
//! stack.

use std::arch::asm;

/// Control word captured by `pin_precision`, consumed by `restore_precision`.
pub(crate) type SavedMode = u16;

/// Precision-control field of the x87 control word.
const PC_MASK: u16 = 0x0300;
/// Precision-control setting for 53-bit (double) rounding.
const PC_DOUBLE: u16 = 0x0200;

/// Control is available wherever the hazard exists.
pub(crate) const SUPPORTED: bool = true;

#[inline]
fn control_word() -> u16 {
    let mut cw: u16 = 0;
    let slot = &mut cw as *mut u16;
    // SAFETY: fnstcw stores two bytes through the pointer and nothing else.
    unsafe {
        asm!("fnstcw [{0}]", in(reg) slot, options(nostack));
    }
    cw
}

#[inline]
fn set_control_word(cw: u16) {
    let slot = &cw as *const u16;
    // SAFETY: fldcw loads the control word; the previous word is restored
    // by the caller when the guard ends.
    unsafe {
        asm!("fldcw [{0}]", in(reg) slot, options(nostack, readonly));
    }
}

/// Pins the x87 precision-control field to double precision and returns
/// the previous control word.
pub(crate) fn pin_precision() -> SavedMode {
    let cw = control_word();
    set_control_word((cw & !PC_MASK) | PC_DOUBLE);
    cw
}

/// Restores a control word captured by `pin_precision`.
pub(crate) fn restore_precision(saved: SavedMode) {
    set_control_word(saved);
}
