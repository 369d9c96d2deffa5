//! HID reports and the transport they are handed to.

use crate::config::ROLLOVER;
use crate::keycode::{ConsumerUsage, Modifiers};

/// Standard USB HID boot keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; ROLLOVER],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; ROLLOVER],
        }
    }

    pub fn new(modifiers: Modifiers, keys: [u8; ROLLOVER]) -> Self {
        Self {
            modifiers: modifiers.bits(),
            reserved: 0,
            keys,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_bits_truncate(self.modifiers)
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers == 0 && self.keys.iter().all(|&k| k == 0)
    }

    pub fn to_bytes(&self) -> [u8; 2 + ROLLOVER] {
        let mut out = [0u8; 2 + ROLLOVER];
        out[0] = self.modifiers;
        out[1] = self.reserved;
        out[2..].copy_from_slice(&self.keys);
        out
    }
}

/// The transport could not take a report this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotReady;

/// Where finished reports go (USB endpoint, BLE characteristic, test recorder).
///
/// Submissions must not block. A transport that can't accept a report returns
/// [`NotReady`]; the scanner never retries within the same cycle.
pub trait HidTransport {
    fn submit_keyboard(&mut self, report: &KeyboardReport) -> Result<(), NotReady>;

    /// `None` releases whatever consumer usage was last sent.
    fn submit_consumer(&mut self, usage: Option<ConsumerUsage>) -> Result<(), NotReady>;
}

impl<T: HidTransport + ?Sized> HidTransport for &mut T {
    fn submit_keyboard(&mut self, report: &KeyboardReport) -> Result<(), NotReady> {
        (**self).submit_keyboard(report)
    }

    fn submit_consumer(&mut self, usage: Option<ConsumerUsage>) -> Result<(), NotReady> {
        (**self).submit_consumer(usage)
    }
}
