//! Already-pressed tracking and the 6-key rollover buffer.

use crate::config::ROLLOVER;

/// Key codes carried by the last committed report.
#[derive(Clone)]
pub struct PressedSet {
    keys: [bool; 256],
}

impl PressedSet {
    pub const fn new() -> Self {
        Self { keys: [false; 256] }
    }

    pub fn contains(&self, code: u8) -> bool {
        self.keys[code as usize]
    }

    pub fn insert(&mut self, code: u8) {
        self.keys[code as usize] = true;
    }

    pub fn remove(&mut self, code: u8) {
        self.keys[code as usize] = false;
    }
}

impl Default for PressedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for PressedSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let codes = self
            .keys
            .iter()
            .enumerate()
            .filter(|(_, &k)| k)
            .map(|(code, _)| code);
        f.debug_set().entries(codes).finish()
    }
}

/// What happened to a submitted key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Submission {
    Accepted,
    /// Already in the buffer this cycle.
    Duplicate,
    /// A held key took the slot of a newly pressed one.
    Replaced { evicted: u8 },
    Dropped,
}

/// Normal keys selected for the next report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RolloverBuffer {
    keys: [u8; ROLLOVER],
    len: usize,
    overflow: bool,
}

impl RolloverBuffer {
    pub const fn new() -> Self {
        Self {
            keys: [0; ROLLOVER],
            len: 0,
            overflow: false,
        }
    }

    /// Offer a key code. `held` is the already-pressed set of the last
    /// committed report.
    ///
    /// While slots remain, codes are appended in the order they arrive. Once
    /// full, only held keys get in, and only by evicting a key that is not
    /// held. Anything else sets the overflow flag and is dropped.
    pub fn submit(&mut self, code: u8, held: &PressedSet) -> Submission {
        if self.keys().contains(&code) {
            return Submission::Duplicate;
        }

        if self.len < ROLLOVER {
            self.keys[self.len] = code;
            self.len += 1;
            return Submission::Accepted;
        }

        if held.contains(code) {
            if let Some(slot) = self.keys.iter_mut().find(|k| !held.contains(**k)) {
                let evicted = core::mem::replace(slot, code);
                return Submission::Replaced { evicted };
            }
        }

        self.overflow = true;
        Submission::Dropped
    }

    pub fn keys(&self) -> &[u8] {
        &self.keys[..self.len]
    }

    /// Report layout: occupied slots first, zero padded.
    pub fn slots(&self) -> [u8; ROLLOVER] {
        self.keys
    }

    pub fn overflow(&self) -> bool {
        self.overflow
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
