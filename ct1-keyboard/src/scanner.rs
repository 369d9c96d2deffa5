//! The scan cycle: sample, filter, resolve, commit, emit.
//!
//! [`Scanner`] owns all state that persists between cycles. A cycle never
//! blocks; if the transport is busy the report is skipped, and the next cycle
//! decides again from its own state.

use crate::deghost::{deghost, Deghosted};
use crate::grid::PressGrid;
use crate::keycode::{ConsumerUsage, Modifiers};
use crate::keymap::{Action, Keymap, MetaKey};
use crate::report::{HidTransport, KeyboardReport};
use crate::rollover::{PressedSet, RolloverBuffer, Submission};
use crate::sampler::{sample, MatrixIo};

/// What became of one report this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emission {
    Sent,
    /// A report was due but the transport refused it.
    NotReady,
    /// Nothing pressed now or last cycle.
    Suppressed,
}

/// Summary of one scan cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleOutcome {
    pub keyboard: Emission,
    pub consumer: Emission,
    /// Raw presses removed by the de-ghoster.
    pub suppressed: u32,
    /// More new keys than rollover slots; the extra ones were dropped.
    pub overflow: bool,
}

pub struct Scanner<'a> {
    keymap: &'a Keymap,

    /// Codes of the committed report.
    pressed: PressedSet,
    current: RolloverBuffer,
    next: RolloverBuffer,

    modifiers: Modifiers,
    prev_modifiers: Modifiers,

    fn_pressed: bool,
    fn_held: bool,
    fn_locked: bool,
    backlight: bool,

    /// Meta keys seen this cycle / last cycle, one bit per [`MetaKey`].
    meta_now: u32,
    meta_prev: u32,

    consumer_now: Option<ConsumerUsage>,
    consumer_prev: Option<ConsumerUsage>,

    /// Last keyboard report that reached the host was non-empty, or an
    /// empty one still has to go out.
    keyboard_latch: bool,
    consumer_latch: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(keymap: &'a Keymap) -> Self {
        Self {
            keymap,
            pressed: PressedSet::new(),
            current: RolloverBuffer::new(),
            next: RolloverBuffer::new(),
            modifiers: Modifiers::empty(),
            prev_modifiers: Modifiers::empty(),
            fn_pressed: false,
            fn_held: false,
            fn_locked: false,
            backlight: false,
            meta_now: 0,
            meta_prev: 0,
            consumer_now: None,
            consumer_prev: None,
            keyboard_latch: false,
            consumer_latch: false,
        }
    }

    pub fn fn_locked(&self) -> bool {
        self.fn_locked
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Key codes of the last committed report.
    pub fn pressed(&self) -> &PressedSet {
        &self.pressed
    }

    /// Sample the matrix and run one cycle on the result.
    pub fn scan<M, T>(&mut self, io: &mut M, transport: &mut T) -> CycleOutcome
    where
        M: MatrixIo,
        T: HidTransport,
    {
        let raw = sample(io);
        self.cycle(&raw, transport)
    }

    /// Run one cycle on an already sampled grid.
    pub fn cycle<T: HidTransport>(&mut self, raw: &PressGrid, transport: &mut T) -> CycleOutcome {
        let held = self.held_grid(raw);
        let Deghosted { grid, suppressed } = deghost(raw, &held);

        // Fn state must be known before any other key resolves, wherever the
        // Fn key sits in scan order.
        let keymap = self.keymap;
        self.fn_pressed = grid.iter().any(|coord| keymap.is_fn_key(coord));

        for coord in grid.iter() {
            let action = keymap.resolve(coord, self.fn_pressed, self.fn_locked);
            self.apply(action);
        }

        self.commit(transport, suppressed)
    }

    /// Coordinates of `raw` whose key was part of the last committed state.
    fn held_grid(&self, raw: &PressGrid) -> PressGrid {
        raw.iter()
            .filter(|&coord| {
                let action = self.keymap.resolve(coord, self.fn_held, self.fn_locked);
                self.was_held(action)
            })
            .collect()
    }

    fn was_held(&self, action: Action) -> bool {
        match action {
            Action::Fn => self.fn_held,
            Action::Modifier(m) => !m.is_empty() && self.prev_modifiers.contains(m),
            Action::Key(key) => self.pressed.contains(key.code()),
            Action::Consumer(usage) => self.consumer_prev == Some(usage),
            Action::Meta(meta) => self.meta_prev & meta.bit() != 0,
            Action::Nothing | Action::Language(_) => false,
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Nothing | Action::Fn => {}
            Action::Modifier(m) => self.modifiers |= m,
            Action::Key(key) => {
                let code = key.code();
                if let Submission::Replaced { evicted } = self.next.submit(code, &self.pressed) {
                    trace!("rollover: {} evicted by held {}", evicted, code);
                }
            }
            Action::Consumer(usage) => {
                if self.consumer_now.is_none() {
                    self.consumer_now = Some(usage);
                }
            }
            Action::Meta(meta) => self.meta_now |= meta.bit(),
            Action::Language(code) => trace!("language key {} ignored", code),
        }
    }

    fn commit<T: HidTransport>(&mut self, transport: &mut T, suppressed: u32) -> CycleOutcome {
        let overflow = self.next.overflow();
        if overflow {
            debug!("rollover: overflow, new keys dropped");
        }

        // New buffer becomes current; the old one is emptied for reuse.
        for &code in self.current.keys() {
            self.pressed.remove(code);
        }
        core::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();

        // Meta keys act once per press.
        let rising = self.meta_now & !self.meta_prev;
        if rising & MetaKey::FnLock.bit() != 0 {
            self.fn_locked = !self.fn_locked;
            info!("fn lock: {}", self.fn_locked);
        }
        if rising & MetaKey::Backlight.bit() != 0 {
            self.backlight = !self.backlight;
            info!("backlight: {}", self.backlight);
        }
        self.meta_prev = self.meta_now;
        self.fn_held = self.fn_pressed;

        let report = KeyboardReport::new(self.modifiers, self.current.slots());
        let keyboard = self.emit_keyboard(transport, &report);

        let usage = self.consumer_now.take();
        let consumer = self.emit_consumer(transport, usage);

        for &code in self.current.keys() {
            self.pressed.insert(code);
        }
        self.prev_modifiers = self.modifiers;
        self.consumer_prev = usage;

        self.modifiers = Modifiers::empty();
        self.meta_now = 0;
        self.fn_pressed = false;

        CycleOutcome {
            keyboard,
            consumer,
            suppressed,
            overflow,
        }
    }

    fn emit_keyboard<T: HidTransport>(
        &mut self,
        transport: &mut T,
        report: &KeyboardReport,
    ) -> Emission {
        let active = !report.is_empty();
        if !active && !self.keyboard_latch {
            return Emission::Suppressed;
        }

        match transport.submit_keyboard(report) {
            Ok(()) => {
                self.keyboard_latch = active;
                Emission::Sent
            }
            Err(_) => {
                warn!("keyboard report not accepted, active: {}", active);
                self.keyboard_latch |= active;
                Emission::NotReady
            }
        }
    }

    fn emit_consumer<T: HidTransport>(
        &mut self,
        transport: &mut T,
        usage: Option<ConsumerUsage>,
    ) -> Emission {
        let active = usage.is_some();
        if !active && !self.consumer_latch {
            return Emission::Suppressed;
        }

        match transport.submit_consumer(usage) {
            Ok(()) => {
                self.consumer_latch = active;
                Emission::Sent
            }
            Err(_) => {
                warn!("consumer report not accepted, active: {}", active);
                self.consumer_latch |= active;
                Emission::NotReady
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coord;
    use crate::keymap::KEYMAP;
    use crate::report::NotReady;

    const ESC: (usize, usize) = (0, 3);
    const FN: (usize, usize) = (4, 5);
    const G: (usize, usize) = (0, 0);
    const F10: (usize, usize) = (5, 12);

    fn grid(coords: &[(usize, usize)]) -> PressGrid {
        coords
            .iter()
            .map(|&(col, row)| Coord::new(col, row).unwrap())
            .collect()
    }

    /// Counts submissions and refuses them while `busy` is set.
    #[derive(Default)]
    struct Busy {
        busy: bool,
        keyboard: Vec<KeyboardReport>,
        consumer: Vec<Option<ConsumerUsage>>,
    }

    impl HidTransport for Busy {
        fn submit_keyboard(&mut self, report: &KeyboardReport) -> Result<(), NotReady> {
            if self.busy {
                return Err(NotReady);
            }
            self.keyboard.push(*report);
            Ok(())
        }

        fn submit_consumer(&mut self, usage: Option<ConsumerUsage>) -> Result<(), NotReady> {
            if self.busy {
                return Err(NotReady);
            }
            self.consumer.push(usage);
            Ok(())
        }
    }

    #[test]
    fn fn_lock_toggles_once_per_press() {
        let mut scanner = Scanner::new(&KEYMAP);
        let mut t = Busy::default();

        // Esc is scanned before Fn; the lock must still engage on the first cycle.
        for _ in 0..5 {
            scanner.cycle(&grid(&[ESC, FN]), &mut t);
        }
        assert!(scanner.fn_locked());

        scanner.cycle(&grid(&[FN]), &mut t);
        scanner.cycle(&grid(&[ESC, FN]), &mut t);
        assert!(!scanner.fn_locked());
        assert!(t.keyboard.is_empty());
    }

    #[test]
    fn backlight_is_a_latching_toggle() {
        let mut scanner = Scanner::new(&KEYMAP);
        let mut t = Busy::default();

        scanner.cycle(&grid(&[FN, F10]), &mut t);
        scanner.cycle(&grid(&[FN, F10]), &mut t);
        assert!(scanner.backlight());
        scanner.cycle(&PressGrid::new(), &mut t);
        assert!(scanner.backlight());
    }

    #[test]
    fn refused_release_is_sent_later() {
        let mut scanner = Scanner::new(&KEYMAP);
        let mut t = Busy::default();

        let out = scanner.cycle(&grid(&[G]), &mut t);
        assert_eq!(out.keyboard, Emission::Sent);

        t.busy = true;
        let out = scanner.cycle(&PressGrid::new(), &mut t);
        assert_eq!(out.keyboard, Emission::NotReady);

        t.busy = false;
        let out = scanner.cycle(&PressGrid::new(), &mut t);
        assert_eq!(out.keyboard, Emission::Sent);
        let out = scanner.cycle(&PressGrid::new(), &mut t);
        assert_eq!(out.keyboard, Emission::Suppressed);

        assert_eq!(t.keyboard.len(), 2);
        assert!(t.keyboard[1].is_empty());
        assert!(!scanner.pressed().contains(0x0A));
    }

    #[test]
    fn refused_press_is_not_retried_within_cycle() {
        let mut scanner = Scanner::new(&KEYMAP);
        let mut t = Busy {
            busy: true,
            ..Default::default()
        };

        let out = scanner.cycle(&grid(&[G]), &mut t);
        assert_eq!(out.keyboard, Emission::NotReady);
        // State is committed regardless of the transport.
        assert!(scanner.pressed().contains(0x0A));

        // Released before the host ever saw it: the empty report still goes out.
        t.busy = false;
        let out = scanner.cycle(&PressGrid::new(), &mut t);
        assert_eq!(out.keyboard, Emission::Sent);
        assert_eq!(t.keyboard, [KeyboardReport::empty()]);
    }
}
