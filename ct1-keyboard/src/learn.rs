//! Matrix learning: find out which switch carries which key.
//!
//! A [`Learner`] walks a list of keys and asks for each one in turn. The first
//! switch that closes and does not belong to an earlier key is assigned to the
//! key being asked for. `back` forgets the previous key so it can be pressed
//! again, `skip` moves on without assigning anything. The finished table has
//! the same shape as [`crate::keymap::BASE_LAYER`].

use crate::config::{COLS, ROWS};
use crate::grid::{Coord, PressGrid};
use crate::keycode::Keycode;
use crate::rollover::PressedSet;

/// Every key a full-size board can carry, in the order they are asked for.
#[rustfmt::skip]
pub const LEARN_ORDER: &[Keycode] = {
    use Keycode::*;
    &[
        A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
        N1, N2, N3, N4, N5, N6, N7, N8, N9, N0,
        Enter, Escape, Backspace, Tab, Space, Minus, Equal, LBracket, RBracket, Backslash,
        NonUsHash, Semicolon, Quote, Grave, Comma, Dot, Slash, CapsLock,
        F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
        PrintScreen, ScrollLock, Pause, Insert, Home, PageUp, Delete, End, PageDown,
        Right, Left, Down, Up,
        NumLock, KpSlash, KpAsterisk, KpMinus, KpPlus, KpEnter,
        Kp1, Kp2, Kp3, Kp4, Kp5, Kp6, Kp7, Kp8, Kp9, Kp0, KpDot,
        LCtrl, LShift, LAlt, LGui, RCtrl, RShift, RAlt,
        Keycode::Fn,
    ]
};

/// What one sampled grid did to the learner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// `key` now lives at `coord`.
    Assigned { key: Keycode, coord: Coord },
    /// Only switches of earlier keys closed; `owner` is the first of them.
    AlreadyAssigned { coord: Coord, owner: Keycode },
    /// No switch closed since the last sample.
    Waiting,
    /// Every key has been assigned or skipped.
    Finished,
}

pub struct Learner<'a> {
    keys: &'a [Keycode],
    next: usize,
    table: [[Keycode; ROWS]; COLS],
    skipped: PressedSet,
    previous: PressGrid,
}

impl<'a> Learner<'a> {
    pub fn new(keys: &'a [Keycode]) -> Self {
        Self {
            keys,
            next: 0,
            table: [[Keycode::No; ROWS]; COLS],
            skipped: PressedSet::new(),
            previous: PressGrid::new(),
        }
    }

    /// The key waiting for a press, `None` once the list is exhausted.
    pub fn prompt(&self) -> Option<Keycode> {
        self.keys.get(self.next).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.keys.len()
    }

    /// Number of keys already assigned or skipped.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Feed one sampled grid.
    ///
    /// Only switches that were open in the previous sample count, so holding a
    /// key down assigns it once.
    pub fn feed(&mut self, grid: &PressGrid) -> Progress {
        let previous = core::mem::replace(&mut self.previous, *grid);
        let Some(key) = self.prompt() else {
            return Progress::Finished;
        };

        let mut progress = Progress::Waiting;
        for coord in grid.iter().filter(|&coord| !previous.get(coord)) {
            match self.key_at(coord) {
                Keycode::No => {
                    self.table[coord.col()][coord.row()] = key;
                    self.next += 1;
                    info!("learn: {:?} at ({}, {})", key, coord.col(), coord.row());
                    return Progress::Assigned { key, coord };
                }
                owner => {
                    if progress == Progress::Waiting {
                        progress = Progress::AlreadyAssigned { coord, owner };
                    }
                }
            }
        }

        progress
    }

    /// Step back to the previous key and forget where it was.
    ///
    /// Returns the key asked for again, `None` at the start of the list.
    pub fn back(&mut self) -> Option<Keycode> {
        if self.next == 0 {
            return None;
        }
        self.next -= 1;
        let key = self.keys[self.next];

        for cell in self.table.iter_mut().flatten() {
            if *cell == key {
                *cell = Keycode::No;
            }
        }
        self.skipped.remove(key.code());
        debug!("learn: back to {:?}", key);
        Some(key)
    }

    /// Leave the current key unassigned and move on.
    pub fn skip(&mut self) -> Option<Keycode> {
        let key = self.prompt()?;
        self.skipped.insert(key.code());
        self.next += 1;
        debug!("learn: skipped {:?}", key);
        Some(key)
    }

    /// Key assigned to `coord`, [`Keycode::No`] when none.
    pub fn key_at(&self, coord: Coord) -> Keycode {
        self.table[coord.col()][coord.row()]
    }

    /// The learned layout, `[col][row]`.
    pub fn table(&self) -> &[[Keycode; ROWS]; COLS] {
        &self.table
    }

    /// Skipped keys in the order they were asked for.
    pub fn skipped(&self) -> impl Iterator<Item = Keycode> + '_ {
        self.keys[..self.next]
            .iter()
            .copied()
            .filter(|key| self.skipped.contains(key.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: &[Keycode] = &[Keycode::A, Keycode::B, Keycode::C];

    fn c(col: usize, row: usize) -> Coord {
        Coord::new(col, row).unwrap()
    }

    fn grid(coords: &[Coord]) -> PressGrid {
        coords.iter().copied().collect()
    }

    #[test]
    fn first_new_switch_is_assigned() {
        let mut learner = Learner::new(KEYS);
        assert_eq!(learner.prompt(), Some(Keycode::A));

        let progress = learner.feed(&grid(&[c(2, 7), c(5, 1)]));
        assert_eq!(
            progress,
            Progress::Assigned {
                key: Keycode::A,
                coord: c(2, 7)
            }
        );
        assert_eq!(learner.key_at(c(2, 7)), Keycode::A);
        assert_eq!(learner.key_at(c(5, 1)), Keycode::No);
        assert_eq!(learner.prompt(), Some(Keycode::B));
    }

    #[test]
    fn held_switch_is_not_assigned_twice() {
        let mut learner = Learner::new(KEYS);
        learner.feed(&grid(&[c(0, 0)]));
        assert_eq!(learner.feed(&grid(&[c(0, 0)])), Progress::Waiting);
        assert_eq!(learner.feed(&PressGrid::new()), Progress::Waiting);
        assert_eq!(learner.prompt(), Some(Keycode::B));
    }

    #[test]
    fn already_assigned_switch_is_reported() {
        let mut learner = Learner::new(KEYS);
        learner.feed(&grid(&[c(0, 0)]));
        learner.feed(&PressGrid::new());

        assert_eq!(
            learner.feed(&grid(&[c(0, 0)])),
            Progress::AlreadyAssigned {
                coord: c(0, 0),
                owner: Keycode::A
            }
        );
        assert_eq!(learner.prompt(), Some(Keycode::B));

        // A fresh switch in the same sample still wins.
        learner.feed(&PressGrid::new());
        let progress = learner.feed(&grid(&[c(0, 0), c(3, 3)]));
        assert_eq!(
            progress,
            Progress::Assigned {
                key: Keycode::B,
                coord: c(3, 3)
            }
        );
    }

    #[test]
    fn back_forgets_previous_key() {
        let mut learner = Learner::new(KEYS);
        assert_eq!(learner.back(), None);

        learner.feed(&grid(&[c(1, 1)]));
        learner.feed(&PressGrid::new());
        assert_eq!(learner.back(), Some(Keycode::A));
        assert_eq!(learner.key_at(c(1, 1)), Keycode::No);
        assert_eq!(learner.prompt(), Some(Keycode::A));

        // The freed switch can be taken again.
        assert_eq!(
            learner.feed(&grid(&[c(1, 1)])),
            Progress::Assigned {
                key: Keycode::A,
                coord: c(1, 1)
            }
        );
    }

    #[test]
    fn skip_moves_on_and_is_listed() {
        let mut learner = Learner::new(KEYS);
        assert_eq!(learner.skip(), Some(Keycode::A));
        learner.feed(&grid(&[c(4, 4)]));
        assert_eq!(learner.skip(), Some(Keycode::C));

        assert!(learner.is_finished());
        assert_eq!(learner.skip(), None);
        assert_eq!(learner.feed(&grid(&[c(6, 6)])), Progress::Finished);
        assert!(learner.skipped().eq([Keycode::A, Keycode::C]));
        assert_eq!(learner.key_at(c(4, 4)), Keycode::B);

        // Going back over a skipped key takes it off the list.
        assert_eq!(learner.back(), Some(Keycode::C));
        assert!(learner.skipped().eq([Keycode::A]));
    }

    #[test]
    fn learn_order_has_no_duplicates() {
        let mut seen = PressedSet::new();
        for key in LEARN_ORDER {
            assert!(!seen.contains(key.code()), "{:?}", key);
            seen.insert(key.code());
        }
        assert!(LEARN_ORDER.contains(&Keycode::Fn));
    }
}
