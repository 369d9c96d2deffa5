//! Matrix-scan-to-report pipeline for the CT1 keyboard.
//!
//! This crate is `no_std` so the same code runs in the AVR firmware and in the
//! host CLI (and its tests). One scan cycle flows strictly in one direction:
//!
//! ```text
//! sampler -> deghost -> keymap (resolve) -> rollover -> scanner (commit/emit)
//! ```
//!
//! [`Learner`] runs the other way round: it turns sampled grids into a
//! keymap table for a board whose wiring is not known yet.
//!
//! Hardware lives behind two traits: [`MatrixIo`] for the column/row GPIO lines
//! and [`HidTransport`] for the USB endpoints.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod deghost;
pub mod grid;
pub mod keycode;
pub mod keymap;
pub mod learn;
pub mod report;
pub mod rollover;
pub mod sampler;
pub mod scanner;

pub use config::{COLS, ROLLOVER, ROWS};
pub use grid::{Coord, PressGrid};
pub use keycode::{ConsumerUsage, Keycode, Modifiers};
pub use keymap::{Action, FnCode, Keymap, MetaKey, KEYMAP};
pub use learn::{Learner, Progress, LEARN_ORDER};
pub use report::{HidTransport, KeyboardReport, NotReady};
pub use rollover::{PressedSet, RolloverBuffer};
pub use sampler::MatrixIo;
pub use scanner::{CycleOutcome, Emission, Scanner};
