//! Keymap tables and key resolution.
//!
//! The CT1 matrix is 8 columns x 17 rows (8 drive lines, 17 sense lines).
//! Tables are indexed `[col][row]`, matching the order the sampler walks the
//! matrix. The base layer holds HID keyboard usages; the Fn layer holds
//! [`FnCode`]s whose numeric range selects how they are handled.

use num_enum::TryFromPrimitive;

use crate::config::{COLS, ROWS};
use crate::grid::Coord;
use crate::keycode::{ConsumerUsage, Keycode, Modifiers};

/// What a pressed coordinate means for the current cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Unmapped position, or an Fn-layer hole.
    Nothing,
    /// The Fn key itself.
    Fn,
    Modifier(Modifiers),
    /// A normal key, goes through the rollover buffer.
    Key(Keycode),
    Consumer(ConsumerUsage),
    Meta(MetaKey),
    /// Reserved for language-layer input modes; currently ignored.
    Language(u8),
}

/// Keyboard-feature keys living in the low Fn-code range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum MetaKey {
    FnLock = 0x01,
    Backlight = 0x02,
}

impl MetaKey {
    /// Bit of this key in a meta-key set.
    pub fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

/// Range classes of the Fn-layer code space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnClass {
    None,
    /// 0x01..=0x1F
    Meta,
    /// 0x20..=0x3F
    Language,
    /// 0x40..=0x5F
    Consumer,
    /// 0x60..
    Extended,
}

/// A code in the Fn layer table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FnCode(pub u8);

impl FnCode {
    pub const NONE: FnCode = FnCode(0x00);

    pub const FN_LOCK: FnCode = FnCode(MetaKey::FnLock as u8);
    pub const BACKLIGHT: FnCode = FnCode(MetaKey::Backlight as u8);

    pub const MORSE: FnCode = FnCode(0x20);
    pub const HEXA: FnCode = FnCode(0x21);
    pub const BIN: FnCode = FnCode(0x22);

    pub const SCAN_PREVIOUS: FnCode = FnCode(0x40);
    pub const PLAY_PAUSE: FnCode = FnCode(0x41);
    pub const SCAN_NEXT: FnCode = FnCode(0x43);
    pub const BRIGHTNESS_DECREMENT: FnCode = FnCode(0x44);
    pub const BRIGHTNESS_INCREMENT: FnCode = FnCode(0x45);
    pub const AL_CALCULATOR: FnCode = FnCode(0x46);

    pub const MUTE: FnCode = FnCode(0x60);
    pub const VOLUME_DOWN: FnCode = FnCode(0x61);
    pub const VOLUME_UP: FnCode = FnCode(0x62);
    pub const FIND: FnCode = FnCode(0x63);
    pub const APPLICATION: FnCode = FnCode(0x64);
    pub const SCROLL_LOCK: FnCode = FnCode(0x65);

    pub const fn classify(self) -> FnClass {
        match self.0 {
            0x00 => FnClass::None,
            0x01..=0x1F => FnClass::Meta,
            0x20..=0x3F => FnClass::Language,
            0x40..=0x5F => FnClass::Consumer,
            _ => FnClass::Extended,
        }
    }

    /// Classify once by range, then look the code up in that class's table.
    /// Codes without an entry resolve to [`Action::Nothing`].
    pub fn action(self) -> Action {
        match self.classify() {
            FnClass::None => Action::Nothing,
            FnClass::Meta => MetaKey::try_from(self.0).map_or(Action::Nothing, Action::Meta),
            FnClass::Language => Action::Language(self.0),
            FnClass::Consumer => {
                lookup(CONSUMER_CODES, self).map_or(Action::Nothing, Action::Consumer)
            }
            FnClass::Extended => lookup(EXTENDED_CODES, self).map_or(Action::Nothing, Action::Key),
        }
    }
}

static CONSUMER_CODES: &[(FnCode, ConsumerUsage)] = &[
    (FnCode::SCAN_PREVIOUS, ConsumerUsage::ScanPreviousTrack),
    (FnCode::PLAY_PAUSE, ConsumerUsage::PlayPause),
    (FnCode::SCAN_NEXT, ConsumerUsage::ScanNextTrack),
    (FnCode::BRIGHTNESS_DECREMENT, ConsumerUsage::BrightnessDecrement),
    (FnCode::BRIGHTNESS_INCREMENT, ConsumerUsage::BrightnessIncrement),
    (FnCode::AL_CALCULATOR, ConsumerUsage::AlCalculator),
];

static EXTENDED_CODES: &[(FnCode, Keycode)] = &[
    (FnCode::MUTE, Keycode::Mute),
    (FnCode::VOLUME_DOWN, Keycode::VolumeDown),
    (FnCode::VOLUME_UP, Keycode::VolumeUp),
    (FnCode::FIND, Keycode::Find),
    (FnCode::APPLICATION, Keycode::Application),
    (FnCode::SCROLL_LOCK, Keycode::ScrollLock),
];

fn lookup<T: Copy>(table: &[(FnCode, T)], code: FnCode) -> Option<T> {
    table.iter().find(|(c, _)| *c == code).map(|&(_, v)| v)
}

/// Both layers plus the Fn-lock policy.
pub struct Keymap {
    pub base: [[Keycode; ROWS]; COLS],
    pub fn_layer: [[FnCode; ROWS]; COLS],
    /// Base keys (inclusive range) whose default layer is flipped by Fn lock.
    /// Every other key only reaches the Fn layer while Fn is held.
    pub fn_lock_span: (Keycode, Keycode),
}

impl Keymap {
    pub fn base_key(&self, coord: Coord) -> Keycode {
        self.base[coord.col()][coord.row()]
    }

    pub fn fn_code(&self, coord: Coord) -> FnCode {
        self.fn_layer[coord.col()][coord.row()]
    }

    pub fn is_fn_key(&self, coord: Coord) -> bool {
        self.base_key(coord) == Keycode::Fn
    }

    /// Whether Fn lock flips the default layer of this base key.
    pub fn lock_inverts(&self, key: Keycode) -> bool {
        let (first, last) = self.fn_lock_span;
        (first.code()..=last.code()).contains(&key.code())
    }

    /// Whether a coordinate reads from the Fn layer given the Fn state.
    pub fn uses_fn_layer(&self, coord: Coord, fn_pressed: bool, fn_locked: bool) -> bool {
        if self.lock_inverts(self.base_key(coord)) {
            fn_pressed ^ fn_locked
        } else {
            fn_pressed
        }
    }

    /// Resolve a pressed coordinate to the action it performs.
    pub fn resolve(&self, coord: Coord, fn_pressed: bool, fn_locked: bool) -> Action {
        let key = self.base_key(coord);
        if key == Keycode::Fn {
            return Action::Fn;
        }

        if self.uses_fn_layer(coord, fn_pressed, fn_locked) {
            return self.fn_code(coord).action();
        }

        if key.code() >= Keycode::FIRST_MODIFIER {
            Action::Modifier(key.modifier())
        } else if key == Keycode::No {
            Action::Nothing
        } else {
            Action::Key(key)
        }
    }
}

/// Key is unused in the matrix position.
const ___: Keycode = Keycode::No;

/// Shorthand aliases for readability.
const ESC: Keycode = Keycode::Escape;
const TAB: Keycode = Keycode::Tab;
const ENT: Keycode = Keycode::Enter;
const SPC: Keycode = Keycode::Space;
const BSP: Keycode = Keycode::Backspace;
const LCTL: Keycode = Keycode::LCtrl;
const LSFT: Keycode = Keycode::LShift;
const LALT: Keycode = Keycode::LAlt;
const LGUI: Keycode = Keycode::LGui;
const RCTL: Keycode = Keycode::RCtrl;
const RSFT: Keycode = Keycode::RShift;
const RALT: Keycode = Keycode::RAlt;
const FN: Keycode = Keycode::Fn;

/// Base layer: ISO full-size layout with numpad.
#[rustfmt::skip]
pub const BASE_LAYER: [[Keycode; ROWS]; COLS] = {
    use Keycode::*;
    [
        // Col 0
        [G, ___, F4, ESC, ___, ___, ___, ___, LALT, Up, Kp1, Kp0, F5, Quote, ___, F6, H],
        // Col 1
        [T, CapsLock, F3, TAB, ___, ___, LSFT, ___, ___, KpDot, KpSlash, KpPlus, BSP, LBracket, F7, RBracket, Y],
        // Col 2
        [R, W, E, Q, PageUp, ___, ___, ___, NumLock, ___, Kp4, Kp3, ___, P, O, I, U],
        // Col 3
        [N5, F1, F2, Grave, Kp8, ___, ___, LCTL, ___, Home, Insert, Delete, F9, Minus, F8, Equal, N6],
        // Col 4
        [F, S, D, A, PageDown, FN, ___, ___, ___, KpEnter, Kp7, Kp9, ___, Semicolon, L, K, J],
        // Col 5
        [N4, N2, N3, N1, LGUI, ___, ___, ___, PrintScreen, End, F12, F11, F10, N0, N9, N8, N7],
        // Col 6
        [V, X, C, Z, KpAsterisk, ___, RSFT, RCTL, ___, KpMinus, Kp5, Kp6, ENT, Backslash, Dot, Comma, M],
        // Col 7
        [B, ___, ___, ___, Kp2, ___, ___, ___, RALT, Left, Right, Down, SPC, Slash, ___, ___, N],
    ]
};

const NO: FnCode = FnCode::NONE;

/// Fn layer: media keys on the function row, feature keys elsewhere.
#[rustfmt::skip]
pub const FN_LAYER: [[FnCode; ROWS]; COLS] = [
    // Col 0: F4 prev, Esc Fn-lock, F5 play/pause, F6 next
    [NO, NO, FnCode::SCAN_PREVIOUS, FnCode::FN_LOCK, NO, NO, NO, NO, NO, NO, NO, NO, FnCode::PLAY_PAUSE, NO, NO, FnCode::SCAN_NEXT, NO],
    // Col 1: F3 volume up
    [NO, NO, FnCode::VOLUME_UP, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO],
    // Col 2
    [NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO],
    // Col 3: F1 mute, F2 volume down, F9 find
    [NO, FnCode::MUTE, FnCode::VOLUME_DOWN, NO, NO, NO, NO, NO, NO, NO, NO, NO, FnCode::FIND, NO, NO, NO, NO],
    // Col 4: ; morse
    [NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, FnCode::MORSE, NO, NO, NO],
    // Col 5: PrtSc scroll lock, F12 brightness up, F11 brightness down, F10 backlight
    [NO, NO, NO, NO, NO, NO, NO, NO, FnCode::SCROLL_LOCK, NO, FnCode::BRIGHTNESS_INCREMENT, FnCode::BRIGHTNESS_DECREMENT, FnCode::BACKLIGHT, NO, NO, NO, NO],
    // Col 6: X hexa, C calculator, RCtrl application
    [NO, FnCode::HEXA, FnCode::AL_CALCULATOR, NO, NO, NO, NO, FnCode::APPLICATION, NO, NO, NO, NO, NO, NO, NO, NO, NO],
    // Col 7: B bin
    [FnCode::BIN, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO, NO],
];

/// The keymap flashed into the firmware.
pub static KEYMAP: Keymap = Keymap {
    base: BASE_LAYER,
    fn_layer: FN_LAYER,
    fn_lock_span: (Keycode::F1, Keycode::F12),
};
