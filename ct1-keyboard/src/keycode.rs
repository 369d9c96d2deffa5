//! HID usage codes.
//!
//! See USB HID Usage Tables, section 10 (Keyboard/Keypad page 0x07) and
//! section 15 (Consumer page 0x0C).

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Keyboard page usages, plus the `Fn` pseudo-code used by the base layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Keycode {
    /// Nothing wired at this position.
    No = 0x00,

    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    /// Non-US # and ~ (ISO key left of Enter)
    NonUsHash = 0x32,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    // Keypad
    NumLock = 0x53,
    KpSlash = 0x54,
    KpAsterisk = 0x55,
    KpMinus = 0x56,
    KpPlus = 0x57,
    KpEnter = 0x58,
    Kp1 = 0x59,
    Kp2 = 0x5A,
    Kp3 = 0x5B,
    Kp4 = 0x5C,
    Kp5 = 0x5D,
    Kp6 = 0x5E,
    Kp7 = 0x5F,
    Kp8 = 0x60,
    Kp9 = 0x61,
    Kp0 = 0x62,
    KpDot = 0x63,

    /// Non-US \ and | (ISO key left of Z)
    NonUsBackslash = 0x64,
    Application = 0x65,

    // Reachable through the Fn layer only
    Find = 0x7E,
    Mute = 0x7F,
    VolumeUp = 0x80,
    VolumeDown = 0x81,

    // Modifiers (used in the modifier byte, not in keycode array)
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,

    /// The Fn key. Not a HID usage, never reported.
    Fn = 0xF0,
}

impl Keycode {
    /// First code of the modifier range. Everything from here up is handled
    /// through the modifier byte, never the key slots.
    pub const FIRST_MODIFIER: u8 = 0xE0;

    pub fn code(self) -> u8 {
        self.into()
    }

    /// Check if this keycode is a modifier (LCtrl..RGui).
    pub fn is_modifier(self) -> bool {
        (0xE0..=0xE7).contains(&self.code())
    }

    /// Get the modifier bit (bit 0 = LCtrl, bit 7 = RGui).
    pub fn modifier(self) -> Modifiers {
        if self.is_modifier() {
            Modifiers::from_bits_truncate(1 << (self.code() - Self::FIRST_MODIFIER))
        } else {
            Modifiers::empty()
        }
    }

    /// Display name for use in layout visualizations.
    pub fn display_name(self) -> &'static str {
        match self {
            Keycode::No => "",
            Keycode::A => "A",
            Keycode::B => "B",
            Keycode::C => "C",
            Keycode::D => "D",
            Keycode::E => "E",
            Keycode::F => "F",
            Keycode::G => "G",
            Keycode::H => "H",
            Keycode::I => "I",
            Keycode::J => "J",
            Keycode::K => "K",
            Keycode::L => "L",
            Keycode::M => "M",
            Keycode::N => "N",
            Keycode::O => "O",
            Keycode::P => "P",
            Keycode::Q => "Q",
            Keycode::R => "R",
            Keycode::S => "S",
            Keycode::T => "T",
            Keycode::U => "U",
            Keycode::V => "V",
            Keycode::W => "W",
            Keycode::X => "X",
            Keycode::Y => "Y",
            Keycode::Z => "Z",
            Keycode::N1 => "1",
            Keycode::N2 => "2",
            Keycode::N3 => "3",
            Keycode::N4 => "4",
            Keycode::N5 => "5",
            Keycode::N6 => "6",
            Keycode::N7 => "7",
            Keycode::N8 => "8",
            Keycode::N9 => "9",
            Keycode::N0 => "0",
            Keycode::Enter => "Ent",
            Keycode::Escape => "Esc",
            Keycode::Backspace => "Bksp",
            Keycode::Tab => "Tab",
            Keycode::Space => "Spc",
            Keycode::Minus => "-",
            Keycode::Equal => "=",
            Keycode::LBracket => "[",
            Keycode::RBracket => "]",
            Keycode::Backslash => "\\",
            Keycode::NonUsHash => "#~",
            Keycode::Semicolon => ";",
            Keycode::Quote => "'",
            Keycode::Grave => "`",
            Keycode::Comma => ",",
            Keycode::Dot => ".",
            Keycode::Slash => "/",
            Keycode::CapsLock => "Caps",
            Keycode::F1 => "F1",
            Keycode::F2 => "F2",
            Keycode::F3 => "F3",
            Keycode::F4 => "F4",
            Keycode::F5 => "F5",
            Keycode::F6 => "F6",
            Keycode::F7 => "F7",
            Keycode::F8 => "F8",
            Keycode::F9 => "F9",
            Keycode::F10 => "F10",
            Keycode::F11 => "F11",
            Keycode::F12 => "F12",
            Keycode::PrintScreen => "PScr",
            Keycode::ScrollLock => "ScrL",
            Keycode::Pause => "Paus",
            Keycode::Insert => "Ins",
            Keycode::Home => "Home",
            Keycode::PageUp => "PgUp",
            Keycode::Delete => "Del",
            Keycode::End => "End",
            Keycode::PageDown => "PgDn",
            Keycode::Right => "\u{2192}",
            Keycode::Left => "\u{2190}",
            Keycode::Down => "\u{2193}",
            Keycode::Up => "\u{2191}",
            Keycode::NumLock => "Num",
            Keycode::KpSlash => "P/",
            Keycode::KpAsterisk => "P*",
            Keycode::KpMinus => "P-",
            Keycode::KpPlus => "P+",
            Keycode::KpEnter => "PEnt",
            Keycode::Kp1 => "P1",
            Keycode::Kp2 => "P2",
            Keycode::Kp3 => "P3",
            Keycode::Kp4 => "P4",
            Keycode::Kp5 => "P5",
            Keycode::Kp6 => "P6",
            Keycode::Kp7 => "P7",
            Keycode::Kp8 => "P8",
            Keycode::Kp9 => "P9",
            Keycode::Kp0 => "P0",
            Keycode::KpDot => "P.",
            Keycode::NonUsBackslash => "<>",
            Keycode::Application => "App",
            Keycode::Find => "Find",
            Keycode::Mute => "Mute",
            Keycode::VolumeUp => "Vol+",
            Keycode::VolumeDown => "Vol-",
            Keycode::LCtrl => "Ctrl",
            Keycode::LShift => "Shft",
            Keycode::LAlt => "Alt",
            Keycode::LGui => "Gui",
            Keycode::RCtrl => "RCtl",
            Keycode::RShift => "RSft",
            Keycode::RAlt => "RAlt",
            Keycode::RGui => "RGui",
            Keycode::Fn => "Fn",
        }
    }
}

bitflags! {
    /// The modifier byte of a keyboard report.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const LEFT_CTRL = 1 << 0;
        const LEFT_SHIFT = 1 << 1;
        const LEFT_ALT = 1 << 2;
        const LEFT_GUI = 1 << 3;
        const RIGHT_CTRL = 1 << 4;
        const RIGHT_SHIFT = 1 << 5;
        const RIGHT_ALT = 1 << 6;
        const RIGHT_GUI = 1 << 7;
    }
}

/// Consumer page usages sent through the consumer-control interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum ConsumerUsage {
    BrightnessIncrement = 0x006F,
    BrightnessDecrement = 0x0070,
    ScanNextTrack = 0x00B5,
    ScanPreviousTrack = 0x00B6,
    PlayPause = 0x00CD,
    AlCalculator = 0x0192,
}

impl ConsumerUsage {
    pub fn code(self) -> u16 {
        self.into()
    }

    /// Wire format: little-endian usage code.
    pub fn to_le_bytes(self) -> [u8; 2] {
        self.code().to_le_bytes()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ConsumerUsage::BrightnessIncrement => "Bri+",
            ConsumerUsage::BrightnessDecrement => "Bri-",
            ConsumerUsage::ScanNextTrack => "Next",
            ConsumerUsage::ScanPreviousTrack => "Prev",
            ConsumerUsage::PlayPause => "Play",
            ConsumerUsage::AlCalculator => "Calc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_bits() {
        assert_eq!(Keycode::LCtrl.modifier(), Modifiers::LEFT_CTRL);
        assert_eq!(Keycode::RGui.modifier(), Modifiers::RIGHT_GUI);
        assert_eq!(Keycode::A.modifier(), Modifiers::empty());
        assert!(!Keycode::Fn.is_modifier());
    }

    #[test]
    fn codes_round_trip_through_u8() {
        assert_eq!(Keycode::try_from(0x7F_u8).ok(), Some(Keycode::Mute));
        assert!(Keycode::try_from(0x02_u8).is_err());
        assert_eq!(ConsumerUsage::AlCalculator.to_le_bytes(), [0x92, 0x01]);
    }
}
