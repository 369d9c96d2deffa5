//! End-to-end scan cycles against the shipped keymap.

use ct1_keyboard::{
    ConsumerUsage, Coord, Emission, HidTransport, KeyboardReport, Keycode, Modifiers, NotReady,
    PressGrid, Scanner, KEYMAP,
};

// Positions in the shipped keymap, (col, row).
const G: (usize, usize) = (0, 0);
const T: (usize, usize) = (1, 0);
const R: (usize, usize) = (2, 0);
const N5: (usize, usize) = (3, 0);
const F: (usize, usize) = (4, 0);
const N4: (usize, usize) = (5, 0);
const V: (usize, usize) = (6, 0);
const B: (usize, usize) = (7, 0);
const F4: (usize, usize) = (0, 2);
const F3: (usize, usize) = (1, 2);
const ESC: (usize, usize) = (0, 3);
const F5: (usize, usize) = (0, 12);
const LSHIFT: (usize, usize) = (1, 6);
const FN: (usize, usize) = (4, 5);

fn grid(coords: &[(usize, usize)]) -> PressGrid {
    coords
        .iter()
        .map(|&(col, row)| Coord::new(col, row).unwrap())
        .collect()
}

#[derive(Default)]
struct Recorder {
    keyboard: Vec<KeyboardReport>,
    consumer: Vec<Option<ConsumerUsage>>,
}

impl HidTransport for Recorder {
    fn submit_keyboard(&mut self, report: &KeyboardReport) -> Result<(), NotReady> {
        self.keyboard.push(*report);
        Ok(())
    }

    fn submit_consumer(&mut self, usage: Option<ConsumerUsage>) -> Result<(), NotReady> {
        self.consumer.push(usage);
        Ok(())
    }
}

fn keys(codes: &[Keycode]) -> [u8; 6] {
    let mut out = [0; 6];
    for (slot, kc) in out.iter_mut().zip(codes) {
        *slot = kc.code();
    }
    out
}

#[test]
fn press_release_idle_emits_two_reports() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[G]), &mut t);
    scanner.cycle(&PressGrid::new(), &mut t);
    let idle = scanner.cycle(&PressGrid::new(), &mut t);

    assert_eq!(idle.keyboard, Emission::Suppressed);
    assert_eq!(
        t.keyboard,
        [
            KeyboardReport::new(Modifiers::empty(), keys(&[Keycode::G])),
            KeyboardReport::empty(),
        ]
    );
    assert!(t.consumer.is_empty());
}

#[test]
fn held_key_repeats_report_each_cycle() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    for _ in 0..3 {
        scanner.cycle(&grid(&[LSHIFT, G]), &mut t);
    }
    assert_eq!(t.keyboard.len(), 3);
    assert_eq!(t.keyboard[2].modifiers(), Modifiers::LEFT_SHIFT);
    assert_eq!(t.keyboard[2].keys, keys(&[Keycode::G]));
}

#[test]
fn seven_new_keys_keep_first_six() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    let out = scanner.cycle(&grid(&[G, T, R, N5, F, N4, V]), &mut t);
    assert!(out.overflow);
    assert_eq!(out.suppressed, 0);
    assert_eq!(
        t.keyboard[0].keys,
        keys(&[Keycode::G, Keycode::T, Keycode::R, Keycode::N5, Keycode::F, Keycode::N4])
    );
}

#[test]
fn full_buffer_of_held_keys_drops_new_key() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    let six = [T, R, N5, F, N4, V];
    scanner.cycle(&grid(&six), &mut t);

    let mut seven = six.to_vec();
    seven.push(B);
    let out = scanner.cycle(&grid(&seven), &mut t);
    assert!(out.overflow);
    assert_eq!(t.keyboard[1].keys, t.keyboard[0].keys);
    assert!(!scanner.pressed().contains(Keycode::B.code()));
}

#[test]
fn held_key_scanned_late_keeps_its_slot() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    // B sits in the last column, after six new keys in scan order.
    scanner.cycle(&grid(&[B]), &mut t);
    let out = scanner.cycle(&grid(&[G, T, R, N5, F, N4, B]), &mut t);

    assert!(!out.overflow);
    assert!(t.keyboard[1].keys.contains(&Keycode::B.code()));
    assert!(!t.keyboard[1].keys.contains(&Keycode::G.code()));
}

#[test]
fn ghost_triangle_is_fully_suppressed() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    // G, T and F4 are three corners of the columns 0/1, rows 0/2 rectangle.
    let out = scanner.cycle(&grid(&[G, T, F4]), &mut t);
    assert_eq!(out.suppressed, 3);
    assert_eq!(out.keyboard, Emission::Suppressed);
    assert!(t.keyboard.is_empty());
}

#[test]
fn held_key_survives_ghost_pattern() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[G]), &mut t);
    let out = scanner.cycle(&grid(&[G, T, F4, F3]), &mut t);

    assert_eq!(out.suppressed, 3);
    assert_eq!(t.keyboard[1].keys, keys(&[Keycode::G]));

    // Once the ambiguity clears, the other key comes through.
    scanner.cycle(&grid(&[G, T]), &mut t);
    assert_eq!(t.keyboard[2].keys, keys(&[Keycode::G, Keycode::T]));
}

#[test]
fn fn_lock_twice_restores_function_row() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[F5]), &mut t);
    scanner.cycle(&PressGrid::new(), &mut t);
    let before = t.keyboard.clone();
    assert_eq!(before[0].keys, keys(&[Keycode::F5]));

    // Lock: F5 now plays/pauses.
    scanner.cycle(&grid(&[FN, ESC]), &mut t);
    scanner.cycle(&PressGrid::new(), &mut t);
    assert!(scanner.fn_locked());
    scanner.cycle(&grid(&[F5]), &mut t);
    scanner.cycle(&PressGrid::new(), &mut t);
    assert_eq!(t.consumer, [Some(ConsumerUsage::PlayPause), None]);

    // Holding Fn while locked gives the plain key back.
    scanner.cycle(&grid(&[FN, F5]), &mut t);
    assert_eq!(t.keyboard.last().map(|r| r.keys), Some(keys(&[Keycode::F5])));
    scanner.cycle(&PressGrid::new(), &mut t);

    // Unlock.
    scanner.cycle(&grid(&[FN, ESC]), &mut t);
    scanner.cycle(&PressGrid::new(), &mut t);
    assert!(!scanner.fn_locked());

    let mark = t.keyboard.len();
    scanner.cycle(&grid(&[F5]), &mut t);
    scanner.cycle(&PressGrid::new(), &mut t);
    assert_eq!(t.keyboard[mark..], before[..]);
    assert_eq!(t.consumer.len(), 2);
}

#[test]
fn consumer_press_and_release() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[FN, F4]), &mut t);
    scanner.cycle(&grid(&[FN, F4]), &mut t);
    scanner.cycle(&grid(&[FN]), &mut t);
    let out = scanner.cycle(&grid(&[FN]), &mut t);

    assert_eq!(out.consumer, Emission::Suppressed);
    assert_eq!(
        t.consumer,
        [
            Some(ConsumerUsage::ScanPreviousTrack),
            Some(ConsumerUsage::ScanPreviousTrack),
            None,
        ]
    );
    assert!(t.keyboard.is_empty());
}

#[test]
fn fn_layer_extended_keys_use_keyboard_report() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    // RCtrl with Fn held is the Application key.
    scanner.cycle(&grid(&[FN, (6, 7)]), &mut t);
    assert_eq!(t.keyboard[0].keys, keys(&[Keycode::Application]));
    assert_eq!(t.keyboard[0].modifiers(), Modifiers::empty());
}

#[test]
fn held_modifier_survives_ghost_pattern() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[LSHIFT]), &mut t);
    // T shares row 0 with G and column 1 with LShift.
    let out = scanner.cycle(&grid(&[LSHIFT, T, G]), &mut t);

    assert_eq!(out.suppressed, 2);
    assert_eq!(t.keyboard[1].modifiers(), Modifiers::LEFT_SHIFT);
    assert_eq!(t.keyboard[1].keys, [0; 6]);
}

#[test]
fn held_fn_survives_ghost_pattern() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[FN]), &mut t);
    let out = scanner.cycle(&grid(&[FN, F, N4]), &mut t);
    assert_eq!(out.suppressed, 2);
    assert!(t.keyboard.is_empty());

    // Still on the Fn layer: F4 is previous track.
    scanner.cycle(&grid(&[FN, F4]), &mut t);
    assert_eq!(t.consumer, [Some(ConsumerUsage::ScanPreviousTrack)]);
    assert!(t.keyboard.is_empty());
}

#[test]
fn held_consumer_key_survives_ghost_pattern() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[FN, F4]), &mut t);
    let out = scanner.cycle(&grid(&[FN, F4, F3, G]), &mut t);

    assert_eq!(out.suppressed, 2);
    assert_eq!(
        t.consumer,
        [
            Some(ConsumerUsage::ScanPreviousTrack),
            Some(ConsumerUsage::ScanPreviousTrack),
        ]
    );
    assert!(t.keyboard.is_empty());
}

#[test]
fn held_meta_key_survives_ghost_pattern() {
    let mut scanner = Scanner::new(&KEYMAP);
    let mut t = Recorder::default();

    scanner.cycle(&grid(&[FN, ESC]), &mut t);
    assert!(scanner.fn_locked());

    // Esc stays down through the ghost, so releasing the others is not a
    // second press.
    let out = scanner.cycle(&grid(&[FN, ESC, G, T]), &mut t);
    assert_eq!(out.suppressed, 2);
    scanner.cycle(&grid(&[FN, ESC]), &mut t);
    assert!(scanner.fn_locked());
}
