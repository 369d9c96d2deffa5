//! Key matrix GPIO for the CT1 board on a Teensy 2.0.
//!
//! 8 drive columns (active-low outputs) and 17 sense rows (inputs with
//! pull-ups, a closed switch reads low). There are no diodes; ghost
//! rejection happens in `ct1_keyboard::deghost`.
//!
//! Pin mapping:
//!   Columns 0-6: PB0-PB6, column 7: PD6
//!   Rows 0-5:    PF0, PF1, PF4, PF5, PF6, PF7
//!   Rows 6-11:   PD0-PD5
//!   Row 12:      PD7
//!   Rows 13-14:  PC6, PC7
//!   Row 15:      PE6
//!   Row 16:      PB7

use avr_device::atmega32u4::Peripherals;
use ct1_keyboard::config::SETTLE_DELAY_US;
use ct1_keyboard::MatrixIo;

/// Column drive bits on PORTB (PB0-PB6).
const COL_MASK_B: u8 = 0x7F;
/// Column 7 drive bit on PORTD (PD6).
const COL_MASK_D: u8 = 0x40;

const ROW_MASK_F: u8 = 0xF3;
const ROW_MASK_D: u8 = 0xBF;
const ROW_MASK_C: u8 = 0xC0;
const ROW_MASK_E: u8 = 0x40;
const ROW_MASK_B: u8 = 0x80;

/// Configure column outputs (idle high) and row inputs with pull-ups.
pub fn init_gpio(dp: &Peripherals) {
    // Columns: output, drive high
    dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits((r.bits() | COL_MASK_B) & !ROW_MASK_B) });
    dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK_B | ROW_MASK_B) });
    dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits((r.bits() | COL_MASK_D) & !ROW_MASK_D) });
    dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK_D | ROW_MASK_D) });

    // Rows: input with pull-up
    dp.PORTF.ddrf.modify(|r, w| unsafe { w.bits(r.bits() & !ROW_MASK_F) });
    dp.PORTF.portf.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK_F) });
    dp.PORTC.ddrc.modify(|r, w| unsafe { w.bits(r.bits() & !ROW_MASK_C) });
    dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK_C) });
    dp.PORTE.ddre.modify(|r, w| unsafe { w.bits(r.bits() & !ROW_MASK_E) });
    dp.PORTE.porte.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK_E) });
}

/// GPIO-backed [`MatrixIo`].
pub struct AvrMatrix<'a> {
    dp: &'a Peripherals,
}

impl<'a> AvrMatrix<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }
}

impl MatrixIo for AvrMatrix<'_> {
    fn select_column(&mut self, col: usize) {
        self.unselect_all();

        // Only column bits change; PB7 and the PORTD row pull-ups stay set.
        match col {
            0..=6 => self
                .dp
                .PORTB
                .portb
                .modify(|r, w| unsafe { w.bits(r.bits() & !(1 << col)) }),
            7 => self
                .dp
                .PORTD
                .portd
                .modify(|r, w| unsafe { w.bits(r.bits() & !COL_MASK_D) }),
            _ => {}
        }
    }

    fn settle(&mut self) {
        delay_us(SETTLE_DELAY_US);
    }

    fn read_row(&mut self, row: usize) -> bool {
        self.read_rows() & (1 << row) != 0
    }

    /// All 17 rows from five port reads. Active low, inverted here.
    fn read_rows(&mut self) -> u32 {
        let pinf = !self.dp.PORTF.pinf.read().bits();
        let pind = !self.dp.PORTD.pind.read().bits();
        let pinc = !self.dp.PORTC.pinc.read().bits();
        let pine = !self.dp.PORTE.pine.read().bits();
        let pinb = !self.dp.PORTB.pinb.read().bits();

        let f = (pinf & 0x03) as u32 | (((pinf >> 4) & 0x0F) as u32) << 2;
        let d = ((pind & 0x3F) as u32) << 6 | (((pind >> 7) & 1) as u32) << 12;
        let c = (((pinc >> 6) & 0x03) as u32) << 13;
        let e = (((pine >> 6) & 1) as u32) << 15;
        let b = (((pinb >> 7) & 1) as u32) << 16;

        f | d | c | e | b
    }

    fn unselect_all(&mut self) {
        self.dp
            .PORTB
            .portb
            .modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK_B) });
        self.dp
            .PORTD
            .portd
            .modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK_D) });
    }
}

/// Busy-wait delay in microseconds (approximate, at 16MHz).
fn delay_us(us: u16) {
    for _ in 0..us {
        // ~16 cycles per iteration with loop overhead
        for _ in 0..4u8 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
