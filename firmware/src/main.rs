//! CT1 keyboard firmware for ATmega32U4 (Teensy 2.0).
//!
//! The main loop polls USB every millisecond and, once the host has
//! configured the device, runs one scan cycle every `SCAN_PERIOD_MS`:
//! - 8x17 diode-less matrix sampled over GPIO
//! - ghost rejection, Fn layer and Fn lock, 6-key rollover
//! - boot keyboard and consumer-control HID reports

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod matrix;
mod usb;

use avr_device::atmega32u4::Peripherals;
use ct1_keyboard::config::SCAN_PERIOD_MS;
use ct1_keyboard::{Scanner, KEYMAP};

use matrix::AvrMatrix;
use usb::UsbHid;

/// Panic handler. On AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler (CLKPR)
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) }); // Prescaler = 1

    // PD6 is column 7 on this board, not the on-board LED.
    matrix::init_gpio(&dp);
    let mut matrix = AvrMatrix::new(&dp);

    let mut usb = UsbHid::new(&dp);
    usb.init();

    let mut scanner = Scanner::new(&KEYMAP);
    let mut tick: u16 = 0;

    loop {
        // Poll USB (handle enumeration, control requests)
        usb.poll();

        if usb.is_configured() {
            if tick == 0 {
                scanner.scan(&mut matrix, &mut usb);
            }
            tick = (tick + 1) % SCAN_PERIOD_MS;
        } else {
            tick = 0;
        }

        delay_ms(1);
    }
}

/// Busy-wait delay in milliseconds (approximate, at 16MHz).
fn delay_ms(ms: u16) {
    for _ in 0..ms {
        // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
        for _ in 0..4000u16 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
