//! Build-time configuration of the scanner.

/// Number of driven column lines.
pub const COLS: usize = 8;
/// Number of sensed row lines.
pub const ROWS: usize = 17;

/// Simultaneous normal keys carried by one keyboard report.
pub const ROLLOVER: usize = 6;

/// Period of the scan loop. Together with edge-triggered reporting this gives
/// coarse debouncing at human typing speed.
pub const SCAN_PERIOD_MS: u16 = 10;

/// Delay between driving a column and reading the rows. Must exceed the RC
/// settling time of the (diode-less) matrix wiring.
pub const SETTLE_DELAY_US: u16 = 50;

// Row masks are packed into a u32 per column.
const _: () = assert!(ROWS <= 32);
