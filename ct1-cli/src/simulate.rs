//! Drive the real scanner with scripted cycles and print what it emits.

use ct1_keyboard::{
    ConsumerUsage, Emission, HidTransport, KeyboardReport, Keycode, Keymap, NotReady, Scanner,
};
use log::{info, warn};

use crate::script::Step;

/// Transport that prints every report it is handed.
#[derive(Default)]
pub struct Printer {
    cycle: u32,
    pub lines: Vec<String>,
}

impl Printer {
    fn emit(&mut self, line: String) {
        println!("{line}");
        self.lines.push(line);
    }
}

impl HidTransport for Printer {
    fn submit_keyboard(&mut self, report: &KeyboardReport) -> Result<(), NotReady> {
        let line = format!("{:>5}  keyboard  {}", self.cycle, describe_keyboard(report));
        self.emit(line);
        Ok(())
    }

    fn submit_consumer(&mut self, usage: Option<ConsumerUsage>) -> Result<(), NotReady> {
        let text = match usage {
            Some(usage) => format!("{} (0x{:04X})", usage.display_name(), usage.code()),
            None => "release".to_string(),
        };
        let line = format!("{:>5}  consumer  {}", self.cycle, text);
        self.emit(line);
        Ok(())
    }
}

fn describe_keyboard(report: &KeyboardReport) -> String {
    if report.is_empty() {
        return "release".to_string();
    }

    let mut parts: Vec<String> = report
        .modifiers()
        .iter_names()
        .map(|(name, _)| name.to_string())
        .collect();

    for &code in report.keys.iter().filter(|&&k| k != 0) {
        let name = match Keycode::try_from(code) {
            Ok(kc) => kc.display_name().to_string(),
            Err(_) => format!("0x{code:02X}"),
        };
        parts.push(name);
    }

    parts.join(" ")
}

/// Totals over a whole script run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub cycles: u32,
    pub keyboard_reports: u32,
    pub consumer_reports: u32,
    pub suppressed: u32,
    pub overflows: u32,
    pub fn_locked: bool,
    pub backlight: bool,
}

pub fn run(keymap: &Keymap, steps: &[Step], printer: &mut Printer) -> Summary {
    let mut scanner = Scanner::new(keymap);
    let mut summary = Summary::default();

    for step in steps {
        if let Some(button) = step.button {
            warn!("line {}: {:?} button ignored while simulating", step.line, button);
        }
        for _ in 0..step.repeat {
            printer.cycle = summary.cycles;
            let out = scanner.cycle(&step.grid, printer);

            if out.suppressed > 0 {
                info!(
                    "cycle {} (line {}): {} ghost presses suppressed",
                    summary.cycles, step.line, out.suppressed
                );
            }
            if out.overflow {
                info!("cycle {} (line {}): rollover overflow", summary.cycles, step.line);
            }

            summary.cycles += 1;
            summary.keyboard_reports += u32::from(out.keyboard == Emission::Sent);
            summary.consumer_reports += u32::from(out.consumer == Emission::Sent);
            summary.suppressed += out.suppressed;
            summary.overflows += u32::from(out.overflow);
        }
    }

    summary.fn_locked = scanner.fn_locked();
    summary.backlight = scanner.backlight();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use ct1_keyboard::{Modifiers, KEYMAP};

    #[test]
    fn test_describe_keyboard() {
        let report = KeyboardReport::new(Modifiers::LEFT_SHIFT, [0x0A, 0x65, 0, 0, 0, 0]);
        assert_eq!(describe_keyboard(&report), "LEFT_SHIFT G App");
        assert_eq!(describe_keyboard(&KeyboardReport::empty()), "release");
    }

    #[test]
    fn test_run_script() {
        let script = "G x2\nidle x3\nFn Esc\nidle\nF5\nidle\n";
        let steps = parse_script(script, &KEYMAP).unwrap();
        let mut printer = Printer::default();
        let summary = run(&KEYMAP, &steps, &mut printer);

        assert_eq!(summary.cycles, 9);
        assert_eq!(summary.keyboard_reports, 3);
        assert_eq!(summary.consumer_reports, 2);
        assert!(summary.fn_locked);
        assert_eq!(printer.lines.len(), 5);
        assert!(printer.lines[0].ends_with("keyboard  G"));
        assert!(printer.lines[3].contains("Play"));
    }
}
