//! Scan scripts for the simulator.
//!
//! One line per scan cycle. A line lists the switches closed during that
//! cycle, either as `col,row` pairs or as base-layer key names (`Fn`, `Esc`,
//! `G`, ...). An empty line or `idle` is a cycle with nothing pressed. A
//! trailing `xN` repeats the cycle N times. `#` starts a comment.
//!
//! `back` and `skip` stand for the two buttons wired next to the matrix. Only
//! `detect` acts on them; at most one of them fits on a line.
//!
//! ```text
//! # Fn lock on, then play/pause
//! Fn Esc
//! idle
//! F5 x3
//! ```

use anyhow::{bail, Context, Result};
use ct1_keyboard::{Coord, Keymap, PressGrid, COLS, ROWS};

/// The buttons outside the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Back,
    Skip,
}

/// One scripted cycle, possibly repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 1-based line in the script.
    pub line: usize,
    pub grid: PressGrid,
    pub button: Option<Button>,
    pub repeat: u32,
}

/// Parse a script. Key names are looked up in the base layer of `keymap`.
pub fn parse_script(input: &str, keymap: &Keymap) -> Result<Vec<Step>> {
    let mut steps = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let line_num = line_num + 1;
        let (line, commented) = match line.split_once('#') {
            Some((code, _)) => (code, true),
            None => (line, false),
        };

        let mut tokens: Vec<&str> = line.split_whitespace().collect();

        // A line holding only a comment is not a cycle.
        if tokens.is_empty() && commented {
            continue;
        }

        let repeat = match tokens.last().copied().and_then(|t| t.strip_prefix('x')) {
            Some(count) if !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()) => {
                tokens.pop();
                let n: u32 = count
                    .parse()
                    .with_context(|| format!("line {}: invalid repeat count", line_num))?;
                if n == 0 {
                    bail!("line {}: repeat count must be at least 1", line_num);
                }
                n
            }
            _ => 1,
        };

        let mut grid = PressGrid::new();
        let mut button = None;
        for token in tokens {
            if token.eq_ignore_ascii_case("idle") {
                continue;
            }
            let pressed = if token.eq_ignore_ascii_case("back") {
                Some(Button::Back)
            } else if token.eq_ignore_ascii_case("skip") {
                Some(Button::Skip)
            } else {
                None
            };
            if let Some(pressed) = pressed {
                if button.replace(pressed).is_some() {
                    bail!("line {}: only one of `back` and `skip` per line", line_num);
                }
                continue;
            }
            let coord = parse_key(token, keymap)
                .with_context(|| format!("line {}: bad key `{}`", line_num, token))?;
            grid.set(coord);
        }

        steps.push(Step {
            line: line_num,
            grid,
            button,
            repeat,
        });
    }

    Ok(steps)
}

fn parse_key(token: &str, keymap: &Keymap) -> Result<Coord> {
    if let Some((col, row)) = token.split_once(',') {
        let col: usize = col.trim().parse().context("invalid column")?;
        let row: usize = row.trim().parse().context("invalid row")?;
        return match Coord::new(col, row) {
            Some(coord) => Ok(coord),
            None => bail!("position outside the {}x{} matrix", COLS, ROWS),
        };
    }

    let mut found = (0..COLS)
        .flat_map(|col| (0..ROWS).filter_map(move |row| Coord::new(col, row)))
        .filter(|&coord| {
            let name = keymap.base_key(coord).display_name();
            !name.is_empty() && name.eq_ignore_ascii_case(token)
        });

    match (found.next(), found.next()) {
        (Some(coord), None) => Ok(coord),
        (Some(_), Some(_)) => bail!("name is on more than one key, use col,row"),
        (None, _) => bail!("no key with that name in the base layer"),
    }
}
