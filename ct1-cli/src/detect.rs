//! Learn a board's wiring from a scan script.
//!
//! Feeds every scripted cycle to a [`Learner`], then prints the learned table
//! in the same form as the keymap source so it can be pasted back in.

use ct1_keyboard::{Keycode, Learner, Progress, COLS, ROWS};

use crate::script::{Button, Step};

/// Run `steps` through `learner`, printing and returning what happened.
pub fn run(learner: &mut Learner, steps: &[Step]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut emit = |line: String| {
        println!("{line}");
        lines.push(line);
    };

    let mut prompted = None;
    for step in steps {
        for _ in 0..step.repeat {
            if prompted != Some(learner.position()) {
                prompted = Some(learner.position());
                if let Some(key) = learner.prompt() {
                    emit(format!("press '{}'", key.display_name()));
                }
            }

            match learner.feed(&step.grid) {
                Progress::Assigned { key, coord } => emit(format!(
                    "'{}' assigned to [{},{}]",
                    key.display_name(),
                    coord.col(),
                    coord.row()
                )),
                Progress::AlreadyAssigned { coord, owner } => emit(format!(
                    "[{},{}] already assigned to '{}'",
                    coord.col(),
                    coord.row(),
                    owner.display_name()
                )),
                Progress::Waiting | Progress::Finished => {}
            }

            match step.button {
                Some(Button::Back) => match learner.back() {
                    Some(key) => emit(format!("back to '{}'", key.display_name())),
                    None => emit("back: already at the first key".to_string()),
                },
                Some(Button::Skip) => {
                    if let Some(key) = learner.skip() {
                        emit(format!("skipped '{}'", key.display_name()));
                    }
                }
                None => {}
            }
        }
    }

    lines
}

/// Name of a key as written in the keymap tables.
fn table_name(key: Keycode) -> String {
    let alias = match key {
        Keycode::No => "___",
        Keycode::Escape => "ESC",
        Keycode::Tab => "TAB",
        Keycode::Enter => "ENT",
        Keycode::Space => "SPC",
        Keycode::Backspace => "BSP",
        Keycode::LCtrl => "LCTL",
        Keycode::LShift => "LSFT",
        Keycode::LAlt => "LALT",
        Keycode::LGui => "LGUI",
        Keycode::RCtrl => "RCTL",
        Keycode::RShift => "RSFT",
        Keycode::RAlt => "RALT",
        Keycode::Fn => "FN",
        _ => return format!("{key:?}"),
    };
    alias.to_string()
}

/// The learned layout as a `BASE_LAYER` definition.
pub fn render_table(table: &[[Keycode; ROWS]; COLS]) -> String {
    let mut out = String::new();
    out.push_str("pub const BASE_LAYER: [[Keycode; ROWS]; COLS] = {\n");
    out.push_str("    use Keycode::*;\n");
    out.push_str("    [\n");
    for (col, keys) in table.iter().enumerate() {
        let names: Vec<String> = keys.iter().map(|&key| table_name(key)).collect();
        out.push_str(&format!("        // Col {col}\n"));
        out.push_str(&format!("        [{}],\n", names.join(", ")));
    }
    out.push_str("    ]\n");
    out.push_str("};");
    out
}

pub fn render_skipped(learner: &Learner) -> String {
    let names: Vec<&str> = learner.skipped().map(|key| key.display_name()).collect();
    if names.is_empty() {
        "Skipped keys: none".to_string()
    } else {
        format!("Skipped keys: {}", names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use ct1_keyboard::keymap::BASE_LAYER;
    use ct1_keyboard::{Coord, PressGrid, KEYMAP, LEARN_ORDER};

    const KEYS: &[Keycode] = &[Keycode::A, Keycode::B, Keycode::C];

    #[test]
    fn test_run_script() {
        let script = "2,3\nidle\n2,3\nback\n2,3\nskip\n0,0\n";
        let steps = parse_script(script, &KEYMAP).unwrap();
        let mut learner = Learner::new(KEYS);
        let lines = run(&mut learner, &steps);

        assert_eq!(
            lines,
            [
                "press 'A'",
                "'A' assigned to [2,3]",
                "press 'B'",
                "[2,3] already assigned to 'A'",
                "back to 'A'",
                "press 'A'",
                "'A' assigned to [2,3]",
                "press 'B'",
                "skipped 'B'",
                "press 'C'",
                "'C' assigned to [0,0]",
            ]
        );
        assert!(learner.is_finished());
        assert_eq!(render_skipped(&learner), "Skipped keys: B");
    }

    #[test]
    fn test_render_matches_keymap_source() {
        let text = render_table(&BASE_LAYER);
        assert_eq!(text.lines().count(), 5 + 2 * COLS);
        assert!(text.contains(
            "        [G, ___, F4, ESC, ___, ___, ___, ___, LALT, Up, Kp1, Kp0, F5, Quote, ___, F6, H],\n"
        ));
        assert!(text.contains("        // Col 7\n"));
    }

    #[test]
    fn test_learns_shipped_layout() {
        let mut steps = Vec::new();
        for (line, &key) in LEARN_ORDER.iter().enumerate() {
            let coord = (0..COLS)
                .flat_map(|col| (0..ROWS).filter_map(move |row| Coord::new(col, row)))
                .find(|&coord| KEYMAP.base_key(coord) == key);
            let step = match coord {
                Some(coord) => Step {
                    line,
                    grid: [coord].into_iter().collect(),
                    button: None,
                    repeat: 1,
                },
                None => Step {
                    line,
                    grid: PressGrid::new(),
                    button: Some(Button::Skip),
                    repeat: 1,
                },
            };
            steps.push(step);
        }

        let mut learner = Learner::new(LEARN_ORDER);
        run(&mut learner, &steps);

        assert!(learner.is_finished());
        assert_eq!(learner.table(), &BASE_LAYER);
        assert!(learner.skipped().any(|key| key == Keycode::ScrollLock));
    }
}
