//! Ghost-key rejection for a diode-less matrix.
//!
//! With no diodes, three pressed switches on the corners of a rectangle make
//! the fourth corner read as pressed too. Whenever at least three corners of
//! any two-column, two-row rectangle read as closed, none of the four corners
//! can be trusted and new presses among them are dropped for the cycle. Keys
//! that were already held when the ambiguity appeared stay held.

use crate::config::COLS;
use crate::grid::PressGrid;

/// Result of one de-ghosting pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deghosted {
    pub grid: PressGrid,
    /// Raw presses that were dropped this cycle.
    pub suppressed: u32,
}

/// Filter a raw sample.
///
/// `held` marks coordinates whose key was reported as pressed last cycle; they
/// are never suppressed. Ambiguity is always judged on the raw sample so that
/// clearing one column can't hide a ghost elsewhere.
pub fn deghost(raw: &PressGrid, held: &PressGrid) -> Deghosted {
    let mut suppress = [0u32; COLS];

    for c1 in 0..COLS {
        let a = raw.column(c1);
        if a == 0 {
            continue;
        }
        for c2 in (c1 + 1)..COLS {
            let b = raw.column(c2);
            // Three corners of a rectangle are closed iff one row is closed in
            // both columns and some other row in at least one of them. Every
            // closed position of the pair is then a corner of such a rectangle.
            let shared = a & b;
            let either = a | b;
            if shared != 0 && either.count_ones() >= 2 {
                suppress[c1] |= either;
                suppress[c2] |= either;
            }
        }
    }

    let mut grid = PressGrid::new();
    let mut suppressed = 0;
    for (col, mask) in suppress.iter().enumerate() {
        let rows = raw.column(col);
        let dropped = rows & mask & !held.column(col);
        grid.set_column(col, rows & !dropped);
        suppressed += dropped.count_ones();
    }

    if suppressed > 0 {
        debug!("deghost: suppressed {} presses", suppressed);
    }

    Deghosted { grid, suppressed }
}
