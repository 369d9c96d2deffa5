//! Matrix sampling.
//!
//! Columns are driven one at a time (active low on the hardware), and after a
//! settle delay every row line is read. No debouncing happens here; the fixed
//! scan period plus edge-triggered reporting covers human typing speed.

use crate::config::{COLS, ROWS};
use crate::grid::PressGrid;

/// GPIO access for the matrix lines.
pub trait MatrixIo {
    /// Drive `col` active and every other column inactive.
    fn select_column(&mut self, col: usize);

    /// Wait until the row lines reflect the selected column.
    fn settle(&mut self);

    /// Whether the switch at (selected column, `row`) is closed.
    fn read_row(&mut self, row: usize) -> bool;

    /// All rows of the selected column, bit `r` = row `r` closed.
    ///
    /// Implementations that can read whole ports at once should override this.
    fn read_rows(&mut self) -> u32 {
        (0..ROWS).fold(0, |mask, row| {
            if self.read_row(row) {
                mask | (1 << row)
            } else {
                mask
            }
        })
    }

    /// Return every column to inactive after a sweep.
    fn unselect_all(&mut self);
}

impl<M: MatrixIo + ?Sized> MatrixIo for &mut M {
    fn select_column(&mut self, col: usize) {
        (**self).select_column(col)
    }

    fn settle(&mut self) {
        (**self).settle()
    }

    fn read_row(&mut self, row: usize) -> bool {
        (**self).read_row(row)
    }

    fn read_rows(&mut self) -> u32 {
        (**self).read_rows()
    }

    fn unselect_all(&mut self) {
        (**self).unselect_all()
    }
}

/// Sweep the matrix once and return the raw press grid.
pub fn sample<M: MatrixIo>(io: &mut M) -> PressGrid {
    let mut grid = PressGrid::new();
    for col in 0..COLS {
        io.select_column(col);
        io.settle();
        grid.set_column(col, io.read_rows());
    }
    io.unselect_all();
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coord;

    /// Switches closed at fixed positions; records the drive sequence.
    struct FakeMatrix {
        closed: PressGrid,
        selected: Option<usize>,
        settled: bool,
        sweeps: usize,
    }

    impl MatrixIo for FakeMatrix {
        fn select_column(&mut self, col: usize) {
            self.selected = Some(col);
            self.settled = false;
        }

        fn settle(&mut self) {
            self.settled = true;
        }

        fn read_row(&mut self, row: usize) -> bool {
            assert!(self.settled, "row read before settle delay");
            self.selected
                .and_then(|col| Coord::new(col, row))
                .is_some_and(|c| self.closed.get(c))
        }

        fn unselect_all(&mut self) {
            self.selected = None;
            self.sweeps += 1;
        }
    }

    #[test]
    fn sample_reads_every_column() {
        let closed: PressGrid = [(0, 0), (4, 5), (7, 16)]
            .into_iter()
            .filter_map(|(c, r)| Coord::new(c, r))
            .collect();
        let mut io = FakeMatrix {
            closed,
            selected: None,
            settled: false,
            sweeps: 0,
        };

        let raw = sample(&mut io);
        assert_eq!(raw, closed);
        assert_eq!(io.selected, None);
        assert_eq!(io.sweeps, 1);
    }
}
