//! Matrix coordinates and packed press grids.

use crate::config::{COLS, ROWS};

/// One physical switch position: the driven column and the sensed row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    col: u8,
    row: u8,
}

impl Coord {
    /// Returns `None` when the position lies outside the matrix.
    pub const fn new(col: usize, row: usize) -> Option<Coord> {
        if col < COLS && row < ROWS {
            Some(Coord {
                col: col as u8,
                row: row as u8,
            })
        } else {
            None
        }
    }

    pub const fn col(self) -> usize {
        self.col as usize
    }

    pub const fn row(self) -> usize {
        self.row as usize
    }
}

/// A boolean matrix, one bit per coordinate.
///
/// Each column is a row mask (bit `r` = row `r`), which lets the de-ghoster
/// compare two whole columns with a single AND.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct PressGrid {
    cols: [u32; COLS],
}

impl PressGrid {
    /// Mask of the bits that correspond to real rows.
    pub const ROW_MASK: u32 = if ROWS == 32 { u32::MAX } else { (1 << ROWS) - 1 };

    pub const fn new() -> Self {
        Self { cols: [0; COLS] }
    }

    pub fn get(&self, coord: Coord) -> bool {
        self.cols[coord.col()] & (1 << coord.row()) != 0
    }

    pub fn set(&mut self, coord: Coord) {
        self.cols[coord.col()] |= 1 << coord.row();
    }

    /// Row mask of one column. Columns past the matrix read as empty.
    pub fn column(&self, col: usize) -> u32 {
        self.cols.get(col).copied().unwrap_or(0)
    }

    /// Replace a whole column, dropping bits beyond the last row.
    pub fn set_column(&mut self, col: usize, rows: u32) {
        if let Some(slot) = self.cols.get_mut(col) {
            *slot = rows & Self::ROW_MASK;
        }
    }

    pub fn clear(&mut self) {
        self.cols = [0; COLS];
    }

    pub fn is_empty(&self) -> bool {
        self.cols.iter().all(|&c| c == 0)
    }

    /// Active coordinates, column by column, rows ascending (scan order).
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cols.iter().enumerate().flat_map(|(col, &mask)| {
            (0..ROWS)
                .filter(move |row| mask & (1 << row) != 0)
                .filter_map(move |row| Coord::new(col, row))
        })
    }
}

impl core::fmt::Debug for PressGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Coord> for PressGrid {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut grid = PressGrid::new();
        for coord in iter {
            grid.set(coord);
        }
        grid
    }
}
