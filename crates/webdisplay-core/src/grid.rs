//! Logical pixel grid of a monochrome panel

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// A `rows x columns` grid of binary pixels.
///
/// The corners have the following `(row, column)` coordinates:
/// (0, 0)        (0, columns-1)
/// (rows-1, 0)   (rows-1, columns-1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    pixels: Vec<bool>,
    rows: usize,
    columns: usize,
}

impl PixelGrid {
    /// Create a grid with every pixel cleared.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            pixels: vec![false; rows * columns],
            rows,
            columns,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// `(rows, columns)`, the shape two grids must share to be aggregated.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Whether the pixel at `(row, column)` is lit. Out-of-range reads are unlit.
    pub fn get(&self, row: usize, column: usize) -> bool {
        if row < self.rows && column < self.columns {
            self.pixels[row * self.columns + column]
        } else {
            false
        }
    }

    /// Set the pixel at `(row, column)`; out-of-range writes are ignored.
    pub fn set(&mut self, row: usize, column: usize, lit: bool) {
        if row < self.rows && column < self.columns {
            self.pixels[row * self.columns + column] = lit;
        }
    }

    /// Pixels of one row, left to right. Out-of-range rows are empty.
    pub fn row(&self, row: usize) -> &[bool] {
        if row >= self.rows {
            return &[];
        }
        let start = row * self.columns;
        &self.pixels[start..start + self.columns]
    }

    /// Number of lit pixels.
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }
}

impl fmt::Display for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for pixel in self.row(row) {
                if *pixel {
                    write!(f, "#")?;
                } else {
                    write!(f, ".")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_new_grid_is_clear() {
        let grid = PixelGrid::new(16, 8);
        assert_eq!(grid.dimensions(), (16, 8));
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = PixelGrid::new(4, 4);
        grid.set(2, 3, true);
        assert!(grid.get(2, 3));
        assert!(!grid.get(3, 2));
        assert_eq!(grid.lit_count(), 1);

        grid.set(2, 3, false);
        assert_eq!(grid.lit_count(), 0);
    }

    #[test]
    fn test_out_of_range_access() {
        let mut grid = PixelGrid::new(2, 2);
        grid.set(5, 0, true);
        assert_eq!(grid.lit_count(), 0);
        assert!(!grid.get(0, 9));
        assert!(grid.row(2).is_empty());
        assert!(grid.row(usize::MAX).is_empty());
        assert_eq!(grid.row(1).len(), 2);
    }

    #[test]
    fn test_ascii_rendering() {
        let mut grid = PixelGrid::new(2, 3);
        grid.set(0, 0, true);
        grid.set(1, 2, true);
        assert_eq!(grid.to_string(), "#..\n..#\n");
    }
}
