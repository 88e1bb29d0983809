//! Frame buffer decoding
//!
//! The device firmware keeps its frame buffer in the layout used by most
//! monochrome panel controllers: the panel is cut into bands of 8 rows, and
//! each band is stored as one byte per column. Bit 0 of a byte is the top row
//! of its band, bit 7 the bottom row.
//!
//! ```text
//!            column 0   column 1   ...
//! band 0     byte 0     byte 1     ...   rows 0..8
//! band 1     byte W     byte W+1   ...   rows 8..16
//! ```
//!
//! where `W = tile_columns * 8`.

use log::debug;

use crate::error::DecodeError;
use crate::grid::PixelGrid;
use crate::snapshot::TileLayout;

/// Rows covered by one byte of the buffer.
pub const BAND_HEIGHT: usize = 8;

/// Decode a hex frame buffer into a pixel grid.
///
/// The grid is `tile_rows * 8` by `tile_columns * 8`; only the top-left
/// `display_rows x display_columns` part is visible on the panel. Bytes past
/// the end of the tile area are ignored.
pub fn decode(hex: &str, layout: &TileLayout) -> Result<PixelGrid, DecodeError> {
    let GridShape {
        rows,
        columns,
        expected,
    } = check_layout(layout)?;

    let bytes = hex::decode(hex)?;

    if let Some(declared) = layout.declared_length
        && declared != bytes.len()
    {
        return Err(DecodeError::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    if bytes.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    let mut grid = PixelGrid::new(rows, columns);

    let mut offset = 0;
    for band_top in (0..rows).step_by(BAND_HEIGHT) {
        for x in 0..columns {
            let byte = bytes[offset];
            for bit in 0..BAND_HEIGHT {
                if byte & (1 << bit) != 0 {
                    grid.set(band_top + bit, x, true);
                }
            }
            offset += 1;
        }
    }

    debug!(
        "Decoded {}x{} grid from {} bytes ({} lit)",
        rows,
        columns,
        bytes.len(),
        grid.lit_count()
    );
    Ok(grid)
}

/// Grid size and byte count of a validated layout.
struct GridShape {
    rows: usize,
    columns: usize,
    expected: usize,
}

/// Reject layouts whose tiles leave part of the display undefined, or whose
/// tile counts are too large to address.
fn check_layout(layout: &TileLayout) -> Result<GridShape, DecodeError> {
    let mismatch = DecodeError::TileMismatch {
        tile_rows: layout.tile_rows,
        tile_columns: layout.tile_columns,
        display_rows: layout.display_rows,
        display_columns: layout.display_columns,
    };

    let empty = layout.tile_rows == 0
        || layout.tile_columns == 0
        || layout.display_rows == 0
        || layout.display_columns == 0;
    if empty {
        return Err(mismatch);
    }

    let (Some(rows), Some(columns), Some(expected)) =
        (layout.grid_rows(), layout.grid_columns(), layout.buffer_len())
    else {
        return Err(mismatch);
    };
    // one grid cell per bit of the buffer
    if expected.checked_mul(BAND_HEIGHT).is_none() {
        return Err(mismatch);
    }
    if rows < layout.display_rows || columns < layout.display_columns {
        return Err(mismatch);
    }

    Ok(GridShape {
        rows,
        columns,
        expected,
    })
}
