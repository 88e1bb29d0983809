//! Frame buffer snapshots published by the device
//!
//! The device answers `GET /api/display/getbuffer` with a JSON document like:
//!
//! ```json
//! { "DisplayType": 3, "DisplayHeight": 64, "DisplayWidth": 128,
//!   "BufferTileHeight": 8, "BufferTileWidth": 16, "BufferLength": 1024,
//!   "BufferContent": "00ff..." }
//! ```

use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// One frame buffer snapshot as published by the device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    /// Panel type code, validated against the profile registry
    pub display_type: i64,
    /// Visible rows
    pub display_height: usize,
    /// Visible columns
    pub display_width: usize,
    /// Number of 8-row bands in the buffer
    pub buffer_tile_height: usize,
    /// Number of 8-column tiles per band
    pub buffer_tile_width: usize,
    /// Byte count of the raw buffer, if the firmware reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_length: Option<usize>,
    /// Raw buffer, two hex digits per byte
    pub buffer_content: String,
}

impl Snapshot {
    /// Parse a snapshot from the device's JSON response body.
    pub fn from_json(body: &[u8]) -> Result<Self, TransportError> {
        serde_json::from_slice(body).map_err(|e| TransportError::Parse(alloc::format!("{}", e)))
    }

    /// Tile metadata needed to decode [`Snapshot::buffer_content`].
    pub fn layout(&self) -> TileLayout {
        TileLayout {
            display_rows: self.display_height,
            display_columns: self.display_width,
            tile_rows: self.buffer_tile_height,
            tile_columns: self.buffer_tile_width,
            declared_length: self.buffer_length,
        }
    }
}

/// How the bits of a raw buffer map onto the panel.
///
/// Each tile is 8x8 pixels; the buffer holds `tile_rows` bands of
/// `tile_columns * 8` column bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub display_rows: usize,
    pub display_columns: usize,
    pub tile_rows: usize,
    pub tile_columns: usize,
    pub declared_length: Option<usize>,
}

impl TileLayout {
    /// Layout whose tiles exactly cover a `rows x columns` display.
    pub const fn for_display(rows: usize, columns: usize) -> Self {
        Self {
            display_rows: rows,
            display_columns: columns,
            tile_rows: rows.div_ceil(8),
            tile_columns: columns.div_ceil(8),
            declared_length: None,
        }
    }

    /// Rows of the decoded grid, `None` if the tile count overflows.
    pub fn grid_rows(&self) -> Option<usize> {
        self.tile_rows.checked_mul(8)
    }

    /// Columns of the decoded grid, `None` if the tile count overflows.
    pub fn grid_columns(&self) -> Option<usize> {
        self.tile_columns.checked_mul(8)
    }

    /// Bytes the raw buffer must carry, `None` if the tile counts overflow.
    pub fn buffer_len(&self) -> Option<usize> {
        self.tile_rows.checked_mul(self.grid_columns()?)
    }
}
