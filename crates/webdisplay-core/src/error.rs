//! Error types shared across the webdisplay core

use alloc::string::String;

use thiserror_no_std::Error;

/// Lookup failure in the [`ProfileRegistry`](crate::profile::ProfileRegistry).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// Type code 0 ("no device"), a negative code, or a code past the table.
    #[error("device type {0} has no drawable profile")]
    NotDrawable(i64),
    /// The registry already holds as many profiles as it can store.
    #[error("profile table is full")]
    TableFull,
}

/// Failure while turning a hex frame buffer into a pixel grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("hex buffer has odd length")]
    OddLength,
    #[error("invalid hex character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("buffer holds {actual} bytes, tile layout needs {expected}")]
    Truncated { expected: usize, actual: usize },
    #[error("buffer declares {declared} bytes but carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("tiles {tile_rows}x{tile_columns} do not cover a {display_rows}x{display_columns} display")]
    TileMismatch {
        tile_rows: usize,
        tile_columns: usize,
        display_rows: usize,
        display_columns: usize,
    },
}

impl From<hex::FromHexError> for DecodeError {
    fn from(err: hex::FromHexError) -> Self {
        match err {
            hex::FromHexError::InvalidHexCharacter { c, index } => Self::InvalidCharacter {
                character: c,
                index,
            },
            // OddLength, and InvalidStringLength which only fixed-size targets report
            _ => Self::OddLength,
        }
    }
}

/// Reasons a snapshot was dropped instead of rendered.
///
/// None of these are fatal: the surface keeps showing the last good frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid device type {0}")]
    InvalidDeviceType(i64),
    #[error("malformed buffer: {0}")]
    MalformedBuffer(DecodeError),
    #[error("background art is still loading")]
    AssetLoadInFlight,
    #[error("rendering surface reported an error")]
    Surface,
}

impl From<DecodeError> for SnapshotError {
    fn from(err: DecodeError) -> Self {
        Self::MalformedBuffer(err)
    }
}

/// Fetching a snapshot from the device failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("response is not a snapshot: {0}")]
    Parse(String),
}

/// Loading a profile's background art failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset {0} not found")]
    NotFound(String),
    #[error("asset could not be decoded: {0}")]
    Decode(String),
    #[error("unsupported asset format")]
    Unsupported,
}
