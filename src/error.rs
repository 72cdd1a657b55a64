// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The underlying file could not be read, written or seeked.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A fixed-layout structure could not be parsed or written.
    #[error("parsing failed: {0}")]
    Parse(#[from] binrw::Error),
    /// The container carried the WESYS tag but its payload is unusable.
    #[error("container decode failed: {reason}")]
    Decode {
        /// What went wrong while inflating the payload.
        reason: String,
    },
    /// zlib could not compress the payload.
    #[error("container encode failed")]
    Encode,
    /// A block the model rewriter depends on is missing from the block map.
    #[error("model file has no {kind} block")]
    MissingBlock {
        /// Which block was expected.
        kind: &'static str,
    },
    /// A block the model rewriter depends on appears more than once in the block map.
    #[error("model file has more than one {kind} block")]
    DuplicateBlock {
        /// Which block was duplicated.
        kind: &'static str,
    },
    /// The rewritten strings do not fit into the region reserved for them.
    #[error("string table needs {required} bytes but only {capacity} are reserved")]
    StringTableOverflow {
        /// Bytes needed by the rewritten strings.
        required: usize,
        /// Bytes recorded in the block map for the string region.
        capacity: usize,
    },
    /// The team id lies below the first id the colour tables hold.
    #[error("team id {team_id} is below the first table id {base}")]
    InvalidTeamId {
        /// The rejected id.
        team_id: u32,
        /// The id of the first record.
        base: u32,
    },
    /// A value does not fit into its fixed-width field.
    #[error("{what} is too large ({len} bytes)")]
    ValueTooLarge {
        /// The field being written.
        what: &'static str,
        /// The offending length.
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
