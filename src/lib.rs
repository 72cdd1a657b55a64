// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

/// Represents a continuous block of memory which is not owned, and comes either from an in-memory location or from a file.
pub type ByteSpan<'a> = &'a [u8];

/// Represents a continuous block of memory which is owned.
pub type ByteBuffer = Vec<u8>;

/// Error type shared by every format in this crate.
pub mod error;
pub use error::{Error, Result};

mod compression;
mod common_file_operations;

/// Reading and writing WESYS compressed containers.
pub mod container;

/// Table geometry and rewrite options.
pub mod layout;

/// RGB colours and parsing colour entries from team notes.
pub mod color;

/// Patching team colours in TeamColor tables.
pub mod team_color;

/// Patching kit colours in UniColor tables.
pub mod kit_color;

/// Recognizing id-carrying texture folders.
pub mod texture_path;

/// Reading model (FMDL) string tables and rewriting the ids in their texture paths.
pub mod fmdl;

/// Reading and writing download pack file lists (DPFL).
pub mod dpfl;
