// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
use tracing::warn;

/// A 24-bit colour as stored in the colour tables.
#[binrw]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parses a colour entry from a team note, either `#RRGGBB` or three decimal channels separated
/// by spaces or commas.
///
/// Returns `None` if any channel is malformed or out of range, so the whole entry can be skipped.
pub fn parse_color_entry(entry: &str) -> Option<Rgb> {
    let entry = entry.trim();

    let color = match entry.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => parse_decimal(entry),
    };

    if color.is_none() {
        warn!(entry, "Rejected colour entry");
    }

    color
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

fn parse_decimal(entry: &str) -> Option<Rgb> {
    let channels = entry
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;

    match channels[..] {
        [r, g, b] => Some(Rgb::new(r, g, b)),
        _ => None,
    }
}
