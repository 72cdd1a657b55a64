// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinReaderExt, BinWrite};
use tracing::{debug, warn};

use crate::color::Rgb;
use crate::error::Result;
use crate::layout::TableLayout;

/// Overwrites the colours of `team_id` in an open TeamColor table.
///
/// Colours are written back to back starting after the team's record header. Anything past the
/// record's capacity is dropped instead of spilling into the next team. Returns how many colours
/// were written.
pub fn update_team_colors<W: Write + Seek>(
    target: &mut W,
    team_id: u32,
    colors: &[Rgb],
    layout: &TableLayout,
) -> Result<usize> {
    if colors.len() > layout.team_color_capacity {
        warn!(
            team_id,
            given = colors.len(),
            capacity = layout.team_color_capacity,
            "Too many team colours, extra entries are ignored"
        );
    }

    let mut offset = layout.team_color_offset(team_id)?;
    let mut written = 0;

    for color in colors.iter().take(layout.team_color_capacity) {
        target.seek(SeekFrom::Start(offset))?;
        color.write_le(target)?;

        offset += 3;
        written += 1;
    }

    debug!(team_id, written, "Updated team colours");

    Ok(written)
}

/// Reads back every colour slot of `team_id` from a TeamColor table.
pub fn read_team_colors<R: Read + Seek>(
    reader: &mut R,
    team_id: u32,
    layout: &TableLayout,
) -> Result<Vec<Rgb>> {
    reader.seek(SeekFrom::Start(layout.team_color_offset(team_id)?))?;

    let mut colors = Vec::with_capacity(layout.team_color_capacity);
    for _ in 0..layout.team_color_capacity {
        colors.push(reader.read_le::<Rgb>()?);
    }

    Ok(colors)
}
