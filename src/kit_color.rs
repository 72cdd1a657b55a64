// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{Read, Seek, SeekFrom, Write};

use binrw::binrw;
use binrw::{BinReaderExt, BinWrite};
use tracing::{debug, warn};

use crate::color::Rgb;
use crate::error::Result;
use crate::layout::TableLayout;

/// Goalkeeper kits are numbered from here, player kits from zero.
const FIRST_GOALKEEPER_NUMBER: u8 = 16;

/// Whether a kit is worn by outfield players or the goalkeeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitKind {
    Player,
    Goalkeeper,
}

impl KitKind {
    /// Classifies a kit by the type tag from its note entry. Anything that isn't `GK` is a
    /// player kit.
    pub fn from_tag(tag: &str) -> KitKind {
        if tag.trim().eq_ignore_ascii_case("gk") {
            KitKind::Goalkeeper
        } else {
            KitKind::Player
        }
    }
}

/// One kit from a team's note, ready to be written to the UniColor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitColor {
    pub kind: KitKind,
    pub primary: Rgb,
    pub secondary: Rgb,
    /// The icon to show in the kit selection menu, if the note names one.
    pub icon: Option<u8>,
}

/// A single 8-byte kit slot.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KitRecord {
    pub number: u8,
    pub icon: u8,
    pub primary: Rgb,
    pub secondary: Rgb,
}

impl KitRecord {
    /// What unused slots are filled with.
    pub const EMPTY: KitRecord = KitRecord {
        number: 0xFF,
        icon: 0,
        primary: Rgb::new(0, 0, 0),
        secondary: Rgb::new(0, 0, 0),
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

/// The kit section of one team's UniColor block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitBlock {
    pub count: u8,
    pub slots: Vec<KitRecord>,
}

/// How many kits of each kind ended up in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KitCounts {
    pub players: u8,
    pub goalkeepers: u8,
}

/// Overwrites the kit block of `team_id` in an open UniColor table.
///
/// At most [`TableLayout::kit_slots`] kits are written; player kits are numbered from 0 and
/// goalkeeper kits from 16, each in input order. Every remaining slot is reset to
/// [`KitRecord::EMPTY`] so nothing from a previous run survives.
pub fn update_kit_colors<W: Write + Seek>(
    target: &mut W,
    team_id: u32,
    kits: &[KitColor],
    layout: &TableLayout,
) -> Result<KitCounts> {
    // goalkeeper kit numbers have to stay within a byte
    let slots = layout
        .kit_slots
        .min((u8::MAX - FIRST_GOALKEEPER_NUMBER) as usize + 1);

    if kits.len() > slots {
        warn!(
            team_id,
            given = kits.len(),
            capacity = slots,
            "Too many kits, extra entries are ignored"
        );
    }

    let kits = &kits[..kits.len().min(slots)];

    let mut offset = layout.kit_count_offset(team_id)?;
    target.seek(SeekFrom::Start(offset))?;
    (kits.len() as u8).write_le(target)?;
    offset += 1;

    let mut counts = KitCounts::default();

    for kit in kits {
        let number = match kit.kind {
            KitKind::Goalkeeper => {
                counts.goalkeepers += 1;
                FIRST_GOALKEEPER_NUMBER + counts.goalkeepers - 1
            }
            KitKind::Player => {
                counts.players += 1;
                counts.players - 1
            }
        };

        let icon = match kit.icon {
            Some(icon) if icon <= layout.max_kit_icon => icon,
            Some(icon) => {
                warn!(team_id, icon, "Kit icon out of range, using the default");
                layout.default_kit_icon
            }
            None => layout.default_kit_icon,
        };

        let record = KitRecord {
            number,
            icon,
            primary: kit.primary,
            secondary: kit.secondary,
        };

        target.seek(SeekFrom::Start(offset))?;
        record.write_le(target)?;
        offset += 8;
    }

    for _ in kits.len()..slots {
        target.seek(SeekFrom::Start(offset))?;
        KitRecord::EMPTY.write_le(target)?;
        offset += 8;
    }

    debug!(
        team_id,
        players = counts.players,
        goalkeepers = counts.goalkeepers,
        "Updated kit colours"
    );

    Ok(counts)
}

/// Reads back the kit block of `team_id` from a UniColor table.
pub fn read_kit_colors<R: Read + Seek>(
    reader: &mut R,
    team_id: u32,
    layout: &TableLayout,
) -> Result<KitBlock> {
    reader.seek(SeekFrom::Start(layout.kit_count_offset(team_id)?))?;

    let count = reader.read_le::<u8>()?;

    let mut slots = Vec::with_capacity(layout.kit_slots);
    for _ in 0..layout.kit_slots {
        slots.push(reader.read_le::<KitRecord>()?);
    }

    Ok(KitBlock { count, slots })
}
