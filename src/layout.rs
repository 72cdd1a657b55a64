// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Error, Result};

/// Geometry of the TeamColor and UniColor tables.
///
/// Both tables are plain arrays of per-team records with no header, so every offset is derived
/// from the team id. The defaults describe the retail layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// The team id stored in the first record of either table.
    pub team_id_base: u32,

    /// Where the first TeamColor record starts.
    pub team_color_base: u64,
    /// Size of one TeamColor record.
    pub team_color_stride: u64,
    /// Bytes in front of the colours inside a TeamColor record (the team id).
    pub team_color_header: u64,
    /// How many RGB entries a TeamColor record holds.
    pub team_color_capacity: usize,

    /// Size of one UniColor block.
    pub kit_block_stride: u64,
    /// Bytes in front of the kit count inside a UniColor block (the team id).
    pub kit_header: u64,
    /// Number of kit slots in a UniColor block.
    pub kit_slots: usize,
    /// Highest icon number the game accepts for a kit.
    pub max_kit_icon: u8,
    /// Icon written when a kit doesn't name one.
    pub default_kit_icon: u8,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            team_id_base: 100,
            team_color_base: 0,
            team_color_stride: 10,
            team_color_header: 4,
            team_color_capacity: 2,
            kit_block_stride: 85,
            kit_header: 4,
            kit_slots: 10,
            max_kit_icon: 9,
            default_kit_icon: 3,
        }
    }
}

impl TableLayout {
    /// Offset of the first colour belonging to `team_id` in the TeamColor table.
    pub fn team_color_offset(&self, team_id: u32) -> Result<u64> {
        Ok(self.team_color_base
            + self.team_index(team_id)? * self.team_color_stride
            + self.team_color_header)
    }

    /// Offset of the kit count byte belonging to `team_id` in the UniColor table.
    pub fn kit_count_offset(&self, team_id: u32) -> Result<u64> {
        Ok(self.team_index(team_id)? * self.kit_block_stride + self.kit_header)
    }

    fn team_index(&self, team_id: u32) -> Result<u64> {
        team_id
            .checked_sub(self.team_id_base)
            .map(u64::from)
            .ok_or(Error::InvalidTeamId {
                team_id,
                base: self.team_id_base,
            })
    }
}

/// Options for rewriting the texture paths of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Three digit team id substituted into `common` texture folders.
    pub team_context: String,
    /// Write the patched file to a temporary sibling and rename it over the original, instead of
    /// overwriting the string region in place. The resulting bytes are identical.
    pub atomic: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            team_context: "000".to_string(),
            atomic: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_color_offsets() {
        let layout = TableLayout::default();

        assert_eq!(layout.team_color_offset(100).unwrap(), 4);
        assert_eq!(
            layout.team_color_offset(101).unwrap(),
            4 + layout.team_color_stride
        );
    }

    #[test]
    fn kit_offsets() {
        let layout = TableLayout::default();

        assert_eq!(layout.kit_count_offset(100).unwrap(), 4);
        assert_eq!(layout.kit_count_offset(102).unwrap(), 2 * 85 + 4);
    }

    #[test]
    fn ids_below_the_base_are_rejected() {
        let layout = TableLayout::default();

        assert!(matches!(
            layout.team_color_offset(99),
            Err(Error::InvalidTeamId {
                team_id: 99,
                base: 100
            })
        ));
        assert!(matches!(
            layout.kit_count_offset(0),
            Err(Error::InvalidTeamId { team_id: 0, .. })
        ));
    }
}
