// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use binrw::binread;
use binrw::{BinRead, BinReaderExt};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::layout::RewriteOptions;
use crate::texture_path::{rewrite_texture_path, PathFamily, PathRewrite};
use crate::ByteSpan;

/// Where the block counts start in the file header.
const BLOCK_COUNTS_OFFSET: u64 = 32;
/// Where the first block map starts.
const BLOCK_MAP_OFFSET: u64 = 64;

/// Block map 0 tag of the texture table.
const TEXTURE_BLOCK: u16 = 6;
/// Block map 0 tag of the string table.
const STRING_BLOCK: u16 = 12;
/// Block map 1 tag of the region holding the string bytes.
const STRING_REGION_BLOCK: u32 = 3;

#[binread]
#[br(little)]
#[derive(Debug)]
struct FmdlHeader {
    #[br(seek_before = SeekFrom::Start(BLOCK_COUNTS_OFFSET))]
    #[br(temp)]
    block_map_0_count: u32,
    #[br(temp)]
    block_map_1_count: u32,
    /// Offsets in block map 0 are relative to this.
    header_length: u32,
    #[br(pad_before = 4)]
    /// Offsets in block map 1 are relative to this.
    block_map_1_offset: u32,

    #[br(seek_before = SeekFrom::Start(BLOCK_MAP_OFFSET))]
    #[br(count = block_map_0_count)]
    block_map_0: Vec<BlockMap0Entry>,

    #[br(count = block_map_1_count)]
    block_map_1: Vec<BlockMap1Entry>,
}

#[binread]
#[derive(Debug, Clone, Copy)]
struct BlockMap0Entry {
    kind: u16,
    count: u16,
    offset: u32,
}

#[binread]
#[derive(Debug, Clone, Copy)]
struct BlockMap1Entry {
    kind: u32,
    offset: u32,
    length: u32,
}

#[binread]
#[derive(Debug, Clone, Copy)]
struct TextureEntry {
    _name: u16,
    path: u16,
}

#[binread]
#[derive(Debug, Clone, Copy)]
struct StringEntry {
    _block: u16,
    length: u16,
    _offset: u32,
}

/// The absolute location of the bytes backing the string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRegion {
    pub offset: u64,
    /// Bytes reserved for the strings.
    pub capacity: usize,
}

/// What happened to one string during [`FmdlDocument::rewrite_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringOutcome {
    Rewritten {
        index: usize,
        from: String,
        to: String,
    },
    /// The string is a texture folder of `family` but the id handed in doesn't fit it.
    InvalidId {
        index: usize,
        family: PathFamily,
        value: String,
    },
    NoIdFound {
        index: usize,
    },
}

/// The outcome of rewriting every texture path of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub outcomes: Vec<StringOutcome>,
}

impl RewriteReport {
    /// How many strings were changed.
    pub fn modified(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StringOutcome::Rewritten { .. }))
            .count()
    }
}

/// The string table of a model (FMDL) file, and which strings the textures point at.
///
/// Only the string bytes are ever written back, everything else in the file stays where it is.
#[derive(Debug, Clone)]
pub struct FmdlDocument {
    strings: Vec<Vec<u8>>,
    texture_paths: Vec<usize>,
    region: StringRegion,
}

impl FmdlDocument {
    /// Parses the string table of an existing model file.
    ///
    /// Fails if the block map doesn't contain exactly one texture table, string table and string
    /// region.
    pub fn from_existing(buffer: ByteSpan) -> Result<FmdlDocument> {
        let mut cursor = Cursor::new(buffer);
        let header = FmdlHeader::read(&mut cursor)?;

        let texture_block = find_single(&header.block_map_0, "texture table", |e| {
            e.kind == TEXTURE_BLOCK
        })?;
        let string_block = find_single(&header.block_map_0, "string table", |e| {
            e.kind == STRING_BLOCK
        })?;
        let string_region = find_single(&header.block_map_1, "string region", |e| {
            e.kind == STRING_REGION_BLOCK
        })?;

        cursor.seek(SeekFrom::Start(
            header.header_length as u64 + string_block.offset as u64,
        ))?;
        let mut lengths = Vec::with_capacity(string_block.count as usize);
        for _ in 0..string_block.count {
            lengths.push(cursor.read_le::<StringEntry>()?.length as usize);
        }

        let region = StringRegion {
            offset: header.block_map_1_offset as u64 + string_region.offset as u64,
            capacity: string_region.length as usize,
        };

        // every string is preceded by a nul byte, which doubles as the terminator of the last one
        cursor.seek(SeekFrom::Start(region.offset))?;
        let mut strings = Vec::with_capacity(lengths.len());
        for length in lengths {
            cursor.seek(SeekFrom::Current(1))?;

            let mut string = vec![0u8; length];
            cursor.read_exact(&mut string)?;
            strings.push(string);
        }

        cursor.seek(SeekFrom::Start(
            header.header_length as u64 + texture_block.offset as u64,
        ))?;
        let mut texture_paths: Vec<usize> = Vec::new();
        for _ in 0..texture_block.count {
            let index = cursor.read_le::<TextureEntry>()?.path as usize;
            if !texture_paths.contains(&index) {
                texture_paths.push(index);
            }
        }

        Ok(FmdlDocument {
            strings,
            texture_paths,
            region,
        })
    }

    /// Every string in table order.
    pub fn strings(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.strings.iter().map(|s| String::from_utf8_lossy(s))
    }

    /// The string table indices used as texture paths, without duplicates, in the order the
    /// textures reference them.
    pub fn texture_paths(&self) -> &[usize] {
        &self.texture_paths
    }

    pub fn string_region(&self) -> StringRegion {
        self.region
    }

    /// Swaps the id segment of every texture path for `new_id`, or `team_context` in common
    /// folders.
    ///
    /// Paths that don't carry an id, or whose family doesn't accept the given id, are left as they
    /// are and show up in the report.
    pub fn rewrite_ids(&mut self, new_id: &str, team_context: &str) -> RewriteReport {
        let mut report = RewriteReport::default();

        for &index in &self.texture_paths {
            let Some(string) = self.strings.get_mut(index) else {
                warn!(index, "Texture points past the end of the string table");
                report.outcomes.push(StringOutcome::NoIdFound { index });
                continue;
            };

            let Ok(path) = std::str::from_utf8(string) else {
                report.outcomes.push(StringOutcome::NoIdFound { index });
                continue;
            };

            match rewrite_texture_path(path, new_id, team_context) {
                PathRewrite::Rewritten(rewritten) => {
                    debug!(from = path, to = rewritten.as_str(), "Rewrote texture path");

                    report.outcomes.push(StringOutcome::Rewritten {
                        index,
                        from: path.to_string(),
                        to: rewritten.clone(),
                    });
                    *string = rewritten.into_bytes();
                }
                PathRewrite::InvalidId { family, value } => {
                    warn!(
                        path,
                        family = family.name(),
                        id = value.as_str(),
                        "Id doesn't fit this texture folder, leaving it unchanged"
                    );

                    report.outcomes.push(StringOutcome::InvalidId {
                        index,
                        family,
                        value,
                    });
                }
                PathRewrite::NoIdFound => {
                    debug!(path, "No id found");
                    report.outcomes.push(StringOutcome::NoIdFound { index });
                }
            }
        }

        report
    }

    /// Serializes the string table as it is laid out in the string region.
    ///
    /// Fails with [`Error::StringTableOverflow`] if it no longer fits.
    pub fn write_strings(&self) -> Result<Vec<u8>> {
        let mut region = Vec::with_capacity(self.region.capacity);
        for string in &self.strings {
            region.push(0);
            region.extend_from_slice(string);
        }

        if region.len() > self.region.capacity {
            return Err(Error::StringTableOverflow {
                required: region.len(),
                capacity: self.region.capacity,
            });
        }

        Ok(region)
    }
}

fn find_single<T: Copy>(
    entries: &[T],
    kind: &'static str,
    predicate: impl Fn(&T) -> bool,
) -> Result<T> {
    let mut found = entries.iter().filter(|e| predicate(e));

    match (found.next(), found.next()) {
        (Some(entry), None) => Ok(*entry),
        (None, _) => Err(Error::MissingBlock { kind }),
        (Some(_), Some(_)) => Err(Error::DuplicateBlock { kind }),
    }
}

/// Rewrites the texture path ids of a model held in memory. Nothing is changed if the model
/// can't be parsed or its strings no longer fit.
pub fn rewrite_ids_in_buffer(
    buffer: &mut [u8],
    new_id: &str,
    options: &RewriteOptions,
) -> Result<RewriteReport> {
    let (report, region, strings) = prepare_rewrite(buffer, new_id, options)?;

    let start = region.offset as usize;
    let buffer_len = buffer.len();
    let target = buffer
        .get_mut(start..start + strings.len())
        .ok_or(Error::StringTableOverflow {
            required: start + strings.len(),
            capacity: buffer_len,
        })?;
    target.copy_from_slice(&strings);

    Ok(report)
}

/// Rewrites the texture path ids of the model at `path`.
///
/// The whole file is read and checked before anything is written, so a model that can't be
/// processed is left untouched.
pub fn rewrite_ids(
    path: impl AsRef<Path>,
    new_id: &str,
    options: &RewriteOptions,
) -> Result<RewriteReport> {
    let path = path.as_ref();
    debug!(file = %path.display(), new_id, "Rewriting model ids");

    let mut buffer = fs::read(path)?;

    if options.atomic {
        let report = rewrite_ids_in_buffer(&mut buffer, new_id, options)?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(&buffer)?;
        temp.persist(path).map_err(|e| e.error)?;

        return Ok(report);
    }

    let (report, region, strings) = prepare_rewrite(&buffer, new_id, options)?;

    if region.offset as usize + strings.len() > buffer.len() {
        return Err(Error::StringTableOverflow {
            required: region.offset as usize + strings.len(),
            capacity: buffer.len(),
        });
    }

    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(region.offset))?;
    file.write_all(&strings)?;

    Ok(report)
}

fn prepare_rewrite(
    buffer: ByteSpan,
    new_id: &str,
    options: &RewriteOptions,
) -> Result<(RewriteReport, StringRegion, Vec<u8>)> {
    let mut document = FmdlDocument::from_existing(buffer)?;

    let report = document.rewrite_ids(new_id, &options.team_context);
    if report.modified() == 0 {
        warn!(new_id, "No texture path was changed");
    }

    let strings = document.write_strings()?;

    Ok((report, document.string_region(), strings))
}

#[cfg(test)]
mod tests {
    use std::fs::read;
    use std::path::PathBuf;

    use super::*;

    fn fixture() -> Vec<u8> {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push("resources/tests");
        d.push("face_high.fmdl");

        read(d).unwrap()
    }

    #[test]
    fn parse_strings() {
        let fmdl = FmdlDocument::from_existing(&fixture()).unwrap();

        let strings: Vec<_> = fmdl.strings().collect();
        assert_eq!(strings.len(), 8);
        assert_eq!(strings[0], "");
        assert_eq!(strings[1], "face_bsm_alp.ftex");
        assert_eq!(
            strings[2],
            "/Assets/pes16/model/character/face/real/00012/sourceimages/"
        );
        assert_eq!(strings[7], "mesh_id_face");

        assert_eq!(fmdl.texture_paths(), &[2, 5, 6]);
    }

    #[test]
    fn unchanged_strings_write_back_identically() {
        let data = fixture();
        let fmdl = FmdlDocument::from_existing(&data).unwrap();
        let region = fmdl.string_region();

        let strings = fmdl.write_strings().unwrap();
        let start = region.offset as usize;
        assert_eq!(&data[start..start + strings.len()], &strings[..]);
    }

    #[test]
    fn rewrite_face_and_common() {
        let mut data = fixture();
        let original = data.clone();

        let options = RewriteOptions {
            team_context: "345".to_string(),
            ..Default::default()
        };
        let report = rewrite_ids_in_buffer(&mut data, "00099", &options).unwrap();
        assert_eq!(report.modified(), 2);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[2], StringOutcome::NoIdFound { index: 6 });

        assert_eq!(data.len(), original.len());

        let fmdl = FmdlDocument::from_existing(&data).unwrap();
        let strings: Vec<_> = fmdl.strings().collect();
        assert_eq!(
            strings[2],
            "/Assets/pes16/model/character/face/real/00099/sourceimages/"
        );
        assert_eq!(
            strings[5],
            "/Assets/pes16/model/character/common/345/sourceimages/"
        );

        // only bytes inside the string region may differ
        let region = fmdl.string_region();
        let start = region.offset as usize;
        let end = start + region.capacity;
        assert_eq!(&data[..start], &original[..start]);
        assert_eq!(&data[end..], &original[end..]);
    }

    #[test]
    fn invalid_id_leaves_the_string() {
        let mut data = fixture();
        let original = data.clone();

        let report = rewrite_ids_in_buffer(&mut data, "abc", &RewriteOptions::default()).unwrap();

        assert_eq!(
            report.outcomes[0],
            StringOutcome::InvalidId {
                index: 2,
                family: PathFamily::Face,
                value: "abc".to_string()
            }
        );
        // the common folder still takes the team context
        assert_eq!(report.modified(), 1);
        assert_eq!(data.len(), original.len());
    }

    #[test]
    fn missing_string_table() {
        let mut data = fixture();
        // retag the string table entry of block map 0
        data[80..82].copy_from_slice(&13u16.to_le_bytes());
        let original = data.clone();

        assert!(matches!(
            rewrite_ids_in_buffer(&mut data, "00099", &RewriteOptions::default()),
            Err(Error::MissingBlock {
                kind: "string table"
            })
        ));
        assert_eq!(data, original);
    }

    #[test]
    fn duplicate_texture_table() {
        let mut data = fixture();
        // retag the first block map 0 entry as a second texture table
        data[64..66].copy_from_slice(&6u16.to_le_bytes());

        assert!(matches!(
            FmdlDocument::from_existing(&data),
            Err(Error::DuplicateBlock {
                kind: "texture table"
            })
        ));
    }

    #[test]
    fn string_region_too_small() {
        let mut data = fixture();
        // shrink the recorded length of the string region
        data[108..112].copy_from_slice(&16u32.to_le_bytes());
        let original = data.clone();

        assert!(matches!(
            rewrite_ids_in_buffer(&mut data, "00099", &RewriteOptions::default()),
            Err(Error::StringTableOverflow { capacity: 16, .. })
        ));
        assert_eq!(data, original);
    }

    #[test]
    fn truncated_file() {
        let data = fixture();
        assert!(FmdlDocument::from_existing(&data[..100]).is_err());
    }
}
