// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::read;
use std::io::Cursor;
use std::path::Path;

use binrw::binrw;
use binrw::{BinRead, BinWrite};
use tracing::debug;

use crate::common_file_operations::{read_string_until_null, write_fixed_string};
use crate::error::{Error, Result};
use crate::{ByteBuffer, ByteSpan};

const RECORD_SIZE: usize = 48;
const NAME_SIZE: usize = 32;

#[binrw]
#[brw(little)]
#[derive(Debug, Clone)]
struct DpflRecord {
    unknown: [u8; 16],
    name: [u8; NAME_SIZE],
}

/// A single archive listed in a DPFL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpflEntry {
    /// The 16 bytes in front of the name, kept as-is.
    pub unknown: [u8; 16],
    /// The archive file name, such as `dt80_100E_win.cpk`.
    pub name: String,
}

/// Download pack file list, usually named `DpFileList.bin`.
///
/// Lists the CPK archives the game loads, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadPackList {
    pub entries: Vec<DpflEntry>,
}

impl DownloadPackList {
    /// Parses an existing list. The list ends at the first record with an empty name, whatever
    /// follows it.
    pub fn from_existing(buffer: ByteSpan) -> Result<DownloadPackList> {
        let mut cursor = Cursor::new(buffer);
        let mut entries = Vec::new();

        while buffer.len() - cursor.position() as usize >= RECORD_SIZE {
            let record = DpflRecord::read(&mut cursor)?;

            if record.name[0] == 0 {
                break;
            }

            entries.push(DpflEntry {
                unknown: record.unknown,
                name: read_string_until_null(&record.name),
            });
        }

        debug!(archives = entries.len(), "Read DPFL");

        Ok(DownloadPackList { entries })
    }

    /// Archive names in list order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Writes the list back out, followed by an empty terminating record.
    pub fn write_to_buffer(&self) -> Result<ByteBuffer> {
        let mut buffer = ByteBuffer::new();

        {
            let mut cursor = Cursor::new(&mut buffer);

            for entry in &self.entries {
                let name = write_fixed_string(&entry.name, NAME_SIZE).ok_or(
                    Error::ValueTooLarge {
                        what: "archive name",
                        len: entry.name.len(),
                    },
                )?;

                let mut record = DpflRecord {
                    unknown: entry.unknown,
                    name: [0; NAME_SIZE],
                };
                record.name.copy_from_slice(&name);
                record.write(&mut cursor)?;
            }

            DpflRecord {
                unknown: [0; 16],
                name: [0; NAME_SIZE],
            }
            .write(&mut cursor)?;
        }

        Ok(buffer)
    }
}

/// Lists the archive names in the DPFL file at `path`.
pub fn scan(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    debug!(file = %path.display(), "Scanning DPFL");

    Ok(DownloadPackList::from_existing(&read(path)?)?.names())
}
