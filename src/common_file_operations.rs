// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

/// Reads a string that ends at the first nul byte, or at the end of `bytes` if there is none.
pub(crate) fn read_string_until_null(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Copies `str` into a zero-filled field of `size` bytes, keeping room for the nul terminator.
pub(crate) fn write_fixed_string(str: &str, size: usize) -> Option<Vec<u8>> {
    if str.len() >= size || str.as_bytes().contains(&0) {
        return None;
    }

    let mut field = vec![0u8; size];
    field[..str.len()].copy_from_slice(str.as_bytes());
    Some(field)
}
