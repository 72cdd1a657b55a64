// SPDX-FileCopyrightText: 2023 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use libz_sys::*;

/// Compresses `in_data` into a zlib stream at the best compression level.
pub fn zlib_compress(in_data: &[u8]) -> Option<Vec<u8>> {
    unsafe {
        let mut out_len = compressBound(in_data.len() as uLong);
        let mut out_data: Vec<u8> = vec![0; out_len as usize];

        let ret = compress2(
            out_data.as_mut_ptr(),
            &mut out_len,
            in_data.as_ptr(),
            in_data.len() as uLong,
            Z_BEST_COMPRESSION,
        );
        if ret != Z_OK {
            return None;
        }

        out_data.truncate(out_len as usize);

        Some(out_data)
    }
}

/// Inflates a zlib stream that is expected to produce exactly `expected_len` bytes.
pub fn zlib_decompress(in_data: &[u8], expected_len: usize) -> Option<Vec<u8>> {
    // zlib refuses a zero-sized output buffer on some versions, even for an empty stream
    let mut out_data: Vec<u8> = vec![0; expected_len.max(1)];
    let mut out_len = out_data.len() as uLongf;

    unsafe {
        let ret = uncompress(
            out_data.as_mut_ptr(),
            &mut out_len,
            in_data.as_ptr(),
            in_data.len() as uLong,
        );
        if ret != Z_OK {
            return None;
        }
    }

    if out_len as usize != expected_len {
        return None;
    }

    out_data.truncate(expected_len);

    Some(out_data)
}
