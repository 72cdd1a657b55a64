// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Cursor;

use binrw::binrw;
use binrw::{BinRead, BinWrite};
use tracing::debug;

use crate::compression::{zlib_compress, zlib_decompress};
use crate::error::{Error, Result};
use crate::ByteSpan;

/// Size of the header in front of every compressed payload.
pub const HEADER_SIZE: usize = 16;

/// The leading bytes written in front of the tag.
const FLAGS: [u8; 3] = [0x00, 0x10, 0x01];

/// The full tag written when encoding.
const TAG: [u8; 5] = *b"WESYS";

/// Only these four bytes of the tag are checked when decoding.
const TAG_CHECK: &[u8; 4] = b"ESYS";
const TAG_CHECK_OFFSET: usize = 4;

#[binrw]
#[brw(little)]
#[derive(Debug)]
struct ContainerHeader {
    flags: [u8; 3],
    tag: [u8; 5],
    compressed_size: u32,
    uncompressed_size: u32,
}

/// Checks whether `buffer` carries the WESYS tag. The rest of the header may still be missing.
pub fn is_compressed(buffer: ByteSpan) -> bool {
    buffer.get(TAG_CHECK_OFFSET..TAG_CHECK_OFFSET + TAG_CHECK.len()) == Some(&TAG_CHECK[..])
}

/// Unwraps a WESYS container.
///
/// Returns `Ok(None)` when `buffer` is not a container at all, so the caller can use it as-is.
/// A buffer that carries the tag but fails to inflate is an [`Error::Decode`], never a passthrough.
pub fn decode(buffer: ByteSpan) -> Result<Option<Vec<u8>>> {
    if !is_compressed(buffer) {
        return Ok(None);
    }

    if buffer.len() < HEADER_SIZE {
        return Err(Error::Decode {
            reason: format!(
                "header is truncated: {} of {} bytes",
                buffer.len(),
                HEADER_SIZE
            ),
        });
    }

    let header = ContainerHeader::read(&mut Cursor::new(buffer))?;

    let compressed_size = header.compressed_size as usize;
    let payload = buffer
        .get(HEADER_SIZE..HEADER_SIZE + compressed_size)
        .ok_or_else(|| Error::Decode {
            reason: format!(
                "payload is truncated: header says {} bytes, {} available",
                compressed_size,
                buffer.len() - HEADER_SIZE
            ),
        })?;

    let data = zlib_decompress(payload, header.uncompressed_size as usize).ok_or_else(|| {
        Error::Decode {
            reason: format!(
                "payload does not inflate to {} bytes",
                header.uncompressed_size
            ),
        }
    })?;

    debug!(
        compressed = compressed_size,
        uncompressed = data.len(),
        "Decoded container"
    );

    Ok(Some(data))
}

/// Like [`decode`], but hands back a copy of `buffer` when it isn't a container.
pub fn try_decode(buffer: ByteSpan) -> Result<Vec<u8>> {
    Ok(decode(buffer)?.unwrap_or_else(|| buffer.to_vec()))
}

/// Compresses `buffer` and wraps it in a WESYS header.
pub fn encode(buffer: ByteSpan) -> Result<Vec<u8>> {
    let uncompressed_size = u32::try_from(buffer.len()).map_err(|_| Error::ValueTooLarge {
        what: "container payload",
        len: buffer.len(),
    })?;

    let payload = zlib_compress(buffer).ok_or(Error::Encode)?;

    let header = ContainerHeader {
        flags: FLAGS,
        tag: TAG,
        compressed_size: u32::try_from(payload.len()).map_err(|_| Error::ValueTooLarge {
            what: "compressed payload",
            len: payload.len(),
        })?,
        uncompressed_size,
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    {
        let mut cursor = Cursor::new(&mut out);
        header.write(&mut cursor)?;
    }
    out.extend_from_slice(&payload);

    Ok(out)
}

/// Like [`encode`], but only if that actually makes `buffer` smaller.
pub fn try_encode(buffer: ByteSpan) -> Result<Vec<u8>> {
    let encoded = encode(buffer)?;

    if encoded.len() < buffer.len() {
        Ok(encoded)
    } else {
        debug!(
            original = buffer.len(),
            encoded = encoded.len(),
            "Keeping data uncompressed"
        );
        Ok(buffer.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        b"TeamColor TeamColor TeamColor TeamColor TeamColor TeamColor".repeat(8)
    }

    #[test]
    fn header_layout() {
        let encoded = encode(&sample()).unwrap();

        assert_eq!(&encoded[0..8], b"\x00\x10\x01WESYS");
        let compressed = u32::from_le_bytes(encoded[8..12].try_into().unwrap());
        let uncompressed = u32::from_le_bytes(encoded[12..16].try_into().unwrap());
        assert_eq!(compressed as usize, encoded.len() - HEADER_SIZE);
        assert_eq!(uncompressed as usize, sample().len());
    }

    #[test]
    fn decode_encoded() {
        let data = sample();
        assert_eq!(decode(&encode(&data).unwrap()).unwrap(), Some(data));
    }

    #[test]
    fn decode_encoded_empty() {
        assert_eq!(decode(&encode(&[]).unwrap()).unwrap(), Some(vec![]));
    }

    #[test]
    fn raw_data_passes_through() {
        let raw = b"FMDL this is not a container".to_vec();

        assert!(!is_compressed(&raw));
        assert_eq!(decode(&raw).unwrap(), None);
        assert_eq!(try_decode(&raw).unwrap(), raw);
        assert_eq!(try_decode(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn only_esys_is_checked() {
        let mut encoded = encode(&sample()).unwrap();
        encoded[3] = b'X';

        assert!(is_compressed(&encoded));
        assert_eq!(try_decode(&encoded).unwrap(), sample());
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let encoded = encode(&sample()).unwrap();
        let truncated = &encoded[..encoded.len() - 4];

        assert!(matches!(decode(truncated), Err(Error::Decode { .. })));
        assert!(matches!(try_decode(truncated), Err(Error::Decode { .. })));
    }

    #[test]
    fn truncated_header_is_an_error() {
        let encoded = encode(&sample()).unwrap();
        let truncated = &encoded[..12];

        assert!(is_compressed(truncated));
        assert!(matches!(decode(truncated), Err(Error::Decode { .. })));
        assert!(matches!(try_decode(truncated), Err(Error::Decode { .. })));

        // too short to even carry the tag
        assert_eq!(try_decode(&encoded[..6]).unwrap(), &encoded[..6]);
    }

    #[test]
    fn corrupt_payload_is_an_error() {
        let mut encoded = encode(&sample()).unwrap();
        for byte in &mut encoded[HEADER_SIZE..] {
            *byte = 0xFF;
        }

        assert!(matches!(decode(&encoded), Err(Error::Decode { .. })));
    }

    #[test]
    fn try_encode_skips_small_input() {
        let tiny = b"abc".to_vec();
        assert_eq!(try_encode(&tiny).unwrap(), tiny);

        let data = sample();
        let encoded = try_encode(&data).unwrap();
        assert!(encoded.len() < data.len());
        assert_eq!(encoded, encode(&data).unwrap());
    }

    /// A few KiB of xorshift noise, which zlib can't shrink.
    fn noise(len: usize) -> Vec<u8> {
        let mut state: u32 = 0x9E37_79B9;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect()
    }

    #[test]
    fn incompressible_data() {
        let data = noise(4096);
        let encoded = encode(&data).unwrap();

        assert_eq!(decode(&encoded).unwrap(), Some(data.clone()));
        assert!(encoded.len() >= data.len());
        assert_eq!(try_encode(&data).unwrap(), data);
    }

    #[test]
    fn try_encode_never_grows_past_encode() {
        for data in [noise(3000), sample(), vec![0; 2048], b"x".to_vec()] {
            let encoded = encode(&data).unwrap();
            let tried = try_encode(&data).unwrap();

            assert!(tried.len() <= encoded.len());
            assert_eq!(try_decode(&tried).unwrap(), data);
            if encoded.len() >= data.len() {
                assert_eq!(tried, data);
            }
        }
    }
}
