//! Low-level framing for the store file: length-prefixed, checksummed,
//! optionally compressed messages.
//!
//! A store file is a magic tag followed by a fixed sequence of messages.
//! Each message is `u32` payload size (little-endian), the payload, and a
//! `u32` xxh3-based checksum of the payload. Bulk payloads (dictionary
//! sections, triple ids) are zstd-compressed before framing.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tern_common::{Result, error::Error, verify_data};

/// Magic tag at the start of every store file; the trailing digit is the
/// format version.
pub const MAGIC: &[u8; 8] = b"TERNSTO1";

/// Hard cap on a single message payload, to reject garbage size prefixes
/// before allocating.
const MAX_MESSAGE_SIZE: u32 = 1 << 30;

/// Computes the 32-bit checksum of a buffer by folding the xxh3-64 hash.
pub fn compute_checksum(buf: &[u8]) -> u32 {
    let h = xxhash_rust::xxh3::xxh3_64(buf);
    (h as u32) ^ ((h >> 32) as u32)
}

/// Writes one framed message: size, payload, checksum.
pub fn write_message<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    writer.write_u32::<LittleEndian>(payload.len() as u32)?;
    writer.write_all(payload)?;
    writer.write_u32::<LittleEndian>(compute_checksum(payload))?;
    Ok(())
}

/// Reads one framed message and validates its checksum.
///
/// `element` names the message for error reporting.
pub fn read_message<R: Read>(reader: &mut R, element: &str) -> Result<Vec<u8>> {
    let size = reader.read_u32::<LittleEndian>()?;
    verify_data!(message_size, size <= MAX_MESSAGE_SIZE);
    let mut payload = vec![0u8; size as usize];
    reader.read_exact(&mut payload)?;
    let checksum = reader.read_u32::<LittleEndian>()?;
    if compute_checksum(&payload) != checksum {
        return Err(tern_common::error::ErrorKind::ChecksumMismatch {
            element: element.to_string(),
        }
        .into());
    }
    Ok(payload)
}

/// Writes one framed, zstd-compressed message.
pub fn write_compressed<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let compressed = zstd::stream::encode_all(payload, zstd::DEFAULT_COMPRESSION_LEVEL)
        .map_err(|e| Error::io("zstd encode", e))?;
    write_message(writer, &compressed)
}

/// Reads one framed, zstd-compressed message.
pub fn read_compressed<R: Read>(reader: &mut R, element: &str) -> Result<Vec<u8>> {
    let compressed = read_message(reader, element)?;
    zstd::stream::decode_all(compressed.as_slice()).map_err(|e| Error::io("zstd decode", e))
}

/// Writes the magic tag.
pub fn write_magic<W: Write>(writer: &mut W) -> Result<()> {
    writer.write_all(MAGIC)?;
    Ok(())
}

/// Reads and verifies the magic tag.
pub fn read_magic<R: Read>(reader: &mut R) -> Result<()> {
    let mut tag = [0u8; 8];
    reader.read_exact(&mut tag)?;
    verify_data!(magic, &tag == MAGIC);
    Ok(())
}
