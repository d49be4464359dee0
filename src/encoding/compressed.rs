//! The compressed envelope.
//!
//! A compressed term is the COMPRESSED tag, the `u32` size of the term once inflated,
//! and a zlib stream holding exactly one term with no version byte of its own. The
//! decoder inflates envelopes transparently; [`compress_envelope`] produces them.
//!
//! ```
//! use etfpack::{encoding::compressed::compress_envelope, prelude::*};
//! use flate2::Compression;
//!
//! let v = Value::binary(&[7; 1000]);
//! let plain = encode_full(&v).unwrap();
//! let packed = compress_envelope(&plain, Compression::best()).unwrap();
//!
//! assert!(packed.len() < plain.len());
//! assert_eq!(decode_full(&packed).unwrap(), v);
//! ```

use super::{buffer::*, constants::*};
use crate::errors::{Error, Result};
use bytes::{Bytes, BytesMut};
use flate2::{write::ZlibEncoder, Compression, Decompress, FlushDecompress, Status};
use std::{convert::TryFrom, io::Write};

/// Inflates a zlib stream that should expand to exactly `size` bytes.
///
/// Returns the inflated bytes and how many bytes of `input` the stream took up. Input
/// after the end of the stream is left alone.
///
/// # Errors
///
/// [`Error::Decompression`] if the stream is corrupt, ends early, or inflates to any
/// size other than `size`.
pub fn inflate(input: &[u8], size: usize) -> Result<(Vec<u8>, usize)> {
    // one spare byte so an oversized stream shows up as a length mismatch
    let mut out = Vec::with_capacity(size + 1);
    let mut z = Decompress::new(true);

    let status = z
        .decompress_vec(input, &mut out, FlushDecompress::Finish)
        .map_err(|e| Error::Decompression(e.to_string()))?;

    if out.len() > size {
        return Err(Error::Decompression(format!(
            "declared size {} but inflated to more",
            size
        )));
    }
    if status != Status::StreamEnd {
        return Err(Error::Decompression(format!(
            "stream ended early after {} of {} bytes",
            out.len(),
            size
        )));
    }
    if out.len() != size {
        return Err(Error::Decompression(format!(
            "declared size {} but inflated to {}",
            size,
            out.len()
        )));
    }

    let consumed = usize::try_from(z.total_in())
        .map_err(|_| Error::Decompression("consumed more input than addressable".into()))?;
    Ok((out, consumed))
}

/// Wraps the single term in a version-prefixed `stream` in a compressed envelope.
///
/// The result is itself a version-prefixed stream.
///
/// # Arguments
///
/// * `stream: &[u8]` - A stream as released by an [`Encoder`](crate::Encoder), holding
///   one term.
/// * `level: Compression` - The zlib compression level.
///
/// # Errors
///
/// * [`Error::VersionMismatch`] or [`Error::BufferOverrun`] if `stream` does not
///   start with a version byte.
/// * [`Error::UnsupportedValue`] if the term is 4 GiB or more.
/// * [`Error::Decompression`] if zlib fails.
pub fn compress_envelope(stream: &[u8], level: Compression) -> Result<Bytes> {
    let mut rb = ReadBuffer::new(Bytes::copy_from_slice(stream));
    rb.read_version()?;
    let term = rb.rest();

    let size = u32::try_from(term.len())
        .map_err(|_| Error::unsupported(format!("term of {} bytes is too big to compress", term.len())))?;

    let mut out = BytesMut::with_capacity(term.len() / 2 + 8);
    out.put_version();
    out.put_u8(COMPRESSED);
    out.put_u32(size);

    let mut z = ZlibEncoder::new(Vec::with_capacity(term.len() / 2), level);
    z.write_all(term)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    let deflated = z
        .finish()
        .map_err(|e| Error::Decompression(e.to_string()))?;

    out.put_slice(&deflated);
    Ok(out.freeze())
}
