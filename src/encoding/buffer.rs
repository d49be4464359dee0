//! Big-endian primitive I/O over byte buffers.
//!
//! [`WriteBuffer`] is the encoder's growable output, with support for reserving a
//! length field and patching it once the payload behind it is known. [`ReadBuffer`] is
//! the decoder's cursor over an immutable [`Bytes`].

use super::constants::FORMAT_VERSION;
use crate::errors::{Error, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Something bytes can be appended to.
pub trait Serializer {
    /// Add a byte to the output.
    fn put_u8(&mut self, u: u8);
    /// Add a slice to the output.
    fn put_slice(&mut self, slice: &[u8]);
}

/// Big-endian convenience methods for [`Serializer`].
pub trait SerializerExt: Serializer {
    /// Add a big-endian `u16`.
    fn put_u16(&mut self, u: u16) { self.put_slice(&u.to_be_bytes()) }
    /// Add a big-endian `u32`.
    fn put_u32(&mut self, u: u32) { self.put_slice(&u.to_be_bytes()) }
    /// Add a big-endian `u64`.
    fn put_u64(&mut self, u: u64) { self.put_slice(&u.to_be_bytes()) }
    /// Add a big-endian `i32`.
    fn put_i32(&mut self, i: i32) { self.put_slice(&i.to_be_bytes()) }
    /// Add the bit pattern of an `f64`, big-endian.
    fn put_f64(&mut self, f: f64) { self.put_u64(f.to_bits()) }
    /// Add the format version byte.
    fn put_version(&mut self) { self.put_u8(FORMAT_VERSION) }
}

impl<S: Serializer + ?Sized> SerializerExt for S {}

impl Serializer for Vec<u8> {
    fn put_u8(&mut self, u: u8) { self.push(u) }

    fn put_slice(&mut self, slice: &[u8]) { self.extend_from_slice(slice) }
}

impl Serializer for BytesMut {
    fn put_u8(&mut self, u: u8) { BufMut::put_u8(self, u) }

    fn put_slice(&mut self, slice: &[u8]) { self.extend_from_slice(slice) }
}

#[derive(Debug)]
/// A growable output buffer with random-access patching.
pub(crate) struct WriteBuffer {
    buf: BytesMut,
}

/// A reserved four byte field, to be filled in by [`WriteBuffer::patch_u32`].
#[derive(Debug)]
#[must_use]
pub(crate) struct Placeholder(usize);

impl WriteBuffer {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        WriteBuffer {
            buf: BytesMut::with_capacity(cap),
        }
    }

    pub(crate) fn len(&self) -> usize { self.buf.len() }

    /// Drops everything written after `len`.
    pub(crate) fn truncate(&mut self, len: usize) { self.buf.truncate(len) }

    /// Writes four zero bytes and remembers where they are.
    pub(crate) fn reserve_u32(&mut self) -> Placeholder {
        let at = self.buf.len();
        self.put_u32(0);
        Placeholder(at)
    }

    /// Overwrites a reserved field with `value`, leaving the write position at the end.
    pub(crate) fn patch_u32(&mut self, slot: Placeholder, value: u32) {
        let Placeholder(at) = slot;
        self.buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
    }

    /// Hands out everything written so far, leaving the buffer empty.
    ///
    /// Keeps the unused capacity around for the next round of writes.
    pub(crate) fn take(&mut self) -> Bytes { self.buf.split().freeze() }
}

impl Serializer for WriteBuffer {
    fn put_u8(&mut self, u: u8) { Serializer::put_u8(&mut self.buf, u) }

    fn put_slice(&mut self, slice: &[u8]) { self.buf.extend_from_slice(slice) }
}

#[derive(Clone, Debug, Default)]
/// A read cursor over an immutable byte buffer.
///
/// Reads never go past the end: they fail with [`Error::BufferOverrun`] instead and
/// leave the cursor where it was.
pub struct ReadBuffer {
    bytes:  Bytes,
    offset: usize,
}

impl ReadBuffer {
    /// Creates a cursor at the start of `bytes`.
    pub fn new(bytes: Bytes) -> Self { ReadBuffer { bytes, offset: 0 } }

    /// Current position.
    pub fn offset(&self) -> usize { self.offset }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize { self.bytes.len() - self.offset }

    /// Whether the cursor has reached the end.
    pub fn at_end(&self) -> bool { self.remaining() == 0 }

    /// Everything after the cursor, without advancing.
    pub fn rest(&self) -> &[u8] { &self.bytes[self.offset..] }

    /// Moves the cursor forward by `n` bytes.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.offset += n;
        Ok(())
    }

    #[inline]
    fn check(&self, wanted: usize) -> Result<()> {
        let remaining = self.remaining();
        if wanted > remaining {
            Err(Error::BufferOverrun { wanted, remaining })
        } else {
            Ok(())
        }
    }

    /// Returns a view of the next `n` bytes, advancing past them.
    #[inline]
    pub fn read_raw(&mut self, n: usize) -> Result<&[u8]> {
        self.check(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(&self.bytes[start..self.offset])
    }

    /// Like [`ReadBuffer::read_raw`], but shares the bytes instead of borrowing them.
    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.check(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(self.bytes.slice(start..self.offset))
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> { Ok(self.read_raw(1)?[0]) }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> { Ok(self.read_raw(2)?.get_u16()) }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> { Ok(self.read_raw(4)?.get_u32()) }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> { Ok(self.read_raw(4)?.get_i32()) }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> { Ok(self.read_raw(8)?.get_u64()) }

    /// Reads the format version byte, failing if it isn't the one this codec speaks.
    pub fn read_version(&mut self) -> Result<()> {
        let found = self.read_u8()?;
        if found == FORMAT_VERSION {
            Ok(())
        } else {
            Err(Error::VersionMismatch {
                expected: FORMAT_VERSION,
                found,
            })
        }
    }
}
