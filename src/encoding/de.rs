use super::{buffer::ReadBuffer, compressed::inflate, constants::*};
use crate::{
    bignum::{BigNum, MAX_DIGITS},
    config::DecoderConfig,
    errors::{Error, Result},
    float::{parse_legacy, LEGACY_FLOAT_LEN},
    null::NullSentinel,
    util::digits_to_u64,
    vecmap::VecMap,
    Export, NodeRef, ProcessId, Value,
};
use bytes::Bytes;
use tracing::{debug, trace, warn};

#[derive(Debug)]
/// Unpacks [`Value`]s from a stream, one term at a time.
///
/// A decoder owns a copy of its input and a cursor into it. Any failure marks the
/// decoder invalid: every later call fails with [`Error::InstancePoisoned`] until the
/// decoder is given new input with [`Decoder::reset`].
///
/// # Example
///
/// ```
/// use etfpack::prelude::*;
///
/// let mut dec = Decoder::new(&[131, 97, 1, 115, 4, b't', b'r', b'u', b'e'], None).unwrap();
///
/// assert_eq!(dec.unpack().unwrap(), Value::from(1));
/// assert_eq!(dec.unpack().unwrap(), Value::Boolean(true));
/// assert!(dec.unpack_all().unwrap().is_empty());
/// ```
pub struct Decoder {
    rb:      ReadBuffer,
    config:  DecoderConfig,
    invalid: bool,
}

impl Decoder {
    /// Copies `bytes` and checks the version prefix.
    ///
    /// # Arguments
    ///
    /// * `bytes: &[u8]` - The stream to decode.
    /// * `null: Option<NullSentinel>` - The sentinel decoded `null` atoms carry. Defaults
    ///   to [`NullSentinel::shared`].
    ///
    /// # Errors
    ///
    /// [`Error::VersionMismatch`] if the first byte is not the format version, and
    /// [`Error::BufferOverrun`] if there is no first byte.
    pub fn new(bytes: &[u8], null: Option<NullSentinel>) -> Result<Self> {
        let config = match null {
            Some(null) => DecoderConfig::default().with_null(null),
            None => DecoderConfig::default(),
        };
        Decoder::with_config(bytes, config)
    }

    /// Like [`Decoder::new`], but with every setting spelled out.
    pub fn with_config(bytes: &[u8], config: DecoderConfig) -> Result<Self> {
        let mut dec = Decoder::empty_with_config(config);
        dec.reset(bytes)?;
        Ok(dec)
    }

    /// A decoder with no input. It is invalid until [`Decoder::reset`] succeeds.
    pub fn empty(null: Option<NullSentinel>) -> Self {
        let config = DecoderConfig::default().with_null(null.unwrap_or_default());
        Decoder::empty_with_config(config)
    }

    /// Like [`Decoder::empty`], but with every setting spelled out.
    pub fn empty_with_config(config: DecoderConfig) -> Self {
        Decoder {
            rb: ReadBuffer::default(),
            config,
            invalid: true,
        }
    }

    /// Replaces the input with a copy of `bytes` and rewinds to just past the version
    /// byte.
    ///
    /// On failure the decoder stays invalid.
    pub fn reset(&mut self, bytes: &[u8]) -> Result<()> {
        self.reset_bytes(Bytes::copy_from_slice(bytes))
    }

    /// Like [`Decoder::reset`], but takes shared ownership of `bytes` instead of copying.
    pub fn reset_bytes(&mut self, bytes: Bytes) -> Result<()> {
        self.rb = ReadBuffer::new(bytes);
        self.invalid = false;
        let res = self.rb.read_version();
        if let Err(e) = &res {
            self.invalidate(e);
        }
        res
    }

    /// The settings this decoder was built with.
    pub fn config(&self) -> &DecoderConfig { &self.config }

    /// Cursor position in the input, counting the version byte.
    pub fn offset(&self) -> usize { self.rb.offset() }

    /// Length of the input, counting the version byte.
    pub fn len(&self) -> usize { self.rb.len() }

    /// Whether the input is empty.
    pub fn is_empty(&self) -> bool { self.rb.is_empty() }

    /// Whether an earlier failure invalidated this decoder.
    pub fn is_invalid(&self) -> bool { self.invalid }

    /// Whether the cursor has reached the end of the input.
    pub fn at_end(&self) -> bool { self.rb.at_end() }

    fn invalidate(&mut self, e: &Error) {
        self.invalid = true;
        warn!(error = %e, offset = self.rb.offset(), "decoder invalidated");
    }

    fn run<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Unpacker) -> Result<T>,
    {
        if self.invalid {
            return Err(Error::InstancePoisoned);
        }

        let res = f(&mut Unpacker {
            rb:     &mut self.rb,
            config: &self.config,
        });

        if let Err(e) = &res {
            self.invalidate(e);
        }
        res
    }

    /// Decodes the term at the cursor.
    ///
    /// # Errors
    ///
    /// Anything in [`Error`] except [`Error::UnsupportedValue`]; see the crate docs for
    /// what each tag expects.
    pub fn unpack(&mut self) -> Result<Value> {
        let budget = self.config.max_depth;
        self.run(|u| u.term(budget))
    }

    /// Decodes terms until the input runs out.
    pub fn unpack_all(&mut self) -> Result<Vec<Value>> {
        if self.invalid {
            return Err(Error::InstancePoisoned);
        }

        let mut out = Vec::new();
        while !self.rb.at_end() {
            out.push(self.unpack()?);
        }
        Ok(out)
    }

    /// Reads a byte at the cursor.
    pub fn read_u8(&mut self) -> Result<u8> { self.run(|u| u.rb.read_u8()) }

    /// Reads a big-endian `u16` at the cursor.
    pub fn read_u16(&mut self) -> Result<u16> { self.run(|u| u.rb.read_u16()) }

    /// Reads a big-endian `u32` at the cursor.
    pub fn read_u32(&mut self) -> Result<u32> { self.run(|u| u.rb.read_u32()) }

    /// Reads a big-endian `u64` at the cursor.
    pub fn read_u64(&mut self) -> Result<u64> { self.run(|u| u.rb.read_u64()) }

    /// Returns a view of the next `n` bytes, advancing past them.
    pub fn read_raw(&mut self, n: usize) -> Result<&[u8]> {
        if self.invalid {
            return Err(Error::InstancePoisoned);
        }

        let remaining = self.rb.remaining();
        if n > remaining {
            let e = Error::BufferOverrun {
                wanted: n,
                remaining,
            };
            self.invalidate(&e);
            return Err(e);
        }
        self.rb.read_raw(n)
    }
}

/// Term decoding over one cursor. Envelopes get a fresh one over the inflated bytes.
struct Unpacker<'a> {
    rb:     &'a mut ReadBuffer,
    config: &'a DecoderConfig,
}

impl<'a> Unpacker<'a> {
    // Every level of nesting costs one frame of `term` plus one of the container
    // helper, so both stay small. Anything that doesn't recurse lives in `scalar`.
    fn term(&mut self, budget: usize) -> Result<Value> {
        if budget == 0 {
            return Err(Error::DepthLimitExceeded(self.config.max_depth));
        }

        match self.tag()? {
            tag @ SMALL_TUPLE_EXT | tag @ LARGE_TUPLE_EXT | tag @ LIST_EXT => {
                self.sequence(tag, budget)
            }
            MAP_EXT => self.map(budget),
            tag @ REFERENCE_EXT | tag @ PORT_EXT | tag @ NEW_REFERENCE_EXT | tag @ PID_EXT => {
                self.record(tag, budget)
            }
            EXPORT_EXT => self.export(budget),
            COMPRESSED => self.envelope(budget),
            tag => self.scalar(tag),
        }
    }

    #[inline(never)]
    fn tag(&mut self) -> Result<u8> {
        let tag = self.rb.read_u8()?;
        trace!(tag, offset = self.rb.offset() - 1, "unpacking term");
        Ok(tag)
    }

    #[inline(never)]
    fn scalar(&mut self, tag: u8) -> Result<Value> {
        let value = match tag {
            SMALL_INTEGER_EXT => Value::Integer(i64::from(self.rb.read_u8()?)),
            INTEGER_EXT => Value::Integer(i64::from(self.rb.read_i32()?)),
            FLOAT_EXT => Value::Float(parse_legacy(self.rb.read_raw(LEGACY_FLOAT_LEN)?)?),
            NEW_FLOAT_EXT => Value::Float(f64::from_bits(self.rb.read_u64()?)),
            ATOM_EXT => {
                let len = self.rb.read_u16()? as usize;
                self.latin1_atom(len)?
            }
            SMALL_ATOM_EXT => {
                let len = self.rb.read_u8()? as usize;
                self.latin1_atom(len)?
            }
            ATOM_UTF8_EXT => {
                let len = self.rb.read_u16()? as usize;
                self.utf8_atom(len)?
            }
            SMALL_ATOM_UTF8_EXT => {
                let len = self.rb.read_u8()? as usize;
                self.utf8_atom(len)?
            }
            NIL_EXT => Value::Sequence(Vec::new()),
            STRING_EXT => {
                let len = self.rb.read_u16()? as usize;
                Value::LegacyCharList(self.rb.read_raw(len)?.to_vec())
            }
            BINARY_EXT => {
                let len = self.rb.read_u32()? as usize;
                Value::Binary(self.rb.read_bytes(len)?)
            }
            SMALL_BIG_EXT => {
                let digits = self.rb.read_u8()? as usize;
                self.bignum(digits)?
            }
            LARGE_BIG_EXT => {
                let digits = self.rb.read_u32()? as usize;
                self.bignum(digits)?
            }
            _ => return Err(Error::UnsupportedTag(tag)),
        };
        Ok(value)
    }

    #[inline(never)]
    fn sequence(&mut self, tag: u8, budget: usize) -> Result<Value> {
        let len = match tag {
            SMALL_TUPLE_EXT => self.rb.read_u8()? as usize,
            _ => self.rb.read_u32()? as usize,
        };
        let items = self.elements(len, budget)?;
        if tag == LIST_EXT {
            self.list_tail()?;
        }
        Ok(Value::Sequence(items))
    }

    fn elements(&mut self, len: usize, budget: usize) -> Result<Vec<Value>> {
        // every element takes at least a byte
        let mut items = Vec::with_capacity(len.min(self.rb.remaining()));
        for _ in 0..len {
            items.push(self.term(budget - 1)?);
        }
        Ok(items)
    }

    fn list_tail(&mut self) -> Result<()> {
        match self.rb.read_u8()? {
            NIL_EXT => Ok(()),
            found => Err(Error::MalformedTail { found }),
        }
    }

    #[inline(never)]
    fn map(&mut self, budget: usize) -> Result<Value> {
        let len = self.rb.read_u32()? as usize;
        let mut m = VecMap::with_capacity(len.min(self.rb.remaining()));
        for _ in 0..len {
            let k = self.term(budget - 1)?;
            let v = self.term(budget - 1)?;
            m.push(k, v);
        }
        Ok(Value::Mapping(m))
    }

    /// References, ports and pids: a node term, then fixed-width fields.
    #[inline(never)]
    fn record(&mut self, tag: u8, budget: usize) -> Result<Value> {
        let ids = match tag {
            NEW_REFERENCE_EXT => self.rb.read_u16()? as usize,
            _ => 0,
        };
        let node = Box::new(self.term(budget - 1)?);
        self.record_fields(tag, node, ids)
    }

    #[inline(never)]
    fn record_fields(&mut self, tag: u8, node: Box<Value>, ids: usize) -> Result<Value> {
        let value = match tag {
            PID_EXT => Value::ProcessId(ProcessId {
                node,
                id:       self.rb.read_u32()?,
                serial:   self.rb.read_u32()?,
                creation: self.rb.read_u8()?,
            }),
            NEW_REFERENCE_EXT => {
                let creation = self.rb.read_u8()?;
                let ids = (0..ids)
                    .map(|_| self.rb.read_u32())
                    .collect::<Result<Vec<u32>>>()?;
                Value::NodeRef(NodeRef {
                    node,
                    ids,
                    creation,
                })
            }
            _ => {
                let id = self.rb.read_u32()?;
                let creation = self.rb.read_u8()?;
                Value::NodeRef(NodeRef {
                    node,
                    ids: vec![id],
                    creation,
                })
            }
        };
        Ok(value)
    }

    #[inline(never)]
    fn export(&mut self, budget: usize) -> Result<Value> {
        let module = self.term(budget - 1)?;
        let function = self.term(budget - 1)?;
        let arity = self.term(budget - 1)?;
        Ok(Value::from(Export {
            module,
            function,
            arity,
        }))
    }

    fn latin1_atom(&mut self, len: usize) -> Result<Value> {
        let text: String = self.rb.read_raw(len)?.iter().map(|&b| b as char).collect();
        Ok(self.atom(text))
    }

    fn utf8_atom(&mut self, len: usize) -> Result<Value> {
        let raw = self.rb.read_raw(len)?;
        let text = match std::str::from_utf8(raw) {
            Ok(text) => text.to_owned(),
            Err(_) => return Err(Error::InvalidAtom(String::from_utf8_lossy(raw).into_owned())),
        };
        Ok(self.atom(text))
    }

    fn atom(&self, text: String) -> Value {
        match text.as_str() {
            ATOM_NIL => Value::Nil,
            ATOM_NULL => Value::Null(self.config.null.clone()),
            ATOM_TRUE => Value::Boolean(true),
            ATOM_FALSE => Value::Boolean(false),
            _ => Value::Atom(text),
        }
    }

    fn bignum(&mut self, digits: usize) -> Result<Value> {
        let negative = self.rb.read_u8()? != 0;
        if digits > MAX_DIGITS {
            return Err(Error::UnsupportedBignumWidth(digits));
        }
        let magnitude = digits_to_u64(self.rb.read_raw(digits)?);
        Ok(Value::from(BigNum::from_sign_magnitude(negative, magnitude)))
    }

    #[inline(never)]
    fn envelope(&mut self, budget: usize) -> Result<Value> {
        let mut inner = self.inflate_envelope()?;
        Unpacker {
            rb:     &mut inner,
            config: self.config,
        }
        .term(budget - 1)
    }

    #[inline(never)]
    fn inflate_envelope(&mut self) -> Result<ReadBuffer> {
        let size = self.rb.read_u32()? as usize;
        if size > self.config.max_decompressed_size {
            return Err(Error::Decompression(format!(
                "declared size {} is over the limit of {}",
                size, self.config.max_decompressed_size
            )));
        }

        let (inflated, consumed) = inflate(self.rb.rest(), size)?;
        self.rb.advance(consumed)?;
        debug!(size, consumed, "inflated compressed term");

        Ok(ReadBuffer::new(Bytes::from(inflated)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(bytes: &[u8]) -> Result<Value> { Decoder::new(bytes, None)?.unpack() }

    #[test]
    fn integers() {
        assert_eq!(dec(&[131, 97, 255]), Ok(Value::Integer(255)));
        assert_eq!(
            dec(&[131, 98, 0xff, 0xff, 0xff, 0xfe]),
            Ok(Value::Integer(-2))
        );
        assert_eq!(dec(&[131, 110, 0, 0]), Ok(Value::Integer(0)));
        assert_eq!(
            dec(&[131, 111, 0, 0, 0, 2, 1, 0, 1]),
            Ok(Value::Integer(-256))
        );
    }

    #[test]
    fn bignum_boundary() {
        let mut top = vec![131, 110, 8, 1, 0, 0, 0, 0, 0, 0, 0, 0x80];
        assert_eq!(
            dec(&top),
            Ok(Value::BigInt(BigNum::Decimal(
                "-9223372036854775808".to_string()
            )))
        );

        top[3] = 0;
        assert_eq!(
            dec(&top),
            Ok(Value::BigInt(BigNum::Decimal(
                "9223372036854775808".to_string()
            )))
        );

        let below = [131, 110, 8, 1, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f];
        assert_eq!(dec(&below), Ok(Value::Integer(-i64::max_value())));
    }

    #[test]
    fn bignum_width_cap() {
        let mut nine = vec![131, 110, 9, 0];
        nine.extend_from_slice(&[1; 9]);
        assert_eq!(dec(&nine), Err(Error::UnsupportedBignumWidth(9)));
    }

    #[test]
    fn floats() {
        let mut legacy = vec![131, FLOAT_EXT];
        legacy.extend_from_slice(&crate::float::format_legacy(0.25));
        assert_eq!(dec(&legacy), Ok(Value::Float(0.25)));

        let mut new = vec![131, NEW_FLOAT_EXT];
        new.extend_from_slice(&(-3.5f64).to_bits().to_be_bytes());
        assert_eq!(dec(&new), Ok(Value::Float(-3.5)));
    }

    #[test]
    fn atoms() {
        assert_eq!(dec(b"\x83\x64\x00\x02ok"), Ok(Value::atom("ok")));
        assert_eq!(dec(b"\x83\x73\x03abc"), Ok(Value::atom("abc")));
        // latin-1 é
        assert_eq!(dec(b"\x83\x73\x01\xe9"), Ok(Value::atom("\u{e9}")));
        assert_eq!(
            dec(b"\x83\x77\x02\xc3\xa9"),
            Ok(Value::atom("\u{e9}"))
        );
        assert!(matches!(
            dec(b"\x83\x77\x01\xff"),
            Err(Error::InvalidAtom(_))
        ));
    }

    #[test]
    fn reserved_atoms() {
        let null = NullSentinel::new("mine");
        let stream = b"\x83\x73\x03nil\x64\x00\x04null\x76\x00\x04true\x77\x05false";
        let mut d = Decoder::new(stream, Some(null.clone())).unwrap();

        assert_eq!(
            d.unpack_all().unwrap(),
            vec![
                Value::Nil,
                Value::Null(null),
                Value::Boolean(true),
                Value::Boolean(false)
            ]
        );
    }

    #[test]
    fn tuples_and_lists() {
        assert_eq!(
            dec(&[131, 104, 2, 97, 1, 97, 2]),
            Ok(Value::from(vec![1, 2]))
        );
        assert_eq!(
            dec(&[131, 105, 0, 0, 0, 1, 106]),
            Ok(Value::from(vec![Value::Sequence(vec![])]))
        );
        assert_eq!(
            dec(&[131, 108, 0, 0, 0, 1, 97, 9, 106]),
            Ok(Value::from(vec![9]))
        );
        assert_eq!(
            dec(&[131, 107, 0, 3, 1, 2, 3]),
            Ok(Value::LegacyCharList(vec![1, 2, 3]))
        );
    }

    #[test]
    fn malformed_tail() {
        assert_eq!(
            dec(&[131, 108, 0, 0, 0, 2, 97, 1, 97, 2, 97]),
            Err(Error::MalformedTail { found: 97 })
        );
    }

    #[test]
    fn records() {
        let node = b"\x73\x03n@h";

        let mut r = vec![131, REFERENCE_EXT];
        r.extend_from_slice(node);
        r.extend_from_slice(&[0, 0, 0, 5, 2]);
        assert_eq!(
            dec(&r),
            Ok(Value::NodeRef(NodeRef {
                node:     Box::new(Value::atom("n@h")),
                ids:      vec![5],
                creation: 2,
            }))
        );

        let mut nr = vec![131, NEW_REFERENCE_EXT, 0, 2];
        nr.extend_from_slice(node);
        nr.extend_from_slice(&[1, 0, 0, 0, 7, 0, 0, 0, 8]);
        assert_eq!(
            dec(&nr),
            Ok(Value::NodeRef(NodeRef {
                node:     Box::new(Value::atom("n@h")),
                ids:      vec![7, 8],
                creation: 1,
            }))
        );

        let mut pid = vec![131, PID_EXT];
        pid.extend_from_slice(node);
        pid.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 2, 3]);
        assert_eq!(
            dec(&pid),
            Ok(Value::ProcessId(ProcessId {
                node:     Box::new(Value::atom("n@h")),
                id:       1,
                serial:   2,
                creation: 3,
            }))
        );

        let mut port = vec![131, PORT_EXT];
        port.extend_from_slice(node);
        port.extend_from_slice(&[0, 0, 1, 0, 4]);
        assert_eq!(
            dec(&port),
            Ok(Value::NodeRef(NodeRef {
                node:     Box::new(Value::atom("n@h")),
                ids:      vec![256],
                creation: 4,
            }))
        );

        let export = b"\x83\x71\x73\x05lists\x73\x03map\x61\x02";
        assert_eq!(
            dec(export),
            Ok(Value::from(Export {
                module:   Value::atom("lists"),
                function: Value::atom("map"),
                arity:    Value::from(2),
            }))
        );

        // record cut short in its trailing fields
        let mut short = vec![131, PID_EXT];
        short.extend_from_slice(node);
        short.extend_from_slice(&[0, 0, 0, 1]);
        assert!(matches!(dec(&short), Err(Error::BufferOverrun { .. })));
    }

    #[test]
    fn unknown_tag() {
        assert_eq!(dec(&[131, 42]), Err(Error::UnsupportedTag(42)));
    }

    #[test]
    fn version() {
        assert_eq!(
            Decoder::new(&[132, 97, 1], None).unwrap_err(),
            Error::VersionMismatch {
                expected: 131,
                found:    132,
            }
        );
        assert!(matches!(
            Decoder::new(&[], None),
            Err(Error::BufferOverrun { .. })
        ));
    }

    #[test]
    fn truncation_invalidates() {
        let mut d = Decoder::new(&[131, 109, 0, 0, 0, 10, 1, 2], None).unwrap();

        assert_eq!(
            d.unpack(),
            Err(Error::BufferOverrun {
                wanted:    10,
                remaining: 2,
            })
        );
        assert!(d.is_invalid());
        assert_eq!(d.unpack(), Err(Error::InstancePoisoned));
        assert_eq!(d.read_u8(), Err(Error::InstancePoisoned));

        d.reset(&[131, 97, 4]).unwrap();
        assert!(!d.is_invalid());
        assert_eq!(d.unpack(), Ok(Value::Integer(4)));
    }

    #[test]
    fn empty_decoder() {
        let mut d = Decoder::empty(None);
        assert!(d.is_invalid());
        assert_eq!(d.unpack(), Err(Error::InstancePoisoned));

        d.reset(&[131, 106]).unwrap();
        assert_eq!(d.unpack(), Ok(Value::Sequence(vec![])));
        assert!(d.at_end());
    }

    #[test]
    fn primitive_reads() {
        let mut d = Decoder::new(&[131, 1, 0, 2, 0, 0, 0, 3, 9, 9], None).unwrap();
        assert_eq!(d.offset(), 1);
        assert_eq!(d.len(), 10);
        assert_eq!(d.read_u8(), Ok(1));
        assert_eq!(d.read_u16(), Ok(2));
        assert_eq!(d.read_u32(), Ok(3));
        assert_eq!(d.read_raw(2).unwrap(), &[9, 9]);
        assert_eq!(d.read_u64(), Err(Error::BufferOverrun {
            wanted:    8,
            remaining: 0,
        }));
        assert!(d.is_invalid());
    }

    #[test]
    fn depth_guard() {
        // [[[1]]]
        let stream = [
            131, 108, 0, 0, 0, 1, 108, 0, 0, 0, 1, 108, 0, 0, 0, 1, 97, 1, 106, 106, 106,
        ];

        let deep_enough = DecoderConfig::default().with_max_depth(4);
        assert!(Decoder::with_config(&stream, deep_enough)
            .unwrap()
            .unpack()
            .is_ok());

        let too_shallow = DecoderConfig::default().with_max_depth(3);
        assert_eq!(
            Decoder::with_config(&stream, too_shallow).unwrap().unpack(),
            Err(Error::DepthLimitExceeded(3))
        );
    }

    #[test]
    fn envelope_size_cap() {
        let stream = [131, COMPRESSED, 0, 0, 1, 0, 0x78, 0x9c];
        let config = DecoderConfig::default().with_max_decompressed_size(255);

        assert!(matches!(
            Decoder::with_config(&stream, config).unwrap().unpack(),
            Err(Error::Decompression(_))
        ));
    }
}
