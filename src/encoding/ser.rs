use super::{buffer::*, constants::*};
use crate::{
    bignum::BigNum,
    config::{EncoderConfig, IntegerWidth},
    errors::{Error, Result},
    util::u64_to_digits,
    vecmap::VecMap,
    NodeRef, ProcessId, Value,
};
use bytes::Bytes;
use std::convert::TryFrom;
use tracing::{debug, warn};

#[derive(Debug)]
/// Packs [`Value`]s into a single growable buffer.
///
/// Terms are appended one after another behind a single version byte. Call
/// [`Encoder::release`] to take the bytes out; the encoder is then ready to be used
/// again.
///
/// A failed [`Encoder::pack`] leaves the buffer exactly as it was before the call, but
/// the encoder refuses to pack anything else until it is released.
///
/// # Example
///
/// ```
/// use etfpack::prelude::*;
///
/// let mut enc = Encoder::new(false);
/// enc.pack(&Value::from(7)).unwrap();
///
/// assert_eq!(&enc.release()[..], &[131, 97, 7]);
/// ```
pub struct Encoder {
    buf:      WriteBuffer,
    config:   EncoderConfig,
    poisoned: bool,
}

impl Default for Encoder {
    fn default() -> Self { Encoder::with_config(EncoderConfig::default()) }
}

impl Encoder {
    /// Creates an encoder, writing the version prefix unless `skip_version` is set.
    pub fn new(skip_version: bool) -> Self {
        Encoder::with_config(EncoderConfig::default().with_skip_version(skip_version))
    }

    /// Creates an encoder from an [`EncoderConfig`].
    pub fn with_config(config: EncoderConfig) -> Self {
        let mut buf = WriteBuffer::with_capacity(config.initial_capacity);
        if !config.skip_version {
            buf.put_version();
        }
        Encoder {
            buf,
            config,
            poisoned: false,
        }
    }

    /// The settings this encoder was built with.
    pub fn config(&self) -> &EncoderConfig { &self.config }

    /// Number of bytes written so far, version byte included.
    pub fn len(&self) -> usize { self.buf.len() }

    /// Whether nothing at all has been written.
    pub fn is_empty(&self) -> bool { self.buf.len() == 0 }

    /// Whether a previous pack failed and the encoder is waiting to be released.
    pub fn is_poisoned(&self) -> bool { self.poisoned }

    /// Appends one term, with the configured depth budget.
    ///
    /// # Arguments
    ///
    /// * `value: &Value` - The value to be packed.
    ///
    /// # Errors
    ///
    /// See [`Encoder::pack_with_budget`].
    pub fn pack(&mut self, value: &Value) -> Result<()> {
        let budget = self.config.max_depth;
        self.pack_with_budget(value, budget)
    }

    /// Appends one term, failing if it nests deeper than `depth_budget`.
    ///
    /// The top-level value is at depth 1, and each sequence element, map key, map value,
    /// or user transform adds one. So a list of lists of integers needs a budget of at
    /// least 3.
    ///
    /// # Errors
    ///
    /// * [`Error::InstancePoisoned`] if an earlier call failed.
    /// * [`Error::DepthLimitExceeded`] if the budget runs out.
    /// * [`Error::UnsupportedValue`] for values that can't be written, such as a
    ///   [`Value::LegacyCharList`] or an atom over 65535 bytes.
    /// * [`Error::UnsupportedBignumWidth`] for bignums wider than eight bytes.
    pub fn pack_with_budget(&mut self, value: &Value, depth_budget: usize) -> Result<()> {
        if self.poisoned {
            return Err(Error::InstancePoisoned);
        }

        let start = self.buf.len();
        let res = Packer {
            buf:           &mut self.buf,
            integer_width: self.config.integer_width,
            max_depth:     depth_budget,
        }
        .pack(value, depth_budget);

        if let Err(e) = &res {
            self.buf.truncate(start);
            self.poisoned = true;
            warn!(error = %e, offset = start, "encoder poisoned");
        }
        res
    }

    /// Packs each value in order.
    ///
    /// Stops at the first failure and drops everything this call wrote, so the buffer
    /// holds only what earlier calls packed.
    pub fn pack_all<'a, I: IntoIterator<Item = &'a Value>>(&mut self, values: I) -> Result<()> {
        let start = self.buf.len();
        let res = values.into_iter().try_for_each(|v| self.pack(v));
        if res.is_err() {
            self.buf.truncate(start);
        }
        res
    }

    /// Takes everything written so far and resets the encoder for reuse.
    ///
    /// Clears the poisoned state and, unless the encoder skips it, writes a fresh version
    /// byte. An encoder with nothing in it releases an empty buffer.
    pub fn release(&mut self) -> Bytes {
        let out = self.buf.take();
        self.poisoned = false;
        if !self.config.skip_version {
            self.buf.put_version();
        }
        debug!(len = out.len(), "released encoder buffer");
        out
    }
}

/// One pack call's worth of state.
struct Packer<'a> {
    buf:           &'a mut WriteBuffer,
    integer_width: IntegerWidth,
    max_depth:     usize,
}

impl<'a> Packer<'a> {
    fn pack(&mut self, value: &Value, budget: usize) -> Result<()> {
        if budget == 0 {
            return Err(Error::DepthLimitExceeded(self.max_depth));
        }

        match value {
            Value::Nil => self.put_small_atom(ATOM_NIL),
            Value::Null(_) => self.put_small_atom(ATOM_NULL),
            Value::Boolean(true) => self.put_small_atom(ATOM_TRUE),
            Value::Boolean(false) => self.put_small_atom(ATOM_FALSE),
            Value::Integer(i) => self.put_integer(*i),
            Value::Float(f) => {
                self.buf.put_u8(NEW_FLOAT_EXT);
                self.buf.put_f64(*f);
            }
            Value::Atom(a) => self.put_atom(a)?,
            Value::Binary(b) => self.put_binary(b)?,
            Value::LegacyCharList(_) => {
                return Err(Error::unsupported(format!("{} values are decode only", value.kind())));
            }
            Value::Sequence(items) => self.put_list(items, budget)?,
            Value::Mapping(m) => self.put_map(m, budget)?,
            Value::BigInt(n) => self.put_bignum(n)?,
            Value::NodeRef(r) => self.put_ref(r, budget)?,
            Value::ProcessId(p) => self.put_pid(p, budget)?,
            Value::Export(e) => {
                self.buf.put_u8(EXPORT_EXT);
                self.pack(&e.module, budget - 1)?;
                self.pack(&e.function, budget - 1)?;
                self.pack(&e.arity, budget - 1)?;
            }
            Value::User(u) => return self.pack(&u.transform(), budget - 1),
        }
        Ok(())
    }

    fn put_small_atom(&mut self, text: &str) {
        debug_assert!(text.len() <= 255);
        self.buf.put_u8(SMALL_ATOM_EXT);
        self.buf.put_u8(text.len() as u8);
        self.buf.put_slice(text.as_bytes());
    }

    fn put_atom(&mut self, text: &str) -> Result<()> {
        let len = text.len();
        if len <= u8::max_value() as usize {
            self.buf.put_u8(SMALL_ATOM_UTF8_EXT);
            self.buf.put_u8(len as u8);
        } else if len <= u16::max_value() as usize {
            self.buf.put_u8(ATOM_UTF8_EXT);
            self.buf.put_u16(len as u16);
        } else {
            return Err(Error::unsupported(format!(
                "atom of {} bytes is longer than 65535",
                len
            )));
        }
        self.buf.put_slice(text.as_bytes());
        Ok(())
    }

    fn put_integer(&mut self, i: i64) {
        if 0 <= i && i <= 255 {
            self.buf.put_u8(SMALL_INTEGER_EXT);
            self.buf.put_u8(i as u8);
            return;
        }

        match (self.integer_width, i32::try_from(i)) {
            (IntegerWidth::W32, Ok(small)) => {
                self.buf.put_u8(INTEGER_EXT);
                self.buf.put_i32(small);
            }
            _ => self.put_big_digits(i < 0, i.unsigned_abs()),
        }
    }

    fn put_big_digits(&mut self, negative: bool, magnitude: u64) {
        let digits = u64_to_digits(magnitude);
        self.buf.put_u8(SMALL_BIG_EXT);
        self.buf.put_u8(digits.len() as u8);
        self.buf.put_u8(negative as u8);
        self.buf.put_slice(&digits);
    }

    fn put_bignum(&mut self, n: &BigNum) -> Result<()> {
        match n {
            BigNum::I64(i) => self.put_integer(*i),
            _ => {
                let (negative, magnitude) = n.to_sign_magnitude()?;
                self.put_big_digits(negative, magnitude);
            }
        }
        Ok(())
    }

    fn put_binary(&mut self, b: &[u8]) -> Result<()> {
        let len = u32::try_from(b.len())
            .map_err(|_| Error::unsupported(format!("binary of {} bytes is too long", b.len())))?;
        self.buf.put_u8(BINARY_EXT);
        self.buf.put_u32(len);
        self.buf.put_slice(b);
        Ok(())
    }

    fn put_list(&mut self, items: &[Value], budget: usize) -> Result<()> {
        self.buf.put_u8(LIST_EXT);
        let slot = self.buf.reserve_u32();

        let mut count: u32 = 0;
        for item in items {
            self.pack(item, budget - 1)?;
            count = checked_count(count, "list")?;
        }

        self.buf.patch_u32(slot, count);
        self.buf.put_u8(NIL_EXT);
        Ok(())
    }

    fn put_map(&mut self, m: &VecMap<Value, Value>, budget: usize) -> Result<()> {
        self.buf.put_u8(MAP_EXT);
        let slot = self.buf.reserve_u32();

        let mut count: u32 = 0;
        for (k, v) in m {
            self.pack(k, budget - 1)?;
            self.pack(v, budget - 1)?;
            count = checked_count(count, "map")?;
        }

        self.buf.patch_u32(slot, count);
        Ok(())
    }

    fn put_ref(&mut self, r: &NodeRef, budget: usize) -> Result<()> {
        let len = u16::try_from(r.ids.len())
            .map_err(|_| Error::unsupported(format!("reference with {} ids", r.ids.len())))?;
        self.buf.put_u8(NEW_REFERENCE_EXT);
        self.buf.put_u16(len);
        self.pack(&r.node, budget - 1)?;
        self.buf.put_u8(r.creation);
        for id in &r.ids {
            self.buf.put_u32(*id);
        }
        Ok(())
    }

    fn put_pid(&mut self, p: &ProcessId, budget: usize) -> Result<()> {
        self.buf.put_u8(PID_EXT);
        self.pack(&p.node, budget - 1)?;
        self.buf.put_u32(p.id);
        self.buf.put_u32(p.serial);
        self.buf.put_u8(p.creation);
        Ok(())
    }
}

#[inline]
fn checked_count(count: u32, what: &str) -> Result<u32> {
    count
        .checked_add(1)
        .filter(|c| *c <= i32::max_value() as u32)
        .ok_or_else(|| Error::unsupported(format!("{} has too many elements", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Export;

    fn packed(v: &Value) -> Vec<u8> {
        let mut enc = Encoder::new(true);
        enc.pack(v).unwrap();
        enc.release().to_vec()
    }

    #[test]
    fn small_integer_boundary() {
        assert_eq!(packed(&Value::from(0)), vec![SMALL_INTEGER_EXT, 0]);
        assert_eq!(packed(&Value::from(255)), vec![SMALL_INTEGER_EXT, 255]);
        assert_eq!(packed(&Value::from(256)), vec![SMALL_BIG_EXT, 2, 0, 0, 1]);
        assert_eq!(packed(&Value::from(-1)), vec![SMALL_BIG_EXT, 1, 1, 1]);
    }

    #[test]
    fn integer_width_w32() {
        let mut enc = Encoder::with_config(
            EncoderConfig::default()
                .with_skip_version(true)
                .with_integer_width(IntegerWidth::W32),
        );
        enc.pack(&Value::from(-1)).unwrap();
        enc.pack(&Value::from(1i64 << 40)).unwrap();

        assert_eq!(
            &enc.release()[..],
            &[
                INTEGER_EXT,
                0xff,
                0xff,
                0xff,
                0xff,
                SMALL_BIG_EXT,
                6,
                0,
                0,
                0,
                0,
                0,
                0,
                1
            ]
        );
    }

    #[test]
    fn reserved_atoms() {
        assert_eq!(packed(&Value::Nil), b"\x73\x03nil".to_vec());
        assert_eq!(packed(&Value::null()), b"\x73\x04null".to_vec());
        assert_eq!(packed(&Value::from(true)), b"\x73\x04true".to_vec());
        assert_eq!(packed(&Value::from(false)), b"\x73\x05false".to_vec());
    }

    #[test]
    fn atoms_by_length() {
        assert_eq!(packed(&Value::atom("ok")), b"\x77\x02ok".to_vec());

        let long = "a".repeat(300);
        let out = packed(&Value::atom(long.as_str()));
        assert_eq!(&out[..3], &[ATOM_UTF8_EXT, 1, 44]);
        assert_eq!(out.len(), 303);

        let mut enc = Encoder::new(true);
        match enc.pack(&Value::atom("a".repeat(70_000))) {
            Err(Error::UnsupportedValue(_)) => {}
            other => panic!("expected UnsupportedValue, got {:?}", other),
        }
    }

    #[test]
    fn list_count_is_backpatched() {
        let v = Value::from(vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(
            packed(&v),
            vec![LIST_EXT, 0, 0, 0, 3, 97, 1, 97, 2, 97, 3, NIL_EXT]
        );

        assert_eq!(
            packed(&Value::Sequence(vec![])),
            vec![LIST_EXT, 0, 0, 0, 0, NIL_EXT]
        );
    }

    #[test]
    fn map_count_is_backpatched() {
        let mut m = VecMap::new();
        m.push(Value::atom("a"), Value::from(1));
        m.push(Value::from(2), Value::from(vec![Value::from(3)]));

        assert_eq!(
            packed(&Value::Mapping(m)),
            vec![
                MAP_EXT, 0, 0, 0, 2, 119, 1, b'a', 97, 1, 97, 2, LIST_EXT, 0, 0, 0, 1, 97, 3,
                NIL_EXT
            ]
        );
    }

    #[test]
    fn floats_are_ieee() {
        let mut expected = vec![NEW_FLOAT_EXT];
        expected.extend_from_slice(&1.5f64.to_bits().to_be_bytes());
        assert_eq!(packed(&Value::Float(1.5)), expected);
    }

    #[test]
    fn records() {
        let node = Box::new(Value::atom("n@h"));
        let pid = Value::ProcessId(ProcessId {
            node:     node.clone(),
            id:       1,
            serial:   2,
            creation: 3,
        });
        assert_eq!(
            packed(&pid),
            vec![PID_EXT, 119, 3, b'n', b'@', b'h', 0, 0, 0, 1, 0, 0, 0, 2, 3]
        );

        let r = Value::NodeRef(NodeRef {
            node,
            ids: vec![7, 8],
            creation: 1,
        });
        assert_eq!(
            packed(&r),
            vec![NEW_REFERENCE_EXT, 0, 2, 119, 3, b'n', b'@', b'h', 1, 0, 0, 0, 7, 0, 0, 0, 8]
        );

        let e = Value::from(Export {
            module:   Value::atom("m"),
            function: Value::atom("f"),
            arity:    Value::from(2),
        });
        assert_eq!(
            packed(&e),
            vec![EXPORT_EXT, 119, 1, b'm', 119, 1, b'f', 97, 2]
        );
    }

    #[test]
    fn user_transform() {
        #[derive(Clone, Debug)]
        struct Celsius(i64);

        impl crate::TermRep for Celsius {
            fn to_term(&self) -> Value { Value::from(vec![Value::atom("c"), Value::from(self.0)]) }

            fn from_term(_: Value) -> Option<Self> { None }
        }

        assert_eq!(
            packed(&Value::user(Celsius(4))),
            packed(&Value::from(vec![Value::atom("c"), Value::from(4)]))
        );
    }

    fn nested(levels: usize) -> Value {
        let mut v = Value::from(1);
        for _ in 1..levels {
            v = Value::from(vec![v]);
        }
        v
    }

    #[test]
    fn depth_budget() {
        let mut enc = Encoder::new(true);
        assert!(enc.pack_with_budget(&nested(3), 3).is_ok());
        assert_eq!(
            enc.pack_with_budget(&nested(4), 3),
            Err(Error::DepthLimitExceeded(3))
        );
    }

    #[test]
    fn failure_is_all_or_nothing() {
        let mut enc = Encoder::new(false);
        enc.pack(&Value::from(1)).unwrap();

        let bad = Value::from(vec![Value::from(2), Value::LegacyCharList(vec![1])]);
        assert!(enc.pack(&bad).is_err());
        assert!(enc.is_poisoned());
        assert_eq!(enc.len(), 3);

        assert_eq!(enc.pack(&Value::from(3)), Err(Error::InstancePoisoned));

        assert_eq!(&enc.release()[..], &[131, 97, 1]);
        assert!(!enc.is_poisoned());
        enc.pack(&Value::from(3)).unwrap();
        assert_eq!(&enc.release()[..], &[131, 97, 3]);
    }

    #[test]
    fn failed_batch_is_dropped_whole() {
        let mut enc = Encoder::new(false);
        enc.pack(&Value::from(7)).unwrap();

        let batch = [
            Value::from(1),
            Value::from(2),
            Value::LegacyCharList(vec![1]),
        ];
        assert!(enc.pack_all(&batch).is_err());
        assert!(enc.is_poisoned());
        assert_eq!(&enc.release()[..], &[131, 97, 7]);

        enc.pack_all(&batch[..2]).unwrap();
        assert_eq!(&enc.release()[..], &[131, 97, 1, 97, 2]);
    }

    #[test]
    fn release_empty() {
        let mut enc = Encoder::new(true);
        assert!(enc.release().is_empty());

        let mut enc = Encoder::new(false);
        assert_eq!(&enc.release()[..], &[131]);
        assert_eq!(enc.len(), 1);
    }

    #[test]
    fn wide_bignum_is_rejected() {
        let mut enc = Encoder::new(true);
        assert_eq!(
            enc.pack(&Value::BigInt(BigNum::Decimal("18446744073709551616".into()))),
            Err(Error::UnsupportedBignumWidth(9))
        );
    }
}
