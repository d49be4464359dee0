//! # etfpack
//!
//! A bidirectional codec for the Erlang External Term Format (ETF), the tagged binary
//! encoding Erlang nodes use to talk to each other and to ports.
//!
//! # Usage
//!
//! Values are built as [`Value`]s, packed with an [`Encoder`] and unpacked with a
//! [`Decoder`]:
//!
//! ```
//! use etfpack::prelude::*;
//!
//! let mut enc = Encoder::new(false);
//!
//! enc.pack(&Value::from(vec![Value::from(1), Value::atom("ok"), Value::from("hi")]))
//!     .unwrap();
//! enc.pack(&Value::Float(2.5)).unwrap();
//!
//! let bytes = enc.release();
//!
//! let mut dec = Decoder::new(&bytes, None).unwrap();
//! let terms = dec.unpack_all().unwrap();
//!
//! assert_eq!(terms.len(), 2);
//! assert_eq!(terms[1], Value::Float(2.5));
//! ```
//!
//! For one-shot use there are [`encode_full`] and [`decode_full`]. For a long-lived
//! reusable pair that amortizes allocation across calls, see [`Codec`].
//!
//! Host types that aren't one of the built-in kinds can still be packed by implementing
//! [`TermRep`] and wrapping them with [`Value::user`]; see the [`rep`] module.
//!
//! # An overview of value kinds
//!
//! | Kind                       | Packs as                                 | Unpacked from |
//! | ---                        | ---                                      | --- |
//! | [`Value::Nil`]             | atom `nil`                               | atom `nil` |
//! | [`Value::Null`]            | atom `null`                              | atom `null` |
//! | [`Value::Boolean`]         | atom `true` / `false`                    | atom `true` / `false` |
//! | [`Value::Integer`]         | small integer, or integer / small bignum | small integer, integer, bignum |
//! | [`Value::Float`]           | new float                                | new float, legacy float |
//! | [`Value::Atom`]            | small UTF-8 atom / UTF-8 atom            | any atom tag |
//! | [`Value::Binary`]          | binary                                   | binary |
//! | [`Value::LegacyCharList`]  | (not packable)                           | string |
//! | [`Value::Sequence`]        | proper list                              | list, nil, small/large tuple |
//! | [`Value::Mapping`]         | map                                      | map |
//! | [`Value::BigInt`]          | small bignum                             | bignum not fitting an `i64` |
//! | [`Value::NodeRef`]         | new reference                            | reference, new reference, port |
//! | [`Value::ProcessId`]       | pid                                      | pid |
//! | [`Value::Export`]          | export                                   | export |
//! | [`Value::User`]            | whatever its transform returns           | (never produced) |
//!
//! Compressed terms are transparently inflated on decode; see
//! [`encoding::compressed`] for producing them.
//!
//! # Specification
//!
//! This section describes the subset of the binary format this crate reads and writes.
//!
//! ## Streams
//!
//! A stream is a version byte (`131`) followed by any number of terms. Every term is a
//! tag byte followed by a payload. Multi-byte integers are big-endian.
//!
//! ## Tags
//!
//! | Tag   | Name                  | Payload |
//! | ---   | ---                   | --- |
//! | `80`  | compressed            | `u32` uncompressed size, zlib stream of one term |
//! | `70`  | new float             | 8 byte IEEE-754 double |
//! | `97`  | small integer         | `u8` |
//! | `98`  | integer               | `i32` |
//! | `99`  | float                 | 31 byte ASCII decimal, padded |
//! | `100` | atom                  | `u16` length, Latin-1 text |
//! | `101` | reference             | node term, `u32` id, `u8` creation |
//! | `102` | port                  | node term, `u32` id, `u8` creation |
//! | `103` | pid                   | node term, `u32` id, `u32` serial, `u8` creation |
//! | `104` | small tuple           | `u8` arity, elements |
//! | `105` | large tuple           | `u32` arity, elements |
//! | `106` | nil                   | (empty list) |
//! | `107` | string                | `u16` length, bytes |
//! | `108` | list                  | `u32` length, elements, tail (must be nil) |
//! | `109` | binary                | `u32` length, bytes |
//! | `110` | small bignum          | `u8` digit count, `u8` sign, little-endian digits |
//! | `111` | large bignum          | `u32` digit count, `u8` sign, little-endian digits |
//! | `113` | export                | module term, function term, arity term |
//! | `114` | new reference         | `u16` id count, node term, `u8` creation, `u32` ids |
//! | `115` | small atom            | `u8` length, Latin-1 text |
//! | `116` | map                   | `u32` pair count, key/value terms |
//! | `118` | UTF-8 atom            | `u16` length, UTF-8 text |
//! | `119` | small UTF-8 atom      | `u8` length, UTF-8 text |
//!
//! ## Reserved atoms
//!
//! The atoms `nil`, `null`, `true`, and `false` never decode to [`Value::Atom`]; they
//! become [`Value::Nil`], [`Value::Null`] and [`Value::Boolean`].
//!
//! ## Bignums
//!
//! At most eight digit bytes are accepted. Magnitudes that fit in an `i64` once the
//! sign is applied decode to [`Value::Integer`], the rest to a [`Value::BigInt`]
//! holding a signed decimal string.

#![warn(
    deprecated_in_future,
    unsafe_code,
    unused_labels,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    macro_use_extern_crate,
    unreachable_pub,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]
#![allow(clippy::cast_lossless)]

pub mod bignum;
pub mod codec;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod float;
pub mod null;
pub mod prelude;
pub mod rep;
pub mod util;
pub mod vecmap;

use bignum::BigNum;
use bytes::Bytes;
use null::NullSentinel;
use rep::Transform;
use std::{fmt, sync::Arc};
use vecmap::VecMap;

pub use codec::Codec;
pub use encoding::{decode_all, decode_full, encode_full, Decoder, Encoder};
pub use errors::{Error, Result};
pub use rep::TermRep;

#[derive(Clone, Debug, PartialEq)]
/// A reference, new reference, or port.
///
/// All three carry a node, some ids, and a creation number, so they share one shape.
/// Legacy references and ports have exactly one id.
pub struct NodeRef {
    /// The node the reference was created on, usually an atom.
    pub node:     Box<Value>,
    /// The reference ids, or the port id.
    pub ids:      Vec<u32>,
    /// The node incarnation.
    pub creation: u8,
}

#[derive(Clone, Debug, PartialEq)]
/// A process identifier.
pub struct ProcessId {
    /// The node the process lives on, usually an atom.
    pub node:     Box<Value>,
    /// Process id.
    pub id:       u32,
    /// Serial number.
    pub serial:   u32,
    /// The node incarnation.
    pub creation: u8,
}

#[derive(Clone, Debug, PartialEq)]
/// An external function reference, `fun Module:Function/Arity`.
pub struct Export {
    /// The module, usually an atom.
    pub module:   Value,
    /// The function name, usually an atom.
    pub function: Value,
    /// The arity, usually a small integer.
    pub arity:    Value,
}

#[derive(Clone, Debug)]
/// A term, as it is packed into or unpacked from a stream.
///
/// Equality is structural, with three wrinkles: floats compare by bit pattern (so a
/// `NaN` equals itself after a round trip), [`Value::Null`] compares by sentinel
/// identity, and [`Value::User`] compares by pointer.
///
/// # Example
///
/// ```
/// use etfpack::prelude::*;
///
/// let b = Value::Boolean(true);
///
/// let val = match b {
///     Value::Boolean(b) => b,
///     _ => panic!(),
/// };
///
/// assert!(val);
/// ```
pub enum Value {
    /// The atom `nil`. Corresponds to [`None`].
    Nil,
    /// The atom `null`, tagged with the sentinel of the decoder that produced it.
    Null(NullSentinel),
    /// The atoms `true` and `false`.
    Boolean(bool),
    /// A fixed-width integer.
    Integer(i64),
    /// A double precision float.
    Float(f64),
    /// Any atom other than the reserved ones.
    ///
    /// An `Atom` holding reserved text such as `"true"` is still written, but it
    /// decodes as the reserved value ([`Value::Boolean`] here).
    Atom(String),
    /// An opaque byte payload. Strings pack as binaries.
    Binary(Bytes),
    /// The legacy "string as list of bytes" form. Decode only.
    LegacyCharList(Vec<u8>),
    /// A proper list or a tuple.
    Sequence(Vec<Value>),
    /// A map, in wire order.
    Mapping(VecMap<Value, Value>),
    /// A bignum that does not fit the native integer.
    ///
    /// A [`BigNum::I64`] in here is written exactly as the same [`Value::Integer`]
    /// would be, and decodes as one.
    BigInt(BigNum),
    /// A reference, new reference, or port.
    NodeRef(NodeRef),
    /// A process identifier.
    ProcessId(ProcessId),
    /// An external function reference.
    Export(Box<Export>),
    /// A host value that supplies its own representation.
    User(Arc<dyn Transform>),
}

use Value::*;

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Nil, Nil) => true,
            (Null(a), Null(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Atom(a), Atom(b)) => a == b,
            (Binary(a), Binary(b)) => a == b,
            (LegacyCharList(a), LegacyCharList(b)) => a == b,
            (Sequence(a), Sequence(b)) => a == b,
            (Mapping(a), Mapping(b)) => a == b,
            (BigInt(a), BigInt(b)) => a == b,
            (NodeRef(a), NodeRef(b)) => a == b,
            (ProcessId(a), ProcessId(b)) => a == b,
            (Export(a), Export(b)) => a == b,
            (User(a), User(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Builds an atom.
    ///
    /// # Example
    ///
    /// ```
    /// use etfpack::Value;
    ///
    /// assert_eq!(Value::atom("ok"), Value::Atom("ok".to_string()));
    /// ```
    pub fn atom<S: Into<String>>(s: S) -> Value { Atom(s.into()) }

    /// Builds a binary by copying `bs`.
    pub fn binary(bs: &[u8]) -> Value { Binary(Bytes::copy_from_slice(bs)) }

    /// Builds a null tagged with the process-wide sentinel.
    pub fn null() -> Value { Null(NullSentinel::shared()) }

    /// Wraps a host value exposing the user-transform capability.
    pub fn user<T: Transform + 'static>(t: T) -> Value { User(Arc::new(t)) }

    /// Indicates whether a value is [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        match self {
            Nil => true,
            _ => false,
        }
    }

    /// Indicates whether a value is a [`Value::Null`], regardless of sentinel.
    pub fn is_null(&self) -> bool {
        match self {
            Null(_) => true,
            _ => false,
        }
    }

    /// Returns the integer if the value is one, including bignums in `i64` range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Integer(i) => Some(*i),
            BigInt(n) => n.to_i64(),
            _ => None,
        }
    }

    /// Returns the bytes of a binary.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the text of an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Atom(a) => Some(a),
            _ => None,
        }
    }

    /// Consumes the value, returning its elements if it is a [`Value::Sequence`].
    pub fn into_sequence(self) -> Option<Vec<Value>> {
        match self {
            Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the value, returning its pairs if it is a [`Value::Mapping`].
    pub fn into_mapping(self) -> Option<VecMap<Value, Value>> {
        match self {
            Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Consumes the value, converting it to a value of type `T`.
    pub fn into_rep<T: TermRep>(self) -> Option<T> { T::from_term(self) }

    /// A short name for the kind of value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Nil => "nil",
            Null(_) => "null",
            Boolean(_) => "boolean",
            Integer(_) => "integer",
            Float(_) => "float",
            Atom(_) => "atom",
            Binary(_) => "binary",
            LegacyCharList(_) => "legacy char list",
            Sequence(_) => "sequence",
            Mapping(_) => "mapping",
            BigInt(_) => "bignum",
            NodeRef(_) => "reference",
            ProcessId(_) => "pid",
            Export(_) => "export",
            User(_) => "user value",
        }
    }
}

fn fmt_bytes(f: &mut fmt::Formatter, bytes: &[u8]) -> fmt::Result {
    match std::str::from_utf8(bytes) {
        Ok(s) => write!(f, "{:?}", s),
        Err(_) => {
            for (i, b) in bytes.iter().enumerate() {
                if i != 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", b)?;
            }
            Ok(())
        }
    }
}

fn fmt_seq<'a, I: IntoIterator<Item = &'a Value>>(f: &mut fmt::Formatter, items: I) -> fmt::Result {
    for (i, v) in items.into_iter().enumerate() {
        if i != 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", v)?;
    }
    Ok(())
}

// Erlang-ish shell syntax
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Nil => f.write_str("nil"),
            Null(_) => f.write_str("null"),
            Boolean(b) => write!(f, "{}", b),
            Integer(i) => write!(f, "{}", i),
            Float(x) => write!(f, "{:?}", x),
            Atom(a) => f.write_str(a),
            Binary(b) => {
                f.write_str("<<")?;
                fmt_bytes(f, b)?;
                f.write_str(">>")
            }
            LegacyCharList(cs) => fmt_bytes(f, cs),
            Sequence(v) => {
                f.write_str("[")?;
                fmt_seq(f, v)?;
                f.write_str("]")
            }
            Mapping(m) => {
                f.write_str("#{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i != 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                f.write_str("}")
            }
            BigInt(n) => write!(f, "{}", n),
            NodeRef(r) => {
                write!(f, "#Ref<{}", r.node)?;
                for id in &r.ids {
                    write!(f, ".{}", id)?;
                }
                f.write_str(">")
            }
            ProcessId(p) => write!(f, "<{}.{}.{}>", p.node, p.id, p.serial),
            Export(e) => write!(f, "fun {}:{}/{}", e.module, e.function, e.arity),
            User(u) => write!(f, "{:?}", u),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value { Binary(Bytes::copy_from_slice(s.as_bytes())) }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Value { Sequence(v.into_iter().map(T::into).collect()) }
}

impl From<BigNum> for Value {
    fn from(n: BigNum) -> Value {
        match n {
            BigNum::I64(i) => Integer(i),
            n => BigInt(n),
        }
    }
}

from_fn!(Value, bool, Boolean);
from_fn!(Value, i64, Integer);
from_fn!(Value, f64, Float);
from_fn!(Value, f32, |f: f32| Float(f64::from(f)));
from_fn!(Value, String, |s: String| Binary(Bytes::from(s.into_bytes())));
from_fn!(Value, Bytes, Binary);
from_fn!(Value, VecMap<Value, Value>, Mapping);
from_fn!(Value, NodeRef, NodeRef);
from_fn!(Value, ProcessId, ProcessId);
from_fn!(Value, Export, |e: Export| Export(Box::new(e)));
from_fn!(Value, NullSentinel, Null);

from_as!(Value, i32, i64);
from_as!(Value, i16, i64);
from_as!(Value, i8, i64);
from_as!(Value, u32, i64);
from_as!(Value, u16, i64);
from_as!(Value, u8, i64);

compose_from!(Value, BigNum, u64);
compose_from!(Value, BigNum, num_bigint::BigInt);
