//! Converting host types to and from [`Value`].
//!
//! [`TermRep`] plays the role a `Serialize`/`Deserialize` pair would elsewhere: it says
//! how a type turns into a [`Value`] and back. [`Transform`] is the object-safe half
//! used by the encoder's user-transform hook: a [`Value::User`] holds one, and packing
//! it packs whatever [`Transform::transform`] returns in its place.
//!
//! ```
//! use etfpack::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl TermRep for Point {
//!     fn to_term(&self) -> Value { vec![Value::atom("point"), self.x.into(), self.y.into()].into() }
//!
//!     fn from_term(v: Value) -> Option<Self> {
//!         let mut fields = v.into_sequence()?.into_iter();
//!         match (fields.next()?, fields.next()?, fields.next()?) {
//!             (Value::Atom(tag), x, y) if tag == "point" => {
//!                 Some(Point {
//!                     x: i32::from_term(x)?,
//!                     y: i32::from_term(y)?,
//!                 })
//!             }
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let enc = encode_full(&Value::user(Point { x: 1, y: -2 })).unwrap();
//! let back = Point::from_term(decode_full(&enc).unwrap()).unwrap();
//!
//! assert_eq!((back.x, back.y), (1, -2));
//! ```

use crate::{bignum::BigNum, vecmap::VecMap, Value};
use bytes::Bytes;
use std::{convert::TryFrom, fmt::Debug};

/// A value representable as a [`Value`].
pub trait TermRep: Clone + Sized {
    /// Converts value into a [`Value`].
    fn to_term(&self) -> Value { self.clone().into_term() }

    /// Consumes value, converting it into a [`Value`].
    fn into_term(self) -> Value { self.to_term() }

    /// Converts value from a [`Value`], returning `None` if it has the wrong shape.
    fn from_term(v: Value) -> Option<Self>;
}

/// The user-transform capability: a zero argument function producing a substitute
/// [`Value`] for a host type the codec does not know.
pub trait Transform: Debug + Send + Sync {
    /// Produces the value to pack in place of `self`.
    fn transform(&self) -> Value;
}

impl<T: TermRep + Debug + Send + Sync> Transform for T {
    fn transform(&self) -> Value { self.to_term() }
}

impl TermRep for Value {
    fn into_term(self) -> Value { self }

    fn from_term(v: Value) -> Option<Self> { Some(v) }
}

impl TermRep for bool {
    fn into_term(self) -> Value { Value::Boolean(self) }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl TermRep for i64 {
    fn into_term(self) -> Value { Value::Integer(self) }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Integer(i) => Some(i),
            Value::BigInt(n) => n.to_i64(),
            _ => None,
        }
    }
}

macro_rules! narrow_int_rep {
    ($($t:ty),*) => {
        $(
            impl TermRep for $t {
                fn into_term(self) -> Value { Value::from(self) }

                fn from_term(v: Value) -> Option<Self> { <$t>::try_from(i64::from_term(v)?).ok() }
            }
        )*
    };
}

narrow_int_rep!(i8, i16, i32, u8, u16, u32);

impl TermRep for u64 {
    fn into_term(self) -> Value { Value::from(self) }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Integer(i) => u64::try_from(i).ok(),
            Value::BigInt(n) => {
                match n.to_sign_magnitude().ok()? {
                    (false, m) => Some(m),
                    (true, _) => None,
                }
            }
            _ => None,
        }
    }
}

impl TermRep for BigNum {
    fn into_term(self) -> Value { Value::from(self) }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Integer(i) => Some(BigNum::I64(i)),
            Value::BigInt(n) => Some(n),
            _ => None,
        }
    }
}

impl TermRep for f64 {
    fn into_term(self) -> Value { Value::Float(self) }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl TermRep for f32 {
    fn into_term(self) -> Value { Value::Float(f64::from(self)) }

    fn from_term(v: Value) -> Option<Self> { f64::from_term(v).map(|f| f as f32) }
}

impl TermRep for Bytes {
    fn into_term(self) -> Value { Value::Binary(self) }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Binary(b) => Some(b),
            Value::LegacyCharList(cs) => Some(Bytes::from(cs)),
            _ => None,
        }
    }
}

impl TermRep for String {
    fn into_term(self) -> Value { Value::Binary(Bytes::from(self.into_bytes())) }

    fn to_term(&self) -> Value { Value::Binary(Bytes::copy_from_slice(self.as_bytes())) }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Atom(a) => Some(a),
            other => String::from_utf8(Bytes::from_term(other)?.to_vec()).ok(),
        }
    }
}

impl<T: TermRep> TermRep for Vec<T> {
    fn into_term(self) -> Value { Value::Sequence(self.into_iter().map(T::into_term).collect()) }

    fn to_term(&self) -> Value { Value::Sequence(self.iter().map(T::to_term).collect()) }

    fn from_term(v: Value) -> Option<Self> { v.into_sequence()?.into_iter().map(T::from_term).collect() }
}

impl<K: TermRep, V: TermRep> TermRep for VecMap<K, V> {
    fn into_term(self) -> Value {
        Value::Mapping(
            self.into_iter()
                .map(|(k, v)| (k.into_term(), v.into_term()))
                .collect(),
        )
    }

    fn to_term(&self) -> Value {
        Value::Mapping(self.iter().map(|(k, v)| (k.to_term(), v.to_term())).collect())
    }

    fn from_term(v: Value) -> Option<Self> {
        v.into_mapping()?
            .into_iter()
            .map(|(k, v)| Some((K::from_term(k)?, V::from_term(v)?)))
            .collect()
    }
}

impl<T: TermRep> TermRep for Option<T> {
    fn into_term(self) -> Value {
        match self {
            Some(x) => x.into_term(),
            None => Value::Nil,
        }
    }

    fn from_term(v: Value) -> Option<Self> {
        match v {
            Value::Nil | Value::Null(_) => Some(None),
            other => T::from_term(other).map(Some),
        }
    }
}
