//! # ETF encoder and decoder
//!
//! [`Encoder`] and [`Decoder`] are reusable and hold their own buffers. The functions
//! here are one-shot shorthands that build a fresh one per call.
//!
//! # Example
//!
//! ```
//! use etfpack::prelude::*;
//!
//! let mut m = VecMap::new();
//! m.push(Value::atom("id"), Value::from(42));
//! m.push(Value::atom("tags"), Value::from(vec!["a", "b"]));
//! let v = Value::Mapping(m);
//!
//! // one-shot
//! let full = encode_full(&v).unwrap();
//!
//! // the long way round
//! let mut enc = Encoder::new(false);
//! enc.pack(&v).unwrap();
//!
//! // are equivalent
//! assert_eq!(enc.release(), full);
//!
//! assert_eq!(decode_full(&full).unwrap(), v);
//! ```

use crate::{errors::Result, Value};
use bytes::Bytes;

pub mod buffer;
pub mod compressed;
mod constants;
pub mod de;
pub use de::*;
pub mod ser;
pub use ser::*;

/// Encodes `value` into a fresh version-prefixed stream.
///
/// Uses a small initial buffer rather than the encoder default, since the encoder is
/// thrown away afterwards.
///
/// # Errors
///
/// See [`Encoder::pack_with_budget`].
pub fn encode_full(value: &Value) -> Result<Bytes> {
    let config = crate::config::EncoderConfig::default().with_initial_capacity(64);
    let mut enc = Encoder::with_config(config);
    enc.pack(value)?;
    Ok(enc.release())
}

/// Decodes the first term of a version-prefixed stream.
///
/// Anything after the first term is ignored.
///
/// # Example
///
/// ```
/// use etfpack::prelude::*;
///
/// assert_eq!(decode_full(&[131, 97, 1, 97, 2]).unwrap(), Value::from(1));
/// ```
pub fn decode_full(bytes: &[u8]) -> Result<Value> { Decoder::new(bytes, None)?.unpack() }

/// Decodes every term of a version-prefixed stream.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<Value>> { Decoder::new(bytes, None)?.unpack_all() }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{null::NullSentinel, vecmap::VecMap};

    fn round_trip(v: Value) {
        let enc = encode_full(&v).unwrap();
        assert_eq!(decode_full(&enc).unwrap(), v, "bytes: {:?}", enc);
    }

    #[test]
    fn scalars() {
        round_trip(Value::Nil);
        round_trip(Value::Boolean(true));
        round_trip(Value::Boolean(false));
        round_trip(Value::from(0));
        round_trip(Value::from(255));
        round_trip(Value::from(256));
        round_trip(Value::from(-1));
        round_trip(Value::from(i64::max_value()));
        round_trip(Value::from(i64::min_value() + 1));
        round_trip(Value::Float(std::f64::consts::PI));
        round_trip(Value::Float(std::f64::NAN));
        round_trip(Value::atom("hello"));
        round_trip(Value::from("binary"));
        round_trip(Value::from(u64::max_value()));
    }

    #[test]
    fn null_uses_the_shared_sentinel() {
        round_trip(Value::null());

        let mine = Value::Null(NullSentinel::new("mine"));
        let back = decode_full(&encode_full(&mine).unwrap()).unwrap();
        assert_ne!(back, mine);
        assert!(back.is_null());
    }

    #[test]
    fn containers() {
        let mut m = VecMap::new();
        m.push(Value::from(1.5), Value::Nil);
        m.push(Value::from(vec![1, 2]), Value::atom("x"));
        round_trip(Value::Mapping(m));

        round_trip(Value::Sequence(vec![]));
        round_trip(Value::from(vec![Value::from(vec![Value::Sequence(vec![])])]));
    }

    #[test]
    fn min_i64_widens() {
        // the magnitude has its top bit set, so it comes back as a decimal
        let enc = encode_full(&Value::from(i64::min_value())).unwrap();
        assert_eq!(
            decode_full(&enc).unwrap(),
            Value::BigInt(crate::bignum::BigNum::Decimal(i64::min_value().to_string()))
        );
    }

    #[test]
    fn decode_all_reads_everything() {
        assert_eq!(
            decode_all(&[131, 97, 1, 97, 2]).unwrap(),
            vec![Value::from(1), Value::from(2)]
        );
        assert_eq!(decode_all(&[131]).unwrap(), Vec::<Value>::new());
    }
}
