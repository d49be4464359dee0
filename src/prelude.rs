pub use crate::{
    bignum::BigNum,
    codec::Codec,
    config::{DecoderConfig, EncoderConfig, IntegerWidth},
    encoding::{decode_all, decode_full, encode_full, Decoder, Encoder},
    errors::Error,
    null::NullSentinel,
    rep::*,
    vecmap::VecMap,
    Export, NodeRef, ProcessId, Value,
};
pub use bytes::Bytes;
pub use num_bigint::BigInt;
pub use std::convert::TryFrom;
