//! A reusable encoder/decoder pair.
//!
//! Owning one [`Codec`] per worker keeps the encoder's buffer allocated between calls,
//! which is most of the cost of a one-shot [`encode_full`](crate::encode_full) for
//! small terms.
//!
//! ```
//! use etfpack::prelude::*;
//!
//! let mut codec = Codec::default();
//!
//! let values = vec![Value::from(1), Value::atom("two"), Value::from("three")];
//! let bytes = codec.pack_all(&values).unwrap();
//!
//! assert_eq!(codec.unpack_all(&bytes).unwrap(), values);
//! ```

use crate::{
    config::{DecoderConfig, EncoderConfig},
    encoding::{Decoder, Encoder},
    errors::Result,
    Value,
};
use bytes::Bytes;

#[derive(Debug)]
/// An [`Encoder`] and a [`Decoder`] that are reused across calls.
pub struct Codec {
    encoder: Encoder,
    decoder: Decoder,
}

impl Default for Codec {
    fn default() -> Self { Codec::new(EncoderConfig::default(), DecoderConfig::default()) }
}

impl Codec {
    /// Builds a codec. The version byte is always written, whatever `encoder` says.
    pub fn new(encoder: EncoderConfig, decoder: DecoderConfig) -> Self {
        Codec {
            encoder: Encoder::with_config(encoder.with_skip_version(false)),
            decoder: Decoder::empty_with_config(decoder),
        }
    }

    /// Packs `values` into one stream.
    ///
    /// On failure nothing is returned and the encoder is released, so the next call starts
    /// clean.
    pub fn pack_all<'a, I: IntoIterator<Item = &'a Value>>(&mut self, values: I) -> Result<Bytes> {
        match self.encoder.pack_all(values) {
            Ok(()) => Ok(self.encoder.release()),
            Err(e) => {
                self.encoder.release();
                Err(e)
            }
        }
    }

    /// Packs a single value.
    pub fn pack(&mut self, value: &Value) -> Result<Bytes> { self.pack_all(std::iter::once(value)) }

    /// Unpacks every term in `bytes`.
    pub fn unpack_all(&mut self, bytes: &[u8]) -> Result<Vec<Value>> {
        self.decoder.reset(bytes)?;
        self.decoder.unpack_all()
    }

    /// Unpacks the first term in `bytes`.
    pub fn unpack(&mut self, bytes: &[u8]) -> Result<Value> {
        self.decoder.reset(bytes)?;
        self.decoder.unpack()
    }
}
