//! Knobs for [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder).
//!
//! ```
//! use etfpack::prelude::*;
//!
//! let config = EncoderConfig::default()
//!     .with_integer_width(IntegerWidth::W32)
//!     .with_max_depth(16);
//!
//! let mut enc = Encoder::with_config(config);
//! enc.pack(&Value::from(-1)).unwrap();
//!
//! // version, INTEGER_EXT, four bytes
//! assert_eq!(enc.release().len(), 6);
//! ```

use crate::null::NullSentinel;

/// Default nesting budget for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default size of a fresh encoder buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1 << 20;

/// Default cap on the declared size of a compressed envelope.
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 64 << 20;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The native integer width the encoder writes integers outside `[0, 255]` with.
pub enum IntegerWidth {
    /// 32-bit hosts: `i32` values use INTEGER_EXT, wider ones a small bignum.
    W32,
    /// 64-bit hosts: every integer outside `[0, 255]` uses a small bignum.
    W64,
}

impl Default for IntegerWidth {
    fn default() -> Self { IntegerWidth::W64 }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Encoder settings.
pub struct EncoderConfig {
    /// Don't write the version byte at the start of the buffer.
    pub skip_version:     bool,
    /// Bytes reserved up front.
    pub initial_capacity: usize,
    /// Default depth budget for [`Encoder::pack`](crate::Encoder::pack).
    pub max_depth:        usize,
    /// See [`IntegerWidth`].
    pub integer_width:    IntegerWidth,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            skip_version:     false,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_depth:        DEFAULT_MAX_DEPTH,
            integer_width:    IntegerWidth::default(),
        }
    }
}

impl EncoderConfig {
    /// Sets `skip_version`.
    pub fn with_skip_version(mut self, skip_version: bool) -> Self {
        self.skip_version = skip_version;
        self
    }

    /// Sets `initial_capacity`.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets `integer_width`.
    pub fn with_integer_width(mut self, integer_width: IntegerWidth) -> Self {
        self.integer_width = integer_width;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoder settings.
pub struct DecoderConfig {
    /// Sentinel attached to every decoded `null` atom.
    pub null: NullSentinel,
    /// How deep terms may nest before decoding fails.
    pub max_depth: usize,
    /// Largest uncompressed size a compressed envelope may declare.
    pub max_decompressed_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            null: NullSentinel::shared(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
        }
    }
}

impl DecoderConfig {
    /// Sets the null sentinel.
    pub fn with_null(mut self, null: NullSentinel) -> Self {
        self.null = null;
        self
    }

    /// Sets `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets `max_decompressed_size`.
    pub fn with_max_decompressed_size(mut self, max_decompressed_size: usize) -> Self {
        self.max_decompressed_size = max_decompressed_size;
        self
    }
}
