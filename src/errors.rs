use failure::Fail;

#[derive(Debug, Clone, PartialEq, Eq, Fail)]
/// Everything that can go wrong while packing or unpacking a term.
///
/// Every error is fatal to the call that produced it. An [`Encoder`] that returns one
/// is poisoned until it is released, and a [`Decoder`] that returns one is invalid
/// until it is reset.
///
/// [`Encoder`]: crate::encoding::Encoder
/// [`Decoder`]: crate::encoding::Decoder
pub enum Error {
    /// The leading format-version byte was not the one this codec speaks.
    #[fail(display = "version mismatch: expected {}, found {}", expected, found)]
    VersionMismatch {
        /// The version this codec writes.
        expected: u8,
        /// The byte found in the stream.
        found: u8,
    },
    /// A read asked for more bytes than the buffer had left.
    #[fail(
        display = "tried to read {} bytes from buffer with {} remaining",
        wanted, remaining
    )]
    BufferOverrun {
        /// Number of bytes requested.
        wanted: usize,
        /// Number of bytes that were left.
        remaining: usize,
    },
    /// A list was not terminated by the nil tail marker.
    #[fail(display = "list doesn't end with a tail marker, found tag {}", found)]
    MalformedTail {
        /// The byte found where the tail marker should have been.
        found: u8,
    },
    /// The encoder does not know how to write this value.
    #[fail(display = "cannot pack value: {}", _0)]
    UnsupportedValue(String),
    /// The decoder found a tag byte it does not handle.
    #[fail(display = "unsupported term type identifier {}", _0)]
    UnsupportedTag(u8),
    /// A bignum had more than eight magnitude bytes.
    #[fail(display = "unable to handle big ints of {} bytes, at most 8 are supported", _0)]
    UnsupportedBignumWidth(usize),
    /// Nesting went deeper than the configured budget.
    #[fail(display = "maximum nesting depth of {} reached", _0)]
    DepthLimitExceeded(usize),
    /// A compressed envelope could not be inflated to its declared size.
    #[fail(display = "failed to decompress compressed term: {}", _0)]
    Decompression(String),
    /// The encoder or decoder already failed and has not been reset.
    #[fail(display = "instance is in a failed state and must be reset")]
    InstancePoisoned,
    /// A legacy ASCII float did not parse.
    #[fail(display = "invalid float encoded: {:?}", _0)]
    InvalidFloat(String),
    /// A UTF-8 atom payload was not valid UTF-8.
    #[fail(display = "invalid utf-8 atom: {}", _0)]
    InvalidAtom(String),
}

/// Results whose error is this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for [`Error::UnsupportedValue`].
    pub(crate) fn unsupported<S: Into<String>>(msg: S) -> Self { Error::UnsupportedValue(msg.into()) }
}
