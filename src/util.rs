use smallvec::SmallVec;

/// Converts a `u64` to the smallest possible vec of digits in little-endian order.
///
/// Zero has no digits, which is how ETF bignums spell it.
///
/// # Arguments
///
/// * `num: u64` - The integer to be converted.
///
/// # Example
///
/// ```
/// use etfpack::util::u64_to_digits;
///
/// let some_vec = u64_to_digits(258);
///
/// // least significant byte first
/// assert_eq!(&some_vec[..], &[2, 1]);
///
/// assert!(u64_to_digits(0).is_empty());
/// ```
pub fn u64_to_digits(num: u64) -> SmallVec<[u8; 8]> {
    let len = 8 - u64::leading_zeros(num) as usize / 8;
    let mut out = SmallVec::from_buf(u64::to_le_bytes(num));
    out.truncate(len);
    out
}

/// Accumulates little-endian base-256 digits into a `u64`.
///
/// Callers are responsible for capping `digits` at 8 bytes.
pub fn digits_to_u64(digits: &[u8]) -> u64 {
    debug_assert!(digits.len() <= 8);
    digits
        .iter()
        .rev()
        .fold(0u64, |acc, &d| (acc << 8) | u64::from(d))
}

#[macro_export]
/// Helper macro to compose `From` implementations.
macro_rules! compose_from {
    ($to:tt, $mid:tt, $from:ty) => {
        impl From<$from> for $to {
            fn from(f: $from) -> Self { Self::from($mid::from(f)) }
        }
    };
}

#[macro_export]
/// Helper macro to make implementing `From` easier.
macro_rules! from_fn {
    ($to:ty, $from:ty, $fn:expr) => {
        impl From<$from> for $to {
            fn from(f: $from) -> $to { $fn(f) }
        }
    };
}

#[macro_export]
/// Helper macro to make implementing `From` easier.
macro_rules! from_as {
    ($to:tt, $from:ty, $as:ty) => {
        impl From<$from> for $to {
            fn from(f: $from) -> $to { $to::from(f as $as) }
        }
    };
}
