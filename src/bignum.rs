//! Bignums with an eight byte magnitude cap.
//!
//! ETF bignums are a sign byte followed by little-endian base-256 digits. This crate
//! only handles magnitudes that fit in a `u64`. Values that fit in an `i64` are kept
//! native, everything else is rendered as a signed decimal string so no precision is
//! lost; [`BigNum::to_bigint`] turns either form into a [`BigInt`] for hosts that want
//! real arbitrary precision arithmetic.

use crate::{
    errors::{Error, Result},
    from_fn,
    util::u64_to_digits,
};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use smallvec::SmallVec;
use std::{convert::TryFrom, fmt, str::FromStr};

/// The most magnitude bytes a bignum may carry.
pub const MAX_DIGITS: usize = 8;

const TOP_BIT: u64 = 1 << 63;

/// `BigNum`s are either `i64`s or decimal strings with an explicit sign.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
pub enum BigNum {
    /// Fits in a signed 64-bit integer.
    I64(i64),
    /// Does not fit in an `i64`, e.g. `"-9223372036854775808"` decoded from a bignum.
    Decimal(String),
}

use BigNum::*;

from_fn!(BigNum, i64, I64);
from_fn!(BigNum, i32, |i| I64(i64::from(i)));
from_fn!(BigNum, u32, |u| I64(i64::from(u)));
from_fn!(BigNum, u64, |u| BigNum::from_sign_magnitude(false, u));
from_fn!(BigNum, BigInt, |i: BigInt| {
    i.to_i64().map_or_else(|| Decimal(i.to_string()), I64)
});

impl TryFrom<BigNum> for i64 {
    type Error = BigNum;

    fn try_from(n: BigNum) -> std::result::Result<Self, BigNum> {
        match n {
            I64(i) => Ok(i),
            Decimal(_) => Err(n),
        }
    }
}

impl BigNum {
    /// Builds a `BigNum` from the sign flag and magnitude of a decoded bignum.
    ///
    /// Non-negative magnitudes and negative magnitudes with a clear top bit are
    /// representable as `i64`. A set top bit falls back to the decimal form.
    ///
    /// # Example
    ///
    /// ```
    /// use etfpack::bignum::BigNum;
    ///
    /// assert_eq!(BigNum::from_sign_magnitude(true, 5), BigNum::I64(-5));
    /// assert_eq!(
    ///     BigNum::from_sign_magnitude(true, 1 << 63),
    ///     BigNum::Decimal("-9223372036854775808".to_string())
    /// );
    /// ```
    pub fn from_sign_magnitude(negative: bool, magnitude: u64) -> BigNum {
        if magnitude & TOP_BIT == 0 {
            let i = magnitude as i64;
            I64(if negative { -i } else { i })
        } else if negative {
            Decimal(format!("-{}", magnitude))
        } else {
            Decimal(magnitude.to_string())
        }
    }

    /// Splits `self` into a sign flag (`true` for negative) and a `u64` magnitude.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::UnsupportedBignumWidth`] if the magnitude needs more than
    /// eight bytes, and with [`Error::UnsupportedValue`] if a decimal isn't a number.
    pub fn to_sign_magnitude(&self) -> Result<(bool, u64)> {
        match self {
            I64(i) => Ok((*i < 0, i.unsigned_abs())),
            Decimal(s) => {
                let big = BigInt::from_str(s)
                    .map_err(|e| Error::unsupported(format!("bad decimal {:?}: {}", s, e)))?;
                let (sign, digits) = big.to_bytes_le();
                if digits.len() > MAX_DIGITS {
                    return Err(Error::UnsupportedBignumWidth(digits.len()));
                }
                let magnitude = crate::util::digits_to_u64(&digits);
                Ok((sign == Sign::Minus && magnitude != 0, magnitude))
            }
        }
    }

    /// The little-endian magnitude digits of `self`, along with its sign.
    pub fn to_digits(&self) -> Result<(bool, SmallVec<[u8; 8]>)> {
        let (negative, magnitude) = self.to_sign_magnitude()?;
        Ok((negative, u64_to_digits(magnitude)))
    }

    /// Converts `self` to an arbitrary precision integer.
    ///
    /// Returns `None` only for a [`BigNum::Decimal`] that is not a number.
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            I64(i) => Some(BigInt::from(*i)),
            Decimal(s) => BigInt::from_str(s).ok(),
        }
    }

    /// Produces an `i64` if `self` is an `I64`, otherwise returns `None`.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            I64(i) => Some(*i),
            Decimal(_) => None,
        }
    }
}

impl fmt::Display for BigNum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            I64(i) => write!(f, "{}", i),
            Decimal(s) => f.write_str(s),
        }
    }
}
