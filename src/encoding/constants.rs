/// Leading byte of every stream, 0x83
pub(crate) const FORMAT_VERSION: u8 = 131;

/// Compressed envelope, 0x50
pub(crate) const COMPRESSED: u8 = 80;

/// 8 byte IEEE-754 float, 0x46
pub(crate) const NEW_FLOAT_EXT: u8 = 70;
/// `u8` integer, 0x61
pub(crate) const SMALL_INTEGER_EXT: u8 = 97;
/// `i32` integer, 0x62
pub(crate) const INTEGER_EXT: u8 = 98;
/// 31 byte ASCII float, 0x63
pub(crate) const FLOAT_EXT: u8 = 99;
/// Latin-1 atom with a `u16` length, 0x64
pub(crate) const ATOM_EXT: u8 = 100;
/// 0x65
pub(crate) const REFERENCE_EXT: u8 = 101;
/// 0x66
pub(crate) const PORT_EXT: u8 = 102;
/// 0x67
pub(crate) const PID_EXT: u8 = 103;
/// Tuple with a `u8` arity, 0x68
pub(crate) const SMALL_TUPLE_EXT: u8 = 104;
/// Tuple with a `u32` arity, 0x69
pub(crate) const LARGE_TUPLE_EXT: u8 = 105;
/// Empty list, also the proper list tail marker, 0x6a
pub(crate) const NIL_EXT: u8 = 106;
/// List of bytes with a `u16` length, 0x6b
pub(crate) const STRING_EXT: u8 = 107;
/// 0x6c
pub(crate) const LIST_EXT: u8 = 108;
/// 0x6d
pub(crate) const BINARY_EXT: u8 = 109;
/// Bignum with a `u8` digit count, 0x6e
pub(crate) const SMALL_BIG_EXT: u8 = 110;
/// Bignum with a `u32` digit count, 0x6f
pub(crate) const LARGE_BIG_EXT: u8 = 111;
/// 0x71
pub(crate) const EXPORT_EXT: u8 = 113;
/// 0x72
pub(crate) const NEW_REFERENCE_EXT: u8 = 114;
/// Latin-1 atom with a `u8` length, 0x73
pub(crate) const SMALL_ATOM_EXT: u8 = 115;
/// 0x74
pub(crate) const MAP_EXT: u8 = 116;
/// UTF-8 atom with a `u16` length, 0x76
pub(crate) const ATOM_UTF8_EXT: u8 = 118;
/// UTF-8 atom with a `u8` length, 0x77
pub(crate) const SMALL_ATOM_UTF8_EXT: u8 = 119;

pub(crate) const ATOM_NIL: &str = "nil";
pub(crate) const ATOM_NULL: &str = "null";
pub(crate) const ATOM_TRUE: &str = "true";
pub(crate) const ATOM_FALSE: &str = "false";
