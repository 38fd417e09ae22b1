//! Wire constants of the MessagePack format.

pub(crate) const MASK4: u64 = 0x0f;
pub(crate) const MASK5: u64 = 0x1f;
pub(crate) const MASK6: u64 = 0x3f;
pub(crate) const MASK7: u64 = 0x7f;
pub(crate) const MASK8: u64 = 0xff;
pub(crate) const MASK16: u64 = 0xffff;
pub(crate) const MASK32: u64 = 0xffff_ffff;
pub(crate) const MASK34: u64 = 0x03_ffff_ffff;

pub(crate) const INT_FIX_MIN: i64 = -((MASK6 >> 1) as i64) - 1;
pub(crate) const INT_FIX_MAX: i64 = (MASK8 >> 1) as i64;
pub(crate) const INT8_MIN: i64 = -((MASK8 >> 1) as i64) - 1;
pub(crate) const INT8_MAX: i64 = (MASK8 >> 1) as i64;
pub(crate) const INT16_MIN: i64 = -((MASK16 >> 1) as i64) - 1;
pub(crate) const INT16_MAX: i64 = (MASK16 >> 1) as i64;
pub(crate) const INT32_MIN: i64 = -((MASK32 >> 1) as i64) - 1;
pub(crate) const INT32_MAX: i64 = (MASK32 >> 1) as i64;

pub(crate) const POSITIVE_FIXINT: u8 = 0x00;
pub(crate) const FIXMAP: u8 = 0x80;
pub(crate) const FIXARRAY: u8 = 0x90;
pub(crate) const FIXSTR: u8 = 0xa0;
pub(crate) const NIL: u8 = 0xc0;
pub(crate) const FALSE: u8 = 0xc2;
pub(crate) const TRUE: u8 = 0xc3;
pub(crate) const BIN8: u8 = 0xc4;
pub(crate) const BIN16: u8 = 0xc5;
pub(crate) const BIN32: u8 = 0xc6;
pub(crate) const EXT8: u8 = 0xc7;
pub(crate) const FLOAT32: u8 = 0xca;
pub(crate) const FLOAT64: u8 = 0xcb;
pub(crate) const UINT8: u8 = 0xcc;
pub(crate) const UINT16: u8 = 0xcd;
pub(crate) const UINT32: u8 = 0xce;
pub(crate) const UINT64: u8 = 0xcf;
pub(crate) const INT8: u8 = 0xd0;
pub(crate) const INT16: u8 = 0xd1;
pub(crate) const INT32: u8 = 0xd2;
pub(crate) const INT64: u8 = 0xd3;
pub(crate) const FIXEXT1: u8 = 0xd4;
pub(crate) const FIXEXT2: u8 = 0xd5;
pub(crate) const FIXEXT4: u8 = 0xd6;
pub(crate) const FIXEXT8: u8 = 0xd7;
pub(crate) const STR8: u8 = 0xd9;
pub(crate) const STR16: u8 = 0xda;
pub(crate) const STR32: u8 = 0xdb;
pub(crate) const ARRAY16: u8 = 0xdc;
pub(crate) const ARRAY32: u8 = 0xdd;
pub(crate) const MAP16: u8 = 0xde;
pub(crate) const MAP32: u8 = 0xdf;
pub(crate) const NEGATIVE_FIXINT: u8 = 0xe0;

/// Extension type code reserved for timestamps.
pub const TIMESTAMP_EXT: u8 = 0xff;
pub(crate) const TIMESTAMP96_LEN: u8 = 12;

/// Number of low mantissa bits a double loses when narrowed to single precision.
pub(crate) const F32_DROPPED_MANTISSA_BITS: u32 = 29;

pub(crate) const NANOS_PER_SEC: u32 = 1_000_000_000;
