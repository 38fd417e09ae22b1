use super::{error::Error, fast::Reader, format::*, timestamp::Timestamp};
use tracing::trace;

/// Reads MessagePack values back from a fully buffered message, in the order
/// they were written.
///
/// Every `get_*` call either succeeds and advances past exactly the bytes of
/// one value, or fails and leaves the cursor where it was.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoder<'a> {
    r: Reader<'a>,
}

fn invalid<T>(tag: u8, expected: &'static str) -> Result<T, Error> {
    Err(Error::InvalidTag { tag, expected })
}

fn is_positive_fixint(tag: u8) -> bool {
    tag & 0x80 == POSITIVE_FIXINT
}

fn is_negative_fixint(tag: u8) -> bool {
    tag & NEGATIVE_FIXINT == NEGATIVE_FIXINT
}

fn read_len(r: &mut Reader<'_>, width: u8) -> Result<usize, Error> {
    let n = match width {
        8 => u32::from(r.read_u8()?),
        16 => u32::from(r.read_u16()?),
        _ => r.read_u32()?,
    };
    usize::try_from(n).map_err(|_| Error::Overflow)
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Reader::new(buf),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.r.position()
    }

    pub fn remaining(&self) -> usize {
        self.r.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.r.empty()
    }

    /// Runs `f` against a copy of the cursor and only commits it on success.
    fn transact<T>(
        &mut self,
        expected: &'static str,
        f: impl FnOnce(&mut Reader<'a>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut r = self.r;
        match (f)(&mut r) {
            Ok(v) => {
                self.r = r;
                Ok(v)
            }
            Err(e) => {
                trace!(position = self.r.position(), expected, error = %e, "decode failed");
                Err(e)
            }
        }
    }

    pub fn get_array_length(&mut self) -> Result<u32, Error> {
        self.transact("array", |r| {
            Self::container_length(r, FIXARRAY, ARRAY16, ARRAY32, "array")
        })
    }

    pub fn get_map_length(&mut self) -> Result<u32, Error> {
        self.transact("map", |r| {
            Self::container_length(r, FIXMAP, MAP16, MAP32, "map")
        })
    }

    fn container_length(
        r: &mut Reader<'_>,
        fix: u8,
        tag16: u8,
        tag32: u8,
        expected: &'static str,
    ) -> Result<u32, Error> {
        let tag = r.read_u8()?;
        if tag & 0xf0 == fix {
            return Ok(u32::from(tag) & MASK4 as u32);
        }
        if tag == tag16 {
            Ok(u32::from(r.read_u16()?))
        } else if tag == tag32 {
            r.read_u32()
        } else {
            invalid(tag, expected)
        }
    }

    pub fn get_bool(&mut self) -> Result<bool, Error> {
        self.transact("bool", |r| match r.read_u8()? {
            TRUE => Ok(true),
            FALSE => Ok(false),
            tag => invalid(tag, "bool"),
        })
    }

    /// Borrows the payload of a bin value.
    pub fn get_bytes(&mut self) -> Result<&'a [u8], Error> {
        self.transact("bytes", |r| {
            let n = match r.read_u8()? {
                BIN8 => read_len(r, 8)?,
                BIN16 => read_len(r, 16)?,
                BIN32 => read_len(r, 32)?,
                tag => return invalid(tag, "bytes"),
            };
            r.read(n)
        })
    }

    pub fn get_ext_uint(&mut self) -> Result<(u8, u64), Error> {
        self.transact("ext uint", |r| {
            let tag = r.read_u8()?;
            let typ = match tag {
                FIXEXT1 | FIXEXT2 | FIXEXT4 | FIXEXT8 => r.read_u8()?,
                _ => return invalid(tag, "ext uint"),
            };
            let v = match tag {
                FIXEXT1 => u64::from(r.read_u8()?),
                FIXEXT2 => u64::from(r.read_u16()?),
                FIXEXT4 => u64::from(r.read_u32()?),
                _ => r.read_u64()?,
            };
            Ok((typ, v))
        })
    }

    pub fn get_float(&mut self) -> Result<f64, Error> {
        self.transact("float", |r| match r.read_u8()? {
            FLOAT32 => r.read_f32().map(f64::from),
            FLOAT64 => r.read_f64(),
            tag => invalid(tag, "float"),
        })
    }

    /// Accepts every integer family; unsigned values above `i64::MAX` overflow.
    pub fn get_int(&mut self) -> Result<i64, Error> {
        self.transact("int", |r| {
            Ok(match r.read_u8()? {
                tag if is_positive_fixint(tag) => i64::from(tag),
                tag if is_negative_fixint(tag) => i64::from(tag as i8),
                INT8 => i64::from(r.read_i8()?),
                INT16 => i64::from(r.read_i16()?),
                INT32 => i64::from(r.read_i32()?),
                INT64 => r.read_i64()?,
                UINT8 => i64::from(r.read_u8()?),
                UINT16 => i64::from(r.read_u16()?),
                UINT32 => i64::from(r.read_u32()?),
                UINT64 => i64::try_from(r.read_u64()?).map_err(|_| Error::Overflow)?,
                tag => return invalid(tag, "int"),
            })
        })
    }

    /// Accepts every integer family; negative values overflow.
    pub fn get_uint(&mut self) -> Result<u64, Error> {
        self.transact("uint", |r| {
            let signed = match r.read_u8()? {
                tag if is_positive_fixint(tag) => return Ok(u64::from(tag)),
                UINT8 => return Ok(u64::from(r.read_u8()?)),
                UINT16 => return Ok(u64::from(r.read_u16()?)),
                UINT32 => return Ok(u64::from(r.read_u32()?)),
                UINT64 => return r.read_u64(),
                tag if is_negative_fixint(tag) => i64::from(tag as i8),
                INT8 => i64::from(r.read_i8()?),
                INT16 => i64::from(r.read_i16()?),
                INT32 => i64::from(r.read_i32()?),
                INT64 => r.read_i64()?,
                tag => return invalid(tag, "uint"),
            };
            u64::try_from(signed).map_err(|_| Error::Overflow)
        })
    }

    /// Whether the next value is nil. Does not consume anything.
    pub fn is_nil(&self) -> Result<bool, Error> {
        Ok(self.r.peek_u8()? == NIL)
    }

    /// Consumes the next value if it is nil.
    pub fn if_nil(&mut self) -> Result<bool, Error> {
        self.transact("nil", |r| {
            if r.peek_u8()? != NIL {
                return Ok(false);
            }
            r.read_u8()?;
            Ok(true)
        })
    }

    pub fn get_nil(&mut self) -> Result<(), Error> {
        self.transact("nil", |r| match r.read_u8()? {
            NIL => Ok(()),
            tag => invalid(tag, "nil"),
        })
    }

    /// Borrows a string from the input without copying.
    pub fn get_str(&mut self) -> Result<&'a str, Error> {
        self.transact("string", |r| {
            let n = match r.read_u8()? {
                tag if tag & 0xe0 == FIXSTR => usize::from(tag) & MASK5 as usize,
                STR8 => read_len(r, 8)?,
                STR16 => read_len(r, 16)?,
                STR32 => read_len(r, 32)?,
                tag => return invalid(tag, "string"),
            };
            Ok(std::str::from_utf8(r.read(n)?)?)
        })
    }

    pub fn get_string(&mut self) -> Result<String, Error> {
        self.get_str().map(str::to_owned)
    }

    pub fn get_time(&mut self) -> Result<Timestamp, Error> {
        self.transact("timestamp", |r| {
            let tag = r.read_u8()?;
            let (seconds, nanoseconds) = match tag {
                FIXEXT4 => {
                    Self::timestamp_type(r, tag)?;
                    (i64::from(r.read_u32()?), 0)
                }
                FIXEXT8 => {
                    Self::timestamp_type(r, tag)?;
                    let data = r.read_u64()?;
                    ((data & MASK34) as i64, (data >> 34) as u32)
                }
                EXT8 => {
                    if r.read_u8()? != TIMESTAMP96_LEN {
                        return invalid(tag, "timestamp");
                    }
                    Self::timestamp_type(r, tag)?;
                    let nanoseconds = r.read_u32()?;
                    (r.read_i64()?, nanoseconds)
                }
                _ => return invalid(tag, "timestamp"),
            };
            Timestamp::new(seconds, nanoseconds).map_or_else(|| invalid(tag, "timestamp"), Ok)
        })
    }

    fn timestamp_type(r: &mut Reader<'_>, tag: u8) -> Result<(), Error> {
        if r.read_u8()? != TIMESTAMP_EXT {
            return invalid(tag, "timestamp");
        }
        Ok(())
    }
}
