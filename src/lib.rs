//! MessagePack wire format codec.
//!
//! [`Encoder`] and [`Decoder`] work value by value; the caller drives arrays
//! and maps by writing a length header followed by the elements. The
//! [`Encodable`] / [`Decodable`] traits bundle such call sequences per type.

mod decoder;
mod encoder;
mod error;
mod fast;
mod format;
mod imp;
mod timestamp;

pub use self::{
    decoder::Decoder,
    encoder::Encoder,
    error::Error,
    fast::{Reader, Writer},
    format::TIMESTAMP_EXT,
    timestamp::Timestamp,
};
use auto_impl::auto_impl;

#[auto_impl(&, Box, Arc)]
pub trait Encodable {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error>;
}

pub trait Decodable: Sized {
    type Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error>;
}

pub fn to_vec<T>(v: &T) -> Result<Vec<u8>, Error>
where
    T: Encodable + ?Sized,
{
    let mut out = Encoder::new();
    v.encode(&mut out)?;
    Ok(out.into_bytes())
}

/// Decodes exactly one value spanning the whole input.
pub fn from_slice<T>(input: &[u8]) -> Result<T, T::Error>
where
    T: Decodable,
    T::Error: From<Error>,
{
    let mut buf = Decoder::new(input);
    let out = T::decode(&mut buf)?;
    if !buf.is_empty() {
        return Err(Error::TrailingBytes(buf.remaining()).into());
    }
    Ok(out)
}
