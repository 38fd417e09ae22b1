use super::{
    decoder::Decoder, encoder::Encoder, error::Error, timestamp::Timestamp, Decodable, Encodable,
};
use bytes::Bytes;
use std::{any::Any, collections::BTreeMap, time::SystemTime};

fn array_len(len: usize) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| Error::TooLong { kind: "array", len })
}

impl Encodable for bool {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_bool(*self);
        Ok(())
    }
}

impl Decodable for bool {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        buf.get_bool()
    }
}

macro_rules! impl_uint {
    ($($t:ty),+) => {
        $(
            impl Encodable for $t {
                fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
                    out.put_uint((*self).into());
                    Ok(())
                }
            }

            impl Decodable for $t {
                type Error = Error;

                fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
                    let mut attempt = buf.clone();
                    let v = <$t>::try_from(attempt.get_uint()?).map_err(|_| Error::Overflow)?;
                    *buf = attempt;
                    Ok(v)
                }
            }
        )+
    };
}

macro_rules! impl_int {
    ($($t:ty),+) => {
        $(
            impl Encodable for $t {
                fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
                    out.put_int((*self).into());
                    Ok(())
                }
            }

            impl Decodable for $t {
                type Error = Error;

                fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
                    let mut attempt = buf.clone();
                    let v = <$t>::try_from(attempt.get_int()?).map_err(|_| Error::Overflow)?;
                    *buf = attempt;
                    Ok(v)
                }
            }
        )+
    };
}

impl_uint!(u8, u16, u32, u64);
impl_int!(i8, i16, i32, i64);

impl Encodable for f32 {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_float32(*self);
        Ok(())
    }
}

impl Decodable for f32 {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        let mut attempt = buf.clone();
        let v = attempt.get_float()?;
        let narrowed = v as f32;
        if f64::from(narrowed) != v && !v.is_nan() {
            return Err(Error::Overflow);
        }
        *buf = attempt;
        Ok(narrowed)
    }
}

impl Encodable for f64 {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_float(*self);
        Ok(())
    }
}

impl Decodable for f64 {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        buf.get_float()
    }
}

impl Encodable for str {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_string(self)
    }
}

impl Encodable for String {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_string(self)
    }
}

impl Decodable for String {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        buf.get_string()
    }
}

impl Encodable for [u8] {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_bytes(self)
    }
}

impl Encodable for Bytes {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_bytes(self)
    }
}

impl Decodable for Bytes {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        Ok(Bytes::copy_from_slice(buf.get_bytes()?))
    }
}

impl<const LEN: usize> Encodable for [u8; LEN] {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_bytes(self)
    }
}

impl<const LEN: usize> Decodable for [u8; LEN] {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        let mut attempt = buf.clone();
        let data = attempt.get_bytes()?;
        if data.len() != LEN {
            return Err(Error::Overflow);
        }
        let mut v = [0; LEN];
        v.copy_from_slice(data);
        *buf = attempt;
        Ok(v)
    }
}

impl<T> Encodable for Option<T>
where
    T: Encodable,
{
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        match self {
            Some(v) => v.encode(out),
            None => {
                out.put_nil();
                Ok(())
            }
        }
    }
}

impl<T> Decodable for Option<T>
where
    T: Decodable,
    T::Error: From<Error>,
{
    type Error = T::Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        Ok(if buf.if_nil()? {
            None
        } else {
            Some(T::decode(buf)?)
        })
    }
}

impl<T> Encodable for Vec<T>
where
    T: Encodable + 'static,
{
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        if let Some(s) = <dyn Any>::downcast_ref::<Vec<u8>>(self) {
            return out.put_bytes(s);
        }
        out.put_array_length(array_len(self.len())?);
        for item in self {
            item.encode(out)?;
        }
        Ok(())
    }
}

impl<T> Decodable for Vec<T>
where
    T: Decodable + 'static,
    T::Error: From<Error>,
{
    type Error = T::Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        let mut attempt = buf.clone();
        let mut v = Vec::<T>::new();
        if let Some(out) = <dyn Any>::downcast_mut::<Vec<u8>>(&mut v) {
            out.extend_from_slice(attempt.get_bytes()?);
        } else {
            let len = usize::try_from(attempt.get_array_length()?).map_err(|_| Error::Overflow)?;

            // every element takes at least one byte
            v.reserve_exact(len.min(attempt.remaining()));
            for _ in 0..len {
                v.push(T::decode(&mut attempt)?);
            }
        }

        *buf = attempt;
        Ok(v)
    }
}

impl<T, const LEN: usize> Encodable for arrayvec::ArrayVec<T, LEN>
where
    T: Encodable + 'static,
{
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        if let Some(s) = <dyn Any>::downcast_ref::<arrayvec::ArrayVec<u8, LEN>>(self) {
            return out.put_bytes(s);
        }
        out.put_array_length(array_len(self.len())?);
        for item in self {
            item.encode(out)?;
        }
        Ok(())
    }
}

impl<T, const LEN: usize> Decodable for arrayvec::ArrayVec<T, LEN>
where
    T: Decodable + 'static,
    T::Error: From<Error>,
{
    type Error = T::Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        let mut attempt = buf.clone();
        let mut v = Self::new();
        if let Some(out) = <dyn Any>::downcast_mut::<arrayvec::ArrayVec<u8, LEN>>(&mut v) {
            out.try_extend_from_slice(attempt.get_bytes()?)
                .map_err(|_| Error::Overflow)?;
        } else {
            let len = attempt.get_array_length()?;

            for _ in 0..len {
                v.try_push(T::decode(&mut attempt)?)
                    .map_err(|_| Error::Overflow)?;
            }
        }

        *buf = attempt;
        Ok(v)
    }
}

impl<K, V> Encodable for BTreeMap<K, V>
where
    K: Encodable,
    V: Encodable,
{
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_map_length(array_len(self.len())?);
        for (k, v) in self {
            k.encode(out)?;
            v.encode(out)?;
        }
        Ok(())
    }
}

impl<K, V, E> Decodable for BTreeMap<K, V>
where
    K: Decodable<Error = E> + Ord,
    V: Decodable<Error = E>,
    E: From<Error>,
{
    type Error = E;

    /// Fails with `Error::DuplicateKey` if a key repeats, so the decoded map
    /// always holds as many entries as the header declares.
    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        let mut attempt = buf.clone();
        let len = attempt.get_map_length()?;
        let mut m = BTreeMap::new();
        for _ in 0..len {
            let k = K::decode(&mut attempt)?;
            let v = V::decode(&mut attempt)?;
            if m.insert(k, v).is_some() {
                return Err(Error::DuplicateKey.into());
            }
        }
        *buf = attempt;
        Ok(m)
    }
}

impl Encodable for Timestamp {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_time(*self);
        Ok(())
    }
}

impl Decodable for Timestamp {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        buf.get_time()
    }
}

impl Encodable for SystemTime {
    fn encode(&self, out: &mut Encoder) -> Result<(), Error> {
        out.put_time(Timestamp::try_from(*self)?);
        Ok(())
    }
}

impl Decodable for SystemTime {
    type Error = Error;

    fn decode(buf: &mut Decoder<'_>) -> Result<Self, Self::Error> {
        let mut attempt = buf.clone();
        let v = SystemTime::try_from(attempt.get_time()?)?;
        *buf = attempt;
        Ok(v)
    }
}

#[macro_export]
macro_rules! impl_codec_for_wrapper {
    ($wrapper:ty, $base:ty) => {
        impl $crate::Encodable for $wrapper {
            fn encode(&self, out: &mut $crate::Encoder) -> Result<(), $crate::Error> {
                $crate::Encodable::encode(&self.0, out)
            }
        }

        impl $crate::Decodable for $wrapper {
            type Error = <$base as $crate::Decodable>::Error;

            fn decode(buf: &mut $crate::Decoder<'_>) -> Result<Self, Self::Error> {
                <$base as $crate::Decodable>::decode(buf).map(<$wrapper>::from)
            }
        }
    };
}
