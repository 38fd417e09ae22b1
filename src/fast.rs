use super::error::Error;
use derive_more::Deref;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reader<'a> {
    buf: &'a [u8],
    offset: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Deref)]
#[deref(forward)]
pub struct Writer {
    buf: Vec<u8>,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// View the next n bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8], Error> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::Truncated {
                missing: n - remaining,
                remaining,
            });
        }

        Ok(&self.buf[self.offset..self.offset + n])
    }

    /// Read n bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let res = self.peek(n)?;
        self.offset += n;

        Ok(res)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut v = [0; N];
        v.copy_from_slice(self.read(N)?);
        Ok(v)
    }

    pub fn peek_u8(&self) -> Result<u8, Error> {
        Ok(self.peek(1)?[0])
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.read_array().map(u64::from_be_bytes)
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        self.read_array().map(i8::from_be_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.read_array().map(i16::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.read_array().map(i32::from_be_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.read_array().map(i64::from_be_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_array().map(f32::from_be_bytes)
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_array().map(f64::from_be_bytes)
    }

    /// Position of the internal cursor.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Number of bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Whether the whole buffer is consumed.
    pub fn empty(&self) -> bool {
        self.buf.len() == self.offset
    }
}

impl Writer {
    pub fn new(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    pub fn write(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_i8(&mut self, v: i8) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_i16(&mut self, v: i16) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_i64(&mut self, v: i64) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_f32(&mut self, v: f32) {
        self.write(&v.to_be_bytes())
    }

    pub fn write_f64(&mut self, v: f64) {
        self.write(&v.to_be_bytes())
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const N: usize = 100;
    const BB: &[u8] = &hex!("0000FF0900");

    #[test]
    fn writer_reader() {
        let mut w = Writer::new(Vec::with_capacity(N / 2));
        for i in 0..N {
            w.write_u8(i as u8);
        }
        assert_eq!(N, w.len());
        w.write(BB);
        assert_eq!(N + BB.len(), w.len());

        let mut r = Reader::new(&w);
        assert_eq!(N + BB.len(), r.remaining());
        assert!(!r.empty());
        for exp in 0..N {
            let got = r.read_u8().unwrap();
            assert_eq!(exp as u8, got);
        }
        assert_eq!(N, r.position());
        let got = r.read(BB.len()).unwrap();
        assert_eq!(BB, got);
        assert!(r.empty());
    }

    #[test]
    fn big_endian() {
        let mut w = Writer::default();
        w.write_u16(0x0102);
        w.write_u32(0x0304_0506);
        w.write_u64(0x0708_090a_0b0c_0d0e);
        w.write_i16(-2);
        w.write_f32(85.125);
        w.write_f64(85.3);
        assert_eq!(
            &*w,
            hex!("0102 03040506 0708090a0b0c0d0e fffe 42aa4000 4055533333333333")
        );

        let mut r = Reader::new(&w);
        assert_eq!(r.read_u16(), Ok(0x0102));
        assert_eq!(r.read_u32(), Ok(0x0304_0506));
        assert_eq!(r.read_u64(), Ok(0x0708_090a_0b0c_0d0e));
        assert_eq!(r.read_i16(), Ok(-2));
        assert_eq!(r.read_f32(), Ok(85.125));
        assert_eq!(r.read_f64(), Ok(85.3));
        assert!(r.empty());
    }

    #[test]
    fn peek_does_not_consume() {
        let r = Reader::new(&[0xc0, 0x01]);
        assert_eq!(r.peek_u8(), Ok(0xc0));
        assert_eq!(r.peek(2), Ok(&[0xc0, 0x01][..]));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn truncated() {
        let mut r = Reader::new(&[0x01, 0x02, 0x03]);
        assert_eq!(r.read_u8(), Ok(0x01));
        assert_eq!(
            r.read_u32(),
            Err(Error::Truncated {
                missing: 2,
                remaining: 2
            })
        );
        // failed read leaves the cursor untouched
        assert_eq!(r.position(), 1);
        assert_eq!(r.read_u16(), Ok(0x0203));
        assert_eq!(
            r.peek_u8(),
            Err(Error::Truncated {
                missing: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn clear() {
        let mut w = Writer::default();
        w.write(BB);
        w.clear();
        assert!(w.is_empty());
        w.write_u8(0xc0);
        assert_eq!(w.into_inner(), vec![0xc0]);
    }
}
