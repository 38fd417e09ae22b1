use super::{error::Error, fast::Writer, format::*, timestamp::Timestamp};
use derive_more::Deref;
use tracing::debug;

/// Appends MessagePack values to an in-memory buffer, always picking the most
/// compact representation that round-trips exactly.
///
/// Arrays and maps are written as headers only; the caller follows them with
/// the encoded elements.
#[derive(Clone, Debug, Default, PartialEq, Deref)]
#[deref(forward)]
pub struct Encoder {
    w: Writer,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            w: Writer::new(Vec::with_capacity(capacity)),
        }
    }

    /// Encoded bytes accumulated so far.
    pub fn bytes(&self) -> &[u8] {
        &self.w
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.w.into_inner()
    }

    pub fn clear(&mut self) {
        self.w.clear()
    }

    /// Space separated hex dump of at most `max_len` bytes.
    pub fn to_hex(&self, max_len: Option<usize>) -> String {
        let n = max_len.map_or(self.w.len(), |max| max.min(self.w.len()));
        let mut s = String::with_capacity(n * 3);
        for (i, b) in self.w[..n].iter().enumerate() {
            if i > 0 {
                s.push(' ');
            }
            s.push_str(&format!("{b:02x}"));
        }
        s
    }

    pub fn put_array_length(&mut self, v: u32) {
        self.put_container_length(FIXARRAY, ARRAY16, ARRAY32, v)
    }

    pub fn put_map_length(&mut self, v: u32) {
        self.put_container_length(FIXMAP, MAP16, MAP32, v)
    }

    fn put_container_length(&mut self, fix: u8, tag16: u8, tag32: u8, v: u32) {
        let n = u64::from(v);
        if n <= MASK4 {
            self.w.write_u8(fix | v as u8);
        } else if n <= MASK16 {
            self.w.write_u8(tag16);
            self.w.write_u16(v as u16);
        } else {
            self.w.write_u8(tag32);
            self.w.write_u32(v);
        }
    }

    pub fn put_bool(&mut self, v: bool) {
        self.w.write_u8(if v { TRUE } else { FALSE })
    }

    pub fn put_nil(&mut self) {
        self.w.write_u8(NIL)
    }

    /// Writes a byte slice using the bin family.
    pub fn put_bytes(&mut self, v: &[u8]) -> Result<(), Error> {
        let n = len_u64("byte slice", v.len())?;
        if n <= MASK8 {
            self.w.write_u8(BIN8);
            self.w.write_u8(n as u8);
        } else if n <= MASK16 {
            self.w.write_u8(BIN16);
            self.w.write_u16(n as u16);
        } else {
            self.w.write_u8(BIN32);
            self.w.write_u32(n as u32);
        }
        self.w.write(v);
        Ok(())
    }

    pub fn put_string(&mut self, v: &str) -> Result<(), Error> {
        let n = len_u64("string", v.len())?;
        if n <= MASK5 {
            self.w.write_u8(FIXSTR | n as u8);
        } else if n <= MASK8 {
            self.w.write_u8(STR8);
            self.w.write_u8(n as u8);
        } else if n <= MASK16 {
            self.w.write_u8(STR16);
            self.w.write_u16(n as u16);
        } else {
            self.w.write_u8(STR32);
            self.w.write_u32(n as u32);
        }
        self.w.write(v.as_bytes());
        Ok(())
    }

    /// Appends already encoded bytes verbatim.
    pub fn put_raw(&mut self, v: &[u8]) {
        self.w.write(v)
    }

    pub fn put_ext_uint(&mut self, typ: u8, v: u64) {
        if v <= MASK8 {
            self.w.write_u8(FIXEXT1);
            self.w.write_u8(typ);
            self.w.write_u8(v as u8);
        } else if v <= MASK16 {
            self.w.write_u8(FIXEXT2);
            self.w.write_u8(typ);
            self.w.write_u16(v as u16);
        } else if v <= MASK32 {
            self.w.write_u8(FIXEXT4);
            self.w.write_u8(typ);
            self.w.write_u32(v as u32);
        } else {
            self.w.write_u8(FIXEXT8);
            self.w.write_u8(typ);
            self.w.write_u64(v);
        }
    }

    /// Writes a float as single precision whenever that is lossless.
    pub fn put_float(&mut self, v: f64) {
        if fits_f32(v) {
            self.put_float32(v as f32)
        } else {
            self.put_float64(v)
        }
    }

    pub fn put_float32(&mut self, v: f32) {
        self.w.write_u8(FLOAT32);
        self.w.write_f32(v);
    }

    pub fn put_float64(&mut self, v: f64) {
        self.w.write_u8(FLOAT64);
        self.w.write_f64(v);
    }

    pub fn put_int(&mut self, v: i64) {
        if (INT_FIX_MIN..=INT_FIX_MAX).contains(&v) {
            self.w.write_i8(v as i8);
        } else if (INT8_MIN..=INT8_MAX).contains(&v) {
            self.w.write_u8(INT8);
            self.w.write_i8(v as i8);
        } else if (INT16_MIN..=INT16_MAX).contains(&v) {
            self.w.write_u8(INT16);
            self.w.write_i16(v as i16);
        } else if (INT32_MIN..=INT32_MAX).contains(&v) {
            self.w.write_u8(INT32);
            self.w.write_i32(v as i32);
        } else {
            self.w.write_u8(INT64);
            self.w.write_i64(v);
        }
    }

    pub fn put_uint(&mut self, v: u64) {
        if v <= MASK7 {
            self.w.write_u8(v as u8);
        } else if v <= MASK8 {
            self.w.write_u8(UINT8);
            self.w.write_u8(v as u8);
        } else if v <= MASK16 {
            self.w.write_u8(UINT16);
            self.w.write_u16(v as u16);
        } else if v <= MASK32 {
            self.w.write_u8(UINT32);
            self.w.write_u32(v as u32);
        } else {
            self.w.write_u8(UINT64);
            self.w.write_u64(v);
        }
    }

    pub fn put_time(&mut self, v: impl Into<Timestamp>) {
        let t = v.into();
        let (sec, nsec) = (t.seconds(), t.nanoseconds());
        if sec < 0 || (sec as u64) > MASK34 {
            self.w.write_u8(EXT8);
            self.w.write_u8(TIMESTAMP96_LEN);
            self.w.write_u8(TIMESTAMP_EXT);
            self.w.write_u32(nsec);
            self.w.write_i64(sec);
        } else if (sec as u64) > MASK32 || nsec > 0 {
            self.w.write_u8(FIXEXT8);
            self.w.write_u8(TIMESTAMP_EXT);
            self.w.write_u64((u64::from(nsec) << 34) | sec as u64);
        } else {
            self.w.write_u8(FIXEXT4);
            self.w.write_u8(TIMESTAMP_EXT);
            self.w.write_u32(sec as u32);
        }
    }
}

fn len_u64(kind: &'static str, len: usize) -> Result<u64, Error> {
    match u64::try_from(len) {
        Ok(n) if n <= MASK32 => Ok(n),
        _ => {
            debug!(kind, len, "value too long to encode");
            Err(Error::TooLong { kind, len })
        }
    }
}

/// Whether `v` survives a round trip through single precision. Zero of either
/// sign does and is sent as float32, although its exponent lies outside the
/// normal range an exponent-only check would accept. Otherwise the exponent
/// must be a normal single precision exponent and the mantissa bits single
/// precision drops must all be clear.
fn fits_f32(v: f64) -> bool {
    if v == 0.0 {
        return true;
    }
    let bits = v.to_bits();
    let exp = ((bits >> 52) & 0x7ff) as i64 - 1023;
    if !(-126..=127).contains(&exp) {
        return false;
    }
    bits & ((1 << F32_DROPPED_MANTISSA_BITS) - 1) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn encoded(f: impl FnOnce(&mut Encoder)) -> Vec<u8> {
        let mut e = Encoder::new();
        (f)(&mut e);
        e.into_bytes()
    }

    #[test]
    fn uint_size_classes() {
        for (v, expected) in [
            (0_u64, &hex!("00")[..]),
            (127, &hex!("7f")[..]),
            (128, &hex!("cc 80")[..]),
            (255, &hex!("cc ff")[..]),
            (256, &hex!("cd 0100")[..]),
            (65535, &hex!("cd ffff")[..]),
            (65536, &hex!("ce 00010000")[..]),
            (4294967295, &hex!("ce ffffffff")[..]),
            (4294967296, &hex!("cf 0000000100000000")[..]),
        ] {
            assert_eq!(encoded(|e| e.put_uint(v)), expected, "{v}");
        }
    }

    #[test]
    fn int_size_classes() {
        for (v, expected) in [
            (69_i64, &hex!("45")[..]),
            (-11, &hex!("f5")[..]),
            (-32, &hex!("e0")[..]),
            (127, &hex!("7f")[..]),
            (-33, &hex!("d0 df")[..]),
            (128, &hex!("d1 0080")[..]),
            (-128, &hex!("d0 80")[..]),
            (-129, &hex!("d1 ff7f")[..]),
            (32767, &hex!("d1 7fff")[..]),
            (32768, &hex!("d2 00008000")[..]),
            (-32769, &hex!("d2 ffff7fff")[..]),
            (2147483647, &hex!("d2 7fffffff")[..]),
            (2147483648, &hex!("d3 0000000080000000")[..]),
            (-2147483649, &hex!("d3 ffffffff7fffffff")[..]),
        ] {
            assert_eq!(encoded(|e| e.put_int(v)), expected, "{v}");
        }
    }

    #[test]
    fn float_width() {
        assert_eq!(encoded(|e| e.put_float(85.125)), hex!("ca 42aa4000"));
        assert_eq!(
            encoded(|e| e.put_float(85.3)),
            hex!("cb 4055533333333333")
        );
        assert_eq!(
            encoded(|e| e.put_float(f64::from(0.00085125_f32))),
            hex!("ca 3a5f266c")
        );
        assert_eq!(
            encoded(|e| e.put_float(0.00085125)),
            hex!("cb 3f4be4cd74927914")
        );
        assert_eq!(encoded(|e| e.put_float(0.0)), hex!("ca 00000000"));
        assert_eq!(encoded(|e| e.put_float(-0.0)), hex!("ca 80000000"));
        assert_eq!(
            encoded(|e| e.put_float(f64::INFINITY)),
            hex!("cb 7ff0000000000000")
        );
        // subnormal at single precision
        assert!(!fits_f32(f64::from(f32::MIN_POSITIVE) / 2.0));
        assert!(fits_f32(f64::from(f32::MIN_POSITIVE)));
        assert!(fits_f32(f64::from(f32::MAX)));
        assert!(!fits_f32(f64::from(f32::MAX) * 2.0));
    }

    #[test]
    fn forced_widths() {
        assert_eq!(encoded(|e| e.put_float32(85.3)), hex!("ca 42aa999a"));
        assert_eq!(
            encoded(|e| e.put_float64(85.125)),
            hex!("cb 4055480000000000")
        );
    }

    #[test]
    fn containers() {
        assert_eq!(encoded(|e| e.put_array_length(10)), hex!("9a"));
        assert_eq!(encoded(|e| e.put_array_length(15)), hex!("9f"));
        assert_eq!(encoded(|e| e.put_array_length(16)), hex!("dc 0010"));
        assert_eq!(encoded(|e| e.put_array_length(30000)), hex!("dc 7530"));
        assert_eq!(encoded(|e| e.put_array_length(65536)), hex!("dd 00010000"));
        assert_eq!(encoded(|e| e.put_array_length(80000)), hex!("dd 00013880"));
        assert_eq!(encoded(|e| e.put_map_length(0)), hex!("80"));
        assert_eq!(encoded(|e| e.put_map_length(16)), hex!("de 0010"));
        assert_eq!(encoded(|e| e.put_map_length(65535)), hex!("de ffff"));
        assert_eq!(encoded(|e| e.put_map_length(u32::MAX)), hex!("df ffffffff"));
    }

    #[test]
    fn scalars() {
        assert_eq!(
            encoded(|e| {
                e.put_bool(true);
                e.put_bool(false);
                e.put_nil();
            }),
            hex!("c3 c2 c0")
        );
    }

    #[test]
    fn strings() {
        let run = |n: usize, prefix: &[u8]| {
            let s = "*".repeat(n);
            let out = encoded(|e| e.put_string(&s).unwrap());
            assert_eq!(&out[..prefix.len()], prefix, "{n}");
            assert_eq!(out.len(), prefix.len() + n, "{n}");
        };
        run(0, &hex!("a0"));
        run(31, &hex!("bf"));
        run(32, &hex!("d9 20"));
        run(255, &hex!("d9 ff"));
        run(256, &hex!("da 0100"));
        run(65535, &hex!("da ffff"));
        run(65536, &hex!("db 00010000"));
    }

    #[test]
    fn bytes() {
        let run = |n: usize, prefix: &[u8]| {
            let b = vec![0x2a; n];
            let out = encoded(|e| e.put_bytes(&b).unwrap());
            assert_eq!(&out[..prefix.len()], prefix, "{n}");
            assert_eq!(out.len(), prefix.len() + n, "{n}");
        };
        run(0, &hex!("c4 00"));
        run(31, &hex!("c4 1f"));
        run(255, &hex!("c4 ff"));
        run(256, &hex!("c5 0100"));
        run(65535, &hex!("c5 ffff"));
        run(65536, &hex!("c6 00010000"));
    }

    #[test]
    fn too_long() {
        assert_eq!(len_u64("string", 1 << 8), Ok(256));
        assert_eq!(len_u64("string", u32::MAX as usize), Ok(MASK32));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            len_u64("byte slice", 1 << 32),
            Err(Error::TooLong {
                kind: "byte slice",
                len: 1 << 32
            })
        );
    }

    #[test]
    fn ext_uint() {
        assert_eq!(encoded(|e| e.put_ext_uint(42, 255)), hex!("d4 2a ff"));
        assert_eq!(encoded(|e| e.put_ext_uint(42, 256)), hex!("d5 2a 0100"));
        assert_eq!(encoded(|e| e.put_ext_uint(42, 65535)), hex!("d5 2a ffff"));
        assert_eq!(
            encoded(|e| e.put_ext_uint(42, 65536)),
            hex!("d6 2a 00010000")
        );
        assert_eq!(
            encoded(|e| e.put_ext_uint(42, 4294967295)),
            hex!("d6 2a ffffffff")
        );
        assert_eq!(
            encoded(|e| e.put_ext_uint(42, 4294967296)),
            hex!("d7 2a 0000000100000000")
        );
    }

    #[test]
    fn time() {
        // 1997-08-28T00:00:00Z
        assert_eq!(
            encoded(|e| e.put_time(Timestamp::from_seconds(872_726_400))),
            hex!("d6 ff 3404bf80")
        );
        // 1995-09-12T00:00:00.000420Z
        assert_eq!(
            encoded(|e| e.put_time(Timestamp::new(810_864_000, 420_000).unwrap())),
            hex!("d7 ff 0019a2803054cd80")
        );
        // 1961-10-19T00:00:00.000420Z
        assert_eq!(
            encoded(|e| e.put_time(Timestamp::new(-258_854_400, 420_000).unwrap())),
            hex!("c7 0c ff 000668a0 fffffffff0923200")
        );
        assert_eq!(
            encoded(|e| e.put_time(Timestamp::from_seconds(1 << 32))),
            hex!("d7 ff 0000000100000000")
        );
        assert_eq!(
            encoded(|e| e.put_time(Timestamp::from_seconds(1 << 34))),
            hex!("c7 0c ff 00000000 0000000400000000")
        );
    }

    #[test]
    fn hex_dump_and_clear() {
        let mut e = Encoder::new();
        e.put_uint(0xcafe);
        e.put_nil();
        assert_eq!(e.to_hex(None), "cd ca fe c0");
        assert_eq!(e.to_hex(Some(2)), "cd ca");
        assert_eq!(e.to_hex(Some(100)), "cd ca fe c0");
        assert_eq!(e.len(), 4);

        e.clear();
        assert!(e.bytes().is_empty());
        assert_eq!(e.to_hex(None), "");
        e.put_raw(&hex!("c3"));
        assert_eq!(e.bytes(), hex!("c3"));
    }
}
