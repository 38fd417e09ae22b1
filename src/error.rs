#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("trying to read {missing} bytes beyond end of buffer ({remaining} bytes)")]
    Truncated { missing: usize, remaining: usize },
    #[error("invalid tag 0x{tag:02x} for {expected}")]
    InvalidTag { tag: u8, expected: &'static str },
    #[error("{kind} ({len} bytes) is too long to encode")]
    TooLong { kind: &'static str, len: usize },
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("value overflow")]
    Overflow,
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("duplicate map key")]
    DuplicateKey,
    #[error("timestamp out of range")]
    TimestampOutOfRange,
}
