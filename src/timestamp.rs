use super::{error::Error, format::NANOS_PER_SEC};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in time as carried by the timestamp extension: seconds since the
/// Unix epoch plus a non-negative sub-second nanosecond part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    pub const UNIX_EPOCH: Self = Self {
        seconds: 0,
        nanoseconds: 0,
    };

    /// Returns `None` if `nanoseconds` is not below one second.
    pub const fn new(seconds: i64, nanoseconds: u32) -> Option<Self> {
        if nanoseconds >= NANOS_PER_SEC {
            return None;
        }
        Some(Self {
            seconds,
            nanoseconds,
        })
    }

    pub const fn from_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds: 0,
        }
    }

    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    pub const fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = Error;

    fn try_from(value: SystemTime) -> Result<Self, Self::Error> {
        match value.duration_since(UNIX_EPOCH) {
            Ok(d) => Ok(Self {
                seconds: i64::try_from(d.as_secs()).map_err(|_| Error::TimestampOutOfRange)?,
                nanoseconds: d.subsec_nanos(),
            }),
            Err(e) => {
                let d = e.duration();
                let mut seconds =
                    -i64::try_from(d.as_secs()).map_err(|_| Error::TimestampOutOfRange)?;
                let mut nanoseconds = d.subsec_nanos();
                if nanoseconds > 0 {
                    seconds = seconds
                        .checked_sub(1)
                        .ok_or(Error::TimestampOutOfRange)?;
                    nanoseconds = NANOS_PER_SEC - nanoseconds;
                }
                Ok(Self {
                    seconds,
                    nanoseconds,
                })
            }
        }
    }
}

impl TryFrom<Timestamp> for SystemTime {
    type Error = Error;

    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        let t = if value.seconds >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(value.seconds.unsigned_abs()))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(value.seconds.unsigned_abs()))
        };
        t.and_then(|t| t.checked_add(Duration::from_nanos(value.nanoseconds.into())))
            .ok_or(Error::TimestampOutOfRange)
    }
}

#[cfg(feature = "chrono")]
mod chrono_impl {
    use super::*;
    use chrono::{DateTime, Utc};

    impl From<DateTime<Utc>> for Timestamp {
        fn from(value: DateTime<Utc>) -> Self {
            let seconds = value.timestamp();
            let nanoseconds = value.timestamp_subsec_nanos();
            // leap second
            if nanoseconds >= NANOS_PER_SEC {
                Self {
                    seconds: seconds.saturating_add(1),
                    nanoseconds: nanoseconds - NANOS_PER_SEC,
                }
            } else {
                Self {
                    seconds,
                    nanoseconds,
                }
            }
        }
    }

    impl TryFrom<Timestamp> for DateTime<Utc> {
        type Error = Error;

        fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
            DateTime::from_timestamp(value.seconds, value.nanoseconds)
                .ok_or(Error::TimestampOutOfRange)
        }
    }
}
