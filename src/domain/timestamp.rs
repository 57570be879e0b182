//! DIS absolute timestamps.
//!
//! The low 31 bits carry Unix epoch seconds modulo 2^31 and bit 31 marks the
//! value as absolute (a relative timestamp leaves it clear). Epoch seconds at or
//! beyond 2^31 wrap, so encoded values repeat after January 2038.

use crate::domain::errors::ClockFault;
use std::time::{SystemTime, UNIX_EPOCH};

pub const ABSOLUTE_MARKER: u32 = 0x8000_0000;
const SECONDS_MASK: u32 = 0x7FFF_FFFF;

/// Wire value of an absolute timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AbsoluteTimestamp(u32);

impl AbsoluteTimestamp {
    pub fn from_epoch_seconds(seconds: u64) -> Self {
        Self(encode(seconds))
    }

    /// Fails when the clock reads earlier than the Unix epoch.
    pub fn from_system_time(time: SystemTime) -> Result<Self, ClockFault> {
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockFault::BeforeEpoch {
                behind: e.duration(),
            })?;
        Ok(Self::from_epoch_seconds(since_epoch.as_secs()))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Epoch seconds modulo 2^31.
    pub const fn seconds(self) -> u32 {
        decode(self.0)
    }
}

pub const fn encode(epoch_seconds: u64) -> u32 {
    ((epoch_seconds & SECONDS_MASK as u64) as u32) | ABSOLUTE_MARKER
}

/// Strips the marker bit. A relative timestamp decoded here is misread as
/// absolute; use [`is_absolute`] first when that matters.
pub const fn decode(raw: u32) -> u32 {
    raw & SECONDS_MASK
}

pub const fn is_absolute(raw: u32) -> bool {
    raw & ABSOLUTE_MARKER != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn when_seconds_fit_in_31_bits_then_round_trip_is_lossless() {
        for t in [0u64, 1, 1_700_000_000, (1 << 31) - 1] {
            let raw = encode(t);
            assert!(is_absolute(raw), "marker missing for {t}");
            assert_eq!(u64::from(decode(raw)), t);
        }
    }

    #[test]
    fn when_seconds_exceed_31_bits_then_value_wraps() {
        let raw = encode((1 << 31) + 5);

        assert_eq!(decode(raw), 5);
        assert!(is_absolute(raw));
    }

    #[test]
    fn when_clock_is_before_epoch_then_clock_fault_is_returned() {
        let before = UNIX_EPOCH - Duration::from_secs(10);

        let result = AbsoluteTimestamp::from_system_time(before);

        assert_eq!(
            result,
            Err(ClockFault::BeforeEpoch {
                behind: Duration::from_secs(10)
            })
        );
    }

    #[test]
    fn system_time_is_truncated_to_whole_seconds() {
        let time = UNIX_EPOCH + Duration::from_millis(1_700_000_000_750);

        let ts = AbsoluteTimestamp::from_system_time(time).expect("valid clock");

        assert_eq!(ts.seconds(), 1_700_000_000);
        assert_eq!(ts.raw(), 1_700_000_000 | ABSOLUTE_MARKER);
    }

    #[test]
    fn relative_timestamp_is_not_flagged_absolute() {
        assert!(!is_absolute(0x1234_5678));
        // Decoding does not validate the marker.
        assert_eq!(decode(0x1234_5678), 0x1234_5678);
    }
}
