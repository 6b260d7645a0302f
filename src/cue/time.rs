use crate::cue::error::{CueError, CueResult};
use std::str::FromStr;

/// CD-DA frame rate, the granularity of cue sheet timestamps.
pub const FRAMES_PER_SECOND: u32 = 75;

/// A `MM:SS:FF` cue sheet timestamp.
///
/// Minutes are unbounded since single-file audiobooks run far past the 99
/// minutes of a physical disc. Ordering is lexicographic over the fields,
/// which matches the ordering of [`MSF::to_seconds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MSF {
    pub minutes: u32,
    pub seconds: u8,
    pub frames: u8,
}

impl MSF {
    pub fn to_seconds(&self) -> f64 {
        self.minutes as f64 * 60.0
            + self.seconds as f64
            + self.frames as f64 / FRAMES_PER_SECOND as f64
    }
}

impl FromStr for MSF {
    type Err = CueError;

    fn from_str(msf_str: &str) -> CueResult<Self> {
        let invalid = || CueError::InvalidMSFFormat(msf_str.to_string());

        let parts: Vec<&str> = msf_str.split(':').collect();
        if parts.len() != 3
            || parts
                .iter()
                .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(invalid());
        }

        let minutes = parts[0].parse::<u32>().map_err(|_| invalid())?;
        let seconds = parts[1].parse::<u8>().map_err(|_| invalid())?;
        let frames = parts[2].parse::<u8>().map_err(|_| invalid())?;

        if seconds >= 60 || frames as u32 >= FRAMES_PER_SECOND {
            return Err(invalid());
        }

        Ok(MSF {
            minutes,
            seconds,
            frames,
        })
    }
}

/// Converts a `MM:SS:FF` timestamp to fractional seconds.
pub fn parse_time(value: &str) -> CueResult<f64> {
    Ok(value.parse::<MSF>()?.to_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_time_converts_frames_to_fractions() {
        assert_eq!(parse_time("00:00:00").unwrap(), 0.0);
        assert_eq!(parse_time("03:30:00").unwrap(), 210.0);
        assert_eq!(parse_time("01:02:15").unwrap(), 62.2);
        assert_eq!(parse_time("00:00:74").unwrap(), 74.0 / 75.0);
    }

    #[test]
    fn parse_time_accepts_long_running_minutes() {
        assert_eq!(parse_time("600:00:00").unwrap(), 36000.0);
    }

    #[test]
    fn parse_time_rejects_malformed_values() {
        for value in ["", "00:00", "00:00:00:00", "aa:00:00", "00::00", "-1:00:00"] {
            assert!(
                matches!(parse_time(value), Err(CueError::InvalidMSFFormat(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn parse_time_rejects_out_of_range_fields() {
        assert!(parse_time("00:60:00").is_err());
        assert!(parse_time("00:00:75").is_err());
    }

    fn msf() -> impl Strategy<Value = MSF> {
        (0u32..10_000, 0u8..60, 0u8..75).prop_map(|(minutes, seconds, frames)| MSF {
            minutes,
            seconds,
            frames,
        })
    }

    proptest! {
        /// Seconds grow strictly with the timestamp's lexicographic order
        #[test]
        fn to_seconds_is_strictly_increasing(a in msf(), b in msf()) {
            prop_assume!(a < b);
            prop_assert!(a.to_seconds() < b.to_seconds());
        }
    }
}
