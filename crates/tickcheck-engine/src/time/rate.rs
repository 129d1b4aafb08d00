use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Fixed frame rate of a tick loop, in frames per second.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameRate(u32);

impl FrameRate {
    /// 30 fps, the rate the harness assumes unless told otherwise.
    pub const DEFAULT: FrameRate = FrameRate(30);

    pub fn new(fps: u32) -> Result<Self, FrameRateError> {
        if fps == 0 {
            return Err(FrameRateError::Zero);
        }
        Ok(Self(fps))
    }

    pub fn fps(self) -> u32 {
        self.0
    }

    /// Length of one frame: `1_000_000 µs / fps`, truncated to whole microseconds.
    ///
    /// 30 fps yields 33 333 µs.
    pub fn frame_period(self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.0))
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.0)
    }
}

impl FromStr for FrameRate {
    type Err = FrameRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fps = s
            .trim()
            .parse::<u32>()
            .map_err(|_| FrameRateError::Invalid(s.to_string()))?;
        Self::new(fps)
    }
}

/// A frame rate that cannot drive a tick loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRateError {
    Zero,
    Invalid(String),
}

impl fmt::Display for FrameRateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRateError::Zero => write!(f, "frame rate must be at least 1 fps"),
            FrameRateError::Invalid(s) => write!(f, "invalid frame rate {s:?}"),
        }
    }
}

impl std::error::Error for FrameRateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_thirty_fps() {
        assert_eq!(FrameRate::default().fps(), 30);
    }

    #[test]
    fn thirty_fps_period_is_truncated_micros() {
        assert_eq!(FrameRate::DEFAULT.frame_period(), Duration::from_micros(33_333));
    }

    #[test]
    fn sixty_fps_period() {
        let rate = FrameRate::new(60).unwrap();
        assert_eq!(rate.frame_period(), Duration::from_micros(16_666));
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(FrameRate::new(0), Err(FrameRateError::Zero));
        assert_eq!("0".parse::<FrameRate>(), Err(FrameRateError::Zero));
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(" 120 ".parse::<FrameRate>().unwrap().fps(), 120);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!("fast".parse::<FrameRate>(), Err(FrameRateError::Invalid(_))));
        assert!(matches!("-5".parse::<FrameRate>(), Err(FrameRateError::Invalid(_))));
    }
}
