use std::fmt;

/**
    Maximum accepted video length, in whole seconds.

    Displays as readable text, e.g. `1 hour`, `30 minutes`, `90 seconds`.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DurationLimit(pub u64);

impl DurationLimit {
    /// Whether a (possibly fractional) duration is over the limit.
    pub fn is_exceeded_by(self, duration_secs: f64) -> bool {
        duration_secs > self.0 as f64
    }
}

impl Default for DurationLimit {
    fn default() -> Self {
        Self(3600)
    }
}

impl fmt::Display for DurationLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0;
        let (count, unit) = if secs > 0 && secs % 3600 == 0 {
            (secs / 3600, "hour")
        } else if secs > 0 && secs % 60 == 0 {
            (secs / 60, "minute")
        } else {
            (secs, "second")
        };
        let plural = if count == 1 { "" } else { "s" };
        write!(f, "{} {}{}", count, unit, plural)
    }
}
