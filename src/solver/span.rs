//! Integration interval

use std::fmt;

/// Time interval `[start, end]` in days
///
/// `start == end` is allowed and yields a single output point. A reversed
/// interval is rejected by [`validate`](Self::validate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Interval `[0, end]`
    pub fn from_zero(end: f64) -> Self {
        Self::new(0.0, end)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the interval reduces to one instant
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Verify both bounds are finite and ordered
    pub fn validate(&self) -> Result<(), String> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(format!("Time span bounds must be finite, got {}", self));
        }
        if self.end < self.start {
            return Err(format!("Time span end must not precede start, got {}", self));
        }
        Ok(())
    }
}

impl Default for TimeSpan {
    /// The 30-day horizon of a typical digester run
    fn default() -> Self {
        Self::from_zero(30.0)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_validation() {
        assert!(TimeSpan::new(0.0, 30.0).validate().is_ok());
        assert!(TimeSpan::new(5.0, 5.0).validate().is_ok());
        assert!(TimeSpan::new(10.0, 0.0).validate().is_err());
        assert!(TimeSpan::new(0.0, f64::INFINITY).validate().is_err());
        assert!(TimeSpan::new(f64::NAN, 1.0).validate().is_err());
    }

    #[test]
    fn test_span_helpers() {
        let span = TimeSpan::default();
        assert_eq!(span.duration(), 30.0);
        assert!(!span.is_degenerate());
        assert!(TimeSpan::from_zero(0.0).is_degenerate());
        assert_eq!(span.to_string(), "[0, 30]");
    }
}
