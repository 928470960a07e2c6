//! Coordinate rounding shared by every comparison in the table pipeline.
//!
//! Cell rectangles are built from differences of ruling coordinates, which
//! drifts in the last bits (a right edge at 160.137451171875 comes back as
//! 160.13745498657227). Every equality or ordering test on coordinates goes
//! through [`Precision::round`] so that drift never splits a grid line.

/// Decimal digits kept when no precision is configured.
pub const DEFAULT_PRECISION: u32 = 5;

/// Largest precision accepted by settings validation.
pub const MAX_PRECISION: u32 = 12;

/// Fixed decimal rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Precision {
    digits: u32,
    scale: f64,
}

impl Precision {
    pub fn new(digits: u32) -> Self {
        Self {
            digits,
            scale: 10f64.powi(digits as i32),
        }
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Round half away from zero to the configured number of digits.
    ///
    /// Values too large to scale have no fractional digits left and come
    /// back unchanged.
    #[inline]
    pub fn round(&self, v: f64) -> f64 {
        let scaled = v * self.scale;
        if !scaled.is_finite() {
            return v;
        }
        let r = scaled.round() / self.scale;
        // keep -0.0 out of keys and output
        if r == 0.0 { 0.0 } else { r }
    }

    /// Equality after rounding both sides.
    #[inline]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        self.round(a) == self.round(b)
    }

    /// Whether `v` lies in `[start - tolerance, end + tolerance]` after rounding.
    #[inline]
    pub fn within(&self, v: f64, start: f64, end: f64, tolerance: f64) -> bool {
        let v = self.round(v);
        v >= self.round(start) - tolerance && v <= self.round(end) + tolerance
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_five_digits() {
        let p = Precision::default();
        assert_eq!(p.round(160.13745498657227), 160.13745);
        assert_eq!(p.round(10.000001), 10.0);
        assert!(p.eq(10.000001, 9.999999));
        assert!(!p.eq(10.0, 10.0001));
    }

    #[test]
    fn huge_values_survive_rounding() {
        let p = Precision::default();
        assert_eq!(p.round(1e304), 1e304);
        assert_eq!(p.round(-1e304), -1e304);
        assert!(p.within(1e304, 0.0, 1e304, 1.0));
        assert!(p.round(f64::NAN).is_nan());
    }

    #[test]
    fn negative_zero_is_normalized() {
        let p = Precision::default();
        assert!(p.round(-0.000001).is_sign_positive());
    }

    #[test]
    fn within_is_inclusive() {
        let p = Precision::new(2);
        assert!(p.within(10.0, 0.0, 10.0, 0.0));
        assert!(p.within(10.004, 0.0, 10.0, 0.0));
        assert!(!p.within(10.5, 0.0, 10.0, 0.25));
        assert!(p.within(-0.5, 0.0, 10.0, 1.0));
    }
}
