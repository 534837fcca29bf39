//! Easing curves used by effects
//!
//! All functions map `[0, 1]` onto `[0, 1]` and are clamped at both ends.

use std::f32::consts::PI;

/// Ease-out with adjustable strength
///
/// `amount = 0` is linear, `amount = 1` is a cubic ease-out.
pub fn decelerate(t: f32, amount: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let exponent = 1.0 + 2.0 * amount.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powf(exponent)
}

pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    0.5 - 0.5 * (t * PI).cos()
}

/// Logistic curve rescaled so that it hits 0 and 1 exactly
pub fn sigmoid(t: f32) -> f32 {
    const STEEPNESS: f32 = 10.0;
    let raw = |x: f32| 1.0 / (1.0 + (-STEEPNESS * (x - 0.5)).exp());
    let low = raw(0.0);
    let high = raw(1.0);
    ((raw(t.clamp(0.0, 1.0)) - low) / (high - low)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for f in [ease_out_cubic, ease_in_out, sigmoid] {
            assert!(f(0.0).abs() < 0.001);
            assert!((f(1.0) - 1.0).abs() < 0.001);
        }
        assert!(decelerate(0.0, 0.5).abs() < 0.001);
        assert!((decelerate(1.0, 0.5) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_decelerate_amount() {
        assert!((decelerate(0.3, 0.0) - 0.3).abs() < 0.001);
        assert!(decelerate(0.3, 1.0) > decelerate(0.3, 0.5));
        assert!((decelerate(0.5, 1.0) - ease_out_cubic(0.5)).abs() < 0.001);
    }

    #[test]
    fn test_symmetric_curves() {
        assert!((ease_in_out(0.5) - 0.5).abs() < 0.001);
        assert!((sigmoid(0.5) - 0.5).abs() < 0.001);
        assert!((sigmoid(0.2) + sigmoid(0.8) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_clamped() {
        assert_eq!(ease_out_cubic(-1.0), 0.0);
        assert_eq!(ease_in_out(2.0), 1.0);
    }
}
