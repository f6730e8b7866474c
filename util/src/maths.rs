//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Linear interpolation between two values.
///
/// `t` should be in the range [0, 1], with 0 returning `start` and 1
/// returning `end`.
pub fn lerp<T>(start: T, end: T, t: T) -> T
where
    T: Float,
{
    start + t * (end - start)
}

/// Clamp a value into the range [min, max].
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0f64, 10f64, 0f64), 0f64);
        assert_eq!(lerp(0f64, 10f64, 1f64), 10f64);
        assert_eq!(lerp(-1f64, 1f64, 0.5f64), 0f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, 0f64, 1f64), 1f64);
        assert_eq!(clamp(-0.5f64, 0f64, 1f64), 0f64);
        assert_eq!(clamp(0.5f64, 0f64, 1f64), 0.5f64);
    }
}
