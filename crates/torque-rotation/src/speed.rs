//! Fixed-point rotation speeds.

use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. Rotation speeds
/// use it so propagation and equality checks stay bit-exact.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for initialization and config.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and rendering.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Whether `v` is a usable rotation speed.
#[inline]
pub fn is_valid_speed(v: Fixed64) -> bool {
    v > Fixed64::ZERO
}

/// Render a speed for diagnostics: integral speeds without a fraction.
pub fn format_speed(v: Fixed64) -> String {
    if v.frac() == Fixed64::ZERO {
        v.to_num::<i64>().to_string()
    } else {
        v.to_string()
    }
}
