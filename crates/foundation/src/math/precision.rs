//! Precision policies.
//!
//! Coordinates arrive from the backend as `f64` and stay that way on the CPU
//! (camera math, picking). Only the draw path narrows to `f32`, relative to
//! the camera eye.

use core::cmp::Ordering;

use super::Vec3;

/// GPU-friendly, camera-relative position in `f32`.
pub type CameraRelativeF32 = [f32; 3];

/// Convert a world-space point (f64) to an `f32` offset from `origin`.
#[inline]
pub fn camera_relative_f32(world: Vec3, origin: Vec3) -> CameraRelativeF32 {
    let d = world - origin;
    [d.x as f32, d.y as f32, d.z as f32]
}

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
///
/// Pick results are ranked with this so equal distances never depend on
/// iteration order.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Float equality up to an absolute tolerance.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
