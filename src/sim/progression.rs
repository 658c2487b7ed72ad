//! Per-stage difficulty curve
//!
//! Pure functions of the stage index (1-based).

use crate::meters_to_px;

/// Target obstacle count: 2, 4, 8, 16, ...
pub fn obstacle_count(stage: u32) -> u64 {
    1u64.checked_shl(stage).unwrap_or(u64::MAX)
}

/// Nominal gap between obstacles. Shrinks with stage, floored at 200.
pub fn obstacle_spacing(stage: u32) -> u32 {
    if stage == 1 {
        return 250;
    }
    let shrunk = 600i64 - 80 * stage as i64;
    shrunk.max(200) as u32
}

/// Stage length in meters
///
/// `5 * 2^(stage-1)` doubles every stage while the density factor
/// `(105 - 5 * stage) / 100` shrinks by 5 points, so the length keeps growing
/// but slower than the obstacle count. Rounds half up. Reaches zero at
/// stage 21 and goes negative after that; callers decide how to clamp.
pub fn stage_length(stage: u32) -> i64 {
    let base = 5.0 * 2f64.powi(stage as i32 - 1);
    let density = 105.0 - 5.0 * stage as f64;
    let meters = base * density / 100.0;
    (meters + 0.5).floor() as i64
}

/// Stage length in world units, never shorter than one meter
pub fn stage_length_px(stage: u32) -> f32 {
    meters_to_px(stage_length(stage).max(1) as f32)
}
