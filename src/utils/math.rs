//! # Game Mathematics
//!
//! Small numeric helpers for probability rolls and sub-tile motion.

use rand::Rng;

/// Rolls a uniform sample in `[0, 1)` and reports whether it fell under `probability`.
///
/// Probabilities outside `[0, 1]` are tolerated: anything `<= 0` never fires and
/// anything `>= 1` always does.
///
/// # Examples
///
/// ```
/// use lockdown::chance;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// assert!(!chance(&mut rng, 0.0));
/// assert!(chance(&mut rng, 1.0));
/// ```
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Returns `value` scaled by a factor from `[low, high)` with the given probability,
/// or `value` unchanged otherwise.
pub fn maybe_jitter<R: Rng + ?Sized>(
    rng: &mut R,
    probability: f64,
    value: f64,
    low: f64,
    high: f64,
) -> f64 {
    if chance(rng, probability) {
        value * rng.gen_range(low..high)
    } else {
        value
    }
}

/// Signed step of magnitude `speed` from `current` toward `target` on one axis.
///
/// Returns zero when the axis is already aligned.
pub fn axis_step(current: f32, target: f32, speed: f32) -> f32 {
    let delta = target - current;
    if delta.abs() < f32::EPSILON {
        0.0
    } else {
        speed * delta.signum()
    }
}
