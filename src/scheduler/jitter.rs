//! Gaussian jitter for perturbed re-arm durations.
//!
//! # Algorithm
//! Box–Muller transform on two uniform draws. Both draws are taken as
//! `1 − U` with `U ∈ [0, 1)` so the logarithm never sees zero.
//!
//! # Reference
//! Box & Muller (1958), "A Note on the Generation of Random Normal Deviates"

use rand::Rng;
use std::f64::consts::PI;

/// Draws one sample from `N(mean, std_dev²)` using the caller's generator.
pub fn normal_sample<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = 1.0 - rng.random::<f64>();
    let std_normal = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();
    mean + std_dev * std_normal
}
