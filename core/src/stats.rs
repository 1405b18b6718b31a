//! Statistics utilities shared by aggregation, standardization and
//! the Monte Carlo layer.
//!
//! Every function here is total: empty inputs, zero weights and zero
//! standard deviations map to the fixed fallbacks below instead of
//! producing NaN or panicking.

use serde::{Deserialize, Serialize};

/// Fallback standard deviation when a pooled distribution has no weight.
pub const DEFAULT_STD: f64 = 10.0;

/// Deviation score assigned when the reference std is zero.
pub const DEVIATION_CENTER: f64 = 50.0;

/// Points per standard deviation on the deviation scale.
pub const DEVIATION_SCALE: f64 = 10.0;

/// z-score of the 95th percentile of a standard normal.
pub const Z_95: f64 = 1.645;

/// Share of a cohort treated as key persons.
pub const KEY_PERSON_SHARE: f64 = 0.05;

/// Weight of a key person relative to an ordinary member.
pub const KEY_PERSON_SCALE: f64 = 2.0;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Empty input ⇒ 0.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Weighted mean of `(weight, value)` pairs. Zero total weight ⇒ 0.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    let total: f64 = pairs.iter().map(|(w, _)| *w).sum();
    if total <= 0.0 {
        return 0.0;
    }
    pairs.iter().map(|(w, v)| w * v).sum::<f64>() / total
}

/// Mean and std of a mixture of `(weight, mean, std)` components.
///
/// Uses the law of total variance, so mixing two tight groups with
/// different means yields a wider distribution. Zero total weight
/// returns `(0, DEFAULT_STD)`.
pub fn pooled_distribution(parts: &[(f64, f64, f64)]) -> (f64, f64) {
    let total: f64 = parts.iter().map(|(w, _, _)| w.max(0.0)).sum();
    if total <= 0.0 {
        return (0.0, DEFAULT_STD);
    }
    let m = parts.iter().map(|(w, mu, _)| w.max(0.0) * mu).sum::<f64>() / total;
    let second = parts
        .iter()
        .map(|(w, mu, sd)| w.max(0.0) * (sd * sd + mu * mu))
        .sum::<f64>()
        / total;
    (m, (second - m * m).max(0.0).sqrt())
}

pub fn z_to_deviation(z: f64) -> f64 {
    DEVIATION_CENTER + DEVIATION_SCALE * z
}

pub fn deviation_to_z(score: f64) -> f64 {
    (score - DEVIATION_CENTER) / DEVIATION_SCALE
}

/// Deviation score of `value` against a reference mean/std.
/// A zero (or non-finite) std always yields exactly 50.
pub fn to_deviation_score(value: f64, mean: f64, std: f64) -> f64 {
    if std <= 0.0 || !std.is_finite() {
        return DEVIATION_CENTER;
    }
    z_to_deviation((value - mean) / std)
}

/// Inverse of `to_deviation_score` for `std > 0`.
pub fn from_deviation_score(score: f64, mean: f64, std: f64) -> f64 {
    mean + deviation_to_z(score) * std
}

/// Standard normal CDF (Abramowitz & Stegun 7.1.26, |error| < 1.5e-7).
pub fn normal_cdf(z: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A: [f64; 5] = [
        0.254_829_592,
        -0.284_496_736,
        1.421_413_741,
        -1.453_152_027,
        1.061_405_429,
    ];
    let x = z.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + P * x);
    let poly = A.iter().rev().fold(0.0, |acc, a| acc * t + a) * t;
    let erf = 1.0 - poly * (-x * x).exp();
    if z >= 0.0 {
        0.5 * (1.0 + erf)
    } else {
        0.5 * (1.0 - erf)
    }
}

/// Inverse standard normal CDF (Acklam's rational approximation).
/// `p` is clamped into (0, 1) so the result is always finite.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    let p = p.clamp(1e-12, 1.0 - 1e-12);
    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Percentile `p` (0–100) by linear interpolation on the sorted sample.
/// Empty input ⇒ 0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, p)
}

/// Same as `percentile` but for an already sorted slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Skill value at the top-5% boundary of a cohort.
pub fn top_percentile_value(mean: f64, std: f64) -> f64 {
    mean + Z_95 * std
}

/// Key-person contribution of one cohort: the top-5% skill value
/// weighted by the number of key persons it holds.
pub fn key_person_contribution(mean: f64, std: f64, count: f64) -> f64 {
    top_percentile_value(mean, std) * (KEY_PERSON_SHARE * count) * KEY_PERSON_SCALE
}

/// Descriptive statistics of a sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean:  f64,
    pub std:   f64,
    pub min:   f64,
    pub max:   f64,
    pub p5:    f64,
    pub p25:   f64,
    pub p50:   f64,
    pub p75:   f64,
    pub p95:   f64,
}

/// Summarize a sample. Empty input ⇒ all zeros.
pub fn summarize(values: &[f64]) -> Summary {
    if values.is_empty() {
        return Summary::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Summary {
        count: sorted.len(),
        mean:  mean(&sorted),
        std:   std_dev(&sorted),
        min:   sorted[0],
        max:   sorted[sorted.len() - 1],
        p5:    percentile_sorted(&sorted, 5.0),
        p25:   percentile_sorted(&sorted, 25.0),
        p50:   percentile_sorted(&sorted, 50.0),
        p75:   percentile_sorted(&sorted, 75.0),
        p95:   percentile_sorted(&sorted, 95.0),
    }
}
