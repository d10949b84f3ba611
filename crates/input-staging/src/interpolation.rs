//! Linear interpolation on plaid (separable) source grids.
//!
//! Source data is given on per-axis coordinate vectors that must be strictly
//! increasing. Destination sites are flat lists of coordinates, one list per
//! active axis, so curvilinear destination grids are handled the same way as
//! rectilinear ones. Multi-dimensional interpolation is the separable
//! application of the 1-D scheme (bilinear, trilinear).
//!
//! Sites outside the source range follow an [`ExtrapolationPolicy`]:
//!
//! | Policy   | Below first / above last coordinate       |
//! |----------|-------------------------------------------|
//! | `Clamp`  | boundary value held constant              |
//! | `Linear` | boundary segment continued linearly       |
//! | `Nan`    | `f64::NAN`                                |

use ndarray::{ArrayView1, ArrayView2, ArrayView3};

use crate::types::ExtrapolationPolicy;

/// Neighbouring source indices and the weight of the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    lo: usize,
    hi: usize,
    w: f64,
}

/// Locate `x` within `coords`.
///
/// Returns `None` when the site yields no value (NaN input, or out of range
/// under the `Nan` policy).
fn bracket(coords: &[f64], x: f64, policy: ExtrapolationPolicy) -> Option<Bracket> {
    let n = coords.len();
    if n == 0 || x.is_nan() {
        return None;
    }
    if n == 1 {
        return Some(Bracket { lo: 0, hi: 0, w: 0.0 });
    }

    let first = coords[0];
    let last = coords[n - 1];

    if x < first || x > last {
        let (lo, hi) = if x < first { (0, 1) } else { (n - 2, n - 1) };
        return match policy {
            ExtrapolationPolicy::Nan => None,
            ExtrapolationPolicy::Clamp => Some(Bracket {
                lo,
                hi,
                w: if x < first { 0.0 } else { 1.0 },
            }),
            ExtrapolationPolicy::Linear => Some(Bracket {
                lo,
                hi,
                w: (x - coords[lo]) / (coords[hi] - coords[lo]),
            }),
        };
    }

    // Number of coordinates <= x; at least 1 since x >= first
    let above = coords.partition_point(|&c| c <= x);
    let lo = (above - 1).min(n - 2);
    let hi = lo + 1;
    let w = (x - coords[lo]) / (coords[hi] - coords[lo]);

    Some(Bracket { lo, hi, w })
}

#[inline]
fn lerp(a: f64, b: f64, w: f64) -> f64 {
    a * (1.0 - w) + b * w
}

/// 1-D linear interpolation of `f` (given at `x`) onto the sites `xi`.
pub fn interp1(
    x: &[f64],
    f: ArrayView1<'_, f64>,
    xi: &[f64],
    policy: ExtrapolationPolicy,
) -> Vec<f64> {
    xi.iter()
        .map(|&site| match bracket(x, site, policy) {
            Some(b) => lerp(f[b.lo], f[b.hi], b.w),
            None => f64::NAN,
        })
        .collect()
}

/// Bilinear interpolation of `f` (shape `[x1.len(), x2.len()]`) onto the
/// sites `(x1i[k], x2i[k])`.
pub fn interp2(
    x1: &[f64],
    x2: &[f64],
    f: ArrayView2<'_, f64>,
    x1i: &[f64],
    x2i: &[f64],
    policy: ExtrapolationPolicy,
) -> Vec<f64> {
    x1i.iter()
        .zip(x2i)
        .map(|(&s1, &s2)| {
            let (Some(a), Some(b)) = (bracket(x1, s1, policy), bracket(x2, s2, policy)) else {
                return f64::NAN;
            };
            let lower = lerp(f[[a.lo, b.lo]], f[[a.hi, b.lo]], a.w);
            let upper = lerp(f[[a.lo, b.hi]], f[[a.hi, b.hi]], a.w);
            lerp(lower, upper, b.w)
        })
        .collect()
}

/// Trilinear interpolation of `f` (shape `[x1.len(), x2.len(), x3.len()]`)
/// onto the sites `(x1i[k], x2i[k], x3i[k])`.
#[allow(clippy::too_many_arguments)]
pub fn interp3(
    x1: &[f64],
    x2: &[f64],
    x3: &[f64],
    f: ArrayView3<'_, f64>,
    x1i: &[f64],
    x2i: &[f64],
    x3i: &[f64],
    policy: ExtrapolationPolicy,
) -> Vec<f64> {
    x1i.iter()
        .zip(x2i)
        .zip(x3i)
        .map(|((&s1, &s2), &s3)| {
            let (Some(a), Some(b), Some(c)) = (
                bracket(x1, s1, policy),
                bracket(x2, s2, policy),
                bracket(x3, s3, policy),
            ) else {
                return f64::NAN;
            };
            let plane = |k: usize| {
                let lower = lerp(f[[a.lo, b.lo, k]], f[[a.hi, b.lo, k]], a.w);
                let upper = lerp(f[[a.lo, b.hi, k]], f[[a.hi, b.hi, k]], a.w);
                lerp(lower, upper, b.w)
            };
            lerp(plane(c.lo), plane(c.hi), c.w)
        })
        .collect()
}
