//! Unrolled transforms for 4, 8 and 16 points.
//!
//! These skip stage dispatch entirely. The 16-point kernel follows the same
//! 4×4 order and per-pass division as the general engine and, inside a plan,
//! reads the plan's own twiddles, so results agree with the engine as long as
//! no intermediate saturates.

use core::f64::consts::FRAC_1_SQRT_2;

use crate::butterfly::{butterfly4, butterfly8, RunMode};
use crate::num::{Arith, Complex, Sample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SmallKernel {
    N4,
    N8,
    N16,
}

impl SmallKernel {
    pub fn for_len(n: usize) -> Option<Self> {
        match n {
            4 => Some(SmallKernel::N4),
            8 => Some(SmallKernel::N8),
            16 => Some(SmallKernel::N16),
            _ => None,
        }
    }

    pub fn len(self) -> usize {
        match self {
            SmallKernel::N4 => 4,
            SmallKernel::N8 => 8,
            SmallKernel::N16 => 16,
        }
    }
}

/// In-place 4-point DFT. With `divide` the input is first divided by 4.
#[inline(always)]
pub fn fft4<A: Arith>(input: &mut [Complex<A>], divide: bool) {
    debug_assert_eq!(input.len(), 4);
    let mut x = [input[0], input[1], input[2], input[3]];
    if divide {
        x.iter_mut().for_each(|v| *v = v.div_by(4));
    }
    butterfly4(&mut x);
    input.copy_from_slice(&x);
}

/// In-place 8-point DFT. With `divide` the input is first divided by 8.
#[inline(always)]
pub fn fft8<A: Arith>(input: &mut [Complex<A>], divide: bool) {
    debug_assert_eq!(input.len(), 8);
    let mut x = [Complex::zero(); 8];
    x.copy_from_slice(input);
    if divide {
        x.iter_mut().for_each(|v| *v = v.div_by(8));
    }
    butterfly8(&mut x, A::from_coeff(FRAC_1_SQRT_2));
    input.copy_from_slice(&x);
}

/// `cos(π/8)` and `sin(π/8)`.
const C1: f64 = 0.923_879_532_511_286_7;
const S1: f64 = 0.382_683_432_365_089_8;

/// `W16^(k·m)` at `(k - 1) * 4 + m`, the layout of the second stage of a
/// 16-point plan.
const W16: [(f64, f64); 12] = [
    (1.0, 0.0),
    (C1, -S1),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (S1, -C1),
    (1.0, 0.0),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (0.0, -1.0),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (1.0, 0.0),
    (S1, -C1),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (-C1, S1),
];

/// In-place 16-point DFT as two radix-4 passes.
///
/// With `divide` each pass divides its inputs by 4.
pub fn fft16<A: Arith>(input: &mut [Complex<A>], divide: bool) {
    let mut tw = [Complex::<A>::zero(); 12];
    for (slot, &(re, im)) in tw.iter_mut().zip(W16.iter()) {
        *slot = Complex::new(A::from_coeff(re), A::from_coeff(im));
    }
    fft16_with(input, &tw, divide);
}

/// [`fft16`] with the second-pass twiddles supplied by the caller.
fn fft16_with<A: Arith>(input: &mut [Complex<A>], tw: &[Complex<A>], divide: bool) {
    debug_assert_eq!(input.len(), 16);
    debug_assert_eq!(tw.len(), 12);

    // Columns: x[f + 4k] -> tmp[4f + k]
    let mut tmp = [Complex::<A>::zero(); 16];
    for f in 0..4 {
        let mut col = [input[f], input[f + 4], input[f + 8], input[f + 12]];
        if divide {
            col.iter_mut().for_each(|v| *v = v.div_by(4));
        }
        butterfly4(&mut col);
        tmp[4 * f..4 * f + 4].copy_from_slice(&col);
    }

    // Rows: tmp[m + 4k] * W16^(km) -> out[m + 4k]
    for m in 0..4 {
        let mut row = [tmp[m], tmp[m + 4], tmp[m + 8], tmp[m + 12]];
        if divide {
            row.iter_mut().for_each(|v| *v = v.div_by(4));
        }
        if m > 0 {
            for (k, v) in row.iter_mut().enumerate().skip(1) {
                *v = v.mul(tw[(k - 1) * 4 + m]);
            }
        }
        butterfly4(&mut row);
        for (k, v) in row.iter().enumerate() {
            input[m + 4 * k] = *v;
        }
    }
}

/// Run a small kernel from `input` to `output` with the engine's direction and
/// scaling conventions.
///
/// `twiddles` is the plan's second-stage span and is only read for 16 points.
pub(crate) fn run_small<S: Sample>(
    kernel: SmallKernel,
    input: &[Complex<S>],
    output: &mut [Complex<S>],
    twiddles: &[Complex<S::Acc>],
    mode: RunMode,
) {
    let n = kernel.len();
    let per_stage = <S::Acc as Arith>::PER_STAGE_SCALING;
    let divide = mode.scaled && per_stage;

    let mut x = [Complex::<S::Acc>::zero(); 16];
    let x = &mut x[..n];
    for (slot, s) in x.iter_mut().zip(input) {
        *slot = mode.enter(s.widen());
    }
    match kernel {
        SmallKernel::N4 => fft4(x, divide),
        SmallKernel::N8 => fft8(x, divide),
        SmallKernel::N16 => fft16_with(x, twiddles, divide),
    }
    let post = (mode.scaled && !per_stage).then(|| S::Acc::from_coeff(1.0 / n as f64));
    for (out, v) in output.iter_mut().zip(x.iter()) {
        *out = Complex::<S>::narrow(mode.leave(*v, post));
    }
}
