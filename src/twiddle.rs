//! Twiddle tables for a [`FactorPlan`].
//!
//! All stage coefficients live in one contiguous arena. Each stage addresses
//! its share through a [`Span`]: the coefficient for butterfly leg `k >= 1` at
//! position `j` is `coeffs[base + (k - 1) * mstride + j]`.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::factor::FactorPlan;
use crate::fft::FftError;
use crate::num::{Arith, Complex};

/// Location of one stage's coefficients in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub base: usize,
    pub len: usize,
}

impl Span {
    #[inline(always)]
    pub fn slice<'a, T>(&self, arena: &'a [T]) -> &'a [T] {
        &arena[self.base..self.base + self.len]
    }
}

/// Coefficients a stage reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageTwiddles {
    /// `exp(-2πi·fstride·k·j/n)`; empty for the first stage.
    pub twiddles: Span,
    /// `exp(-2πi·q/radix)` for generic stages; empty otherwise.
    pub roots: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwiddleTable<A> {
    coeffs: Vec<Complex<A>>,
    stages: Vec<StageTwiddles>,
    super_twiddles: Vec<Complex<A>>,
}

/// `exp(-2πi·num/den)` with `num` already reduced modulo `den`.
#[inline]
pub(crate) fn root<A: Arith>(num: usize, den: usize) -> Complex<A> {
    Complex::expi(-2.0 * PI * num as f64 / den as f64)
}

fn reserve<T>(v: &mut Vec<T>, additional: usize) -> Result<(), FftError> {
    v.try_reserve_exact(additional)
        .map_err(|_| FftError::AllocationFailure)
}

impl<A: Arith> TwiddleTable<A> {
    /// Build the per-stage tables of `plan`.
    pub fn generate(plan: &FactorPlan) -> Result<Self, FftError> {
        let n = plan.len();
        let total: usize = plan
            .stages()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let tw = if i == 0 { 0 } else { (s.radix - 1) * s.mstride };
                let roots = if s.kernel.is_generic() { s.radix } else { 0 };
                tw + roots
            })
            .sum();

        let mut coeffs = Vec::new();
        reserve(&mut coeffs, total)?;
        let mut stages = Vec::new();
        reserve(&mut stages, plan.stage_count())?;

        for (i, s) in plan.stages().iter().enumerate() {
            let mut entry = StageTwiddles::default();
            if i > 0 {
                let base = coeffs.len();
                for k in 1..s.radix {
                    let step = (s.fstride * k) % n;
                    for j in 0..s.mstride {
                        coeffs.push(root((step * j) % n, n));
                    }
                }
                entry.twiddles = Span {
                    base,
                    len: coeffs.len() - base,
                };
            }
            if s.kernel.is_generic() {
                let base = coeffs.len();
                for q in 0..s.radix {
                    coeffs.push(root(q, s.radix));
                }
                entry.roots = Span {
                    base,
                    len: s.radix,
                };
            }
            stages.push(entry);
        }

        Ok(Self {
            coeffs,
            stages,
            super_twiddles: Vec::new(),
        })
    }

    /// Build the tables for a real transform whose packed complex length is `plan.len()`.
    pub fn generate_real(plan: &FactorPlan) -> Result<Self, FftError> {
        let mut table = Self::generate(plan)?;
        table.super_twiddles = super_twiddles(plan.len())?;
        Ok(table)
    }

    /// The coefficient arena.
    pub fn coeffs(&self) -> &[Complex<A>] {
        &self.coeffs
    }

    pub fn stage(&self, index: usize) -> &StageTwiddles {
        &self.stages[index]
    }

    /// Split-step coefficients; empty for complex plans.
    pub fn super_twiddles(&self) -> &[Complex<A>] {
        &self.super_twiddles
    }

    /// Total number of stored coefficients.
    pub fn len(&self) -> usize {
        self.coeffs.len() + self.super_twiddles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Super-twiddles for a real transform of length `2 * m`.
///
/// Entry `j` is `exp(-iπ·((j + 1)/m + 1/2))`, i.e. `-i·W_{2m}^{j+1}`, for
/// `j < m / 2`.
pub fn super_twiddles<A: Arith>(m: usize) -> Result<Vec<Complex<A>>, FftError> {
    let count = m / 2;
    let mut out = Vec::new();
    reserve(&mut out, count)?;
    for j in 0..count {
        let phase = -PI * ((j + 1) as f64 / m as f64 + 0.5);
        out.push(Complex::expi(phase));
    }
    Ok(out)
}
