//! Mixed-radix butterfly engine.
//!
//! A complex transform runs as a sequence of Stockham stages. Stage `s` with
//! radix `r` combines `r` sub-transforms of length `mstride` into one of length
//! `r * mstride`, for each of its `fstride` groups:
//!
//! ```text
//! load   src[f * mstride + m + k * (n / r)]          k = 0..r
//! twist  x[k] *= tw[(k - 1) * mstride + m]           k >= 1, skipped on the first stage
//! store  dst[f * r * mstride + m + k * mstride]      k = 0..r
//! ```
//!
//! Stages alternate between the caller's output and scratch buffers so the last
//! one lands in the output. Inverse transforms conjugate on the first load and
//! the last store and otherwise run the forward algebra.
//!
//! Real transforms feed a packed sequence whose samples can reach magnitude √2.
//! They ask for the input to be halved on the first load and the result doubled
//! on the last store, so fixed-point intermediates stay inside the unit circle.

use alloc::vec::Vec;
use core::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::factor::{FactorPlan, Stage, StageKernel};
use crate::fft::FftError;
use crate::fft_kernels::{self, SmallKernel};
use crate::num::{Arith, Complex, Sample};
use crate::twiddle::TwiddleTable;

/// How one call drives the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunMode {
    pub inverse: bool,
    /// Divide the result by the length.
    pub scaled: bool,
    /// Halve every sample on the first load.
    pub halve_input: bool,
    /// Double every sample on the last store.
    pub double_output: bool,
}

impl RunMode {
    pub fn complex(inverse: bool, scaled: bool) -> Self {
        Self {
            inverse,
            scaled,
            ..Self::default()
        }
    }

    #[inline(always)]
    pub(crate) fn enter<A: Arith>(&self, mut x: Complex<A>) -> Complex<A> {
        if self.inverse {
            x = x.conj();
        }
        if self.halve_input {
            x = x.half();
        }
        x
    }

    #[inline(always)]
    pub(crate) fn leave<A: Arith>(&self, mut y: Complex<A>, post_scale: Option<A>) -> Complex<A> {
        if self.inverse {
            y = y.conj();
        }
        if let Some(s) = post_scale {
            y = y.scale(s);
        }
        if self.double_output {
            y = y.add(y);
        }
        y
    }
}

/// Per-call view of one stage.
pub(crate) struct StagePass<'a, A> {
    pub stage: &'a Stage,
    /// The stage's twiddle span; empty on the first stage.
    pub twiddles: &'a [Complex<A>],
    /// Roots of unity for generic stages.
    pub roots: &'a [Complex<A>],
    pub first: bool,
    pub last: bool,
    pub mode: RunMode,
    /// Divide every input by the radix (fixed-point scaling).
    pub divide: bool,
    /// Multiply every output by this coefficient (deferred floating-point scaling).
    pub post_scale: Option<A>,
}

impl<A: Arith> StagePass<'_, A> {
    #[inline(always)]
    fn load<S: Sample<Acc = A>>(&self, sample: Complex<S>, radix: usize) -> Complex<A> {
        let mut x = sample.widen();
        if self.first {
            x = self.mode.enter(x);
        }
        if self.divide {
            x = x.div_by(radix);
        }
        x
    }

    #[inline(always)]
    fn store<S: Sample<Acc = A>>(&self, mut y: Complex<A>) -> Complex<S> {
        if self.last {
            y = self.mode.leave(y, self.post_scale);
        }
        Complex::<S>::narrow(y)
    }
}

/// A stage kernel resolved at plan build time.
pub(crate) type StageFn<S> =
    fn(&StagePass<'_, <S as Sample>::Acc>, &[Complex<S>], &mut [Complex<S>]);

/// Map a stage tag to the function that executes it.
pub(crate) fn resolve<S: Sample>(kernel: StageKernel) -> StageFn<S> {
    match kernel {
        StageKernel::Radix2 => stage_radix2::<S>,
        StageKernel::Radix3 => stage_radix3::<S>,
        StageKernel::Radix4 => stage_radix4::<S>,
        StageKernel::Radix5 => stage_radix5::<S>,
        StageKernel::Radix8 => stage_radix8::<S>,
        StageKernel::Generic(_) => stage_generic::<S>,
    }
}

/// Run one fixed-radix stage with `kernel` as the butterfly.
#[inline(always)]
fn run_radix<S, const R: usize, K>(
    pass: &StagePass<'_, S::Acc>,
    src: &[Complex<S>],
    dst: &mut [Complex<S>],
    kernel: K,
) where
    S: Sample,
    K: Fn(&mut [Complex<S::Acc>; R]),
{
    let Stage {
        fstride, mstride, ..
    } = *pass.stage;
    let in_step = fstride * mstride;
    for f in 0..fstride {
        let in_base = f * mstride;
        let out_base = f * R * mstride;
        for m in 0..mstride {
            let mut x = [Complex::<S::Acc>::zero(); R];
            for (k, slot) in x.iter_mut().enumerate() {
                *slot = pass.load(src[in_base + m + k * in_step], R);
            }
            if !pass.first && m > 0 {
                for (k, slot) in x.iter_mut().enumerate().skip(1) {
                    *slot = slot.mul(pass.twiddles[(k - 1) * mstride + m]);
                }
            }
            kernel(&mut x);
            for (k, y) in x.iter().enumerate() {
                dst[out_base + m + k * mstride] = pass.store(*y);
            }
        }
    }
}

fn stage_radix2<S: Sample>(pass: &StagePass<'_, S::Acc>, src: &[Complex<S>], dst: &mut [Complex<S>]) {
    run_radix::<S, 2, _>(pass, src, dst, butterfly2);
}

fn stage_radix3<S: Sample>(pass: &StagePass<'_, S::Acc>, src: &[Complex<S>], dst: &mut [Complex<S>]) {
    let c = Radix3::new();
    run_radix::<S, 3, _>(pass, src, dst, |x| butterfly3(x, &c));
}

fn stage_radix4<S: Sample>(pass: &StagePass<'_, S::Acc>, src: &[Complex<S>], dst: &mut [Complex<S>]) {
    run_radix::<S, 4, _>(pass, src, dst, butterfly4);
}

fn stage_radix5<S: Sample>(pass: &StagePass<'_, S::Acc>, src: &[Complex<S>], dst: &mut [Complex<S>]) {
    let c = Radix5::new();
    run_radix::<S, 5, _>(pass, src, dst, |x| butterfly5(x, &c));
}

fn stage_radix8<S: Sample>(pass: &StagePass<'_, S::Acc>, src: &[Complex<S>], dst: &mut [Complex<S>]) {
    let c = S::Acc::from_coeff(FRAC_1_SQRT_2);
    run_radix::<S, 8, _>(pass, src, dst, |x| butterfly8(x, c));
}

/// Largest prime a generic stage handles without a heap buffer.
const GENERIC_STACK_RADIX: usize = 32;

/// Direct O(r²) DFT for a radix without a closed form.
fn stage_generic<S: Sample>(pass: &StagePass<'_, S::Acc>, src: &[Complex<S>], dst: &mut [Complex<S>]) {
    let Stage {
        radix,
        fstride,
        mstride,
        ..
    } = *pass.stage;
    let in_step = fstride * mstride;
    let mut stack = [Complex::<S::Acc>::zero(); GENERIC_STACK_RADIX];
    let mut heap = Vec::new();
    let x: &mut [Complex<S::Acc>] = if radix <= GENERIC_STACK_RADIX {
        &mut stack[..radix]
    } else {
        heap.resize(radix, Complex::<S::Acc>::zero());
        &mut heap
    };
    for f in 0..fstride {
        let in_base = f * mstride;
        let out_base = f * radix * mstride;
        for m in 0..mstride {
            for (k, slot) in x.iter_mut().enumerate() {
                let mut v = pass.load(src[in_base + m + k * in_step], radix);
                if !pass.first && m > 0 && k > 0 {
                    v = v.mul(pass.twiddles[(k - 1) * mstride + m]);
                }
                *slot = v;
            }
            for u in 0..radix {
                let mut acc = x[0];
                for (k, v) in x.iter().enumerate().skip(1) {
                    let q = (k * u) % radix;
                    // Root 0 is exactly one; skip the multiply so fixed point keeps full scale.
                    acc = if q == 0 {
                        acc.add(*v)
                    } else {
                        acc.add(v.mul(pass.roots[q]))
                    };
                }
                dst[out_base + m + u * mstride] = pass.store(acc);
            }
        }
    }
}

#[inline(always)]
pub fn butterfly2<A: Arith>(x: &mut [Complex<A>; 2]) {
    let [a, b] = *x;
    x[0] = a.add(b);
    x[1] = a.sub(b);
}

/// Constants of the 3-point DFT.
pub struct Radix3<A> {
    /// `sin(2π/3)`
    pub s: A,
}

impl<A: Arith> Radix3<A> {
    pub fn new() -> Self {
        Self {
            s: A::from_coeff(0.866_025_403_784_438_6),
        }
    }
}

impl<A: Arith> Default for Radix3<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
pub fn butterfly3<A: Arith>(x: &mut [Complex<A>; 3], c: &Radix3<A>) {
    let [x0, x1, x2] = *x;
    let t = x1.add(x2);
    let d = x1.sub(x2).scale(c.s).mul_neg_i();
    let m = x0.sub(t.half());
    x[0] = x0.add(t);
    x[1] = m.add(d);
    x[2] = m.sub(d);
}

#[inline(always)]
pub fn butterfly4<A: Arith>(x: &mut [Complex<A>; 4]) {
    let [x0, x1, x2, x3] = *x;
    let s0 = x0.add(x2);
    let s1 = x0.sub(x2);
    let s2 = x1.add(x3);
    let s3 = x1.sub(x3).mul_neg_i();
    x[0] = s0.add(s2);
    x[1] = s1.add(s3);
    x[2] = s0.sub(s2);
    x[3] = s1.sub(s3);
}

/// Constants of the 5-point DFT.
pub struct Radix5<A> {
    /// `cos(2π/5)`, `cos(4π/5)`
    pub ca: A,
    pub cb: A,
    /// `sin(2π/5)`, `sin(4π/5)`
    pub sa: A,
    pub sb: A,
}

impl<A: Arith> Radix5<A> {
    pub fn new() -> Self {
        Self {
            ca: A::from_coeff(libm::cos(2.0 * PI / 5.0)),
            cb: A::from_coeff(libm::cos(4.0 * PI / 5.0)),
            sa: A::from_coeff(libm::sin(2.0 * PI / 5.0)),
            sb: A::from_coeff(libm::sin(4.0 * PI / 5.0)),
        }
    }
}

impl<A: Arith> Default for Radix5<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
pub fn butterfly5<A: Arith>(x: &mut [Complex<A>; 5], c: &Radix5<A>) {
    let [x0, x1, x2, x3, x4] = *x;
    let p1 = x1.add(x4);
    let q1 = x1.sub(x4);
    let p2 = x2.add(x3);
    let q2 = x2.sub(x3);

    let r1 = x0.add(p1.scale(c.ca)).add(p2.scale(c.cb));
    let v1 = q1.scale(c.sa).add(q2.scale(c.sb)).mul_neg_i();
    let r2 = x0.add(p1.scale(c.cb)).add(p2.scale(c.ca));
    let v2 = q1.scale(c.sb).sub(q2.scale(c.sa)).mul_neg_i();

    x[0] = x0.add(p1).add(p2);
    x[1] = r1.add(v1);
    x[4] = r1.sub(v1);
    x[2] = r2.add(v2);
    x[3] = r2.sub(v2);
}

/// Radix-8 as two radix-4 butterflies joined by a radix-2 pass.
///
/// `c` is `1/√2`.
#[inline(always)]
pub fn butterfly8<A: Arith>(x: &mut [Complex<A>; 8], c: A) {
    let mut e = [x[0], x[2], x[4], x[6]];
    let mut o = [x[1], x[3], x[5], x[7]];
    butterfly4(&mut e);
    butterfly4(&mut o);

    // W8^1 = c(1 - i), W8^2 = -i, W8^3 = -c(1 + i)
    let t0 = o[0];
    let t1 = Complex::new(o[1].re + o[1].im, o[1].im - o[1].re).scale(c);
    let t2 = o[2].mul_neg_i();
    let t3 = Complex::new(o[3].im - o[3].re, -(o[3].re + o[3].im)).scale(c);

    for (k, t) in [t0, t1, t2, t3].into_iter().enumerate() {
        x[k] = e[k].add(t);
        x[k + 4] = e[k].sub(t);
    }
}

/// Execution state of a complex transform of one length.
pub(crate) struct Engine<S: Sample> {
    factors: FactorPlan,
    twiddles: TwiddleTable<S::Acc>,
    kernels: Vec<StageFn<S>>,
    small: Option<SmallKernel>,
    /// Stage 0 writes the output when the stage count is odd.
    first_writes_output: bool,
}

impl<S: Sample> Engine<S> {
    pub fn new(
        factors: FactorPlan,
        twiddles: TwiddleTable<S::Acc>,
        small_kernels: bool,
    ) -> Result<Self, FftError> {
        let mut kernels = Vec::new();
        kernels
            .try_reserve_exact(factors.stage_count())
            .map_err(|_| FftError::AllocationFailure)?;
        kernels.extend(factors.stages().iter().map(|s| resolve::<S>(s.kernel)));
        let small = if small_kernels {
            SmallKernel::for_len(factors.len())
        } else {
            None
        };
        let first_writes_output = factors.stage_count() % 2 == 1;
        Ok(Self {
            factors,
            twiddles,
            kernels,
            small,
            first_writes_output,
        })
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn factors(&self) -> &FactorPlan {
        &self.factors
    }

    pub fn twiddles(&self) -> &TwiddleTable<S::Acc> {
        &self.twiddles
    }

    pub fn small_kernel(&self) -> Option<SmallKernel> {
        self.small
    }

    /// Transform `input` into `output`.
    ///
    /// Buffers are already validated: `input` and `output` hold `len()`
    /// samples, `scratch` at least `len()`.
    pub fn run(
        &self,
        input: &[Complex<S>],
        output: &mut [Complex<S>],
        scratch: &mut [Complex<S>],
        mode: RunMode,
    ) {
        let n = self.len();
        debug_assert_eq!(input.len(), n);
        debug_assert_eq!(output.len(), n);
        let coeffs = self.twiddles.coeffs();

        if let Some(kernel) = self.small {
            let twiddles: &[Complex<S::Acc>] = match kernel {
                SmallKernel::N16 => self.twiddles.stage(1).twiddles.slice(coeffs),
                SmallKernel::N4 | SmallKernel::N8 => &[],
            };
            fft_kernels::run_small(kernel, input, output, twiddles, mode);
            return;
        }
        if self.kernels.is_empty() {
            for (out, x) in output.iter_mut().zip(input) {
                *out = Complex::<S>::narrow(mode.leave(mode.enter(x.widen()), None));
            }
            return;
        }

        let scratch = &mut scratch[..n];
        let divide = mode.scaled && <S::Acc as Arith>::PER_STAGE_SCALING;
        let post = if mode.scaled && !<S::Acc as Arith>::PER_STAGE_SCALING {
            Some(S::Acc::from_coeff(1.0 / n as f64))
        } else {
            None
        };
        let last = self.kernels.len() - 1;
        let mut to_output = self.first_writes_output;

        for (i, (stage, kernel)) in self.factors.stages().iter().zip(&self.kernels).enumerate() {
            let spans = self.twiddles.stage(i);
            let pass = StagePass {
                stage,
                twiddles: spans.twiddles.slice(coeffs),
                roots: spans.roots.slice(coeffs),
                first: i == 0,
                last: i == last,
                mode,
                divide,
                post_scale: if i == last { post } else { None },
            };
            match (i == 0, to_output) {
                (true, true) => kernel(&pass, input, output),
                (true, false) => kernel(&pass, input, scratch),
                (false, true) => kernel(&pass, scratch, output),
                (false, false) => kernel(&pass, output, scratch),
            }
            to_output = !to_output;
        }
    }
}
