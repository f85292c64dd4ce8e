//! Real transforms on top of the complex engine.
//!
//! An `N`-point real sequence is read as `M = N/2` complex samples
//! `z[j] = x[2j] + i·x[2j+1]`. After an `M`-point complex transform `Z`, the
//! split step recovers the `M + 1` unique bins of the real spectrum:
//!
//! ```text
//! X[0] = Z[0].re + Z[0].im        X[M] = Z[0].re - Z[0].im
//! X[k] = ((Z[k] + conj Z[M-k]) + (Z[k] - conj Z[M-k]) · s[k-1]) / 2
//! ```
//!
//! with `s[j] = -i·W_N^(j+1)` the super-twiddles. The inverse runs the same
//! algebra backwards and finishes with an inverse complex transform.
//!
//! A packed sample can reach magnitude √2 even when every real sample is in
//! `[-1, 1]`. A scaled forward plan therefore halves the packed samples on the
//! first load, which leaves the engine with `Z / N` and the split with its usual
//! `/ 2` already applied. The inverse mirrors this: the inverse complex
//! transform produces `z / 2` and its last store doubles.

use crate::butterfly::RunMode;
use crate::fft::{Direction, Domain, FftError, FftPlan};
use crate::num::{as_complex, as_complex_mut, Arith, Complex, Sample};

/// Number of real samples in one packed complex sample.
pub const STRIDE: usize = 2;

/// Turn the packed spectrum in `data[..M]` into the real spectrum in
/// `data[..=M]`, in place.
pub(crate) fn split_forward<S: Sample>(data: &mut [Complex<S>], super_twiddles: &[Complex<S::Acc>]) {
    let m = data.len() - 1;

    let z0 = data[0].widen();
    let zero = <S::Acc as Arith>::zero();
    data[0] = Complex::<S>::narrow(Complex::new(z0.re + z0.im, zero));
    data[m] = Complex::<S>::narrow(Complex::new(z0.re - z0.im, zero));

    for k in 1..=m / 2 {
        let fpk = data[k].widen();
        let fpnk = data[m - k].widen().conj();
        let f1k = fpk.add(fpnk);
        let tw = fpk.sub(fpnk).mul(super_twiddles[k - 1]);
        data[k] = Complex::<S>::narrow(f1k.add(tw).half());
        data[m - k] = Complex::<S>::narrow(Complex::new(f1k.re - tw.re, tw.im - f1k.im).half());
    }
}

/// Rebuild the packed spectrum from the `M + 1` bins in `input`.
///
/// Unscaled output is `Z`; with `scaled` it is `Z / 2`, which the inverse
/// transform's doubling store and `1/M` scale bring back to `z`.
pub(crate) fn split_inverse<S: Sample>(
    input: &[Complex<S>],
    output: &mut [Complex<S>],
    super_twiddles: &[Complex<S::Acc>],
    scaled: bool,
) {
    let m = output.len();
    debug_assert_eq!(input.len(), m + 1);
    let finish = |v: Complex<S::Acc>| {
        let v = v.half();
        Complex::<S>::narrow(if scaled { v.half() } else { v })
    };

    let x0 = input[0].widen();
    let xm = input[m].widen();
    output[0] = finish(Complex::new(x0.re + xm.re, x0.re - xm.re));

    for k in 1..=m / 2 {
        let fk = input[k].widen();
        let fnkc = input[m - k].widen().conj();
        let fek = fk.add(fnkc);
        let fok = fk.sub(fnkc).mul(super_twiddles[k - 1].conj());
        output[k] = finish(fek.add(fok));
        output[m - k] = finish(Complex::new(fek.re - fok.re, fok.im - fek.im));
    }
}

impl<S: Sample> FftPlan<S> {
    /// Number of bins a forward real transform produces (`N/2 + 1`).
    pub fn spectrum_len(&self) -> usize {
        self.n / STRIDE + 1
    }

    /// Real-to-complex transform of `N` samples into `N/2 + 1` bins.
    pub fn forward_real_with_scratch(
        &self,
        input: &[S],
        output: &mut [Complex<S>],
        scratch: &mut [Complex<S>],
    ) -> Result<(), FftError> {
        self.expect_domain(Domain::Real)?;
        if input.len() != self.n || output.len() != self.spectrum_len() {
            return Err(FftError::MismatchedLengths);
        }
        self.check_scratch(scratch)?;
        let m = self.n / STRIDE;
        let scaled = self.config.is_scaled(Direction::Forward);
        let mode = RunMode {
            halve_input: scaled,
            ..RunMode::complex(false, scaled)
        };
        self.engine
            .run(as_complex(input), &mut output[..m], scratch, mode);
        split_forward(output, self.engine.twiddles().super_twiddles());
        Ok(())
    }

    /// Complex-to-real transform of `N/2 + 1` bins into `N` samples.
    ///
    /// The imaginary parts of bins `0` and `N/2` are ignored.
    pub fn inverse_real_with_scratch(
        &self,
        input: &[Complex<S>],
        output: &mut [S],
        scratch: &mut [Complex<S>],
    ) -> Result<(), FftError> {
        self.expect_domain(Domain::Real)?;
        if input.len() != self.spectrum_len() || output.len() != self.n {
            return Err(FftError::MismatchedLengths);
        }
        self.check_scratch(scratch)?;
        let m = self.n / STRIDE;
        let mode = RunMode {
            double_output: true,
            ..RunMode::complex(true, self.config.is_scaled(Direction::Inverse))
        };
        let (packed, rest) = scratch.split_at_mut(m);
        split_inverse(input, packed, self.engine.twiddles().super_twiddles(), mode.scaled);
        self.engine
            .run(packed, as_complex_mut(output), rest, mode);
        Ok(())
    }

    /// [`forward_real_with_scratch`](Self::forward_real_with_scratch) with
    /// allocated scratch.
    pub fn forward_real(&self, input: &[S], output: &mut [Complex<S>]) -> Result<(), FftError> {
        self.expect_domain(Domain::Real)?;
        let mut scratch = self.new_scratch();
        self.forward_real_with_scratch(input, output, &mut scratch)
    }

    /// [`inverse_real_with_scratch`](Self::inverse_real_with_scratch) with
    /// allocated scratch.
    pub fn inverse_real(&self, input: &[Complex<S>], output: &mut [S]) -> Result<(), FftError> {
        self.expect_domain(Domain::Real)?;
        let mut scratch = self.new_scratch();
        self.inverse_real_with_scratch(input, output, &mut scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;
    use alloc::vec;
    use alloc::vec::Vec;

    fn real_dft(input: &[f64]) -> Vec<Complex64> {
        let n = input.len();
        (0..=n / 2)
            .map(|k| {
                let mut sum = Complex64::zero();
                for (j, &x) in input.iter().enumerate() {
                    let angle = -2.0 * core::f64::consts::PI * ((k * j) % n) as f64 / n as f64;
                    sum = sum.add(Complex64::new(x * angle.cos(), x * angle.sin()));
                }
                sum
            })
            .collect()
    }

    #[test]
    fn forward_matches_reference() {
        for n in [2usize, 4, 6, 10, 12, 18, 32, 40, 64, 90] {
            let x: Vec<f64> = (0..n).map(|i| ((i * 7 % 5) as f64) - 1.5).collect();
            let plan = FftPlan::<f64>::new(n, Domain::Real).unwrap();
            let mut out = vec![Complex64::zero(); plan.spectrum_len()];
            plan.forward_real(&x, &mut out).unwrap();
            for (k, (a, b)) in out.iter().zip(real_dft(&x)).enumerate() {
                assert!((a.re - b.re).abs() < 1e-9, "n={} k={} re {} vs {}", n, k, a.re, b.re);
                assert!((a.im - b.im).abs() < 1e-9, "n={} k={} im {} vs {}", n, k, a.im, b.im);
            }
        }
    }

    #[test]
    fn inverse_restores_signal() {
        for n in [2usize, 8, 14, 24, 100] {
            let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.37).sin()).collect();
            let plan = FftPlan::<f64>::new(n, Domain::Real).unwrap();
            let mut spectrum = vec![Complex64::zero(); n / 2 + 1];
            let mut back = vec![0.0; n];
            plan.forward_real(&x, &mut spectrum).unwrap();
            plan.inverse_real(&spectrum, &mut back).unwrap();
            for (a, b) in back.iter().zip(&x) {
                assert!((a - b).abs() < 1e-9, "n={} {} vs {}", n, a, b);
            }
        }
    }

    #[test]
    fn real_buffers_are_checked() {
        let plan = FftPlan::<f32>::new(8, Domain::Real).unwrap();
        let mut out = vec![crate::num::Complex32::zero(); 4];
        assert_eq!(
            plan.forward_real(&[0.0; 8], &mut out),
            Err(FftError::MismatchedLengths)
        );
        let mut buf = vec![crate::num::Complex32::zero(); 8];
        assert_eq!(
            plan.process(&buf.clone(), &mut buf, Direction::Forward),
            Err(FftError::DomainMismatch)
        );
    }
}
