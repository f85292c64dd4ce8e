//! Length factorization.
//!
//! A transform length is split into radix stages. Radices are extracted outer
//! to inner (4s, then one 8 or 2 for an odd power-of-two exponent, then 3s,
//! then 5s, then any remaining primes as generic stages) and executed in the
//! reverse order, so the last radix extracted runs first on contiguous input.

use alloc::vec::Vec;

use crate::fft::FftError;

/// Butterfly used by one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKernel {
    Radix2,
    Radix3,
    Radix4,
    Radix5,
    Radix8,
    /// Direct DFT for a prime radix outside {2, 3, 5}.
    Generic(usize),
}

impl StageKernel {
    pub fn radix(self) -> usize {
        match self {
            StageKernel::Radix2 => 2,
            StageKernel::Radix3 => 3,
            StageKernel::Radix4 => 4,
            StageKernel::Radix5 => 5,
            StageKernel::Radix8 => 8,
            StageKernel::Generic(r) => r,
        }
    }

    pub fn is_generic(self) -> bool {
        matches!(self, StageKernel::Generic(_))
    }
}

/// One stage of a [`FactorPlan`].
///
/// `fstride` is the number of independent groups the stage processes and
/// `mstride` the length of the sub-transforms it combines, so
/// `fstride * radix * mstride == n` for every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub kernel: StageKernel,
    pub radix: usize,
    pub fstride: usize,
    pub mstride: usize,
}

/// Stages in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorPlan {
    n: usize,
    stages: Vec<Stage>,
}

impl FactorPlan {
    /// Transform length the plan covers.
    pub fn len(&self) -> usize {
        self.n
    }

    /// `true` only for the degenerate length-0 plan, which [`factorize`] never builds.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Radices in execution order.
    pub fn radices(&self) -> impl Iterator<Item = usize> + '_ {
        self.stages.iter().map(|s| s.radix)
    }

    pub fn has_generic(&self) -> bool {
        self.stages.iter().any(|s| s.kernel.is_generic())
    }
}

/// Smallest prime factor of `n` (`n >= 2`).
fn smallest_prime_factor(n: usize) -> usize {
    if n % 2 == 0 {
        return 2;
    }
    let mut p = 3;
    while p * p <= n {
        if n % p == 0 {
            return p;
        }
        p += 2;
    }
    n
}

/// Factor `n` into radix stages.
///
/// With `allow_generic == false` any prime factor above 5 fails with
/// [`FftError::UnsupportedLength`]. `n == 0` is [`FftError::EmptyInput`];
/// `n == 1` yields a plan with no stages.
pub fn factorize(n: usize, allow_generic: bool) -> Result<FactorPlan, FftError> {
    if n == 0 {
        return Err(FftError::EmptyInput);
    }

    // Outer to inner.
    let mut extracted: Vec<StageKernel> = Vec::new();
    let mut rest = n;
    let twos = rest.trailing_zeros();
    for _ in 0..twos / 2 {
        extracted.push(StageKernel::Radix4);
    }
    rest >>= twos;
    if twos % 2 == 1 {
        // Trade a trailing radix-2 for a radix-8 whenever a 4 can be absorbed.
        if twos >= 3 {
            extracted.pop();
            extracted.push(StageKernel::Radix8);
        } else {
            extracted.push(StageKernel::Radix2);
        }
    }
    while rest % 3 == 0 {
        extracted.push(StageKernel::Radix3);
        rest /= 3;
    }
    while rest % 5 == 0 {
        extracted.push(StageKernel::Radix5);
        rest /= 5;
    }
    while rest > 1 {
        let p = smallest_prime_factor(rest);
        if !allow_generic {
            fft_debug!("length {} has prime factor {} and generic stages are disabled", n, p);
            return Err(FftError::UnsupportedLength);
        }
        extracted.push(StageKernel::Generic(p));
        rest /= p;
    }

    let mut stages = Vec::new();
    stages
        .try_reserve_exact(extracted.len())
        .map_err(|_| FftError::AllocationFailure)?;
    let mut mstride = 1;
    for kernel in extracted.into_iter().rev() {
        let radix = kernel.radix();
        let fstride = n / (mstride * radix);
        fft_trace!("stage radix {} fstride {} mstride {}", radix, fstride, mstride);
        stages.push(Stage {
            kernel,
            radix,
            fstride,
            mstride,
        });
        mstride *= radix;
    }
    debug_assert_eq!(mstride, n);
    Ok(FactorPlan { n, stages })
}
