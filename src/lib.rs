//! # mrfft - mixed-radix FFT engine for `no_std` targets
//!
//! One-dimensional complex and real FFTs for composite lengths, in floating
//! point and in Q15/Q31 fixed point, sized for resource-constrained processors.
//!
//! ## Features
//!
//! - **Mixed radix**: lengths built from 2, 3, 4, 5 and 8 run on closed-form
//!   butterflies; other prime factors fall back to a direct per-prime DFT
//! - **Four sample kinds**: `f32`, `f64`, `i16` (Q15) and `i32` (Q31)
//! - **Real transforms** on a half-length complex FFT plus a split step
//! - **Plan once, execute often**: plans are immutable and `Sync`; scratch is
//!   supplied by the caller, so one plan can serve many threads
//! - **Unrolled 4/8/16-point kernels**
//!
//! ## Cargo Features
//!
//! - `std` (default): implement `std::error::Error` for [`FftError`]
//! - `verbose-logging`: emit plan construction details through `log`
//! - `internal-tests`: property tests inside the crate (`proptest`, `rand`)
//!
//! ## Example
//!
//! ```
//! use mrfft::{Complex32, Direction, Domain, FftPlan};
//!
//! let plan = FftPlan::<f32>::new(12, Domain::Complex).unwrap();
//! let input: Vec<Complex32> = (0..12).map(|i| Complex32::new(i as f32, 0.0)).collect();
//! let mut spectrum = vec![Complex32::zero(); 12];
//! let mut scratch = vec![Complex32::zero(); plan.scratch_len()];
//! plan.process_with_scratch(&input, &mut spectrum, &mut scratch, Direction::Forward).unwrap();
//! assert!((spectrum[0].re - 66.0).abs() < 1e-4);
//! ```
//!
//! ## Scaling
//!
//! Each plan carries a forward and a backward scaling flag. Floating-point
//! plans default to an unscaled forward and a `1/N` inverse; fixed-point plans
//! default to a forward transform divided by the radix at every stage, which
//! keeps unit-amplitude input in range, and an unscaled inverse.
//!
//! ## License
//!
//! Licensed under either of the Apache License, Version 2.0
//! (<https://www.apache.org/licenses/LICENSE-2.0>) or the MIT license
//! (<https://opensource.org/licenses/MIT>), at your option, as declared in
//! `Cargo.toml`.

#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(feature = "verbose-logging")]
macro_rules! fft_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! fft_debug {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(feature = "verbose-logging")]
macro_rules! fft_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! fft_trace {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Sample kinds, complex numbers and fixed-point arithmetic.
pub mod num;

/// Length factorization into radix stages.
pub mod factor;

/// Twiddle and super-twiddle tables.
pub mod twiddle;

mod butterfly;

/// Unrolled 4, 8 and 16-point transforms.
pub mod fft_kernels;

/// Plans, configuration, errors and the plan cache.
pub mod fft;

/// Real-to-complex and complex-to-real transforms.
pub mod rfft;

pub use factor::{factorize, FactorPlan, Stage, StageKernel};
pub use fft::{Direction, Domain, FftError, FftPlan, FftPlanner, PlanConfig};
pub use num::{
    Arith, Complex, Complex32, Complex64, ComplexQ15, ComplexQ31, NumericKind, Sample, Scaling,
};
