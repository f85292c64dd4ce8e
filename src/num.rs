//! Sample types and the arithmetic the butterflies run on.
//!
//! Storage samples ([`Sample`]) are what callers hand to a plan: `f32`, `f64`,
//! `i16` (Q15) and `i32` (Q31). Each one widens into a working type
//! ([`Arith`]) for the duration of a butterfly and narrows back on store.
//! Floating-point kinds work in their own precision. Fixed-point kinds work in a
//! type twice as wide so a single butterfly cannot overflow, and narrow with
//! saturation.

use core::fmt::Debug;
use core::ops::{Add, Neg, Sub};

/// Numeric precision of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    F32,
    F64,
    /// Signed 1.15 fixed point stored in `i16`.
    Q15,
    /// Signed 1.31 fixed point stored in `i32`.
    Q31,
}

/// Which transform directions divide their result by `N`.
///
/// A forward-scaled transform produces `DFT(x) / N`. A backward-scaled inverse
/// produces the true inverse `IDFT(X)`; an unscaled inverse produces
/// `N * IDFT(X)`. Round trips are exact when exactly one flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scaling {
    pub forward: bool,
    pub backward: bool,
}

impl Scaling {
    pub const NONE: Scaling = Scaling {
        forward: false,
        backward: false,
    };
    pub const FORWARD: Scaling = Scaling {
        forward: true,
        backward: false,
    };
    pub const BACKWARD: Scaling = Scaling {
        forward: false,
        backward: true,
    };
    pub const BOTH: Scaling = Scaling {
        forward: true,
        backward: true,
    };
}

/// Arithmetic used inside a butterfly.
///
/// Coefficients (twiddles and the fixed radix constants) live in the same type
/// as the data so fixed-point kinds can keep both in Q format.
pub trait Arith:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Fixed-point kinds divide by the radix at every stage instead of applying
    /// one `1/N` correction at the end.
    const PER_STAGE_SCALING: bool;

    fn zero() -> Self;
    /// Quantize a real coefficient in `[-1, 1]`.
    fn from_coeff(c: f64) -> Self;
    /// Product of a data value and a coefficient.
    fn mul_coeff(self, c: Self) -> Self;
    /// Divide by a small positive integer (a radix).
    fn div_by(self, d: usize) -> Self;
    fn half(self) -> Self;
}

/// A storage sample accepted by [`crate::fft::FftPlan`].
pub trait Sample: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    type Acc: Arith;
    const KIND: NumericKind;
    /// Scaling used by [`crate::fft::PlanConfig::for_sample`].
    const DEFAULT_SCALING: Scaling;

    fn widen(self) -> Self::Acc;
    fn narrow(acc: Self::Acc) -> Self;
}

impl Arith for f32 {
    const PER_STAGE_SCALING: bool = false;

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
    #[inline(always)]
    fn from_coeff(c: f64) -> Self {
        c as f32
    }
    #[inline(always)]
    fn mul_coeff(self, c: Self) -> Self {
        self * c
    }
    #[inline(always)]
    fn div_by(self, d: usize) -> Self {
        self / d as f32
    }
    #[inline(always)]
    fn half(self) -> Self {
        self * 0.5
    }
}

impl Arith for f64 {
    const PER_STAGE_SCALING: bool = false;

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }
    #[inline(always)]
    fn from_coeff(c: f64) -> Self {
        c
    }
    #[inline(always)]
    fn mul_coeff(self, c: Self) -> Self {
        self * c
    }
    #[inline(always)]
    fn div_by(self, d: usize) -> Self {
        self / d as f64
    }
    #[inline(always)]
    fn half(self) -> Self {
        self * 0.5
    }
}

impl Sample for f32 {
    type Acc = f32;
    const KIND: NumericKind = NumericKind::F32;
    const DEFAULT_SCALING: Scaling = Scaling::BACKWARD;

    #[inline(always)]
    fn widen(self) -> f32 {
        self
    }
    #[inline(always)]
    fn narrow(acc: f32) -> Self {
        acc
    }
}

impl Sample for f64 {
    type Acc = f64;
    const KIND: NumericKind = NumericKind::F64;
    const DEFAULT_SCALING: Scaling = Scaling::BACKWARD;

    #[inline(always)]
    fn widen(self) -> f64 {
        self
    }
    #[inline(always)]
    fn narrow(acc: f64) -> Self {
        acc
    }
}

/// Largest Q15 magnitude; `1.0` quantizes to this rather than wrapping to `-1.0`.
pub const Q15_MAX: i16 = i16::MAX;
/// Fractional bits of a Q15 value.
pub const Q15_SHIFT: u32 = 15;
/// Largest Q31 magnitude.
pub const Q31_MAX: i32 = i32::MAX;
/// Fractional bits of a Q31 value.
pub const Q31_SHIFT: u32 = 31;

/// Round half up and clamp to `[-max, max]`.
#[inline]
fn quantize(c: f64, max: f64) -> f64 {
    let v = libm::floor(0.5 + c * max);
    if v > max {
        max
    } else if v < -max {
        -max
    } else {
        v
    }
}

/// Q15 value held in 32 bits while a butterfly runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Q15(pub i32);

/// Q31 value held in 64 bits while a butterfly runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Q31(pub i64);

impl Add for Q15 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Q15(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Q15 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Q15(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Q15 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Q15(self.0.wrapping_neg())
    }
}

impl Arith for Q15 {
    const PER_STAGE_SCALING: bool = true;

    #[inline(always)]
    fn zero() -> Self {
        Q15(0)
    }
    fn from_coeff(c: f64) -> Self {
        Q15(quantize(c, Q15_MAX as f64) as i32)
    }
    #[inline(always)]
    fn mul_coeff(self, c: Self) -> Self {
        let p = self.0 as i64 * c.0 as i64;
        Q15(((p + (1 << (Q15_SHIFT - 1))) >> Q15_SHIFT) as i32)
    }
    #[inline(always)]
    fn div_by(self, d: usize) -> Self {
        Q15(self.0 / d as i32)
    }
    #[inline(always)]
    fn half(self) -> Self {
        Q15(self.0 >> 1)
    }
}

impl Add for Q31 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Q31(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Q31 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Q31(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Q31 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Q31(self.0.wrapping_neg())
    }
}

impl Arith for Q31 {
    const PER_STAGE_SCALING: bool = true;

    #[inline(always)]
    fn zero() -> Self {
        Q31(0)
    }
    fn from_coeff(c: f64) -> Self {
        Q31(quantize(c, Q31_MAX as f64) as i64)
    }
    #[inline(always)]
    fn mul_coeff(self, c: Self) -> Self {
        let p = self.0 as i128 * c.0 as i128;
        Q31(((p + (1 << (Q31_SHIFT - 1))) >> Q31_SHIFT) as i64)
    }
    #[inline(always)]
    fn div_by(self, d: usize) -> Self {
        Q31(self.0 / d as i64)
    }
    #[inline(always)]
    fn half(self) -> Self {
        Q31(self.0 >> 1)
    }
}

impl Sample for i16 {
    type Acc = Q15;
    const KIND: NumericKind = NumericKind::Q15;
    const DEFAULT_SCALING: Scaling = Scaling::FORWARD;

    #[inline(always)]
    fn widen(self) -> Q15 {
        Q15(self as i32)
    }
    #[inline(always)]
    fn narrow(acc: Q15) -> Self {
        acc.0.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

impl Sample for i32 {
    type Acc = Q31;
    const KIND: NumericKind = NumericKind::Q31;
    const DEFAULT_SCALING: Scaling = Scaling::FORWARD;

    #[inline(always)]
    fn widen(self) -> Q31 {
        Q31(self as i64)
    }
    #[inline(always)]
    fn narrow(acc: Q31) -> Self {
        acc.0.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    #[inline(always)]
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T: Arith> Complex<T> {
    #[inline(always)]
    pub fn zero() -> Self {
        Self {
            re: T::zero(),
            im: T::zero(),
        }
    }
    /// `exp(i·theta)` quantized into `T`.
    pub fn expi(theta: f64) -> Self {
        Self {
            re: T::from_coeff(libm::cos(theta)),
            im: T::from_coeff(libm::sin(theta)),
        }
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }
    /// Complex product where `other` is a coefficient (twiddle).
    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn mul(self, other: Self) -> Self {
        Self {
            re: self.re.mul_coeff(other.re) - self.im.mul_coeff(other.im),
            im: self.re.mul_coeff(other.im) + self.im.mul_coeff(other.re),
        }
    }
    #[inline(always)]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }
    /// Multiply by the real coefficient `c`.
    #[inline(always)]
    pub fn scale(self, c: T) -> Self {
        Self {
            re: self.re.mul_coeff(c),
            im: self.im.mul_coeff(c),
        }
    }
    /// Multiply by `-i`.
    #[inline(always)]
    pub fn mul_neg_i(self) -> Self {
        Self {
            re: self.im,
            im: -self.re,
        }
    }
    /// Multiply by `i`.
    #[inline(always)]
    pub fn mul_i(self) -> Self {
        Self {
            re: -self.im,
            im: self.re,
        }
    }
    #[inline(always)]
    pub fn div_by(self, d: usize) -> Self {
        Self {
            re: self.re.div_by(d),
            im: self.im.div_by(d),
        }
    }
    #[inline(always)]
    pub fn half(self) -> Self {
        Self {
            re: self.re.half(),
            im: self.im.half(),
        }
    }
}

impl<S: Sample> Complex<S> {
    #[inline(always)]
    pub fn widen(self) -> Complex<S::Acc> {
        Complex {
            re: self.re.widen(),
            im: self.im.widen(),
        }
    }
    #[inline(always)]
    pub fn narrow(acc: Complex<S::Acc>) -> Self {
        Complex {
            re: S::narrow(acc.re),
            im: S::narrow(acc.im),
        }
    }
}

impl Complex<f32> {
    pub fn norm_sqr(self) -> f32 {
        self.re * self.re + self.im * self.im
    }
}

impl Complex<f64> {
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl<T: Arith> core::ops::Neg for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl<T: Arith> core::ops::Add for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Complex::<T>::add(self, other)
    }
}

impl<T: Arith> core::ops::Sub for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Complex::<T>::sub(self, other)
    }
}

impl<T: Arith> core::ops::Mul for Complex<T> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Complex::<T>::mul(self, other)
    }
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;
pub type ComplexQ15 = Complex<i16>;
pub type ComplexQ31 = Complex<i32>;

/// View `2·M` interleaved scalars as `M` complex samples.
///
/// Callers guarantee `data.len()` is even.
#[inline]
pub(crate) fn as_complex<S: Sample>(data: &[S]) -> &[Complex<S>] {
    debug_assert_eq!(data.len() % 2, 0);
    // SAFETY: `Complex<S>` is `repr(C)` with two `S` fields, so it has the size of
    // `[S; 2]` and the alignment of `S`; the new slice covers the same bytes.
    unsafe { core::slice::from_raw_parts(data.as_ptr() as *const Complex<S>, data.len() / 2) }
}

/// Mutable counterpart of [`as_complex`].
#[inline]
pub(crate) fn as_complex_mut<S: Sample>(data: &mut [S]) -> &mut [Complex<S>] {
    debug_assert_eq!(data.len() % 2, 0);
    // SAFETY: see `as_complex`; the exclusive borrow is carried over.
    unsafe {
        core::slice::from_raw_parts_mut(data.as_mut_ptr() as *mut Complex<S>, data.len() / 2)
    }
}
