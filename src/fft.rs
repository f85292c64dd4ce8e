//! Transform plans.
//!
//! An [`FftPlan`] is built once per (length, sample kind, domain, config) and
//! then executed any number of times. Building runs the factorizer, generates
//! the twiddle tables and resolves one kernel per stage; executing only reads
//! the plan, so a plan can be shared between threads as long as every caller
//! brings its own scratch (see [`FftPlan::scratch_len`]).
//!
//! [`FftPlanner`] caches plans by length, domain and configuration.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::butterfly::{Engine, RunMode};
use crate::factor::{factorize, FactorPlan};
use crate::num::{Complex, NumericKind, Sample, Scaling};
use crate::rfft::STRIDE;
use crate::twiddle::TwiddleTable;

/// Errors reported by planning and execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    /// The transform length is zero.
    EmptyInput,
    /// The length has a prime factor above 5 and generic stages are disabled.
    UnsupportedLength,
    /// Real transforms need an even length.
    OddRealLength,
    /// An input or output buffer does not have the length the plan expects.
    MismatchedLengths,
    /// Caller scratch is shorter than [`FftPlan::scratch_len`].
    ScratchTooSmall,
    /// A complex entry point was called on a real plan, or the reverse.
    DomainMismatch,
    /// Memory for the plan tables could not be reserved.
    AllocationFailure,
}

impl core::fmt::Display for FftError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FftError::EmptyInput => write!(f, "transform length must be non-zero"),
            FftError::UnsupportedLength => {
                write!(f, "length has a prime factor above 5 and generic stages are disabled")
            }
            FftError::OddRealLength => write!(f, "real transform length must be even"),
            FftError::MismatchedLengths => write!(f, "buffer length does not match the plan"),
            FftError::ScratchTooSmall => write!(f, "scratch buffer is too small"),
            FftError::DomainMismatch => write!(f, "plan domain does not match the call"),
            FftError::AllocationFailure => write!(f, "failed to allocate plan tables"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Inverse,
}

impl Direction {
    #[inline]
    pub fn is_inverse(self) -> bool {
        self == Direction::Inverse
    }
}

/// Whether a plan transforms complex sequences or real ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Complex,
    /// `N` reals to `N/2 + 1` complex bins and back, computed on an `N/2`-point
    /// complex transform.
    Real,
}

/// Build-time options of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanConfig {
    pub scaling: Scaling,
    /// Accept prime factors above 5 through the direct-DFT stage.
    pub allow_generic: bool,
    /// Use the unrolled 4/8/16-point kernels where the length allows.
    pub small_kernels: bool,
}

impl PlanConfig {
    /// Defaults for a sample kind: backward scaling for floating point,
    /// forward scaling for fixed point.
    pub fn for_sample<S: Sample>() -> Self {
        Self {
            scaling: S::DEFAULT_SCALING,
            allow_generic: true,
            small_kernels: true,
        }
    }

    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_generic(mut self, allow: bool) -> Self {
        self.allow_generic = allow;
        self
    }

    pub fn with_small_kernels(mut self, enabled: bool) -> Self {
        self.small_kernels = enabled;
        self
    }

    #[inline]
    pub fn is_scaled(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.scaling.forward,
            Direction::Inverse => self.scaling.backward,
        }
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self::for_sample::<f32>()
    }
}

/// A reusable transform of one length.
pub struct FftPlan<S: Sample> {
    pub(crate) n: usize,
    pub(crate) domain: Domain,
    pub(crate) config: PlanConfig,
    pub(crate) engine: Engine<S>,
}

impl<S: Sample> FftPlan<S> {
    /// Plan a transform with the default configuration for `S`.
    pub fn new(n: usize, domain: Domain) -> Result<Self, FftError> {
        Self::with_config(n, domain, PlanConfig::for_sample::<S>())
    }

    pub fn with_config(n: usize, domain: Domain, config: PlanConfig) -> Result<Self, FftError> {
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        let (factors, twiddles) = match domain {
            Domain::Complex => {
                let factors = factorize(n, config.allow_generic)?;
                let twiddles = TwiddleTable::generate(&factors)?;
                (factors, twiddles)
            }
            Domain::Real => {
                if n % STRIDE != 0 {
                    return Err(FftError::OddRealLength);
                }
                let factors = factorize(n / STRIDE, config.allow_generic)?;
                let twiddles = TwiddleTable::generate_real(&factors)?;
                (factors, twiddles)
            }
        };
        let engine = Engine::new(factors, twiddles, config.small_kernels)?;
        fft_debug!(
            "planned {:?} {:?} fft of length {}: stages {:?}, small kernel {:?}, {} coefficients",
            S::KIND,
            domain,
            n,
            engine.factors().stages(),
            engine.small_kernel(),
            engine.twiddles().len()
        );
        Ok(Self {
            n,
            domain,
            config,
            engine,
        })
    }

    /// Transform length `N`.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn kind(&self) -> NumericKind {
        S::KIND
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Stages of the complex transform; covers `N/2` points for real plans.
    pub fn factors(&self) -> &FactorPlan {
        self.engine.factors()
    }

    pub fn twiddles(&self) -> &TwiddleTable<S::Acc> {
        self.engine.twiddles()
    }

    pub fn uses_small_kernel(&self) -> bool {
        self.engine.small_kernel().is_some()
    }

    /// Number of complex samples of scratch every execute call needs.
    ///
    /// `N` for both domains; real plans use it as two regions of `N/2`.
    pub fn scratch_len(&self) -> usize {
        self.n
    }

    pub(crate) fn expect_domain(&self, domain: Domain) -> Result<(), FftError> {
        if self.domain == domain {
            Ok(())
        } else {
            Err(FftError::DomainMismatch)
        }
    }

    pub(crate) fn check_scratch(&self, scratch: &[Complex<S>]) -> Result<(), FftError> {
        if scratch.len() < self.scratch_len() {
            return Err(FftError::ScratchTooSmall);
        }
        Ok(())
    }

    pub(crate) fn new_scratch(&self) -> Vec<Complex<S>> {
        vec![Complex::default(); self.scratch_len()]
    }

    /// Complex transform of `input` into `output` using caller scratch.
    pub fn process_with_scratch(
        &self,
        input: &[Complex<S>],
        output: &mut [Complex<S>],
        scratch: &mut [Complex<S>],
        direction: Direction,
    ) -> Result<(), FftError> {
        self.expect_domain(Domain::Complex)?;
        if input.len() != self.n || output.len() != self.n {
            return Err(FftError::MismatchedLengths);
        }
        self.check_scratch(scratch)?;
        let mode = RunMode::complex(direction.is_inverse(), self.config.is_scaled(direction));
        self.engine.run(input, output, scratch, mode);
        Ok(())
    }

    /// Like [`process_with_scratch`](Self::process_with_scratch) with a freshly
    /// allocated scratch buffer.
    pub fn process(
        &self,
        input: &[Complex<S>],
        output: &mut [Complex<S>],
        direction: Direction,
    ) -> Result<(), FftError> {
        let mut scratch = self.new_scratch();
        self.process_with_scratch(input, output, &mut scratch, direction)
    }

    /// Transform `data` in place.
    pub fn process_in_place(
        &self,
        data: &mut [Complex<S>],
        direction: Direction,
    ) -> Result<(), FftError> {
        let input = data.to_vec();
        self.process(&input, data, direction)
    }
}

impl<S: Sample> core::fmt::Debug for FftPlan<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FftPlan")
            .field("n", &self.n)
            .field("kind", &S::KIND)
            .field("domain", &self.domain)
            .field("config", &self.config)
            .field("stages", &self.engine.factors().stages())
            .field("small_kernel", &self.engine.small_kernel())
            .finish()
    }
}

/// Cache of plans keyed by length, domain and configuration.
pub struct FftPlanner<S: Sample> {
    config: PlanConfig,
    cache: HashMap<(usize, Domain, PlanConfig), Arc<FftPlan<S>>>,
}

impl<S: Sample> Default for FftPlanner<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> FftPlanner<S> {
    pub fn new() -> Self {
        Self::with_config(PlanConfig::for_sample::<S>())
    }

    /// Planner whose plans all use `config`.
    pub fn with_config(config: PlanConfig) -> Self {
        Self {
            config,
            cache: HashMap::new(),
        }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Fetch or build the plan for `n` points in `domain`.
    pub fn plan(&mut self, n: usize, domain: Domain) -> Result<Arc<FftPlan<S>>, FftError> {
        let key = (n, domain, self.config);
        if let Some(plan) = self.cache.get(&key) {
            return Ok(Arc::clone(plan));
        }
        let plan = Arc::new(FftPlan::with_config(n, domain, self.config)?);
        self.cache.insert(key, Arc::clone(&plan));
        Ok(plan)
    }

    pub fn plan_complex(&mut self, n: usize) -> Result<Arc<FftPlan<S>>, FftError> {
        self.plan(n, Domain::Complex)
    }

    pub fn plan_real(&mut self, n: usize) -> Result<Arc<FftPlan<S>>, FftError> {
        self.plan(n, Domain::Real)
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::{Complex32, Complex64};

    #[test]
    fn validates_buffers() {
        let plan = FftPlan::<f32>::new(8, Domain::Complex).unwrap();
        let input = vec![Complex32::zero(); 8];
        let mut short = vec![Complex32::zero(); 7];
        assert_eq!(
            plan.process(&input, &mut short, Direction::Forward),
            Err(FftError::MismatchedLengths)
        );
        let mut out = vec![Complex32::zero(); 8];
        let mut scratch = vec![Complex32::zero(); 4];
        assert_eq!(
            plan.process_with_scratch(&input, &mut out, &mut scratch, Direction::Forward),
            Err(FftError::ScratchTooSmall)
        );
        assert_eq!(
            plan.forward_real(&[0.0; 8], &mut [Complex32::zero(); 5]),
            Err(FftError::DomainMismatch)
        );
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(matches!(
            FftPlan::<f32>::new(0, Domain::Complex),
            Err(FftError::EmptyInput)
        ));
        assert!(matches!(
            FftPlan::<f32>::new(9, Domain::Real),
            Err(FftError::OddRealLength)
        ));
        let strict = PlanConfig::for_sample::<f32>().with_generic(false);
        assert!(matches!(
            FftPlan::<f32>::with_config(22, Domain::Complex, strict),
            Err(FftError::UnsupportedLength)
        ));
        assert!(FftPlan::<f32>::with_config(20, Domain::Complex, strict).is_ok());
    }

    #[test]
    fn default_scaling_follows_kind() {
        assert_eq!(PlanConfig::for_sample::<f64>().scaling, Scaling::BACKWARD);
        assert_eq!(PlanConfig::for_sample::<i16>().scaling, Scaling::FORWARD);
        assert_eq!(PlanConfig::for_sample::<i32>().scaling, Scaling::FORWARD);
    }

    #[test]
    fn in_place_roundtrip() {
        let plan = FftPlan::<f64>::new(30, Domain::Complex).unwrap();
        let orig: Vec<Complex64> = (0..30)
            .map(|i| Complex64::new(i as f64, (i * i) as f64 * 0.1))
            .collect();
        let mut data = orig.clone();
        plan.process_in_place(&mut data, Direction::Forward).unwrap();
        plan.process_in_place(&mut data, Direction::Inverse).unwrap();
        for (a, b) in data.iter().zip(&orig) {
            assert!((a.re - b.re).abs() < 1e-9 && (a.im - b.im).abs() < 1e-9);
        }
    }

    #[test]
    fn planner_reuses_plans() {
        let mut planner = FftPlanner::<f32>::new();
        let a = planner.plan_complex(12).unwrap();
        let b = planner.plan_complex(12).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let r = planner.plan_real(12).unwrap();
        assert_eq!(r.domain(), Domain::Real);
        assert_eq!(planner.len(), 2);
        planner.clear();
        assert!(planner.is_empty());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            alloc::format!("{}", FftError::OddRealLength),
            "real transform length must be even"
        );
    }
}

#[cfg(all(feature = "internal-tests", test))]
mod coverage_tests {
    use super::*;
    use crate::num::{Complex32, ComplexQ15};
    use alloc::vec;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_roundtrip_any_length(n in 1usize..200, ref signal in proptest::collection::vec(-100.0f32..100.0, 400)) {
            let x: Vec<Complex32> = signal.chunks(2).take(n).map(|c| Complex32::new(c[0], c[1])).collect();
            let plan = FftPlan::<f32>::new(n, Domain::Complex).unwrap();
            let mut freq = vec![Complex32::zero(); n];
            let mut back = vec![Complex32::zero(); n];
            plan.process(&x, &mut freq, Direction::Forward).unwrap();
            plan.process(&freq, &mut back, Direction::Inverse).unwrap();
            for (a, b) in back.iter().zip(&x) {
                prop_assert!((a.re - b.re).abs() < 1e-2 && (a.im - b.im).abs() < 1e-2);
            }
        }

        #[test]
        fn prop_q15_forward_stays_in_range(log_n in 1u32..9, ref signal in proptest::collection::vec(-32767i16..=32767, 512)) {
            let n = 1usize << log_n;
            // Keep each complex sample inside the unit circle.
            let x: Vec<ComplexQ15> = signal
                .chunks(2)
                .take(n)
                .map(|c| ComplexQ15::new(c[0] / 2, c[1] / 2))
                .collect();
            let plan = FftPlan::<i16>::new(n, Domain::Complex).unwrap();
            let mut out = vec![ComplexQ15::default(); n];
            plan.process(&x, &mut out, Direction::Forward).unwrap();
            let dc_re: i32 = x.iter().map(|c| c.re as i32).sum::<i32>() / n as i32;
            prop_assert!((out[0].re as i32 - dc_re).abs() <= 4 * log_n as i32 + 2);
        }
    }
}
