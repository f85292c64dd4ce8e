// Test intent: verifies the unrolled 4/8/16-point kernels agree with the
// general stage engine for every sample kind and direction.
use mrfft::{
    Complex, Complex32, Complex64, ComplexQ15, ComplexQ31, Direction, Domain, FftPlan, PlanConfig,
    Sample,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Plan `n` twice: once allowed to use a small kernel, once forced onto the
/// stage engine.
fn plan_pair<S: Sample>(n: usize, domain: Domain) -> (FftPlan<S>, FftPlan<S>) {
    let config = PlanConfig::for_sample::<S>();
    let fast = FftPlan::<S>::with_config(n, domain, config).unwrap();
    let general = FftPlan::<S>::with_config(n, domain, config.with_small_kernels(false)).unwrap();
    (fast, general)
}

fn run_both<S: Sample>(n: usize, x: &[Complex<S>], direction: Direction) -> (Vec<Complex<S>>, Vec<Complex<S>>) {
    let (fast, general) = plan_pair::<S>(n, Domain::Complex);
    assert!(fast.uses_small_kernel(), "n={} should use a small kernel", n);
    assert!(!general.uses_small_kernel());
    let mut a = vec![Complex::<S>::default(); n];
    let mut b = vec![Complex::<S>::default(); n];
    fast.process(x, &mut a, direction).unwrap();
    general.process(x, &mut b, direction).unwrap();
    (a, b)
}

#[test]
fn float_kernels_match_engine() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in [4usize, 8, 16] {
        for direction in [Direction::Forward, Direction::Inverse] {
            let x: Vec<Complex32> = (0..n)
                .map(|_| Complex32::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
                .collect();
            let (a, b) = run_both::<f32>(n, &x, direction);
            for (p, q) in a.iter().zip(&b) {
                assert!(
                    (p.re - q.re).abs() < 1e-5 && (p.im - q.im).abs() < 1e-5,
                    "n={} {:?}: {:?} vs {:?}",
                    n,
                    direction,
                    p,
                    q
                );
            }

            let x64: Vec<Complex64> = x
                .iter()
                .map(|c| Complex64::new(c.re as f64, c.im as f64))
                .collect();
            let (a, b) = run_both::<f64>(n, &x64, direction);
            for (p, q) in a.iter().zip(&b) {
                assert!((p.re - q.re).abs() < 1e-12 && (p.im - q.im).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn fixed_kernels_match_engine_when_scaled() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in [4usize, 8, 16] {
        let x: Vec<ComplexQ15> = (0..n)
            .map(|_| ComplexQ15::new(rng.gen_range(-32767..=32767), rng.gen_range(-32767..=32767)))
            .collect();
        let (a, b) = run_both::<i16>(n, &x, Direction::Forward);
        for (p, q) in a.iter().zip(&b) {
            assert!(
                (p.re as i32 - q.re as i32).abs() <= 2 && (p.im as i32 - q.im as i32).abs() <= 2,
                "n={}: {:?} vs {:?}",
                n,
                p,
                q
            );
        }

        let x: Vec<ComplexQ31> = (0..n)
            .map(|_| ComplexQ31::new(rng.gen_range(-i32::MAX..=i32::MAX), rng.gen_range(-i32::MAX..=i32::MAX)))
            .collect();
        let (a, b) = run_both::<i32>(n, &x, Direction::Forward);
        for (p, q) in a.iter().zip(&b) {
            assert!(
                (p.re as i64 - q.re as i64).abs() <= 2 && (p.im as i64 - q.im as i64).abs() <= 2,
                "n={}: {:?} vs {:?}",
                n,
                p,
                q
            );
        }
    }
}

#[test]
fn fixed_kernels_match_engine_on_inverse() {
    let mut rng = StdRng::seed_from_u64(13);
    for n in [4usize, 8, 16] {
        // Small enough that the unscaled inverse cannot saturate.
        let bound = (i16::MAX as i32 / n as i32) as i16;
        let x: Vec<ComplexQ15> = (0..n)
            .map(|_| ComplexQ15::new(rng.gen_range(-bound..=bound), rng.gen_range(-bound..=bound)))
            .collect();
        let (a, b) = run_both::<i16>(n, &x, Direction::Inverse);
        for (p, q) in a.iter().zip(&b) {
            assert!(
                (p.re as i32 - q.re as i32).abs() <= 2 && (p.im as i32 - q.im as i32).abs() <= 2,
                "n={}: {:?} vs {:?}",
                n,
                p,
                q
            );
        }
    }
}

#[test]
fn real_plans_use_kernels_for_half_length() {
    for n in [8usize, 16, 32] {
        let (fast, general) = plan_pair::<f32>(n, Domain::Real);
        assert!(fast.uses_small_kernel());
        assert!(!general.uses_small_kernel());
        let x: Vec<f32> = (0..n).map(|i| ((i * 3) % 5) as f32 - 2.0).collect();
        let mut a = vec![Complex32::zero(); n / 2 + 1];
        let mut b = vec![Complex32::zero(); n / 2 + 1];
        fast.forward_real(&x, &mut a).unwrap();
        general.forward_real(&x, &mut b).unwrap();
        for (p, q) in a.iter().zip(&b) {
            assert!((p.re - q.re).abs() < 1e-5 && (p.im - q.im).abs() < 1e-5);
        }
    }
    let plan = FftPlan::<f32>::new(64, Domain::Real).unwrap();
    assert!(!plan.uses_small_kernel());
}
