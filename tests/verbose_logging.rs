// Test intent: verifies planning and execution work with the `log` backend
// installed and debug output enabled.
#![cfg(feature = "verbose-logging")]

use mrfft::{Complex32, Direction, Domain, FftPlan, FftPlanner};

fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

#[test]
fn planning_with_logging_enabled() {
    init_logger();
    let mut planner = FftPlanner::<f32>::new();
    for n in [4usize, 14, 60, 128] {
        let plan = planner.plan_complex(n).unwrap();
        let input = vec![Complex32::new(1.0, 0.0); n];
        let mut out = vec![Complex32::zero(); n];
        plan.process(&input, &mut out, Direction::Forward).unwrap();
        assert!((out[0].re - n as f32).abs() < 1e-3);
    }
    assert!(FftPlan::<i16>::new(32, Domain::Real).is_ok());
    assert!(FftPlan::<f32>::new(0, Domain::Complex).is_err());
}
