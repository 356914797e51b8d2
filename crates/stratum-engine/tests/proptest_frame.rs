//! Property tests for the fixed-timestep clock.

use proptest::prelude::*;
use stratum_engine::prelude::*;

proptest! {
    /// However wall time arrives, no call runs more than the catch-up cap and
    /// simulated time is always `frames * dt`.
    #[test]
    fn advance_respects_cap(
        dt_ms in 1u32..100,
        cap in 1u32..10,
        steps in prop::collection::vec(0u32..500, 1..50),
    ) {
        let dt = dt_ms as f64 / 1000.0;
        let config = EngineConfig {
            fixed_dt: dt,
            max_catch_up_frames: cap,
            headless: true,
            ..Default::default()
        };
        let mut frames = FrameLoop::new(World::new(), config).unwrap();

        let mut total = 0u64;
        for ms in steps {
            let ran = frames.advance(ms as f64 / 1000.0);
            prop_assert!(ran <= cap);
            total += ran as u64;
        }
        prop_assert_eq!(frames.frame_count(), total);
        prop_assert_eq!(frames.sim_time(), total as f64 * dt);
    }
}
