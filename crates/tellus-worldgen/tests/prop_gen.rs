use proptest::prelude::*;
use tellus_worldgen::noise::remap_noise_to_height;
use tellus_worldgen::rng::{GenRng, column_rand01};

proptest! {
    // Heights always leave one level of ground and one of air, whatever the
    // noise or the configured ratios do.
    #[test]
    fn remapped_heights_stay_inside_the_column(
        noise in -1.0f32..=1.0,
        average in 0.0f32..=1.5,
        feature in 0.0f32..=1.5,
        size_z in 2i32..=256,
    ) {
        let h = remap_noise_to_height(noise, average, feature, size_z);
        prop_assert!(h >= 1);
        prop_assert!(h < size_z);
    }

    #[test]
    fn rng_bounds_hold(seed in any::<i32>(), salt in any::<u32>(), bound in 1usize..10_000) {
        let mut rng = GenRng::new(seed, salt);
        for _ in 0..32 {
            prop_assert!(rng.next_usize(bound) < bound);
            let f = rng.next_f32();
            prop_assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn column_draws_are_pure(seed in any::<i32>(), x in any::<i32>(), y in any::<i32>(), salt in any::<u32>()) {
        let a = column_rand01(seed, x, y, salt);
        let b = column_rand01(seed, x, y, salt);
        prop_assert_eq!(a, b);
        prop_assert!((0.0..1.0).contains(&a));
    }
}
