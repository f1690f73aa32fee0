use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

/// Fractal Perlin field with the usual octave controls. Samples are in
/// [-1, 1] and deterministic for a given seed.
pub struct NoiseField {
    noise: FastNoiseLite,
}

impl NoiseField {
    pub fn new(seed: i32, frequency: f32, octaves: i32, persistence: f32, lacunarity: f32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(frequency));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(octaves));
        noise.set_fractal_gain(Some(persistence));
        noise.set_fractal_lacunarity(Some(lacunarity));
        NoiseField { noise }
    }

    /// Single-octave field, for perturbation signals that should stay smooth.
    pub fn simple(seed: i32, frequency: f32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(frequency));
        NoiseField { noise }
    }

    #[inline]
    pub fn sample2(&self, x: f32, y: f32) -> f32 {
        self.noise.get_noise_2d(x, y)
    }

    #[inline]
    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        self.noise.get_noise_3d(x, y, z)
    }

    /// Sample remapped from [-1, 1] to [0, 1].
    #[inline]
    pub fn sample2_unit(&self, x: f32, y: f32) -> f32 {
        (self.sample2(x, y) + 1.0) * 0.5
    }
}

/// Maps a [-1, 1] noise value to a column height around the configured
/// average, clamped so at least one level of air and one of ground remain.
#[inline]
pub fn remap_noise_to_height(
    noise: f32,
    average_ratio: f32,
    feature_ratio: f32,
    size_z: i32,
) -> i32 {
    let size_z_f = size_z as f32;
    let average = size_z_f * average_ratio;
    let spread = size_z_f * feature_ratio;
    let h = (average + noise * spread) as i32;
    h.clamp(1, size_z - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_deterministic_per_seed() {
        let a = NoiseField::new(42, 0.02, 4, 0.55, 2.0);
        let b = NoiseField::new(42, 0.02, 4, 0.55, 2.0);
        let c = NoiseField::new(43, 0.02, 4, 0.55, 2.0);
        assert_eq!(a.sample2(10.0, 20.0), b.sample2(10.0, 20.0));
        assert_ne!(a.sample2(10.0, 20.0), c.sample2(10.0, 20.0));
    }

    #[test]
    fn remap_stays_in_bounds() {
        for n in [-1.0f32, -0.5, 0.0, 0.5, 1.0] {
            let h = remap_noise_to_height(n, 0.45, 0.25, 16);
            assert!((1..16).contains(&h));
        }
        // Extreme spreads still clamp.
        assert_eq!(remap_noise_to_height(1.0, 0.9, 2.0, 16), 15);
        assert_eq!(remap_noise_to_height(-1.0, 0.1, 2.0, 16), 1);
    }
}
