use std::sync::Arc;

use tellus_stage::Stage;

use crate::noise::NoiseField;
use crate::params::ResolvedParams;
use crate::rng::GenRng;

/// Outcome of one builder step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuildStep {
    InProgress,
    Done,
}

/// Shared generation state handed to every builder: resolved parameters and
/// the seeded noise fields, constructed once per pipeline.
pub struct GenContext {
    pub params: Arc<ResolvedParams>,
    pub seed: i32,
    pub height: NoiseField,
    pub wiggle: NoiseField,
    pub forest: NoiseField,
    pub rng: GenRng,
}

impl GenContext {
    pub fn new(params: Arc<ResolvedParams>, seed: i32) -> GenContext {
        let p = &params.params;
        let height = NoiseField::new(
            seed,
            p.height_frequency,
            p.height_octaves,
            p.height_persistence,
            p.height_lacunarity,
        );
        let wiggle = NoiseField::simple(seed ^ 99_173, p.wiggle_frequency);
        let forest = NoiseField::simple(seed ^ 41_337, p.forest_frequency);
        GenContext {
            params,
            seed,
            height,
            wiggle,
            forest,
            rng: GenRng::new(seed, 0x5EED),
        }
    }
}

/// An incremental, resumable terrain pass. `step` performs one bounded slice
/// of work (an x-row of columns, a z-level, a batch of deposits) so the
/// driving thread can interleave with other work. `reset` restarts the
/// internal cursor only: mutations already applied to the stage stand, so
/// resetting a partially-run builder yields an unspecified world, not an
/// error.
pub trait TerrainBuilder {
    fn name(&self) -> &'static str;
    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep;
    fn reset(&mut self);
}
