use tellus_stage::Stage;

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

/// Placeholder pass: the pipeline keeps the phase, but creature placement
/// lives outside the stage subsystem.
pub struct FaunaBuilder;

impl FaunaBuilder {
    pub fn new() -> Self {
        FaunaBuilder
    }
}

impl Default for FaunaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for FaunaBuilder {
    fn name(&self) -> &'static str {
        "fauna"
    }

    fn step(&mut self, _stage: &mut Stage, _ctx: &mut GenContext) -> BuildStep {
        BuildStep::Done
    }

    fn reset(&mut self) {}
}
