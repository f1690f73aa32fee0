use tellus_stage::Stage;

use crate::builder::{BuildStep, GenContext, TerrainBuilder};
use crate::noise::remap_noise_to_height;

/// Writes each column's initial generation height from the fractal height
/// field. Single-shot: one step covers every column.
pub struct HeightMapBuilder;

impl HeightMapBuilder {
    pub fn new() -> Self {
        HeightMapBuilder
    }
}

impl Default for HeightMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for HeightMapBuilder {
    fn name(&self) -> &'static str {
        "height_map"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        let p = &ctx.params.params;
        for y in 0..dims.size_y {
            for x in 0..dims.size_x {
                let noise = ctx.height.sample2(x as f32, y as f32);
                let h = remap_noise_to_height(noise, p.average_ratio, p.feature_ratio, dims.size_z);
                stage.set_column_initial_height(x, y, h);
            }
        }
        BuildStep::Done
    }

    fn reset(&mut self) {}
}
