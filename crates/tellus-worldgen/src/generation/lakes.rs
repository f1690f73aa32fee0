use tellus_stage::{Layer, Stage};

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

/// Floods depressions: scans each column from sea level downward, filling
/// traversable blocks with water until the first non-traversable block.
pub struct LakesBuilder {
    y: i32,
}

impl LakesBuilder {
    pub fn new() -> Self {
        LakesBuilder { y: 0 }
    }
}

impl Default for LakesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for LakesBuilder {
    fn name(&self) -> &'static str {
        "lakes"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        if self.y >= dims.size_y {
            return BuildStep::Done;
        }
        let sea_level = ctx.params.sea_level(dims.size_z);
        let water = ctx.params.water;
        let y = self.y;
        for x in 0..dims.size_x {
            for z in (0..=sea_level).rev() {
                if !stage.is_traversable(x, y, z) {
                    break;
                }
                stage.set_substance(x, y, z, Layer::Fluid, water);
            }
        }
        self.y += 1;
        if self.y >= dims.size_y {
            BuildStep::Done
        } else {
            BuildStep::InProgress
        }
    }

    fn reset(&mut self) {
        self.y = 0;
    }
}
