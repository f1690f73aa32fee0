use tellus_stage::{Layer, Stage};

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

/// Turns the topmost solid block of columns whose surface sits within a
/// narrow band around sea level into the beach substance.
pub struct BeachesBuilder {
    y: i32,
}

impl BeachesBuilder {
    pub fn new() -> Self {
        BeachesBuilder { y: 0 }
    }
}

impl Default for BeachesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for BeachesBuilder {
    fn name(&self) -> &'static str {
        "beaches"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        if self.y >= dims.size_y {
            return BuildStep::Done;
        }
        let sea_level = ctx.params.sea_level(dims.size_z);
        let band = ctx.params.params.beach_band;
        let sand = ctx.params.beach_substance;
        let y = self.y;
        for x in 0..dims.size_x {
            let top = stage.column_solid_height(x, y) - 1;
            if top < 0 {
                continue;
            }
            if (top - sea_level).abs() <= band {
                stage.set_substance(x, y, top, Layer::Solid, sand);
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
