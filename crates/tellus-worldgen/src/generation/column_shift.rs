use tellus_stage::{Layer, Stage};

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

/// Realizes the height field as blocks: each column is filled with the base
/// rock up to its initial height and with air above. Runs on the quick
/// mutation path; the stage is still being bulk-painted and the pipeline's
/// recompute barrier follows.
pub struct ColumnShiftBuilder {
    y: i32,
}

impl ColumnShiftBuilder {
    pub fn new() -> Self {
        ColumnShiftBuilder { y: 0 }
    }
}

impl Default for ColumnShiftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for ColumnShiftBuilder {
    fn name(&self) -> &'static str {
        "column_shift"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        if self.y >= dims.size_y {
            return BuildStep::Done;
        }
        let base = ctx.params.base;
        let air = ctx.params.air;
        let y = self.y;
        for x in 0..dims.size_x {
            let h = stage.column_initial_height(x, y);
            for z in 0..dims.size_z {
                let id = if z < h { base } else { air };
                stage.set_substance_quick(x, y, z, Layer::Solid, id);
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
