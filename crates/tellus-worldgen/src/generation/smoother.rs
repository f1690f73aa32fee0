use tellus_stage::{Layer, Stage};

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

const NEIGHBORS8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Removes single-block height spikes: a column standing more than one
/// level above all eight of its neighbors is shaved down to one level above
/// the tallest neighbor.
pub struct SmootherBuilder {
    y: i32,
}

impl SmootherBuilder {
    pub fn new() -> Self {
        SmootherBuilder { y: 0 }
    }
}

impl Default for SmootherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for SmootherBuilder {
    fn name(&self) -> &'static str {
        "smoother"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        if self.y >= dims.size_y || !ctx.params.params.smoothing_enable {
            return BuildStep::Done;
        }
        let air = ctx.params.air;
        let y = self.y;
        for x in 0..dims.size_x {
            let h = stage.column_solid_height(x, y);
            let mut tallest_neighbor = 0;
            for (dx, dy) in NEIGHBORS8 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || nx >= dims.size_x || ny < 0 || ny >= dims.size_y {
                    continue;
                }
                tallest_neighbor = tallest_neighbor.max(stage.column_solid_height(nx, ny));
            }
            let ceiling = tallest_neighbor + 1;
            if h > ceiling {
                for z in ceiling..h {
                    stage.set_substance(x, y, z, Layer::Solid, air);
                }
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
