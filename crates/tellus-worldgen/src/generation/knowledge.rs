use tellus_stage::Stage;

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

/// Reveals the player-known volume: the top level is always known, and
/// knowledge floods straight down until opacity stops it. One z-level per
/// step, top to bottom.
pub struct KnowledgeBuilder {
    z: Option<i32>,
}

impl KnowledgeBuilder {
    pub fn new() -> Self {
        KnowledgeBuilder { z: None }
    }
}

impl Default for KnowledgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for KnowledgeBuilder {
    fn name(&self) -> &'static str {
        "knowledge"
    }

    fn step(&mut self, stage: &mut Stage, _ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        let top = dims.size_z - 1;
        let z = *self.z.get_or_insert(top);
        if z < 0 {
            return BuildStep::Done;
        }
        for y in 0..dims.size_y {
            for x in 0..dims.size_x {
                let known = if z == top {
                    true
                } else {
                    stage.is_known(x, y, z + 1) && !stage.is_opaque(x, y, z + 1)
                };
                if known {
                    stage.set_known(x, y, z, true);
                }
            }
        }
        self.z = Some(z - 1);
        if z == 0 {
            BuildStep::Done
        } else {
            BuildStep::InProgress
        }
    }

    fn reset(&mut self) {
        self.z = None;
    }
}
