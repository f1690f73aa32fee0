use tellus_stage::Stage;

use crate::builder::{BuildStep, GenContext, TerrainBuilder};

use super::column_shift::ColumnShiftBuilder;
use super::height::HeightMapBuilder;
use super::strata::StrataBuilder;

/// The GenerateTerrain phase: height field, column realization, and strata
/// banding chained as one builder. Everything here runs on the quick
/// mutation path; the pipeline runs the recompute barrier when this builder
/// reports done.
pub struct TerrainShapeBuilder {
    stage_idx: usize,
    height: HeightMapBuilder,
    shift: ColumnShiftBuilder,
    strata: StrataBuilder,
}

impl TerrainShapeBuilder {
    pub fn new() -> Self {
        TerrainShapeBuilder {
            stage_idx: 0,
            height: HeightMapBuilder::new(),
            shift: ColumnShiftBuilder::new(),
            strata: StrataBuilder::new(),
        }
    }
}

impl Default for TerrainShapeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for TerrainShapeBuilder {
    fn name(&self) -> &'static str {
        "generate_terrain"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let current: &mut dyn TerrainBuilder = match self.stage_idx {
            0 => &mut self.height,
            1 => &mut self.shift,
            _ => &mut self.strata,
        };
        match current.step(stage, ctx) {
            BuildStep::InProgress => BuildStep::InProgress,
            BuildStep::Done => {
                if self.stage_idx >= 2 {
                    BuildStep::Done
                } else {
                    self.stage_idx += 1;
                    BuildStep::InProgress
                }
            }
        }
    }

    fn reset(&mut self) {
        self.stage_idx = 0;
        self.height.reset();
        self.shift.reset();
        self.strata.reset();
    }
}
