use tellus_stage::{Layer, Stage};
use tellus_substance::SubstanceId;

use crate::builder::{BuildStep, GenContext, TerrainBuilder};
use crate::params::ResolvedParams;

#[derive(Copy, Clone, Eq, PartialEq)]
enum Band {
    Soil,
    Sedimentary,
    Metamorphic,
    Igneous,
}

/// Repaints each column from the surface down: a soil cap, then
/// sedimentary, metamorphic, and igneous bands at the configured fractional
/// depths. Substances are drawn from the band pools two z-levels at a time,
/// halving the selection granularity.
pub struct StrataBuilder {
    y: i32,
}

impl StrataBuilder {
    pub fn new() -> Self {
        StrataBuilder { y: 0 }
    }

    fn classify(params: &ResolvedParams, depth: i32, column_height: i32) -> Band {
        if depth <= params.params.soil_depth {
            return Band::Soil;
        }
        let frac = depth as f32 / column_height.max(1) as f32;
        if frac <= params.params.sedimentary_frac {
            Band::Sedimentary
        } else if frac <= params.params.metamorphic_frac {
            Band::Metamorphic
        } else {
            Band::Igneous
        }
    }

    fn pool<'p>(params: &'p ResolvedParams, band: Band) -> &'p [SubstanceId] {
        match band {
            Band::Soil => &params.soil_pool,
            Band::Sedimentary => &params.sedimentary_pool,
            Band::Metamorphic => &params.metamorphic_pool,
            Band::Igneous => &params.igneous_pool,
        }
    }
}

impl Default for StrataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for StrataBuilder {
    fn name(&self) -> &'static str {
        "strata"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        if self.y >= dims.size_y {
            return BuildStep::Done;
        }
        let y = self.y;
        let params = ctx.params.clone();
        for x in 0..dims.size_x {
            let top = stage.column_initial_height(x, y);
            // Walk down in pairs; the upper level of each pair picks the
            // band and the substance for both.
            let mut z = top - 1;
            while z >= 0 {
                let band = Self::classify(&params, top - z, top);
                let pool = Self::pool(&params, band);
                let id = ctx.rng.pick(pool).copied().unwrap_or(params.base);
                stage.set_substance_quick(x, y, z, Layer::Solid, id);
                if z >= 1 {
                    stage.set_substance_quick(x, y, z - 1, Layer::Solid, id);
                }
                z -= 2;
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
