use tellus_stage::{Layer, Prop, Stage};

use crate::builder::{BuildStep, GenContext, TerrainBuilder};
use crate::rng::column_rand01;

const TREE_SALT: u32 = 0xA53F9;
const SPECIES_SALT: u32 = 0xC0FFEE;

/// Dresses soil columns: a grass tuft on every dry soil surface, and a tree
/// where the forest-density field beats a per-column threshold drawn
/// between the plains and forest settings.
pub struct FloraBuilder {
    y: i32,
}

impl FloraBuilder {
    pub fn new() -> Self {
        FloraBuilder { y: 0 }
    }
}

impl Default for FloraBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainBuilder for FloraBuilder {
    fn name(&self) -> &'static str {
        "flora"
    }

    fn step(&mut self, stage: &mut Stage, ctx: &mut GenContext) -> BuildStep {
        let dims = stage.dims();
        if self.y >= dims.size_y {
            return BuildStep::Done;
        }
        let params = ctx.params.clone();
        let p = &params.params;
        let y = self.y;
        for x in 0..dims.size_x {
            let top = stage.column_solid_height(x, y) - 1;
            if top < 0 {
                continue;
            }
            let surface = stage.substance(x, y, top, Layer::Solid);
            if !params.soil_pool.contains(&surface) {
                continue;
            }
            // Submerged surfaces grow nothing.
            if stage.substance(x, y, top, Layer::Fluid) == params.water {
                continue;
            }
            if top + 1 < dims.size_z
                && stage.substance(x, y, top + 1, Layer::Fluid) == params.water
            {
                continue;
            }
            stage.add_prop(
                x,
                y,
                top,
                Prop {
                    prototype: params.grass_prototype,
                    substance: params.grass_substance,
                },
            );
            if params.tree_prototypes.is_empty() {
                continue;
            }
            let density = ctx.forest.sample2_unit(x as f32, y as f32);
            let t = column_rand01(ctx.seed, x, y, TREE_SALT);
            let threshold = p.plains_threshold + (p.forest_threshold - p.plains_threshold) * t;
            if density > threshold {
                let pick = (column_rand01(ctx.seed, x, y, SPECIES_SALT)
                    * params.tree_prototypes.len() as f32) as usize;
                let pick = pick.min(params.tree_prototypes.len() - 1);
                stage.add_prop(
                    x,
                    y,
                    top,
                    Prop {
                        prototype: params.tree_prototypes[pick],
                        substance: params.tree_substances[pick],
                    },
                );
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
